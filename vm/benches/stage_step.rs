//! Stage stepping throughput with a growing number of firing enemies.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use vm::{Arg, EclProgram, Instruction, Script, ScriptFormat, Stage, StageConfig};

const FRAMES: u32 = 300;

fn op(frame: u32, opcode: u16, args: &[Arg]) -> Instruction {
    Instruction::with_args(frame, opcode, args)
}

fn program(enemies: usize) -> EclProgram {
    let main = (0..enemies)
        .map(|n| {
            op(
                0,
                0,
                &[
                    Arg::Int(0),
                    Arg::Float(n as f32 * 8.0),
                    Arg::Float(32.0),
                    Arg::Float(0.0),
                    Arg::Int(1000),
                    Arg::Int(-1),
                    Arg::Int(10),
                ],
            )
        })
        .collect();
    let sub = vec![
        op(0, 45, &[Arg::Float(1.57), Arg::Float(0.5)]),
        op(0, 46, &[Arg::Float(0.01)]),
        op(
            0,
            69,
            &[
                Arg::Int(0),
                Arg::Int(0),
                Arg::Int(8),
                Arg::Int(2),
                Arg::Float(2.0),
                Arg::Float(1.0),
                Arg::Float(0.0),
                Arg::Float(0.0),
                Arg::Int(0),
            ],
        ),
        op(0, 75, &[Arg::Int(10)]),
        op(1, 18, &[Arg::Int(-10001)]),
        op(2, 2, &[Arg::Int(1), Arg::Int(4)]),
    ];
    EclProgram::new(
        Script::new(ScriptFormat::EclMain, 0, main),
        vec![Script::new(ScriptFormat::EclSub, 0, sub)],
    )
}

fn bench_stage_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("stage_step");

    for enemies in [1usize, 16, 64] {
        group.throughput(Throughput::Elements(u64::from(FRAMES)));
        group.bench_with_input(BenchmarkId::from_parameter(enemies), &enemies, |b, &n| {
            b.iter(|| {
                let mut stage = Stage::new(StageConfig::default(), program(n)).unwrap();
                stage.run(FRAMES).unwrap();
                black_box(stage.world().effects.bullets.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stage_step);
criterion_main!(benches);
