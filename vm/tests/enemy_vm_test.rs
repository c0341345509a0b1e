use std::rc::Rc;

use primitives::Value;
use vm::ecl::{BossBehaviors, Enemy, EnemyVm};
use primitives::Prng;
use vm::game::{BulletConversion, EnemySpawn, Game, ItemKind};
use vm::{Arg, EclProgram, EnemyId, Instruction, RuntimeError, Script, ScriptFormat, World};

fn op(frame: u32, opcode: u16, args: &[Arg]) -> Instruction {
    Instruction::with_args(frame, opcode, args)
}

fn sub(instructions: Vec<Instruction>) -> Script {
    Script::new(ScriptFormat::EclSub, 0, instructions)
}

fn spawn() -> EnemySpawn {
    EnemySpawn {
        sub: 0,
        x: 100.0,
        y: 50.0,
        z: 0.0,
        life: 10,
        bonus: -1,
        score: 100,
        mirrored: false,
    }
}

struct Harness {
    vm: EnemyVm,
    enemy: Enemy,
    world: World,
}

impl Harness {
    fn new(subs: Vec<Script>, difficulty: i32) -> Self {
        Self::with_behaviors(subs, difficulty, BossBehaviors::new())
    }

    fn with_behaviors(subs: Vec<Script>, difficulty: i32, behaviors: BossBehaviors) -> Self {
        let program = EclProgram::new(Script::new(ScriptFormat::EclMain, 0, vec![]), subs);
        let vm = EnemyVm::new(Rc::new(program), Rc::new(behaviors), 0).expect("sub 0 exists");
        Self {
            vm,
            enemy: Enemy::new(EnemyId(0), &spawn()),
            world: World::new(0, 0, difficulty, vec![]),
        }
    }

    fn seeded(mut self, seed: u16) -> Self {
        self.world = World::new(seed, 0, 0, vec![]);
        self
    }

    fn run(&mut self) -> Result<(), RuntimeError> {
        self.vm.run_iteration(&mut self.enemy, &mut self.world)
    }

    /// Interpreter then physics, the way the stage drives an enemy.
    fn tick(&mut self) {
        self.run().unwrap();
        self.enemy.update(&mut self.world).unwrap();
    }

    fn reg(&self, slot: usize) -> Value {
        self.vm.registers.get(slot)
    }
}

/// Every jump in `script` names a frame equal to the one at its target ip.
fn assert_jump_targets_consistent(script: &Script) {
    for instr in &script.instructions {
        if matches!(instr.opcode, 2 | 3 | 29..=34) {
            let words = instr.args().words();
            let (frame, ip) = (words[0] as u32, words[1] as usize);
            let target = script.get(ip).expect("jump target in range");
            assert_eq!(target.frame, frame, "jump at frame {} to ip {}", instr.frame, ip);
        }
    }
}

#[test]
fn test_call_then_ret_preserves_registers_and_flag() {
    let main = sub(vec![
        op(0, 4, &[Arg::Int(-10001), Arg::Int(7)]),
        op(0, 5, &[Arg::Int(-10005), Arg::Float(2.5)]),
        op(0, 27, &[Arg::Int(-10001), Arg::Int(3)]),
        op(1, 35, &[Arg::Int(1), Arg::Int(42), Arg::Float(1.5)]),
        op(5, 0, &[]),
    ]);
    let callee = sub(vec![op(0, 36, &[])]);
    let mut h = Harness::new(vec![main, callee], 0);

    h.run().unwrap();
    let registers = h.vm.registers;
    let comparison = h.vm.comparison;
    assert_eq!(comparison, std::cmp::Ordering::Greater);

    h.run().unwrap();
    assert_eq!(h.vm.sub, 0);
    assert!(h.vm.stack.is_empty());
    assert_eq!(h.vm.registers, registers);
    assert_eq!(h.vm.comparison, comparison);
    assert!(h.vm.running);
}

#[test]
fn test_callee_sees_seeded_parameters() {
    let main = sub(vec![
        op(0, 35, &[Arg::Int(1), Arg::Int(42), Arg::Float(1.5)]),
        op(5, 0, &[]),
    ]);
    // Copy the parameters out before the frame is discarded.
    let callee = sub(vec![
        op(0, 4, &[Arg::Int(-10002), Arg::Int(-10001)]),
        op(0, 5, &[Arg::Int(-10006), Arg::Float(-10005.0)]),
        op(1, 0, &[]),
    ]);
    let mut h = Harness::new(vec![main, callee], 0);
    h.run().unwrap();
    assert_eq!(h.vm.sub, 1);
    assert_eq!(h.reg(1), Value::Int(42));
    assert_eq!(h.reg(5), Value::Float(1.5));
}

#[test]
fn test_ret_on_empty_stack_is_fatal() {
    let mut h = Harness::new(vec![sub(vec![op(0, 36, &[])])], 0);
    assert_eq!(h.run(), Err(RuntimeError::CallStackUnderflow));
}

#[test]
fn test_unmatched_conditional_jump_does_not_move() {
    let script = sub(vec![
        op(0, 27, &[Arg::Int(1), Arg::Int(2)]),
        op(0, 32, &[Arg::Int(5), Arg::Int(3)]),
        op(0, 4, &[Arg::Int(-10001), Arg::Int(9)]),
        op(5, 0, &[]),
    ]);
    assert_jump_targets_consistent(&script);
    let mut h = Harness::new(vec![script], 0);
    h.run().unwrap();
    assert_eq!(h.reg(0), Value::Int(9));
    assert_eq!(h.vm.frame, 1);
    assert_eq!(h.vm.ip, 3);
}

#[test]
fn test_matched_conditional_jump_skips_ahead() {
    let script = sub(vec![
        op(0, 27, &[Arg::Int(1), Arg::Int(2)]),
        op(0, 29, &[Arg::Int(5), Arg::Int(3)]),
        op(0, 4, &[Arg::Int(-10001), Arg::Int(9)]),
        op(5, 4, &[Arg::Int(-10002), Arg::Int(1)]),
        op(9, 0, &[]),
    ]);
    assert_jump_targets_consistent(&script);
    let mut h = Harness::new(vec![script], 0);
    h.run().unwrap();
    assert_eq!(h.reg(0), Value::Int(0));
    assert_eq!(h.reg(1), Value::Int(1));
    assert_eq!(h.vm.frame, 6);
}

#[test]
fn test_counted_loop_runs_within_one_frame() {
    let script = sub(vec![
        op(0, 4, &[Arg::Int(-10002), Arg::Int(3)]),
        op(1, 18, &[Arg::Int(-10001)]),
        op(1, 3, &[Arg::Int(1), Arg::Int(1), Arg::Int(-10002)]),
        op(4, 0, &[]),
    ]);
    assert_jump_targets_consistent(&script);
    let mut h = Harness::new(vec![script], 0);
    h.run().unwrap();
    h.run().unwrap();
    assert_eq!(h.reg(0), Value::Int(3));
    assert_eq!(h.reg(1), Value::Int(0));
}

#[test]
fn test_unmapped_variable_is_fatal() {
    let script = sub(vec![op(0, 4, &[Arg::Int(-10001), Arg::Int(-10023)])]);
    let mut h = Harness::new(vec![script], 0);
    assert_eq!(h.run(), Err(RuntimeError::UnmappedVariable(-10023)));
}

#[test]
fn test_jump_to_negative_ip_is_fatal() {
    let mut h = Harness::new(vec![sub(vec![op(0, 2, &[Arg::Int(0), Arg::Int(-1)])])], 0);
    assert_eq!(
        h.run(),
        Err(RuntimeError::NegativeArgument { opcode: 2, value: -1 })
    );
}

#[test]
fn test_read_only_variable_rejects_writes() {
    let script = sub(vec![op(0, 4, &[Arg::Int(-10013), Arg::Int(1)])]);
    let mut h = Harness::new(vec![script], 0);
    assert_eq!(h.run(), Err(RuntimeError::ReadOnlyVariable(-10013)));
}

#[test]
fn test_special_variables_address_the_enemy() {
    let script = sub(vec![
        op(0, 5, &[Arg::Int(-10015), Arg::Float(12.0)]),
        op(0, 4, &[Arg::Int(-10001), Arg::Int(-10024)]),
        op(3, 0, &[]),
    ]);
    let mut h = Harness::new(vec![script], 0);
    h.run().unwrap();
    assert_eq!(h.enemy.x, 12.0);
    assert_eq!(h.reg(0), Value::Int(10));
}

#[test]
fn test_unknown_opcode_is_skipped() {
    let script = sub(vec![
        op(0, 250, &[Arg::Int(1)]),
        op(0, 4, &[Arg::Int(-10001), Arg::Int(5)]),
        op(2, 0, &[]),
    ]);
    let mut h = Harness::new(vec![script], 0);
    h.run().unwrap();
    assert_eq!(h.reg(0), Value::Int(5));
}

#[test]
fn test_rank_mask_filters_by_difficulty() {
    let script = || {
        sub(vec![
            op(0, 4, &[Arg::Int(-10001), Arg::Int(1)]).with_rank_mask(0x100 << 2),
            op(0, 4, &[Arg::Int(-10002), Arg::Int(1)]),
            op(2, 0, &[]),
        ])
    };

    let mut easy = Harness::new(vec![script()], 0);
    easy.run().unwrap();
    assert_eq!(easy.reg(0), Value::Int(0));
    assert_eq!(easy.reg(1), Value::Int(1));

    let mut lunatic = Harness::new(vec![script()], 2);
    lunatic.run().unwrap();
    assert_eq!(lunatic.reg(0), Value::Int(1));
}

#[test]
fn test_death_callback_fires_once() {
    let main = sub(vec![
        op(0, 107, &[Arg::Int(1)]),
        op(0, 108, &[Arg::Int(1)]),
        op(0, 111, &[Arg::Int(0)]),
        op(20, 0, &[]),
    ]);
    let on_death = sub(vec![op(0, 18, &[Arg::Int(-10001)]), op(20, 0, &[])]);
    let mut h = Harness::new(vec![main, on_death], 0);

    for _ in 0..8 {
        h.run().unwrap();
    }
    assert_eq!(h.vm.sub, 1);
    assert_eq!(h.reg(0), Value::Int(1));
    assert!(!h.enemy.touchable);
    assert!(h.enemy.callbacks.death.is_none());
    assert_eq!(h.world.effects.score, 100);
}

#[test]
fn test_timeout_without_callback_kills() {
    let main = sub(vec![op(0, 115, &[Arg::Int(2)]), op(20, 0, &[])]);
    let mut h = Harness::new(vec![main], 0);
    for _ in 0..4 {
        h.run().unwrap();
        h.enemy.update(&mut h.world).unwrap();
    }
    assert!(h.enemy.removed);
    assert!(!h.vm.running);
}

#[test]
fn test_running_off_the_end_stops_only_this_vm() {
    let mut h = Harness::new(vec![sub(vec![op(0, 0, &[])])], 0);
    h.run().unwrap();
    h.run().unwrap();
    assert!(!h.vm.running);
    assert!(h.run().is_ok());
}

#[test]
fn test_bullet_attributes_fire_a_fan() {
    let main = sub(vec![
        op(
            0,
            68,
            &[
                Arg::Int(1),
                Arg::Int(0),
                Arg::Int(3),
                Arg::Int(1),
                Arg::Float(2.0),
                Arg::Float(2.0),
                Arg::Float(0.0),
                Arg::Float(0.5),
                Arg::Int(0),
            ],
        ),
        op(5, 0, &[]),
    ]);
    let mut h = Harness::new(vec![main], 0);
    h.run().unwrap();
    let angles: Vec<f64> = h.world.effects.bullets.iter().map(|b| b.angle).collect();
    assert_eq!(angles.len(), 3);
    assert!((angles[0] + 0.5).abs() < 1e-9);
    assert!(angles[1].abs() < 1e-9);
    assert!((angles[2] - 0.5).abs() < 1e-9);
}

fn bullet_args(per_shot: i32, speed: f32, speed2: f32, launch_angle: f32, angle: f32) -> Vec<Arg> {
    vec![
        Arg::Int(0),
        Arg::Int(0),
        Arg::Int(per_shot),
        Arg::Int(1),
        Arg::Float(speed),
        Arg::Float(speed2),
        Arg::Float(launch_angle),
        Arg::Float(angle),
        Arg::Int(0),
    ]
}

fn laser_args(angle: f32) -> Vec<Arg> {
    vec![
        Arg::Int(0),
        Arg::Int(1),
        Arg::Float(angle),
        Arg::Float(0.0),
        Arg::Float(0.0),
        Arg::Float(10.0),
        Arg::Float(100.0),
        Arg::Float(8.0),
        Arg::Int(10),
        Arg::Int(60),
        Arg::Int(10),
    ]
}

#[test]
fn test_low_life_callback_fires_once() {
    let main = sub(vec![
        op(0, 113, &[Arg::Int(5)]),
        op(0, 114, &[Arg::Int(1)]),
        op(2, 4, &[Arg::Int(-10024), Arg::Int(4)]),
        op(20, 0, &[]),
    ]);
    let on_low_life = sub(vec![op(0, 18, &[Arg::Int(-10001)]), op(20, 0, &[])]);
    let mut h = Harness::new(vec![main, on_low_life], 0);

    for _ in 0..3 {
        h.run().unwrap();
    }
    assert_eq!(h.vm.sub, 0);
    assert_eq!(h.enemy.life, 4);

    h.run().unwrap();
    assert_eq!(h.vm.sub, 1);
    assert_eq!(h.reg(0), Value::Int(1));
    assert!(h.enemy.callbacks.low_life.is_none());

    for _ in 0..10 {
        h.run().unwrap();
    }
    assert_eq!(h.vm.sub, 1);
    assert_eq!(h.vm.frame, 11);
    assert_eq!(h.reg(0), Value::Int(1));
}

#[test]
fn test_timeout_callback_fires_once() {
    let main = sub(vec![
        op(0, 115, &[Arg::Int(3)]),
        op(0, 116, &[Arg::Int(1)]),
        op(20, 0, &[]),
    ]);
    let on_timeout = sub(vec![op(0, 18, &[Arg::Int(-10001)]), op(30, 0, &[])]);
    let mut h = Harness::new(vec![main, on_timeout], 0);

    for _ in 0..3 {
        h.tick();
    }
    assert_eq!(h.vm.sub, 0);
    assert_eq!(h.enemy.frame, 3);

    h.tick();
    assert_eq!(h.vm.sub, 1);
    assert_eq!(h.reg(0), Value::Int(1));
    assert!(h.enemy.timeout.is_none());
    assert!(h.enemy.callbacks.timeout.is_none());
    assert_eq!(h.world.effects.gauge.as_ref().map(|g| g.timeout), Some(None));

    for _ in 0..10 {
        h.tick();
    }
    assert_eq!(h.vm.sub, 1);
    assert_eq!(h.reg(0), Value::Int(1));
    assert!(!h.enemy.removed);
    assert_eq!(h.enemy.life, 10);
}

#[test]
fn test_laser_ids_route_commands_until_cancelled() {
    let main = sub(vec![
        op(0, 87, &[Arg::Int(5)]),
        op(0, 85, &laser_args(0.5)),
        op(0, 88, &[Arg::Int(5), Arg::Float(0.25)]),
        op(0, 87, &[Arg::Int(6)]),
        op(0, 86, &laser_args(0.0)),
        op(1, 90, &[Arg::Int(5), Arg::Float(10.0), Arg::Float(0.0), Arg::Float(0.0)]),
        op(2, 92, &[Arg::Int(5)]),
        op(2, 88, &[Arg::Int(5), Arg::Float(1.0)]),
        op(9, 0, &[]),
    ]);
    let mut h = Harness::new(vec![main], 0);

    h.run().unwrap();
    assert_eq!(h.enemy.lasers.len(), 2);
    let first = h.enemy.lasers[&5];
    let aimed = h.enemy.lasers[&6];
    assert_eq!(h.world.effects.lasers[&first.0].spawn.angle, 0.75);
    let to_player = h.world.angle_to_player(100.0, 50.0);
    assert_eq!(h.world.effects.lasers[&aimed.0].spawn.angle, to_player);

    h.run().unwrap();
    let laser = &h.world.effects.lasers[&first.0];
    assert_eq!((laser.spawn.x, laser.spawn.y), (110.0, 50.0));

    h.run().unwrap();
    let laser = &h.world.effects.lasers[&first.0];
    assert!(laser.cancelled);
    assert_eq!(laser.spawn.angle, 0.75);
    assert!(!h.enemy.lasers.contains_key(&5));
    assert!(h.enemy.lasers.contains_key(&6));
    assert!(!h.world.effects.lasers[&aimed.0].cancelled);
}

#[test]
fn test_special_functions_dispatch_by_id() {
    let main = sub(vec![
        op(0, 68, &bullet_args(3, 2.0, 2.0, 0.0, 0.5)),
        op(1, 121, &[Arg::Int(0), Arg::Int(0)]),
        op(2, 121, &[Arg::Int(1), Arg::Int(4)]),
        op(3, 122, &[Arg::Int(0)]),
        op(9, 0, &[]),
    ]);
    let mut h = Harness::with_behaviors(vec![main], 0, BossBehaviors::for_stage(6));

    h.run().unwrap();
    assert_eq!(h.world.effects.bullets.len(), 3);

    h.run().unwrap();
    assert!(h.world.effects.bullets.is_empty());
    assert_eq!(h.world.effects.items.len(), 3);
    assert!(h.world.effects.items.iter().all(|i| i.kind == ItemKind::Star));

    h.run().unwrap();
    assert_eq!(h.enemy.lasers.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    let base = h.world.angle_to_player(100.0, 50.0);
    for (n, handle) in &h.enemy.lasers {
        let angle = h.world.effects.lasers[&handle.0].spawn.angle;
        let expected = base + std::f64::consts::PI * f64::from(*n) / 2.0;
        assert!((angle - expected).abs() < 1e-9, "laser {n}: {angle} vs {expected}");
    }

    h.run().unwrap();
    assert_eq!(h.enemy.special_callback, Some(0));
    assert_eq!(h.world.effects.conversions.len(), 1);

    h.run().unwrap();
    h.run().unwrap();
    assert_eq!(
        h.world.effects.conversions,
        vec![BulletConversion::ToItems; 3]
    );
}

#[test]
fn test_move_to_follows_its_easing() {
    let run_to = |opcode: u16, frames: usize| {
        let main = sub(vec![
            op(
                0,
                opcode,
                &[Arg::Int(4), Arg::Float(140.0), Arg::Float(90.0), Arg::Float(0.0)],
            ),
            op(20, 0, &[]),
        ]);
        let mut h = Harness::new(vec![main], 0);
        for _ in 0..frames {
            h.tick();
        }
        h.enemy
    };

    let linear = run_to(56, 3);
    assert!((linear.x - 120.0).abs() < 1e-9);
    assert!((linear.y - 70.0).abs() < 1e-9);

    let decel = run_to(57, 3);
    assert!((decel.x - 130.0).abs() < 1e-9);

    let accel = run_to(58, 3);
    assert!((accel.x - 110.0).abs() < 1e-9);

    let done = run_to(57, 6);
    assert_eq!((done.x, done.y), (140.0, 90.0));
    assert!(done.movement.is_none());
}

#[test]
fn test_stop_in_slows_to_rest() {
    let run_to = |opcode: u16, frames: usize| {
        let main = sub(vec![
            op(0, 45, &[Arg::Float(0.0), Arg::Float(4.0)]),
            op(0, opcode, &[Arg::Int(4)]),
            op(20, 0, &[]),
        ]);
        let mut h = Harness::new(vec![main], 0);
        for _ in 0..frames {
            h.tick();
        }
        h.enemy
    };

    let linear = run_to(61, 2);
    assert!((linear.speed - 3.0).abs() < 1e-9);
    assert!((linear.x - 107.0).abs() < 1e-9);

    let decel = run_to(62, 3);
    assert!((decel.speed - 1.0).abs() < 1e-9);

    let accel = run_to(63, 3);
    assert!((accel.speed - 3.0).abs() < 1e-9);

    let stopped = run_to(61, 8);
    assert_eq!(stopped.speed, 0.0);
    assert!((stopped.x - 110.0).abs() < 1e-9);
    assert!(stopped.speed_interpolator.is_none());
}

#[test]
fn test_screen_box_clamps_position() {
    let main = sub(vec![
        op(0, 65, &[Arg::Float(0.0), Arg::Float(0.0), Arg::Float(120.0), Arg::Float(200.0)]),
        op(0, 45, &[Arg::Float(0.0), Arg::Float(8.0)]),
        op(5, 66, &[]),
        op(20, 0, &[]),
    ]);
    let mut h = Harness::new(vec![main], 0);

    for _ in 0..5 {
        h.tick();
        assert!(h.enemy.x <= 120.0);
    }
    assert_eq!(h.enemy.x, 120.0);

    h.tick();
    assert_eq!(h.enemy.x, 128.0);
}

#[test]
fn test_random_speed_ring_draws_one_value_per_bullet() {
    let main = sub(vec![op(0, 72, &bullet_args(3, 3.0, 1.0, 0.0, 0.0)), op(5, 0, &[])]);
    let mut h = Harness::new(vec![main], 0).seeded(0x4d2);
    h.run().unwrap();

    let mut prng = Prng::new(0x4d2);
    let bullets = &h.world.effects.bullets;
    assert_eq!(bullets.len(), 3);
    for (n, bullet) in bullets.iter().enumerate() {
        let speed = 1.0 + prng.rand_double() * 2.0;
        let angle = 2.0 * std::f64::consts::PI / 3.0 * n as f64;
        assert!((bullet.speed - speed).abs() < 1e-12);
        assert!((bullet.angle - angle).abs() < 1e-9);
    }
    assert_eq!(h.world.prng_state().draw_count(), prng.draw_count());
}

#[test]
fn test_random_angle_and_speed_draws_angle_first() {
    let main = sub(vec![op(0, 73, &bullet_args(2, 3.0, 1.0, 0.5, 0.25)), op(5, 0, &[])]);
    let mut h = Harness::new(vec![main], 0).seeded(0x4d2);
    h.run().unwrap();

    let mut prng = Prng::new(0x4d2);
    let bullets = &h.world.effects.bullets;
    assert_eq!(bullets.len(), 2);
    for bullet in bullets {
        let angle = 0.5 + (prng.rand_double() * 2.0 - 1.0) * 0.25;
        let speed = 1.0 + prng.rand_double() * 2.0;
        assert!((bullet.angle - angle).abs() < 1e-12);
        assert!((bullet.speed - speed).abs() < 1e-12);
    }
}
