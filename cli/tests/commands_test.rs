use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp_scenario(content: &str) -> NamedTempFile {
    let mut f = NamedTempFile::with_suffix(".toml").unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

fn demo_path() -> String {
    format!("{}/../demos/scenario.toml", env!("CARGO_MANIFEST_DIR"))
}

// ======================================================================
// run
// ======================================================================

#[test]
fn run_demo_scenario_to_the_end() {
    let snapshot = cli::commands::run::run_scenario(&demo_path(), None).unwrap();
    assert_eq!(snapshot.frame, 400);
    assert!(snapshot.timeline_finished);
    assert!(snapshot.boss.is_none());
    assert!(snapshot.dialogue.is_none());
    assert!(snapshot.effects.score >= 10000);
    assert!(!snapshot.effects.items.is_empty());
}

#[test]
fn run_frame_override_and_json() {
    let snapshot = cli::commands::run::run_scenario(&demo_path(), Some(25)).unwrap();
    assert_eq!(snapshot.frame, 25);
    assert_eq!(snapshot.enemies.len(), 2);
    assert!(snapshot.enemies[1].anim_active);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["frame"], 25);
    assert_eq!(json["enemies"].as_array().map(Vec::len), Some(2));

    let text = cli::commands::run::summary(&snapshot);
    assert!(text.starts_with("frame 25"));
}

#[test]
fn run_dialogue_shows_in_summary() {
    let snapshot = cli::commands::run::run_scenario(&demo_path(), Some(160)).unwrap();
    let dialogue = snapshot.dialogue.as_ref().expect("dialogue running");
    assert!(dialogue.portraits.iter().all(Option::is_some));
    let text = cli::commands::run::summary(&snapshot);
    assert!(text.contains("Something is up ahead."));
    assert!(text.contains("You will not pass."));
}

#[test]
fn run_reports_fatal_errors_with_frame() {
    let src = write_temp_scenario(
        r#"
        [ecl.main]
        instructions = [{ frame = 0, op = 0, args = [0, 0.0, 0.0, 0.0, 1, -1, 0] }]

        [[ecl.subs]]
        instructions = [{ frame = 3, op = 4, args = [-10001, -10023] }]
        "#,
    );
    let err = cli::commands::run::run_scenario(src.path().to_str().unwrap(), Some(10)).unwrap_err();
    assert!(err.to_string().contains("frame 3"), "got: {err}");
    assert!(format!("{err:#}").contains("-10023"));
}

#[test]
fn run_nonexistent_file_returns_error() {
    let result = cli::commands::run::run_scenario("/tmp/nonexistent_shmup_scenario.toml", None);
    assert!(result.is_err());
}

#[test]
fn run_rejects_bad_portraits() {
    let src = write_temp_scenario(
        r#"
        portraits = [1]
        [ecl.main]
        "#,
    );
    let err = cli::commands::run::run_scenario(src.path().to_str().unwrap(), Some(1)).unwrap_err();
    assert!(err.to_string().contains("portraits"));
}

// ======================================================================
// disassemble
// ======================================================================

#[test]
fn disassemble_demo_names_every_script() {
    let text = cli::commands::disassemble::disassemble_file(&demo_path()).unwrap();
    for header in [
        "== anm 3 (v0) ==",
        "== anm 21 (v2) ==",
        "== ecl main (v0) ==",
        "== ecl sub 1 (v0) ==",
        "== msg 0 (v0) ==",
    ] {
        assert!(text.contains(header), "missing {header}");
    }
    assert!(text.contains("spawn_enemy_mirrored"));
    assert!(text.contains("wait_for_boss_death"));
    assert!(text.contains("display_text"));
}

#[test]
fn disassemble_unsupported_version_fails() {
    let src = write_temp_scenario(
        r#"
        [[anm]]
        id = 1
        version = 7
        instructions = [{ frame = 0, op = 1, args = [0] }]

        [ecl.main]
        "#,
    );
    let err = cli::commands::disassemble::disassemble_file(src.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("anm 1"));
}
