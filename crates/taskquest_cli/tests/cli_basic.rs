use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cli(db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskquest"))
        .args(args)
        .env("TASKQUEST_DB_PATH", db)
        .env_remove("TASKQUEST_LOG_DIR")
        .env_remove("TASKQUEST_LOG_LEVEL")
        .output()
        .expect("taskquest binary should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn added_id(output: &Output) -> String {
    stdout(output)
        .trim()
        .strip_prefix("Quest added: ")
        .expect("add should print the new id")
        .to_string()
}

fn db_in(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("quest.sqlite3")
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&db_in(&dir), &["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["onboard", "status", "add", "complete", "delete", "list", "achievements", "export"] {
        assert!(text.contains(command), "missing `{command}` in help");
    }
}

#[test]
fn commands_require_onboarding_first() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&db_in(&dir), &["status"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("error: no hero profile yet"));
}

#[test]
fn onboard_twice_needs_force() {
    let dir = TempDir::new().unwrap();
    let db = db_in(&dir);

    let first = run_cli(&db, &["onboard", "--name", "Aria", "--class", "mage"]);
    assert!(first.status.success());
    assert_eq!(stdout(&first).trim(), "Welcome, Aria the Mage!");

    let second = run_cli(&db, &["onboard", "--name", "Brom"]);
    assert_eq!(second.status.code(), Some(1));
    assert!(stderr(&second).contains("--force"));

    let forced = run_cli(&db, &["onboard", "--name", "Brom", "--class", "Knight", "--force"]);
    assert!(forced.status.success());
    assert!(stdout(&run_cli(&db, &["status"])).contains("Brom the Knight"));
}

#[test]
fn completing_quests_levels_up_and_unlocks_achievement() {
    let dir = TempDir::new().unwrap();
    let db = db_in(&dir);
    assert!(run_cli(&db, &["onboard", "--name", "Aria"]).status.success());

    let mut ids = Vec::new();
    for index in 0..5 {
        let text = format!("slay dragon {index}");
        let output = run_cli(&db, &["add", &text, "--difficulty", "high"]);
        assert!(output.status.success());
        ids.push(added_id(&output));
    }

    let mut transcript = String::new();
    for id in &ids {
        let output = run_cli(&db, &["complete", id]);
        assert!(output.status.success());
        transcript.push_str(&stdout(&output));
    }

    // 5 x 30 XP = 150: one level-up at 100, then 50 / 283.
    assert!(transcript.contains("LEVEL UP! You reached level 2!"));
    assert!(transcript.contains("Achievement Unlocked: Beginner Adventurer!"));
    assert!(transcript.contains("Quest complete: slay dragon 0 (+30 XP)"));

    let status = stdout(&run_cli(&db, &["status"]));
    assert!(status.contains("Level 2  50 / 283 XP"));
    assert!(status.contains("Quests: 0 open, 5 done"));
    assert!(status.contains("Achievements: 1/1"));

    let again = run_cli(&db, &["complete", &ids[0]]);
    assert!(again.status.success());
    assert!(stdout(&again).starts_with("Nothing to complete"));
}

#[test]
fn list_json_and_export_reflect_stored_state() {
    let dir = TempDir::new().unwrap();
    let db = db_in(&dir);
    assert!(run_cli(&db, &["onboard", "--name", "Aria", "--class", "Healer"]).status.success());
    let kept = added_id(&run_cli(&db, &["add", "water plants", "-d", "low"]));
    let dropped = added_id(&run_cli(&db, &["add", "file taxes"]));

    let removed = run_cli(&db, &["delete", &dropped]);
    assert_eq!(stdout(&removed).trim(), format!("Quest removed: {dropped}"));

    let listed: serde_json::Value =
        serde_json::from_str(&stdout(&run_cli(&db, &["list", "--json"]))).unwrap();
    let tasks = listed.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], kept.as_str());
    assert_eq!(tasks[0]["difficulty"], "low");
    assert_eq!(tasks[0]["completed"], false);

    let exported: serde_json::Value =
        serde_json::from_str(&stdout(&run_cli(&db, &["export"]))).unwrap();
    assert_eq!(exported["username"], "Aria");
    assert_eq!(exported["playerClass"], "Healer");
    assert_eq!(exported["level"], 1);
    assert_eq!(exported["xp"], 0);
    assert_eq!(exported["achievements"], serde_json::json!([]));
}

#[test]
fn invalid_difficulty_is_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    let db = db_in(&dir);
    assert!(run_cli(&db, &["onboard", "--name", "Aria"]).status.success());

    let output = run_cli(&db, &["add", "nap", "--difficulty", "extreme"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("extreme"));
}
