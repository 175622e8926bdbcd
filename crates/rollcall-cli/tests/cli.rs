//! CLI command integration tests.
//! Each test uses a temp directory via ROLLCALL_DATA_DIR for full isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rollcall(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("rollcall").unwrap();
    cmd.env("ROLLCALL_DATA_DIR", data_dir.path());
    cmd
}

fn add_member(dir: &TempDir, name: &str) {
    rollcall(dir)
        .args(["member", "add", name])
        .assert()
        .success()
        .stdout(predicate::str::contains("Member added"));
}

fn check_in(dir: &TempDir, name: &str, at: &str) {
    rollcall(dir)
        .args(["checkin", name, "--at", at])
        .assert()
        .success();
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn checkin_scores_by_lateness() {
    let dir = TempDir::new().unwrap();
    add_member(&dir, "Mina");

    rollcall(&dir)
        .args(["checkin", "Mina", "--at", "2026-02-13T18:20", "--method", "face"])
        .assert()
        .success()
        .stdout(predicate::str::contains("moderately late (+20 min), +4 points"));

    rollcall(&dir)
        .args(["checkin", "mina", "--at", "2026-02-20T17:45"])
        .assert()
        .success()
        .stdout(predicate::str::contains("on time / early (-15 min), +10 points, balance 14"));
}

#[test]
fn second_checkin_same_day_is_rejected() {
    let dir = TempDir::new().unwrap();
    add_member(&dir, "Mina");
    check_in(&dir, "Mina", "2026-02-13T18:00");

    rollcall(&dir)
        .args(["checkin", "Mina", "--at", "2026-02-13T19:30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already checked in on 2026-02-13"));

    let balance = json_stdout(rollcall(&dir).args(["points", "balance", "Mina"]));
    assert_eq!(balance["balance"]["current"], 10);
}

#[test]
fn unknown_member_fails() {
    let dir = TempDir::new().unwrap();
    rollcall(&dir)
        .args(["checkin", "Nobody", "--at", "2026-02-13T18:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("member not found: Nobody"));
}

#[test]
fn redeem_respects_balance() {
    let dir = TempDir::new().unwrap();
    add_member(&dir, "Mina");
    check_in(&dir, "Mina", "2026-02-13T18:00");

    rollcall(&dir)
        .args(["points", "redeem", "Mina", "--label", "Notebook", "--cost", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has 10, needs 50"));

    rollcall(&dir)
        .args(["points", "redeem", "Mina", "--label", "Pen", "--cost", "10", "--servant", "george"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mina redeemed Pen for 10 points, 0 left"));

    rollcall(&dir)
        .args(["points", "redeem", "Mina", "--label", "Sticker", "--cost", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid points amount"));
}

#[test]
fn redeem_catalog_gift_by_id() {
    let dir = TempDir::new().unwrap();
    add_member(&dir, "Mina");
    for day in [6, 13] {
        check_in(&dir, "Mina", &format!("2026-02-{day:02}T18:00"));
    }

    let gifts = json_stdout(rollcall(&dir).args(["gift", "list"]));
    assert_eq!(gifts.as_array().unwrap().len(), 6);
    assert_eq!(gifts[0]["name"], "Pen");

    rollcall(&dir)
        .args(["points", "redeem", "Mina", "--gift", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("redeemed Pen for 20 points"));
}

#[test]
fn gift_list_filters_to_affordable_for_member() {
    let dir = TempDir::new().unwrap();
    add_member(&dir, "Mina");
    for day in [6, 13, 20] {
        check_in(&dir, "Mina", &format!("2026-02-{day:02}T18:00"));
    }

    let gifts = json_stdout(rollcall(&dir).args(["gift", "list", "--member", "Mina"]));
    let names: Vec<&str> = gifts
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Pen", "Chocolate"]);
}

#[test]
fn backup_import_accepts_web_app_config() {
    let dir = TempDir::new().unwrap();
    rollcall(&dir)
        .args(["config", "set", "leaderboard.top_n", "4"])
        .assert()
        .success();

    let file = dir.path().join("export.json");
    std::fs::write(
        &file,
        r#"{"config":{"startTime":"19:30","pointsOnTime":20,"pointsLate15":12,"pointsLate30":6,"pointsLate":2},"users":[]}"#,
    )
    .unwrap();
    rollcall(&dir)
        .args(["backup", "import"])
        .arg(&file)
        .assert()
        .success();

    for (key, expected) in [
        ("meeting.start_time", "19:30\n"),
        ("meeting.points_on_time", "20\n"),
        ("leaderboard.top_n", "4\n"),
    ] {
        rollcall(&dir)
            .args(["config", "get", key])
            .assert()
            .success()
            .stdout(expected);
    }
}

#[test]
fn leaderboard_all_time_ranks_by_points() {
    let dir = TempDir::new().unwrap();
    add_member(&dir, "Mina");
    add_member(&dir, "Sara");
    check_in(&dir, "Mina", "2026-02-13T18:40");
    check_in(&dir, "Sara", "2026-02-13T18:05");
    check_in(&dir, "Sara", "2026-02-20T18:00");

    let board = json_stdout(rollcall(&dir).args(["leaderboard", "--period", "all"]));
    let rows = board.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Sara");
    assert_eq!(rows[0]["points"], 17);
    assert_eq!(rows[1]["rank"], 2);
    assert_eq!(rows[1]["points"], 1);

    let top = json_stdout(rollcall(&dir).args(["leaderboard", "--period", "all", "--top", "1"]));
    assert_eq!(top.as_array().unwrap().len(), 1);
}

#[test]
fn absentees_reports_consecutive_misses() {
    let dir = TempDir::new().unwrap();
    add_member(&dir, "Mina");
    add_member(&dir, "Sara");
    for day in [6, 13, 20] {
        check_in(&dir, "Mina", &format!("2026-02-{day:02}T18:00"));
    }
    check_in(&dir, "Sara", "2026-02-06T18:00");

    let rows = json_stdout(rollcall(&dir).args(["absentees", "--weeks", "2"]));
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Sara");
    assert_eq!(rows[0]["consecutiveMisses"], 2);
    assert_eq!(rows[0]["lastAttended"], "2026-02-06");

    rollcall(&dir)
        .args(["followup", "log", "Sara", "Called, coming next week", "--kind", "call"])
        .assert()
        .success();
    let rows = json_stdout(rollcall(&dir).args(["absentees", "--weeks", "2"]));
    assert_eq!(rows[0]["lastContact"]["note"], "Called, coming next week");
}

#[test]
fn config_set_get_and_validation() {
    let dir = TempDir::new().unwrap();
    rollcall(&dir)
        .args(["config", "set", "meeting.start_time", "19:00"])
        .assert()
        .success();
    rollcall(&dir)
        .args(["config", "get", "meeting.start_time"])
        .assert()
        .success()
        .stdout("19:00\n");

    rollcall(&dir)
        .args(["config", "set", "meeting.points_late", "50"])
        .assert()
        .failure();
    rollcall(&dir)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));

    add_member(&dir, "Mina");
    rollcall(&dir)
        .args(["checkin", "Mina", "--at", "2026-02-13T19:10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slightly late (+10 min), +7 points"));
}

#[test]
fn agenda_add_list_and_reject_inverted_range() {
    let dir = TempDir::new().unwrap();
    rollcall(&dir)
        .args(["agenda", "add", "Hymns", "18:30", "18:00", "--date", "2026-02-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid segment range"));

    rollcall(&dir)
        .args(["agenda", "add", "Sermon", "18:30", "19:15", "--date", "2026-02-13"])
        .assert()
        .success();
    rollcall(&dir)
        .args(["agenda", "add", "Opening prayer", "18:00", "18:30", "--date", "2026-02-13", "--icon", "prayer"])
        .assert()
        .success();

    let segments = json_stdout(rollcall(&dir).args(["agenda", "list", "--date", "2026-02-13"]));
    let titles: Vec<&str> = segments
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Opening prayer", "Sermon"]);
    assert_eq!(segments[0]["startTime"], "18:00");
}

#[test]
fn backup_round_trips_into_fresh_data_dir() {
    let source = TempDir::new().unwrap();
    add_member(&source, "Mina");
    check_in(&source, "Mina", "2026-02-13T18:00");
    rollcall(&source)
        .args(["config", "set", "leaderboard.top_n", "3"])
        .assert()
        .success();

    let file = source.path().join("backup.json");
    rollcall(&source)
        .args(["backup", "export", "--output"])
        .arg(&file)
        .assert()
        .success();

    let target = TempDir::new().unwrap();
    rollcall(&target)
        .args(["backup", "import"])
        .arg(&file)
        .assert()
        .success();

    let balance = json_stdout(rollcall(&target).args(["points", "balance", "Mina"]));
    assert_eq!(balance["balance"]["earned"], 10);
    rollcall(&target)
        .args(["config", "get", "leaderboard.top_n"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn completions_generate() {
    let dir = TempDir::new().unwrap();
    rollcall(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rollcall"));
}
