//! Integration tests for the `slots` CLI binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn slots() -> Command {
    let mut cmd = Command::cargo_bin("slots").unwrap();
    cmd.env_remove("SLOTS_LOG");
    cmd
}

/// Run the command, expect success, and parse stdout as JSON.
fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout must be JSON")
}

fn slot<'a>(slots: &'a Value, time: &str) -> &'a Value {
    slots
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["time"] == time)
        .unwrap_or_else(|| panic!("no slot at {}", time))
}

// ─────────────────────────────────────────────────────────────────────────────
// grid
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn grid_from_file() {
    let out = run_json(slots().args([
        "grid",
        "--date",
        "2024-06-10",
        "--barber",
        "barber1",
        "--duration",
        "30",
        "-i",
        &fixture("appointments.json"),
    ]));

    assert_eq!(out.as_array().unwrap().len(), 20);
    assert_eq!(slot(&out, "14:00")["available"], false);
    assert_eq!(slot(&out, "14:00")["appointmentId"], "1");
    assert_eq!(slot(&out, "14:30")["available"], false);
    assert_eq!(slot(&out, "15:00")["available"], true);
    // Cancelled appointment 3 and barber2's appointment 4 do not block.
    assert_eq!(slot(&out, "09:00")["available"], true);
    assert_eq!(slot(&out, "08:00")["available"], true);
}

#[test]
fn grid_from_stdin() {
    let input = std::fs::read_to_string(fixture("appointments.json")).unwrap();

    let out = run_json(
        slots()
            .args(["grid", "--date", "2024-06-10", "--duration", "30"])
            .write_stdin(input),
    );
    assert_eq!(slot(&out, "14:00")["appointmentId"], "1");
}

#[test]
fn grid_with_empty_stdin_is_all_free() {
    let out = run_json(
        slots()
            .args(["grid", "--date", "2024-06-10", "--duration", "45"])
            .write_stdin(""),
    );
    let all = out.as_array().unwrap();
    assert_eq!(all.len(), 20);
    assert!(all.iter().all(|s| s["available"] == true));
    assert!(all.iter().all(|s| s.get("appointmentId").is_none()));
}

#[test]
fn grid_free_only_drops_occupied_slots() {
    let out = run_json(slots().args([
        "grid",
        "--date",
        "2024-06-10",
        "--duration",
        "30",
        "--free-only",
        "-i",
        &fixture("appointments.json"),
    ]));

    let times: Vec<&str> = out
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    assert_eq!(times.len(), 18);
    assert!(!times.contains(&"14:00"));
    assert!(!times.contains(&"14:30"));
}

#[test]
fn grid_interval_rule_blocks_service_running_into_appointment() {
    let args = |rule: &'static str| {
        vec![
            "grid".to_string(),
            "--date".to_string(),
            "2024-06-10".to_string(),
            "--duration".to_string(),
            "60".to_string(),
            "--rule".to_string(),
            rule.to_string(),
            "-i".to_string(),
            fixture("appointments.json"),
        ]
    };

    let narrow = run_json(slots().args(args("start-within")));
    assert_eq!(slot(&narrow, "13:30")["available"], true);

    let wide = run_json(slots().args(args("interval")));
    assert_eq!(slot(&wide, "13:30")["available"], false);
    assert_eq!(slot(&wide, "13:30")["appointmentId"], "1");
}

#[test]
fn grid_uses_configured_hours_and_service() {
    let out = run_json(slots().args([
        "--config",
        &fixture("shop.toml"),
        "grid",
        "--date",
        "2024-06-11",
        "--service",
        "combo",
        "-i",
        &fixture("appointments.json"),
    ]));

    // 09:00-12:00 hourly; appointment 2 is 10:00-10:30 on the 11th and the
    // 90 minute combo from 09:00 runs into it under the configured interval rule.
    let times: Vec<&str> = out
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    assert_eq!(times, vec!["09:00", "10:00", "11:00"]);
    assert_eq!(slot(&out, "09:00")["available"], false);
    assert_eq!(slot(&out, "10:00")["available"], false);
    assert_eq!(slot(&out, "11:00")["available"], true);
}

#[test]
fn grid_rejects_non_positive_duration() {
    slots()
        .args(["grid", "--date", "2024-06-10", "--duration", "-30"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be positive"));

    slots()
        .args(["grid", "--date", "2024-06-10", "--duration", "0"])
        .write_stdin("[]")
        .assert()
        .failure();
}

#[test]
fn grid_rejects_unknown_barber_and_service() {
    slots()
        .args(["grid", "--date", "2024-06-10", "--barber", "nobody"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown barber"));

    slots()
        .args(["grid", "--date", "2024-06-10", "--service", "99"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown service"));
}

#[test]
fn grid_rejects_service_of_another_barber() {
    slots()
        .args([
            "--config",
            &fixture("shop.toml"),
            "grid",
            "--date",
            "2024-06-11",
            "--barber",
            "barber1",
            "--service",
            "beard",
        ])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown service for barber barber1: beard"));

    let out = run_json(
        slots()
            .args([
                "--config",
                &fixture("shop.toml"),
                "grid",
                "--date",
                "2024-06-11",
                "--barber",
                "barber2",
                "--service",
                "beard",
            ])
            .write_stdin("[]"),
    );
    assert_eq!(out.as_array().unwrap().len(), 20);
}

#[test]
fn grid_rejects_duration_past_the_representable_range() {
    slots()
        .args(["grid", "--date", "2024-06-10", "--duration", "200000000000"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn calendar_appointments_carry_end_time() {
    let out = run_json(slots().args([
        "calendar",
        "--month",
        "2024-06",
        "--today",
        "2024-06-10",
        "-i",
        &fixture("appointments.json"),
    ]));
    let afternoon = &out[9]["appointments"][2];
    assert_eq!(afternoon["id"], "1");
    assert_eq!(afternoon["endTime"], "15:00");
}

#[test]
fn grid_rejects_malformed_appointments() {
    slots()
        .args([
            "grid",
            "--date",
            "2024-06-10",
            "-i",
            &fixture("bad_appointments.json"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid appointments"));
}

#[test]
fn grid_rejects_invalid_date() {
    slots()
        .args(["grid", "--date", "2024-02-30"])
        .write_stdin("[]")
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// calendar
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn calendar_month_view() {
    let out = run_json(slots().args([
        "calendar",
        "--month",
        "2024-06",
        "--today",
        "2024-06-10",
        "-i",
        &fixture("appointments.json"),
    ]));

    let days = out.as_array().unwrap();
    assert_eq!(days.len(), 30);

    let tenth = &days[9];
    assert_eq!(tenth["date"], "2024-06-10");
    assert_eq!(tenth["isToday"], true);
    assert_eq!(tenth["isPast"], false);
    // Appointments 1, 3 and 4, sorted by start time.
    let ids: Vec<&str> = tenth["appointments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["4", "3", "1"]);

    assert_eq!(days[0]["isPast"], true);
}

#[test]
fn calendar_filters_by_barber() {
    let out = run_json(slots().args([
        "calendar",
        "--month",
        "2024-06",
        "--today",
        "2024-06-01",
        "--barber",
        "barber2",
        "-i",
        &fixture("appointments.json"),
    ]));

    let total: usize = out
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["appointments"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 1);
}

#[test]
fn calendar_rejects_bad_month() {
    for bad in ["2024-13", "June", "2024"] {
        slots()
            .args(["calendar", "--month", bad, "--today", "2024-06-01"])
            .write_stdin("[]")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid month"));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// dates
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn dates_with_default_settings() {
    let out = run_json(slots().args(["dates", "--from", "2024-06-10"]));

    let dates = out.as_array().unwrap();
    assert_eq!(dates.len(), 26);
    assert_eq!(dates[0], "2024-06-10");
    assert!(!dates.iter().any(|d| d == "2024-06-16"));
}

#[test]
fn dates_with_configured_working_days() {
    let out = run_json(slots().args([
        "--config",
        &fixture("shop.toml"),
        "dates",
        "--from",
        "2024-06-10",
    ]));

    // Seven days from Monday the 10th, Tuesday to Saturday only.
    assert_eq!(
        out,
        serde_json::json!(["2024-06-11", "2024-06-12", "2024-06-13", "2024-06-14", "2024-06-15"])
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// validate and config
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn validate_counts_records() {
    slots()
        .args(["validate", "-i", &fixture("appointments.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 valid appointments"));
}

#[test]
fn validate_reports_bad_time() {
    slots()
        .args(["validate", "-i", &fixture("bad_appointments.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("14h00"));
}

#[test]
fn missing_config_file_fails() {
    slots()
        .args(["--config", "/nonexistent/shop.toml", "dates", "--from", "2024-06-10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load settings"));
}

#[test]
fn missing_input_file_fails() {
    slots()
        .args(["validate", "-i", "/nonexistent/appointments.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}
