use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

// Use the dev-dependency crate for helpers
use test_helpers::*;

fn headless() -> Command {
    let mut cmd = Command::cargo_bin("pointer-trace").unwrap();
    cmd.arg("--headless").env("RUST_LOG", "warn");
    cmd
}

#[test]
fn traces_two_pointer_downs_in_full() {
    let input = "0 WM_POINTERDOWN 0x20170003 10,20\n10 WM_POINTERDOWN 0x20170003 10,20\n";
    let output = headless()
        .args(["--terse", "false", "--throttle", "false", "--motion-events", "true"])
        .write_stdin(input)
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "Command exited with non-zero status: {:?}",
        output.status
    );

    let expected_entry = "\n\
        WM_POINTERDOWN(wParam: 0x20170003, lParam: 0x0014000a)\n\
        ; - GET_POINTERID_WPARAM(wParam) = 3  pointer identifier\n\
        ; - PointerState(wParam) = NEW INRANGE INCONTACT PRIMARY [X| | | | ]  pointer state\n\
        ; - GET_X_LPARAM(lParam) = 10  x coordinate\n\
        ; - GET_Y_LPARAM(lParam) = 20  y coordinate\n";
    assert_eq!(String::from_utf8_lossy(&output.stdout), expected_entry.repeat(2));
}

#[test]
fn default_toggles_hide_motion() {
    let input = [
        record_line(0, &pointer_down(1, 0, 0)),
        record_line(8, &pointer_update(1, 1, 1)),
        record_line(16, &pointer_update(1, 2, 2)),
        record_line(24, &pointer_up(1, 2, 2)),
    ]
    .join("\n");

    headless()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("WM_POINTERDOWN("))
        .stdout(predicate::str::contains("WM_POINTERUP("))
        .stdout(predicate::str::contains("WM_POINTERUPDATE").not());
}

#[test]
fn throttling_reports_dropped_messages() {
    let input = "0 WM_MOUSEWHEEL 0x00780000 5,5\n\
                 100 WM_MOUSEWHEEL 0x00780000 5,5\n\
                 200 WM_MOUSEWHEEL 0x00780000 5,5\n\
                 700 WM_MOUSEWHEEL 0x00780000 5,5\n";

    headless()
        .args(["--throttle", "true"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("; (throttled 2 previous WM_MOUSEWHEEL messages)"))
        .stderr(predicate::str::contains("Events Throttled:   2"));
}

#[test]
fn malformed_records_are_skipped() {
    let input = "# header comment\n\
                 garbage\n\
                 0 WM_NOT_A_MESSAGE 0 0\n\
                 5 WM_POINTERUP 0x1 0\n";

    headless()
        .write_stdin(input)
        .assert()
        .success()
        .stdout("WM_POINTERUP(wParam: 0x00000001, lParam: 0x00000000)\n")
        .stderr(predicate::str::contains("Skipping malformed record"));
}

#[test]
fn non_utf8_line_is_skipped_and_tracing_continues() {
    let input: &[u8] = b"0 WM_POINTERDOWN 0x3 10,20\n\xff\xfe bogus\n10 WM_POINTERUP 0x3 10,20\n";

    headless()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("WM_POINTERUP(wParam: 0x00000003, lParam: 0x0014000a)"))
        .stderr(predicate::str::contains("not valid UTF-8"));
}

#[test]
fn stats_json_on_exit() {
    let input = "0 WM_POINTERDEVICECHANGE 1 0\n250 0x0245 0x1 0\n";
    let output = headless()
        .arg("--stats-json")
        .write_stdin(input)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr is not valid JSON");
    assert_eq!(json["stats"]["events_processed"], 2);
    assert_eq!(json["stats"]["events_logged"], 1);
    assert_eq!(json["stats"]["events_motion_skipped"], 1);
    assert_eq!(json["meta"]["runtime_ms"], 250);
    assert_eq!(json["meta"]["toggles"]["terse"], true);
    assert_eq!(json["per_kind_stats"]["WM_POINTERUPDATE"]["motion_skipped"], 1);
}

#[test]
fn empty_input_prints_empty_summary() {
    headless()
        .write_stdin("")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("--- No traced messages ---"));
}

#[test]
fn json_log_format_writes_one_object_per_line() {
    let output = headless()
        .env("RUST_LOG", "pointer_trace=info")
        .args(["--log-format", "json"])
        .write_stdin("0 WM_POINTERUP 0x1 0\n")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let events: Vec<Value> = stderr
        .lines()
        .filter(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).expect("log line is JSON"))
        .collect();
    assert!(events
        .iter()
        .any(|e| e["fields"]["message"] == "pointer-trace starting" && e["level"] == "INFO"));
}

#[test]
fn rejects_non_boolean_toggle_value() {
    headless()
        .args(["--terse", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[cfg(not(windows))]
#[test]
fn window_shell_requires_windows() {
    Command::cargo_bin("pointer-trace")
        .unwrap()
        .env("RUST_LOG", "warn")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--headless"));
}
