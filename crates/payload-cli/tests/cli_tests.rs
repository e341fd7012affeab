//! Integration tests for the `payload` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the encode, decode,
//! wrap and track subcommands through the actual binary, including stdin/stdout
//! piping, file I/O and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

const CLICK_SCHEMA: &str = "iglu:com.dating-demo/dating-demo-button-click/jsonschema/1-0-0";

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn payload() -> Command {
    Command::cargo_bin("payload").unwrap()
}

/// A per-test scratch file in the system temp directory.
fn scratch(name: &str) -> String {
    let path = std::env::temp_dir().join(format!("payload-cli-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_file(&path);
    path.to_string_lossy().into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Encode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn encode_stdin_to_stdout_is_canonical() {
    payload()
        .arg("encode")
        .write_stdin(r#"{ "rank" : 3 , "score" : 3.0, "ok": [ true, null ] }"#)
        .assert()
        .success()
        .stdout(r#"{"rank":3,"score":3.0,"ok":[true,null]}"#.to_string() + "\n");
}

#[test]
fn encode_file_keeps_member_order() {
    payload()
        .args(["encode", "-i", fixture("button_click.json").as_str()])
        .assert()
        .success()
        .stdout(
            r#"{"button_id":"checkout","button_text":"Buy Now","screen_name":"cart"}"#.to_string()
                + "\n",
        );
}

#[test]
fn encode_file_to_file() {
    let output_path = scratch("encode.json");

    payload()
        .args(["encode", "-i", fixture("profile.json").as_str(), "-o", output_path.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    assert!(content.starts_with(r#"{"profile_id":"p-17","score":3.0,"rank":3"#));

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn encode_pretty_is_valid_json() {
    let output = payload()
        .args(["encode", "--pretty", "-i", fixture("profile.json").as_str()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("\n  \"profile_id\": \"p-17\""));
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["location"]["city"], "Lisbon");
}

#[test]
fn encode_malformed_input_reports_path() {
    payload()
        .args(["encode", "-i", fixture("truncated.json").as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode JSON input"))
        .stderr(predicate::str::contains("$.user.tags[2]"));
}

#[test]
fn encode_missing_file_fails() {
    payload()
        .args(["encode", "-i", "/nonexistent/input.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn max_depth_is_enforced() {
    payload()
        .args(["--max-depth", "2", "encode"])
        .write_stdin("[[[1]]]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nesting deeper than 2 at $[0][0]"));
}

#[test]
fn encode_pretty_honours_max_depth() {
    let input = format!("{}1{}", "[".repeat(200), "]".repeat(200));

    payload()
        .args(["--max-depth", "300", "encode", "--pretty"])
        .write_stdin(input.clone())
        .assert()
        .success();

    payload()
        .args(["encode", "--pretty"])
        .write_stdin(input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nesting deeper than 128"));
}

#[test]
fn encode_invalid_utf8_is_a_decode_error() {
    payload()
        .arg("encode")
        .write_stdin(b"\"\xff\"".to_vec())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode JSON input"))
        .stderr(predicate::str::contains("unrecognized JSON at $: invalid UTF-8"));
}

#[test]
fn decode_invalid_utf8_file_is_a_decode_error() {
    let input_path = scratch("latin1.json");
    std::fs::write(&input_path, b"{\"name\":\"Jos\xe9\"}").unwrap();

    payload()
        .args(["decode", "-i", input_path.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid UTF-8"));

    let _ = std::fs::remove_file(&input_path);
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decode_lists_typed_nodes() {
    let expected = [
        "$\tobject\t{\"rank\":3,\"score\":3.0,\"tags\":[\"x\",null]}",
        "$.rank\tint\t3",
        "$.score\tdouble\t3.0",
        "$.tags\tarray\t[\"x\",null]",
        "$.tags[0]\tstring\t\"x\"",
        "$.tags[1]\tnull\tnull",
        "",
    ]
    .join("\n");

    payload()
        .arg("decode")
        .write_stdin(r#"{"rank":3,"score":3.0,"tags":["x",null]}"#)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn decode_quotes_odd_keys_in_paths() {
    payload()
        .arg("decode")
        .write_stdin(r#"{"two words":true}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("$[\"two words\"]\tbool\ttrue"));
}

#[test]
fn decode_scalar_document() {
    payload()
        .arg("decode")
        .write_stdin("-0")
        .assert()
        .success()
        .stdout("$\tint\t0\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Wrap subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn wrap_emits_envelope() {
    let expected = format!(
        r#"{{"schema":"{CLICK_SCHEMA}","data":{{"button_id":"checkout","button_text":"Buy Now","screen_name":"cart"}}}}"#
    ) + "\n";

    payload()
        .args(["wrap", "--schema", CLICK_SCHEMA, "-i", fixture("button_click.json").as_str()])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn wrap_rejects_bad_schema() {
    payload()
        .args(["wrap", "--schema", "com.acme/click"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --schema"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Track subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn track_with_config_prints_payload_line() {
    let output = payload()
        .args([
            "track",
            "--schema",
            CLICK_SCHEMA,
            "--config",
            fixture("tracker.json").as_str(),
            "-i",
            fixture("button_click.json").as_str(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 1);

    let payload: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(payload["e"], "ue");
    assert_eq!(payload["tna"], "datingDemoTracker");
    assert_eq!(payload["aid"], "snowplow-dating-demo");
    assert_eq!(payload["p"], "mob");

    let ue_pr: serde_json::Value =
        serde_json::from_str(payload["ue_pr"].as_str().unwrap()).unwrap();
    assert_eq!(ue_pr["data"]["schema"], CLICK_SCHEMA);
    assert_eq!(ue_pr["data"]["data"]["button_text"], "Buy Now");
    assert!(payload.get("co").is_none());
}

#[test]
fn track_flags_override_config() {
    let output = payload()
        .args([
            "track",
            "--schema",
            CLICK_SCHEMA,
            "--config",
            fixture("tracker.json").as_str(),
            "--namespace",
            "override",
            "--app-id",
            "other-app",
        ])
        .write_stdin(r#"{"button_id":"x","button_text":"y","screen_name":"z"}"#)
        .output()
        .unwrap();
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["tna"], "override");
    assert_eq!(payload["aid"], "other-app");
}

#[test]
fn track_without_config_uses_defaults() {
    let output = payload()
        .args(["track", "--schema", CLICK_SCHEMA])
        .write_stdin("{}")
        .output()
        .unwrap();
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["tna"], "payload");
    assert_eq!(payload["aid"], "payload-cli");
}

#[test]
fn track_rejects_invalid_config() {
    let config = scratch("bad-config.json");
    std::fs::write(&config, r#"{"namespace":"ns"}"#).unwrap();

    payload()
        .args(["track", "--schema", CLICK_SCHEMA, "--config", config.as_str()])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));

    let _ = std::fs::remove_file(&config);
}

#[test]
fn verbose_logs_to_stderr_only() {
    let output = payload()
        .args(["-v", "track", "--schema", CLICK_SCHEMA])
        .write_stdin("{}")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("tracker initialized"));
    assert!(stderr.contains("tracked event"));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
}
