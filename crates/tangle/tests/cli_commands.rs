#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "tangle-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn tangle(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tangle"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .output()
        .expect("tangle should run")
}

fn tangle_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tangle"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("tangle should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("stdin should accept input");
    child.wait_with_output().expect("tangle should finish")
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn compile_file_outputs_bytecode() {
    let dir = unique_temp_dir("compile");
    let path = dir.join("show.tngl");
    std::fs::write(&path, "$evt1 10.5% frame").expect("source should be writable");

    let output = tangle(&["compile", path.to_str().expect("utf-8 path")]);
    assert!(output.status.success(), "{output:?}");
    let payload = json(&output);
    let bytecode = payload["bytecode"].as_str().expect("hex bytecode");
    assert!(bytecode.starts_with("d86576743100"));
    assert_eq!(payload["diagnostics"], serde_json::json!([]));
    assert_eq!(payload["size"].as_u64(), Some(bytecode.len() as u64 / 2));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn compile_errors_exit_with_data_invalid() {
    let output = tangle_with_stdin(&["compile", "-"], "frame 7 clip");
    assert_eq!(output.status.code(), Some(60));
    let payload = json(&output);
    assert_eq!(payload["diagnostics"][0]["severity"], "error");
    assert_eq!(payload["diagnostics"][0]["token"], "7");
}

#[test]
fn compile_missing_file_fails() {
    let output = tangle(&["compile", "/nonexistent/show.tngl"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed reading"));
}

#[test]
fn tokenize_skips_whitespace_by_default() {
    let output = tangle_with_stdin(&["tokenize", "-"], "animFill(1s, #ff0000)");
    assert!(output.status.success());
    let kinds: Vec<String> = json(&output)
        .as_array()
        .expect("token array")
        .iter()
        .map(|token| token["kind"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        kinds,
        [
            "identifier",
            "punctuation",
            "timestamp",
            "punctuation",
            "color",
            "punctuation"
        ]
    );
}

#[test]
fn emitted_payload_decodes_back() {
    let emitted = tangle(&["emit", "--label", "evt1", "--percentage", "-42.5", "--at", "1000"]);
    assert!(emitted.status.success(), "{emitted:?}");
    let payload = json(&emitted)["payload"]
        .as_str()
        .expect("hex payload")
        .to_string();

    let decoded = tangle(&["decode", &payload]);
    assert!(decoded.status.success(), "{decoded:?}");
    let messages = json(&decoded);
    let event = &messages[0];
    assert_eq!(event["kind"], "event");
    assert_eq!(event["label"], "evt1");
    assert_eq!(event["type"], "percentage");
    assert_eq!(event["value"], -42.5);
    assert_eq!(event["timestamp"], 1000);
    assert_eq!(event["id"], 255);
}

#[test]
fn decode_rejects_truncated_event() {
    let output = tangle(&["decode", "b9"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn decode_rejects_bad_hex() {
    let output = tangle(&["decode", "xyz"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn envinfo_reports_version() {
    let output = tangle(&["envinfo"]);
    assert!(output.status.success());
    let payload = json(&output);
    assert_eq!(
        payload.get("version").and_then(|v| v.as_str()),
        Some(env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn decode_rejects_non_ascii_input() {
    let output = tangle(&["decode", "a\u{e9}b"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked"), "{stderr}");
}
