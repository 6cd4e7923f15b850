//! Integration tests for the `mic1` CLI.

use mic1_asm as _;
use mic1_core as _;
use proptest as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mic1"))
}

fn create_temp_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn mic1(args: &[&str], dir: &Path) -> Output {
    Command::new(binary_path())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run mic1")
}

#[test]
fn build_simple_program() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "simple.asm", "LODD 4\nPUSH\n.DATA -10\n");
    let output = temp_dir.path().join("simple.bin");

    let result = mic1(
        &[
            "build",
            source.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        temp_dir.path(),
    );

    assert!(result.status.success());
    let binary = fs::read(&output).unwrap();
    assert_eq!(binary, [0x00, 0x04, 0xF4, 0x00, 0xFF, 0xF6]);
}

#[test]
fn build_with_default_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    create_temp_file(temp_dir.path(), "prog.asm", "LOCO 1\n");

    let result = mic1(&["build", "prog.asm"], temp_dir.path());

    assert!(result.status.success());
    let binary = fs::read(temp_dir.path().join("prog.bin")).unwrap();
    assert_eq!(binary, [0x70, 0x01]);
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("1 words"), "stdout: {stdout}");
}

#[test]
fn build_reports_errors_with_line_and_writes_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    create_temp_file(temp_dir.path(), "bad.asm", "LOCO 1\nFOO 2\n");

    let result = mic1(&["build", "bad.asm"], temp_dir.path());

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("line 2: unknown mnemonic 'FOO'"), "stderr: {stderr}");
    assert!(!temp_dir.path().join("bad.bin").exists());
}

#[test]
fn build_missing_input_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = mic1(&["build", "absent.asm"], temp_dir.path());
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("failed to read"), "stderr: {stderr}");
}

#[test]
fn run_prints_state_and_dumped_words() {
    let temp_dir = tempfile::tempdir().unwrap();
    create_temp_file(
        temp_dir.path(),
        "sum.asm",
        "LODD x\nADDD y\nSTOD z\nend: JUMP end\nx: .DATA 7\ny: .DATA 5\nz: .DATA 0\n",
    );

    let result = mic1(
        &["run", "sum.asm", "--steps", "400", "--dump", "z,0x4"],
        temp_dir.path(),
    );

    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("AC=0x000C"), "stdout: {stdout}");
    assert!(stdout.contains("subcycles=400"), "stdout: {stdout}");
    assert!(stdout.contains("[z] m[0x0006] = 0x000C (12)"), "stdout: {stdout}");
    assert!(stdout.contains("[0x4] m[0x0004] = 0x0007 (7)"), "stdout: {stdout}");
    assert!(stdout.contains("faults=0"), "stdout: {stdout}");
}

#[test]
fn run_reports_unmapped_opcode_faults() {
    let temp_dir = tempfile::tempdir().unwrap();
    create_temp_file(temp_dir.path(), "bad_op.asm", ".DATA 0xFF00\nend: JUMP end\n");

    let result = mic1(&["run", "bad_op.asm", "--steps", "40"], temp_dir.path());

    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("faults=1"), "stdout: {stdout}");
}

#[test]
fn run_rejects_unknown_dump_label() {
    let temp_dir = tempfile::tempdir().unwrap();
    create_temp_file(temp_dir.path(), "p.asm", "PUSH\n");

    let result = mic1(&["run", "p.asm", "--dump", "missing"], temp_dir.path());

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("unknown label or address 'missing'"), "stderr: {stderr}");
}

#[test]
fn disasm_prints_listing_with_labels() {
    let temp_dir = tempfile::tempdir().unwrap();
    create_temp_file(
        temp_dir.path(),
        "listing.asm",
        "start: LODD 4\nINSP 3\n.DATA 0xFF00\n",
    );

    let result = mic1(&["disasm", "listing.asm"], temp_dir.path());

    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("0000: 0004  start:"), "stdout: {stdout}");
    assert!(lines[0].ends_with("LODD 4"));
    assert!(lines[1].ends_with("INSP 3"));
    assert!(lines[2].ends_with(".DATA 0xFF00"));
}

#[test]
fn help_shows_usage() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = mic1(&["--help"], temp_dir.path());
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Usage: mic1"));
}

#[test]
fn unknown_command_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = mic1(&["frobnicate"], temp_dir.path());
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("unknown command"));
}
