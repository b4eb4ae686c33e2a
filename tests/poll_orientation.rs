//! Runs the `poll_orientation` binary against settings that point at a
//! BNO055 on a bus that does not exist.
#![cfg(target_os = "linux")]

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn work_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "poll-orientation-{}-{}",
        tag,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_in(dir: &Path) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_poll_orientation"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    (
        output.status.success(),
        String::from_utf8(output.stdout).unwrap(),
    )
}

#[test]
fn init_failure_exits_cleanly_with_one_line() {
    let dir = work_dir("init");
    fs::write(dir.join("RTIMULib.ini"), "IMUType=10\nI2CBus=250\n").unwrap();

    let (success, stdout) = run_in(&dir);
    assert!(success);
    assert_eq!(stdout, "IMU Init Failed\n");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn bad_settings_lines_do_not_stop_startup() {
    let dir = work_dir("bad-line");
    fs::write(
        dir.join("RTIMULib.ini"),
        "IMUType=10\nSomething bogus\nI2CBus=250\nI2CSlaveAddress=0x200\n",
    )
    .unwrap();

    let (success, stdout) = run_in(&dir);
    assert!(success);
    assert_eq!(stdout, "IMU Init Failed\n");

    fs::remove_dir_all(&dir).unwrap();
}
