use std::fs;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Writes `source` to a scratch `.lox` file and runs the built binary
/// against it in file mode, returning its captured output.
pub fn run_lox(source: &str) -> Output {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!("rslox_test_{}_{}.lox", std::process::id(), n));
    fs::write(&path, source).expect("unable to write scratch script");

    let output = Command::new(env!("CARGO_BIN_EXE_rslox"))
        .arg(&path)
        .output()
        .expect("failed to run the rslox binary");

    let _ = fs::remove_file(&path);
    output
}

pub fn stdout_of(source: &str) -> String {
    let output = run_lox(source);
    assert!(
        output.status.success(),
        "expected success, got {:?}; stderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout was not valid utf-8")
}
