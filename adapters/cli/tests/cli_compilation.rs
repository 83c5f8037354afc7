use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "deck-defence"])
        .status()
        .expect("failed to invoke cargo check for deck-defence CLI binary");

    assert!(status.success(), "cargo check --bin deck-defence should succeed");
}

#[test]
fn headless_run_reports_the_final_wave() {
    let scores = std::env::temp_dir().join(format!(
        "deck-defence-cli-test-{}.json",
        std::process::id()
    ));
    let output = Command::new(env!("CARGO_BIN_EXE_deck-defence"))
        .args(["--waves", "2", "--seed", "7", "--scores"])
        .arg(&scores)
        .output()
        .expect("failed to run deck-defence");
    let _ = std::fs::remove_file(&scores);

    assert!(output.status.success(), "headless run should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("wave 2 |"), "missing HUD line: {stdout}");
    assert!(stdout.contains("finished on wave 2"), "missing summary: {stdout}");
}
