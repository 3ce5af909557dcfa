//! Integration tests for CLI argument handling
//!
//! Tests the flag surface of the daemon binary from the outside. Anything
//! that would start a real synchronization pass (and hit the network) is
//! deliberately avoided; only argument validation paths run the binary.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_horocache"))
        .args(args)
        .output()
        .expect("Failed to execute horocache")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("horocache"), "Help should mention horocache");
    assert!(
        stdout.contains("interval-mins"),
        "Help should mention --interval-mins"
    );
    assert!(stdout.contains("data-file"), "Help should mention --data-file");
    assert!(stdout.contains("once"), "Help should mention --once");
    assert!(stdout.contains("precache"), "Help should mention --precache");
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("horocache"));
}

#[test]
fn test_zero_interval_prints_error_and_exits() {
    // Validation fails before any network or disk access
    let output = run_cli(&["--interval-mins", "0"]);
    assert!(!output.status.success(), "Expected a zero interval to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid interval"),
        "Should explain the invalid interval: {}",
        stderr
    );
}

#[test]
fn test_non_numeric_interval_is_rejected_by_clap() {
    let output = run_cli(&["--interval-mins", "soon"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid value") || stderr.contains("soon"),
        "clap should reject the non-numeric interval: {}",
        stderr
    );
}

#[test]
fn test_unknown_flag_is_rejected() {
    let output = run_cli(&["--frobnicate"]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use std::time::Duration;

    use clap::Parser;
    use horocache::cli::{Cli, StartupConfig};

    #[test]
    fn test_interval_converts_to_seconds() {
        let cli = Cli::parse_from(["horocache", "--interval-mins", "15"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.interval, Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_data_file_is_passed_through() {
        let cli = Cli::parse_from(["horocache", "--data-file", "/var/lib/horocache/data.json"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.data_file.as_deref(),
            Some(std::path::Path::new("/var/lib/horocache/data.json"))
        );
    }

    #[test]
    fn test_once_and_precache_default_off() {
        let cli = Cli::parse_from(["horocache"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(!config.run_once);
        assert!(!config.precache);
    }
}
