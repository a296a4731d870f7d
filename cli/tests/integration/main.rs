//! Integration tests for the jitp CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! None of them reach AWS: every case fails or finishes before the first
//! network call.

mod cli_tests;

use assert_cmd::Command;

/// The binary with a clean environment so host AWS/JITP variables cannot leak in.
pub fn jitp() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jitp"));
    cmd.env_clear().env("NO_COLOR", "1");
    cmd
}
