//! Data frame transform config tooling.
//!
//! Library half of the `dft-core` binary: logging setup, exit codes, and the
//! reports the CLI prints.

pub mod exit_codes;
pub mod logging;
pub mod report;
