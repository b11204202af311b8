//! Logging utilities.
//!
//! The engine logs through the `log` facade only; this module centralizes
//! `env_logger` initialization for binaries and tests.

mod init;

pub use init::{LoggingConfig, init_logging};
