//! CLI command handlers for the Shingetsu layout tools.
//!
//! Every command is headless and scriptable: human-readable output by
//! default, `--json` where a report is produced, and exit codes from
//! [`common::ExitCode`].

pub mod check;
pub mod common;
pub mod config;
pub mod export;
pub mod import;
pub mod init;
pub mod show;
pub mod validate;

// Re-export types used by main.rs and tests
pub use check::CheckArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use export::ExportArgs;
pub use import::ImportArgs;
pub use init::InitArgs;
pub use show::ShowArgs;
pub use validate::ValidateArgs;
