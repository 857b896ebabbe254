//! Shingetsu Layout Tools - command-line front end
//!
//! Exports the Shingetsu kana layout to keyboard_analyzer, hazkey and
//! Karabiner-Elements files and checks exported files for consistency.

use clap::{Parser, Subcommand};
use shingetsu::cli::{
    CheckArgs, CliResult, ConfigArgs, ExitCode, ExportArgs, ImportArgs, InitArgs, ShowArgs,
    ValidateArgs,
};
use shingetsu::logging;

/// Shingetsu (新月配列) layout tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export analyzer JSON, romaji tables and Karabiner rules
    Export(ExportArgs),
    /// Validate a layout file
    Validate(ValidateArgs),
    /// Check exported files against each other
    Check(CheckArgs),
    /// Print layout grids and statistics
    Show(ShowArgs),
    /// Rebuild a layout file from analyzer JSON
    Import(ImportArgs),
    /// Write the built-in layout to a file
    Init(InitArgs),
    /// Show or change configuration
    Config(ConfigArgs),
}

impl Commands {
    fn execute(&self) -> CliResult<()> {
        match self {
            Self::Export(args) => args.execute(),
            Self::Validate(args) => args.execute(),
            Self::Check(args) => args.execute(),
            Self::Show(args) => args.execute(),
            Self::Import(args) => args.execute(),
            Self::Init(args) => args.execute(),
            Self::Config(args) => args.execute(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    tracing::debug!(command = ?cli.command, "Starting");

    match cli.command.execute() {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code);
        }
    }
}
