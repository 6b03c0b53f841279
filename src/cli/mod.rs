// CLI module
// Command-line arguments, the main menu and the interactive session driver

mod args;
pub mod driver;
pub mod menu;

pub use args::CliArgs;
pub use driver::{DriverError, SessionDriver, SessionOutcome};
pub use menu::MenuChoice;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments or `--help`), clap prints the error
/// or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
