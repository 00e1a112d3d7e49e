//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Encrypt login passwords and hidden fields in a password-manager JSON export.
///
/// The sealed file is an at-rest/transfer format only: the password manager
/// will not import it as a normal export.
#[derive(Debug, Parser)]
#[command(name = "export-seal")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").args(["encrypt", "decrypt", "inspect"])))]
pub struct Cli {
    /// Path to the JSON export (or a previously sealed file)
    pub input: PathBuf,

    /// Seal the export (default)
    #[arg(long)]
    pub encrypt: bool,

    /// Restore a sealed export (requires --keyfile)
    #[arg(long)]
    pub decrypt: bool,

    /// Report how many target values are sealed, without a key
    #[arg(long)]
    pub inspect: bool,

    /// Key file to use (required for --decrypt; reused or created on encrypt)
    #[arg(long, value_name = "PATH")]
    pub keyfile: Option<PathBuf>,

    /// Output JSON path (default derived from the input name)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Tag used in default output file names
    #[arg(long)]
    pub tag: Option<String>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

/// What a run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Encrypt,
    Decrypt,
    Inspect,
}

impl Cli {
    /// Resolve the selected mode; encrypt when no mode flag is given.
    pub fn action(&self) -> Action {
        if self.decrypt {
            Action::Decrypt
        } else if self.inspect {
            Action::Inspect
        } else {
            Action::Encrypt
        }
    }
}
