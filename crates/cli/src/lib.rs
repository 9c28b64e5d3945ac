mod board;
mod eclass;
mod parse;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "crosscope",
    version,
    about = "ChromeOS developer tooling: ebuild language support and compilation-database generation",
    long_about = "Crosscope provides ebuild/Portage language features (hover documentation, \
                  eclass and cros-workon navigation) and generates C++ compilation databases \
                  for Chromium, platform2 and EC trees. The primary entry point is the LSP \
                  server; the remaining commands expose the underlying library for debugging."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the Language Server Protocol (LSP) server on stdio
    Lsp,
    /// Parse an ebuild or eclass file and print the result as JSON
    Parse {
        /// Path to the .ebuild or .eclass file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Resolve an eclass name against the checkout's overlays
    Eclass {
        /// Eclass name without the .eclass suffix, e.g. cros-workon
        #[arg(value_name = "NAME")]
        name: String,
        /// Checkout root; discovered from the working directory when omitted
        #[arg(long, value_name = "PATH")]
        checkout: Option<PathBuf>,
    },
    /// Show the identity derived from a board name or "host"
    Board {
        #[arg(value_name = "BOARD")]
        value: String,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Lsp => "lsp",
        _ => "cli",
    };
    // Stderr logging would corrupt the LSP's stdio transport
    let to_stderr = !matches!(cli.command, Commands::Lsp);
    let _guard = crosscope_core::logging::init_logging(component, to_stderr);

    match cli.command {
        Commands::Lsp => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(crosscope_lsp::run_server())
        }
        Commands::Parse { file } => parse::run(&file),
        Commands::Eclass { name, checkout } => eclass::run(&name, checkout),
        Commands::Board { value } => board::run(&value),
    }
}
