use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "authaudit",
    version,
    about = "Audit access-control consistency of a composed schema graph"
)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the audit and exit non-zero when any error is found.
    Check {
        graph: PathBuf,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Accept a silent interface whose implementations agree on one requirement.
        #[arg(long)]
        lenient_interfaces: bool,
    },
    /// List the requirements extracted from the graph.
    Requirements { graph: PathBuf },
}
