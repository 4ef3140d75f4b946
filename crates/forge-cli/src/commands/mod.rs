//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod build;
pub mod plugins;
pub mod preview;
pub mod serve;

/// Forge - agent project synthesizer
#[derive(Parser)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an agent project from a character file
    Build(build::BuildArgs),

    /// Print the files a character file would generate
    Preview(preview::PreviewArgs),

    /// Run the agent behind its front-end plugins until Ctrl-C
    Serve(serve::ServeArgs),

    /// List the front-end plugins `serve` can run
    Plugins,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Build(args) => build::execute(args),
            Commands::Preview(args) => preview::execute(args),
            Commands::Serve(args) => serve::execute(args).await,
            Commands::Plugins => {
                plugins::execute();
                Ok(())
            }
        }
    }
}
