//! Project generation command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use forge_codegen::{write_artifact, Artifact, Synthesizer};
use forge_core::requirement;

use crate::output;

#[derive(Args)]
pub struct BuildArgs {
    /// Character file describing the agent (JSON)
    #[arg(short, long)]
    pub character: PathBuf,

    /// Directory the project is written to
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Preview without writing files
    #[arg(long)]
    pub dry_run: bool,
}

/// Load, validate and synthesize the project described by a character file.
pub(crate) fn synthesize(character: &Path) -> Result<(forge_core::ValidatedRequirement, Artifact)> {
    let req = requirement::load(character)
        .with_context(|| format!("Failed to read character file {}", character.display()))?;
    let spec = requirement::validate(&req)?;
    let artifact = Synthesizer::new()?.build_validated(&spec)?;
    Ok((spec, artifact))
}

pub fn execute(args: BuildArgs) -> Result<()> {
    let (spec, artifact) = synthesize(&args.character)?;

    if args.dry_run {
        println!(
            "{} Would generate {} files in {}:",
            "→".dimmed(),
            artifact.len(),
            args.out.display()
        );
        for file in artifact.files() {
            output::print_file(file, Some(&args.out));
        }
        return Ok(());
    }

    let written = write_artifact(&artifact, &args.out)?;
    println!(
        "{} Generated agent project: {}",
        "✓".green().bold(),
        spec.name.bold()
    );
    for path in &written {
        println!("  {}", path.display());
    }
    if spec.has_plugins() {
        println!();
        println!(
            "  {}",
            format!("Fill in .env, then run `uv run {}`", args.out.display()).dimmed()
        );
    }

    Ok(())
}
