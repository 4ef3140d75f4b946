//! Print generated files without touching disk.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::build::synthesize;
use crate::output;

#[derive(Args)]
pub struct PreviewArgs {
    /// Character file describing the agent (JSON)
    #[arg(short, long)]
    pub character: PathBuf,
}

pub fn execute(args: PreviewArgs) -> Result<()> {
    let (spec, artifact) = synthesize(&args.character)?;

    output::print_requirement(&spec);
    println!();
    for file in artifact.files() {
        output::print_file(file, None);
    }
    Ok(())
}
