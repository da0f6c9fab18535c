use anyhow::{Context, Result};
use clap::{Args, CommandFactory};
use clap_complete::{Shell, generate, generate_to};
use std::path::PathBuf;

use super::Cli;

const BIN_NAME: &str = "hookctl";

#[derive(Args)]
pub struct CompletionArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,

    #[arg(
        long,
        help = "Write the script into this directory (file name chosen per shell) instead of stdout"
    )]
    pub out_dir: Option<PathBuf>,
}

pub fn run(args: CompletionArgs) -> Result<()> {
    let mut cmd = Cli::command();

    match args.out_dir {
        None => generate(args.shell, &mut cmd, BIN_NAME, &mut std::io::stdout()),
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let path = generate_to(args.shell, &mut cmd, BIN_NAME, &dir)
                .with_context(|| format!("Failed to write completions to {}", dir.display()))?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
