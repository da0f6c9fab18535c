use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Keys(args) => commands::keys::run(args, global.json),
        Commands::Show(args) => commands::show::run(args, &global.open_store()?, global.json),
        Commands::Set(args) => commands::set::run(args, &global.open_store()?),
        Commands::Reset(args) => commands::reset::run(args, &global.open_store()?),
        Commands::Export(args) => {
            commands::transfer::export(args, &global.open_store()?, global.json)
        }
        Commands::Import(args) => commands::transfer::import(args, &global.open_store()?),
        Commands::Watch => {
            let store = global.open_store()?;
            commands::watch::run(&store, global.json).await
        }
        Commands::Completion(args) => commands::completion::run(args),
    }
}
