use anyhow::{Context, Result};
use clap::Args;
use hookprefs::HookPrefsStore;
use std::path::PathBuf;

use crate::output;

#[derive(Args)]
pub struct ExportArgs {
    #[arg(long, help = "Directory for the export file (default: system temp dir)")]
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(help = "JSON file produced by `hookctl export`")]
    pub path: PathBuf,
}

pub fn export(args: ExportArgs, store: &HookPrefsStore, json: bool) -> Result<()> {
    let path = match &args.dir {
        Some(dir) => store.export_to_dir(dir)?,
        None => store.export_to_temporary_json()?,
    };

    if json {
        return output::json(&serde_json::json!({ "path": path }));
    }
    println!("{}", path.display());
    Ok(())
}

pub fn import(args: ImportArgs, store: &HookPrefsStore) -> Result<()> {
    store
        .import_from_json_path(&args.path)
        .with_context(|| format!("Failed to import {}", args.path.display()))?;
    output::success(&format!("Imported {}", args.path.display()));
    Ok(())
}
