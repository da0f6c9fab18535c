pub mod completion;
pub mod keys;
pub mod reset;
pub mod set;
pub mod show;
pub mod transfer;
pub mod watch;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hookprefs::{
    HookPrefsStore, SettingsOverrides, StoreSettings, load_from_env, load_from_file,
    merge_settings,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hookctl",
    author,
    version,
    about = "Inspect and edit hook preferences",
    long_about = "Reads and writes the hook toggle store shared by every process using the same \
                  storage directory.\nSettings come from --config, HOOKPREFS_* environment \
                  variables and the flags below, in increasing priority."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    #[arg(long, global = true, help = "Settings file (.toml, .yaml or .yml)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Storage directory shared by all processes")]
    pub storage_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Key-value domain name")]
    pub domain: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Change notification name; give each domain sharing a storage directory its own"
    )]
    pub notification: Option<String>,

    #[arg(long, global = true, help = "Output as JSON")]
    pub json: bool,
}

impl GlobalArgs {
    pub fn settings(&self) -> Result<StoreSettings> {
        let file_settings = match &self.config {
            Some(path) => Some(
                load_from_file(path)
                    .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            ),
            None => None,
        };

        Ok(merge_settings(
            file_settings,
            load_from_env(),
            self.overrides(),
        ))
    }

    /// Settings named on the command line; each one beats every other source.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            domain: self.domain.clone(),
            notification_name: self.notification.clone(),
            storage_dir: self.storage_dir.clone(),
        }
    }

    pub fn open_store(&self) -> Result<HookPrefsStore> {
        let settings = self.settings()?;
        HookPrefsStore::open(&settings).with_context(|| {
            format!(
                "Failed to open hook preferences in {}",
                settings.storage_dir.display()
            )
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List hook keys and their built-in defaults")]
    Keys(keys::KeysArgs),

    #[command(about = "Show effective hook options")]
    Show(show::ShowArgs),

    #[command(about = "Turn one hook on or off, globally or for one app")]
    Set(set::SetArgs),

    #[command(about = "Reset hooks to their defaults")]
    Reset(reset::ResetArgs),

    #[command(about = "Export the whole configuration to a JSON file")]
    Export(transfer::ExportArgs),

    #[command(about = "Replace the whole configuration from a JSON file")]
    Import(transfer::ImportArgs),

    #[command(about = "Print the global options every time they change")]
    Watch,

    #[command(about = "Generate shell completions")]
    Completion(completion::CompletionArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookprefs::settings::DEFAULT_DOMAIN;

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "hookctl",
            "--domain",
            "com.example.prefs",
            "--notification",
            "com.example.prefs.changed",
            "keys",
        ])
        .unwrap();

        let overrides = cli.global.overrides();
        assert_eq!(overrides.domain.as_deref(), Some("com.example.prefs"));
        assert_eq!(
            overrides.notification_name.as_deref(),
            Some("com.example.prefs.changed")
        );
        assert_eq!(overrides.storage_dir, None);
    }

    #[test]
    fn test_default_valued_flag_is_kept() {
        let cli = Cli::try_parse_from(["hookctl", "keys", "--domain", DEFAULT_DOMAIN]).unwrap();
        assert_eq!(cli.global.overrides().domain.as_deref(), Some(DEFAULT_DOMAIN));
    }

    #[test]
    fn test_no_flags_no_overrides() {
        let cli = Cli::try_parse_from(["hookctl", "keys"]).unwrap();
        assert!(cli.global.overrides().is_empty());
    }
}
