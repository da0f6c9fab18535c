use anyhow::Result;
use clap::Args;
use hookprefs::HookPrefsStore;

use crate::output;

#[derive(Args)]
pub struct ResetArgs {
    #[arg(long, help = "Remove the override for this app (bundle id)")]
    pub app: Option<String>,

    #[arg(long, conflicts_with = "app", help = "Reset global options and drop every app override")]
    pub all: bool,
}

pub fn run(args: ResetArgs, store: &HookPrefsStore) -> Result<()> {
    match (&args.app, args.all) {
        (_, true) => {
            store.reset_all_to_defaults()?;
            output::success("All hook options reset to defaults");
        }
        (Some(app), false) => {
            store.reset_consumer_to_defaults(app)?;
            output::success(&format!("{} now follows the global options", app));
        }
        (None, false) => {
            store.reset_global_to_defaults()?;
            output::success("Global hook options reset to defaults");
        }
    }
    Ok(())
}
