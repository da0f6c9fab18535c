use anyhow::Result;
use clap::Args;
use hookprefs::HookPrefsStore;

use crate::output;

#[derive(Args)]
pub struct ShowArgs {
    #[arg(long, help = "Show the effective options for this app (bundle id)")]
    pub app: Option<String>,

    #[arg(long, conflicts_with = "app", help = "Show global options and every app override")]
    pub all: bool,
}

pub fn run(args: ShowArgs, store: &HookPrefsStore, json: bool) -> Result<()> {
    if args.all {
        let global = store.global_options()?;
        let per_app = store.all_per_consumer_options()?;

        if json {
            return output::json(&serde_json::json!({
                "GlobalOptions": global,
                "PerAppOptions": per_app,
            }));
        }

        output::header("Global");
        output::options_table(&global);
        for (app, options) in &per_app {
            println!();
            output::header(app);
            output::options_table(options);
        }
        return Ok(());
    }

    let (title, options) = match &args.app {
        Some(app) => {
            let overridden = store.configuration()?.has_override(app);
            let title = if overridden {
                format!("{} (override)", app)
            } else {
                format!("{} (global)", app)
            };
            (title, store.options_for(app)?)
        }
        None => ("Global".to_string(), store.global_options()?),
    };

    if json {
        return output::json(&options);
    }

    output::header(&title);
    output::options_table(&options);
    Ok(())
}
