use anyhow::Result;
use clap::Args;
use hookprefs::{HookKey, HookPrefsStore};

use crate::output;

#[derive(Args)]
pub struct SetArgs {
    #[arg(help = "Hook key (see `hookctl keys`)")]
    pub key: String,

    #[arg(
        value_parser = parse_state,
        action = clap::ArgAction::Set,
        help = "on/off, true/false or 1/0"
    )]
    pub state: bool,

    #[arg(long, help = "Apply to this app (bundle id) instead of globally")]
    pub app: Option<String>,
}

pub fn run(args: SetArgs, store: &HookPrefsStore) -> Result<()> {
    if HookKey::parse(&args.key).is_none() {
        output::warn(&format!(
            "'{}' is not a known hook key; the change will have no effect",
            args.key
        ));
    }

    store.set_enabled(&args.key, args.state, args.app.as_deref())?;

    let scope = args.app.as_deref().unwrap_or("global");
    output::success(&format!(
        "{} = {} ({})",
        args.key,
        output::state_label(args.state),
        scope
    ));
    Ok(())
}

fn parse_state(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(format!("expected on/off, got '{}'", other)),
    }
}
