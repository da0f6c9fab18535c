use anyhow::Result;
use clap::Args;
use hookprefs::all_keys;

use crate::output;

#[derive(Args)]
pub struct KeysArgs {}

pub fn run(_args: KeysArgs, json: bool) -> Result<()> {
    if json {
        let keys: Vec<_> = all_keys()
            .into_iter()
            .map(|key| {
                serde_json::json!({
                    "key": key.as_str(),
                    "default": key.default_enabled()
                })
            })
            .collect();
        return output::json(&keys);
    }

    output::header("Hook keys");
    for key in all_keys() {
        println!(
            "  {:14}  default {}",
            key.as_str(),
            output::state_label(key.default_enabled())
        );
    }
    Ok(())
}
