use anyhow::Result;
use colored::Colorize;
use hookprefs::{HookPrefsStore, watch_changes};
use tracing::debug;

use crate::output;

pub async fn run(store: &HookPrefsStore, json: bool) -> Result<()> {
    let mut rx = watch_changes(store.notifier(), 64)?;
    print_snapshot(store, json)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            signal = rx.recv() => {
                let Some(signal) = signal else {
                    break;
                };
                debug!("Change signal from {:?}", signal.origin);
                store.invalidate();
                print_snapshot(store, json)?;
            }
        }
    }

    Ok(())
}

fn print_snapshot(store: &HookPrefsStore, json: bool) -> Result<()> {
    let options = store.global_options()?;
    if json {
        println!("{}", serde_json::to_string(&options)?);
        return Ok(());
    }

    let enabled: Vec<&str> = options
        .enabled_keys()
        .into_iter()
        .map(|key| key.as_str())
        .collect();
    let summary = if enabled.is_empty() {
        "none".dimmed().to_string()
    } else {
        enabled.join(", ")
    };
    output::header("Global options changed");
    println!("  enabled: {}", summary);
    Ok(())
}
