use colored::Colorize;
use hookprefs::HookOptions;
use serde::Serialize;

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per hook, in registry order.
pub fn options_table(options: &HookOptions) {
    let width = options
        .iter()
        .map(|(key, _)| key.as_str().len())
        .max()
        .unwrap_or(0);
    for (key, enabled) in options.iter() {
        println!("  {:width$}  {}", key.as_str(), state_label(enabled), width = width);
    }
}

pub fn state_label(enabled: bool) -> String {
    if enabled {
        "on".green().to_string()
    } else {
        "off".dimmed().to_string()
    }
}
