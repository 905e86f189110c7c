use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::settings;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    println!("{} {}", "Config file:".bold(), path.display());
    println!();

    if !path.exists() {
        println!("{}", "No config file yet. Built-in defaults:".yellow());
        for spec in settings::OPTIONS {
            let value = if spec.default.is_empty() {
                "(none)".dimmed().to_string()
            } else {
                spec.default.to_string()
            };
            println!("  defaults.{:<18} {value}", spec.key);
        }
        println!();
        println!(
            "Set a value with {}",
            "termdeck config set <key> <value>".cyan()
        );
        return Ok(());
    }

    let config = Config::load_from(&path)?;
    let yaml = serde_yaml::to_string(&config)?;
    if yaml.trim() == "{}" {
        println!("{}", "Config file is empty.".yellow());
    } else {
        print!("{yaml}");
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display().to_string().dimmed()
    );
    Ok(())
}
