use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::app::{self, Outcome, RunOptions};
use crate::config::Config;
use crate::settings::{self, SettingValue, Settings};

#[derive(Parser)]
#[command(name = "termdeck")]
#[command(author, version, about)]
#[command(long_about = "A markdown-based presentation tool for the terminal.\n\n\
    Write your slides in plain markdown separated by --- lines and present\n\
    them full screen in any terminal.\n\n\
    Examples:\n  \
    termdeck slides.md                 Present a local file\n  \
    termdeck https://host/slides.md    Present a remote file\n  \
    termdeck slides.md --strict        Check every slide fits, then exit\n  \
    termdeck slides.md --set border_style=double")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown file or http(s) URL to present
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Start on a specific slide (1-indexed)
    #[arg(long)]
    pub slide: Option<usize>,

    /// Pre-flight every slide and report problems instead of presenting
    #[arg(long)]
    pub strict: bool,

    /// Override the background colour
    #[arg(long, value_name = "COLOR")]
    pub background: Option<String>,

    /// Override the foreground colour
    #[arg(long, value_name = "COLOR")]
    pub foreground: Option<String>,

    /// Override the border colour
    #[arg(long, value_name = "COLOR")]
    pub border_color: Option<String>,

    /// Override any presentation option (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Increase output verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.background, defaults.start_slide, keys.next)
        key: String,

        /// Value to set (key lists are comma-separated)
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err(format!("missing option name in '{raw}'"));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}

impl Cli {
    /// Command-line option overrides, validated. They apply over the
    /// document's frontmatter.
    fn overrides(&self) -> anyhow::Result<Vec<(String, SettingValue)>> {
        let named = [
            (settings::BACKGROUND, &self.background),
            (settings::FOREGROUND, &self.foreground),
            (settings::BORDER_COLOR, &self.border_color),
        ];
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        for (key, value) in named {
            if let Some(value) = value {
                pairs.push((key, value.as_str()));
            }
        }
        pairs.extend(self.set.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let mut checked = Vec::new();
        for (key, value) in pairs {
            let value = SettingValue::parse(value);
            Settings::default()
                .set(key, value.clone())
                .map_err(|e| anyhow::anyhow!("Invalid command-line option: {e}"))?;
            checked.push((key.to_string(), value));
        }
        Ok(checked)
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        match self.command.take() {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("termdeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                let Some(input) = self.file.take() else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    return Ok(());
                };
                let config = Config::load_or_default();
                let options = RunOptions {
                    settings: config.settings(),
                    overrides: self.overrides()?,
                    keymap: config.keymap()?,
                    start_slide: self.slide.or(config.start_slide()),
                    strict: self.strict,
                    input,
                };
                let input = options.input.clone();
                match app::run(options).with_context(|| format!("Cannot present {input}"))? {
                    Outcome::Validated(report) => {
                        if !self.quiet {
                            println!(
                                "{} {} slides fit in {}x{}",
                                "✓".green().bold(),
                                report.slides,
                                report.viewport.width,
                                report.viewport.height
                            );
                        }
                    }
                    Outcome::Presented => {}
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_named_flags_come_before_set() {
        let cli = Cli::parse_from([
            "termdeck",
            "deck.md",
            "--background",
            "navy",
            "--set",
            "border-style=double",
        ]);
        let overrides = cli.overrides().unwrap();
        assert_eq!(
            overrides,
            vec![
                (settings::BACKGROUND.to_string(), SettingValue::parse("navy")),
                ("border-style".to_string(), SettingValue::parse("double")),
            ]
        );
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli::parse_from(["termdeck", "deck.md", "--set", "pagination=maybe"]);
        assert!(cli.overrides().is_err());
        assert!(Cli::try_parse_from(["termdeck", "deck.md", "--set", "novalue"]).is_err());
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::parse_from(["termdeck", "config", "set", "keys.next", "right,n"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: ConfigCommands::Set { .. }
            })
        ));
    }
}
