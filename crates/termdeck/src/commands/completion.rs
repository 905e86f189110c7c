use clap::CommandFactory;
use clap_complete::Shell as CompletionShell;

use crate::cli::{Cli, Shell};

impl From<Shell> for CompletionShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => CompletionShell::Bash,
            Shell::Zsh => CompletionShell::Zsh,
            Shell::Fish => CompletionShell::Fish,
            Shell::Powershell => CompletionShell::PowerShell,
        }
    }
}

pub fn run(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(
        CompletionShell::from(shell),
        &mut cmd,
        "termdeck",
        &mut std::io::stdout(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script_mentions_binary() {
        let mut out = Vec::new();
        clap_complete::generate(
            CompletionShell::from(Shell::Bash),
            &mut Cli::command(),
            "termdeck",
            &mut out,
        );
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("termdeck"));
        assert!(script.contains("--strict"));
    }
}
