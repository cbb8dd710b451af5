use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};
use std::io::Write;

/// Arguments for `lanes completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `lanes` to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn run_completions(args: &CompletionsArgs, command: &mut clap::Command) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_completions(args.shell, command, &mut out);
    out.flush()?;
    Ok(())
}

fn write_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) {
    generate(shell, command, "lanes", out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> clap::Command {
        clap::Command::new("lanes")
            .subcommand(clap::Command::new("show"))
            .subcommand(clap::Command::new("drop"))
    }

    #[test]
    fn bash_script_names_binary_and_subcommands() {
        let mut buf = Vec::new();
        write_completions(Shell::Bash, &mut command(), &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("_lanes"));
        assert!(script.contains("drop"));
    }
}
