#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "lanes: issue board grouped by project and workflow state",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (pretty, text, json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Board file to use instead of `.lanes/board.json`.
    #[arg(long, global = true, value_name = "PATH")]
    board: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a lanes board",
        long_about = "Create .lanes/config.toml and an empty .lanes/board.json in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a board for the current directory\n    lanes init\n\n    # Name the organization the board belongs to\n    lanes init --org acme"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the board",
        long_about = "Render the board as project rows by workflow-state columns, after filters.",
        after_help = "EXAMPLES:\n    # Show the whole board\n    lanes show\n\n    # Only in-progress and blocked work for one assignee\n    lanes show --state in_progress,blocked --assignee ana\n\n    # Include projects without matching issues, ordered by status\n    lanes show --empty-rows --row-order status\n\n    # Emit machine-readable output\n    lanes show --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Write",
        about = "Drop an issue onto a board cell",
        long_about = "Move an issue to a (project, state) cell using the same rules as a drag, then write it to the store.",
        after_help = "EXAMPLES:\n    # Start work on issue 1 in project A\n    lanes drop 1 project:A:state:in_progress\n\n    # Move to the unassigned row\n    lanes drop 1 project:unassigned:state:todo\n\n    # Emit machine-readable output\n    lanes drop 1 project:A:state:done --json"
    )]
    Drop(cmd::drop::DropArgs),

    #[command(
        next_help_heading = "Interactive",
        about = "Open the interactive board",
        long_about = "Full-screen board. Drag cards with the mouse to move them between cells.",
        after_help = "KEYS:\n    q       quit\n    t       toggle triage issues\n    e       toggle empty rows\n    o       toggle row order (name/status)\n    /       search\n    Esc     cancel drag / clear search\n    r       reload from the store"
    )]
    Tui(cmd::tui::TuiArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Show effective configuration",
        long_about = "Print the merged project and user configuration.",
        after_help = "EXAMPLES:\n    # Show the effective config\n    lanes config\n\n    # Emit machine-readable output\n    lanes config --json"
    )]
    Config,

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        long_about = "Print a shell completion script for the given shell.",
        after_help = "EXAMPLES:\n    # Bash\n    lanes completions bash > ~/.local/share/bash-completion/completions/lanes\n\n    # Zsh\n    lanes completions zsh > ~/.zfunc/_lanes"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(interactive: bool) {
    let from_env = EnvFilter::try_from_env("LANES_LOG");
    // Log lines would draw over the board unless explicitly requested.
    if interactive && from_env.is_err() {
        return;
    }
    let filter = from_env.unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "lanes=debug,info"
        } else {
            "lanes=info,warn"
        })
    });

    let format = env::var("LANES_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Tui(_)));

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = std::env::current_dir()?;
    let output = cli.output_mode();
    let board = cli.board.as_deref();

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, &project_root, board),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &project_root, board),
        Commands::Drop(ref args) => cmd::drop::run_drop(args, output, &project_root, board),
        Commands::Tui(ref args) => cmd::tui::run_tui(args, &project_root, board),
        Commands::Config => cmd::config::run_config(cli.json, cli.format, output, &project_root),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args, &mut command)
        }
    }
}
