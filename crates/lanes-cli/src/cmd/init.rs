use anyhow::{Context as _, Result};
use clap::Args;
use lanes_core::config::{LANES_DIR, config_path, default_config_toml};
use lanes_core::store::{BoardDocument, JsonFileStore};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cmd::board_file;
use crate::output::{OutputMode, pretty_kv, render_mode};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force re-initialization even if `.lanes/` already exists.
    #[arg(long)]
    pub force: bool,

    /// Organization the board belongs to.
    #[arg(long, default_value = "default")]
    pub org: String,
}

#[derive(Debug, Serialize)]
struct InitReport {
    ok: bool,
    org_id: String,
    config: PathBuf,
    board: PathBuf,
}

/// Execute `lanes init`. Creates the project skeleton:
///
/// ```text
/// .lanes/
///   config.toml   (defaults for board, drag and mutation settings)
///   board.json    (empty board for the organization)
/// ```
///
/// # Errors
///
/// Returns an error if `.lanes/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(
    args: &InitArgs,
    output: OutputMode,
    project_root: &Path,
    board: Option<&Path>,
) -> Result<()> {
    let lanes_dir = project_root.join(LANES_DIR);
    if lanes_dir.exists() && !args.force {
        anyhow::bail!(".lanes/ already exists. Use `lanes init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&lanes_dir)
        .with_context(|| format!("Failed to create {}", lanes_dir.display()))?;

    let config = config_path(project_root);
    std::fs::write(&config, default_config_toml()?)
        .with_context(|| format!("Failed to write config: {}", config.display()))?;

    let board = board_file(project_root, board);
    let document = BoardDocument {
        org_id: args.org.clone(),
        ..BoardDocument::default()
    };
    JsonFileStore::create(&board, &document)
        .with_context(|| format!("Failed to write board: {}", board.display()))?;
    info!(org_id = %args.org, board = %board.display(), "board initialized");

    let report = InitReport {
        ok: true,
        org_id: args.org.clone(),
        config,
        board,
    };
    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "initialized org={}", r.org_id)?;
            writeln!(w, "config={}", r.config.display())?;
            writeln!(w, "board={}", r.board.display())
        },
        |r, w| {
            writeln!(w, "✓ Initialized lanes board for '{}'.", r.org_id)?;
            writeln!(w)?;
            pretty_kv(w, "Config", r.config.display().to_string())?;
            pretty_kv(w, "Board", r.board.display().to_string())?;
            writeln!(w)?;
            writeln!(w, "Next steps:")?;
            writeln!(w, "  lanes show          # print the board")?;
            writeln!(w, "  lanes tui           # drag cards between cells")
        },
    )
}
