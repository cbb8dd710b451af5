use anyhow::{Context as _, Result};
use clap::Args;
use lanes_core::config::load_project_config;
use lanes_core::store::JsonFileStore;
use std::path::Path;
use std::time::Duration;

use crate::cmd::board_file;
use crate::tui::board::run_board_tui;

#[derive(Args, Debug)]
pub struct TuiArgs {
    /// Start with this search text applied.
    #[arg(long, short)]
    pub search: Option<String>,

    /// Input poll interval in milliseconds.
    #[arg(long, default_value_t = 50, value_name = "MS")]
    pub tick_ms: u64,
}

pub fn run_tui(args: &TuiArgs, project_root: &Path, board: Option<&Path>) -> Result<()> {
    let config = load_project_config(project_root)?;
    let path = board_file(project_root, board);
    let store = JsonFileStore::open(&path)
        .with_context(|| format!("Failed to open board {}; run `lanes init` first", path.display()))?;
    run_board_tui(
        store,
        &config,
        args.search.clone(),
        Duration::from_millis(args.tick_ms),
    )
}
