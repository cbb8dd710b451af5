pub mod completions;
pub mod config;
pub mod drop;
pub mod init;
pub mod show;
pub mod tui;

use anyhow::{Result, bail};
use lanes_core::config::{ProjectConfig, board_path, load_project_config};
use lanes_core::error::ErrorCode;
use lanes_core::store::JsonFileStore;
use std::path::{Path, PathBuf};

use crate::output::{CliError, OutputMode, render_error};

/// `--board` if given, otherwise `.lanes/board.json` under the project root.
pub fn board_file(project_root: &Path, board: Option<&Path>) -> PathBuf {
    board.map_or_else(|| board_path(project_root), Path::to_path_buf)
}

/// Open the board store, reporting a coded error when it is missing or unreadable.
pub fn open_store(path: &Path, output: OutputMode) -> Result<JsonFileStore> {
    match JsonFileStore::open(path) {
        Ok(store) => Ok(store),
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            bail!("{err}");
        }
    }
}

/// Load `.lanes/config.toml`, reporting a coded error when it does not parse.
pub fn load_config(project_root: &Path, output: OutputMode) -> Result<ProjectConfig> {
    match load_project_config(project_root) {
        Ok(config) => Ok(config),
        Err(err) => {
            let code = if format!("{err:#}").contains("column_order") {
                ErrorCode::InvalidColumnOrder
            } else {
                ErrorCode::ConfigParseError
            };
            render_error(output, &CliError::coded(code, format!("{err:#}")))?;
            Err(err)
        }
    }
}
