use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::board::FailurePolicy;
use crate::drag::DragConfig;
use crate::grouping::{BoardSettings, ColumnOrder, RowOrder};
use crate::model::WorkflowState;

/// Per-project state directory.
pub const LANES_DIR: &str = ".lanes";

#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(LANES_DIR).join("config.toml")
}

#[must_use]
pub fn board_path(project_root: &Path) -> PathBuf {
    project_root.join(LANES_DIR).join("board.json")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub mutation: MutationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_column_order")]
    pub column_order: Vec<WorkflowState>,
    #[serde(default)]
    pub row_order: RowOrder,
    #[serde(default)]
    pub show_empty_rows: bool,
    #[serde(default)]
    pub show_triage_issues: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            column_order: default_column_order(),
            row_order: RowOrder::default(),
            show_empty_rows: false,
            show_triage_issues: false,
        }
    }
}

impl BoardConfig {
    /// Validated, immutable settings for the grouping engine.
    pub fn settings(&self) -> Result<BoardSettings> {
        let column_order = ColumnOrder::new(self.column_order.clone())
            .context("invalid board.column_order")?;
        Ok(BoardSettings {
            column_order,
            row_order: self.row_order,
            show_empty_rows: self.show_empty_rows,
            show_triage_issues: self.show_triage_issues,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationConfig {
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config
        .board
        .settings()
        .with_context(|| format!("Invalid board settings in {}", path.display()))?;
    Ok(config)
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("lanes/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Serialized defaults, written by `lanes init`.
pub fn default_config_toml() -> Result<String> {
    toml::to_string_pretty(&ProjectConfig::default()).context("Failed to render default config")
}

pub fn resolve_config(
    project_root: &Path,
    cli_json: bool,
    cli_format: Option<&str>,
) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, cli_format, user.output.clone(), env_format);

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

/// Flag beats `FORMAT`, which beats the user config; otherwise TTY decides.
#[must_use]
pub fn resolve_output(
    cli_json: bool,
    cli_format: Option<&str>,
    user_output: Option<String>,
    env_format: Option<String>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    let chosen = cli_format
        .and_then(normalize_output_mode)
        .or_else(|| env_format.as_deref().and_then(normalize_output_mode))
        .or_else(|| user_output.as_deref().and_then(normalize_output_mode));
    if let Some(mode) = chosen {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

fn default_column_order() -> Vec<WorkflowState> {
    WorkflowState::ALL.to_vec()
}
