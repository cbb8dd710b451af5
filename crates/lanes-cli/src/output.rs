//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for agents and pipes,
//! or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. hidden `--json` flag, then `--format`
//! 2. `FORMAT` env var: `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config (`<config_dir>/lanes/config.toml`)
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use lanes_core::config::{load_user_config, resolve_output};
use lanes_core::error::{ErrorCode, StoreError};
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Token-efficient plain text for agents and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Map a resolved mode name back to the enum; unknown names read as pretty.
    fn from_resolved(raw: &str) -> Self {
        match raw {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Pretty,
        }
    }
}

/// Resolve the output mode from CLI flags, environment, user config and TTY.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let user_output = match load_user_config() {
        Ok(config) => config.output,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable user config");
            None
        }
    };
    let resolved = resolve_output(
        json_flag,
        format_flag.map(OutputMode::as_str),
        user_output,
        std::env::var("FORMAT").ok(),
    );
    OutputMode::from_resolved(&resolved)
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In pretty/text mode,
/// the provided `human_fn` closure is called to produce text output.
/// For distinct text/pretty rendering, use [`render_mode`].
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (`E####`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create an error carrying an [`ErrorCode`] and its remediation hint.
    pub fn coded(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl From<&StoreError> for CliError {
    fn from(err: &StoreError) -> Self {
        Self::coded(err.code(), err.to_string())
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)?;
    Ok(())
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn resolved_names_map_back_to_modes() {
        for mode in [OutputMode::Pretty, OutputMode::Text, OutputMode::Json] {
            assert_eq!(OutputMode::from_resolved(mode.as_str()), mode);
        }
        assert_eq!(OutputMode::from_resolved("bogus"), OutputMode::Pretty);
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Text.is_json());
    }

    #[test]
    fn json_flag_wins() {
        assert_eq!(
            resolve_output_mode(Some(OutputMode::Text), true),
            OutputMode::Json
        );
    }

    #[test]
    fn format_flag_is_honored() {
        assert_eq!(
            resolve_output_mode(Some(OutputMode::Text), false),
            OutputMode::Text
        );
    }

    #[test]
    fn store_error_carries_code_and_hint() {
        let err = StoreError::IssueNotFound("42".into());
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2001"));
        assert!(cli.message.contains("42"));
        assert_eq!(cli.suggestion.as_deref(), ErrorCode::IssueNotFound.hint());
    }

    #[test]
    fn missing_board_reads_as_not_initialized() {
        let err = StoreError::Io {
            path: PathBuf::from(".lanes/board.json"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E1001"));
    }

    #[test]
    fn json_errors_are_wrapped() {
        let mut buf = Vec::new();
        let err = CliError::coded(ErrorCode::InvalidDropTarget, "bad target");
        write_error(&mut buf, OutputMode::Json, &err).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["error"]["error_code"], "E2003");
        assert_eq!(value["error"]["message"], "bad target");
    }

    #[test]
    fn text_errors_show_code_and_suggestion() {
        let mut buf = Vec::new();
        let err = CliError::coded(ErrorCode::NotInitialized, "no board");
        write_error(&mut buf, OutputMode::Text, &err).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("error[E1001]: no board"));
        if ErrorCode::NotInitialized.hint().is_some() {
            assert!(text.contains("suggestion:"));
        }
    }
}
