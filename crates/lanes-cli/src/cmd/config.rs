use anyhow::Result;
use lanes_core::config::{EffectiveConfig, resolve_config};
use std::io::Write;
use std::path::Path;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

pub fn run_config(
    json: bool,
    format: Option<OutputMode>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    let effective = resolve_config(project_root, json, format.map(OutputMode::as_str))?;
    render_mode(output, &effective, render_config_text, render_config_human)
}

fn column_list(value: &EffectiveConfig) -> String {
    value
        .project
        .board
        .column_order
        .iter()
        .map(|state| state.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn render_config_text(value: &EffectiveConfig, w: &mut dyn Write) -> std::io::Result<()> {
    let board = &value.project.board;
    let drag = &value.project.drag;
    writeln!(w, "resolved_output={}", value.resolved_output)?;
    writeln!(w, "board.column_order={}", column_list(value))?;
    writeln!(w, "board.row_order={}", board.row_order)?;
    writeln!(w, "board.show_empty_rows={}", board.show_empty_rows)?;
    writeln!(w, "board.show_triage_issues={}", board.show_triage_issues)?;
    writeln!(w, "drag.pointer_distance={}", drag.pointer_distance)?;
    writeln!(w, "drag.touch_delay_ms={}", drag.touch_delay_ms)?;
    writeln!(w, "drag.touch_tolerance={}", drag.touch_tolerance)?;
    writeln!(w, "drag.arm_terminal_cards={}", drag.arm_terminal_cards)?;
    writeln!(
        w,
        "mutation.on_failure={}",
        value.project.mutation.on_failure.as_str()
    )?;
    writeln!(
        w,
        "user.output={}",
        value.user.output.as_deref().unwrap_or("")
    )
}

fn render_config_human(value: &EffectiveConfig, w: &mut dyn Write) -> std::io::Result<()> {
    let board = &value.project.board;
    let drag = &value.project.drag;

    pretty_section(w, "Board")?;
    pretty_kv(w, "columns", column_list(value))?;
    pretty_kv(w, "row order", board.row_order.as_str())?;
    pretty_kv(w, "empty rows", board.show_empty_rows.to_string())?;
    pretty_kv(w, "triage", board.show_triage_issues.to_string())?;
    writeln!(w)?;

    pretty_section(w, "Drag")?;
    pretty_kv(w, "distance", format!("{}", drag.pointer_distance))?;
    pretty_kv(w, "touch delay", format!("{}ms", drag.touch_delay_ms))?;
    pretty_kv(w, "tolerance", format!("{}", drag.touch_tolerance))?;
    pretty_kv(w, "terminal arm", drag.arm_terminal_cards.to_string())?;
    writeln!(w)?;

    pretty_section(w, "Mutation")?;
    pretty_kv(w, "on failure", value.project.mutation.on_failure.as_str())?;
    writeln!(w)?;

    pretty_section(w, "Output")?;
    pretty_kv(w, "resolved", &value.resolved_output)?;
    pretty_kv(w, "user pref", value.user.output.as_deref().unwrap_or("(unset)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanes_core::config::{ProjectConfig, UserConfig};

    fn effective() -> EffectiveConfig {
        EffectiveConfig {
            project: ProjectConfig::default(),
            user: UserConfig::default(),
            resolved_output: "text".to_string(),
        }
    }

    #[test]
    fn text_lists_every_key() {
        let mut buf = Vec::new();
        render_config_text(&effective(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("resolved_output=text"));
        assert!(text.contains("board.column_order=triage,todo,in_progress"));
        assert!(text.contains("board.row_order=name"));
        assert!(text.contains("drag.touch_delay_ms=250"));
        assert!(text.contains("mutation.on_failure=rollback"));
    }

    #[test]
    fn pretty_has_sections() {
        let mut buf = Vec::new();
        render_config_human(&effective(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for heading in ["Board", "Drag", "Mutation", "Output"] {
            assert!(text.contains(heading), "missing {heading}");
        }
    }
}
