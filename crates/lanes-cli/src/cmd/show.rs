//! `lanes show`: print the board as project rows by state columns.

use anyhow::{Result, bail};
use clap::Args;
use lanes_core::board::Board;
use lanes_core::filter::FilterSet;
use lanes_core::grouping::{BoardSettings, Row, RowOrder};
use lanes_core::model::{Issue, Priority, WorkflowState};
use lanes_core::store::IssueStore;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::cmd::{board_file, load_config, open_store};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    /// Case-insensitive text matched against issue title and key.
    #[arg(long, short)]
    pub search: Option<String>,

    /// Only issues in these states (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub state: Vec<WorkflowState>,

    /// Only issues assigned to these users (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub assignee: Vec<String>,

    /// Only issues with these priorities (comma-separated, p0..p3).
    #[arg(long, value_delimiter = ',')]
    pub priority: Vec<Priority>,

    /// Only issues under these initiatives (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub initiative: Vec<String>,

    /// Include issues still in triage.
    #[arg(long)]
    pub triage: bool,

    /// Include projects that have no matching issues.
    #[arg(long)]
    pub empty_rows: bool,

    /// Order rows by project name or project status.
    #[arg(long, value_name = "ORDER")]
    pub row_order: Option<RowOrder>,
}

impl ShowArgs {
    /// Fold the view flags into the configured settings.
    fn settings(&self, mut settings: BoardSettings) -> BoardSettings {
        settings.show_empty_rows |= self.empty_rows;
        settings.show_triage_issues |= self.triage;
        if let Some(order) = self.row_order {
            settings.row_order = order;
        }
        settings
    }

    fn filters(&self, settings: &BoardSettings) -> FilterSet {
        FilterSet::default()
            .with_search(self.search.clone().unwrap_or_default())
            .with_states(self.state.iter().copied())
            .with_assignees(self.assignee.iter().cloned())
            .with_priorities(self.priority.iter().copied())
            .with_initiatives(self.initiative.iter().cloned())
            .with_triage(settings.show_triage_issues)
    }
}

#[derive(Debug, Serialize)]
struct BoardView<'a> {
    org_id: &'a str,
    columns: &'a [WorkflowState],
    row_order: RowOrder,
    visible: usize,
    rows: &'a [Row],
}

pub fn run_show(
    args: &ShowArgs,
    output: OutputMode,
    project_root: &Path,
    board: Option<&Path>,
) -> Result<()> {
    let config = load_config(project_root, output)?;
    let settings = args.settings(config.board.settings()?);
    let store = open_store(&board_file(project_root, board), output)?;

    let mut board = match Board::load(&store, settings, config.drag, config.mutation.on_failure) {
        Ok(board) => board,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            bail!("{err}");
        }
    };
    board.set_filters(args.filters(board.settings()));

    let rows = board.rows();
    let view = BoardView {
        org_id: store.org_id(),
        columns: board.settings().column_order.as_slice(),
        row_order: board.settings().row_order,
        visible: rows.iter().map(Row::issue_count).sum(),
        rows,
    };
    render_mode(output, &view, render_board_text, render_board_human)
}

fn issue_suffix(issue: &Issue) -> String {
    let mut suffix = String::new();
    if let Some(priority) = issue.priority {
        suffix.push_str(&format!(" [{priority}]"));
    }
    if let Some(ref assignee) = issue.assignee_id {
        suffix.push_str(&format!(" @{assignee}"));
    }
    suffix
}

/// One line per row, then one indented line per issue.
fn render_board_text(view: &BoardView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for row in view.rows {
        writeln!(
            w,
            "project={} name={} issues={}",
            row.key,
            row.project.name,
            row.issue_count()
        )?;
        for cell in &row.cells {
            for issue in &cell.issues {
                writeln!(
                    w,
                    "  {}  {}  {}{}",
                    cell.id.state,
                    issue.key,
                    issue.title,
                    issue_suffix(issue)
                )?;
            }
        }
    }
    Ok(())
}

fn render_board_human(view: &BoardView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_kv(w, "Org", view.org_id)?;
    pretty_kv(w, "Rows by", view.row_order.as_str())?;
    pretty_kv(
        w,
        "Columns",
        view.columns
            .iter()
            .map(|state| state.label())
            .collect::<Vec<_>>()
            .join(" | "),
    )?;
    writeln!(w)?;

    if view.rows.is_empty() {
        writeln!(w, "No issues match the current filters.")?;
        return Ok(());
    }

    for row in view.rows {
        let status = row
            .project
            .status
            .map(|s| format!(" · {s}"))
            .unwrap_or_default();
        pretty_section(
            w,
            &format!("{}{status} ({} issues)", row.project.name, row.issue_count()),
        )?;
        if row.issue_count() == 0 {
            writeln!(w, "  (no issues)")?;
        }
        for cell in row.cells.iter().filter(|cell| !cell.issues.is_empty()) {
            writeln!(w, "  {} ({})", cell.id.state.label(), cell.issues.len())?;
            for issue in &cell.issues {
                writeln!(
                    w,
                    "    {:<10} {}{}",
                    issue.key,
                    issue.title,
                    issue_suffix(issue)
                )?;
            }
        }
        writeln!(w)?;
    }
    writeln!(w, "{} issues shown", view.visible)
}
