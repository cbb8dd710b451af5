//! `lanes drop`: move an issue to a cell with the same rules as a drag.
//!
//! The move is validated and applied to a board loaded from the store, then
//! the resulting mutation is dispatched back to the store.

use anyhow::{Result, bail};
use clap::Args;
use lanes_core::board::{Board, FailedMutation};
use lanes_core::drag::{ArmRefused, CancelReason, DropOutcome};
use lanes_core::error::ErrorCode;
use lanes_core::model::CellId;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::cmd::{board_file, load_config, open_store};
use crate::output::{CliError, OutputMode, render, render_error};

#[derive(Args, Debug)]
pub struct DropArgs {
    /// Issue ID to move.
    pub issue: String,

    /// Target cell: `project:<project-id|unassigned>:state:<state>`.
    pub target: String,
}

#[derive(Debug, Serialize)]
struct DropReport {
    ok: bool,
    issue_id: String,
    /// `moved` or `unchanged`.
    result: &'static str,
    from: CellId,
    to: CellId,
}

/// Map a non-committing outcome to the error reported to the caller.
fn outcome_error(issue_id: &str, target: &CellId, outcome: &DropOutcome) -> Option<CliError> {
    match outcome {
        DropOutcome::Commit(_) | DropOutcome::SelfDrop => None,
        DropOutcome::Rejected(transition) => Some(CliError::coded(
            ErrorCode::DisallowedTransition,
            format!("cannot drop '{issue_id}' onto {target}: {transition}"),
        )),
        DropOutcome::Cancelled(CancelReason::InvalidTarget) => Some(CliError::coded(
            ErrorCode::InvalidDropTarget,
            format!("{target} is not a cell on this board"),
        )),
        DropOutcome::Cancelled(_) | DropOutcome::Ignored => Some(CliError::coded(
            ErrorCode::InternalUnexpected,
            format!("drop of '{issue_id}' did not complete"),
        )),
    }
}

fn refused_error(refused: &ArmRefused) -> CliError {
    let code = match refused {
        ArmRefused::UnknownIssue(_) => ErrorCode::IssueNotFound,
        ArmRefused::SessionActive | ArmRefused::TerminalCard(_) => ErrorCode::InternalUnexpected,
    };
    CliError::coded(code, refused.to_string())
}

fn failed_error(failed: &FailedMutation) -> CliError {
    CliError {
        message: failed.message.clone(),
        suggestion: Some("Run `lanes show` to see the stored board.".to_string()),
        error_code: Some(failed.code.to_string()),
    }
}

pub fn run_drop(
    args: &DropArgs,
    output: OutputMode,
    project_root: &Path,
    board: Option<&Path>,
) -> Result<()> {
    let target: CellId = match args.target.parse() {
        Ok(target) => target,
        Err(err) => {
            render_error(
                output,
                &CliError::coded(ErrorCode::InvalidDropTarget, format!("{err}")),
            )?;
            bail!("{err}");
        }
    };

    let config = load_config(project_root, output)?;
    let mut store = open_store(&board_file(project_root, board), output)?;
    let mut board = match Board::load(
        &store,
        config.board.settings()?,
        config.drag,
        config.mutation.on_failure,
    ) {
        Ok(board) => board,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            bail!("{err}");
        }
    };

    let outcome = match board.drop_issue(&args.issue, target.clone()) {
        Ok(outcome) => outcome,
        Err(refused) => {
            render_error(output, &refused_error(&refused))?;
            bail!("{refused}");
        }
    };
    debug!(issue_id = %args.issue, ?outcome, "headless drop");
    if let Some(error) = outcome_error(&args.issue, &target, &outcome) {
        render_error(output, &error)?;
        bail!("{}", error.message);
    }

    let (result, from) = match outcome {
        DropOutcome::Commit(intent) => ("moved", intent.from),
        _ => ("unchanged", target.clone()),
    };

    let dispatch = board.dispatch_pending(&mut store);
    if let Some(failed) = dispatch.failed.first() {
        render_error(output, &failed_error(failed))?;
        bail!("{}", failed.message);
    }

    let report = DropReport {
        ok: true,
        issue_id: args.issue.clone(),
        result,
        from,
        to: target,
    };
    render(output, &report, render_drop_human)
}

fn render_drop_human(report: &DropReport, w: &mut dyn Write) -> std::io::Result<()> {
    if report.result == "unchanged" {
        writeln!(w, "{} already in {}", report.issue_id, report.to)
    } else {
        writeln!(w, "✓ {} moved {} -> {}", report.issue_id, report.from, report.to)
    }
}
