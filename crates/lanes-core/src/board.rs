//! Board orchestration: working copy, cached grouping, drag wiring, outbox.
//!
//! The board owns the local issue list. A committed drop is applied to it
//! immediately and queued; [`Board::dispatch_pending`] later sends the queue
//! to the store and settles each entry according to the [`FailurePolicy`].

use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::drag::{
    ArmRefused, CancelReason, DndSession, DragConfig, DragController, DragUpdate, DropOutcome,
    DropTarget, GestureSession, InputKind, MoveIntent, Phase, Point, Rect, validate_drop,
};
use crate::error::StoreError;
use crate::filter::FilterSet;
use crate::grouping::{BoardSettings, Row, build_rows};
use crate::model::{CellId, Issue, IssuePatch, Project, ProjectKey};
use crate::store::{IssueStore, check_reserved_ids};

/// What to do with the optimistic update when the store refuses it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Restore the origin cell, unless a later local move superseded it.
    #[default]
    Rollback,
    /// Keep the optimistic state until the next reload.
    Keep,
}

impl FailurePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rollback => "rollback",
            Self::Keep => "keep",
        }
    }
}

/// A committed move waiting to be sent to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingMutation {
    pub seq: u64,
    #[serde(flatten)]
    pub intent: MoveIntent,
}

impl PendingMutation {
    #[must_use]
    pub fn patch(&self) -> IssuePatch {
        self.intent.patch()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedMutation {
    pub issue_id: String,
    pub code: &'static str,
    pub message: String,
    pub rolled_back: bool,
}

/// Result of draining the outbox once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub applied: Vec<String>,
    pub failed: Vec<FailedMutation>,
}

impl DispatchReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub struct Board<G: GestureSession = DndSession> {
    issues: Vec<Issue>,
    projects: Vec<Project>,
    settings: BoardSettings,
    filters: FilterSet,
    policy: FailurePolicy,
    drag: DragController<G>,
    outbox: VecDeque<PendingMutation>,
    next_seq: u64,
    rows: OnceCell<Vec<Row>>,
}

impl Board<DndSession> {
    #[must_use]
    pub fn new(
        issues: Vec<Issue>,
        projects: Vec<Project>,
        settings: BoardSettings,
        drag: DragConfig,
        policy: FailurePolicy,
    ) -> Self {
        Self::with_session(
            issues,
            projects,
            settings,
            DragController::new(drag),
            policy,
        )
    }

    /// Read issues and projects from `store`.
    pub fn load(
        store: &dyn IssueStore,
        settings: BoardSettings,
        drag: DragConfig,
        policy: FailurePolicy,
    ) -> Result<Self, StoreError> {
        let issues = store.issues()?;
        let projects = store.projects()?;
        check_reserved_ids(&projects, &issues)?;
        info!(
            org_id = store.org_id(),
            issues = issues.len(),
            projects = projects.len(),
            "board loaded"
        );
        Ok(Self::new(issues, projects, settings, drag, policy))
    }

    /// Replace the droppable targets the view has laid out.
    pub fn register_targets(&mut self, targets: Vec<DropTarget>) {
        debug!(count = targets.len(), "drop targets registered");
        self.drag.session_mut().set_targets(targets);
    }
}

impl<G: GestureSession> Board<G> {
    #[must_use]
    pub fn with_session(
        issues: Vec<Issue>,
        projects: Vec<Project>,
        settings: BoardSettings,
        drag: DragController<G>,
        policy: FailurePolicy,
    ) -> Self {
        let filters = FilterSet::default().with_triage(settings.show_triage_issues);
        Self {
            issues,
            projects,
            settings,
            filters,
            policy,
            drag,
            outbox: VecDeque::new(),
            next_seq: 0,
            rows: OnceCell::new(),
        }
    }

    pub fn set_filters(&mut self, filters: FilterSet) {
        if filters != self.filters {
            self.filters = filters;
            self.invalidate();
        }
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Replace the view settings. Flipping `show_triage_issues` also flips
    /// the triage filter.
    pub fn set_settings(&mut self, settings: BoardSettings) {
        if settings != self.settings {
            if settings.show_triage_issues != self.settings.show_triage_issues {
                self.filters.show_triage = settings.show_triage_issues;
            }
            self.settings = settings;
            self.invalidate();
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    #[must_use]
    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Grouped rows for the current filters and settings.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        self.rows.get_or_init(|| {
            let visible = self.filters.apply(&self.issues);
            build_rows(&visible, &self.projects, &self.settings)
        })
    }

    #[must_use]
    pub fn issue(&self, issue_id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == issue_id)
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[must_use]
    pub fn cell_of(&self, issue_id: &str) -> Option<CellId> {
        self.issue(issue_id).map(Issue::cell)
    }

    /// Every cell currently laid out, row by row.
    #[must_use]
    pub fn droppable_cells(&self) -> Vec<CellId> {
        self.rows()
            .iter()
            .flat_map(|row| row.cells.iter().map(|cell| cell.id.clone()))
            .collect()
    }

    #[must_use]
    pub const fn drag(&self) -> &DragController<G> {
        &self.drag
    }

    pub const fn drag_session_mut(&mut self) -> &mut G {
        self.drag.session_mut()
    }

    pub fn begin_drag(
        &mut self,
        issue_id: &str,
        card: Rect,
        input: InputKind,
        pointer: Point,
        now: Instant,
    ) -> Result<(), ArmRefused> {
        let issue = self
            .issues
            .iter()
            .find(|i| i.id == issue_id)
            .ok_or_else(|| ArmRefused::UnknownIssue(issue_id.to_string()))?;
        self.drag.start(issue, card, input, pointer, now)
    }

    pub fn drag_move(&mut self, pointer: Point, now: Instant) -> DragUpdate {
        self.drag.pointer_move(pointer, now)
    }

    pub fn drag_tick(&mut self, now: Instant) -> DragUpdate {
        self.drag.tick(now)
    }

    /// Release the live gesture; a committed drop is applied locally and queued.
    pub fn end_drag(&mut self, now: Instant) -> DropOutcome {
        let outcome = self.drag.release(now);
        let outcome = match outcome {
            DropOutcome::Commit(intent) => self.commit(intent),
            other => other,
        };
        self.drag.settle();
        outcome
    }

    pub fn cancel_drag(&mut self) -> DropOutcome {
        self.drag.cancel()
    }

    /// Drop `issue_id` onto `target` without a gesture.
    pub fn drop_issue(&mut self, issue_id: &str, target: CellId) -> Result<DropOutcome, ArmRefused> {
        if self.drag.phase() != Phase::Idle {
            return Err(ArmRefused::SessionActive);
        }
        let issue = self
            .issue(issue_id)
            .ok_or_else(|| ArmRefused::UnknownIssue(issue_id.to_string()))?;
        let outcome = validate_drop(&issue.id, issue.state, &issue.cell(), target);
        Ok(match outcome {
            DropOutcome::Commit(intent) => self.commit(intent),
            other => other,
        })
    }

    fn knows_cell(&self, cell: &CellId) -> bool {
        match &cell.project {
            ProjectKey::Unassigned => true,
            ProjectKey::Assigned(id) => {
                self.projects.iter().any(|p| &p.id == id)
                    || self.rows().iter().any(|row| row.key == cell.project)
            }
        }
    }

    fn commit(&mut self, intent: MoveIntent) -> DropOutcome {
        if !self.knows_cell(&intent.to) {
            debug!(issue_id = %intent.issue_id, target = %intent.to, "target not on board");
            return DropOutcome::Cancelled(CancelReason::InvalidTarget);
        }
        let Some(issue) = self.issues.iter_mut().find(|i| i.id == intent.issue_id) else {
            debug!(issue_id = %intent.issue_id, "dropped issue vanished");
            return DropOutcome::Cancelled(CancelReason::InvalidTarget);
        };

        issue.apply_patch(&intent.patch());
        self.invalidate();

        let seq = self.next_seq;
        self.next_seq += 1;
        info!(
            seq,
            issue_id = %intent.issue_id,
            from = %intent.from,
            to = %intent.to,
            "move applied locally"
        );
        self.outbox.push_back(PendingMutation {
            seq,
            intent: intent.clone(),
        });
        DropOutcome::Commit(intent)
    }

    /// Mutations applied locally but not yet sent.
    #[must_use]
    pub fn pending(&self) -> impl Iterator<Item = &PendingMutation> {
        self.outbox.iter()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Send every queued mutation to `store`, oldest first.
    pub fn dispatch_pending(&mut self, store: &mut dyn IssueStore) -> DispatchReport {
        let mut report = DispatchReport::default();
        while let Some(pending) = self.outbox.pop_front() {
            let issue_id = pending.intent.issue_id.clone();
            match store.update_issue(&issue_id, &pending.patch()) {
                Ok(stored) => {
                    info!(seq = pending.seq, issue_id = %issue_id, "mutation stored");
                    if self.still_at(&issue_id, &pending.intent.to) {
                        self.mirror(stored);
                    }
                    report.applied.push(issue_id);
                }
                Err(err) => {
                    warn!(
                        seq = pending.seq,
                        issue_id = %issue_id,
                        code = %err.code(),
                        error = %err,
                        "mutation failed"
                    );
                    let rolled_back = self.policy == FailurePolicy::Rollback
                        && self.roll_back(&pending);
                    report.failed.push(FailedMutation {
                        issue_id,
                        code: err.code().code(),
                        message: err.to_string(),
                        rolled_back,
                    });
                }
            }
        }
        report
    }

    /// True if the local issue still sits where `cell` put it and no newer
    /// local move for it is queued.
    fn still_at(&self, issue_id: &str, cell: &CellId) -> bool {
        let superseded = self.outbox.iter().any(|p| p.intent.issue_id == issue_id);
        !superseded && self.cell_of(issue_id).as_ref() == Some(cell)
    }

    fn mirror(&mut self, stored: Issue) {
        if let Some(slot) = self.issues.iter_mut().find(|i| i.id == stored.id)
            && *slot != stored
        {
            *slot = stored;
            self.invalidate();
        }
    }

    fn roll_back(&mut self, pending: &PendingMutation) -> bool {
        let intent = &pending.intent;
        if !self.still_at(&intent.issue_id, &intent.to) {
            // The next queued move for this issue started from a cell the
            // store never accepted; it must fall back to our origin instead.
            if let Some(next) = self
                .outbox
                .iter_mut()
                .find(|p| p.intent.issue_id == intent.issue_id)
            {
                next.intent.from.clone_from(&intent.from);
            }
            debug!(issue_id = %intent.issue_id, "rollback skipped: superseded locally");
            return false;
        }
        let Some(issue) = self.issues.iter_mut().find(|i| i.id == intent.issue_id) else {
            return false;
        };
        issue.apply_patch(&IssuePatch::move_to(&intent.from));
        self.invalidate();
        warn!(issue_id = %intent.issue_id, cell = %intent.from, "optimistic move rolled back");
        true
    }

    /// Replace the working copy with the store's data. Queued moves are
    /// re-applied so they stay visible until dispatched.
    pub fn reload(&mut self, store: &dyn IssueStore) -> Result<(), StoreError> {
        let mut issues = store.issues()?;
        let projects = store.projects()?;
        check_reserved_ids(&projects, &issues)?;
        for pending in &self.outbox {
            if let Some(issue) = issues.iter_mut().find(|i| i.id == pending.intent.issue_id) {
                issue.apply_patch(&pending.patch());
            }
        }
        info!(
            issues = issues.len(),
            pending = self.outbox.len(),
            "board reloaded"
        );
        self.issues = issues;
        self.projects = projects;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.rows.take();
    }
}
