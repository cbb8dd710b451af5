//! Drag-and-drop state machine.
//!
//! ```text
//! Idle -> Armed -> Dragging -> Committing -> Idle
//!           |          |
//!           +----------+-----> (cancelled) -> Idle
//! ```
//!
//! The controller owns at most one session. It decides activation (distance
//! for pointers, hold delay for touch), asks its [`GestureSession`] for the
//! candidate cell, and validates the drop. It never mutates issues itself: a
//! successful drop yields a [`MoveIntent`] for the board to apply.

pub mod collision;
pub mod gesture;

pub use collision::{
    ClosestCorners, CollisionProbe, CollisionResolver, DropTarget, Point, PointerWithin, Rect,
};
pub use gesture::{DndSession, GestureSession, InputKind};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::model::{CellId, InvalidTransition, Issue, IssuePatch, WorkflowState};

/// Activation thresholds, read from the `[drag]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Pointer travel (px) before a press becomes a drag.
    pub pointer_distance: f32,
    /// Touch hold time before a press becomes a drag.
    pub touch_delay_ms: u64,
    /// Touch travel (px) allowed during the hold.
    pub touch_tolerance: f32,
    pub arm_terminal_cards: bool,
}

impl DragConfig {
    #[must_use]
    pub const fn touch_delay(&self) -> Duration {
        Duration::from_millis(self.touch_delay_ms)
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            pointer_distance: 3.0,
            touch_delay_ms: 250,
            touch_tolerance: 5.0,
            arm_terminal_cards: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Armed,
    Dragging,
    Committing,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::Dragging => "dragging",
            Self::Committing => "committing",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a gesture start did not arm a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmRefused {
    SessionActive,
    TerminalCard(WorkflowState),
    UnknownIssue(String),
}

impl fmt::Display for ArmRefused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionActive => f.write_str("a drag session is already active"),
            Self::TerminalCard(state) => write!(f, "{state} cards are not draggable"),
            Self::UnknownIssue(id) => write!(f, "issue '{id}' is not on the board"),
        }
    }
}

impl std::error::Error for ArmRefused {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Released before the activation constraint was met (a click).
    NotActivated,
    NoTarget,
    InvalidTarget,
    Escape,
    /// Touch moved past tolerance during the hold.
    ScrollIntent,
}

/// Result of feeding a move or tick into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragUpdate {
    /// Armed, constraint not met yet.
    Pending,
    Activated { candidate: Option<CellId> },
    Moved { candidate: Option<CellId> },
    Aborted(CancelReason),
    /// No session to update.
    Ignored,
}

/// A validated move of one issue between cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveIntent {
    pub issue_id: String,
    pub from: CellId,
    pub to: CellId,
}

impl MoveIntent {
    #[must_use]
    pub fn patch(&self) -> IssuePatch {
        IssuePatch::move_to(&self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Commit(MoveIntent),
    SelfDrop,
    Rejected(InvalidTransition),
    Cancelled(CancelReason),
    Ignored,
}

impl DropOutcome {
    #[must_use]
    pub const fn is_commit(&self) -> bool {
        matches!(self, Self::Commit(_))
    }
}

/// Decide what dropping an issue (currently `current`, sitting in `origin`)
/// onto `target` means. Shared by drags and headless drops.
#[must_use]
pub fn validate_drop(
    issue_id: &str,
    current: WorkflowState,
    origin: &CellId,
    target: CellId,
) -> DropOutcome {
    if &target == origin {
        debug!(issue_id, cell = %target, "self-drop ignored");
        return DropOutcome::SelfDrop;
    }
    if let Err(err) = current.can_drag_to(target.state) {
        debug!(issue_id, %err, "drop rejected");
        return DropOutcome::Rejected(err);
    }
    DropOutcome::Commit(MoveIntent {
        issue_id: issue_id.to_string(),
        from: origin.clone(),
        to: target,
    })
}

#[derive(Debug, Clone)]
struct Active {
    issue_id: String,
    current: WorkflowState,
    origin: CellId,
    input: InputKind,
    card: Rect,
    start: Point,
    pointer: Point,
    armed_at: Instant,
    candidate: Option<CellId>,
}

/// Single-session drag state machine.
#[derive(Debug)]
pub struct DragController<G: GestureSession = DndSession> {
    config: DragConfig,
    session: G,
    phase: Phase,
    active: Option<Active>,
}

impl DragController<DndSession> {
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self::with_session(config, DndSession::new())
    }
}

impl<G: GestureSession> DragController<G> {
    #[must_use]
    pub const fn with_session(config: DragConfig, session: G) -> Self {
        Self {
            config,
            session,
            phase: Phase::Idle,
            active: None,
        }
    }

    /// Arm a session for `issue`, whose card occupies `card`.
    pub fn start(
        &mut self,
        issue: &Issue,
        card: Rect,
        input: InputKind,
        pointer: Point,
        now: Instant,
    ) -> Result<(), ArmRefused> {
        if self.phase != Phase::Idle {
            debug!(issue_id = %issue.id, phase = %self.phase, "start refused: session active");
            return Err(ArmRefused::SessionActive);
        }
        if issue.state.is_terminal() && !self.config.arm_terminal_cards {
            debug!(issue_id = %issue.id, state = %issue.state, "start refused: terminal card");
            return Err(ArmRefused::TerminalCard(issue.state));
        }

        self.active = Some(Active {
            issue_id: issue.id.clone(),
            current: issue.state,
            origin: issue.cell(),
            input,
            card,
            start: pointer,
            pointer,
            armed_at: now,
            candidate: None,
        });
        self.phase = Phase::Armed;
        debug!(issue_id = %issue.id, ?input, "armed");
        Ok(())
    }

    pub fn pointer_move(&mut self, pointer: Point, now: Instant) -> DragUpdate {
        let Some(active) = self.active.as_mut() else {
            return DragUpdate::Ignored;
        };
        active.pointer = pointer;

        match self.phase {
            Phase::Armed => {
                let travelled = active.start.distance_to(pointer);
                let input = active.input;
                match input {
                    InputKind::Pointer if travelled >= self.config.pointer_distance => {
                        self.activate()
                    }
                    InputKind::Pointer => DragUpdate::Pending,
                    InputKind::Touch if travelled > self.config.touch_tolerance => {
                        debug!(issue_id = %active.issue_id, travelled, "touch moved during hold");
                        self.reset();
                        DragUpdate::Aborted(CancelReason::ScrollIntent)
                    }
                    InputKind::Touch => self.tick(now),
                }
            }
            Phase::Dragging => {
                let candidate = self.session.on_move(pointer);
                active.candidate.clone_from(&candidate);
                DragUpdate::Moved { candidate }
            }
            Phase::Idle | Phase::Committing => DragUpdate::Ignored,
        }
    }

    /// Advance time without movement; activates touch holds.
    pub fn tick(&mut self, now: Instant) -> DragUpdate {
        let Some(active) = self.active.as_ref() else {
            return DragUpdate::Ignored;
        };
        if self.phase != Phase::Armed || active.input != InputKind::Touch {
            return DragUpdate::Ignored;
        }
        if now.saturating_duration_since(active.armed_at) >= self.config.touch_delay() {
            self.activate()
        } else {
            DragUpdate::Pending
        }
    }

    fn activate(&mut self) -> DragUpdate {
        let Some(active) = self.active.as_mut() else {
            return DragUpdate::Ignored;
        };
        self.session.on_start(active.card, active.start);
        let candidate = self.session.on_move(active.pointer);
        active.candidate.clone_from(&candidate);
        self.phase = Phase::Dragging;
        debug!(issue_id = %active.issue_id, origin = %active.origin, "drag activated");
        DragUpdate::Activated { candidate }
    }

    /// Pointer or finger lifted.
    pub fn release(&mut self, now: Instant) -> DropOutcome {
        if self.phase == Phase::Armed {
            // A touch hold that elapsed without a tick still counts.
            let _ = self.tick(now);
        }
        match self.phase {
            Phase::Idle | Phase::Committing => DropOutcome::Ignored,
            Phase::Armed => {
                debug!("released before activation");
                self.reset();
                DropOutcome::Cancelled(CancelReason::NotActivated)
            }
            Phase::Dragging => {
                let target = self.session.on_end();
                let Some(active) = self.active.as_ref() else {
                    self.reset();
                    return DropOutcome::Ignored;
                };
                let outcome = match target {
                    None => {
                        debug!(issue_id = %active.issue_id, "released outside any target");
                        DropOutcome::Cancelled(CancelReason::NoTarget)
                    }
                    Some(target) => {
                        validate_drop(&active.issue_id, active.current, &active.origin, target)
                    }
                };
                if let DropOutcome::Commit(intent) = &outcome {
                    info!(
                        issue_id = %intent.issue_id,
                        from = %intent.from,
                        to = %intent.to,
                        "drop committed"
                    );
                    self.phase = Phase::Committing;
                } else {
                    self.reset();
                }
                outcome
            }
        }
    }

    /// Escape: abandon whatever session is live.
    pub fn cancel(&mut self) -> DropOutcome {
        match self.phase {
            Phase::Armed | Phase::Dragging => {
                if self.phase == Phase::Dragging {
                    let _ = self.session.on_end();
                }
                debug!("drag cancelled");
                self.reset();
                DropOutcome::Cancelled(CancelReason::Escape)
            }
            Phase::Idle | Phase::Committing => DropOutcome::Ignored,
        }
    }

    /// The board has applied the committed intent; end the session.
    pub fn settle(&mut self) {
        if self.phase == Phase::Committing {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.active = None;
        self.phase = Phase::Idle;
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn config(&self) -> &DragConfig {
        &self.config
    }

    #[must_use]
    pub fn dragged_issue(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.issue_id.as_str())
    }

    #[must_use]
    pub fn origin(&self) -> Option<&CellId> {
        self.active.as_ref().map(|a| &a.origin)
    }

    /// Current candidate cell while dragging.
    #[must_use]
    pub fn candidate(&self) -> Option<&CellId> {
        match self.phase {
            Phase::Dragging => self.active.as_ref().and_then(|a| a.candidate.as_ref()),
            _ => None,
        }
    }

    /// Card rectangle translated by the pointer delta while dragging.
    #[must_use]
    pub fn overlay(&self) -> Option<Rect> {
        match (self.phase, self.active.as_ref()) {
            (Phase::Dragging, Some(a)) => Some(
                a.card
                    .translated(a.pointer.x - a.start.x, a.pointer.y - a.start.y),
            ),
            _ => None,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &G {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut G {
        &mut self.session
    }
}
