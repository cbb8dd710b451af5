//! The gesture seam between the drag controller and whatever tracks geometry.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::collision::{ClosestCorners, CollisionProbe, CollisionResolver, DropTarget, Point, Rect};
use crate::model::CellId;

/// Where the gesture comes from. Touch uses a hold delay instead of distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Pointer,
    Touch,
}

/// Geometry side of a drag: overlay tracking and target resolution.
///
/// The controller drives it once the activation constraint is met and only
/// ever looks at the cells it hands back.
pub trait GestureSession {
    /// Drag activated with the card at `card` and the pointer at `pointer`.
    fn on_start(&mut self, card: Rect, pointer: Point);

    /// Pointer moved; returns the current candidate cell.
    fn on_move(&mut self, pointer: Point) -> Option<CellId>;

    /// Drag finished or aborted; returns the last candidate and resets.
    fn on_end(&mut self) -> Option<CellId>;

    fn registered_targets(&self) -> &[DropTarget];

    fn collision_resolver(&self) -> &dyn CollisionResolver;
}

#[derive(Debug, Clone, Copy)]
struct Tracking {
    card: Rect,
    origin: Point,
    pointer: Point,
}

/// Default session: overlay follows the pointer, targets registered by the view.
pub struct DndSession {
    targets: Vec<DropTarget>,
    resolver: Box<dyn CollisionResolver>,
    tracking: Option<Tracking>,
    candidate: Option<CellId>,
}

impl DndSession {
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolver(Box::new(ClosestCorners))
    }

    #[must_use]
    pub fn with_resolver(resolver: Box<dyn CollisionResolver>) -> Self {
        Self {
            targets: Vec::new(),
            resolver,
            tracking: None,
            candidate: None,
        }
    }

    /// Replace the droppable targets. Order is the tie-break order.
    pub fn set_targets(&mut self, targets: Vec<DropTarget>) {
        self.targets = targets;
    }

    /// Card rectangle translated by the pointer delta, while tracking.
    #[must_use]
    pub fn overlay(&self) -> Option<Rect> {
        self.tracking.map(|t| {
            t.card
                .translated(t.pointer.x - t.origin.x, t.pointer.y - t.origin.y)
        })
    }

    #[must_use]
    pub const fn candidate(&self) -> Option<&CellId> {
        self.candidate.as_ref()
    }

    fn bounds(&self) -> Option<Rect> {
        self.targets
            .iter()
            .map(|t| t.rect)
            .reduce(|acc, r| acc.union(&r))
    }

    fn resolve(&self, overlay: Rect, pointer: Point) -> Option<CellId> {
        // Pointer off the board entirely means "no target", even though
        // closest-corners would always find one.
        if !self.bounds()?.contains(pointer) {
            return None;
        }
        let probe = CollisionProbe { overlay, pointer };
        self.resolver
            .resolve(&probe, &self.targets)
            .map(|t| t.cell.clone())
    }
}

impl Default for DndSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DndSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DndSession")
            .field("targets", &self.targets.len())
            .field("tracking", &self.tracking)
            .field("candidate", &self.candidate)
            .finish_non_exhaustive()
    }
}

impl GestureSession for DndSession {
    fn on_start(&mut self, card: Rect, pointer: Point) {
        self.tracking = Some(Tracking {
            card,
            origin: pointer,
            pointer,
        });
        self.candidate = None;
    }

    fn on_move(&mut self, pointer: Point) -> Option<CellId> {
        let tracking = self.tracking.as_mut()?;
        tracking.pointer = pointer;
        let overlay = self.overlay()?;
        self.candidate = self.resolve(overlay, pointer);
        self.candidate.clone()
    }

    fn on_end(&mut self) -> Option<CellId> {
        self.tracking = None;
        self.candidate.take()
    }

    fn registered_targets(&self) -> &[DropTarget] {
        &self.targets
    }

    fn collision_resolver(&self) -> &dyn CollisionResolver {
        self.resolver.as_ref()
    }
}
