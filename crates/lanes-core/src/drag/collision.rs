//! Geometry and drop-target collision detection.

use serde::Serialize;

use crate::model::{CellId, CellIdParseError};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned rectangle; `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left, top-right, bottom-left, bottom-right.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.x, self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Half-open containment: the right and bottom edges are outside.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// A registered droppable cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropTarget {
    pub cell: CellId,
    pub rect: Rect,
}

impl DropTarget {
    #[must_use]
    pub const fn new(cell: CellId, rect: Rect) -> Self {
        Self { cell, rect }
    }

    /// Build a target from the composite string id used by board markup.
    pub fn from_composite(id: &str, rect: Rect) -> Result<Self, CellIdParseError> {
        Ok(Self::new(id.parse()?, rect))
    }
}

/// What a resolver sees on every pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionProbe {
    /// The dragged card, translated by the pointer delta.
    pub overlay: Rect,
    pub pointer: Point,
}

/// Picks the drop target for the current drag position.
pub trait CollisionResolver {
    fn resolve<'t>(&self, probe: &CollisionProbe, targets: &'t [DropTarget])
    -> Option<&'t DropTarget>;
}

/// Target whose four corners are closest to the overlay's four corners.
///
/// The metric is the sum of distances between matching corners; the first
/// registered target wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestCorners;

impl ClosestCorners {
    #[must_use]
    pub fn corner_distance(a: &Rect, b: &Rect) -> f32 {
        a.corners()
            .iter()
            .zip(b.corners().iter())
            .map(|(p, q)| p.distance_to(*q))
            .sum()
    }
}

impl CollisionResolver for ClosestCorners {
    fn resolve<'t>(
        &self,
        probe: &CollisionProbe,
        targets: &'t [DropTarget],
    ) -> Option<&'t DropTarget> {
        let mut best: Option<(&DropTarget, f32)> = None;
        for target in targets {
            let distance = Self::corner_distance(&probe.overlay, &target.rect);
            match best {
                Some((_, current)) if distance >= current => {}
                _ => best = Some((target, distance)),
            }
        }
        best.map(|(target, _)| target)
    }
}

/// Target directly under the pointer, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerWithin;

impl CollisionResolver for PointerWithin {
    fn resolve<'t>(
        &self,
        probe: &CollisionProbe,
        targets: &'t [DropTarget],
    ) -> Option<&'t DropTarget> {
        targets.iter().find(|t| t.rect.contains(probe.pointer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProjectKey, WorkflowState};

    fn target(project: &str, state: WorkflowState, rect: Rect) -> DropTarget {
        DropTarget::new(
            CellId::new(ProjectKey::Assigned(project.to_string()), state),
            rect,
        )
    }

    fn grid() -> Vec<DropTarget> {
        vec![
            target("A", WorkflowState::Todo, Rect::new(0.0, 0.0, 100.0, 50.0)),
            target("A", WorkflowState::InProgress, Rect::new(100.0, 0.0, 100.0, 50.0)),
            target("B", WorkflowState::Todo, Rect::new(0.0, 50.0, 100.0, 50.0)),
            target("B", WorkflowState::InProgress, Rect::new(100.0, 50.0, 100.0, 50.0)),
        ]
    }

    fn probe(overlay: Rect) -> CollisionProbe {
        CollisionProbe {
            overlay,
            pointer: Point::new(overlay.x + 1.0, overlay.y + 1.0),
        }
    }

    #[test]
    fn identical_rect_has_zero_corner_distance() {
        let r = Rect::new(3.0, 4.0, 10.0, 10.0);
        assert!(ClosestCorners::corner_distance(&r, &r).abs() < f32::EPSILON);
        let moved = r.translated(3.0, 4.0);
        assert!((ClosestCorners::corner_distance(&r, &moved) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn closest_corners_picks_nearest_cell() {
        let targets = grid();
        let card = Rect::new(110.0, 60.0, 80.0, 30.0);
        let hit = ClosestCorners.resolve(&probe(card), &targets).unwrap();
        assert_eq!(hit.cell.composite(), "project:B:state:in_progress");

        let card = Rect::new(5.0, 5.0, 80.0, 30.0);
        let hit = ClosestCorners.resolve(&probe(card), &targets).unwrap();
        assert_eq!(hit.cell.composite(), "project:A:state:todo");
    }

    #[test]
    fn closest_corners_breaks_ties_by_registration_order() {
        let targets = vec![
            target("A", WorkflowState::Todo, Rect::new(0.0, 0.0, 10.0, 10.0)),
            target("B", WorkflowState::Todo, Rect::new(0.0, 0.0, 10.0, 10.0)),
        ];
        let hit = ClosestCorners
            .resolve(&probe(Rect::new(0.0, 0.0, 10.0, 10.0)), &targets)
            .unwrap();
        assert_eq!(hit.cell.project, ProjectKey::Assigned("A".to_string()));
    }

    #[test]
    fn no_targets_no_collision() {
        assert!(
            ClosestCorners
                .resolve(&probe(Rect::new(0.0, 0.0, 1.0, 1.0)), &[])
                .is_none()
        );
    }

    #[test]
    fn pointer_within_requires_pointer_inside() {
        let targets = grid();
        let inside = CollisionProbe {
            overlay: Rect::new(0.0, 0.0, 10.0, 10.0),
            pointer: Point::new(150.0, 75.0),
        };
        let hit = PointerWithin.resolve(&inside, &targets).unwrap();
        assert_eq!(hit.cell.composite(), "project:B:state:in_progress");

        let outside = CollisionProbe {
            overlay: Rect::new(0.0, 0.0, 10.0, 10.0),
            pointer: Point::new(500.0, 500.0),
        };
        assert!(PointerWithin.resolve(&outside, &targets).is_none());
    }

    #[test]
    fn composite_targets_must_parse() {
        let rect = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(DropTarget::from_composite("project:A:state:todo", rect).is_ok());
        assert!(DropTarget::from_composite("cell-7", rect).is_err());
    }

    #[test]
    fn rect_union_and_containment() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 10.0);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, 0.0, 30.0, 15.0));
        assert!(u.contains(Point::new(29.0, 14.0)));
        assert!(!u.contains(Point::new(30.0, 14.0)));
    }
}
