//! Board data model: issues, projects, and cell identity.

pub mod cell;
pub mod issue;
pub mod project;

pub use cell::{CellId, CellIdParseError, ProjectKey, UNASSIGNED_PROJECT_ID};
pub use issue::{Issue, IssuePatch, InvalidTransition, ParseEnumError, Priority, WorkflowState};
pub use project::{Project, ProjectStatus, status_rank};
