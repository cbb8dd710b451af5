//! Issue persistence behind a narrow trait.
//!
//! The board only reads issues and projects and sends partial updates. Both
//! bundled backends share [`apply_patch`] so they validate identically.

pub mod json;
pub mod memory;

pub use json::{BoardDocument, JsonFileStore};
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::model::{Issue, IssuePatch, Project, ProjectKey, UNASSIGNED_PROJECT_ID};

/// Backing store for one organization's issues.
pub trait IssueStore {
    fn org_id(&self) -> &str;

    fn issues(&self) -> Result<Vec<Issue>, StoreError>;

    fn projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Apply `patch` to the issue and return the stored result.
    fn update_issue(&mut self, issue_id: &str, patch: &IssuePatch) -> Result<Issue, StoreError>;
}

/// Refuse data that uses the unassigned row's id as a real project id.
///
/// `project:unassigned:state:<state>` always parses to the unassigned row, so
/// such a project could never be targeted.
///
/// # Errors
///
/// Returns [`StoreError::ReservedProjectId`] if a project or an issue uses it.
pub fn check_reserved_ids(projects: &[Project], issues: &[Issue]) -> Result<(), StoreError> {
    let reserved = projects.iter().any(|p| p.id == UNASSIGNED_PROJECT_ID)
        || issues
            .iter()
            .any(|i| i.project_id.as_deref() == Some(UNASSIGNED_PROJECT_ID));
    if reserved {
        return Err(StoreError::ReservedProjectId(UNASSIGNED_PROJECT_ID.to_string()));
    }
    Ok(())
}

/// Validate and apply a patch against an in-memory issue list.
///
/// A patch naming a project that is not in `projects` is refused; clearing the
/// project is always allowed.
pub(crate) fn apply_patch(
    issues: &mut [Issue],
    projects: &[Project],
    issue_id: &str,
    patch: &IssuePatch,
) -> Result<Issue, StoreError> {
    if let Some(ProjectKey::Assigned(project_id)) = &patch.project
        && !projects.iter().any(|p| &p.id == project_id)
    {
        return Err(StoreError::ProjectNotFound(project_id.clone()));
    }

    let issue = issues
        .iter_mut()
        .find(|i| i.id == issue_id)
        .ok_or_else(|| StoreError::IssueNotFound(issue_id.to_string()))?;
    issue.apply_patch(patch);
    Ok(issue.clone())
}
