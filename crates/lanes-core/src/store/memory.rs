use super::{IssueStore, apply_patch};
use crate::error::StoreError;
use crate::model::{Issue, IssuePatch, Project};

/// In-process store. Records every update call and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    org_id: String,
    projects: Vec<Project>,
    issues: Vec<Issue>,
    calls: Vec<(String, IssuePatch)>,
    failures_left: usize,
}

impl MemoryStore {
    pub fn new(org_id: impl Into<String>, projects: Vec<Project>, issues: Vec<Issue>) -> Self {
        Self {
            org_id: org_id.into(),
            projects,
            issues,
            calls: Vec::new(),
            failures_left: 0,
        }
    }

    /// Reject the next `n` updates with [`StoreError::Rejected`].
    pub const fn fail_next(&mut self, n: usize) {
        self.failures_left = n;
    }

    /// Every `update_issue` call received, in order, including failed ones.
    #[must_use]
    pub fn calls(&self) -> &[(String, IssuePatch)] {
        &self.calls
    }

    #[must_use]
    pub fn issue(&self, issue_id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == issue_id)
    }

    /// Overwrite an issue as if another client had edited it.
    pub fn replace_issue(&mut self, issue: Issue) {
        match self.issues.iter_mut().find(|i| i.id == issue.id) {
            Some(slot) => *slot = issue,
            None => self.issues.push(issue),
        }
    }
}

impl IssueStore for MemoryStore {
    fn org_id(&self) -> &str {
        &self.org_id
    }

    fn issues(&self) -> Result<Vec<Issue>, StoreError> {
        Ok(self.issues.clone())
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.projects.clone())
    }

    fn update_issue(&mut self, issue_id: &str, patch: &IssuePatch) -> Result<Issue, StoreError> {
        self.calls.push((issue_id.to_string(), patch.clone()));
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(StoreError::Rejected {
                issue_id: issue_id.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        apply_patch(&mut self.issues, &self.projects, issue_id, patch)
    }
}
