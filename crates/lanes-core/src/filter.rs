//! Working-set filter applied before grouping.
//!
//! Every active criterion must hold (AND). An empty set or blank search text is
//! an open criterion and passes everything through.

use std::collections::BTreeSet;

use crate::model::{Issue, Priority, WorkflowState};

/// Filter criteria applied to the issue collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Case-insensitive substring matched against title and key.
    pub search: String,
    pub initiatives: BTreeSet<String>,
    pub assignees: BTreeSet<String>,
    pub priorities: BTreeSet<Priority>,
    pub states: BTreeSet<WorkflowState>,
    /// Triage issues are hidden unless this is set.
    pub show_triage: bool,
}

impl FilterSet {
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    #[must_use]
    pub fn with_states(mut self, states: impl IntoIterator<Item = WorkflowState>) -> Self {
        self.states.extend(states);
        self
    }

    #[must_use]
    pub fn with_priorities(mut self, priorities: impl IntoIterator<Item = Priority>) -> Self {
        self.priorities.extend(priorities);
        self
    }

    #[must_use]
    pub fn with_assignees<S: Into<String>>(mut self, assignees: impl IntoIterator<Item = S>) -> Self {
        self.assignees.extend(assignees.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_initiatives<S: Into<String>>(
        mut self,
        initiatives: impl IntoIterator<Item = S>,
    ) -> Self {
        self.initiatives
            .extend(initiatives.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub const fn with_triage(mut self, show_triage: bool) -> Self {
        self.show_triage = show_triage;
        self
    }

    /// Returns true if no criterion narrows the set beyond hiding triage.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.initiatives.is_empty()
            && self.assignees.is_empty()
            && self.priorities.is_empty()
            && self.states.is_empty()
    }

    /// Apply this filter, keeping the relative order of `issues`.
    #[must_use]
    pub fn apply(&self, issues: &[Issue]) -> Vec<Issue> {
        let needle = self.needle();
        issues
            .iter()
            .filter(|issue| self.matches_with(issue, needle.as_deref()))
            .cloned()
            .collect()
    }

    /// Returns true if the issue satisfies all active criteria.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        self.matches_with(issue, self.needle().as_deref())
    }

    fn needle(&self) -> Option<String> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    fn matches_with(&self, issue: &Issue, needle: Option<&str>) -> bool {
        if issue.state == WorkflowState::Triage && !self.show_triage {
            return false;
        }
        if let Some(needle) = needle
            && !issue.title.to_lowercase().contains(needle)
            && !issue.key.to_lowercase().contains(needle)
        {
            return false;
        }
        if !member(&self.initiatives, issue.initiative_id.as_ref()) {
            return false;
        }
        if !member(&self.assignees, issue.assignee_id.as_ref()) {
            return false;
        }
        if !member(&self.priorities, issue.priority.as_ref()) {
            return false;
        }
        if !self.states.is_empty() && !self.states.contains(&issue.state) {
            return false;
        }
        true
    }
}

/// Open set passes everything; otherwise the field must be present and listed.
fn member<T: Ord>(set: &BTreeSet<T>, value: Option<&T>) -> bool {
    set.is_empty() || value.is_some_and(|v| set.contains(v))
}

/// Convenience wrapper for `filters.apply(issues)`.
#[must_use]
pub fn apply(issues: &[Issue], filters: &FilterSet) -> Vec<Issue> {
    filters.apply(issues)
}
