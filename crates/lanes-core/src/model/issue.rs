use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::cell::{CellId, ProjectKey};

/// Lifecycle stage of an issue. Declaration order is the default column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Triage,
    Todo,
    InProgress,
    Blocked,
    WaitingInfo,
    Done,
    Canceled,
    Duplicate,
}

impl WorkflowState {
    /// Every state, in default column order.
    pub const ALL: [Self; 8] = [
        Self::Triage,
        Self::Todo,
        Self::InProgress,
        Self::Blocked,
        Self::WaitingInfo,
        Self::Done,
        Self::Canceled,
        Self::Duplicate,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::WaitingInfo => "waiting_info",
            Self::Done => "done",
            Self::Canceled => "canceled",
            Self::Duplicate => "duplicate",
        }
    }

    /// Column heading shown by board views.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Triage => "Triage",
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Blocked => "Blocked",
            Self::WaitingInfo => "Waiting Info",
            Self::Done => "Done",
            Self::Canceled => "Canceled",
            Self::Duplicate => "Duplicate",
        }
    }

    /// `canceled` and `duplicate` are terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Canceled | Self::Duplicate)
    }

    /// Validate a drag-driven move from `self` into `target`.
    ///
    /// Entering a terminal state is only allowed from another terminal state.
    /// Every other combination is allowed, including staying put.
    pub const fn can_drag_to(self, target: Self) -> Result<(), InvalidTransition> {
        if target.is_terminal() && !self.is_terminal() {
            return Err(InvalidTransition {
                from: self,
                to: target,
                reason: "terminal states are not entered by drag",
            });
        }
        Ok(())
    }
}

/// Issue priority, `P0` being the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::P0, Self::P1, Self::P2, Self::P3];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P0 => "p0",
            Self::P1 => "p1",
            Self::P2 => "p2",
            Self::P3 => "p3",
        }
    }
}

/// A trackable work item as mirrored by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    pub title: String,
    pub state: WorkflowState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Minimal issue with only the required fields set.
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        title: impl Into<String>,
        state: WorkflowState,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            title: title.into(),
            state,
            priority: None,
            project_id: None,
            assignee_id: None,
            initiative_id: None,
            due_at: None,
        }
    }

    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, assignee_id: impl Into<String>) -> Self {
        self.assignee_id = Some(assignee_id.into());
        self
    }

    #[must_use]
    pub fn with_initiative(mut self, initiative_id: impl Into<String>) -> Self {
        self.initiative_id = Some(initiative_id.into());
        self
    }

    /// Row key of this issue; a missing project means the unassigned row.
    #[must_use]
    pub fn project_key(&self) -> ProjectKey {
        ProjectKey::from_option(self.project_id.as_deref())
    }

    /// The (project, state) cell this issue currently occupies.
    #[must_use]
    pub fn cell(&self) -> CellId {
        CellId::new(self.project_key(), self.state)
    }

    /// Apply a patch in place. Fields absent from the patch are left alone.
    pub fn apply_patch(&mut self, patch: &IssuePatch) {
        if let Some(state) = patch.state {
            self.state = state;
        }
        if let Some(project) = &patch.project {
            self.project_id = project.as_option().map(str::to_string);
        }
    }
}

/// Partial update sent to the issue store.
///
/// `project: Some(ProjectKey::Unassigned)` clears the project; `None` leaves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePatch {
    pub state: Option<WorkflowState>,
    pub project: Option<ProjectKey>,
}

impl IssuePatch {
    /// Patch moving an issue into `cell`.
    #[must_use]
    pub fn move_to(cell: &CellId) -> Self {
        Self {
            state: Some(cell.state),
            project: Some(cell.project.clone()),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.state.is_none() && self.project.is_none()
    }
}

/// Error returned when a drag transition is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: WorkflowState,
    pub to: WorkflowState,
    pub reason: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.reason)
    }
}

impl std::error::Error for InvalidTransition {}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for WorkflowState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "triage" => Ok(Self::Triage),
            "todo" => Ok(Self::Todo),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "waiting_info" | "waiting-info" => Ok(Self::WaitingInfo),
            "done" => Ok(Self::Done),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            "duplicate" => Ok(Self::Duplicate),
            _ => Err(ParseEnumError {
                expected: "state",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "p0" => Ok(Self::P0),
            "p1" => Ok(Self::P1),
            "p2" => Ok(Self::P2),
            "p3" => Ok(Self::P3),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_json_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&WorkflowState::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&WorkflowState::WaitingInfo).unwrap(),
            "\"waiting_info\""
        );
        assert_eq!(serde_json::to_string(&Priority::P2).unwrap(), "\"p2\"");
        assert_eq!(
            serde_json::from_str::<WorkflowState>("\"duplicate\"").unwrap(),
            WorkflowState::Duplicate
        );
    }

    #[test]
    fn display_parse_agree() {
        for state in WorkflowState::ALL {
            assert_eq!(state.to_string().parse::<WorkflowState>().unwrap(), state);
        }
        for priority in Priority::ALL {
            assert_eq!(priority.to_string().parse::<Priority>().unwrap(), priority);
        }
    }

    #[test]
    fn parse_accepts_aliases_and_rejects_unknown() {
        assert_eq!(
            " In-Progress ".parse::<WorkflowState>().unwrap(),
            WorkflowState::InProgress
        );
        assert_eq!(
            "cancelled".parse::<WorkflowState>().unwrap(),
            WorkflowState::Canceled
        );
        let err = "archived".parse::<WorkflowState>().unwrap_err();
        assert_eq!(err.expected, "state");
        assert!("p9".parse::<Priority>().is_err());
    }

    #[test]
    fn only_canceled_and_duplicate_are_terminal() {
        let terminal: Vec<_> = WorkflowState::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![WorkflowState::Canceled, WorkflowState::Duplicate]
        );
    }

    #[test]
    fn drag_transition_rules() {
        use WorkflowState::*;
        assert!(Todo.can_drag_to(InProgress).is_ok());
        assert!(Done.can_drag_to(Todo).is_ok());
        assert!(Canceled.can_drag_to(Duplicate).is_ok());
        assert!(Duplicate.can_drag_to(Todo).is_ok());
        assert!(matches!(
            Todo.can_drag_to(Canceled),
            Err(InvalidTransition {
                from: Todo,
                to: Canceled,
                ..
            })
        ));
        assert!(Done.can_drag_to(Duplicate).is_err());
    }

    #[test]
    fn issue_deserializes_with_optional_fields_missing() {
        let issue: Issue = serde_json::from_str(
            r#"{"id":"1","key":"ENG-1","title":"Fix login","state":"todo","project_id":null}"#,
        )
        .unwrap();
        assert_eq!(issue.state, WorkflowState::Todo);
        assert!(issue.project_id.is_none());
        assert!(issue.priority.is_none());
        assert_eq!(issue.project_key(), ProjectKey::Unassigned);
    }

    #[test]
    fn apply_patch_moves_and_clears_project() {
        let mut issue = Issue::new("1", "ENG-1", "t", WorkflowState::Todo).with_project("A");
        issue.apply_patch(&IssuePatch {
            state: Some(WorkflowState::Blocked),
            project: None,
        });
        assert_eq!(issue.state, WorkflowState::Blocked);
        assert_eq!(issue.project_id.as_deref(), Some("A"));

        issue.apply_patch(&IssuePatch {
            state: None,
            project: Some(ProjectKey::Unassigned),
        });
        assert!(issue.project_id.is_none());
        assert_eq!(issue.state, WorkflowState::Blocked);
    }
}
