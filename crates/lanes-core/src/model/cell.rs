//! Typed cell identity and its composite string protocol.
//!
//! Board views address drop targets as `project:<id>:state:<state>`, where the
//! project part is the literal `unassigned` for the synthetic row. Inside the
//! engine the typed [`CellId`] is passed around instead.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::issue::WorkflowState;

/// Fixed id of the synthetic row holding issues without a project.
pub const UNASSIGNED_PROJECT_ID: &str = "unassigned";

/// Row identity: a real project or the synthetic unassigned row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKey {
    Unassigned,
    Assigned(String),
}

impl ProjectKey {
    #[must_use]
    pub fn from_option(project_id: Option<&str>) -> Self {
        project_id.map_or(Self::Unassigned, |id| Self::Assigned(id.to_string()))
    }

    /// The persisted `project_id` this key stands for.
    #[must_use]
    pub fn as_option(&self) -> Option<&str> {
        match self {
            Self::Unassigned => None,
            Self::Assigned(id) => Some(id.as_str()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.as_option().unwrap_or(UNASSIGNED_PROJECT_ID)
    }

    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        matches!(self, Self::Unassigned)
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (project, state) intersection on the board.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId {
    pub project: ProjectKey,
    pub state: WorkflowState,
}

impl CellId {
    #[must_use]
    pub const fn new(project: ProjectKey, state: WorkflowState) -> Self {
        Self { project, state }
    }

    /// Composite identifier understood by board markup.
    #[must_use]
    pub fn composite(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project:{}:state:{}", self.project, self.state)
    }
}

/// Error returned for composite identifiers that do not name a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellIdParseError {
    pub input: String,
    pub reason: &'static str,
}

impl fmt::Display for CellIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid drop target '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for CellIdParseError {}

impl FromStr for CellId {
    type Err = CellIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| CellIdParseError {
            input: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split(':').collect();
        let [tag_project, project, tag_state, state] = parts.as_slice() else {
            return Err(fail("expected project:<id>:state:<state>"));
        };
        if *tag_project != "project" || *tag_state != "state" {
            return Err(fail("expected project:<id>:state:<state>"));
        }
        if project.is_empty() {
            return Err(fail("empty project id"));
        }

        let state = state
            .parse::<WorkflowState>()
            .map_err(|_| fail("unknown workflow state"))?;
        let project = if *project == UNASSIGNED_PROJECT_ID {
            ProjectKey::Unassigned
        } else {
            ProjectKey::Assigned((*project).to_string())
        };

        Ok(Self { project, state })
    }
}
