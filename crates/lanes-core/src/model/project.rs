use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::cell::UNASSIGNED_PROJECT_ID;
use super::issue::{ParseEnumError, normalize};

/// Planning status of a project.
///
/// Statuses this build does not know deserialize to [`ProjectStatus::Unknown`]
/// and sort after every known status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Planned,
    Paused,
    Done,
    #[serde(other)]
    Unknown,
}

impl ProjectStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Planned => "planned",
            Self::Paused => "paused",
            Self::Done => "done",
            Self::Unknown => "unknown",
        }
    }

    /// Row sort rank: active < planned < paused < done < unknown.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Planned => 1,
            Self::Paused => 2,
            Self::Done => 3,
            Self::Unknown => 4,
        }
    }
}

/// Rank used for row ordering; a project without a status sorts with `Unknown`.
#[must_use]
pub const fn status_rank(status: Option<ProjectStatus>) -> u8 {
    match status {
        Some(status) => status.rank(),
        None => ProjectStatus::Unknown.rank(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: None,
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// The synthetic row for issues that have no project.
    #[must_use]
    pub fn unassigned() -> Self {
        Self::new(UNASSIGNED_PROJECT_ID, "Unassigned")
    }

    /// Row for an issue whose project id is not in the project list.
    #[must_use]
    pub fn placeholder(id: &str) -> Self {
        Self::new(id, id)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "planned" => Ok(Self::Planned),
            "paused" => Ok(Self::Paused),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError {
                expected: "project status",
                got: s.to_string(),
            }),
        }
    }
}
