use std::fmt;
use std::path::PathBuf;

use crate::lock::LockError;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    InvalidColumnOrder,
    IssueNotFound,
    ProjectNotFound,
    InvalidDropTarget,
    DisallowedTransition,
    InvalidEnumValue,
    StoreReadFailed,
    StoreParseFailed,
    ReservedProjectId,
    StoreWriteFailed,
    LockContention,
    MutationRejected,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidColumnOrder => "E1003",
            Self::IssueNotFound => "E2001",
            Self::ProjectNotFound => "E2002",
            Self::InvalidDropTarget => "E2003",
            Self::DisallowedTransition => "E2004",
            Self::InvalidEnumValue => "E2005",
            Self::StoreReadFailed => "E3001",
            Self::StoreParseFailed => "E3002",
            Self::ReservedProjectId => "E3003",
            Self::StoreWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::MutationRejected => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Board not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidColumnOrder => "Invalid column order",
            Self::IssueNotFound => "Issue not found",
            Self::ProjectNotFound => "Project not found",
            Self::InvalidDropTarget => "Invalid drop target",
            Self::DisallowedTransition => "Transition not allowed by drag",
            Self::InvalidEnumValue => "Invalid state/priority/status value",
            Self::StoreReadFailed => "Issue store read failed",
            Self::StoreParseFailed => "Issue store document is malformed",
            Self::ReservedProjectId => "Project id is reserved",
            Self::StoreWriteFailed => "Issue store write failed",
            Self::LockContention => "Lock contention",
            Self::MutationRejected => "Issue store rejected the update",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `lanes init` to create .lanes/board.json."),
            Self::ConfigParseError => Some("Fix syntax in .lanes/config.toml and retry."),
            Self::InvalidColumnOrder => {
                Some("List every workflow state exactly once in board.column_order.")
            }
            Self::IssueNotFound | Self::ProjectNotFound => None,
            Self::InvalidDropTarget => Some("Use a target of the form project:<id>:state:<state>."),
            Self::DisallowedTransition => {
                Some("Canceled and duplicate are only reachable from another terminal state.")
            }
            Self::InvalidEnumValue => Some("Use one of the documented state/priority values."),
            Self::StoreReadFailed | Self::StoreWriteFailed => {
                Some("Check that the board file exists and is readable/writable.")
            }
            Self::StoreParseFailed => Some("Fix the JSON in the board file or restore a backup."),
            Self::ReservedProjectId => {
                Some("Rename the project `unassigned`; that id names the row for issues without a project.")
            }
            Self::LockContention => Some("Retry after the other `lanes` process releases its lock."),
            Self::MutationRejected => Some("Reload the board; the store state may have changed."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures surfaced by an [`IssueStore`](crate::store::IssueStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("issue '{0}' not found")]
    IssueNotFound(String),

    #[error("project '{0}' not found")]
    ProjectNotFound(String),

    #[error("store rejected update to '{issue_id}': {reason}")]
    Rejected { issue_id: String, reason: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("project id '{0}' is reserved for the unassigned row")]
    ReservedProjectId(String),

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl StoreError {
    /// Machine-readable code associated with this store error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::IssueNotFound(_) => ErrorCode::IssueNotFound,
            Self::ProjectNotFound(_) => ErrorCode::ProjectNotFound,
            Self::Rejected { .. } => ErrorCode::MutationRejected,
            Self::Io { source, .. } if matches!(source.kind(), std::io::ErrorKind::NotFound) => {
                ErrorCode::NotInitialized
            }
            Self::Io { .. } => ErrorCode::StoreReadFailed,
            Self::Write { .. } => ErrorCode::StoreWriteFailed,
            Self::Parse { .. } => ErrorCode::StoreParseFailed,
            Self::ReservedProjectId(_) => ErrorCode::ReservedProjectId,
            Self::Lock(err) => err.code(),
        }
    }
}
