//! Project x workflow-state matrix built from the filtered working set.
//!
//! [`build_rows`] is a pure function of its inputs: rows are chosen and sorted
//! from the project list, every row gets one cell per column, and each issue
//! lands in exactly one cell in filtered-input order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::model::{
    CellId, Issue, ParseEnumError, Project, ProjectKey, WorkflowState, status_rank,
};

/// How project rows are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowOrder {
    /// Lexicographic by project name.
    #[default]
    Name,
    /// By project status rank, then by name.
    Status,
}

impl RowOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Status => "status",
        }
    }

    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Name => Self::Status,
            Self::Status => Self::Name,
        }
    }
}

impl fmt::Display for RowOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "status" => Ok(Self::Status),
            _ => Err(ParseEnumError {
                expected: "row order",
                got: s.to_string(),
            }),
        }
    }
}

/// Error returned when a column list is not a permutation of all states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOrderError {
    Duplicate(WorkflowState),
    Missing(WorkflowState),
}

impl fmt::Display for ColumnOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(state) => write!(f, "column '{state}' listed more than once"),
            Self::Missing(state) => write!(f, "column '{state}' is missing"),
        }
    }
}

impl std::error::Error for ColumnOrderError {}

/// A permutation of every [`WorkflowState`], left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnOrder(Vec<WorkflowState>);

impl ColumnOrder {
    /// Validate that `columns` lists every state exactly once.
    pub fn new(columns: Vec<WorkflowState>) -> Result<Self, ColumnOrderError> {
        let mut seen = HashSet::new();
        for state in &columns {
            if !seen.insert(*state) {
                return Err(ColumnOrderError::Duplicate(*state));
            }
        }
        if let Some(missing) = WorkflowState::ALL.into_iter().find(|s| !seen.contains(s)) {
            return Err(ColumnOrderError::Missing(missing));
        }
        Ok(Self(columns))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[WorkflowState] {
        &self.0
    }

    #[must_use]
    pub fn position(&self, state: WorkflowState) -> Option<usize> {
        self.0.iter().position(|s| *s == state)
    }
}

impl Default for ColumnOrder {
    fn default() -> Self {
        Self(WorkflowState::ALL.to_vec())
    }
}

/// Immutable view settings threaded into grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSettings {
    pub column_order: ColumnOrder,
    pub row_order: RowOrder,
    pub show_empty_rows: bool,
    pub show_triage_issues: bool,
}

/// One (project, state) intersection and the issues in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub id: CellId,
    pub issues: Vec<Issue>,
}

/// One project row: a cell per column, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub key: ProjectKey,
    pub project: Project,
    pub cells: Vec<Cell>,
}

impl Row {
    fn empty(key: ProjectKey, project: Project, columns: &ColumnOrder) -> Self {
        let cells = columns
            .as_slice()
            .iter()
            .map(|state| Cell {
                id: CellId::new(key.clone(), *state),
                issues: Vec::new(),
            })
            .collect();
        Self {
            key,
            project,
            cells,
        }
    }

    #[must_use]
    pub fn cell(&self, state: WorkflowState) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id.state == state)
    }

    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.issues.len()).sum()
    }
}

/// Partition `issues` (already filtered) into board rows.
#[must_use]
pub fn build_rows(issues: &[Issue], projects: &[Project], settings: &BoardSettings) -> Vec<Row> {
    let mut referenced: Vec<&str> = Vec::new();
    let mut referenced_set: HashSet<&str> = HashSet::new();
    let mut has_unassigned = false;
    for issue in issues {
        match issue.project_id.as_deref() {
            Some(id) => {
                if referenced_set.insert(id) {
                    referenced.push(id);
                }
            }
            None => has_unassigned = true,
        }
    }

    let mut listed: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<Project> = Vec::new();
    for project in projects {
        if !listed.insert(project.id.as_str()) {
            continue;
        }
        if settings.show_empty_rows || referenced_set.contains(project.id.as_str()) {
            candidates.push(project.clone());
        }
    }
    // Issues pointing at projects outside the list still need a row.
    candidates.extend(
        referenced
            .iter()
            .filter(|id| !listed.contains(*id))
            .map(|id| Project::placeholder(id)),
    );

    sort_projects(&mut candidates, settings.row_order);

    let mut rows: Vec<Row> = candidates
        .into_iter()
        .map(|project| {
            let key = ProjectKey::Assigned(project.id.clone());
            Row::empty(key, project, &settings.column_order)
        })
        .collect();
    if has_unassigned || settings.show_empty_rows {
        rows.push(Row::empty(
            ProjectKey::Unassigned,
            Project::unassigned(),
            &settings.column_order,
        ));
    }

    let row_index: HashMap<ProjectKey, usize> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| (row.key.clone(), idx))
        .collect();
    let column_index: HashMap<WorkflowState, usize> = settings
        .column_order
        .as_slice()
        .iter()
        .enumerate()
        .map(|(idx, state)| (*state, idx))
        .collect();

    for issue in issues {
        let (Some(&r), Some(&c)) = (
            row_index.get(&issue.project_key()),
            column_index.get(&issue.state),
        ) else {
            tracing::warn!(issue = %issue.id, "issue has no cell on the board");
            continue;
        };
        rows[r].cells[c].issues.push(issue.clone());
    }

    rows
}

fn sort_projects(projects: &mut [Project], order: RowOrder) {
    match order {
        RowOrder::Name => projects.sort_by(compare_names),
        RowOrder::Status => projects.sort_by(|a, b| {
            status_rank(a.status)
                .cmp(&status_rank(b.status))
                .then_with(|| compare_names(a, b))
        }),
    }
}

fn compare_names(a: &Project, b: &Project) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectStatus;

    fn issue(id: &str, state: WorkflowState, project: Option<&str>) -> Issue {
        let issue = Issue::new(id, format!("ENG-{id}"), format!("issue {id}"), state);
        match project {
            Some(p) => issue.with_project(p),
            None => issue,
        }
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.project.name.as_str()).collect()
    }

    #[test]
    fn row_order_parses_and_toggles() {
        assert_eq!("Status".parse::<RowOrder>(), Ok(RowOrder::Status));
        assert_eq!(" name ".parse::<RowOrder>(), Ok(RowOrder::Name));
        assert!("priority".parse::<RowOrder>().is_err());
        assert_eq!(RowOrder::Name.toggle(), RowOrder::Status);
    }

    #[test]
    fn column_order_must_be_a_permutation() {
        assert!(ColumnOrder::new(WorkflowState::ALL.to_vec()).is_ok());

        let mut reversed = WorkflowState::ALL.to_vec();
        reversed.reverse();
        assert!(ColumnOrder::new(reversed).is_ok());

        let err = ColumnOrder::new(vec![WorkflowState::Todo, WorkflowState::Todo]).unwrap_err();
        assert_eq!(err, ColumnOrderError::Duplicate(WorkflowState::Todo));

        let err = ColumnOrder::new(WorkflowState::ALL[..7].to_vec()).unwrap_err();
        assert_eq!(err, ColumnOrderError::Missing(WorkflowState::Duplicate));
    }

    #[test]
    fn only_projects_with_issues_appear_by_default() {
        let projects = vec![Project::new("A", "Alpha"), Project::new("B", "Beta")];
        let issues = vec![issue("1", WorkflowState::Todo, Some("A"))];
        let rows = build_rows(&issues, &projects, &BoardSettings::default());
        assert_eq!(names(&rows), vec!["Alpha"]);
    }

    #[test]
    fn show_empty_rows_keeps_every_project_and_unassigned() {
        let projects = vec![Project::new("A", "Alpha"), Project::new("B", "Beta")];
        let issues = vec![issue("1", WorkflowState::Todo, Some("A"))];
        let settings = BoardSettings {
            show_empty_rows: true,
            ..BoardSettings::default()
        };
        let rows = build_rows(&issues, &projects, &settings);
        assert_eq!(names(&rows), vec!["Alpha", "Beta", "Unassigned"]);
        assert_eq!(rows[1].issue_count(), 0);
        assert_eq!(rows[1].cells.len(), WorkflowState::ALL.len());
    }

    #[test]
    fn name_order_is_case_insensitive_with_id_tiebreak() {
        let projects = vec![
            Project::new("3", "beta"),
            Project::new("2", "Alpha"),
            Project::new("1", "Beta"),
        ];
        let settings = BoardSettings {
            show_empty_rows: true,
            ..BoardSettings::default()
        };
        let rows = build_rows(&[], &projects, &settings);
        let ids: Vec<&str> = rows.iter().map(|r| r.project.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3", "unassigned"]);
    }

    #[test]
    fn status_order_ranks_then_names() {
        let projects = vec![
            Project::new("a", "Zeta").with_status(ProjectStatus::Active),
            Project::new("b", "Alpha").with_status(ProjectStatus::Done),
            Project::new("c", "Mid"),
            Project::new("d", "Beta").with_status(ProjectStatus::Active),
            Project::new("e", "Gamma").with_status(ProjectStatus::Planned),
            Project::new("f", "Odd").with_status(ProjectStatus::Unknown),
            Project::new("g", "Paused").with_status(ProjectStatus::Paused),
        ];
        let settings = BoardSettings {
            show_empty_rows: true,
            row_order: RowOrder::Status,
            ..BoardSettings::default()
        };
        let rows = build_rows(&[], &projects, &settings);
        assert_eq!(
            names(&rows),
            vec!["Beta", "Zeta", "Gamma", "Paused", "Alpha", "Mid", "Odd", "Unassigned"]
        );
    }

    #[test]
    fn unassigned_row_comes_after_sorted_rows() {
        let projects = vec![Project::new("Z", "Zulu")];
        let issues = vec![
            issue("1", WorkflowState::Todo, None),
            issue("2", WorkflowState::Todo, Some("Z")),
        ];
        let rows = build_rows(&issues, &projects, &BoardSettings::default());
        assert_eq!(names(&rows), vec!["Zulu", "Unassigned"]);
        assert!(rows[1].key.is_unassigned());
    }

    #[test]
    fn cells_follow_column_order_and_input_order() {
        let mut columns = WorkflowState::ALL.to_vec();
        columns.reverse();
        let settings = BoardSettings {
            column_order: ColumnOrder::new(columns.clone()).unwrap(),
            ..BoardSettings::default()
        };
        let issues = vec![
            issue("3", WorkflowState::Todo, Some("A")),
            issue("1", WorkflowState::Done, Some("A")),
            issue("2", WorkflowState::Todo, Some("A")),
        ];
        let rows = build_rows(&issues, &[Project::new("A", "Alpha")], &settings);
        let states: Vec<_> = rows[0].cells.iter().map(|c| c.id.state).collect();
        assert_eq!(states, columns);

        let todo = rows[0].cell(WorkflowState::Todo).unwrap();
        let ids: Vec<&str> = todo.issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
        assert_eq!(todo.id.composite(), "project:A:state:todo");
    }

    #[test]
    fn unknown_project_ids_get_a_placeholder_row() {
        let issues = vec![
            issue("1", WorkflowState::Todo, Some("ghost")),
            issue("2", WorkflowState::Todo, Some("A")),
        ];
        let rows = build_rows(&issues, &[Project::new("A", "Alpha")], &BoardSettings::default());
        assert_eq!(names(&rows), vec!["Alpha", "ghost"]);
        assert_eq!(rows.iter().map(Row::issue_count).sum::<usize>(), 2);
    }

    #[test]
    fn duplicate_project_entries_produce_one_row() {
        let projects = vec![Project::new("A", "Alpha"), Project::new("A", "Alpha again")];
        let issues = vec![issue("1", WorkflowState::Todo, Some("A"))];
        let rows = build_rows(&issues, &projects, &BoardSettings::default());
        assert_eq!(names(&rows), vec!["Alpha"]);
        assert_eq!(rows[0].issue_count(), 1);
    }
}
