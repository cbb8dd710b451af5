use lanes_core::filter::FilterSet;
use lanes_core::grouping::{BoardSettings, ColumnOrder, RowOrder};
use lanes_core::model::{Issue, Priority, Project, ProjectStatus, WorkflowState};
use proptest::prelude::*;

pub const PROJECT_IDS: [&str; 4] = ["A", "B", "C", "D"];
pub const ASSIGNEES: [&str; 3] = ["ana", "bo", "cy"];
pub const INITIATIVES: [&str; 2] = ["soc2", "perf"];
const WORDS: [&str; 6] = ["Fix", "login", "Parser", "timeout", "docs", "Ärger"];

pub fn arb_state() -> impl Strategy<Value = WorkflowState> + Clone {
    prop::sample::select(WorkflowState::ALL.to_vec())
}

pub fn arb_terminal_state() -> impl Strategy<Value = WorkflowState> + Clone {
    prop_oneof![Just(WorkflowState::Canceled), Just(WorkflowState::Duplicate)]
}

pub fn arb_open_state() -> impl Strategy<Value = WorkflowState> + Clone {
    arb_state().prop_filter("non-terminal", |s| !s.is_terminal())
}

pub fn arb_priority() -> impl Strategy<Value = Priority> + Clone {
    prop::sample::select(Priority::ALL.to_vec())
}

fn arb_pick(pool: &'static [&'static str]) -> impl Strategy<Value = Option<String>> + Clone {
    prop::option::of(prop::sample::select(pool).prop_map(str::to_string))
}

/// Project ids include one that no generated project list contains.
fn arb_project_ref() -> impl Strategy<Value = Option<String>> + Clone {
    prop_oneof![
        4 => arb_pick(&PROJECT_IDS),
        1 => Just(Some("ghost".to_string())),
    ]
}

pub fn arb_issue(index: usize) -> impl Strategy<Value = Issue> {
    (
        prop::collection::vec(prop::sample::select(WORDS.to_vec()), 1..4),
        arb_state(),
        prop::option::of(arb_priority()),
        arb_project_ref(),
        arb_pick(&ASSIGNEES),
        arb_pick(&INITIATIVES),
    )
        .prop_map(
            move |(words, state, priority, project_id, assignee_id, initiative_id)| {
                let mut issue = Issue::new(
                    format!("iss-{index}"),
                    format!("ENG-{index}"),
                    words.join(" "),
                    state,
                );
                issue.priority = priority;
                issue.project_id = project_id;
                issue.assignee_id = assignee_id;
                issue.initiative_id = initiative_id;
                issue
            },
        )
}

/// Issues with unique ids.
pub fn arb_issues() -> impl Strategy<Value = Vec<Issue>> {
    (0usize..40).prop_flat_map(|len| (0..len).map(arb_issue).collect::<Vec<_>>())
}

pub fn arb_project_status() -> impl Strategy<Value = Option<ProjectStatus>> + Clone {
    prop::option::of(prop::sample::select(vec![
        ProjectStatus::Active,
        ProjectStatus::Planned,
        ProjectStatus::Paused,
        ProjectStatus::Done,
        ProjectStatus::Unknown,
    ]))
}

pub fn arb_projects() -> impl Strategy<Value = Vec<Project>> {
    prop::collection::vec(
        (prop::sample::select(PROJECT_IDS.to_vec()), arb_project_status()),
        0..6,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(id, status)| {
                let mut project = Project::new(id, format!("Project {}", id.to_lowercase()));
                project.status = status;
                project
            })
            .collect()
    })
}

pub fn arb_filter() -> impl Strategy<Value = FilterSet> {
    (
        prop::option::of(prop::sample::select(WORDS.to_vec())),
        prop::collection::btree_set(arb_state(), 0..3),
        prop::collection::btree_set(arb_priority(), 0..3),
        prop::collection::btree_set(prop::sample::select(ASSIGNEES.to_vec()), 0..2),
        prop::collection::btree_set(prop::sample::select(INITIATIVES.to_vec()), 0..2),
        any::<bool>(),
    )
        .prop_map(
            |(search, states, priorities, assignees, initiatives, triage)| {
                FilterSet::default()
                    .with_search(search.unwrap_or_default())
                    .with_states(states)
                    .with_priorities(priorities)
                    .with_assignees(assignees)
                    .with_initiatives(initiatives)
                    .with_triage(triage)
            },
        )
}

pub fn arb_column_order() -> impl Strategy<Value = ColumnOrder> {
    Just(WorkflowState::ALL.to_vec())
        .prop_shuffle()
        .prop_map(|states| ColumnOrder::new(states).expect("shuffle is a permutation"))
}

pub fn arb_settings() -> impl Strategy<Value = BoardSettings> {
    (
        arb_column_order(),
        prop_oneof![Just(RowOrder::Name), Just(RowOrder::Status)],
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(column_order, row_order, show_empty_rows, show_triage_issues)| BoardSettings {
                column_order,
                row_order,
                show_empty_rows,
                show_triage_issues,
            },
        )
}
