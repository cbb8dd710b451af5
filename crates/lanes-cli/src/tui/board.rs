//! Full-screen board: one band per project row, one column per workflow state.
//!
//! Every rendered cell is registered as a drop target in terminal coordinates,
//! so mouse presses, drags and releases go straight through the board's
//! gesture API. Committed moves are written to the store after the frame that
//! shows them has been drawn.

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use lanes_core::board::Board;
use lanes_core::config::ProjectConfig;
use lanes_core::drag::{self, ArmRefused, CancelReason, DropOutcome, DropTarget, InputKind, Phase, Point};
use lanes_core::grouping::Row;
use lanes_core::model::{Issue, Priority, ProjectStatus, WorkflowState};
use lanes_core::store::{IssueStore, JsonFileStore};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
}

/// A card's on-screen line, recorded at render time for hit testing.
#[derive(Debug, Clone)]
struct CardHit {
    issue_id: String,
    area: Rect,
}

pub struct BoardApp {
    board: Board,
    store: JsonFileStore,
    input_mode: InputMode,
    search: String,
    /// Index of the first project row drawn.
    scroll: usize,
    status: Option<String>,
    cards: Vec<CardHit>,
    targets: Vec<DropTarget>,
    should_quit: bool,
}

impl BoardApp {
    pub fn new(board: Board, store: JsonFileStore) -> Self {
        Self {
            board,
            store,
            input_mode: InputMode::Normal,
            search: String::new(),
            scroll: 0,
            status: None,
            cards: Vec::new(),
            targets: Vec::new(),
            should_quit: false,
        }
    }

    fn apply_search(&mut self) {
        let filters = self.board.filters().clone().with_search(self.search.clone());
        self.board.set_filters(filters);
        self.scroll = 0;
    }

    fn toggle_triage(&mut self) {
        let mut settings = self.board.settings().clone();
        settings.show_triage_issues = !settings.show_triage_issues;
        self.board.set_settings(settings);
    }

    fn toggle_empty_rows(&mut self) {
        let mut settings = self.board.settings().clone();
        settings.show_empty_rows = !settings.show_empty_rows;
        self.board.set_settings(settings);
    }

    fn toggle_row_order(&mut self) {
        let mut settings = self.board.settings().clone();
        settings.row_order = settings.row_order.toggle();
        self.status = Some(format!("rows by {}", settings.row_order));
        self.board.set_settings(settings);
    }

    fn reload(&mut self) {
        match self.board.reload(&self.store) {
            Ok(()) => self.status = Some("reloaded".to_string()),
            Err(err) => {
                warn!(error = %err, "reload failed");
                self.status = Some(format!("reload failed: {err}"));
            }
        }
    }

    /// Send queued moves to the store. Runs after each draw.
    pub fn flush_outbox(&mut self) {
        if !self.board.has_pending() {
            return;
        }
        let report = self.board.dispatch_pending(&mut self.store);
        if let Some(failed) = report.failed.first() {
            let suffix = if failed.rolled_back {
                " (rolled back)"
            } else {
                ""
            };
            self.status = Some(format!(
                "[{}] {}{suffix}",
                failed.code, failed.message
            ));
        } else if !report.applied.is_empty() {
            debug!(applied = report.applied.len(), "moves saved");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.input_mode {
            InputMode::Search => match key.code {
                KeyCode::Esc => {
                    self.search.clear();
                    self.input_mode = InputMode::Normal;
                    self.apply_search();
                }
                KeyCode::Enter => self.input_mode = InputMode::Normal,
                KeyCode::Backspace => {
                    self.search.pop();
                    self.apply_search();
                }
                KeyCode::Char(c) => {
                    self.search.push(c);
                    self.apply_search();
                }
                _ => {}
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Esc => {
                    if self.board.drag().phase() == Phase::Idle {
                        if !self.search.is_empty() {
                            self.search.clear();
                            self.apply_search();
                        }
                    } else {
                        let outcome = self.board.cancel_drag();
                        self.note_outcome(&outcome);
                    }
                }
                KeyCode::Char('/') => self.input_mode = InputMode::Search,
                KeyCode::Char('t') => self.toggle_triage(),
                KeyCode::Char('e') => self.toggle_empty_rows(),
                KeyCode::Char('o') => self.toggle_row_order(),
                KeyCode::Char('r') => self.reload(),
                KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
                KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
                _ => {}
            },
        }
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.board.rows().len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.input_mode != InputMode::Normal {
            return;
        }
        let now = Instant::now();
        let pointer = pointer_at(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(card) = self
                    .cards
                    .iter()
                    .find(|card| card.area.contains((mouse.column, mouse.row).into()))
                    .cloned()
                else {
                    return;
                };
                match self.board.begin_drag(
                    &card.issue_id,
                    to_drop_rect(card.area),
                    InputKind::Pointer,
                    pointer,
                    now,
                ) {
                    Ok(()) => self.status = None,
                    Err(ArmRefused::TerminalCard(state)) => {
                        self.status = Some(format!("{} cards stay put", state.label()));
                    }
                    Err(err) => debug!(error = %err, "press ignored"),
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.board.drag_move(pointer, now);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.board.drag().phase() != Phase::Idle {
                    self.board.drag_move(pointer, now);
                    let outcome = self.board.end_drag(now);
                    self.note_outcome(&outcome);
                }
            }
            MouseEventKind::ScrollDown => self.scroll_by(1),
            MouseEventKind::ScrollUp => self.scroll_by(-1),
            _ => {}
        }
    }

    fn note_outcome(&mut self, outcome: &DropOutcome) {
        self.status = match outcome {
            DropOutcome::Commit(intent) => {
                let key = self
                    .board
                    .issue(&intent.issue_id)
                    .map_or(intent.issue_id.as_str(), |issue| issue.key.as_str());
                Some(format!("{key} → {}", intent.to.state.label()))
            }
            DropOutcome::Rejected(transition) => Some(format!("not allowed: {transition}")),
            DropOutcome::Cancelled(CancelReason::NotActivated)
            | DropOutcome::SelfDrop
            | DropOutcome::Ignored => None,
            DropOutcome::Cancelled(_) => Some("drag cancelled".to_string()),
        };
    }

    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(Paragraph::new(self.header_line()), header);
        let (targets, cards) = self.render_grid(frame, body);
        self.render_overlay(frame, area);
        frame.render_widget(Paragraph::new(self.footer_line()), footer);

        self.cards = cards;
        if targets != self.targets {
            self.board.register_targets(targets.clone());
            self.targets = targets;
        }
    }

    fn header_line(&self) -> Line<'static> {
        let settings = self.board.settings();
        let on_off = |flag: bool| if flag { "on" } else { "off" };
        let dim = Style::default().fg(Color::DarkGray);
        let mut spans = vec![
            Span::styled(
                format!(" lanes · {} ", self.store.org_id()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("rows:{} ", settings.row_order), dim),
            Span::styled(format!("triage:{} ", on_off(settings.show_triage_issues)), dim),
            Span::styled(format!("empty:{} ", on_off(settings.show_empty_rows)), dim),
        ];
        if !self.search.is_empty() || self.input_mode == InputMode::Search {
            spans.push(Span::styled(
                format!("/{}", self.search),
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    }

    fn footer_line(&self) -> Line<'static> {
        if let Some(ref status) = self.status {
            return Line::from(Span::styled(
                format!(" {status}"),
                Style::default().fg(Color::Yellow),
            ));
        }
        let hint = match self.input_mode {
            InputMode::Search => " type to search · Enter keep · Esc clear",
            InputMode::Normal => {
                " drag cards with the mouse · / search · t triage · e empty rows · o order · r reload · q quit"
            }
        };
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    }

    /// Draw column headers and project bands; returns the laid-out targets and cards.
    fn render_grid(&self, frame: &mut Frame<'_>, area: Rect) -> (Vec<DropTarget>, Vec<CardHit>) {
        let mut targets = Vec::new();
        let mut cards = Vec::new();
        let columns = self.board.settings().column_order.as_slice();
        if columns.is_empty() || area.height < 2 {
            return (targets, cards);
        }

        let [heading, rows_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
        let inset = Rect {
            x: heading.x.saturating_add(1),
            width: heading.width.saturating_sub(2),
            ..heading
        };
        for (state, slot) in columns.iter().zip(column_areas(inset, columns.len()).iter()) {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    state.label(),
                    Style::default()
                        .fg(state_color(*state))
                        .add_modifier(Modifier::BOLD),
                )),
                *slot,
            );
        }

        let rows = self.board.rows();
        if rows.is_empty() {
            frame.render_widget(
                Paragraph::new("No issues match the current filters.")
                    .style(Style::default().fg(Color::DarkGray)),
                rows_area,
            );
            return (targets, cards);
        }

        let candidate = self.board.drag().candidate();
        let dragged = self.board.drag().dragged_issue();
        let mut y = rows_area.y;
        for row in rows.iter().skip(self.scroll) {
            if y >= rows_area.bottom() {
                break;
            }
            let height = band_height(row).min(rows_area.bottom() - y);
            let band = Rect::new(rows_area.x, y, rows_area.width, height);
            y = y.saturating_add(height);

            let block = Block::bordered()
                .border_style(Style::default().fg(Color::DarkGray))
                .title(row_title(row));
            let inner = block.inner(band);
            frame.render_widget(block, band);

            for (cell, slot) in row.cells.iter().zip(column_areas(inner, row.cells.len()).iter()) {
                let slot = *slot;
                if candidate == Some(&cell.id) {
                    frame.render_widget(
                        Block::default().style(Style::default().bg(Color::Rgb(40, 40, 60))),
                        slot,
                    );
                }
                for (line, issue) in (0u16..slot.height).zip(cell.issues.iter()) {
                    let area = Rect::new(slot.x, slot.y + line, slot.width, 1);
                    let lifted = dragged == Some(issue.id.as_str());
                    frame.render_widget(Paragraph::new(card_line(issue, lifted)), area);
                    cards.push(CardHit {
                        issue_id: issue.id.clone(),
                        area,
                    });
                }
                targets.push(DropTarget::new(cell.id.clone(), to_drop_rect(slot)));
            }
        }
        (targets, cards)
    }

    /// The lifted card follows the pointer while dragging.
    fn render_overlay(&self, frame: &mut Frame<'_>, bounds: Rect) {
        let (Some(overlay), Some(issue)) = (
            self.board.drag().overlay(),
            self.board
                .drag()
                .dragged_issue()
                .and_then(|id| self.board.issue(id)),
        ) else {
            return;
        };
        let area = to_area(overlay, bounds);
        if area.is_empty() {
            return;
        }
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(card_line(issue, false))
                .style(Style::default().add_modifier(Modifier::REVERSED)),
            area,
        );
    }

    /// Draw, flush, poll until quit.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>, tick: Duration) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame, frame.area()))?;
            self.flush_outbox();

            if event::poll(tick)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

fn column_areas(area: Rect, count: usize) -> Vec<Rect> {
    let count = u32::try_from(count).unwrap_or(u32::MAX).max(1);
    Layout::horizontal((0..count).map(|_| Constraint::Ratio(1, count)))
        .split(area)
        .to_vec()
}

/// Tallest cell plus borders.
fn band_height(row: &Row) -> u16 {
    let tallest = row.cells.iter().map(|cell| cell.issues.len()).max().unwrap_or(0);
    u16::try_from(tallest).unwrap_or(u16::MAX).saturating_add(2).max(3)
}

fn row_title(row: &Row) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!(" {} ", row.project.name),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(status) = row.project.status {
        spans.push(Span::styled(
            format!("{status} "),
            Style::default().fg(project_status_color(status)),
        ));
    }
    spans.push(Span::styled(
        format!("({}) ", row.issue_count()),
        Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

fn card_line(issue: &Issue, lifted: bool) -> Line<'static> {
    let mut key_style = Style::default().fg(state_color(issue.state));
    if lifted {
        key_style = key_style.add_modifier(Modifier::DIM | Modifier::CROSSED_OUT);
    }
    let mut spans = Vec::with_capacity(3);
    if let Some(priority) = issue.priority {
        spans.push(Span::styled(
            priority_icon(priority),
            Style::default().fg(priority_color(priority)),
        ));
    }
    spans.push(Span::styled(format!("{} ", issue.key), key_style));
    spans.push(Span::raw(issue.title.clone()));
    Line::from(spans)
}

fn pointer_at(column: u16, row: u16) -> Point {
    Point::new(f32::from(column) + 0.5, f32::from(row) + 0.5)
}

fn to_drop_rect(area: Rect) -> drag::Rect {
    drag::Rect::new(
        f32::from(area.x),
        f32::from(area.y),
        f32::from(area.width),
        f32::from(area.height),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_area(rect: drag::Rect, bounds: Rect) -> Rect {
    let clamp = |v: f32| v.round().clamp(0.0, f32::from(u16::MAX)) as u16;
    Rect::new(
        clamp(rect.x),
        clamp(rect.y),
        clamp(rect.width),
        clamp(rect.height),
    )
    .intersection(bounds)
}

/// Color for a workflow state.
const fn state_color(state: WorkflowState) -> Color {
    match state {
        WorkflowState::Triage => Color::Magenta,
        WorkflowState::Todo => Color::Cyan,
        WorkflowState::InProgress => Color::Green,
        WorkflowState::Blocked => Color::Red,
        WorkflowState::WaitingInfo => Color::Yellow,
        WorkflowState::Done => Color::Blue,
        WorkflowState::Canceled | WorkflowState::Duplicate => Color::DarkGray,
    }
}

const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::P0 => Color::Red,
        Priority::P1 => Color::LightRed,
        Priority::P2 => Color::Yellow,
        Priority::P3 => Color::DarkGray,
    }
}

const fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::P0 => "‼ ",
        Priority::P1 => "! ",
        Priority::P2 => "· ",
        Priority::P3 => "  ",
    }
}

const fn project_status_color(status: ProjectStatus) -> Color {
    match status {
        ProjectStatus::Active => Color::Green,
        ProjectStatus::Planned => Color::Cyan,
        ProjectStatus::Paused => Color::Yellow,
        ProjectStatus::Done => Color::Blue,
        ProjectStatus::Unknown => Color::DarkGray,
    }
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

/// Open the interactive board over `store` until the user quits.
pub fn run_board_tui(
    store: JsonFileStore,
    config: &ProjectConfig,
    search: Option<String>,
    tick: Duration,
) -> Result<()> {
    let board = Board::load(
        &store,
        config.board.settings()?,
        config.drag,
        config.mutation.on_failure,
    )?;
    let mut app = BoardApp::new(board, store);
    if let Some(search) = search {
        app.search = search;
        app.apply_search();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let result = app.run(&mut terminal, tick);

    restore_terminal()?;
    terminal.show_cursor()?;
    // Anything committed on the last frame still goes out.
    app.flush_outbox();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanes_core::board::FailurePolicy;
    use lanes_core::drag::DragConfig;
    use lanes_core::grouping::{BoardSettings, RowOrder};
    use lanes_core::model::{CellId, Project, ProjectKey};
    use lanes_core::store::BoardDocument;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    const WIDTH: u16 = 160;
    const HEIGHT: u16 = 30;

    fn app(dir: &TempDir) -> BoardApp {
        let document = BoardDocument {
            org_id: "acme".into(),
            projects: vec![
                Project::new("A", "Alpha").with_status(ProjectStatus::Active),
                Project::new("B", "Beta"),
            ],
            issues: vec![
                Issue::new("1", "ENG-1", "Fix login", WorkflowState::Todo)
                    .with_project("A")
                    .with_priority(Priority::P1),
                Issue::new("2", "ENG-2", "Old bug", WorkflowState::Canceled).with_project("A"),
                Issue::new("3", "ENG-3", "Write docs", WorkflowState::Done),
            ],
        };
        let store = JsonFileStore::create(dir.path().join("board.json"), &document).unwrap();
        let board = Board::load(
            &store,
            BoardSettings::default(),
            DragConfig::default(),
            FailurePolicy::Rollback,
        )
        .unwrap();
        BoardApp::new(board, store)
    }

    fn draw(app: &mut BoardApp) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
        terminal
            .draw(|frame| app.render(frame, frame.area()))
            .unwrap();
        terminal
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn target_area(app: &BoardApp, cell: &CellId) -> Rect {
        let target = app
            .targets
            .iter()
            .find(|t| &t.cell == cell)
            .expect("cell laid out");
        to_area(target.rect, Rect::new(0, 0, WIDTH, HEIGHT))
    }

    fn card_area(app: &BoardApp, issue_id: &str) -> Rect {
        app.cards
            .iter()
            .find(|c| c.issue_id == issue_id)
            .map(|c| c.area)
            .expect("card drawn")
    }

    #[test]
    fn renders_rows_and_registers_every_cell() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let terminal = draw(&mut app);
        let text = screen(&terminal);
        assert!(text.contains("Alpha"));
        assert!(text.contains("ENG-1"));
        assert!(text.contains("In Progress") || text.contains("In progress"));
        assert!(!text.contains("Beta"), "empty rows hidden by default");
        assert_eq!(app.targets.len(), app.board.droppable_cells().len());
    }

    #[test]
    fn mouse_drag_moves_card_and_persists_after_flush() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        draw(&mut app);

        let card = card_area(&app, "1");
        let target_cell = CellId::new(ProjectKey::Assigned("A".into()), WorkflowState::InProgress);
        let target = target_area(&app, &target_cell);

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), card.x, card.y));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), target.x, card.y));
        assert_eq!(app.board.drag().phase(), Phase::Dragging);
        assert_eq!(app.board.drag().candidate(), Some(&target_cell));
        draw(&mut app);
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), target.x, card.y));

        assert_eq!(app.board.cell_of("1"), Some(target_cell.clone()));
        assert!(app.board.has_pending());
        draw(&mut app);
        app.flush_outbox();
        assert!(!app.board.has_pending());

        let stored = app.store.issues().unwrap();
        let moved = stored.iter().find(|i| i.id == "1").unwrap();
        assert_eq!(moved.cell(), target_cell);
    }

    #[test]
    fn terminal_cards_do_not_lift() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        draw(&mut app);
        let card = card_area(&app, "2");
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), card.x, card.y));
        assert_eq!(app.board.drag().phase(), Phase::Idle);
        assert!(app.status.as_deref().unwrap_or_default().contains("stay put"));
    }

    #[test]
    fn escape_cancels_a_live_drag() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        draw(&mut app);
        let card = card_area(&app, "1");
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), card.x, card.y));
        app.handle_mouse(mouse(
            MouseEventKind::Drag(MouseButton::Left),
            card.x + 30,
            card.y,
        ));
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.board.drag().phase(), Phase::Idle);
        assert!(!app.board.has_pending());
        assert_eq!(app.status.as_deref(), Some("drag cancelled"));
    }

    #[test]
    fn view_toggles_update_settings() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        app.handle_key(key(KeyCode::Char('e')));
        assert!(app.board.settings().show_empty_rows);
        let terminal = draw(&mut app);
        assert!(screen(&terminal).contains("Beta"));

        app.handle_key(key(KeyCode::Char('o')));
        assert_eq!(app.board.settings().row_order, RowOrder::Status);

        app.handle_key(key(KeyCode::Char('t')));
        assert!(app.board.settings().show_triage_issues);
        assert!(app.board.filters().show_triage);
    }

    #[test]
    fn search_mode_filters_live_and_escape_clears() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        app.handle_key(key(KeyCode::Char('/')));
        for c in "docs".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.board.filters().search, "docs");
        let visible: usize = app.board.rows().iter().map(Row::issue_count).sum();
        assert_eq!(visible, 1);

        app.handle_key(key(KeyCode::Esc));
        assert!(app.board.filters().search.is_empty());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn q_quits() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
