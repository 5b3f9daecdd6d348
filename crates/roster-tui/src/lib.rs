// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{BarChart, Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use roster_app::{
    AppCommand, AppMode, AppState, BadgeTone, Completion, ControllerConfig, DeleteCandidate,
    Effect, EditSession, EditTarget, FilterField, FormField, Highlight, LoadPhase, MonitoredPhase,
    MonitoredView, Notice, NoticeLevel, QueryState, Record, RecordId, SeriesPoint, SortField,
    TableController, TableIntent, ViewKind, email_domain_distribution, registration_trend,
    type_distribution,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use tracing::{debug, warn};

const STATUS_TTL: Duration = Duration::from_secs(4);
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Performs effects on behalf of the event loop. The default `spawn_effect`
/// runs synchronously; real runtimes move the work to a thread.
pub trait AppRuntime {
    fn perform(&mut self, effect: &Effect) -> Completion;

    fn spawn_effect(&mut self, effect: Effect, tx: Sender<InternalEvent>) -> Result<()> {
        let completion = self.perform(&effect);
        tx.send(InternalEvent::Completed(completion))
            .map_err(|_| anyhow!("completion channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Completed(Completion),
}

#[derive(Debug, Clone)]
struct ViewData {
    table: TableController,
    monitored: MonitoredView,
    selected_row: usize,
    filter_input: String,
    form_field: usize,
    status_token: u64,
    shown_notice: Option<Notice>,
}

impl ViewData {
    fn new(config: ControllerConfig) -> Self {
        Self {
            table: TableController::new(config),
            monitored: MonitoredView::default(),
            selected_row: 0,
            filter_input: String::new(),
            form_field: 0,
            status_token: 0,
            shown_notice: None,
        }
    }

    fn selected_id(&self) -> Option<RecordId> {
        self.table.rows().get(self.selected_row).map(|row| row.id)
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    config: ControllerConfig,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(config);
    let (internal_tx, internal_rx) = mpsc::channel();
    start(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn start<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    table_intent(state, runtime, view_data, internal_tx, TableIntent::Mount);
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
                if view_data.table.notice().is_some() {
                    view_data.table.dispatch(TableIntent::DismissNotice);
                }
                view_data.shown_notice = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Completed(completion @ Completion::MonitoredListed { .. }) => {
                view_data.monitored.resolve(completion);
            }
            InternalEvent::Completed(completion) => {
                let effects = view_data.table.resolve(completion);
                after_table_change(state, view_data, tx);
                run_effects(state, runtime, view_data, tx, effects);
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn run_effects<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    effects: Vec<Effect>,
) {
    for effect in effects {
        let ticket = effect.ticket().get();
        if let Err(error) = runtime.spawn_effect(effect, internal_tx.clone()) {
            warn!(ticket, %error, "could not start request");
            emit_status(state, view_data, internal_tx, format!("request failed: {error}"));
        }
    }
}

fn table_intent<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    intent: TableIntent,
) {
    let effects = view_data.table.dispatch(intent);
    after_table_change(state, view_data, internal_tx);
    run_effects(state, runtime, view_data, internal_tx, effects);
}

/// Keeps view-local state in line with the controller: selection bounds, the
/// form overlay, and the notice timer.
fn after_table_change(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let rows = view_data.table.rows().len();
    view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));

    if state.mode == AppMode::Form && view_data.table.edit().is_none() {
        state.dispatch(AppCommand::ExitToBrowse);
    }

    let current = view_data.table.notice().cloned();
    if current != view_data.shown_notice {
        if current.is_some() {
            view_data.status_token = view_data.status_token.saturating_add(1);
            schedule_status_clear(internal_tx, view_data.status_token);
        }
        view_data.shown_notice = current;
    }
}

fn load_monitored<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let effect = view_data.monitored.load();
    run_effects(state, runtime, view_data, internal_tx, vec![effect]);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if state.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            state.dispatch(AppCommand::ToggleHelp);
        }
        return false;
    }

    match state.mode {
        AppMode::Browse => return handle_browse_key(state, runtime, view_data, internal_tx, key),
        AppMode::Filter(field) => {
            handle_filter_key(state, runtime, view_data, internal_tx, field, key);
        }
        AppMode::Form => handle_form_key(state, runtime, view_data, internal_tx, key),
        AppMode::Confirm => handle_confirm_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_browse_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            state.dispatch(AppCommand::ToggleHelp);
        }
        KeyCode::Tab => switch_view(state, runtime, view_data, internal_tx, AppCommand::NextView),
        KeyCode::BackTab => {
            switch_view(state, runtime, view_data, internal_tx, AppCommand::PrevView);
        }
        KeyCode::Char('r') => match state.active_view {
            ViewKind::Monitored => load_monitored(state, runtime, view_data, internal_tx),
            ViewKind::Records | ViewKind::Charts => {
                table_intent(state, runtime, view_data, internal_tx, TableIntent::Refresh);
            }
        },
        _ if state.active_view == ViewKind::Records => {
            handle_records_key(state, runtime, view_data, internal_tx, key);
        }
        _ => {}
    }
    false
}

fn switch_view<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    state.dispatch(command);
    if state.active_view == ViewKind::Monitored
        && view_data.monitored.phase() == &MonitoredPhase::Idle
    {
        load_monitored(state, runtime, view_data, internal_tx);
    }
}

fn handle_records_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => move_selection(view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_selection(view_data, -1),
        KeyCode::Char('n') | KeyCode::Right => {
            change_page(state, runtime, view_data, internal_tx, TableIntent::NextPage);
        }
        KeyCode::Char('p') | KeyCode::Left => {
            change_page(state, runtime, view_data, internal_tx, TableIntent::PrevPage);
        }
        KeyCode::Char('g') => {
            change_page(state, runtime, view_data, internal_tx, TableIntent::GoToPage(1));
        }
        KeyCode::Char(digit @ '1'..='4') => {
            let field = SortField::ALL[digit as usize - '1' as usize];
            table_intent(state, runtime, view_data, internal_tx, TableIntent::SortBy(field));
        }
        KeyCode::Char('o') => {
            let order = view_data.table.query().order.flipped();
            table_intent(
                state,
                runtime,
                view_data,
                internal_tx,
                TableIntent::SetSortDirection(order),
            );
        }
        KeyCode::Char('/') | KeyCode::Char('f') => {
            state.dispatch(AppCommand::EnterFilter);
            load_filter_input(state, view_data);
        }
        KeyCode::Char('a') => {
            table_intent(state, runtime, view_data, internal_tx, TableIntent::BeginCreate);
            open_form(state, view_data);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            let Some(id) = view_data.selected_id() else {
                emit_status(state, view_data, internal_tx, "no row selected");
                return;
            };
            table_intent(state, runtime, view_data, internal_tx, TableIntent::BeginEdit(id));
            open_form(state, view_data);
        }
        KeyCode::Char('d') => {
            let Some(id) = view_data.selected_id() else {
                emit_status(state, view_data, internal_tx, "no row selected");
                return;
            };
            table_intent(state, runtime, view_data, internal_tx, TableIntent::RequestDelete(id));
            state.dispatch(AppCommand::OpenConfirm);
        }
        KeyCode::Char('x') => {
            table_intent(state, runtime, view_data, internal_tx, TableIntent::DismissNotice);
        }
        _ => {}
    }
}

fn move_selection(view_data: &mut ViewData, delta: isize) {
    let rows = view_data.table.rows().len();
    if rows == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = (view_data.selected_row as isize + delta).clamp(0, rows as isize - 1);
    view_data.selected_row = next as usize;
}

fn change_page<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    intent: TableIntent,
) {
    let before = view_data.table.page();
    table_intent(state, runtime, view_data, internal_tx, intent);
    if view_data.table.page() != before {
        view_data.selected_row = 0;
    }
}

fn open_form(state: &mut AppState, view_data: &mut ViewData) {
    if view_data.table.edit().is_some() {
        view_data.form_field = 0;
        state.dispatch(AppCommand::OpenForm);
    }
}

fn load_filter_input(state: &AppState, view_data: &mut ViewData) {
    if let AppMode::Filter(field) = state.mode {
        view_data.filter_input = view_data.table.query().filters.get(field).to_owned();
    }
}

fn handle_filter_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    field: FilterField,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToBrowse);
        }
        KeyCode::Tab => {
            state.dispatch(AppCommand::CycleFilterField);
            load_filter_input(state, view_data);
        }
        KeyCode::Backspace => {
            if view_data.filter_input.pop().is_some() {
                apply_filter(state, runtime, view_data, internal_tx, field);
            }
        }
        KeyCode::Char(ch) => {
            view_data.filter_input.push(ch);
            apply_filter(state, runtime, view_data, internal_tx, field);
        }
        _ => {}
    }
}

fn apply_filter<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    field: FilterField,
) {
    let value = view_data.filter_input.clone();
    view_data.selected_row = 0;
    table_intent(
        state,
        runtime,
        view_data,
        internal_tx,
        TableIntent::SetFilter { field, value },
    );
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let fields = FormField::ALL.len();
    let field = FormField::ALL[view_data.form_field % fields];
    let Some(current) = view_data
        .table
        .edit()
        .map(|session| session.fields.value(field).to_owned())
    else {
        state.dispatch(AppCommand::ExitToBrowse);
        return;
    };

    match key.code {
        KeyCode::Esc => {
            table_intent(state, runtime, view_data, internal_tx, TableIntent::CancelEdit);
        }
        KeyCode::Tab | KeyCode::Down => {
            view_data.form_field = (view_data.form_field + 1) % fields;
        }
        KeyCode::BackTab | KeyCode::Up => {
            view_data.form_field = (view_data.form_field + fields - 1) % fields;
        }
        KeyCode::Enter => {
            table_intent(state, runtime, view_data, internal_tx, TableIntent::SubmitEdit);
            if let Some(session) = view_data.table.edit()
                && !session.errors.is_empty()
            {
                debug!(errors = session.errors.len(), "form has errors");
                emit_status(state, view_data, internal_tx, "fix the highlighted fields");
            }
        }
        KeyCode::Backspace => {
            let mut value = current;
            value.pop();
            table_intent(
                state,
                runtime,
                view_data,
                internal_tx,
                TableIntent::EditField { field, value },
            );
        }
        KeyCode::Char(ch) => {
            let mut value = current;
            value.push(ch);
            table_intent(
                state,
                runtime,
                view_data,
                internal_tx,
                TableIntent::EditField { field, value },
            );
        }
        _ => {}
    }
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let intent = match key.code {
        KeyCode::Char('y') | KeyCode::Enter => TableIntent::ConfirmDelete,
        KeyCode::Char('n') | KeyCode::Esc => TableIntent::CancelDelete,
        _ => return,
    };
    state.dispatch(AppCommand::ExitToBrowse);
    table_intent(state, runtime, view_data, internal_tx, intent);
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|view| *view == state.active_view)
        .unwrap_or(0);
    let titles = ViewKind::ALL
        .iter()
        .map(|view| view.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("roster").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_view {
        ViewKind::Records => render_records(frame, layout[1], state, view_data),
        ViewKind::Monitored => render_monitored(frame, layout[1], &view_data.monitored),
        ViewKind::Charts => render_charts(frame, layout[1], view_data.table.rows()),
    }

    let status_color = match view_data.table.notice().map(|notice| notice.level) {
        Some(NoticeLevel::Error) => Color::Red,
        Some(NoticeLevel::Info) => Color::Green,
        None => Color::Yellow,
    };
    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(status_color))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if state.mode == AppMode::Form
        && let Some(session) = view_data.table.edit()
    {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let form = Paragraph::new(render_form_text(
            session,
            view_data.form_field,
            &view_data.table.config().noun,
        ))
        .block(Block::default().title("edit").borders(Borders::ALL));
        frame.render_widget(form, area);
    }

    if state.mode == AppMode::Confirm {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(render_confirm_text(&view_data.table)).block(
            Block::default()
                .title("confirm delete")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(confirm, area);
    }

    if state.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_records(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let filters = Paragraph::new(filter_bar_text(state, view_data))
        .block(Block::default().title("filters").borders(Borders::ALL));
    frame.render_widget(filters, layout[0]);

    let table = &view_data.table;
    let query = table.query();
    let header = Row::new(vec![
        Cell::from(header_label(SortField::Name, query)),
        Cell::from(header_label(SortField::Email, query)),
        Cell::from(header_label(SortField::Type, query)),
        Cell::from("budget"),
        Cell::from("rank"),
        Cell::from(header_label(SortField::CreatedAt, query)),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let deleting = table.deleting();
    let rows = table
        .rows_with_highlights()
        .enumerate()
        .map(|(index, (record, highlight))| {
            let mut style = highlight_style(highlight);
            if deleting == Some(record.id) {
                style = style
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT);
            }
            if index == view_data.selected_row {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Row::new(vec![
                Cell::from(record.name.clone()),
                Cell::from(record.email.clone()),
                Cell::from(record.kind.clone()).style(badge_style(record)),
                Cell::from(record.budget.clone().unwrap_or_default()),
                Cell::from(highlight.label()),
                Cell::from(created_label(record)),
            ])
            .style(style)
        });

    let widths = [
        Constraint::Percentage(22),
        Constraint::Percentage(28),
        Constraint::Percentage(16),
        Constraint::Length(8),
        Constraint::Length(17),
        Constraint::Min(10),
    ];
    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(table))
                .borders(Borders::ALL),
        );
    frame.render_widget(widget, layout[1]);

    let pagination = Paragraph::new(pagination_text(table)).style(Style::default().fg(Color::Gray));
    frame.render_widget(pagination, layout[2]);
}

fn highlight_style(highlight: Highlight) -> Style {
    match highlight {
        Highlight::Highest => Style::default().fg(Color::Green),
        Highlight::Lowest => Style::default().fg(Color::Red),
        Highlight::HighestAndLowest => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        Highlight::Average => Style::default().fg(Color::Yellow),
        Highlight::Unrated => Style::default(),
    }
}

fn badge_style(record: &Record) -> Style {
    match record.badge_tone() {
        BadgeTone::Success => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        BadgeTone::Info => Style::default().fg(Color::Cyan),
    }
}

fn render_monitored(frame: &mut ratatui::Frame<'_>, area: Rect, monitored: &MonitoredView) {
    let title = match monitored.phase() {
        MonitoredPhase::Idle => "monitored".to_owned(),
        MonitoredPhase::Loading => "monitored · loading".to_owned(),
        MonitoredPhase::Loaded => format!("monitored · {}", monitored.entries().len()),
        MonitoredPhase::Failed(_) => "monitored · failed".to_owned(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if let MonitoredPhase::Failed(message) = monitored.phase() {
        let failure = Paragraph::new(message.clone())
            .style(Style::default().fg(Color::Red))
            .block(block);
        frame.render_widget(failure, area);
        return;
    }
    if monitored.phase() == &MonitoredPhase::Loaded && monitored.entries().is_empty() {
        frame.render_widget(Paragraph::new("No monitored users").block(block), area);
        return;
    }

    let header = Row::new(vec!["user", "reason", "detected"]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );
    let rows = monitored.entries().iter().map(|entry| {
        Row::new(vec![
            Cell::from(entry.subject_id.to_string()),
            Cell::from(entry.reason.clone()),
            Cell::from(format_timestamp(&entry.detected_at, DATETIME_FORMAT)),
        ])
    });
    let widths = [
        Constraint::Length(8),
        Constraint::Min(20),
        Constraint::Length(17),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_charts(frame: &mut ratatui::Frame<'_>, area: Rect, rows: &[Record]) {
    if rows.is_empty() {
        let empty = Paragraph::new("no rows loaded")
            .block(Block::default().title("charts").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let charts = [
        ("by type", type_distribution(rows)),
        ("by email domain", email_domain_distribution(rows)),
        ("registrations", registration_trend(rows)),
    ];
    for ((title, series), column) in charts.iter().zip(columns.iter()) {
        let data = bar_data(series);
        let chart = BarChart::default()
            .block(Block::default().title(*title).borders(Borders::ALL))
            .data(data.as_slice())
            .bar_width(5)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        frame.render_widget(chart, *column);
    }
}

fn bar_data(series: &[SeriesPoint]) -> Vec<(&str, u64)> {
    series
        .iter()
        .map(|point| (point.label.as_str(), point.value.max(0.0).round() as u64))
        .collect()
}

fn header_label(field: SortField, query: &QueryState) -> String {
    if query.sort == field {
        format!("{} {}", field.label(), query.order.marker())
    } else {
        field.label().to_owned()
    }
}

fn table_title(table: &TableController) -> String {
    let base = format!("{}s · page {}", table.config().noun, table.page());
    match table.phase() {
        LoadPhase::Loading => format!("{base} · loading"),
        LoadPhase::Failed(_) => format!("{base} · load failed"),
        LoadPhase::Idle | LoadPhase::Loaded => base,
    }
}

fn pagination_text(table: &TableController) -> String {
    let page = table.page();
    let controls = table
        .page_controls()
        .into_iter()
        .map(|control| {
            if control == page {
                format!("[{control}]")
            } else {
                control.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let mut text = format!("pages: {controls}");
    if page > 1 {
        text.push_str(" | p prev");
    }
    if table.has_next_page() {
        text.push_str(" | n next");
    }
    text
}

fn filter_bar_text(state: &AppState, view_data: &ViewData) -> String {
    let filters = &view_data.table.query().filters;
    FilterField::ALL
        .iter()
        .map(|field| {
            let value = filters.get(*field);
            if state.mode == AppMode::Filter(*field) {
                format!("[{}: {}_]", field.as_str(), view_data.filter_input)
            } else {
                format!("{}: {value}", field.as_str())
            }
        })
        .collect::<Vec<_>>()
        .join("   ")
}

fn created_label(record: &Record) -> String {
    record
        .created_at
        .as_deref()
        .map(|raw| format_timestamp(raw, DATE_FORMAT))
        .unwrap_or_default()
}

fn format_timestamp(raw: &str, format: &[BorrowedFormatItem<'_>]) -> String {
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|parsed| parsed.format(format).ok())
        .unwrap_or_else(|| raw.to_owned())
}

fn render_form_text(session: &EditSession, form_field: usize, noun: &str) -> String {
    let mut lines = Vec::new();
    lines.push(match session.target {
        EditTarget::New => format!("new {noun}"),
        EditTarget::Existing(id) => format!("edit {noun} #{id}"),
    });
    lines.push(String::new());

    for (index, field) in FormField::ALL.iter().enumerate() {
        let active = index == form_field % FormField::ALL.len();
        let marker = if active { ">" } else { " " };
        let cursor = if active { "_" } else { "" };
        lines.push(format!(
            "{marker} {:<7} {}{cursor}",
            field.label(),
            session.fields.value(*field)
        ));
        if let Some(error) = session.errors.get(*field) {
            lines.push(format!("    ! {error}"));
        }
    }

    lines.push(String::new());
    if session.is_submitting() {
        lines.push("saving...".to_owned());
    } else {
        lines.push("enter save | esc cancel".to_owned());
    }
    lines.join("\n")
}

fn render_confirm_text(table: &TableController) -> String {
    let DeleteCandidate::Pending(id) = table.delete_candidate() else {
        return String::new();
    };
    let name = table
        .row(id)
        .map(|row| row.name.clone())
        .unwrap_or_else(|| format!("#{id}"));
    format!("Delete {name}?\nThis cannot be undone.\n\ny confirm | n cancel")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = match state.mode {
        AppMode::Browse => "BROWSE",
        AppMode::Filter(_) => "FILTER",
        AppMode::Form => "FORM",
        AppMode::Confirm => "CONFIRM",
    };
    let hints = match state.mode {
        AppMode::Browse => {
            "j/k move | n/p page | 1-4 sort | o order | / filter | a add | e edit | d del | r reload | tab view | ? help | q quit"
        }
        AppMode::Filter(_) => "type to filter | tab next field | enter/esc done",
        AppMode::Form => "tab/shift+tab field | enter save | esc cancel",
        AppMode::Confirm => "y confirm | n cancel",
    };
    let message = view_data
        .table
        .notice()
        .map(|notice| notice.message.clone())
        .or_else(|| state.status_line.clone());
    match message {
        Some(message) => format!("{mode} | {message} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | tab/shift+tab view | ? help\n\
users: j/k move | n/p next/prev page | g first page | r reload | x dismiss notice\n\
users: 1 name | 2 email | 3 type | 4 created (repeat flips order) | o flip order\n\
users: / filter | a add | e or enter edit | d delete\n\
filter: type to narrow | backspace | tab next field | enter/esc done\n\
form: tab/shift+tab field | enter save | esc cancel\n\
confirm: y delete | n keep\n\
monitored: r reload"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
