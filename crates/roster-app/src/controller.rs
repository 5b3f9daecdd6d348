// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, info, warn};

use crate::{
    ActorId, Completion, Effect, FieldErrors, FilterField, FormField, GatewayResult, Highlight,
    ListQuery, Notice, QueryState, Record, RecordFields, RecordId, RequestTicket, SortDirection,
    SortField, TicketSequence, classify_budgets, validate, validate_field,
};

/// Most page-number controls offered at once, counting the current page.
pub const PAGE_CONTROL_WINDOW: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub page_size: u32,
    pub default_sort: SortField,
    pub default_order: SortDirection,
    pub actor: Option<ActorId>,
    /// Singular name of one record, used in notices ("user").
    pub noun: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            default_sort: SortField::Name,
            default_order: SortDirection::Asc,
            actor: None,
            noun: "user".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target: EditTarget,
    pub fields: RecordFields,
    pub errors: FieldErrors,
    pub submitting: Option<RequestTicket>,
}

impl EditSession {
    fn open(target: EditTarget, fields: RecordFields) -> Self {
        Self {
            target,
            fields,
            errors: FieldErrors::default(),
            submitting: None,
        }
    }

    pub const fn is_submitting(&self) -> bool {
        self.submitting.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteCandidate {
    None,
    Pending(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIntent {
    Mount,
    SetFilter { field: FilterField, value: String },
    SortBy(SortField),
    SetSortDirection(SortDirection),
    NextPage,
    PrevPage,
    GoToPage(u32),
    Refresh,
    BeginCreate,
    BeginEdit(RecordId),
    EditField { field: FormField, value: String },
    SubmitEdit,
    CancelEdit,
    RequestDelete(RecordId),
    ConfirmDelete,
    CancelDelete,
    DismissNotice,
}

/// Owns query state, the loaded page, and the edit/delete lifecycles. It never
/// talks to the network itself: intents and completions go in, effects come out.
#[derive(Debug, Clone)]
pub struct TableController {
    config: ControllerConfig,
    query: QueryState,
    phase: LoadPhase,
    rows: Vec<Record>,
    highlights: Vec<Highlight>,
    edit: Option<EditSession>,
    delete: DeleteCandidate,
    deleting: Option<(RequestTicket, RecordId)>,
    tickets: TicketSequence,
    latest_fetch: Option<RequestTicket>,
    notice: Option<Notice>,
}

impl TableController {
    pub fn new(config: ControllerConfig) -> Self {
        let query = QueryState::new(config.default_sort, config.default_order);
        Self {
            config,
            query,
            phase: LoadPhase::Idle,
            rows: Vec::new(),
            highlights: Vec::new(),
            edit: None,
            delete: DeleteCandidate::None,
            deleting: None,
            tickets: TicketSequence::default(),
            latest_fetch: None,
            notice: None,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn rows_with_highlights(&self) -> impl Iterator<Item = (&Record, Highlight)> {
        self.rows.iter().zip(self.highlights.iter().copied())
    }

    pub fn row(&self, id: RecordId) -> Option<&Record> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub const fn delete_candidate(&self) -> DeleteCandidate {
        self.delete
    }

    pub fn deleting(&self) -> Option<RecordId> {
        self.deleting.map(|(_, id)| id)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub const fn page(&self) -> u32 {
        self.query.page()
    }

    /// A full page suggests more rows may follow; a short page is the last one.
    pub fn has_next_page(&self) -> bool {
        self.rows.len() >= self.config.page_size as usize
    }

    /// Page numbers to offer as controls: up to [`PAGE_CONTROL_WINDOW`] pages
    /// ending at the current one, plus the next page when the current one is full.
    pub fn page_controls(&self) -> Vec<u32> {
        let page = self.page();
        let first = page.saturating_sub(PAGE_CONTROL_WINDOW - 1).max(1);
        let mut controls: Vec<u32> = (first..=page).collect();
        if self.has_next_page()
            && let Some(next) = page.checked_add(1)
        {
            controls.push(next);
        }
        controls
    }

    pub fn current_query(&self) -> ListQuery {
        ListQuery::from_state(&self.query, self.config.page_size)
    }

    pub fn dispatch(&mut self, intent: TableIntent) -> Vec<Effect> {
        match intent {
            TableIntent::Mount => {
                self.query = QueryState::new(self.config.default_sort, self.config.default_order);
                self.fetch()
            }
            TableIntent::SetFilter { field, value } => {
                if self.query.filters.get(field) == value {
                    return Vec::new();
                }
                self.query.filters.set(field, value);
                self.fetch()
            }
            TableIntent::SortBy(field) => {
                self.query.sort = field;
                self.query.order = self.query.order.flipped();
                self.fetch()
            }
            TableIntent::SetSortDirection(order) => {
                if self.query.order == order {
                    return Vec::new();
                }
                self.query.order = order;
                self.fetch()
            }
            TableIntent::NextPage => {
                let Some(next) = self.page().checked_add(1) else {
                    return Vec::new();
                };
                if !self.has_next_page() {
                    return Vec::new();
                }
                self.query.set_page(next);
                self.fetch()
            }
            TableIntent::PrevPage => {
                if self.page() <= 1 {
                    return Vec::new();
                }
                self.query.set_page(self.page() - 1);
                self.fetch()
            }
            TableIntent::GoToPage(page) => {
                if page == 0 || page == self.page() {
                    return Vec::new();
                }
                self.query.set_page(page);
                self.fetch()
            }
            TableIntent::Refresh => self.fetch(),
            TableIntent::BeginCreate => {
                self.edit = Some(EditSession::open(EditTarget::New, RecordFields::default()));
                Vec::new()
            }
            TableIntent::BeginEdit(id) => {
                match self.row(id) {
                    Some(record) => {
                        let fields = RecordFields::from(record);
                        self.edit = Some(EditSession::open(EditTarget::Existing(id), fields));
                    }
                    None => debug!(id = id.get(), "edit requested for a row not on this page"),
                }
                Vec::new()
            }
            TableIntent::EditField { field, value } => {
                if let Some(session) = self.edit.as_mut()
                    && !session.is_submitting()
                {
                    session.fields.set(field, value);
                    let message = validate_field(field, &session.fields);
                    session.errors.put(field, message);
                }
                Vec::new()
            }
            TableIntent::SubmitEdit => self.submit(),
            TableIntent::CancelEdit => {
                self.edit = None;
                Vec::new()
            }
            TableIntent::RequestDelete(id) => {
                self.delete = DeleteCandidate::Pending(id);
                Vec::new()
            }
            TableIntent::ConfirmDelete => {
                let DeleteCandidate::Pending(id) =
                    std::mem::replace(&mut self.delete, DeleteCandidate::None)
                else {
                    return Vec::new();
                };
                let ticket = self.tickets.issue();
                self.deleting = Some((ticket, id));
                info!(ticket = ticket.get(), id = id.get(), "deleting record");
                vec![Effect::Delete {
                    ticket,
                    id,
                    actor: self.config.actor.clone(),
                }]
            }
            TableIntent::CancelDelete => {
                self.delete = DeleteCandidate::None;
                Vec::new()
            }
            TableIntent::DismissNotice => {
                self.notice = None;
                Vec::new()
            }
        }
    }

    pub fn resolve(&mut self, completion: Completion) -> Vec<Effect> {
        match completion {
            Completion::Listed { ticket, result } => {
                if self.latest_fetch != Some(ticket) {
                    debug!(ticket = ticket.get(), "discarding superseded list response");
                    return Vec::new();
                }
                self.latest_fetch = None;
                match result {
                    Ok(rows) => {
                        debug!(ticket = ticket.get(), rows = rows.len(), "page loaded");
                        self.highlights = classify_budgets(&rows);
                        self.rows = rows;
                        self.phase = LoadPhase::Loaded;
                    }
                    Err(error) => {
                        warn!(ticket = ticket.get(), %error, "list request failed");
                        let generic = format!("Failed to fetch {}s", self.config.noun);
                        self.notice = Some(Notice::error(error.notice_text(&generic)));
                        self.phase = LoadPhase::Failed(error.to_string());
                    }
                }
                Vec::new()
            }
            Completion::Created { ticket, result } => self.finish_submit(ticket, result, "add"),
            Completion::Updated { ticket, result } => self.finish_submit(ticket, result, "update"),
            Completion::Deleted { ticket, result } => {
                if self.deleting.is_some_and(|(pending, _)| pending == ticket) {
                    self.deleting = None;
                }
                match result {
                    Ok(()) => {
                        info!(ticket = ticket.get(), "record deleted");
                        self.notice = Some(Notice::info(format!(
                            "{} successfully deleted.",
                            capitalized(&self.config.noun)
                        )));
                        self.fetch()
                    }
                    Err(error) => {
                        warn!(ticket = ticket.get(), %error, "delete request failed");
                        let generic = format!("Failed to delete {}", self.config.noun);
                        self.notice = Some(Notice::error(error.notice_text(&generic)));
                        Vec::new()
                    }
                }
            }
            Completion::MonitoredListed { .. } => Vec::new(),
        }
    }

    fn fetch(&mut self) -> Vec<Effect> {
        let ticket = self.tickets.issue();
        self.latest_fetch = Some(ticket);
        self.phase = LoadPhase::Loading;
        let query = self.current_query();
        debug!(
            ticket = ticket.get(),
            page = self.page(),
            sort = query.sort.as_str(),
            order = query.order.as_str(),
            "issuing list request"
        );
        vec![Effect::Fetch { ticket, query }]
    }

    fn submit(&mut self) -> Vec<Effect> {
        let Some(session) = self.edit.as_mut() else {
            return Vec::new();
        };
        if session.is_submitting() {
            return Vec::new();
        }

        session.errors = validate(&session.fields);
        if !session.errors.is_empty() {
            debug!(errors = session.errors.len(), "submission blocked by validation");
            return Vec::new();
        }

        let ticket = self.tickets.issue();
        session.submitting = Some(ticket);
        let fields = session.fields.clone();
        match session.target {
            EditTarget::New => {
                info!(ticket = ticket.get(), "creating record");
                vec![Effect::Create { ticket, fields }]
            }
            EditTarget::Existing(id) => {
                info!(ticket = ticket.get(), id = id.get(), "updating record");
                vec![Effect::Update {
                    ticket,
                    id,
                    fields,
                    actor: self.config.actor.clone(),
                }]
            }
        }
    }

    fn finish_submit(
        &mut self,
        ticket: RequestTicket,
        result: GatewayResult<()>,
        verb: &str,
    ) -> Vec<Effect> {
        let owns_session = self
            .edit
            .as_ref()
            .is_some_and(|session| session.submitting == Some(ticket));

        match result {
            Ok(()) => {
                info!(ticket = ticket.get(), "{verb} succeeded");
                if owns_session {
                    self.edit = None;
                }
                let past = if verb == "add" { "added" } else { "updated" };
                self.notice = Some(Notice::info(format!(
                    "{} successfully {past}.",
                    capitalized(&self.config.noun)
                )));
                self.fetch()
            }
            Err(error) => {
                warn!(ticket = ticket.get(), %error, "{verb} request failed");
                if owns_session && let Some(session) = self.edit.as_mut() {
                    session.submitting = None;
                }
                let generic = format!("Failed to {verb} {}", self.config.noun);
                self.notice = Some(Notice::error(error.notice_text(&generic)));
                Vec::new()
            }
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
