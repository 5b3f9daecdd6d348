// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use roster_app::{
    ActorId, GatewayError, GatewayResult, ListQuery, MonitoredEntry, Record, RecordFields,
    RecordGateway, RecordId, SortDirection, SortField,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One request as the in-memory store received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    List(ListQuery),
    Create(RecordFields),
    Update {
        id: RecordId,
        actor: Option<ActorId>,
    },
    Delete {
        id: RecordId,
        actor: Option<ActorId>,
    },
    ListMonitored,
}

#[derive(Default)]
struct MemoryState {
    rows: Vec<Record>,
    next_id: i64,
    monitored: Vec<MonitoredEntry>,
    calls: Vec<GatewayCall>,
    failures: VecDeque<GatewayError>,
}

/// Store double that filters, sorts, and pages like the remote service and
/// records every call it receives.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn with_rows(rows: Vec<Record>) -> Self {
        let next_id = rows.iter().map(|row| row.id.get()).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(MemoryState {
                rows,
                next_id,
                ..MemoryState::default()
            }),
        }
    }

    pub fn with_monitored(self, entries: Vec<MonitoredEntry>) -> Self {
        self.lock().monitored = entries;
        self
    }

    /// Queues an error for the next call, whatever its kind.
    pub fn fail_next(&self, error: GatewayError) {
        self.lock().failures.push_back(error);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn rows(&self) -> Vec<Record> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, call: GatewayCall) -> GatewayResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

fn not_found(id: RecordId) -> GatewayError {
    GatewayError::Rejected {
        status: 404,
        reason: Some(format!("user {id} not found")),
    }
}

fn matches_filter(value: &str, needle: &str) -> bool {
    needle.is_empty() || value.to_lowercase().contains(&needle.to_lowercase())
}

fn compare(left: &Record, right: &Record, sort: SortField) -> Ordering {
    match sort {
        SortField::Name => left.name.cmp(&right.name),
        SortField::Email => left.email.cmp(&right.email),
        SortField::Type => left.kind.cmp(&right.kind),
        SortField::CreatedAt => left.created_at.cmp(&right.created_at),
    }
}

/// Applies a request body with PATCH semantics: keys missing from the wire
/// body keep their stored value, and a `null` budget clears it.
fn apply_body(record: &mut Record, fields: &RecordFields) -> GatewayResult<()> {
    let body = serde_json::to_value(fields).map_err(|error| GatewayError::Decode {
        what: "request body".to_owned(),
        detail: error.to_string(),
    })?;
    let Value::Object(body) = body else {
        return Err(GatewayError::Rejected {
            status: 400,
            reason: Some("body must be an object".to_owned()),
        });
    };
    for (key, value) in body {
        match (key.as_str(), value) {
            ("name", Value::String(name)) => record.name = name,
            ("email", Value::String(email)) => record.email = email,
            ("type", Value::String(kind)) => record.kind = kind,
            ("budget", Value::String(budget)) => record.budget = Some(budget),
            ("budget", Value::Null) => record.budget = None,
            _ => {}
        }
    }
    Ok(())
}

impl RecordGateway for MemoryGateway {
    fn list(&self, query: &ListQuery) -> GatewayResult<Vec<Record>> {
        let state = self.begin(GatewayCall::List(query.clone()))?;
        let mut rows: Vec<Record> = state
            .rows
            .iter()
            .filter(|row| {
                matches_filter(&row.name, &query.filters.name)
                    && matches_filter(&row.email, &query.filters.email)
                    && matches_filter(&row.kind, &query.filters.kind)
            })
            .cloned()
            .collect();
        rows.sort_by(|left, right| {
            let ordering = compare(left, right, query.sort).then(left.id.cmp(&right.id));
            match query.order {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect())
    }

    fn create(&self, fields: &RecordFields) -> GatewayResult<()> {
        let mut state = self.begin(GatewayCall::Create(fields.clone()))?;
        let id = RecordId::new(state.next_id.max(1));
        state.next_id = id.get() + 1;
        let mut record = Record {
            id,
            name: String::new(),
            email: String::new(),
            kind: String::new(),
            image: None,
            budget: None,
            created_at: Some(crate::fixture_datetime().to_owned()),
        };
        apply_body(&mut record, fields)?;
        state.rows.push(record);
        Ok(())
    }

    fn update(
        &self,
        id: RecordId,
        fields: &RecordFields,
        actor: Option<&ActorId>,
    ) -> GatewayResult<()> {
        let mut state = self.begin(GatewayCall::Update {
            id,
            actor: actor.cloned(),
        })?;
        let record = state
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| not_found(id))?;
        apply_body(record, fields)
    }

    fn delete(&self, id: RecordId, actor: Option<&ActorId>) -> GatewayResult<()> {
        let mut state = self.begin(GatewayCall::Delete {
            id,
            actor: actor.cloned(),
        })?;
        let before = state.rows.len();
        state.rows.retain(|row| row.id != id);
        if state.rows.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn list_monitored(&self) -> GatewayResult<Vec<MonitoredEntry>> {
        let state = self.begin(GatewayCall::ListMonitored)?;
        Ok(state.monitored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{GatewayCall, MemoryGateway};
    use crate::sample_records;
    use roster_app::{
        FilterField, FormField, GatewayError, ListQuery, QueryState, RecordFields, RecordGateway,
        RecordId, SortDirection, SortField,
    };

    fn query(configure: impl FnOnce(&mut QueryState), page_size: u32) -> ListQuery {
        let mut state = QueryState::default();
        configure(&mut state);
        ListQuery::from_state(&state, page_size)
    }

    #[test]
    fn list_filters_case_insensitively() {
        let gateway = MemoryGateway::with_rows(sample_records());
        let rows = gateway
            .list(&query(
                |state| state.filters.set(FilterField::Email, "GMAIL".to_owned()),
                10,
            ))
            .expect("list");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn list_sorts_and_pages() {
        let gateway = MemoryGateway::with_rows(sample_records());
        let rows = gateway
            .list(&query(
                |state| {
                    state.sort = SortField::Name;
                    state.order = SortDirection::Desc;
                    state.set_page(2);
                },
                3,
            ))
            .expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Abram Schleifer");
    }

    #[test]
    fn create_assigns_next_id() {
        let gateway = MemoryGateway::with_rows(sample_records());
        gateway
            .create(&RecordFields {
                name: "Test User".to_owned(),
                email: "test@example.com".to_owned(),
                kind: "Developer".to_owned(),
                budget: Some("15K".to_owned()),
            })
            .expect("create");
        let rows = gateway.rows();
        assert_eq!(rows.len(), 5);
        let created = rows.last().expect("created row");
        assert_eq!(created.id, RecordId::new(5));
        assert_eq!(created.budget.as_deref(), Some("15K"));
    }

    #[test]
    fn update_with_cleared_budget_removes_stored_budget() {
        let gateway = MemoryGateway::with_rows(sample_records());
        let stored = gateway.rows()[0].clone();
        assert!(stored.budget.is_some());

        let mut fields = RecordFields::from(&stored);
        fields.set(FormField::Budget, String::new());
        gateway.update(stored.id, &fields, None).expect("update");

        let row = gateway
            .rows()
            .into_iter()
            .find(|row| row.id == stored.id)
            .expect("row kept");
        assert_eq!(row.budget, None);
        assert_eq!(row.name, stored.name);
    }

    #[test]
    fn missing_rows_are_rejected() {
        let gateway = MemoryGateway::default();
        let error = gateway.delete(RecordId::new(9), None).expect_err("missing");
        assert!(matches!(error, GatewayError::Rejected { status: 404, .. }));
    }

    #[test]
    fn queued_failure_applies_once_and_is_logged() {
        let gateway = MemoryGateway::with_rows(sample_records());
        gateway.fail_next(GatewayError::Rejected {
            status: 500,
            reason: None,
        });
        assert!(gateway.list_monitored().is_err());
        assert!(gateway.list_monitored().is_ok());
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::ListMonitored, GatewayCall::ListMonitored]
        );
    }
}
