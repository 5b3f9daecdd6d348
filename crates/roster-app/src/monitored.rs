// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, warn};

use crate::{Completion, Effect, MonitoredEntry, RequestTicket, TicketSequence};

pub const MONITORED_FAILURE: &str = "Not authorized or server error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitoredPhase {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Read-only listing of subjects the store has flagged.
#[derive(Debug, Clone)]
pub struct MonitoredView {
    phase: MonitoredPhase,
    entries: Vec<MonitoredEntry>,
    tickets: TicketSequence,
    latest: Option<RequestTicket>,
}

impl Default for MonitoredView {
    fn default() -> Self {
        Self {
            phase: MonitoredPhase::Idle,
            entries: Vec::new(),
            tickets: TicketSequence::default(),
            latest: None,
        }
    }
}

impl MonitoredView {
    pub fn phase(&self) -> &MonitoredPhase {
        &self.phase
    }

    pub fn entries(&self) -> &[MonitoredEntry] {
        &self.entries
    }

    pub fn load(&mut self) -> Effect {
        let ticket = self.tickets.issue();
        self.latest = Some(ticket);
        self.phase = MonitoredPhase::Loading;
        debug!(ticket = ticket.get(), "issuing monitored request");
        Effect::FetchMonitored { ticket }
    }

    /// Applies a monitored listing. Returns false when the completion is not the
    /// latest one this view issued.
    pub fn resolve(&mut self, completion: Completion) -> bool {
        let Completion::MonitoredListed { ticket, result } = completion else {
            return false;
        };
        if self.latest != Some(ticket) {
            debug!(ticket = ticket.get(), "discarding superseded monitored response");
            return false;
        }
        self.latest = None;
        match result {
            Ok(entries) => {
                self.entries = entries;
                self.phase = MonitoredPhase::Loaded;
            }
            Err(error) => {
                warn!(%error, "monitored request failed");
                self.entries.clear();
                self.phase = MonitoredPhase::Failed(error.notice_text(MONITORED_FAILURE));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{MONITORED_FAILURE, MonitoredPhase, MonitoredView};
    use crate::{Completion, GatewayError, MonitoredEntry, SubjectId};

    fn entry(id: i64) -> MonitoredEntry {
        MonitoredEntry {
            subject_id: SubjectId::new(id),
            reason: "too many deletes".to_owned(),
            detected_at: "2026-03-01T10:00:00Z".to_owned(),
        }
    }

    #[test]
    fn load_then_resolve_populates_entries() {
        let mut view = MonitoredView::default();
        let ticket = view.load().ticket();
        assert_eq!(view.phase(), &MonitoredPhase::Loading);

        assert!(view.resolve(Completion::MonitoredListed {
            ticket,
            result: Ok(vec![entry(3)]),
        }));
        assert_eq!(view.phase(), &MonitoredPhase::Loaded);
        assert_eq!(view.entries()[0].subject_id, SubjectId::new(3));
    }

    #[test]
    fn superseded_response_is_ignored() {
        let mut view = MonitoredView::default();
        let first = view.load().ticket();
        let second = view.load().ticket();

        assert!(!view.resolve(Completion::MonitoredListed {
            ticket: first,
            result: Ok(vec![entry(1)]),
        }));
        assert!(view.entries().is_empty());
        assert!(view.resolve(Completion::MonitoredListed {
            ticket: second,
            result: Ok(Vec::new()),
        }));
    }

    #[test]
    fn failure_uses_fallback_message() {
        let mut view = MonitoredView::default();
        let ticket = view.load().ticket();
        view.resolve(Completion::MonitoredListed {
            ticket,
            result: Err(GatewayError::Rejected {
                status: 403,
                reason: None,
            }),
        });
        assert_eq!(
            view.phase(),
            &MonitoredPhase::Failed(MONITORED_FAILURE.to_owned())
        );
    }
}
