// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{ActorId, ListQuery, MonitoredEntry, Record, RecordFields, RecordId, RequestTicket};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("cannot reach {endpoint}: {detail}")]
    Transport { endpoint: String, detail: String },
    #[error("server rejected request ({status}){}", reason_suffix(.reason.as_deref()))]
    Rejected { status: u16, reason: Option<String> },
    #[error("decode {what}: {detail}")]
    Decode { what: String, detail: String },
}

fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|reason| format!(": {reason}")).unwrap_or_default()
}

impl GatewayError {
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason, .. } => reason.as_deref(),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// Text for a user-facing notice: the server's reason when it gave one,
    /// otherwise the generic message for the failed action.
    pub fn notice_text(&self, generic: &str) -> String {
        match self.reason() {
            Some(reason) if !reason.trim().is_empty() => format!("{generic}: {reason}"),
            _ => generic.to_owned(),
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// The remote store as the controller sees it. Mutations report acceptance
/// only; the controller refetches the page to see their effect.
pub trait RecordGateway: Send + Sync {
    fn list(&self, query: &ListQuery) -> GatewayResult<Vec<Record>>;
    fn create(&self, fields: &RecordFields) -> GatewayResult<()>;
    fn update(
        &self,
        id: RecordId,
        fields: &RecordFields,
        actor: Option<&ActorId>,
    ) -> GatewayResult<()>;
    fn delete(&self, id: RecordId, actor: Option<&ActorId>) -> GatewayResult<()>;
    fn list_monitored(&self) -> GatewayResult<Vec<MonitoredEntry>>;
}

/// A request the controller wants performed. The caller decides where and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch {
        ticket: RequestTicket,
        query: ListQuery,
    },
    Create {
        ticket: RequestTicket,
        fields: RecordFields,
    },
    Update {
        ticket: RequestTicket,
        id: RecordId,
        fields: RecordFields,
        actor: Option<ActorId>,
    },
    Delete {
        ticket: RequestTicket,
        id: RecordId,
        actor: Option<ActorId>,
    },
    FetchMonitored {
        ticket: RequestTicket,
    },
}

impl Effect {
    pub const fn ticket(&self) -> RequestTicket {
        match self {
            Self::Fetch { ticket, .. }
            | Self::Create { ticket, .. }
            | Self::Update { ticket, .. }
            | Self::Delete { ticket, .. }
            | Self::FetchMonitored { ticket } => *ticket,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Listed {
        ticket: RequestTicket,
        result: GatewayResult<Vec<Record>>,
    },
    Created {
        ticket: RequestTicket,
        result: GatewayResult<()>,
    },
    Updated {
        ticket: RequestTicket,
        result: GatewayResult<()>,
    },
    Deleted {
        ticket: RequestTicket,
        result: GatewayResult<()>,
    },
    MonitoredListed {
        ticket: RequestTicket,
        result: GatewayResult<Vec<MonitoredEntry>>,
    },
}

impl Completion {
    pub const fn ticket(&self) -> RequestTicket {
        match self {
            Self::Listed { ticket, .. }
            | Self::Created { ticket, .. }
            | Self::Updated { ticket, .. }
            | Self::Deleted { ticket, .. }
            | Self::MonitoredListed { ticket, .. } => *ticket,
        }
    }
}

/// Runs one effect to completion against a gateway. Blocks for the duration of
/// the network call.
pub fn perform<G: RecordGateway + ?Sized>(gateway: &G, effect: &Effect) -> Completion {
    match effect {
        Effect::Fetch { ticket, query } => Completion::Listed {
            ticket: *ticket,
            result: gateway.list(query),
        },
        Effect::Create { ticket, fields } => Completion::Created {
            ticket: *ticket,
            result: gateway.create(fields),
        },
        Effect::Update {
            ticket,
            id,
            fields,
            actor,
        } => Completion::Updated {
            ticket: *ticket,
            result: gateway.update(*id, fields, actor.as_ref()),
        },
        Effect::Delete { ticket, id, actor } => Completion::Deleted {
            ticket: *ticket,
            result: gateway.delete(*id, actor.as_ref()),
        },
        Effect::FetchMonitored { ticket } => Completion::MonitoredListed {
            ticket: *ticket,
            result: gateway.list_monitored(),
        },
    }
}
