// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(RecordId);
entity_id!(SubjectId);

/// Monotonic tag attached to every issued request. Completions carry it back so
/// superseded responses can be told apart from the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketSequence {
    last: u64,
}

impl TicketSequence {
    pub fn issue(&mut self) -> RequestTicket {
        self.last = self.last.saturating_add(1);
        RequestTicket(self.last)
    }

    pub const fn last_issued(&self) -> Option<RequestTicket> {
        if self.last == 0 {
            None
        } else {
            Some(RequestTicket(self.last))
        }
    }
}

/// Opaque identifier of the person performing mutations. Passed through to the
/// store as an authorization hint and never validated locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads the `id` of a stored user object (`{"id": 7, ...}`). Numbers and
    /// strings are both accepted; anything else yields no actor.
    pub fn from_user_json(raw: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        match value.get("id")? {
            serde_json::Value::String(id) => Some(Self(id.clone())),
            serde_json::Value::Number(id) => Some(Self(id.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
