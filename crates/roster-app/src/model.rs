// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn marker(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Name,
    Email,
    Type,
    CreatedAt,
}

impl SortField {
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Type, Self::CreatedAt];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Type => "type",
            Self::CreatedAt => "created_at",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "type" => Some(Self::Type),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Type => "type",
            Self::CreatedAt => "created",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterField {
    Name,
    Email,
    Type,
}

impl FilterField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Type];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Type => "type",
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Type,
            Self::Type => Self::Name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub name: String,
    pub email: String,
    pub kind: String,
}

impl Filters {
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Name => &self.name,
            FilterField::Email => &self.email,
            FilterField::Type => &self.kind,
        }
    }

    pub fn set(&mut self, field: FilterField, value: String) {
        match field {
            FilterField::Name => self.name = value,
            FilterField::Email => self.email = value,
            FilterField::Type => self.kind = value,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        FilterField::ALL
            .iter()
            .all(|field| self.get(*field).is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub filters: Filters,
    pub sort: SortField,
    pub order: SortDirection,
    page: u32,
}

impl QueryState {
    pub fn new(sort: SortField, order: SortDirection) -> Self {
        Self {
            filters: Filters::default(),
            sort,
            order,
            page: 1,
        }
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Pages are one-based; zero is clamped to the first page.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(SortField::Name, SortDirection::Asc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

pub const HIGHLIGHTED_TYPE: &str = "Agent imobiliar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Success,
    Info,
}

impl Record {
    pub fn badge_tone(&self) -> BadgeTone {
        if self.kind == HIGHLIGHTED_TYPE {
            BadgeTone::Success
        } else {
            BadgeTone::Info
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredEntry {
    #[serde(rename = "user_id")]
    pub subject_id: SubjectId,
    pub reason: String,
    pub detected_at: String,
}

impl MonitoredEntry {
    pub fn detected_at_parsed(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.detected_at, &Rfc3339).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
