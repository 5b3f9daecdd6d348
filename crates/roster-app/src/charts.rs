// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use indexmap::IndexMap;

use crate::Record;

pub const UNKNOWN_DOMAIN: &str = "(no domain)";

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

fn count_by<'a>(rows: &'a [Record], key: impl Fn(&'a Record) -> &'a str) -> Vec<SeriesPoint> {
    let mut counts: IndexMap<&str, u64> = IndexMap::new();
    for row in rows {
        *counts.entry(key(row)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(label, count)| SeriesPoint {
            label: label.to_owned(),
            value: count as f64,
        })
        .collect()
}

/// Rows per type, in order of first appearance.
pub fn type_distribution(rows: &[Record]) -> Vec<SeriesPoint> {
    count_by(rows, |row| row.kind.as_str())
}

/// Rows per email domain, in order of first appearance.
pub fn email_domain_distribution(rows: &[Record]) -> Vec<SeriesPoint> {
    count_by(rows, |row| {
        row.email
            .split_once('@')
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
            .unwrap_or(UNKNOWN_DOMAIN)
    })
}

/// Running count of rows, one point per loaded record.
pub fn registration_trend(rows: &[Record]) -> Vec<SeriesPoint> {
    (1..=rows.len())
        .map(|position| SeriesPoint {
            label: format!("User {position}"),
            value: position as f64,
        })
        .collect()
}
