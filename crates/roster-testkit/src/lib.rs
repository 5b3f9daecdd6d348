// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod memory;

pub use memory::*;

use anyhow::{Context, Result};
use roster_app::{Record, RecordId};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const EMAIL_DOMAINS: [&str; 5] = [
    "example.com",
    "mail.test",
    "agency.test",
    "realty.test",
    "inbox.test",
];
const RECORD_TYPES: [&str; 4] = ["Client", "Agent imobiliar", "Developer", "Investor"];

const REFERENCE_YEAR: i32 = 2025;

struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of plausible records. Same seed, same sequence.
pub struct RosterFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl RosterFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn record(&mut self) -> Record {
        let id = self.next_id;
        self.next_id += 1;

        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&EMAIL_DOMAINS);
        let kind = self.pick(&RECORD_TYPES).to_owned();
        let budget = self.rng.bool().then(|| self.budget());
        let created_at = self.date_in_year(REFERENCE_YEAR).format(&Rfc3339).ok();

        Record {
            id: RecordId::new(id),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}{id}@{domain}",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            kind,
            image: None,
            budget,
            created_at,
        }
    }

    pub fn records(&mut self, count: usize) -> Vec<Record> {
        (0..count).map(|_| self.record()).collect()
    }

    /// A budget in the `"<number>K"` shape, sometimes with one decimal.
    pub fn budget(&mut self) -> String {
        let whole = 1 + self.rng.int_n(50);
        if self.rng.bool() {
            format!("{whole}.{}K", self.rng.int_n(10))
        } else {
            format!("{whole}K")
        }
    }

    pub fn date_in_year(&mut self, year: i32) -> OffsetDateTime {
        let start = midnight_utc(year, Month::January, 1);
        let end =
            midnight_utc(year, Month::December, 31) + Duration::days(1) - Duration::seconds(1);
        let span = (end.unix_timestamp() - start.unix_timestamp()) as u64;
        let offset = self.rng.next_u64() % (span + 1);
        start + Duration::seconds(offset as i64)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// Four rows whose budgets exercise every highlight role: one highest, one
/// lowest, and a tie in the middle.
pub fn sample_records() -> Vec<Record> {
    [
        (1, "Lindsey Curtis", "demoemail@gmail.com", "Agent imobiliar", "10K"),
        (2, "Kaiya George", "kaiya@gmail.com", "Client", "3.9K"),
        (3, "Zain Geidt", "zain@yahoo.com", "Client", "7K"),
        (4, "Abram Schleifer", "abram@gmail.com", "Developer", "7K"),
    ]
    .into_iter()
    .map(|(id, name, email, kind, budget)| Record {
        id: RecordId::new(id),
        name: name.to_owned(),
        email: email.to_owned(),
        kind: kind.to_owned(),
        image: None,
        budget: Some(budget.to_owned()),
        created_at: Some(format!("2026-01-0{id}T09:00:00Z")),
    })
    .collect()
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

pub fn record_types() -> &'static [&'static str] {
    &RECORD_TYPES
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).expect("valid calendar date");
    date.with_time(Time::MIDNIGHT).assume_utc()
}
