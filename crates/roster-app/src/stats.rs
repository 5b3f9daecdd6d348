// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Highest,
    Lowest,
    HighestAndLowest,
    Average,
    Unrated,
}

impl Highlight {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Highest => "Highest",
            Self::Lowest => "Lowest",
            Self::HighestAndLowest => "Highest / Lowest",
            Self::Average => "Average",
            Self::Unrated => "",
        }
    }

    pub const fn is_highest(self) -> bool {
        matches!(self, Self::Highest | Self::HighestAndLowest)
    }

    pub const fn is_lowest(self) -> bool {
        matches!(self, Self::Lowest | Self::HighestAndLowest)
    }
}

/// Numeric part of a `"<number>K"` budget, in thousands.
pub fn budget_value(raw: &str) -> Option<f64> {
    let number = raw.trim().strip_suffix('K')?;
    let value = number.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

pub fn record_budget(record: &Record) -> Option<f64> {
    record.budget.as_deref().and_then(budget_value)
}

/// Classifies each row against the extremes of this slice only. Ties go to the
/// first row encountered for each role.
pub fn classify<T>(rows: &[T], value_of: impl Fn(&T) -> Option<f64>) -> Vec<Highlight> {
    let values: Vec<Option<f64>> = rows.iter().map(value_of).collect();

    let mut highest: Option<(usize, f64)> = None;
    let mut lowest: Option<(usize, f64)> = None;
    for (index, value) in values.iter().enumerate() {
        let Some(value) = *value else {
            continue;
        };
        if highest.is_none_or(|(_, best)| value > best) {
            highest = Some((index, value));
        }
        if lowest.is_none_or(|(_, best)| value < best) {
            lowest = Some((index, value));
        }
    }

    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            if value.is_none() {
                return Highlight::Unrated;
            }
            let is_highest = highest.is_some_and(|(at, _)| at == index);
            let is_lowest = lowest.is_some_and(|(at, _)| at == index);
            match (is_highest, is_lowest) {
                (true, true) => Highlight::HighestAndLowest,
                (true, false) => Highlight::Highest,
                (false, true) => Highlight::Lowest,
                (false, false) => Highlight::Average,
            }
        })
        .collect()
}

pub fn classify_budgets(rows: &[Record]) -> Vec<Highlight> {
    classify(rows, record_budget)
}

#[cfg(test)]
mod tests {
    use super::{Highlight, budget_value, classify};

    fn classify_values(values: &[Option<f64>]) -> Vec<Highlight> {
        classify(values, |value| *value)
    }

    #[test]
    fn extremes_are_flagged_within_the_page() {
        let highlights = classify_values(&[Some(10.0), Some(3.9), Some(7.0), Some(7.0)]);
        assert_eq!(highlights[0], Highlight::Highest);
        assert_eq!(highlights[1], Highlight::Lowest);
        assert_eq!(highlights[2], Highlight::Average);
        assert_eq!(highlights[3], Highlight::Average);
    }

    #[test]
    fn ties_go_to_first_encountered_row() {
        let highlights = classify_values(&[Some(2.0), Some(9.0), Some(9.0), Some(2.0)]);
        assert_eq!(
            highlights,
            vec![
                Highlight::Lowest,
                Highlight::Highest,
                Highlight::Average,
                Highlight::Average,
            ]
        );
    }

    #[test]
    fn single_row_is_both_extremes() {
        assert_eq!(
            classify_values(&[Some(5.0)]),
            vec![Highlight::HighestAndLowest]
        );
    }

    #[test]
    fn equal_values_mark_the_first_row_as_both() {
        assert_eq!(
            classify_values(&[Some(4.0), Some(4.0)]),
            vec![Highlight::HighestAndLowest, Highlight::Average]
        );
    }

    #[test]
    fn empty_page_has_no_annotations() {
        assert!(classify_values(&[]).is_empty());
    }

    #[test]
    fn rows_without_values_are_unrated_and_skipped() {
        let highlights = classify_values(&[None, Some(1.0), None, Some(3.0)]);
        assert_eq!(
            highlights,
            vec![
                Highlight::Unrated,
                Highlight::Lowest,
                Highlight::Unrated,
                Highlight::Highest,
            ]
        );
    }

    #[test]
    fn budget_value_strips_the_thousands_suffix() {
        assert_eq!(budget_value("3.9K"), Some(3.9));
        assert_eq!(budget_value("10K"), Some(10.0));
        assert_eq!(budget_value("10"), None);
        assert_eq!(budget_value("xK"), None);
    }
}
