// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::Record;

pub const BUDGET_FORMAT_MESSAGE: &str = "Budget must be a number followed by 'K' (e.g., '10K')";

static BUDGET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?K$").expect("budget pattern compiles"));

/// Editable fields of a record. Doubles as the working copy of an edit session
/// and as the JSON body of create/update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Always serialized; `null` clears the stored budget on update.
    #[serde(default)]
    pub budget: Option<String>,
}

impl From<&Record> for RecordFields {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            kind: record.kind.clone(),
            budget: record.budget.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Email,
    Type,
    Budget,
}

impl FormField {
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Type, Self::Budget];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Type => "Type",
            Self::Budget => "Budget",
        }
    }
}

impl RecordFields {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Type => &self.kind,
            FormField::Budget => self.budget.as_deref().unwrap_or(""),
        }
    }

    /// Blank budget input removes the budget instead of storing an empty string.
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Email => self.email = value,
            FormField::Type => self.kind = value,
            FormField::Budget => {
                self.budget = if value.trim().is_empty() {
                    None
                } else {
                    Some(value)
                };
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Replaces the entry for one field; `None` clears it.
    pub fn put(&mut self, field: FormField, message: Option<String>) {
        match message {
            Some(message) => {
                self.0.insert(field, message);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

pub fn is_valid_budget(value: &str) -> bool {
    BUDGET_PATTERN.is_match(value)
}

pub fn validate_field(field: FormField, fields: &RecordFields) -> Option<String> {
    match field {
        FormField::Name | FormField::Email | FormField::Type => {
            if fields.value(field).trim().is_empty() {
                Some(format!("{} is required", field.label()))
            } else {
                None
            }
        }
        FormField::Budget => match &fields.budget {
            Some(budget) if !is_valid_budget(budget) => Some(BUDGET_FORMAT_MESSAGE.to_owned()),
            _ => None,
        },
    }
}

pub fn validate(fields: &RecordFields) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for field in FormField::ALL {
        errors.put(field, validate_field(field, fields));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::{
        BUDGET_FORMAT_MESSAGE, FormField, RecordFields, is_valid_budget, validate, validate_field,
    };

    fn complete_fields() -> RecordFields {
        RecordFields {
            name: "Lindsey Curtis".to_owned(),
            email: "lindsey@example.com".to_owned(),
            kind: "Agent imobiliar".to_owned(),
            budget: Some("15K".to_owned()),
        }
    }

    #[test]
    fn complete_fields_pass() {
        assert!(validate(&complete_fields()).is_empty());
    }

    #[test]
    fn budget_accepts_integer_and_decimal_thousands() {
        assert!(is_valid_budget("10K"));
        assert!(is_valid_budget("3.9K"));
        assert!(is_valid_budget("0K"));
    }

    #[test]
    fn budget_rejects_malformed_values_with_exact_message() {
        for raw in ["10", "K10", "10k", "abc", "1.K", ".5K", " 10K", "10K "] {
            let mut fields = complete_fields();
            fields.set(FormField::Budget, raw.to_owned());
            assert_eq!(
                validate_field(FormField::Budget, &fields).as_deref(),
                Some(BUDGET_FORMAT_MESSAGE),
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn blank_budget_removes_the_field() {
        let mut fields = complete_fields();
        fields.set(FormField::Budget, "   ".to_owned());
        assert_eq!(fields.budget, None);
        assert_eq!(validate_field(FormField::Budget, &fields), None);
    }

    #[test]
    fn required_fields_report_label_in_message() {
        let fields = RecordFields {
            name: "  ".to_owned(),
            email: String::new(),
            kind: "\t".to_owned(),
            budget: None,
        };
        let errors = validate(&fields);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(FormField::Name), Some("Name is required"));
        assert_eq!(errors.get(FormField::Email), Some("Email is required"));
        assert_eq!(errors.get(FormField::Type), Some("Type is required"));
    }

    #[test]
    fn budget_error_alone_blocks_an_otherwise_valid_form() {
        let mut fields = complete_fields();
        fields.set(FormField::Budget, "10".to_owned());
        let errors = validate(&fields);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FormField::Budget), Some(BUDGET_FORMAT_MESSAGE));
    }

    #[test]
    fn body_sends_cleared_budget_as_null_and_renames_type() {
        let mut fields = complete_fields();
        fields.set(FormField::Budget, "  ".to_owned());
        let encoded = serde_json::to_string(&fields).expect("encode fields");
        assert_eq!(
            encoded,
            r#"{"name":"Lindsey Curtis","email":"lindsey@example.com","type":"Agent imobiliar","budget":null}"#
        );
    }
}
