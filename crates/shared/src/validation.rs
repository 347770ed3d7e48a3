use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

static UK_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:07|\+?447)\d{9}$").expect("valid uk mobile pattern"));
static NON_UK_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d{4,15}$").expect("valid non-uk mobile pattern"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid email pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    Enter { label: String },
    Select { label: String },
    TooLong { label: String, length: usize },
    WrongLength { label: String, length: usize },
    Email { label: String },
    Mobile { label: String },
    DateMissing {
        label: String,
        missing_day: bool,
        missing_month: bool,
        missing_year: bool,
    },
    DateMustBeReal { label: String },
    DateMustBePast { label: String },
    Custom { label: String },
}

impl FieldError {
    pub fn custom(label: impl Into<String>) -> Self {
        Self::Custom {
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorEntry {
    pub name: String,
    pub error: FieldError,
}

/// Ordered, field-keyed validation failures. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationList(Vec<FieldErrorEntry>);

#[derive(Debug, Clone, Copy)]
pub enum Check<'a> {
    Empty,
    StringTooLong(usize),
    StringLength(usize),
    Select(&'a [&'a str]),
    Email,
    Mobile,
    NonUkMobile,
}

#[derive(Debug, Clone, Copy)]
pub enum DateCheck {
    Missing,
    MustBeReal,
    MustBePast(NaiveDate),
}

impl ValidationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldErrorEntry> {
        self.0.iter()
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|entry| entry.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldError> {
        self.0
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.error)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Records an error unless the field already failed an earlier check.
    pub fn add(&mut self, name: &str, error: FieldError) {
        if self.has(name) {
            return;
        }
        self.0.push(FieldErrorEntry {
            name: name.to_string(),
            error,
        });
    }

    pub fn string(&mut self, name: &str, label: &str, value: &str, checks: &[Check<'_>]) {
        for check in checks {
            if let Some(error) = check_string(label, value, *check) {
                self.add(name, error);
                return;
            }
        }
    }

    pub fn date(&mut self, name: &str, label: &str, value: &DateInput, checks: &[DateCheck]) {
        for check in checks {
            if let Some(error) = check_date(label, value, *check) {
                self.add(name, error);
                return;
            }
        }
    }

    pub fn append(&mut self, other: ValidationList) {
        for entry in other.0 {
            self.add(&entry.name, entry.error);
        }
    }
}

fn check_string(label: &str, value: &str, check: Check<'_>) -> Option<FieldError> {
    let label = label.to_string();
    match check {
        Check::Empty if value.trim().is_empty() => Some(FieldError::Enter { label }),
        Check::StringTooLong(length) if value.chars().count() > length => {
            Some(FieldError::TooLong { label, length })
        }
        Check::StringLength(length) if value.chars().count() != length => {
            Some(FieldError::WrongLength { label, length })
        }
        Check::Select(options) if !options.contains(&value) => Some(FieldError::Select { label }),
        Check::Email if !value.is_empty() && !EMAIL.is_match(value) => {
            Some(FieldError::Email { label })
        }
        Check::Mobile if !value.is_empty() && !UK_MOBILE.is_match(&strip_spaces(value)) => {
            Some(FieldError::Mobile { label })
        }
        Check::NonUkMobile
            if !value.is_empty() && !NON_UK_MOBILE.is_match(&strip_spaces(value)) =>
        {
            Some(FieldError::Mobile { label })
        }
        _ => None,
    }
}

fn check_date(label: &str, value: &DateInput, check: DateCheck) -> Option<FieldError> {
    let label = label.to_string();
    match check {
        DateCheck::Missing => {
            let missing_day = value.day.trim().is_empty();
            let missing_month = value.month.trim().is_empty();
            let missing_year = value.year.trim().is_empty();
            match (missing_day, missing_month, missing_year) {
                (true, true, true) => Some(FieldError::Enter { label }),
                (false, false, false) => None,
                _ => Some(FieldError::DateMissing {
                    label,
                    missing_day,
                    missing_month,
                    missing_year,
                }),
            }
        }
        DateCheck::MustBeReal if value.date().is_none() => {
            Some(FieldError::DateMustBeReal { label })
        }
        DateCheck::MustBePast(today) => match value.date() {
            Some(date) if date >= today => Some(FieldError::DateMustBePast { label }),
            _ => None,
        },
        _ => None,
    }
}

pub fn strip_spaces(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Day, month and year exactly as typed, kept so a partially filled date can
/// be echoed back to the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInput {
    pub day: String,
    pub month: String,
    pub year: String,
}

impl DateInput {
    pub fn new(day: &str, month: &str, year: &str) -> Self {
        Self {
            day: day.trim().to_string(),
            month: month.trim().to_string(),
            year: year.trim().to_string(),
        }
    }

    pub fn from_date(date: Option<NaiveDate>) -> Self {
        match date {
            Some(date) => Self {
                day: date.day().to_string(),
                month: date.month().to_string(),
                year: date.year().to_string(),
            },
            None => Self::default(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        let day = self.day.parse::<u32>().ok()?;
        let month = self.month.parse::<u32>().ok()?;
        if self.year.len() != 4 {
            return None;
        }
        let year = self.year.parse::<i32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Birthdays that fall on 29 February move to 28 February in non-leap years.
pub fn years_before(today: NaiveDate, years: i32) -> NaiveDate {
    let year = today.year() - years;
    NaiveDate::from_ymd_opt(year, today.month(), today.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, today.month(), today.day() - 1))
        .unwrap_or(today)
}

pub fn is_under_18(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    date_of_birth < today && date_of_birth > years_before(today, 18)
}

pub fn is_over_100(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    date_of_birth < years_before(today, 100)
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
