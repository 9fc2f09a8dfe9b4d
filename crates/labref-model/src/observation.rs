//! Observations handed over by the upstream extraction stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::Sex;
use crate::text::non_blank;

/// A reported value: a number, or free text such as "Negative".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservedValue {
    Numeric(f64),
    Text(String),
}

impl ObservedValue {
    /// Parses a raw cell, preferring a number when the text is one.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Numeric(value),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Finite numeric reading of the value, if it has one.
    ///
    /// Text holding a plain number (e.g., "11.2") counts as numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Numeric(value) => Some(*value).filter(|value| value.is_finite()),
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
        }
    }
}

impl fmt::Display for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for ObservedValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for ObservedValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Subject attributes used to pick an applicable reference range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub sex: Option<Sex>,
    /// Age in years.
    pub age: Option<f64>,
    pub condition: Option<String>,
}

impl Subject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Condition, if present and not blank.
    pub fn condition(&self) -> Option<&str> {
        non_blank(self.condition.as_deref())
    }

    /// Fills attributes missing here from `defaults`. A blank condition
    /// counts as missing.
    pub fn or(self, defaults: &Subject) -> Subject {
        let condition = match self.condition() {
            Some(_) => self.condition,
            None => defaults.condition().map(str::to_string),
        };
        Subject {
            sex: self.sex.or(defaults.sex),
            age: self.age.or(defaults.age),
            condition,
        }
    }
}

/// One candidate test observation from a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub raw_test_name: String,
    pub value: ObservedValue,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub subject_sex: Option<Sex>,
    #[serde(default)]
    pub subject_age: Option<f64>,
    #[serde(default)]
    pub subject_condition: Option<String>,
}

impl Observation {
    pub fn new(
        raw_test_name: impl Into<String>,
        value: impl Into<ObservedValue>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            raw_test_name: raw_test_name.into(),
            value: value.into(),
            unit: unit.into(),
            subject_sex: None,
            subject_age: None,
            subject_condition: None,
        }
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject_sex = subject.sex;
        self.subject_age = subject.age;
        self.subject_condition = subject.condition;
        self
    }

    pub fn subject(&self) -> Subject {
        Subject {
            sex: self.subject_sex,
            age: self.subject_age,
            condition: self.subject_condition.clone(),
        }
    }
}
