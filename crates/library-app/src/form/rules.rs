//! Declarative per-field rules.
//!
//! A [Schema] lists the fields of one form. Running it checks every field in
//! order, collects the failures and sanitizes the values that passed.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use super::{
    sanitize::{escape_html, parse_iso_date},
    FormInput,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    MinChars(usize),
    MaxChars(usize),
    /// ASCII letters and digits only
    Alphanumeric,
    IsoDate,
    /// Positive integer id of another record
    Reference,
    OneOf(&'static [&'static str]),
}

impl Rule {
    pub fn check(&self, value: &str) -> bool {
        match self {
            Rule::MinChars(min) => value.chars().count() >= *min,
            Rule::MaxChars(max) => value.chars().count() <= *max,
            Rule::Alphanumeric => {
                !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
            }
            Rule::IsoDate => parse_iso_date(value).is_some(),
            Rule::Reference => value.parse::<i64>().map(|id| id > 0).unwrap_or(false),
            Rule::OneOf(values) => values.contains(&value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    /// Free text, stored HTML escaped
    Escape,
    Keep,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: &'static str,
    trim: bool,
    optional: bool,
    cardinality: Cardinality,
    sanitizer: Sanitizer,
    rules: Vec<(Rule, &'static str)>,
}

impl FieldSpec {
    pub fn one(name: &'static str) -> Self {
        FieldSpec {
            name,
            trim: false,
            optional: false,
            cardinality: Cardinality::One,
            sanitizer: Sanitizer::Escape,
            rules: Vec::new(),
        }
    }

    /// Field that is always handled as a sequence of values
    pub fn many(name: &'static str) -> Self {
        FieldSpec {
            cardinality: Cardinality::Many,
            ..FieldSpec::one(name)
        }
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn keep(mut self) -> Self {
        self.sanitizer = Sanitizer::Keep;
        self
    }

    pub fn rule(mut self, rule: Rule, message: &'static str) -> Self {
        self.rules.push((rule, message));
        self
    }

    fn prepare<'a>(&self, value: &'a str) -> &'a str {
        if self.trim {
            value.trim()
        } else {
            value
        }
    }

    /// First failing rule for the value, if any
    fn failure(&self, value: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|(rule, _)| !rule.check(value))
            .map(|(_, message)| *message)
    }

    fn sanitize(&self, value: &str) -> String {
        match self.sanitizer {
            Sanitizer::Escape => escape_html(value),
            Sanitizer::Keep => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Schema { fields }
    }

    pub fn run(&self, input: &FormInput) -> Checked {
        let mut checked = Checked::default();
        for field in &self.fields {
            let raw: Vec<&str> = match field.cardinality {
                Cardinality::One => input.first(field.name).into_iter().collect(),
                Cardinality::Many => input.all(field.name),
            };
            let mut values = Vec::with_capacity(raw.len());
            match field.cardinality {
                Cardinality::One => {
                    let value = field.prepare(raw.first().copied().unwrap_or(""));
                    if value.is_empty() && field.optional {
                        checked.values.insert(field.name, values);
                        continue;
                    }
                    match field.failure(value) {
                        Some(message) => checked.errors.push(FieldError::new(field.name, message)),
                        None => values.push(field.sanitize(value)),
                    }
                }
                Cardinality::Many => {
                    for value in raw {
                        let value = field.prepare(value);
                        match field.failure(value) {
                            Some(message) => {
                                checked.errors.push(FieldError::new(field.name, message))
                            }
                            None => values.push(field.sanitize(value)),
                        }
                    }
                }
            }
            checked.values.insert(field.name, values);
        }
        checked
    }
}

/// Outcome of a schema run: sanitized values of the fields that passed and
/// errors of those that did not
#[derive(Debug, Clone, Default)]
pub struct Checked {
    values: BTreeMap<&'static str, Vec<String>>,
    errors: Vec<FieldError>,
}

impl Checked {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(|s| s.as_str())
    }

    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    pub fn list(&self, name: &str) -> &[String] {
        self.values
            .get(name)
            .map(|values| values.as_slice())
            .unwrap_or_default()
    }

    pub fn date(&self, name: &str) -> Option<Date> {
        self.text(name).and_then(parse_iso_date)
    }

    pub fn id(&self, name: &str) -> Option<i64> {
        self.text(name).and_then(|s| s.parse().ok())
    }

    pub fn ids(&self, name: &str) -> Vec<i64> {
        self.list(name)
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}
