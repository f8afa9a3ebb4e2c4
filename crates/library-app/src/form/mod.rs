//! Form input extraction and the validation pipeline.

pub mod rules;
pub mod sanitize;

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use garde::Validate;
use http::header;
use tracing::debug;

use crate::error::ApiError;
pub use rules::{Checked, FieldError, FieldSpec, Rule, Schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Many(Vec<String>),
}

/// Raw submitted fields, as the user entered them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    fields: BTreeMap<String, FieldValue>,
}

impl FormInput {
    /// Adds a value, a repeated name turns the field into a sequence
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let updated = match self.fields.remove(&name) {
            Some(FieldValue::Single(first)) => FieldValue::Many(vec![first, value]),
            Some(FieldValue::Many(mut values)) => {
                values.push(value);
                FieldValue::Many(values)
            }
            None => FieldValue::Single(value),
        };
        self.fields.insert(name, updated);
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Scalar view of the field, first element of a sequence
    pub fn first(&self, name: &str) -> Option<&str> {
        match self.fields.get(name)? {
            FieldValue::Single(value) => Some(value),
            FieldValue::Many(values) => values.first().map(|s| s.as_str()),
        }
    }

    pub fn value(&self, name: &str) -> &str {
        self.first(name).unwrap_or_default()
    }

    /// Sequence view of the field: absent is empty, a scalar has one element
    pub fn all(&self, name: &str) -> Vec<&str> {
        match self.fields.get(name) {
            None => Vec::new(),
            Some(FieldValue::Single(value)) => vec![value.as_str()],
            Some(FieldValue::Many(values)) => values.iter().map(|s| s.as_str()).collect(),
        }
    }

    pub fn contains_value(&self, name: &str, value: &str) -> bool {
        self.all(name).contains(&value)
    }

    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut input = FormInput::default();
        for (name, value) in url::form_urlencoded::parse(body) {
            input.append(name.into_owned(), value.into_owned());
        }
        input
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, ApiError> {
        use serde_json::Value;

        fn scalar(name: &str, value: Value) -> Result<Option<String>, ApiError> {
            match value {
                Value::Null => Ok(None),
                Value::String(s) => Ok(Some(s)),
                Value::Number(n) => Ok(Some(n.to_string())),
                Value::Bool(b) => Ok(Some(b.to_string())),
                _ => Err(ApiError::InvalidRequest(format!(
                    "Unsupported value for field {name}"
                ))),
            }
        }

        let Value::Object(map) = value else {
            return Err(ApiError::InvalidRequest(
                "Form data must be JSON object".into(),
            ));
        };
        let mut input = FormInput::default();
        for (name, value) in map {
            match value {
                Value::Array(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        if let Some(v) = scalar(&name, item)? {
                            values.push(v);
                        }
                    }
                    input.set(name, FieldValue::Many(values));
                }
                value => {
                    if let Some(v) = scalar(&name, value)? {
                        input.set(name, FieldValue::Single(v));
                    }
                }
            }
        }
        Ok(input)
    }
}

impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mime = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let is_json = match mime.as_str() {
            "application/x-www-form-urlencoded" => false,
            "application/json" => true,
            "" => {
                return Err(ApiError::UnsupportedMediaType(
                    "Missing content-type header".into(),
                ))
            }
            other => return Err(ApiError::UnsupportedMediaType(other.to_string())),
        };

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

        if is_json {
            let value: serde_json::Value = serde_json::from_slice(&body)
                .map_err(|e| ApiError::InvalidRequest(format!("Invalid JSON body: {e}")))?;
            FormInput::from_json(value)
        } else {
            Ok(FormInput::from_urlencoded(&body))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{count} invalid field(s)", count = .errors.len())]
pub struct ValidationFailed {
    pub errors: Vec<FieldError>,
}

impl ValidationFailed {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationFailed {
            errors: vec![FieldError::new(field, message)],
        }
    }
}

/// Candidate record that can be built from a submitted form
pub trait FormModel: Sized {
    fn schema() -> &'static Schema;

    /// Called only when every field passed its rules
    fn build(checked: &Checked) -> Self;

    /// Form field reported for a constraint violation of the candidate
    fn form_field(path: &str) -> String {
        path.to_string()
    }
}

pub fn validate<T>(input: &FormInput) -> Result<T, ValidationFailed>
where
    T: FormModel + Validate<Context = ()>,
{
    let checked = T::schema().run(input);
    if !checked.is_valid() {
        let errors = checked.into_errors();
        debug!(?errors, "Form rules failed");
        return Err(ValidationFailed { errors });
    }

    let candidate = T::build(&checked);
    if let Err(report) = candidate.validate() {
        let errors: Vec<_> = report
            .iter()
            .map(|(path, error)| FieldError::new(T::form_field(&path.to_string()), error.message()))
            .collect();
        debug!(?errors, "Candidate constraints failed");
        return Err(ValidationFailed { errors });
    }
    Ok(candidate)
}
