//! Field-level validation helpers shared by command types.

use std::fmt;

use common::RecordId;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// A single failed constraint on an input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the field, e.g. `items[0].quantity`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field error found while validating one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Wraps a single field error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if any error targets `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = Vec::new();
        flatten(&errors, "", &mut out);
        out.sort_by(|a, b| a.field.cmp(&b.field));
        Self(out)
    }
}

fn flatten(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    out.push(FieldError::new(path.clone(), message_for(err, &path)));
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten(nested, &path, out),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    flatten(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn message_for(err: &ValidationError, path: &str) -> String {
    match &err.message {
        Some(message) => message.to_string(),
        None => format!("Invalid value for {path} ({})", err.code),
    }
}

/// Accepts 24-character hexadecimal record identities.
pub fn validate_record_id(value: &str) -> Result<(), ValidationError> {
    RecordId::parse(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("record_id"))
}

/// Accepts absolute `http` or `https` URLs.
pub fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(ValidationError::new("url")),
    }
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Parses an identity that has already passed [`validate_record_id`].
pub(crate) fn parse_id(field: &str, value: &str) -> Result<RecordId, FieldErrors> {
    RecordId::parse(value).map_err(|e| FieldErrors::single(field, e.to_string()))
}
