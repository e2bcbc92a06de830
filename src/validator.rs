//! JSON body extractor that runs `validator` rules before the handler sees the DTO.
//!
//! Malformed bodies are 400: bad syntax, a missing field, a wrong type, an
//! unknown capability name or a missing content type. Rule violations are 422,
//! and the body carries a `fields` object keyed by DTO field:
//!
//! ```json
//! { "error": "credits must be between 0 and 30",
//!   "fields": { "credits": ["credits must be between 0 and 30"] } }
//! ```

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use coursehub_core::{AppError, FieldErrors};

const SERDE_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Flattens validator output into dotted field paths (`permissions.courses_edit`).
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::default();
    collect(errors, None, &mut fields);
    fields
}

fn collect(errors: &ValidationErrors, parent: Option<&str>, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let path = match parent {
            Some(parent) => format!("{}.{}", parent, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errors) => {
                for error in errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", path));
                    out.push(path.clone(), message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, Some(&format!("{}[{}]", path, index)), out);
                }
            }
        }
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request(anyhow!("Expected a JSON body (Content-Type: application/json)"))
        }
        JsonRejection::JsonSyntaxError(_) => AppError::bad_request(anyhow!("Malformed JSON body")),
        JsonRejection::JsonDataError(e) => {
            let text = e.body_text();
            let detail = text.strip_prefix(SERDE_PREFIX).unwrap_or(&text);
            match detail.split("missing field `").nth(1).and_then(|s| s.split('`').next()) {
                Some(field) => AppError::bad_request(anyhow!("{} is required", field)),
                None => AppError::bad_request(anyhow!("Invalid request body: {}", detail)),
            }
        }
        other => AppError::bad_request(anyhow!("Invalid request body: {}", other.body_text())),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        value
            .validate()
            .map_err(|errors| field_errors(&errors).into_app_error())?;

        Ok(ValidatedJson(value))
    }
}
