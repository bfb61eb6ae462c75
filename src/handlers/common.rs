use axum::{http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::{Validate, ValidationErrors};

use crate::ApiResponse;

/// `?date=YYYY-MM-DD` selecting the day a page shows
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Day to show; omitted means the page's default day
    pub date: Option<NaiveDate>,
}

/// Flattens validator output into `field: message` lines.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let detail = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", error.code));
                format!("{}: {}", field, detail)
            })
        })
        .collect();
    messages.sort();
    messages
}

/// Runs `Validate` and shapes any failure as a 400 envelope.
pub fn validate_request<T, R>(input: &T) -> Result<(), (StatusCode, Json<ApiResponse<R>>)>
where
    T: Validate,
{
    input.validate().map_err(|errors| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::validation_errors(validation_messages(&errors))),
        )
    })
}
