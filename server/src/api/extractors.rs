//! Validating extractors for API routes

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Rejection for request bodies that fail to parse or validate
#[derive(Debug)]
pub enum ValidationRejection {
    /// Body is not valid JSON for the target type
    Json(JsonRejection),
    /// Body parsed but violates a field constraint
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                "JSON_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "INVALID_SELECTION",
                format_validation_errors(&errors),
            ),
        };
        tracing::debug!(code, message = %message, "Rejected request body");
        (
            status,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// JSON body extractor with automatic validation.
///
/// Deserializes the body and validates it using the `validator` crate.
/// Returns a `ValidationRejection` on parse or validation failure.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;

    use crate::domain::FilterSelection;

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_selection() {
        let ValidatedJson(selection) =
            ValidatedJson::<FilterSelection>::from_request(json_request(r#"{"seats": 2}"#), &())
                .await
                .unwrap();
        assert!(!selection.is_unconstrained());
    }

    #[tokio::test]
    async fn test_empty_object_is_unconstrained() {
        let ValidatedJson(selection) =
            ValidatedJson::<FilterSelection>::from_request(json_request("{}"), &())
                .await
                .unwrap();
        assert!(selection.is_unconstrained());
    }

    #[tokio::test]
    async fn test_reversed_star_range_is_rejected() {
        let rejection = ValidatedJson::<FilterSelection>::from_request(
            json_request(r#"{"star_rating": [4.0, 2.0]}"#),
            &(),
        )
        .await
        .unwrap_err();

        assert!(matches!(rejection, ValidationRejection::Validation(_)));
        assert_eq!(
            rejection.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_unknown_band_is_parse_error() {
        let rejection = ValidatedJson::<FilterSelection>::from_request(
            json_request(r#"{"price": "0-100"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert!(matches!(rejection, ValidationRejection::Json(_)));
    }
}
