//! `ValidatedJson`: JSON body extraction plus `validator` rules.
//!
//! Malformed bodies are rejected with 400, rule violations with 422.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use fridgewise_core::AppError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

fn collect_messages(errors: &ValidationErrors, path: &str, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let field = if path.is_empty() {
            field.to_string()
        } else {
            format!("{path}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                messages.extend(field_errors.iter().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, &field, messages),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(nested, &format!("{field}[{index}]"), messages);
                }
            }
        }
    }
}

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, "", &mut messages);
    messages.sort();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join(", ")
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let error_msg = rejection.body_text();

    if let Some(field) = error_msg
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return AppError::bad_request(anyhow!("{} is required", field));
    }

    if error_msg.contains("invalid type") || error_msg.contains("unknown variant") {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    AppError::bad_request(anyhow!("Invalid request body"))
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
            .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use fridgewise_models::{RateRecipeDto, SuggestRecipesDto};

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_rule_violation_is_unprocessable() {
        let err = ValidatedJson::<RateRecipeDto>::from_request(json_request(r#"{"rating": 9}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error.to_string(), "Rating must be between 1 and 5");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let err = ValidatedJson::<RateRecipeDto>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "rating is required");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"rating": 3}"#))
            .unwrap();
        let err = ValidatedJson::<RateRecipeDto>::from_request(request, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_nested_filter_errors_are_reported() {
        let body = r#"{"ingredients": ["00000000-0000-0000-0000-000000000001"], "maxPrepTime": 9999}"#;
        let err = ValidatedJson::<SuggestRecipesDto>::from_request(json_request(body), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.error.to_string().contains("max_prep_time"));
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(dto) =
            ValidatedJson::<RateRecipeDto>::from_request(json_request(r#"{"rating": 4}"#), &())
                .await
                .unwrap();
        assert_eq!(dto.rating, 4);
    }
}
