use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::borrow::Cow;
use utoipa::ToSchema;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending field (`body` when the payload itself is unusable).
    #[schema(value_type = String)]
    pub field: Cow<'static, str>,
    /// Machine-readable reason, e.g. `required` or `invalid_email`.
    #[schema(value_type = String)]
    pub code: Cow<'static, str>,
    /// Human-readable explanation.
    #[schema(value_type = String)]
    pub message: Cow<'static, str>,
}

impl FieldError {
    pub fn new(
        field: impl Into<Cow<'static, str>>,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self { field: field.into(), code: code.into(), message: message.into() }
    }
}

/// JSON body of every failed API call: `{ "success": false, "message": ..., "errors": [...] }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FailureBody {
    pub success: bool,
    #[schema(value_type = String)]
    pub message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// A failed API call: status code plus [`FailureBody`].
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    body: FailureBody,
}

impl ApiFailure {
    /// `400 Bad Request` carrying per-field errors.
    pub fn bad_request(message: impl Into<Cow<'static, str>>, errors: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: FailureBody { success: false, message: message.into(), errors: Some(errors) },
        }
    }

    /// `500 Internal Server Error` with a caller-facing message only.
    ///
    /// Details of the underlying fault belong in the logs, not in the response.
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Any other status, without field errors.
    pub fn with_status(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self { status, body: FailureBody { success: false, message: message.into(), errors: None } }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn body(&self) -> &FailureBody {
        &self.body
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_serializes_errors() {
        let failure = ApiFailure::bad_request(
            "Invalid form data",
            vec![FieldError::new("email", "invalid_email", "Invalid email")],
        );
        assert_eq!(failure.status(), StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(failure.body()).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0]["field"], "email");
    }

    #[test]
    fn internal_omits_errors() {
        let failure = ApiFailure::internal("Failed to fetch stats");
        assert_eq!(failure.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::to_value(failure.body()).expect("serialize");
        assert_eq!(json, serde_json::json!({ "success": false, "message": "Failed to fetch stats" }));
    }
}
