use crate::error::{ContactsError, ValidationError};
use crate::model::{Contact, NewContact, StatsResponse, SubmitResponse};
use crate::Contacts;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use moringa_domain::constants::CONTACTS_TAG;
use moringa_kernel::server::{ApiFailure, ApiState, FailureBody};
use serde_json::Value;
use tracing::error;

const INVALID_FORM: &str = "Invalid form data";
const SUBMIT_FAILED: &str = "Failed to submit contact form";
const LIST_FAILED: &str = "Failed to fetch contacts";
const STATS_FAILED: &str = "Failed to fetch stats";

fn slice<'a>(state: &'a ApiState, failure: &'static str) -> Result<&'a Contacts, ApiFailure> {
    state.try_get_slice::<Contacts>().map_err(|e| {
        error!(error = %e, "Contacts slice is not registered");
        ApiFailure::internal(failure)
    })
}

#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = NewContact,
    responses(
        (status = OK, description = "Contact stored; `message` tells whether the email went out", body = SubmitResponse),
        (status = BAD_REQUEST, description = "Invalid form data", body = FailureBody),
        (status = INTERNAL_SERVER_ERROR, description = "Contact could not be stored", body = FailureBody),
    ),
    tag = CONTACTS_TAG,
)]
pub(crate) async fn submit_contact(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiFailure> {
    let contacts = slice(&state, SUBMIT_FAILED)?;

    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiFailure::with_status(StatusCode::PAYLOAD_TOO_LARGE, rejection.body_text()));
        },
        Err(rejection) => {
            let err = ValidationError::invalid_json(rejection.body_text());
            return Err(ApiFailure::bad_request(INVALID_FORM, err.into_errors()));
        },
    };

    match contacts.submit(&body).await {
        Ok(outcome) => Ok(Json(SubmitResponse {
            success: true,
            contact: outcome.contact,
            message: if outcome.notified {
                "Contact submitted successfully and email sent"
            } else {
                "Contact submitted successfully but email failed to send"
            },
        })),
        Err(ContactsError::Validation(err)) => Err(ApiFailure::bad_request(INVALID_FORM, err.into_errors())),
        Err(e) => {
            error!(error = %e, "Contact submission failed");
            Err(ApiFailure::internal(SUBMIT_FAILED))
        },
    }
}

#[utoipa::path(
    get,
    path = "/api/contacts",
    responses(
        (status = OK, description = "All contacts in submission order", body = Vec<Contact>),
        (status = INTERNAL_SERVER_ERROR, description = "Contacts could not be read", body = FailureBody),
    ),
    tag = CONTACTS_TAG,
)]
pub(crate) async fn list_contacts(State(state): State<ApiState>) -> Result<Json<Vec<Contact>>, ApiFailure> {
    let contacts = slice(&state, LIST_FAILED)?;

    contacts.list().await.map(Json).map_err(|e| {
        error!(error = %e, "Failed to list contacts");
        ApiFailure::internal(LIST_FAILED)
    })
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = OK, description = "Happy clients counter", body = StatsResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Stats could not be computed", body = FailureBody),
    ),
    tag = CONTACTS_TAG,
)]
pub(crate) async fn stats(State(state): State<ApiState>) -> Result<Json<StatsResponse>, ApiFailure> {
    let contacts = slice(&state, STATS_FAILED)?;

    contacts.happy_clients().await.map(|happy_clients| Json(StatsResponse { happy_clients })).map_err(|e| {
        error!(error = %e, "Failed to compute stats");
        ApiFailure::internal(STATS_FAILED)
    })
}
