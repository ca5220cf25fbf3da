use super::{non_blank, valid_email};
use crate::folio::storage::{insert_contact_message, list_contact_messages, NewContactMessage};
use crate::models::ContactMessage;
use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_SUBJECT: &str = "Contact Form Submission";

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct ContactRequest {
    name: Option<String>,
    email: Option<String>,
    subject: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Only return unread messages when `true`
    unread: Option<String>,
}

/// Why a contact submission was refused.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ContactError {
    MissingFields,
    InvalidEmail,
}

impl ContactError {
    fn message(&self) -> &'static str {
        match self {
            Self::MissingFields => "Name, email, and message are required",
            Self::InvalidEmail => "Invalid email format",
        }
    }
}

pub(crate) fn validate(request: ContactRequest) -> Result<NewContactMessage, ContactError> {
    let (Some(name), Some(email), Some(message)) = (
        non_blank(request.name),
        non_blank(request.email),
        non_blank(request.message),
    ) else {
        return Err(ContactError::MissingFields);
    };

    if !valid_email(&email) {
        return Err(ContactError::InvalidEmail);
    }

    Ok(NewContactMessage {
        name,
        email,
        subject: non_blank(request.subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        message,
    })
}

#[utoipa::path(
    post,
    path= "/api/contact",
    request_body = ContactRequest,
    responses (
        (status = 201, description = "Message stored"),
        (status = 400, description = "Missing fields or invalid email"),
        (status = 500, description = "Message could not be stored"),
    ),
    tag= "contact"
)]
#[instrument(skip(pool, payload))]
pub async fn create_message(
    pool: Extension<PgPool>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("rejected contact payload: {rejection}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid request body" })),
            );
        }
    };

    let message = match validate(request) {
        Ok(message) => message,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.message() })),
            );
        }
    };

    match insert_contact_message(&pool, &message).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Message sent successfully", "id": id })),
        ),
        Err(err) => {
            error!("Database error: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to save message" })),
            )
        }
    }
}

#[utoipa::path(
    get,
    path= "/api/contact",
    params(ListQuery),
    responses (
        (status = 200, description = "Messages, newest first", body = [ContactMessage]),
        (status = 500, description = "Messages could not be fetched"),
    ),
    tag= "contact"
)]
#[instrument(skip(pool))]
pub async fn list_messages(
    pool: Extension<PgPool>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let unread_only = query.unread.as_deref() == Some("true");

    match list_contact_messages(&pool, unread_only).await {
        Ok(messages) => {
            let total = messages.len();
            (
                StatusCode::OK,
                Json(json!({ "messages": messages, "total": total })),
            )
        }
        Err(err) => {
            error!("Database error: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch messages" })),
            )
        }
    }
}
