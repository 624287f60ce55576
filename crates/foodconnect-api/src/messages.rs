use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use foodconnect_db::format_timestamp;
use foodconnect_db::models::NewMessage;
use foodconnect_types::api::CreateMessageRequest;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::middleware::{Caller, authorize, claim_owner};
use crate::rows;
use crate::state::{AppState, blocking};

pub async fn list_messages(
    State(state): State<AppState>,
    Path(owner_email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let found = blocking(&state, move |s| s.db.list_messages_by_owner(&owner_email))
        .await
        .map_err(state.internal("Failed to get messages"))?;

    let messages: Vec<_> = found.into_iter().map(rows::message).collect();

    Ok(Json(json!({
        "success": true,
        "messages": messages,
    })))
}

pub async fn create_message(
    State(state): State<AppState>,
    caller: Caller,
    ValidJson(req): ValidJson<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner =
        claim_owner(&state, &caller, req.owner(), "message", "Failed to create message").await?;

    let row = blocking(&state, move |s| {
        let id = Uuid::new_v4().to_string();
        let timestamp = req.timestamp.map(format_timestamp);
        s.db.insert_message(&NewMessage {
            id: &id,
            owner_id: &owner.id,
            sender: req.sender.trim(),
            subject: req.subject.trim(),
            body: &req.body,
            timestamp: timestamp.as_deref(),
        })
    })
    .await
    .map_err(state.internal("Failed to create message"))?;

    info!("Message created: {}", row.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Message created successfully",
            "data": rows::message(row),
        })),
    ))
}

pub async fn mark_message_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let lookup_id = id.clone();
    let current = blocking(&state, move |s| s.db.get_message(&lookup_id))
        .await
        .map_err(state.internal("Failed to update message"))?
        .ok_or(ApiError::NotFound("Message"))?;

    authorize(&state.settings, &caller, &current.owner_id, "message")?;

    let row = blocking(&state, move |s| s.db.mark_message_read(&id))
        .await
        .map_err(state.internal("Failed to update message"))?
        .ok_or(ApiError::NotFound("Message"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Message marked as read",
        "data": rows::message(row),
    })))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let lookup_id = id.clone();
    let current = blocking(&state, move |s| s.db.get_message(&lookup_id))
        .await
        .map_err(state.internal("Failed to delete message"))?
        .ok_or(ApiError::NotFound("Message"))?;

    authorize(&state.settings, &caller, &current.owner_id, "message")?;

    let delete_id = id.clone();
    let removed = blocking(&state, move |s| s.db.delete_message(&delete_id))
        .await
        .map_err(state.internal("Failed to delete message"))?;
    if !removed {
        return Err(ApiError::NotFound("Message"));
    }

    info!("Message deleted: {}", id);

    Ok(Json(json!({
        "success": true,
        "message": "Message deleted successfully",
    })))
}
