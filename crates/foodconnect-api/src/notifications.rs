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
use foodconnect_db::models::NewNotification;
use foodconnect_types::api::CreateNotificationRequest;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::middleware::{Caller, authorize, claim_owner};
use crate::rows;
use crate::state::{AppState, blocking};

pub async fn list_notifications(
    State(state): State<AppState>,
    Path(owner_email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let found = blocking(&state, move |s| s.db.list_notifications_by_owner(&owner_email))
        .await
        .map_err(state.internal("Failed to get notifications"))?;

    let notifications: Vec<_> = found.into_iter().map(rows::notification).collect();

    Ok(Json(json!({
        "success": true,
        "notifications": notifications,
    })))
}

pub async fn create_notification(
    State(state): State<AppState>,
    caller: Caller,
    ValidJson(req): ValidJson<CreateNotificationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = claim_owner(
        &state,
        &caller,
        req.owner(),
        "notification",
        "Failed to create notification",
    )
    .await?;

    let row = blocking(&state, move |s| {
        let id = Uuid::new_v4().to_string();
        let timestamp = req.timestamp.map(format_timestamp);
        s.db.insert_notification(&NewNotification {
            id: &id,
            owner_id: &owner.id,
            message: req.message.trim(),
            kind: req.kind.as_str(),
            timestamp: timestamp.as_deref(),
        })
    })
    .await
    .map_err(state.internal("Failed to create notification"))?;

    info!("Notification created: {} ({})", row.id, row.kind);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Notification created successfully",
            "data": rows::notification(row),
        })),
    ))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let lookup_id = id.clone();
    let current = blocking(&state, move |s| s.db.get_notification(&lookup_id))
        .await
        .map_err(state.internal("Failed to update notification"))?
        .ok_or(ApiError::NotFound("Notification"))?;

    authorize(&state.settings, &caller, &current.owner_id, "notification")?;

    let row = blocking(&state, move |s| s.db.mark_notification_read(&id))
        .await
        .map_err(state.internal("Failed to update notification"))?
        .ok_or(ApiError::NotFound("Notification"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Notification marked as read",
        "data": rows::notification(row),
    })))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let lookup_id = id.clone();
    let current = blocking(&state, move |s| s.db.get_notification(&lookup_id))
        .await
        .map_err(state.internal("Failed to delete notification"))?
        .ok_or(ApiError::NotFound("Notification"))?;

    authorize(&state.settings, &caller, &current.owner_id, "notification")?;

    let delete_id = id.clone();
    let removed = blocking(&state, move |s| s.db.delete_notification(&delete_id))
        .await
        .map_err(state.internal("Failed to delete notification"))?;
    if !removed {
        return Err(ApiError::NotFound("Notification"));
    }

    info!("Notification deleted: {}", id);

    Ok(Json(json!({
        "success": true,
        "message": "Notification deleted successfully",
    })))
}

/// Bulk delete for one owner. An unknown email clears nothing.
pub async fn clear_notifications(
    State(state): State<AppState>,
    Path(owner_email): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    if state.settings.enforce_ownership {
        let lookup = owner_email.clone();
        let owner = blocking(&state, move |s| s.db.get_user_by_email(&lookup))
            .await
            .map_err(state.internal("Failed to clear notifications"))?;
        if let Some(owner) = owner {
            authorize(&state.settings, &caller, &owner.id, "notification")?;
        }
    }

    let email = owner_email.clone();
    let cleared = blocking(&state, move |s| s.db.clear_notifications_for_owner(&email))
        .await
        .map_err(state.internal("Failed to clear notifications"))?;

    info!("Notifications cleared for {}: {}", owner_email, cleared);

    Ok(Json(json!({
        "success": true,
        "message": "All notifications cleared",
        "cleared": cleared,
    })))
}
