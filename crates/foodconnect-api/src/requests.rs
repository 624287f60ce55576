use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use foodconnect_db::StatusUpdate;
use foodconnect_db::models::NewRequest;
use foodconnect_types::api::{CreateFoodRequest, UpdateStatusRequest};
use foodconnect_types::models::RequestStatus;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::middleware::{Caller, authorize, check_transition, claim_owner};
use crate::rows;
use crate::state::{AppState, blocking};

/// Kilometres assumed when the recipient does not say how far they are.
const DEFAULT_DISTANCE: f64 = 5.0;

pub async fn list_requests(
    State(state): State<AppState>,
    Path(owner_email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let found = blocking(&state, move |s| s.db.list_requests_by_owner(&owner_email))
        .await
        .map_err(state.internal("Failed to get requests"))?;

    let requests: Vec<_> = found.into_iter().map(rows::request).collect();

    Ok(Json(json!({
        "success": true,
        "requests": requests,
    })))
}

pub async fn create_request(
    State(state): State<AppState>,
    caller: Caller,
    ValidJson(req): ValidJson<CreateFoodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner =
        claim_owner(&state, &caller, req.owner(), "request", "Failed to create request").await?;

    let row = blocking(&state, move |s| {
        let id = Uuid::new_v4().to_string();
        s.db.insert_request(&NewRequest {
            id: &id,
            owner_id: &owner.id,
            organization: req.organization.trim(),
            contact_email: req.email.trim(),
            phone: req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()),
            address: req.address.trim(),
            food_type: req.food_type.trim(),
            quantity: req.quantity.trim(),
            urgency: req.urgency.as_str(),
            beneficiaries: req.beneficiaries,
            description: req.description.as_deref(),
            pickup_preference: req.pickup_preference.as_str(),
            storage_capacity: req.storage_capacity,
            distance: req.distance.unwrap_or(DEFAULT_DISTANCE),
            date_requested: req.date_requested.as_deref(),
        })
    })
    .await
    .map_err(state.internal("Failed to create request"))?;

    info!("Request created: {} ({})", row.id, row.urgency);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Request created successfully",
            "request": rows::request(row),
        })),
    ))
}

pub async fn update_request_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
    ValidJson(req): ValidJson<UpdateStatusRequest<RequestStatus>>,
) -> Result<impl IntoResponse, ApiError> {
    let lookup_id = id.clone();
    let current = blocking(&state, move |s| s.db.get_request(&lookup_id))
        .await
        .map_err(state.internal("Failed to update request"))?
        .ok_or(ApiError::NotFound("Request"))?;

    authorize(&state.settings, &caller, &current.owner_id, "request")?;
    let from = rows::request(current).status;
    check_transition(&state.settings, from, req.status)?;

    // Strict mode only writes if nobody moved the status since it was checked
    let strict = state.settings.strict_transitions;
    let update = blocking(&state, move |s| {
        if strict {
            s.db.update_request_status_from(&id, from.as_str(), req.status.as_str())
        } else {
            Ok(s.db
                .update_request_status(&id, req.status.as_str())?
                .map_or(StatusUpdate::Missing, StatusUpdate::Updated))
        }
    })
    .await
    .map_err(state.internal("Failed to update request"))?;

    let row = match update {
        StatusUpdate::Updated(row) => row,
        StatusUpdate::Missing => return Err(ApiError::NotFound("Request")),
        StatusUpdate::Stale(row) => {
            return Err(ApiError::IllegalTransition {
                from: row.status,
                to: req.status.to_string(),
            });
        }
    };

    info!("Request status updated: {} {}", row.id, req.status);

    Ok(Json(json!({
        "success": true,
        "message": "Request status updated",
        "request": rows::request(row),
    })))
}

pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let lookup_id = id.clone();
    let current = blocking(&state, move |s| s.db.get_request(&lookup_id))
        .await
        .map_err(state.internal("Failed to delete request"))?
        .ok_or(ApiError::NotFound("Request"))?;

    authorize(&state.settings, &caller, &current.owner_id, "request")?;

    let delete_id = id.clone();
    let removed = blocking(&state, move |s| s.db.delete_request(&delete_id))
        .await
        .map_err(state.internal("Failed to delete request"))?;
    if !removed {
        return Err(ApiError::NotFound("Request"));
    }

    info!("Request deleted: {}", id);

    Ok(Json(json!({
        "success": true,
        "message": "Request deleted successfully",
    })))
}
