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
use foodconnect_db::models::NewDonation;
use foodconnect_types::api::{CreateDonationRequest, UpdateStatusRequest};
use foodconnect_types::models::DonationStatus;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::middleware::{Caller, authorize, check_transition, claim_owner};
use crate::rows;
use crate::state::{AppState, blocking};

const DEFAULT_UNIT: &str = "kg";

pub async fn list_donations(
    State(state): State<AppState>,
    Path(owner_email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let found = blocking(&state, move |s| s.db.list_donations_by_owner(&owner_email))
        .await
        .map_err(state.internal("Failed to get donations"))?;

    let donations: Vec<_> = found.into_iter().map(rows::donation).collect();

    Ok(Json(json!({
        "success": true,
        "donations": donations,
    })))
}

pub async fn create_donation(
    State(state): State<AppState>,
    caller: Caller,
    ValidJson(req): ValidJson<CreateDonationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner =
        claim_owner(&state, &caller, req.owner(), "donation", "Failed to create donation").await?;

    let row = blocking(&state, move |s| {
        let id = Uuid::new_v4().to_string();
        s.db.insert_donation(&NewDonation {
            id: &id,
            owner_id: &owner.id,
            food_type: req.food_type.trim(),
            quantity: req.quantity.trim(),
            unit: req
                .unit
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .unwrap_or(DEFAULT_UNIT),
            expiry_date: req.expiry_date.as_deref(),
            location: req.location.trim(),
            description: req.description.as_deref(),
        })
    })
    .await
    .map_err(state.internal("Failed to create donation"))?;

    info!("Donation created: {}", row.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Donation created successfully",
            "donation": rows::donation(row),
        })),
    ))
}

pub async fn update_donation_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
    ValidJson(req): ValidJson<UpdateStatusRequest<DonationStatus>>,
) -> Result<impl IntoResponse, ApiError> {
    let lookup_id = id.clone();
    let current = blocking(&state, move |s| s.db.get_donation(&lookup_id))
        .await
        .map_err(state.internal("Failed to update donation"))?
        .ok_or(ApiError::NotFound("Donation"))?;

    authorize(&state.settings, &caller, &current.owner_id, "donation")?;
    let from = rows::donation(current).status;
    check_transition(&state.settings, from, req.status)?;

    // Strict mode only writes if nobody moved the status since it was checked
    let strict = state.settings.strict_transitions;
    let update = blocking(&state, move |s| {
        if strict {
            s.db.update_donation_status_from(&id, from.as_str(), req.status.as_str())
        } else {
            Ok(s.db
                .update_donation_status(&id, req.status.as_str())?
                .map_or(StatusUpdate::Missing, StatusUpdate::Updated))
        }
    })
    .await
    .map_err(state.internal("Failed to update donation"))?;

    let row = match update {
        StatusUpdate::Updated(row) => row,
        StatusUpdate::Missing => return Err(ApiError::NotFound("Donation")),
        StatusUpdate::Stale(row) => {
            return Err(ApiError::IllegalTransition {
                from: row.status,
                to: req.status.to_string(),
            });
        }
    };

    info!("Donation status updated: {} {}", row.id, req.status);

    Ok(Json(json!({
        "success": true,
        "message": "Donation status updated",
        "donation": rows::donation(row),
    })))
}

pub async fn delete_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let lookup_id = id.clone();
    let current = blocking(&state, move |s| s.db.get_donation(&lookup_id))
        .await
        .map_err(state.internal("Failed to delete donation"))?
        .ok_or(ApiError::NotFound("Donation"))?;

    authorize(&state.settings, &caller, &current.owner_id, "donation")?;

    let delete_id = id.clone();
    let removed = blocking(&state, move |s| s.db.delete_donation(&delete_id))
        .await
        .map_err(state.internal("Failed to delete donation"))?;
    if !removed {
        return Err(ApiError::NotFound("Donation"));
    }

    info!("Donation deleted: {}", id);

    Ok(Json(json!({
        "success": true,
        "message": "Donation deleted successfully",
    })))
}
