use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use foodconnect_db::Database;
use foodconnect_db::models::UserRow;
use foodconnect_types::api::OwnerRef;
use foodconnect_types::models::Lifecycle;

use crate::error::ApiError;
use crate::state::{AppState, Settings, blocking};

pub const CALLER_HEADER: &str = "x-user-id";

/// Self-reported caller identity from the `X-User-Id` header. Nothing signs it; it only
/// matters when ownership enforcement is switched on.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(Caller(id))
    }
}

/// Check that `caller` owns a record owned by `owner_id`. A no-op unless enforcement is on.
pub fn authorize(
    settings: &Settings,
    caller: &Caller,
    owner_id: &str,
    resource: &str,
) -> Result<(), ApiError> {
    if !settings.enforce_ownership {
        return Ok(());
    }
    match caller.0.as_deref() {
        None => Err(ApiError::Unauthorized(format!(
            "Missing X-User-Id header for {} change",
            resource
        ))),
        Some(id) if id.eq_ignore_ascii_case(owner_id) => Ok(()),
        Some(_) => Err(ApiError::Forbidden(format!("You do not own this {}", resource))),
    }
}

/// Reject an illegal status change when strict transitions are on.
pub fn check_transition<S: Lifecycle>(settings: &Settings, from: S, to: S) -> Result<(), ApiError> {
    if settings.strict_transitions && !from.can_transition_to(to) {
        return Err(ApiError::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

/// Outcome of resolving a create payload's owner reference.
pub enum Owner {
    Found(UserRow),
    Missing,
    Conflicting,
}

/// Look up the account a payload names. Runs on the blocking pool.
pub fn resolve_owner(db: &Database, owner: &OwnerRef) -> anyhow::Result<Owner> {
    let found = match owner {
        OwnerRef::Email(email) => db.get_user_by_email(email)?,
        OwnerRef::Id(id) => db.get_user_by_id(&id.to_string())?,
        OwnerRef::Both { email, id } => match db.get_user_by_email(email)? {
            Some(user) if !same_id(&user.id, *id) => return Ok(Owner::Conflicting),
            other => other,
        },
    };
    Ok(found.map_or(Owner::Missing, Owner::Found))
}

fn same_id(stored: &str, id: Uuid) -> bool {
    stored.parse::<Uuid>().is_ok_and(|stored| stored == id)
}

impl Owner {
    pub fn into_result(self) -> Result<UserRow, ApiError> {
        match self {
            Owner::Found(user) => Ok(user),
            Owner::Missing => Err(ApiError::NotFound("Owner account")),
            Owner::Conflicting => Err(ApiError::BadRequest(
                "userId does not match ownerEmail".into(),
            )),
        }
    }
}

/// Resolve the owner a create payload names and check the caller may act for it.
pub async fn claim_owner(
    state: &AppState,
    caller: &Caller,
    owner: Option<OwnerRef>,
    resource: &str,
    failure: &'static str,
) -> Result<UserRow, ApiError> {
    let owner =
        owner.ok_or_else(|| ApiError::BadRequest("ownerEmail or userId is required".into()))?;
    let user = blocking(state, move |s| resolve_owner(&s.db, &owner))
        .await
        .map_err(state.internal(failure))?
        .into_result()?;
    authorize(&state.settings, caller, &user.id, resource)?;
    Ok(user)
}
