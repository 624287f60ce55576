use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use foodconnect_db::models::{NewUser, UserRow};
use foodconnect_types::api::{LoginRequest, RegisterRequest};
use foodconnect_types::models::Role;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::rows;
use crate::state::{AppState, blocking};

pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |s| {
        // Check first so a duplicate never pays for a hash
        if s.db.get_user_by_email(&req.email)?.is_some() {
            return Ok(None);
        }

        let password_hash = hash_password(&req.password)?;
        let id = Uuid::new_v4().to_string();

        let created = s.db.create_user(&NewUser {
            id: &id,
            email: &req.email,
            password_hash: &password_hash,
            name: req.name.trim(),
            role: req.role.as_str(),
            phone: req.phone.trim(),
            address: req.address.trim(),
            organization: req.organization.as_deref().map(str::trim).filter(|o| !o.is_empty()),
        })?;
        if !created {
            return Ok(None);
        }
        s.db.get_user_by_id(&id)
    })
    .await
    .map_err(state.internal("Registration failed"))?
    .ok_or(ApiError::DuplicateEmail)?;

    info!("User registered: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "user": rows::identity(&user),
        })),
    ))
}

enum LoginOutcome {
    Success(UserRow),
    NoAccount,
    WrongRole(Role),
    WrongPassword,
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = blocking(&state, move |s| {
        let Some(user) = s.db.get_user_by_email(&req.email)? else {
            return Ok(LoginOutcome::NoAccount);
        };

        // The role check exists so each dashboard can have its own login form
        if !req.claims_role(&user.role) {
            return Ok(LoginOutcome::WrongRole(rows::identity(&user).role));
        }

        if !verify_password(&req.password, &user.password)? {
            return Ok(LoginOutcome::WrongPassword);
        }

        let user = s
            .db
            .touch_login(&user.email)?
            .ok_or_else(|| anyhow::anyhow!("User {} disappeared during login", user.id))?;
        Ok(LoginOutcome::Success(user))
    })
    .await
    .map_err(state.internal("Login failed"))?;

    let user = match outcome {
        LoginOutcome::Success(user) => user,
        LoginOutcome::NoAccount => return Err(ApiError::AccountNotFound),
        LoginOutcome::WrongRole(role) => return Err(ApiError::RoleMismatch(role)),
        LoginOutcome::WrongPassword => return Err(ApiError::InvalidCredential),
    };

    info!("User logged in: {}", user.email);

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "user": rows::identity(&user),
    })))
}

pub async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |s| s.db.get_user_by_id(&user_id))
        .await
        .map_err(state.internal("Failed to get profile"))?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(json!({
        "success": true,
        "user": rows::profile(&user),
    })))
}

/// Argon2id with a fresh random salt, encoded as a PHC string.
fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| anyhow::anyhow!("Stored password hash is unreadable: {}", e))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifies() {
        let first = hash_password("Secret123!").unwrap();
        let second = hash_password("Secret123!").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("Secret123!"));

        assert!(verify_password("Secret123!", &first).unwrap());
        assert!(verify_password("Secret123!", &second).unwrap());
        assert!(!verify_password("secret123!", &first).unwrap());
    }

    #[test]
    fn unreadable_hash_is_an_error() {
        assert!(verify_password("Secret123!", "not-a-phc-string").is_err());
    }
}
