use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{NotificationKind, PickupPreference, Role, Urgency};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Field-level checks run at the HTTP boundary, after JSON decoding.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

fn require_email(field: &str, value: &str) -> Result<(), String> {
    require(field, value)?;
    match value.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(format!("{} must be a valid email address", field)),
    }
}

/// Stored timestamps only sort chronologically while the year has four digits.
fn require_storable_timestamp(field: &str, value: Option<&DateTime<Utc>>) -> Result<(), String> {
    match value {
        Some(ts) if !(0..=9999).contains(&ts.year()) => {
            Err(format!("{} must fall between years 0000 and 9999", field))
        }
        _ => Ok(()),
    }
}

/// How a create payload names its owner: by login email, by account id, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerRef {
    Email(String),
    Id(Uuid),
    Both { email: String, id: Uuid },
}

fn owner_ref(email: Option<&str>, id: Option<Uuid>) -> Option<OwnerRef> {
    let email = email.map(str::trim).filter(|e| !e.is_empty()).map(String::from);
    match (email, id) {
        (Some(email), Some(id)) => Some(OwnerRef::Both { email, id }),
        (Some(email), None) => Some(OwnerRef::Email(email)),
        (None, Some(id)) => Some(OwnerRef::Id(id)),
        (None, None) => None,
    }
}

fn require_owner(email: Option<&str>, id: Option<Uuid>) -> Result<(), String> {
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        require_email("ownerEmail", email)?;
    }
    owner_ref(email, id)
        .map(|_| ())
        .ok_or_else(|| "ownerEmail or userId is required".to_string())
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub organization: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        require_email("email", &self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }
        require("name", &self.name)?;
        require("phone", &self.phone)?;
        require("address", &self.address)
    }
}

/// `user_type` stays a raw string: an unknown role is a role mismatch against the stored
/// account, decided after the account lookup.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub user_type: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            user_type: role.as_str().to_string(),
        }
    }

    pub fn claims_role(&self, stored: &str) -> bool {
        self.user_type.trim().eq_ignore_ascii_case(stored)
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        require("email", &self.email)
    }
}

// -- Donations --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default, alias = "userEmail")]
    pub owner_email: Option<String>,
    pub food_type: String,
    pub quantity: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateDonationRequest {
    pub fn owner(&self) -> Option<OwnerRef> {
        owner_ref(self.owner_email.as_deref(), self.user_id)
    }
}

impl Validate for CreateDonationRequest {
    fn validate(&self) -> Result<(), String> {
        require_owner(self.owner_email.as_deref(), self.user_id)?;
        require("foodType", &self.food_type)?;
        require("quantity", &self.quantity)?;
        require("location", &self.location)
    }
}

// -- Requests --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoodRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default, alias = "userEmail")]
    pub owner_email: Option<String>,
    pub organization: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub address: String,
    pub food_type: String,
    pub quantity: String,
    pub urgency: Urgency,
    pub beneficiaries: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pickup_preference: PickupPreference,
    #[serde(default)]
    pub storage_capacity: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub date_requested: Option<String>,
}

impl CreateFoodRequest {
    pub fn owner(&self) -> Option<OwnerRef> {
        owner_ref(self.owner_email.as_deref(), self.user_id)
    }
}

impl Validate for CreateFoodRequest {
    fn validate(&self) -> Result<(), String> {
        require_owner(self.owner_email.as_deref(), self.user_id)?;
        require("organization", &self.organization)?;
        require_email("email", &self.email)?;
        require("address", &self.address)?;
        require("foodType", &self.food_type)?;
        require("quantity", &self.quantity)?;
        if let Some(distance) = self.distance {
            if !distance.is_finite() || distance < 0.0 {
                return Err("distance must be a non-negative number".into());
            }
        }
        if let Some(capacity) = self.storage_capacity {
            if !capacity.is_finite() || capacity < 0.0 {
                return Err("storageCapacity must be a non-negative number".into());
            }
        }
        Ok(())
    }
}

// -- Messages --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default, alias = "userEmail")]
    pub owner_email: Option<String>,
    pub sender: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl CreateMessageRequest {
    pub fn owner(&self) -> Option<OwnerRef> {
        owner_ref(self.owner_email.as_deref(), self.user_id)
    }
}

impl Validate for CreateMessageRequest {
    fn validate(&self) -> Result<(), String> {
        require_owner(self.owner_email.as_deref(), self.user_id)?;
        require("sender", &self.sender)?;
        require("subject", &self.subject)?;
        require("body", &self.body)?;
        require_storable_timestamp("timestamp", self.timestamp.as_ref())
    }
}

// -- Notifications --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default, alias = "userEmail")]
    pub owner_email: Option<String>,
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl CreateNotificationRequest {
    pub fn owner(&self) -> Option<OwnerRef> {
        owner_ref(self.owner_email.as_deref(), self.user_id)
    }
}

impl Validate for CreateNotificationRequest {
    fn validate(&self) -> Result<(), String> {
        require_owner(self.owner_email.as_deref(), self.user_id)?;
        require("message", &self.message)?;
        require_storable_timestamp("timestamp", self.timestamp.as_ref())
    }
}

// -- Status --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest<S> {
    pub status: S,
}

impl<S> Validate for UpdateStatusRequest<S> {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
