use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Trim and lowercase an email so lookups are case- and whitespace-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A string that does not name any variant of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}', expected one of: {expected}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Closed string enumerations. Stored and sent on the wire as the exact strings listed.
macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                        expected: concat!($($text, " "),+).trim_ascii_end(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

closed_enum!(
    /// Account role. Fixed at registration.
    Role, "role" {
        Donor => "donor",
        Recipient => "recipient",
        Seeker => "seeker",
        Admin => "admin",
        Analyst => "analyst",
    }
);

closed_enum!(
    DonationStatus, "donation status" {
        Available => "Available",
        Pending => "Pending",
        Collected => "Collected",
        Delivered => "Delivered",
        Expired => "Expired",
    }
);

closed_enum!(
    RequestStatus, "request status" {
        Pending => "Pending",
        Matched => "Matched",
        InTransit => "In Transit",
        Delivered => "Delivered",
        Cancelled => "Cancelled",
    }
);

closed_enum!(
    Urgency, "urgency" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

closed_enum!(
    PickupPreference, "pickup preference" {
        Delivery => "delivery",
        Pickup => "pickup",
        Either => "either",
    }
);

closed_enum!(
    NotificationKind, "notification type" {
        Success => "success",
        Info => "info",
        Warning => "warning",
        Error => "error",
    }
);

impl Default for DonationStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for PickupPreference {
    fn default() -> Self {
        Self::Delivery
    }
}

impl Default for NotificationKind {
    fn default() -> Self {
        Self::Info
    }
}

/// A status field with a transition-legality table.
pub trait Lifecycle: Copy + PartialEq + fmt::Display {
    /// Whether moving from `self` to `next` is a legal step. Staying put is always legal.
    fn can_transition_to(self, next: Self) -> bool;
}

impl Lifecycle for DonationStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use DonationStatus::*;
        self == next
            || matches!(
                (self, next),
                (Available, Pending)
                    | (Available, Expired)
                    | (Pending, Available)
                    | (Pending, Collected)
                    | (Pending, Expired)
                    | (Collected, Delivered)
            )
    }
}

impl Lifecycle for RequestStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use RequestStatus::*;
        self == next
            || matches!(
                (self, next),
                (Pending, Matched)
                    | (Pending, Cancelled)
                    | (Matched, Pending)
                    | (Matched, InTransit)
                    | (Matched, Cancelled)
                    | (InTransit, Delivered)
            )
    }
}

// -- Accounts --

/// What a client gets back from register/login. Not a verifiable credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub phone: String,
    pub address: String,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten)]
    pub identity: Identity,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Resources --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_email: String,
    pub food_type: String,
    pub quantity: String,
    pub unit: String,
    pub expiry_date: Option<String>,
    pub location: String,
    pub description: Option<String>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_email: String,
    pub organization: String,
    /// Contact address for this request, not necessarily the owner's login email.
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub food_type: String,
    pub quantity: String,
    pub urgency: Urgency,
    pub beneficiaries: u32,
    pub description: Option<String>,
    pub pickup_preference: PickupPreference,
    pub storage_capacity: Option<f64>,
    pub distance: f64,
    pub delivery_fee: f64,
    pub delivery_fee_paid: bool,
    pub payment_method: Option<String>,
    pub payment_date: Option<String>,
    pub status: RequestStatus,
    pub date_requested: Option<String>,
    pub matched_donors: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_email: String,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_email: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
