//! Row → wire model conversion. Stored values that fail to parse are logged and replaced
//! with a default rather than failing the whole listing.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use foodconnect_db::models::{DonationRow, MessageRow, NotificationRow, RequestRow, UserRow};
use foodconnect_types::models::{
    Donation, FoodRequest, Identity, Message, Notification, Profile, Role, Urgency,
};

fn uuid(raw: &str, field: &str, record: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on '{}': {}", field, raw, record, e);
        Uuid::default()
    })
}

fn timestamp(raw: &str, field: &str, record: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on '{}': {}", field, raw, record, e);
        DateTime::default()
    })
}

fn closed<T: FromStr + Default>(raw: &str, field: &str, record: &str) -> T
where
    T::Err: std::fmt::Display,
{
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} on '{}': {}", field, record, e);
        T::default()
    })
}

/// Falls back to the least privileged role.
fn role(raw: &str, record: &str) -> Role {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt role on user '{}': {}", record, e);
        Role::Recipient
    })
}

pub fn identity(row: &UserRow) -> Identity {
    Identity {
        id: uuid(&row.id, "id", &row.id),
        email: row.email.clone(),
        name: row.name.clone(),
        role: role(&row.role, &row.id),
        phone: row.phone.clone(),
        address: row.address.clone(),
        organization: row.organization.clone(),
    }
}

pub fn profile(row: &UserRow) -> Profile {
    Profile {
        identity: identity(row),
        last_login: row
            .last_login
            .as_deref()
            .map(|ts| timestamp(ts, "last_login", &row.id)),
        created_at: timestamp(&row.created_at, "created_at", &row.id),
        updated_at: timestamp(&row.updated_at, "updated_at", &row.id),
    }
}

pub fn donation(row: DonationRow) -> Donation {
    Donation {
        id: uuid(&row.id, "id", &row.id),
        user_id: uuid(&row.owner_id, "owner_id", &row.id),
        status: closed(&row.status, "status", &row.id),
        created_at: timestamp(&row.created_at, "created_at", &row.id),
        updated_at: timestamp(&row.updated_at, "updated_at", &row.id),
        owner_email: row.owner_email,
        food_type: row.food_type,
        quantity: row.quantity,
        unit: row.unit,
        expiry_date: row.expiry_date,
        location: row.location,
        description: row.description,
    }
}

pub fn request(row: RequestRow) -> FoodRequest {
    FoodRequest {
        id: uuid(&row.id, "id", &row.id),
        user_id: uuid(&row.owner_id, "owner_id", &row.id),
        urgency: row.urgency.parse().unwrap_or_else(|e| {
            warn!("Corrupt urgency on '{}': {}", row.id, e);
            Urgency::Medium
        }),
        pickup_preference: closed(&row.pickup_preference, "pickup_preference", &row.id),
        status: closed(&row.status, "status", &row.id),
        created_at: timestamp(&row.created_at, "created_at", &row.id),
        updated_at: timestamp(&row.updated_at, "updated_at", &row.id),
        owner_email: row.owner_email,
        organization: row.organization,
        email: row.contact_email,
        phone: row.phone,
        address: row.address,
        food_type: row.food_type,
        quantity: row.quantity,
        beneficiaries: row.beneficiaries,
        description: row.description,
        storage_capacity: row.storage_capacity,
        distance: row.distance,
        delivery_fee: row.delivery_fee,
        delivery_fee_paid: row.delivery_fee_paid,
        payment_method: row.payment_method,
        payment_date: row.payment_date,
        date_requested: row.date_requested,
        matched_donors: row.matched_donors,
    }
}

pub fn message(row: MessageRow) -> Message {
    Message {
        id: uuid(&row.id, "id", &row.id),
        user_id: uuid(&row.owner_id, "owner_id", &row.id),
        timestamp: timestamp(&row.timestamp, "timestamp", &row.id),
        created_at: timestamp(&row.created_at, "created_at", &row.id),
        updated_at: timestamp(&row.updated_at, "updated_at", &row.id),
        owner_email: row.owner_email,
        sender: row.sender,
        subject: row.subject,
        body: row.body,
        read: row.read,
    }
}

pub fn notification(row: NotificationRow) -> Notification {
    Notification {
        id: uuid(&row.id, "id", &row.id),
        user_id: uuid(&row.owner_id, "owner_id", &row.id),
        kind: closed(&row.kind, "kind", &row.id),
        timestamp: timestamp(&row.timestamp, "timestamp", &row.id),
        created_at: timestamp(&row.created_at, "created_at", &row.id),
        updated_at: timestamp(&row.updated_at, "updated_at", &row.id),
        owner_email: row.owner_email,
        message: row.message,
        read: row.read,
    }
}
