//! Database row types. These map directly to SQLite rows and stay independent of the
//! wire models in foodconnect-types; enumerations are kept as their stored strings.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub phone: String,
    pub address: String,
    pub organization: Option<String>,
    pub last_login: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub organization: Option<&'a str>,
}

/// Resource rows carry `owner_email`, joined in from `users` at read time.
#[derive(Debug, Clone)]
pub struct DonationRow {
    pub id: String,
    pub owner_id: String,
    pub owner_email: String,
    pub food_type: String,
    pub quantity: String,
    pub unit: String,
    pub expiry_date: Option<String>,
    pub location: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewDonation<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub food_type: &'a str,
    pub quantity: &'a str,
    pub unit: &'a str,
    pub expiry_date: Option<&'a str>,
    pub location: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct RequestRow {
    pub id: String,
    pub owner_id: String,
    pub owner_email: String,
    pub organization: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub address: String,
    pub food_type: String,
    pub quantity: String,
    pub urgency: String,
    pub beneficiaries: u32,
    pub description: Option<String>,
    pub pickup_preference: String,
    pub storage_capacity: Option<f64>,
    pub distance: f64,
    pub delivery_fee: f64,
    pub delivery_fee_paid: bool,
    pub payment_method: Option<String>,
    pub payment_date: Option<String>,
    pub status: String,
    pub date_requested: Option<String>,
    pub matched_donors: u32,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewRequest<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub organization: &'a str,
    pub contact_email: &'a str,
    pub phone: Option<&'a str>,
    pub address: &'a str,
    pub food_type: &'a str,
    pub quantity: &'a str,
    pub urgency: &'a str,
    pub beneficiaries: u32,
    pub description: Option<&'a str>,
    pub pickup_preference: &'a str,
    pub storage_capacity: Option<f64>,
    pub distance: f64,
    pub date_requested: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub owner_id: String,
    pub owner_email: String,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub timestamp: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewMessage<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub sender: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    /// Defaults to the insert time when absent.
    pub timestamp: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: String,
    pub owner_id: String,
    pub owner_email: String,
    pub message: String,
    pub kind: String,
    pub read: bool,
    pub timestamp: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewNotification<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub message: &'a str,
    pub kind: &'a str,
    pub timestamp: Option<&'a str>,
}
