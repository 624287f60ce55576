use anyhow::Result;
use rusqlite::{Connection, Row};

use foodconnect_types::models::normalize_email;

use crate::models::{NewRequest, RequestRow};
use crate::{Database, OptionalExt, StatusUpdate, now};

const SELECT_REQUEST: &str = "SELECT r.id, r.owner_id, u.email, r.organization, r.contact_email, r.phone,
            r.address, r.food_type, r.quantity, r.urgency, r.beneficiaries, r.description,
            r.pickup_preference, r.storage_capacity, r.distance, r.delivery_fee,
            r.delivery_fee_paid, r.payment_method, r.payment_date, r.status, r.date_requested,
            r.matched_donors, r.created_at, r.updated_at
     FROM requests r
     JOIN users u ON u.id = r.owner_id";

impl Database {
    pub fn insert_request(&self, request: &NewRequest<'_>) -> Result<RequestRow> {
        let ts = now();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO requests (id, owner_id, organization, contact_email, phone, address, food_type,
                                       quantity, urgency, beneficiaries, description, pickup_preference,
                                       storage_capacity, distance, date_requested, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
                rusqlite::params![
                    request.id,
                    request.owner_id,
                    request.organization,
                    request.contact_email,
                    request.phone,
                    request.address,
                    request.food_type,
                    request.quantity,
                    request.urgency,
                    request.beneficiaries,
                    request.description,
                    request.pickup_preference,
                    request.storage_capacity,
                    request.distance,
                    request.date_requested,
                    ts,
                ],
            )?;
            query_request(conn, request.id)?
                .ok_or_else(|| anyhow::anyhow!("Request {} vanished after insert", request.id))
        })
    }

    pub fn get_request(&self, id: &str) -> Result<Option<RequestRow>> {
        self.with_conn(|conn| query_request(conn, id))
    }

    /// All requests owned by the account with this email, newest first.
    pub fn list_requests_by_owner(&self, owner_email: &str) -> Result<Vec<RequestRow>> {
        let email = normalize_email(owner_email);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE u.email = ?1 ORDER BY r.created_at DESC, r.rowid DESC",
                SELECT_REQUEST
            ))?;
            let rows = stmt
                .query_map([&email], request_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_request_status(&self, id: &str, status: &str) -> Result<Option<RequestRow>> {
        let ts = now();
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE requests SET status = ?1, updated_at = ?2 WHERE id = ?3",
                (status, &ts, id),
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_request(conn, id)
        })
    }

    /// Overwrite the status only if it still equals `expected`.
    pub fn update_request_status_from(
        &self,
        id: &str,
        expected: &str,
        status: &str,
    ) -> Result<StatusUpdate<RequestRow>> {
        let ts = now();
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE requests SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                (status, &ts, id, expected),
            )?;
            Ok(match query_request(conn, id)? {
                None => StatusUpdate::Missing,
                Some(row) if updated > 0 => StatusUpdate::Updated(row),
                Some(row) => StatusUpdate::Stale(row),
            })
        })
    }

    pub fn delete_request(&self, id: &str) -> Result<bool> {
        self.delete_by_id("requests", id)
    }
}

fn query_request(conn: &Connection, id: &str) -> Result<Option<RequestRow>> {
    let mut stmt = conn.prepare(&format!("{} WHERE r.id = ?1", SELECT_REQUEST))?;
    let row = stmt.query_row([id], request_from_row).optional()?;
    Ok(row)
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_email: row.get(2)?,
        organization: row.get(3)?,
        contact_email: row.get(4)?,
        phone: row.get(5)?,
        address: row.get(6)?,
        food_type: row.get(7)?,
        quantity: row.get(8)?,
        urgency: row.get(9)?,
        beneficiaries: row.get(10)?,
        description: row.get(11)?,
        pickup_preference: row.get(12)?,
        storage_capacity: row.get(13)?,
        distance: row.get(14)?,
        delivery_fee: row.get(15)?,
        delivery_fee_paid: row.get(16)?,
        payment_method: row.get(17)?,
        payment_date: row.get(18)?,
        status: row.get(19)?,
        date_requested: row.get(20)?,
        matched_donors: row.get(21)?,
        created_at: row.get(22)?,
        updated_at: row.get(23)?,
    })
}
