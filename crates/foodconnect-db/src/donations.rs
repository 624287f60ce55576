use anyhow::Result;
use rusqlite::{Connection, Row};

use foodconnect_types::models::normalize_email;

use crate::models::{DonationRow, NewDonation};
use crate::{Database, OptionalExt, StatusUpdate, now};

const SELECT_DONATION: &str = "SELECT d.id, d.owner_id, u.email, d.food_type, d.quantity, d.unit,
            d.expiry_date, d.location, d.description, d.status, d.created_at, d.updated_at
     FROM donations d
     JOIN users u ON u.id = d.owner_id";

impl Database {
    pub fn insert_donation(&self, donation: &NewDonation<'_>) -> Result<DonationRow> {
        let ts = now();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO donations (id, owner_id, food_type, quantity, unit, expiry_date, location, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                rusqlite::params![
                    donation.id,
                    donation.owner_id,
                    donation.food_type,
                    donation.quantity,
                    donation.unit,
                    donation.expiry_date,
                    donation.location,
                    donation.description,
                    ts,
                ],
            )?;
            query_donation(conn, donation.id)?
                .ok_or_else(|| anyhow::anyhow!("Donation {} vanished after insert", donation.id))
        })
    }

    pub fn get_donation(&self, id: &str) -> Result<Option<DonationRow>> {
        self.with_conn(|conn| query_donation(conn, id))
    }

    /// All donations owned by the account with this email, newest first.
    pub fn list_donations_by_owner(&self, owner_email: &str) -> Result<Vec<DonationRow>> {
        let email = normalize_email(owner_email);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE u.email = ?1 ORDER BY d.created_at DESC, d.rowid DESC",
                SELECT_DONATION
            ))?;
            let rows = stmt
                .query_map([&email], donation_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrite the status. Any value is accepted here; transition rules live above the store.
    pub fn update_donation_status(&self, id: &str, status: &str) -> Result<Option<DonationRow>> {
        let ts = now();
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE donations SET status = ?1, updated_at = ?2 WHERE id = ?3",
                (status, &ts, id),
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_donation(conn, id)
        })
    }

    /// Overwrite the status only if it still equals `expected`.
    pub fn update_donation_status_from(
        &self,
        id: &str,
        expected: &str,
        status: &str,
    ) -> Result<StatusUpdate<DonationRow>> {
        let ts = now();
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE donations SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                (status, &ts, id, expected),
            )?;
            Ok(match query_donation(conn, id)? {
                None => StatusUpdate::Missing,
                Some(row) if updated > 0 => StatusUpdate::Updated(row),
                Some(row) => StatusUpdate::Stale(row),
            })
        })
    }

    pub fn delete_donation(&self, id: &str) -> Result<bool> {
        self.delete_by_id("donations", id)
    }
}

fn query_donation(conn: &Connection, id: &str) -> Result<Option<DonationRow>> {
    let mut stmt = conn.prepare(&format!("{} WHERE d.id = ?1", SELECT_DONATION))?;
    let row = stmt.query_row([id], donation_from_row).optional()?;
    Ok(row)
}

fn donation_from_row(row: &Row<'_>) -> rusqlite::Result<DonationRow> {
    Ok(DonationRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_email: row.get(2)?,
        food_type: row.get(3)?,
        quantity: row.get(4)?,
        unit: row.get(5)?,
        expiry_date: row.get(6)?,
        location: row.get(7)?,
        description: row.get(8)?,
        status: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
