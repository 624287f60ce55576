use anyhow::Result;
use rusqlite::{Connection, Row};

use foodconnect_types::models::normalize_email;

use crate::models::{NewUser, UserRow};
use crate::{Database, OptionalExt, now};

const USER_COLUMNS: &str = "id, email, password, name, role, phone, address, organization, \
                            last_login, created_at, updated_at";

impl Database {
    /// Insert a new account. Returns `false` without touching anything when the
    /// normalized email is already registered.
    pub fn create_user(&self, user: &NewUser<'_>) -> Result<bool> {
        let email = normalize_email(user.email);
        let ts = now();
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, email, password, name, role, phone, address, organization, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                 ON CONFLICT(email) DO NOTHING",
                rusqlite::params![
                    user.id,
                    email,
                    user.password_hash,
                    user.name,
                    user.role,
                    user.phone,
                    user.address,
                    user.organization,
                    ts,
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let email = normalize_email(email);
        self.with_conn(|conn| query_user(conn, "email", &email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Record a successful login. Returns the refreshed row.
    pub fn touch_login(&self, email: &str) -> Result<Option<UserRow>> {
        let email = normalize_email(email);
        let ts = now();
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE users SET last_login = ?1, updated_at = ?1 WHERE email = ?2",
                (&ts, &email),
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_user(conn, "email", &email)
        })
    }
}

fn query_user(conn: &Connection, column: &'static str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column))?;

    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        role: row.get(4)?,
        phone: row.get(5)?,
        address: row.get(6)?,
        organization: row.get(7)?,
        last_login: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
