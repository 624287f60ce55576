use anyhow::Result;
use rusqlite::{Connection, Row};

use foodconnect_types::models::normalize_email;

use crate::models::{MessageRow, NewMessage};
use crate::{Database, OptionalExt, now};

const SELECT_MESSAGE: &str = "SELECT m.id, m.owner_id, u.email, m.sender, m.subject, m.body, m.read,
            m.timestamp, m.created_at, m.updated_at
     FROM messages m
     JOIN users u ON u.id = m.owner_id";

impl Database {
    pub fn insert_message(&self, message: &NewMessage<'_>) -> Result<MessageRow> {
        let ts = now();
        let timestamp = message.timestamp.unwrap_or(ts.as_str());
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, owner_id, sender, subject, body, timestamp, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                rusqlite::params![
                    message.id,
                    message.owner_id,
                    message.sender,
                    message.subject,
                    message.body,
                    timestamp,
                    ts,
                ],
            )?;
            query_message(conn, message.id)?
                .ok_or_else(|| anyhow::anyhow!("Message {} vanished after insert", message.id))
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// The owner's inbox, most recent `timestamp` first.
    pub fn list_messages_by_owner(&self, owner_email: &str) -> Result<Vec<MessageRow>> {
        let email = normalize_email(owner_email);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE u.email = ?1 ORDER BY m.timestamp DESC, m.rowid DESC",
                SELECT_MESSAGE
            ))?;
            let rows = stmt
                .query_map([&email], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn mark_message_read(&self, id: &str) -> Result<Option<MessageRow>> {
        let ts = now();
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE messages SET read = 1, updated_at = ?1 WHERE id = ?2",
                (&ts, id),
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_message(conn, id)
        })
    }

    pub fn delete_message(&self, id: &str) -> Result<bool> {
        self.delete_by_id("messages", id)
    }
}

fn query_message(conn: &Connection, id: &str) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(&format!("{} WHERE m.id = ?1", SELECT_MESSAGE))?;
    let row = stmt.query_row([id], message_from_row).optional()?;
    Ok(row)
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_email: row.get(2)?,
        sender: row.get(3)?,
        subject: row.get(4)?,
        body: row.get(5)?,
        read: row.get(6)?,
        timestamp: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
