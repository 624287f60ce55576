use anyhow::Result;
use rusqlite::{Connection, Row};

use foodconnect_types::models::normalize_email;

use crate::models::{NewNotification, NotificationRow};
use crate::{Database, OptionalExt, now};

const SELECT_NOTIFICATION: &str = "SELECT n.id, n.owner_id, u.email, n.message, n.kind, n.read,
            n.timestamp, n.created_at, n.updated_at
     FROM notifications n
     JOIN users u ON u.id = n.owner_id";

impl Database {
    pub fn insert_notification(&self, notification: &NewNotification<'_>) -> Result<NotificationRow> {
        let ts = now();
        let timestamp = notification.timestamp.unwrap_or(ts.as_str());
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO notifications (id, owner_id, message, kind, timestamp, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                rusqlite::params![
                    notification.id,
                    notification.owner_id,
                    notification.message,
                    notification.kind,
                    timestamp,
                    ts,
                ],
            )?;
            query_notification(conn, notification.id)?.ok_or_else(|| {
                anyhow::anyhow!("Notification {} vanished after insert", notification.id)
            })
        })
    }

    pub fn get_notification(&self, id: &str) -> Result<Option<NotificationRow>> {
        self.with_conn(|conn| query_notification(conn, id))
    }

    pub fn list_notifications_by_owner(&self, owner_email: &str) -> Result<Vec<NotificationRow>> {
        let email = normalize_email(owner_email);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE u.email = ?1 ORDER BY n.timestamp DESC, n.rowid DESC",
                SELECT_NOTIFICATION
            ))?;
            let rows = stmt
                .query_map([&email], notification_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn mark_notification_read(&self, id: &str) -> Result<Option<NotificationRow>> {
        let ts = now();
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE notifications SET read = 1, updated_at = ?1 WHERE id = ?2",
                (&ts, id),
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_notification(conn, id)
        })
    }

    pub fn delete_notification(&self, id: &str) -> Result<bool> {
        self.delete_by_id("notifications", id)
    }

    /// Remove every notification owned by this email. Returns how many were removed.
    pub fn clear_notifications_for_owner(&self, owner_email: &str) -> Result<usize> {
        let email = normalize_email(owner_email);
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM notifications
                 WHERE owner_id IN (SELECT id FROM users WHERE email = ?1)",
                [&email],
            )?;
            Ok(removed)
        })
    }
}

fn query_notification(conn: &Connection, id: &str) -> Result<Option<NotificationRow>> {
    let mut stmt = conn.prepare(&format!("{} WHERE n.id = ?1", SELECT_NOTIFICATION))?;
    let row = stmt.query_row([id], notification_from_row).optional()?;
    Ok(row)
}

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_email: row.get(2)?,
        message: row.get(3)?,
        kind: row.get(4)?,
        read: row.get(5)?,
        timestamp: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
