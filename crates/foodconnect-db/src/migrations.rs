use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id            TEXT PRIMARY KEY,
                email         TEXT NOT NULL UNIQUE,
                password      TEXT NOT NULL,
                name          TEXT NOT NULL,
                role          TEXT NOT NULL,
                phone         TEXT NOT NULL,
                address       TEXT NOT NULL,
                organization  TEXT,
                last_login    TEXT,
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL
            );

            CREATE INDEX idx_users_role ON users(role);

            CREATE TABLE donations (
                id           TEXT PRIMARY KEY,
                owner_id     TEXT NOT NULL REFERENCES users(id),
                food_type    TEXT NOT NULL,
                quantity     TEXT NOT NULL,
                unit         TEXT NOT NULL DEFAULT 'kg',
                expiry_date  TEXT,
                location     TEXT NOT NULL,
                description  TEXT,
                status       TEXT NOT NULL DEFAULT 'Available',
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            );

            CREATE INDEX idx_donations_owner ON donations(owner_id, created_at);
            CREATE INDEX idx_donations_status ON donations(status);

            CREATE TABLE requests (
                id                 TEXT PRIMARY KEY,
                owner_id           TEXT NOT NULL REFERENCES users(id),
                organization       TEXT NOT NULL,
                contact_email      TEXT NOT NULL,
                phone              TEXT,
                address            TEXT NOT NULL,
                food_type          TEXT NOT NULL,
                quantity           TEXT NOT NULL,
                urgency            TEXT NOT NULL,
                beneficiaries      INTEGER NOT NULL,
                description        TEXT,
                pickup_preference  TEXT NOT NULL DEFAULT 'delivery',
                storage_capacity   REAL,
                distance           REAL NOT NULL DEFAULT 5,
                delivery_fee       REAL NOT NULL DEFAULT 0,
                delivery_fee_paid  INTEGER NOT NULL DEFAULT 0,
                payment_method     TEXT,
                payment_date       TEXT,
                status             TEXT NOT NULL DEFAULT 'Pending',
                date_requested     TEXT,
                matched_donors     INTEGER NOT NULL DEFAULT 0,
                created_at         TEXT NOT NULL,
                updated_at         TEXT NOT NULL
            );

            CREATE INDEX idx_requests_owner ON requests(owner_id, created_at);
            CREATE INDEX idx_requests_status ON requests(status);

            CREATE TABLE messages (
                id          TEXT PRIMARY KEY,
                owner_id    TEXT NOT NULL REFERENCES users(id),
                sender      TEXT NOT NULL,
                subject     TEXT NOT NULL,
                body        TEXT NOT NULL,
                read        INTEGER NOT NULL DEFAULT 0,
                timestamp   TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_messages_owner ON messages(owner_id, timestamp);

            CREATE TABLE notifications (
                id          TEXT PRIMARY KEY,
                owner_id    TEXT NOT NULL REFERENCES users(id),
                message     TEXT NOT NULL,
                kind        TEXT NOT NULL DEFAULT 'info',
                read        INTEGER NOT NULL DEFAULT 0,
                timestamp   TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_notifications_owner ON notifications(owner_id, timestamp);
            CREATE INDEX idx_notifications_read ON notifications(read);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
