//! SQL persistence for admin accounts and sessions.
//!
//! Same layout as the other modules: a JSON `data` column plus the
//! columns lookups touch, mirrored and indexed.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use labkom_core::ServiceError;
use labkom_sql::{Row, SQLStore, Value};

use crate::model::{AdminAccount, Session};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS admins (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    admin_id TEXT NOT NULL,
    revoked INTEGER NOT NULL DEFAULT 0,
    issued_at TEXT NOT NULL,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_admin ON sessions(admin_id);
";

fn to_json<T: Serialize>(value: &T) -> Result<String, ServiceError> {
    serde_json::to_string(value).map_err(|e| ServiceError::Internal(e.to_string()))
}

fn from_row<T: DeserializeOwned>(row: &Row) -> Result<T, ServiceError> {
    let data = row
        .get_str("data")
        .ok_or_else(|| ServiceError::Internal("missing data column".to_string()))?;
    serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
}

pub struct AuthStore {
    db: Arc<dyn SQLStore>,
}

impl AuthStore {
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        db.exec_batch(SCHEMA)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(Self { db })
    }

    // ── admins ──

    /// Seed an account. Returns false when the email is already taken.
    pub fn insert_admin_if_absent(&self, admin: &AdminAccount) -> Result<bool, ServiceError> {
        let data = to_json(admin)?;
        let affected = self
            .db
            .exec(
                "INSERT OR IGNORE INTO admins (id, email, data) VALUES (?1, ?2, ?3)",
                &[
                    Value::Text(admin.id.clone()),
                    Value::Text(admin.email.clone()),
                    Value::Text(data),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(affected > 0)
    }

    pub fn get_admin(&self, id: &str) -> Result<Option<AdminAccount>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM admins WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.first().map(from_row).transpose()
    }

    pub fn get_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM admins WHERE email = ?1",
                &[Value::Text(email.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.first().map(from_row).transpose()
    }

    // ── sessions ──

    pub fn insert_session(&self, session: &Session) -> Result<(), ServiceError> {
        let data = to_json(session)?;
        self.db
            .exec(
                "INSERT INTO sessions (id, admin_id, revoked, issued_at, data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(session.id.clone()),
                    Value::Text(session.admin_id.clone()),
                    Value::Integer(i64::from(session.revoked)),
                    Value::Text(session.issued_at.clone()),
                    Value::Text(data),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_session(&self, id: &str) -> Result<Session, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM sessions WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("session {id}")))?;
        from_row(row)
    }

    pub fn revoke_session(&self, id: &str) -> Result<(), ServiceError> {
        let mut session = self.get_session(id)?;
        session.revoked = true;
        let data = to_json(&session)?;
        self.db
            .exec(
                "UPDATE sessions SET revoked = 1, data = ?1 WHERE id = ?2",
                &[Value::Text(data), Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }
}
