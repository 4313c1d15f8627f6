//! SQL persistence for agenda entries.

use std::sync::Arc;

use labkom_core::ServiceError;
use labkom_sql::{SQLStore, Value};

use crate::model::Agenda;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS agendas (
    id TEXT PRIMARY KEY,
    room TEXT NOT NULL,
    start TEXT NOT NULL,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_agendas_start ON agendas(start);
";

pub struct AgendaStore {
    db: Arc<dyn SQLStore>,
}

impl AgendaStore {
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        db.exec_batch(SCHEMA)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(Self { db })
    }

    pub fn insert(&self, agenda: &Agenda) -> Result<(), ServiceError> {
        let data = serde_json::to_string(agenda).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.db
            .exec(
                "INSERT INTO agendas (id, room, start, data) VALUES (?1, ?2, ?3, ?4)",
                &[
                    Value::Text(agenda.id.clone()),
                    Value::Text(agenda.room.clone()),
                    Value::Text(agenda.start.clone()),
                    Value::Text(data),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn update(&self, agenda: &Agenda) -> Result<(), ServiceError> {
        let data = serde_json::to_string(agenda).map_err(|e| ServiceError::Internal(e.to_string()))?;
        let affected = self
            .db
            .exec(
                "UPDATE agendas SET room = ?1, start = ?2, data = ?3 WHERE id = ?4",
                &[
                    Value::Text(agenda.room.clone()),
                    Value::Text(agenda.start.clone()),
                    Value::Text(data),
                    Value::Text(agenda.id.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("agenda {}", agenda.id)));
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Agenda, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM agendas WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("agenda {id}")))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".to_string()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// All entries, soonest first.
    pub fn list(&self) -> Result<Vec<Agenda>, ServiceError> {
        let rows = self
            .db
            .query("SELECT data FROM agendas ORDER BY start, room", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter()
            .map(|row| {
                let data = row
                    .get_str("data")
                    .ok_or_else(|| ServiceError::Internal("missing data column".to_string()))?;
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
            })
            .collect()
    }

    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec(
                "DELETE FROM agendas WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("agenda {id}")));
        }
        Ok(())
    }
}
