//! SQL persistence for requests, computers, maintenance tasks and
//! questionnaire feedback.
//!
//! Records are stored as a JSON `data` column with the fields that queries
//! and compare-and-swap transitions touch mirrored into indexed columns.
//! Zero affected rows on a guarded UPDATE means the precondition no longer
//! held; callers turn that into a conflict.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

use labkom_core::{ServiceError, format_date};
use labkom_sql::{Row, SQLStore, Value};

use crate::model::{
    Computer, ComputerStatus, Feedback, MaintenanceTask, Request, RequestStatus,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS requests (
    id TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    nim TEXT NOT NULL,
    nama TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expiration_date TEXT,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_requests_status ON requests(status);
CREATE INDEX IF NOT EXISTS idx_requests_nim ON requests(nim);

CREATE TABLE IF NOT EXISTS computers (
    name TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    location TEXT NOT NULL,
    last_assigned_request_id TEXT,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_computers_status ON computers(status);

CREATE TABLE IF NOT EXISTS maintenance_tasks (
    id TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    target_kind TEXT NOT NULL,
    target_name TEXT NOT NULL,
    opened_at TEXT NOT NULL,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS feedback (
    id TEXT PRIMARY KEY,
    request_id TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    data TEXT NOT NULL
);
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

fn opt_text(v: Option<&str>) -> Value {
    match v {
        Some(s) => Value::Text(s.to_string()),
        None => Value::Null,
    }
}

pub struct LabStore {
    db: Arc<dyn SQLStore>,
}

impl LabStore {
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        db.exec_batch(SCHEMA)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(Self { db })
    }

    // ── requests ──

    pub fn insert_request(&self, req: &Request) -> Result<(), ServiceError> {
        let data = to_json(req)?;
        self.db
            .exec(
                "INSERT INTO requests (id, status, nim, nama, created_at, expiration_date, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                &[
                    Value::Text(req.request_id.clone()),
                    Value::Text(req.status.as_str().to_string()),
                    Value::Text(req.nim.clone()),
                    Value::Text(req.nama.clone()),
                    Value::Text(req.created_at.clone()),
                    opt_text(req.expiration_date.as_deref()),
                    Value::Text(data),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_request(&self, id: &str) -> Result<Request, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM requests WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("request {id}")))?;
        from_row(row)
    }

    /// Unconditional rewrite, used for non-lifecycle fixups such as
    /// attaching the supporting document after the row exists.
    pub fn update_request(&self, req: &Request) -> Result<(), ServiceError> {
        let data = to_json(req)?;
        let affected = self
            .db
            .exec(
                "UPDATE requests SET status = ?1, expiration_date = ?2, data = ?3 WHERE id = ?4",
                &[
                    Value::Text(req.status.as_str().to_string()),
                    opt_text(req.expiration_date.as_deref()),
                    Value::Text(data),
                    Value::Text(req.request_id.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("request {}", req.request_id)));
        }
        Ok(())
    }

    /// Compare-and-swap lifecycle transition. `req` carries the new state;
    /// the row is only rewritten while its stored status is `expected`.
    /// Returns false when the status moved underneath the caller.
    pub fn transition_request(
        &self,
        req: &Request,
        expected: RequestStatus,
    ) -> Result<bool, ServiceError> {
        let data = to_json(req)?;
        let affected = self
            .db
            .exec(
                "UPDATE requests SET status = ?1, expiration_date = ?2, data = ?3
                 WHERE id = ?4 AND status = ?5",
                &[
                    Value::Text(req.status.as_str().to_string()),
                    opt_text(req.expiration_date.as_deref()),
                    Value::Text(data),
                    Value::Text(req.request_id.clone()),
                    Value::Text(expected.as_str().to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(affected > 0)
    }

    /// Newest first; optional case-insensitive filter over nama, id and NIM.
    pub fn list_requests(&self, filter: Option<&str>) -> Result<Vec<Request>, ServiceError> {
        let (sql, params): (&str, Vec<Value>) = match filter.map(str::trim).filter(|f| !f.is_empty())
        {
            Some(f) => (
                "SELECT data FROM requests
                 WHERE lower(nama) LIKE ?1 OR lower(id) LIKE ?1 OR lower(nim) LIKE ?1
                 ORDER BY created_at DESC",
                vec![Value::Text(format!("%{}%", f.to_lowercase()))],
            ),
            None => ("SELECT data FROM requests ORDER BY created_at DESC", vec![]),
        };
        let rows = self
            .db
            .query(sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(from_row).collect()
    }

    pub fn list_requests_by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<Request>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM requests WHERE status = ?1 ORDER BY created_at DESC",
                &[Value::Text(status.as_str().to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(from_row).collect()
    }

    pub fn count_requests_by_status(&self, status: RequestStatus) -> Result<i64, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT COUNT(*) AS n FROM requests WHERE status = ?1",
                &[Value::Text(status.as_str().to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("n")).unwrap_or(0))
    }

    /// ACTIVE requests whose expiration date lies strictly before `today`.
    /// Dates are `YYYY-MM-DD`, so string comparison orders correctly.
    pub fn expired_active(&self, today: NaiveDate) -> Result<Vec<Request>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM requests
                 WHERE status = 'ACTIVE' AND expiration_date IS NOT NULL AND expiration_date < ?1
                 ORDER BY expiration_date ASC",
                &[Value::Text(format_date(today))],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(from_row).collect()
    }

    pub fn count_expired_active(&self, today: NaiveDate) -> Result<i64, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT COUNT(*) AS n FROM requests
                 WHERE status = 'ACTIVE' AND expiration_date IS NOT NULL AND expiration_date < ?1",
                &[Value::Text(format_date(today))],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("n")).unwrap_or(0))
    }

    // ── computers ──

    /// Inventory sync: keeps existing rows (and their live status) untouched.
    pub fn insert_computer_if_absent(&self, c: &Computer) -> Result<bool, ServiceError> {
        let data = to_json(c)?;
        let affected = self
            .db
            .exec(
                "INSERT OR IGNORE INTO computers (name, status, location, last_assigned_request_id, data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(c.name.clone()),
                    Value::Text(c.status.as_str().to_string()),
                    Value::Text(c.location.clone()),
                    opt_text(c.last_assigned_request_id.as_deref()),
                    Value::Text(data),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(affected > 0)
    }

    pub fn get_computer(&self, name: &str) -> Result<Computer, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM computers WHERE name = ?1",
                &[Value::Text(name.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("computer {name}")))?;
        from_row(row)
    }

    pub fn list_computers(
        &self,
        status: Option<ComputerStatus>,
        room: Option<&str>,
    ) -> Result<Vec<Computer>, ServiceError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();
        if let Some(status) = status {
            params.push(Value::Text(status.as_str().to_string()));
            clauses.push(format!("status = ?{}", params.len()));
        }
        if let Some(room) = room.map(str::trim).filter(|r| !r.is_empty()) {
            params.push(Value::Text(room.to_string()));
            clauses.push(format!("location = ?{}", params.len()));
        }
        let mut sql = "SELECT data FROM computers".to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY name ASC");
        let rows = self
            .db
            .query(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(from_row).collect()
    }

    pub fn count_computers(&self) -> Result<i64, ServiceError> {
        let rows = self
            .db
            .query("SELECT COUNT(*) AS n FROM computers", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("n")).unwrap_or(0))
    }

    pub fn count_computers_by_status(&self, status: ComputerStatus) -> Result<i64, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT COUNT(*) AS n FROM computers WHERE status = ?1",
                &[Value::Text(status.as_str().to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("n")).unwrap_or(0))
    }

    /// Compare-and-swap on the computer status. `c` carries the new state;
    /// the row is only rewritten while its stored status is `expected`.
    pub fn swap_computer(
        &self,
        c: &Computer,
        expected: ComputerStatus,
    ) -> Result<bool, ServiceError> {
        let data = to_json(c)?;
        let affected = self
            .db
            .exec(
                "UPDATE computers SET status = ?1, last_assigned_request_id = ?2, data = ?3
                 WHERE name = ?4 AND status = ?5",
                &[
                    Value::Text(c.status.as_str().to_string()),
                    opt_text(c.last_assigned_request_id.as_deref()),
                    Value::Text(data),
                    Value::Text(c.name.clone()),
                    Value::Text(expected.as_str().to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(affected > 0)
    }

    // ── maintenance tasks ──

    pub fn insert_maintenance_task(&self, task: &MaintenanceTask) -> Result<(), ServiceError> {
        let data = to_json(task)?;
        self.db
            .exec(
                "INSERT INTO maintenance_tasks (id, status, target_kind, target_name, opened_at, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                &[
                    Value::Text(task.id.clone()),
                    Value::Text(task.status.as_str().to_string()),
                    Value::Text(task.target.kind().to_string()),
                    Value::Text(task.target.target_name().to_string()),
                    Value::Text(task.opened_at.clone()),
                    Value::Text(data),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_maintenance_task(&self, id: &str) -> Result<MaintenanceTask, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM maintenance_tasks WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("maintenance task {id}")))?;
        from_row(row)
    }

    /// Oldest first, matching how technicians work the list down.
    pub fn list_maintenance_tasks(&self) -> Result<Vec<MaintenanceTask>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM maintenance_tasks ORDER BY opened_at ASC",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(from_row).collect()
    }

    pub fn update_maintenance_task(&self, task: &MaintenanceTask) -> Result<(), ServiceError> {
        let data = to_json(task)?;
        let affected = self
            .db
            .exec(
                "UPDATE maintenance_tasks SET status = ?1, data = ?2 WHERE id = ?3",
                &[
                    Value::Text(task.status.as_str().to_string()),
                    Value::Text(data),
                    Value::Text(task.id.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("maintenance task {}", task.id)));
        }
        Ok(())
    }

    /// Completion removes the task; the worklist only shows open work.
    pub fn delete_maintenance_task(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec(
                "DELETE FROM maintenance_tasks WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("maintenance task {id}")));
        }
        Ok(())
    }

    // ── feedback ──

    pub fn insert_feedback(&self, f: &Feedback) -> Result<(), ServiceError> {
        let data = to_json(f)?;
        self.db
            .exec(
                "INSERT INTO feedback (id, request_id, created_at, data)
                 VALUES (?1, ?2, ?3, ?4)",
                &[
                    Value::Text(f.id.clone()),
                    Value::Text(f.request_id.clone()),
                    Value::Text(f.created_at.clone()),
                    Value::Text(data),
                ],
            )
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE constraint") {
                    ServiceError::Conflict(format!(
                        "quisioner for request {} already submitted",
                        f.request_id
                    ))
                } else {
                    ServiceError::Storage(msg)
                }
            })?;
        Ok(())
    }
}
