//! Agenda CRUD and reminder broadcast.

use std::sync::Arc;

use tracing::info;

use labkom_core::{Notifier, ServiceError, new_id, now_rfc3339, parse_date};
use labkom_sql::SQLStore;

use crate::model::{Agenda, SaveAgendaBody};
use crate::store::AgendaStore;

pub struct AgendaService {
    store: AgendaStore,
    notifier: Arc<dyn Notifier>,
}

impl AgendaService {
    pub fn new(sql: Arc<dyn SQLStore>, notifier: Arc<dyn Notifier>) -> Result<Self, ServiceError> {
        let store = AgendaStore::new(sql)?;
        Ok(Self { store, notifier })
    }

    pub fn list_agendas(&self) -> Result<Vec<Agenda>, ServiceError> {
        self.store.list()
    }

    /// Create (no id) or rewrite (with id) an agenda entry.
    pub fn save_agenda(&self, body: SaveAgendaBody) -> Result<Agenda, ServiceError> {
        let room = body.room.trim();
        if room.is_empty() {
            return Err(ServiceError::Validation("room is required".into()));
        }
        let activity = body.activity.trim();
        if activity.is_empty() {
            return Err(ServiceError::Validation("activity is required".into()));
        }
        let start = body.start.trim();
        let start_day = parse_date(start).ok_or_else(|| {
            ServiceError::Validation("start must be a valid date (YYYY-MM-DD)".into())
        })?;

        let end = body.end.as_deref().map(str::trim).filter(|s| !s.is_empty());
        if let Some(end) = end {
            let end_day = parse_date(end).ok_or_else(|| {
                ServiceError::Validation("end must be a valid date (YYYY-MM-DD)".into())
            })?;
            if end_day < start_day {
                return Err(ServiceError::Validation("end must not be before start".into()));
            }
        }

        let description = body
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        let now = now_rfc3339();

        let agenda = match body.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => {
                let mut agenda = self.store.get(id)?;
                agenda.room = room.to_string();
                agenda.activity = activity.to_string();
                agenda.start = start.to_string();
                agenda.end = end.map(String::from);
                agenda.description = description;
                agenda.updated_at = now;
                self.store.update(&agenda)?;
                agenda
            }
            None => {
                let agenda = Agenda {
                    id: new_id(),
                    room: room.to_string(),
                    activity: activity.to_string(),
                    start: start.to_string(),
                    end: end.map(String::from),
                    description,
                    created_at: now.clone(),
                    updated_at: now,
                };
                self.store.insert(&agenda)?;
                agenda
            }
        };

        info!(agenda_id = %agenda.id, room = %agenda.room, "agenda saved");
        Ok(agenda)
    }

    pub fn delete_agenda(&self, id: &str) -> Result<(), ServiceError> {
        self.store.delete(id)?;
        info!(agenda_id = %id, "agenda deleted");
        Ok(())
    }

    /// Send a reminder for one entry through the notifier seam.
    pub fn broadcast_agenda(&self, id: &str) -> Result<(), ServiceError> {
        let agenda = self.store.get(id)?;

        let subject = format!("Agenda reminder: {}", agenda.activity);
        let mut body = format!("{} — {}", agenda.room, agenda.start);
        if let Some(end) = &agenda.end {
            body.push_str(&format!(" to {end}"));
        }
        if let Some(desc) = &agenda.description {
            body.push_str(&format!("\n{desc}"));
        }
        self.notifier.notify(&subject, &body)?;

        info!(agenda_id = %id, "agenda reminder broadcast");
        Ok(())
    }
}
