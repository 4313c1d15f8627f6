//! Room agenda entries.

use serde::{Deserialize, Serialize};

/// A scheduled activity in one of the lab rooms. Independent of the
/// request lifecycle; used for room planning and reminder broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agenda {
    pub id: String,
    pub room: String,
    pub activity: String,
    /// `YYYY-MM-DD`.
    pub start: String,
    /// `YYYY-MM-DD`, never before `start`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body for `POST /admin-save-agenda`. Without `id` a new entry is
/// created; with `id` the existing entry is rewritten.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAgendaBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for `POST /admin-delete-agenda` and
/// `POST /admin-broadcast-agenda`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaIdBody {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agenda_serializes_camel_case() {
        let agenda = Agenda {
            id: "ag1".into(),
            room: "Ruang Komputasi".into(),
            activity: "Pelatihan SAP2000".into(),
            start: "2026-09-01".into(),
            end: None,
            description: None,
            created_at: "2026-08-01T00:00:00Z".into(),
            updated_at: "2026-08-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&agenda).unwrap();
        assert_eq!(json["createdAt"], "2026-08-01T00:00:00Z");
        assert!(json.get("end").is_none());
    }

    #[test]
    fn save_body_tolerates_missing_fields() {
        let body: SaveAgendaBody = serde_json::from_str("{}").unwrap();
        assert!(body.id.is_none());
        assert!(body.room.is_empty());
    }
}
