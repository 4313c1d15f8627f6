use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use labkom_core::parse_date;

// ---------------------------------------------------------------------------
// Access types
// ---------------------------------------------------------------------------

/// Access type for requests served through the network license server.
pub const ACCESS_SERVER_LICENSE: &str = "Akses Lisensi Server";
/// Access type for cloud or borrowed licenses used outside the lab.
pub const ACCESS_CLOUD_LICENSE: &str = "Lisensi / Cloud";

/// Whether an access type requires server credentials on approval.
pub fn is_server_license(access_type: &str) -> bool {
    access_type == ACCESS_SERVER_LICENSE
}

/// Prodi value marking an external (non-campus) requester.
pub const PRODI_NON_UGM: &str = "Non-UGM";

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of an access request.
///
/// ```text
/// PENDING → ACTIVE → REVOKED
///         → REJECTED
/// ```
///
/// EXPIRED is never stored: an ACTIVE request whose expiration date has
/// passed is presented as EXPIRED on read and stays ACTIVE in the table
/// until an admin revokes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Active,
    Expired,
    Rejected,
    Revoked,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::Rejected => "REJECTED",
            Self::Revoked => "REVOKED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "ACTIVE" => Some(Self::Active),
            "EXPIRED" => Some(Self::Expired),
            "REJECTED" => Some(Self::Rejected),
            "REVOKED" => Some(Self::Revoked),
            _ => None,
        }
    }

    /// Whether the request can never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Revoked)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ComputerStatus
// ---------------------------------------------------------------------------

/// Inventory state of a lab computer.
///
/// ```text
/// AVAILABLE → ASSIGNED → MAINTENANCE → AVAILABLE
/// ```
///
/// MAINTENANCE is only cleared by completing the maintenance checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputerStatus {
    Available,
    Assigned,
    Maintenance,
}

impl ComputerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Assigned => "ASSIGNED",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "AVAILABLE" => Some(Self::Available),
            "ASSIGNED" => Some(Self::Assigned),
            "MAINTENANCE" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComputerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

/// State of an open maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    InMaintenance,
    PendingRepair,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InMaintenance => "IN_MAINTENANCE",
            Self::PendingRepair => "PENDING_REPAIR",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "IN_MAINTENANCE" => Some(Self::InMaintenance),
            "PENDING_REPAIR" => Some(Self::PendingRepair),
            _ => None,
        }
    }

    /// Label shown on the maintenance worklist.
    pub fn display(&self) -> &'static str {
        match self {
            Self::InMaintenance => "In Maintenance",
            Self::PendingRepair => "Pending Repair",
        }
    }
}

/// What a maintenance task is about: a physical computer, or a license
/// seat that needs manual cleanup on the vendor side after a revoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaintenanceTarget {
    #[serde(rename = "PC")]
    Computer { name: String },
    License {
        #[serde(rename = "requestId")]
        request_id: String,
    },
}

impl MaintenanceTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Computer { .. } => "PC",
            Self::License { .. } => "License",
        }
    }

    pub fn target_name(&self) -> &str {
        match self {
            Self::Computer { name } => name,
            Self::License { request_id } => request_id,
        }
    }
}

/// Checklist boxes ticked while servicing a computer or license seat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceChecklist {
    #[serde(default)]
    pub check_storage: bool,
    #[serde(default)]
    pub check_junk: bool,
    #[serde(default)]
    pub check_anydesk: bool,
}

/// An open maintenance task. Created when a computer leaves service or a
/// license-bearing request is revoked; deleted when the checklist completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTask {
    pub id: String,
    pub target: MaintenanceTarget,
    pub status: MaintenanceStatus,
    /// Requester the resource was last given to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_user: Option<String>,
    /// Request that put the resource into maintenance.
    pub request_id: String,
    #[serde(default)]
    pub checklist: MaintenanceChecklist,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Free-space reading or license-key note from the technician.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    pub opened_at: String,
    pub updated_at: String,
}

impl MaintenanceTask {
    /// Days since the task was opened, relative to `today`.
    pub fn age_in_days(&self, today: NaiveDate) -> i64 {
        self.opened_at
            .get(..10)
            .and_then(parse_date)
            .map(|d| (today - d).num_days().max(0))
            .unwrap_or(0)
    }
}

/// Row on the admin maintenance worklist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRow {
    pub task_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub target_name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_user: Option<String>,
    pub request_id: String,
    pub last_maintenance: String,
    pub days_ago: i64,
    pub checklist: MaintenanceChecklist,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

// ---------------------------------------------------------------------------
// Supporting document
// ---------------------------------------------------------------------------

/// How the requester backed up their submission.
///
/// MISSING appears only when the request row was created but the uploaded
/// file could not be persisted afterwards; such requests stay visible to
/// admins for manual follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportingDocument {
    Upload {
        #[serde(rename = "blobKey")]
        blob_key: String,
        #[serde(rename = "fileName")]
        file_name: String,
    },
    Link { url: String },
    Missing,
}

impl SupportingDocument {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

// ---------------------------------------------------------------------------
// Request — the core data model
// ---------------------------------------------------------------------------

/// Server-side login for network-license access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCredentials {
    pub computer_user_name: String,
    pub computer_hostname: String,
}

/// A software/computer access request.
///
/// Stored as a JSON blob with status, nim, nama, created_at and
/// expiration_date mirrored into indexed SQL columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub request_id: String,

    // --- requester identity ---
    pub nama: String,
    pub nim: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Campus mail; optional for external requesters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_ugm: Option<String>,
    /// Study program, or the literal `"Non-UGM"` for externals.
    pub prodi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universitas: Option<String>,
    pub dosen_pembimbing: String,

    // --- what is being requested ---
    pub keperluan: String,
    pub topik: String,
    pub software: Vec<String>,
    /// Derived at submission from the rule engine and the room choice.
    pub access_type: String,
    #[serde(default)]
    pub needs_computer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_computer: Option<String>,

    // --- usage window ---
    /// Start date, `YYYY-MM-DD`.
    pub mulai: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub akhir: Option<String>,

    pub supporting_document: SupportingDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catatan: Option<String>,

    // --- lifecycle ---
    pub status: RequestStatus,
    /// Set on approval, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_key: Option<String>,
    /// Present iff access type is the server license.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_credentials: Option<ServerCredentials>,
    /// Computer claimed for this request while it is ACTIVE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_computer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,

    // --- timestamps ---
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
}

impl Request {
    /// True when the stored status is ACTIVE but the expiration date has passed.
    pub fn is_past_expiration(&self, today: NaiveDate) -> bool {
        self.status == RequestStatus::Active
            && self
                .expiration_date
                .as_deref()
                .and_then(parse_date)
                .map(|d| d < today)
                .unwrap_or(false)
    }

    /// Status as presented to admins: ACTIVE past its expiration shows as EXPIRED.
    pub fn effective_status(&self, today: NaiveDate) -> RequestStatus {
        if self.is_past_expiration(today) {
            RequestStatus::Expired
        } else {
            self.status
        }
    }

    /// Copy of the request with the presented status materialized.
    pub fn into_view(mut self, today: NaiveDate) -> Request {
        self.status = self.effective_status(today);
        self
    }
}

// ---------------------------------------------------------------------------
// Computer
// ---------------------------------------------------------------------------

/// A lab computer in the inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Computer {
    /// Unique inventory name, e.g. `"PC-KOMPUTASI-01"`.
    pub name: String,
    /// Room the computer sits in.
    pub location: String,
    #[serde(default)]
    pub installed_software: Vec<String>,
    pub status: ComputerStatus,
    /// Remote-desktop identity handed to approved requesters.
    #[serde(default)]
    pub remote_access_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_access_password: Option<String>,
    /// Retained through MAINTENANCE so the worklist can show the last user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_assigned_request_id: Option<String>,
}

/// Public availability listing: no credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerPublic {
    pub name: String,
    pub location: String,
    pub software_installed: Vec<String>,
}

impl From<&Computer> for ComputerPublic {
    fn from(c: &Computer) -> Self {
        Self {
            name: c.name.clone(),
            location: c.location.clone(),
            software_installed: c.installed_software.clone(),
        }
    }
}

/// Assignment details returned to the approving admin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedComputer {
    pub name: String,
    pub remote_access_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_access_password: Option<String>,
}

/// What the approving admin gets back: the activated request plus the
/// claimed computer's remote credentials, when one was assigned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalOutcome {
    pub request: Request,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computer: Option<AssignedComputer>,
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// Post-usage questionnaire, one per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub request_id: String,
    pub komputer: i64,
    pub fasilitas: i64,
    pub kebersihan: i64,
    pub administrasi: i64,
    pub software: i64,
    pub web_portal: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saran: Option<String>,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Dashboard stats
// ---------------------------------------------------------------------------

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub pending: i64,
    /// ACTIVE requests still inside their window.
    pub active_users: i64,
    /// ACTIVE requests past expiration, awaiting revocation.
    pub to_revoke: i64,
    pub lab_maintenance: i64,
    pub lab_used: i64,
    pub lab_total: i64,
}

// ---------------------------------------------------------------------------
// API request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /submit-request` (JSON directly, or the `payload` field
/// of the multipart form when a file is attached).
///
/// Every field defaults so the validation pipeline reports the missing
/// field by name instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestBody {
    #[serde(default)]
    pub nama: String,
    #[serde(default)]
    pub nim: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email_ugm: Option<String>,
    #[serde(default)]
    pub prodi: String,
    #[serde(default)]
    pub universitas: Option<String>,
    #[serde(default)]
    pub dosen_pembimbing: String,
    #[serde(default)]
    pub keperluan: String,
    #[serde(default)]
    pub topik: String,
    #[serde(default)]
    pub software: Vec<String>,
    #[serde(default)]
    pub needs_computer: bool,
    #[serde(default)]
    pub room_preference: Option<String>,
    #[serde(default)]
    pub preferred_computer: Option<String>,
    #[serde(default)]
    pub mulai: String,
    #[serde(default)]
    pub akhir: Option<String>,
    #[serde(default)]
    pub catatan: Option<String>,
    /// `"upload"` or `"link"`.
    #[serde(default)]
    pub upload_method: Option<String>,
    #[serde(default)]
    pub link_surat: Option<String>,
}

/// File part of a multipart submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// What the submitter gets back.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub request_id: String,
    pub access_type: String,
    /// False when the request row exists but the upload failed to persist.
    pub document_stored: bool,
}

/// Body for `POST /check-restrictions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRestrictionsBody {
    #[serde(default)]
    pub software: Vec<String>,
    #[serde(default)]
    pub needs_computer: bool,
    #[serde(default)]
    pub room_preference: Option<String>,
}

/// Body for `POST /admin-approve`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBody {
    pub request_id: String,
    /// Override for the computed expiration, `YYYY-MM-DD`.
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub activation_key: Option<String>,
    #[serde(default)]
    pub computer_name: Option<String>,
    #[serde(default)]
    pub computer_user_name: Option<String>,
    #[serde(default)]
    pub computer_hostname: Option<String>,
}

/// Body for `POST /admin-reject`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectBody {
    pub request_id: String,
    #[serde(default)]
    pub reason: String,
}

/// Body for `POST /admin-revoke`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeBody {
    pub request_id: String,
}

/// Body for `POST /admin-maintenance-update`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceProgressBody {
    pub task_id: String,
    #[serde(default)]
    pub issues: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub checklist: MaintenanceChecklist,
}

/// Body for `POST /admin-maintenance-complete` and
/// `POST /admin-license-cleanup`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceCompleteBody {
    pub task_id: String,
    #[serde(default)]
    pub checklist: MaintenanceChecklist,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
}

/// Body for `POST /submit-quisioner`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuisionerBody {
    pub request_id: String,
    #[serde(default)]
    pub komputer: i64,
    #[serde(default)]
    pub fasilitas: i64,
    #[serde(default)]
    pub kebersihan: i64,
    #[serde(default)]
    pub administrasi: i64,
    #[serde(default)]
    pub software: i64,
    #[serde(default)]
    pub web_portal: i64,
    #[serde(default)]
    pub saran: Option<String>,
}

/// Query for `GET /initial-data`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialDataQuery {
    /// Prior request whose fields should prefill the form.
    #[serde(default)]
    pub renewal_id: Option<String>,
}

/// Query for `GET /computers-available`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableQuery {
    #[serde(default)]
    pub room: Option<String>,
}

/// Query for `GET /admin-requests`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilterQuery {
    /// Case-insensitive match against nama, request id and NIM.
    #[serde(default)]
    pub filter: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> Request {
        Request {
            request_id: "req1".into(),
            nama: "Budi Santoso".into(),
            nim: "21/480001/TK/52801".into(),
            email: "budi@mail.test".into(),
            phone: "0812000".into(),
            email_ugm: None,
            prodi: "Teknik Sipil".into(),
            universitas: None,
            dosen_pembimbing: "Dr. Rahmat".into(),
            keperluan: "Tugas Akhir".into(),
            topik: "Analisis struktur".into(),
            software: vec!["SAP2000".into()],
            access_type: "Ruang Komputasi".into(),
            needs_computer: true,
            room_preference: Some("Ruang Komputasi".into()),
            preferred_computer: None,
            mulai: "2026-03-02".into(),
            akhir: None,
            supporting_document: SupportingDocument::Link {
                url: "https://drive.test/surat".into(),
            },
            catatan: None,
            status: RequestStatus::Pending,
            expiration_date: None,
            admin_notes: None,
            activation_key: None,
            server_credentials: None,
            assigned_computer: None,
            reject_reason: None,
            created_at: "2026-03-01T08:00:00Z".into(),
            updated_at: "2026-03-01T08:00:00Z".into(),
            approved_at: None,
        }
    }

    #[test]
    fn request_status_roundtrip() {
        for s in &[
            RequestStatus::Pending,
            RequestStatus::Active,
            RequestStatus::Expired,
            RequestStatus::Rejected,
            RequestStatus::Revoked,
        ] {
            let json = serde_json::to_string(s).unwrap();
            let back: RequestStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*s, back);
            assert_eq!(RequestStatus::from_str(s.as_str()), Some(*s));
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::Active.is_terminal());
        assert!(!RequestStatus::Expired.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Revoked.is_terminal());
    }

    #[test]
    fn request_json_roundtrip() {
        let req = base_request();
        let json = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(back.request_id, "req1");
        assert_eq!(back.status, RequestStatus::Pending);
        assert_eq!(back.software, vec!["SAP2000".to_string()]);
        // None fields stay out of the JSON
        assert!(!json.contains("\"rejectReason\""));
        assert!(!json.contains("\"expirationDate\""));
        assert!(json.contains("\"accessType\":\"Ruang Komputasi\""));
    }

    #[test]
    fn effective_status_materializes_expired() {
        let mut req = base_request();
        req.status = RequestStatus::Active;
        req.expiration_date = Some("2026-03-10".into());

        let before = parse_date("2026-03-10").unwrap();
        let after = parse_date("2026-03-11").unwrap();
        // expiration day itself still counts as active
        assert_eq!(req.effective_status(before), RequestStatus::Active);
        assert_eq!(req.effective_status(after), RequestStatus::Expired);
        assert!(req.is_past_expiration(after));

        // only ACTIVE requests expire
        req.status = RequestStatus::Revoked;
        assert_eq!(req.effective_status(after), RequestStatus::Revoked);
    }

    #[test]
    fn supporting_document_tags() {
        let up = SupportingDocument::Upload {
            blob_key: "surat/req1.pdf".into(),
            file_name: "surat.pdf".into(),
        };
        let json = serde_json::to_string(&up).unwrap();
        assert!(json.contains("\"kind\":\"UPLOAD\""));
        assert!(json.contains("\"blobKey\":\"surat/req1.pdf\""));

        let missing: SupportingDocument =
            serde_json::from_str(r#"{"kind":"MISSING"}"#).unwrap();
        assert!(missing.is_missing());
    }

    #[test]
    fn maintenance_target_tags() {
        let pc = MaintenanceTarget::Computer {
            name: "PC-KOMPUTASI-01".into(),
        };
        let json = serde_json::to_string(&pc).unwrap();
        assert!(json.contains("\"type\":\"PC\""));
        assert_eq!(pc.kind(), "PC");
        assert_eq!(pc.target_name(), "PC-KOMPUTASI-01");

        let lic: MaintenanceTarget =
            serde_json::from_str(r#"{"type":"License","requestId":"req9"}"#).unwrap();
        assert_eq!(lic.kind(), "License");
        assert_eq!(lic.target_name(), "req9");
    }

    #[test]
    fn maintenance_task_age() {
        let task = MaintenanceTask {
            id: "m1".into(),
            target: MaintenanceTarget::Computer {
                name: "PC-01".into(),
            },
            status: MaintenanceStatus::InMaintenance,
            last_user: Some("Budi".into()),
            request_id: "req1".into(),
            checklist: MaintenanceChecklist::default(),
            issues: None,
            notes: None,
            storage: None,
            opened_at: "2026-03-01T08:00:00Z".into(),
            updated_at: "2026-03-01T08:00:00Z".into(),
        };
        assert_eq!(task.age_in_days(parse_date("2026-03-04").unwrap()), 3);
        assert_eq!(task.age_in_days(parse_date("2026-03-01").unwrap()), 0);
    }

    #[test]
    fn submit_body_minimal_deserialize() {
        let body: SubmitRequestBody = serde_json::from_str(r#"{"nama":"Budi"}"#).unwrap();
        assert_eq!(body.nama, "Budi");
        assert!(body.nim.is_empty());
        assert!(body.software.is_empty());
        assert!(!body.needs_computer);
    }

    #[test]
    fn computer_public_hides_credentials() {
        let c = Computer {
            name: "PC-01".into(),
            location: "Ruang Komputasi".into(),
            installed_software: vec!["SAP2000".into()],
            status: ComputerStatus::Available,
            remote_access_id: "123456".into(),
            remote_access_password: Some("secret".into()),
            last_assigned_request_id: None,
        };
        let json = serde_json::to_string(&ComputerPublic::from(&c)).unwrap();
        assert!(json.contains("\"softwareInstalled\""));
        assert!(!json.contains("secret"));
        assert!(!json.contains("remoteAccess"));
    }
}
