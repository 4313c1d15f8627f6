//! Request lifecycle: submission, approval, rejection, revocation.
//!
//! Every transition is a compare-and-swap on the stored status. The row
//! is read, the new state is built in memory, and the guarded UPDATE only
//! lands while the precondition still holds; a lost race is a conflict,
//! never a silent overwrite.

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use labkom_core::{ServiceError, format_date, new_id, now_rfc3339, parse_date, today_utc};

use crate::model::{
    ApprovalOutcome, ApproveBody, ComputerStatus, RejectBody, Request, RequestStatus, RevokeBody,
    ServerCredentials, Stats, SubmitReceipt, SubmitRequestBody, SupportingDocument, UploadedFile,
    is_server_license,
};
use crate::policy::Policy;
use crate::rules::derive_access_type;
use crate::validate::{validate_against_restrictions, validate_submission};

use super::LabService;

/// Expiration for an approval granted on `approved_on`: the research room
/// gets the short window, everything else the default. Both windows come
/// from policy.
pub(crate) fn expiration_for(policy: &Policy, access_type: &str, approved_on: NaiveDate) -> NaiveDate {
    let days = if access_type == policy.research_room {
        policy.research_room_expire_days
    } else {
        policy.default_expire_days
    };
    approved_on + Duration::days(days)
}

impl LabService {
    /// Validate and persist a new request as PENDING.
    ///
    /// With an attached file the request row is written first and the blob
    /// second; a failed blob write leaves the row in place with the
    /// document marked missing and the receipt flags the partial failure.
    /// A link submission never touches the blob store.
    pub fn submit_request(
        &self,
        body: SubmitRequestBody,
        upload: Option<UploadedFile>,
    ) -> Result<SubmitReceipt, ServiceError> {
        let today = today_utc();
        let dosen = self.reference_list("config:dosen");
        validate_submission(&body, upload.as_ref(), &dosen, &self.policy, today)?;

        let restrictions = self.rules.restrictions(&body.software)?;
        validate_against_restrictions(&body, &restrictions)?;
        let access_type = derive_access_type(
            &restrictions,
            body.needs_computer,
            body.room_preference.as_deref(),
        );

        // trimmed, deduplicated, submission order kept
        let mut software: Vec<String> = Vec::new();
        for name in &body.software {
            let name = name.trim();
            if !name.is_empty() && !software.iter().any(|s| s == name) {
                software.push(name.to_string());
            }
        }

        let link = body.link_surat.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let document = match link {
            Some(url) => SupportingDocument::Link {
                url: url.to_string(),
            },
            None => SupportingDocument::Missing,
        };

        let now = now_rfc3339();
        let request = Request {
            request_id: new_id(),
            nama: body.nama.trim().to_string(),
            nim: body.nim.trim().to_string(),
            email: body.email.trim().to_string(),
            phone: body.phone.trim().to_string(),
            email_ugm: body.email_ugm.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
            prodi: body.prodi.trim().to_string(),
            universitas: body.universitas.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
            dosen_pembimbing: body.dosen_pembimbing.trim().to_string(),
            keperluan: body.keperluan.trim().to_string(),
            topik: body.topik.trim().to_string(),
            software,
            access_type: access_type.clone(),
            needs_computer: body.needs_computer,
            room_preference: body.room_preference.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
            preferred_computer: body.preferred_computer.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
            mulai: body.mulai.trim().to_string(),
            akhir: body.akhir.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
            supporting_document: document,
            catatan: body.catatan.clone().filter(|s| !s.trim().is_empty()),
            status: RequestStatus::Pending,
            expiration_date: None,
            admin_notes: None,
            activation_key: None,
            server_credentials: None,
            assigned_computer: None,
            reject_reason: None,
            created_at: now.clone(),
            updated_at: now,
            approved_at: None,
        };
        self.store.insert_request(&request)?;

        let mut document_stored = true;
        if let Some(file) = upload {
            document_stored = self.attach_document(&request, &file);
        }

        info!(
            request_id = %request.request_id,
            access_type = %access_type,
            "request submitted"
        );
        Ok(SubmitReceipt {
            request_id: request.request_id,
            access_type,
            document_stored,
        })
    }

    /// Persist the uploaded file and patch the request to point at it.
    /// Failure keeps the request with a missing document; admins follow up.
    fn attach_document(&self, request: &Request, file: &UploadedFile) -> bool {
        let ext = file
            .file_name
            .rsplit_once('.')
            .map(|(_, e)| e.to_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        let key = format!("surat/{}.{}", request.request_id, ext);

        if let Err(e) = self.blob.put(&key, &file.bytes) {
            warn!(
                request_id = %request.request_id,
                "supporting document could not be stored: {e}"
            );
            return false;
        }

        let mut patched = request.clone();
        patched.supporting_document = SupportingDocument::Upload {
            blob_key: key,
            file_name: file.file_name.clone(),
        };
        patched.updated_at = now_rfc3339();
        if let Err(e) = self.store.update_request(&patched) {
            warn!(
                request_id = %request.request_id,
                "supporting document stored but not linked: {e}"
            );
            return false;
        }
        true
    }

    /// PENDING → ACTIVE.
    ///
    /// A computer, when named, is claimed before the request transition;
    /// if the transition then loses the race the claim is rolled back.
    pub fn approve_request(&self, body: ApproveBody) -> Result<ApprovalOutcome, ServiceError> {
        let mut req = self.store.get_request(&body.request_id)?;
        if req.status != RequestStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "request {} is {}",
                req.request_id, req.status
            )));
        }

        if is_server_license(&req.access_type) {
            let user = body.computer_user_name.as_deref().map(str::trim).unwrap_or("");
            let host = body.computer_hostname.as_deref().map(str::trim).unwrap_or("");
            if user.is_empty() || host.is_empty() {
                return Err(ServiceError::Validation(
                    "computerUserName and computerHostname are required for server-license access"
                        .to_string(),
                ));
            }
            req.server_credentials = Some(ServerCredentials {
                computer_user_name: user.to_string(),
                computer_hostname: host.to_string(),
            });
        }

        let expiration = match body.expiration_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => parse_date(s).ok_or_else(|| {
                ServiceError::Validation(
                    "expirationDate must be a valid date (YYYY-MM-DD)".to_string(),
                )
            })?,
            None => expiration_for(&self.policy, &req.access_type, today_utc()),
        };

        let target_computer = body
            .computer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .or_else(|| {
                if req.needs_computer {
                    req.preferred_computer.clone()
                } else {
                    None
                }
            });

        let mut assigned = None;
        if let Some(name) = &target_computer {
            assigned = Some(self.assign_computer(name, &req.request_id)?);
            req.assigned_computer = Some(name.clone());
        }

        req.status = RequestStatus::Active;
        req.expiration_date = Some(format_date(expiration));
        if let Some(notes) = body.admin_notes.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            req.admin_notes = Some(notes.to_string());
        }
        if let Some(key) = body.activation_key.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            req.activation_key = Some(key.to_string());
        }
        req.approved_at = Some(now_rfc3339());
        req.updated_at = now_rfc3339();

        if !self.store.transition_request(&req, RequestStatus::Pending)? {
            if let Some(name) = &target_computer {
                self.unassign_computer(name, &req.request_id);
            }
            return Err(ServiceError::Conflict(format!(
                "request {} was already processed",
                req.request_id
            )));
        }

        info!(
            request_id = %req.request_id,
            expiration = %req.expiration_date.as_deref().unwrap_or(""),
            computer = %req.assigned_computer.as_deref().unwrap_or("-"),
            "request approved"
        );
        Ok(ApprovalOutcome {
            request: req,
            computer: assigned,
        })
    }

    /// PENDING → REJECTED. The reason is mandatory.
    pub fn reject_request(&self, body: RejectBody) -> Result<Request, ServiceError> {
        let reason = body.reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::Validation("reason is required".to_string()));
        }

        let mut req = self.store.get_request(&body.request_id)?;
        if req.status != RequestStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "request {} is {}",
                req.request_id, req.status
            )));
        }

        req.status = RequestStatus::Rejected;
        req.reject_reason = Some(reason.to_string());
        req.updated_at = now_rfc3339();

        if !self.store.transition_request(&req, RequestStatus::Pending)? {
            return Err(ServiceError::Conflict(format!(
                "request {} was already processed",
                req.request_id
            )));
        }

        info!(request_id = %req.request_id, "request rejected");
        Ok(req)
    }

    /// ACTIVE → REVOKED, including computed-EXPIRED requests.
    ///
    /// An assigned computer goes into maintenance with an open task, and a
    /// server-license grant or handed-out activation key opens a license
    /// cleanup task for the vendor side.
    pub fn revoke_request(&self, body: RevokeBody) -> Result<Request, ServiceError> {
        let mut req = self.store.get_request(&body.request_id)?;
        if req.status != RequestStatus::Active {
            return Err(ServiceError::Conflict(format!(
                "request {} is {}",
                req.request_id, req.status
            )));
        }

        req.status = RequestStatus::Revoked;
        req.updated_at = now_rfc3339();

        if !self.store.transition_request(&req, RequestStatus::Active)? {
            return Err(ServiceError::Conflict(format!(
                "request {} was already processed",
                req.request_id
            )));
        }

        if let Some(name) = req.assigned_computer.clone() {
            self.move_computer_to_maintenance(&name, &req)?;
        }
        if is_server_license(&req.access_type) || req.activation_key.is_some() {
            self.open_license_task(&req)?;
        }

        info!(request_id = %req.request_id, "request revoked");
        Ok(req)
    }

    /// The revocation worklist: ACTIVE requests past expiration, presented
    /// as EXPIRED.
    pub fn expired_usage(&self) -> Result<Vec<Request>, ServiceError> {
        let today = today_utc();
        Ok(self
            .store
            .expired_active(today)?
            .into_iter()
            .map(|r| r.into_view(today))
            .collect())
    }

    /// All requests (filtered when asked) with dashboard stats. Stats
    /// always cover the whole table, not the filtered slice.
    pub fn admin_requests(
        &self,
        filter: Option<&str>,
    ) -> Result<(Vec<Request>, Stats), ServiceError> {
        let today = today_utc();
        let requests = self
            .store
            .list_requests(filter)?
            .into_iter()
            .map(|r| r.into_view(today))
            .collect();
        let stats = self.dashboard_stats(today)?;
        Ok((requests, stats))
    }

    pub(crate) fn dashboard_stats(&self, today: NaiveDate) -> Result<Stats, ServiceError> {
        let active_total = self.store.count_requests_by_status(RequestStatus::Active)?;
        let to_revoke = self.store.count_expired_active(today)?;
        Ok(Stats {
            pending: self.store.count_requests_by_status(RequestStatus::Pending)?,
            active_users: active_total - to_revoke,
            to_revoke,
            lab_maintenance: self
                .store
                .count_computers_by_status(ComputerStatus::Maintenance)?,
            lab_used: self.store.count_computers_by_status(ComputerStatus::Assigned)?,
            lab_total: self.store.count_computers()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComputerStatus, MaintenanceTarget, RejectBody};
    use crate::service::testkit::{seed_computer, service, valid_submission};

    fn submitted(svc: &LabService) -> String {
        svc.submit_request(valid_submission(), None)
            .unwrap()
            .request_id
    }

    #[test]
    fn link_submission_is_pending_and_skips_blob() {
        let (svc, _kv, _blob) = service();
        let receipt = svc.submit_request(valid_submission(), None).unwrap();
        assert!(receipt.document_stored);

        let req = svc.store.get_request(&receipt.request_id).unwrap();
        assert_eq!(req.status, RequestStatus::Pending);
        assert_eq!(
            req.supporting_document,
            SupportingDocument::Link {
                url: "https://drive.test/surat".into()
            }
        );
        // nothing was written under the document prefix
        assert!(svc.blob.list("surat/").unwrap().is_empty());
    }

    #[test]
    fn upload_submission_lands_in_blob() {
        let (svc, _kv, _blob) = service();
        let mut body = valid_submission();
        body.link_surat = None;
        body.upload_method = Some("upload".into());

        let file = UploadedFile {
            file_name: "surat tugas.pdf".into(),
            bytes: vec![0x25, 0x50, 0x44, 0x46],
        };
        let receipt = svc.submit_request(body, Some(file)).unwrap();
        assert!(receipt.document_stored);

        let req = svc.store.get_request(&receipt.request_id).unwrap();
        match req.supporting_document {
            SupportingDocument::Upload { blob_key, .. } => {
                assert_eq!(blob_key, format!("surat/{}.pdf", receipt.request_id));
                assert!(svc.blob.exists(&blob_key).unwrap());
            }
            other => panic!("expected upload document, got {other:?}"),
        }
    }

    #[test]
    fn submission_derives_access_type() {
        let (svc, _kv, _blob) = service();

        // network-only software without a room
        let mut body = valid_submission();
        body.software = vec!["Plaxis".into()];
        let receipt = svc.submit_request(body, None).unwrap();
        assert_eq!(receipt.access_type, crate::model::ACCESS_SERVER_LICENSE);

        // lab-only software pinned to a room
        let mut body = valid_submission();
        body.software = vec!["SAP2000".into()];
        body.needs_computer = true;
        body.room_preference = Some("Ruang Komputasi".into());
        let receipt = svc.submit_request(body, None).unwrap();
        assert_eq!(receipt.access_type, "Ruang Komputasi");
    }

    #[test]
    fn lab_only_without_computer_is_rejected() {
        let (svc, _kv, _blob) = service();
        let mut body = valid_submission();
        body.software = vec!["SAP2000".into()];
        body.needs_computer = false;
        assert!(matches!(
            svc.submit_request(body, None),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn approve_sets_policy_expiration() {
        let (svc, _kv, _blob) = service();
        let id = submitted(&svc);

        let outcome = svc
            .approve_request(ApproveBody {
                request_id: id.clone(),
                ..Default::default()
            })
            .unwrap();

        let expected = expiration_for(&svc.policy, &outcome.request.access_type, today_utc());
        assert_eq!(outcome.request.status, RequestStatus::Active);
        assert_eq!(
            outcome.request.expiration_date.as_deref(),
            Some(format_date(expected).as_str())
        );
        assert!(outcome.computer.is_none());
    }

    #[test]
    fn expiration_windows_follow_policy() {
        let policy = Policy::default();
        let day = parse_date("2026-03-02").unwrap();
        assert_eq!(
            expiration_for(&policy, "Ruang Penelitian", day),
            parse_date("2026-03-16").unwrap()
        );
        assert_eq!(
            expiration_for(&policy, "Lisensi / Cloud", day),
            parse_date("2026-04-01").unwrap()
        );
    }

    #[test]
    fn server_license_approval_needs_credentials() {
        let (svc, _kv, _blob) = service();
        let mut body = valid_submission();
        body.software = vec!["Plaxis".into()];
        let id = svc.submit_request(body, None).unwrap().request_id;

        let err = svc
            .approve_request(ApproveBody {
                request_id: id.clone(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        // no transition happened
        assert_eq!(
            svc.store.get_request(&id).unwrap().status,
            RequestStatus::Pending
        );

        let outcome = svc
            .approve_request(ApproveBody {
                request_id: id,
                computer_user_name: Some("lab-user-07".into()),
                computer_hostname: Some("LICENSE-SRV-01".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(outcome.request.server_credentials.is_some());
    }

    #[test]
    fn approve_assigns_computer_once() {
        let (svc, _kv, _blob) = service();
        seed_computer(&svc, "PC-01", "Ruang Komputasi");

        let first = submitted(&svc);
        let second = submitted(&svc);

        let outcome = svc
            .approve_request(ApproveBody {
                request_id: first,
                computer_name: Some("PC-01".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(outcome.computer.unwrap().name, "PC-01");

        // the same computer cannot be handed out twice
        let err = svc
            .approve_request(ApproveBody {
                request_id: second.clone(),
                computer_name: Some("PC-01".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // the losing request is untouched
        assert_eq!(
            svc.store.get_request(&second).unwrap().status,
            RequestStatus::Pending
        );
        assert_eq!(
            svc.store.get_computer("PC-01").unwrap().status,
            ComputerStatus::Assigned
        );
    }

    #[test]
    fn double_decision_conflicts() {
        let (svc, _kv, _blob) = service();
        let id = submitted(&svc);

        svc.approve_request(ApproveBody {
            request_id: id.clone(),
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            svc.approve_request(ApproveBody {
                request_id: id.clone(),
                ..Default::default()
            }),
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            svc.reject_request(RejectBody {
                request_id: id,
                reason: "late".into()
            }),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn reject_requires_reason_and_is_terminal() {
        let (svc, _kv, _blob) = service();
        let id = submitted(&svc);

        assert!(matches!(
            svc.reject_request(RejectBody {
                request_id: id.clone(),
                reason: "  ".into()
            }),
            Err(ServiceError::Validation(_))
        ));

        let req = svc
            .reject_request(RejectBody {
                request_id: id.clone(),
                reason: "surat tidak valid".into(),
            })
            .unwrap();
        assert_eq!(req.status, RequestStatus::Rejected);
        assert_eq!(req.reject_reason.as_deref(), Some("surat tidak valid"));

        // terminal: approval afterwards conflicts
        assert!(matches!(
            svc.approve_request(ApproveBody {
                request_id: id,
                ..Default::default()
            }),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn revoke_releases_computer_into_maintenance() {
        let (svc, _kv, _blob) = service();
        seed_computer(&svc, "PC-01", "Ruang Komputasi");
        let id = submitted(&svc);

        svc.approve_request(ApproveBody {
            request_id: id.clone(),
            computer_name: Some("PC-01".into()),
            ..Default::default()
        })
        .unwrap();

        let req = svc.revoke_request(RevokeBody {
            request_id: id.clone(),
        })
        .unwrap();
        assert_eq!(req.status, RequestStatus::Revoked);

        let computer = svc.store.get_computer("PC-01").unwrap();
        assert_eq!(computer.status, ComputerStatus::Maintenance);
        // last user is kept for the worklist
        assert_eq!(computer.last_assigned_request_id.as_deref(), Some(id.as_str()));

        let tasks = svc.store.list_maintenance_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(
            tasks[0].target,
            MaintenanceTarget::Computer {
                name: "PC-01".into()
            }
        );

        // revoked is terminal
        assert!(matches!(
            svc.revoke_request(RevokeBody { request_id: id }),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn revoke_of_license_grant_opens_license_task() {
        let (svc, _kv, _blob) = service();
        let mut body = valid_submission();
        body.software = vec!["Plaxis".into()];
        let id = svc.submit_request(body, None).unwrap().request_id;

        svc.approve_request(ApproveBody {
            request_id: id.clone(),
            computer_user_name: Some("lab-user-07".into()),
            computer_hostname: Some("LICENSE-SRV-01".into()),
            ..Default::default()
        })
        .unwrap();

        svc.revoke_request(RevokeBody {
            request_id: id.clone(),
        })
        .unwrap();

        let tasks = svc.store.list_maintenance_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].target, MaintenanceTarget::License { request_id: id });
    }

    #[test]
    fn expired_usage_lists_overdue_actives() {
        let (svc, _kv, _blob) = service();
        let id = submitted(&svc);
        svc.approve_request(ApproveBody {
            request_id: id.clone(),
            ..Default::default()
        })
        .unwrap();

        // nothing overdue yet
        assert!(svc.expired_usage().unwrap().is_empty());

        // backdate the expiration
        let mut req = svc.store.get_request(&id).unwrap();
        req.expiration_date = Some("2020-01-01".into());
        svc.store.update_request(&req).unwrap();

        let overdue = svc.expired_usage().unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].status, RequestStatus::Expired);
    }

    #[test]
    fn admin_requests_filter_and_stats() {
        let (svc, _kv, _blob) = service();
        seed_computer(&svc, "PC-01", "Ruang Komputasi");

        let first = submitted(&svc);
        let mut other = valid_submission();
        other.nama = "Sari Dewi".into();
        other.nim = "22/555002/TK/53002".into();
        svc.submit_request(other, None).unwrap();

        svc.approve_request(ApproveBody {
            request_id: first,
            computer_name: Some("PC-01".into()),
            ..Default::default()
        })
        .unwrap();

        let (all, stats) = svc.admin_requests(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.active_users, 1);
        assert_eq!(stats.to_revoke, 0);
        assert_eq!(stats.lab_total, 1);
        assert_eq!(stats.lab_used, 1);
        assert_eq!(stats.lab_maintenance, 0);

        // filtering narrows the list but not the stats
        let (filtered, stats) = svc.admin_requests(Some("sari")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].nama, "Sari Dewi");
        assert_eq!(stats.pending, 1);
    }
}
