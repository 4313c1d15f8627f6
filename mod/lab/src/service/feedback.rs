//! End-of-usage questionnaire. One per request, ratings 1..=5.

use tracing::info;

use labkom_core::{ServiceError, new_id, now_rfc3339};

use crate::model::{Feedback, QuisionerBody};

use super::LabService;

fn rating(field: &str, value: i64) -> Result<i64, ServiceError> {
    if !(1..=5).contains(&value) {
        return Err(ServiceError::Validation(format!(
            "{field} rating must be between 1 and 5"
        )));
    }
    Ok(value)
}

impl LabService {
    pub fn submit_quisioner(&self, body: QuisionerBody) -> Result<(), ServiceError> {
        let feedback = Feedback {
            id: new_id(),
            request_id: body.request_id.trim().to_string(),
            komputer: rating("komputer", body.komputer)?,
            fasilitas: rating("fasilitas", body.fasilitas)?,
            kebersihan: rating("kebersihan", body.kebersihan)?,
            administrasi: rating("administrasi", body.administrasi)?,
            software: rating("software", body.software)?,
            web_portal: rating("webPortal", body.web_portal)?,
            saran: body.saran.filter(|s| !s.trim().is_empty()),
            created_at: now_rfc3339(),
        };

        // the questionnaire is public, so an unknown id is a caller mistake
        if self.store.get_request(&feedback.request_id).is_err() {
            return Err(ServiceError::Validation(format!(
                "requestId {} is not a known request",
                feedback.request_id
            )));
        }

        self.store.insert_feedback(&feedback)?;
        info!(request_id = %feedback.request_id, "quisioner submitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testkit::{service, valid_submission};

    fn filled(request_id: &str) -> QuisionerBody {
        QuisionerBody {
            request_id: request_id.to_string(),
            komputer: 4,
            fasilitas: 5,
            kebersihan: 4,
            administrasi: 5,
            software: 3,
            web_portal: 4,
            saran: Some("tambah colokan listrik".into()),
        }
    }

    #[test]
    fn ratings_must_be_in_range() {
        let (svc, _kv, _blob) = service();
        let receipt = svc.submit_request(valid_submission(), None).unwrap();

        let mut body = filled(&receipt.request_id);
        body.kebersihan = 0;
        match svc.submit_quisioner(body) {
            Err(ServiceError::Validation(msg)) => assert!(msg.starts_with("kebersihan")),
            other => panic!("expected validation error, got {other:?}"),
        }

        let mut body = filled(&receipt.request_id);
        body.web_portal = 6;
        assert!(svc.submit_quisioner(body).is_err());
    }

    #[test]
    fn unknown_request_is_rejected() {
        let (svc, _kv, _blob) = service();
        assert!(matches!(
            svc.submit_quisioner(filled("does-not-exist")),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn second_submission_for_a_request_conflicts() {
        let (svc, _kv, _blob) = service();
        let receipt = svc.submit_request(valid_submission(), None).unwrap();

        svc.submit_quisioner(filled(&receipt.request_id)).unwrap();
        assert!(matches!(
            svc.submit_quisioner(filled(&receipt.request_id)),
            Err(ServiceError::Conflict(_))
        ));
    }
}
