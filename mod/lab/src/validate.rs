//! Authoritative submission checks.
//!
//! The pipeline is ordered and stops at the first failure; every failure
//! names the offending field so the intake form can point at it. Client
//! mirrors of these checks are advisory only.

use chrono::{Duration, NaiveDate};

use labkom_core::{ServiceError, parse_date};

use crate::model::{PRODI_NON_UGM, SubmitRequestBody, UploadedFile};
use crate::policy::Policy;
use crate::rules::SoftwareRestrictions;

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn fail(msg: impl Into<String>) -> Result<(), ServiceError> {
    Err(ServiceError::Validation(msg.into()))
}

/// Run the ordered submission checks.
pub fn validate_submission(
    body: &SubmitRequestBody,
    upload: Option<&UploadedFile>,
    dosen_list: &[String],
    policy: &Policy,
    today: NaiveDate,
) -> Result<(), ServiceError> {
    // 1. identity
    if blank(&body.nama) {
        return fail("nama is required");
    }
    if blank(&body.nim) {
        return fail("nim is required");
    }
    if blank(&body.email) {
        return fail("email is required");
    }

    // 2. purpose
    if blank(&body.keperluan) {
        return fail("keperluan is required");
    }

    // 3. affiliation
    if blank(&body.prodi) {
        return fail("prodi is required");
    }
    let external = body.prodi.trim() == PRODI_NON_UGM;
    if external && !body.universitas.as_deref().map(|s| !blank(s)).unwrap_or(false) {
        return fail("universitas is required for Non-UGM requesters");
    }

    // 4. supervisor: from the reference list, manual entry only for externals
    if blank(&body.dosen_pembimbing) {
        return fail("dosenPembimbing is required");
    }
    if !external {
        let dosen = body.dosen_pembimbing.trim();
        if !dosen_list.iter().any(|d| d == dosen) {
            return fail("dosenPembimbing must be chosen from the list");
        }
    }

    // 5. topic
    if blank(&body.topik) {
        return fail("topik is required");
    }

    // 6. software
    if !body.software.iter().any(|s| !blank(s)) {
        return fail("software: select at least one");
    }

    // 7. start date
    let Some(mulai) = parse_date(&body.mulai) else {
        return fail("mulai must be a valid date (YYYY-MM-DD)");
    };
    if mulai < today {
        return fail("mulai cannot be in the past");
    }
    if mulai > today + Duration::days(policy.max_start_ahead_days) {
        return fail(format!(
            "mulai cannot be more than {} days ahead",
            policy.max_start_ahead_days
        ));
    }

    // 8. end date
    if let Some(akhir) = body.akhir.as_deref().filter(|s| !blank(s)) {
        let Some(akhir) = parse_date(akhir) else {
            return fail("akhir must be a valid date (YYYY-MM-DD)");
        };
        if akhir < mulai {
            return fail("akhir cannot be before mulai");
        }
    }

    // 9. supporting document: exactly one of upload / link
    let link = body.link_surat.as_deref().filter(|s| !blank(s));
    match (upload, link) {
        (None, None) => {
            return fail("supportingDocument: attach a file or provide a link");
        }
        (Some(_), Some(_)) => {
            return fail("supportingDocument: provide either a file or a link, not both");
        }
        (Some(file), None) => {
            if file.bytes.is_empty() {
                return fail("upload is empty");
            }
            if file.bytes.len() > policy.max_upload_bytes {
                return fail(format!(
                    "upload exceeds the {} byte limit",
                    policy.max_upload_bytes
                ));
            }
            if !policy.extension_allowed(&file.file_name) {
                return fail(format!(
                    "upload extension must be one of: {}",
                    policy.allowed_upload_exts.join(", ")
                ));
            }
        }
        (None, Some(url)) => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return fail("linkSurat must be an http(s) URL");
            }
        }
    }

    Ok(())
}

/// Check the requester's room/computer choices against the rule summary.
///
/// Runs after the rule engine: lab-only selections must come with a
/// computer and a room, and any chosen room must be in the allowed set.
pub fn validate_against_restrictions(
    body: &SubmitRequestBody,
    restrictions: &SoftwareRestrictions,
) -> Result<(), ServiceError> {
    let room = body.room_preference.as_deref().filter(|s| !blank(s));

    if let Some(room) = room {
        if !restrictions.allowed_rooms.iter().any(|r| r == room.trim()) {
            return fail(format!(
                "roomPreference: {} is not allowed for the selected software",
                room.trim()
            ));
        }
    }

    if restrictions.requires_lab {
        if !body.needs_computer {
            return fail("selected software can only be used on a lab computer");
        }
        if room.is_none() {
            return fail("roomPreference is required for lab-only software");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dosen() -> Vec<String> {
        vec!["Dr. Rahmat".to_string(), "Prof. Sari".to_string()]
    }

    fn today() -> NaiveDate {
        parse_date("2026-03-02").unwrap()
    }

    fn valid_body() -> SubmitRequestBody {
        SubmitRequestBody {
            nama: "Budi Santoso".into(),
            nim: "21/480001/TK/52801".into(),
            email: "budi@mail.test".into(),
            phone: "0812000".into(),
            prodi: "Teknik Sipil".into(),
            dosen_pembimbing: "Dr. Rahmat".into(),
            keperluan: "Tugas Akhir".into(),
            topik: "Analisis struktur".into(),
            software: vec!["SAP2000".into()],
            mulai: "2026-03-03".into(),
            link_surat: Some("https://drive.test/surat".into()),
            ..Default::default()
        }
    }

    fn check(body: &SubmitRequestBody) -> Result<(), ServiceError> {
        validate_submission(body, None, &dosen(), &Policy::default(), today())
    }

    fn assert_fails_with(body: &SubmitRequestBody, needle: &str) {
        match check(body) {
            Err(ServiceError::Validation(msg)) => {
                assert!(msg.contains(needle), "expected {needle:?} in {msg:?}")
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn valid_submission_passes() {
        assert!(check(&valid_body()).is_ok());
    }

    #[test]
    fn first_failure_is_reported() {
        let mut body = valid_body();
        body.nama.clear();
        body.topik.clear();
        // both nama and topik are missing; the earlier step wins
        assert_fails_with(&body, "nama");
    }

    #[test]
    fn identity_fields_in_order() {
        let mut body = valid_body();
        body.nim = "  ".into();
        assert_fails_with(&body, "nim");

        let mut body = valid_body();
        body.email.clear();
        assert_fails_with(&body, "email");
    }

    #[test]
    fn keperluan_required() {
        let mut body = valid_body();
        body.keperluan.clear();
        assert_fails_with(&body, "keperluan");
    }

    #[test]
    fn non_ugm_requires_universitas() {
        let mut body = valid_body();
        body.prodi = PRODI_NON_UGM.into();
        body.universitas = None;
        assert_fails_with(&body, "universitas");

        body.universitas = Some("ITB".into());
        body.dosen_pembimbing = "Pak Joko".into(); // manual entry allowed
        assert!(check(&body).is_ok());
    }

    #[test]
    fn campus_supervisor_must_be_listed() {
        let mut body = valid_body();
        body.dosen_pembimbing = "Pak Joko".into();
        assert_fails_with(&body, "dosenPembimbing");
    }

    #[test]
    fn topik_required() {
        let mut body = valid_body();
        body.topik = " ".into();
        assert_fails_with(&body, "topik");
    }

    #[test]
    fn software_required() {
        let mut body = valid_body();
        body.software = vec!["  ".into()];
        assert_fails_with(&body, "software");
    }

    #[test]
    fn mulai_bounds() {
        let mut body = valid_body();
        body.mulai = "bukan-tanggal".into();
        assert_fails_with(&body, "mulai");

        body.mulai = "2026-03-01".into();
        assert_fails_with(&body, "past");

        body.mulai = "2026-03-10".into(); // 8 days ahead, max is 7
        assert_fails_with(&body, "days ahead");

        body.mulai = "2026-03-09".into(); // exactly 7 days ahead
        assert!(check(&body).is_ok());
    }

    #[test]
    fn akhir_not_before_mulai() {
        let mut body = valid_body();
        body.akhir = Some("2026-03-02".into());
        assert_fails_with(&body, "akhir");

        body.akhir = Some("2026-03-03".into());
        assert!(check(&body).is_ok());
    }

    #[test]
    fn document_exactly_one_source() {
        let mut body = valid_body();
        body.link_surat = None;
        assert_fails_with(&body, "supportingDocument");

        let body = valid_body();
        let file = UploadedFile {
            file_name: "surat.pdf".into(),
            bytes: vec![1, 2, 3],
        };
        let err = validate_submission(&body, Some(&file), &dosen(), &Policy::default(), today())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m.contains("not both")));
    }

    #[test]
    fn link_must_be_http() {
        let mut body = valid_body();
        body.link_surat = Some("ftp://surat".into());
        assert_fails_with(&body, "linkSurat");
    }

    #[test]
    fn upload_limits() {
        let mut body = valid_body();
        body.link_surat = None;
        let policy = Policy::default();

        let too_big = UploadedFile {
            file_name: "surat.pdf".into(),
            bytes: vec![0; policy.max_upload_bytes + 1],
        };
        let err = validate_submission(&body, Some(&too_big), &dosen(), &policy, today())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m.contains("byte limit")));

        let wrong_ext = UploadedFile {
            file_name: "macro.xlsm".into(),
            bytes: vec![1],
        };
        let err = validate_submission(&body, Some(&wrong_ext), &dosen(), &policy, today())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m.contains("extension")));

        let ok = UploadedFile {
            file_name: "surat.pdf".into(),
            bytes: vec![1],
        };
        body.upload_method = Some("upload".into());
        assert!(
            validate_submission(&body, Some(&ok), &dosen(), &policy, today()).is_ok()
        );
    }

    #[test]
    fn lab_only_needs_computer_and_room() {
        let restrictions = SoftwareRestrictions {
            requires_lab: true,
            requires_network_only: false,
            needs_borrow_key: false,
            allowed_rooms: vec!["Ruang Komputasi".into()],
        };

        let mut body = valid_body();
        body.needs_computer = false;
        let err = validate_against_restrictions(&body, &restrictions).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m.contains("lab computer")));

        body.needs_computer = true;
        body.room_preference = None;
        let err = validate_against_restrictions(&body, &restrictions).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m.contains("roomPreference")));

        body.room_preference = Some("Ruang Komputasi".into());
        assert!(validate_against_restrictions(&body, &restrictions).is_ok());
    }

    #[test]
    fn chosen_room_must_be_allowed() {
        let restrictions = SoftwareRestrictions {
            requires_lab: false,
            requires_network_only: false,
            needs_borrow_key: false,
            allowed_rooms: vec!["Ruang Komputasi".into()],
        };
        let mut body = valid_body();
        body.room_preference = Some("Ruang Pelatihan".into());
        let err = validate_against_restrictions(&body, &restrictions).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m.contains("Ruang Pelatihan")));
    }
}
