//! Read-only data behind the public intake form: reference lists, rule
//! map, branding, and the pre-submit restrictions probe.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use labkom_core::ServiceError;
use labkom_kv::KVStore;

use crate::model::{CheckRestrictionsBody, InitialDataQuery, Request};
use crate::rules::{SoftwareRestrictions, derive_access_type};

use super::LabService;

/// Everything the intake form needs on first render.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialData {
    pub prodi_list: Vec<String>,
    pub dosen_list: Vec<String>,
    pub software_list: Vec<String>,
    /// Software name to allowed access types, for client-side hints.
    pub software_rules: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement_text: Option<String>,
    /// Prior request fields when the form is opened for a renewal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal: Option<RenewalPrefill>,
}

/// Identity and request fields copied from a prior request into the form.
/// Dates and the document are deliberately not carried over.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalPrefill {
    pub nama: String,
    pub nim: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_ugm: Option<String>,
    pub prodi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universitas: Option<String>,
    pub dosen_pembimbing: String,
    pub keperluan: String,
    pub topik: String,
    pub software: Vec<String>,
}

impl From<&Request> for RenewalPrefill {
    fn from(req: &Request) -> Self {
        Self {
            nama: req.nama.clone(),
            nim: req.nim.clone(),
            email: req.email.clone(),
            phone: req.phone.clone(),
            email_ugm: req.email_ugm.clone(),
            prodi: req.prodi.clone(),
            universitas: req.universitas.clone(),
            dosen_pembimbing: req.dosen_pembimbing.clone(),
            keperluan: req.keperluan.clone(),
            topik: req.topik.clone(),
            software: req.software.clone(),
        }
    }
}

/// Site identity, overridable through `reference/branding.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branding {
    pub app_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            app_name: "Layanan Komputasi DTSL FT UGM".to_string(),
            logo: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Announcement {
    #[serde(default)]
    text: String,
}

/// What `POST /check-restrictions` reports back to the form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionsReport {
    #[serde(flatten)]
    pub restrictions: SoftwareRestrictions,
    /// Access type the current selection would be filed under.
    pub access_type: String,
}

impl LabService {
    pub fn initial_data(&self, query: InitialDataQuery) -> Result<InitialData, ServiceError> {
        let renewal = match query.renewal_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => match self.store.get_request(id) {
                Ok(req) => Some(RenewalPrefill::from(&req)),
                Err(e) => {
                    debug!("renewal prefill for {id} skipped: {e}");
                    None
                }
            },
            _ => None,
        };

        Ok(InitialData {
            prodi_list: self.reference_list("config:prodi"),
            dosen_list: self.reference_list("config:dosen"),
            software_list: self.reference_list("config:software"),
            software_rules: self.rules.rule_map().clone(),
            announcement_text: self.announcement_text(),
            renewal,
        })
    }

    fn announcement_text(&self) -> Option<String> {
        let raw = match self.kv.get("config:announcement") {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("config:announcement unavailable: {e}");
                return None;
            }
        };
        match serde_yaml::from_slice::<Announcement>(&raw) {
            Ok(a) if !a.text.trim().is_empty() => Some(a.text),
            Ok(_) => None,
            Err(e) => {
                warn!("config:announcement is not valid YAML: {e}");
                None
            }
        }
    }

    pub fn branding(&self) -> Branding {
        let raw = match self.kv.get("config:branding") {
            Ok(Some(raw)) => raw,
            Ok(None) => return Branding::default(),
            Err(e) => {
                warn!("config:branding unavailable: {e}");
                return Branding::default();
            }
        };
        match serde_yaml::from_slice(&raw) {
            Ok(branding) => branding,
            Err(e) => {
                warn!("config:branding is not valid YAML: {e}");
                Branding::default()
            }
        }
    }

    /// Evaluate the rule engine for a tentative selection, before the
    /// requester fills in the rest of the form.
    pub fn check_restrictions(
        &self,
        body: CheckRestrictionsBody,
    ) -> Result<RestrictionsReport, ServiceError> {
        let restrictions = self.rules.restrictions(&body.software)?;
        let access_type = derive_access_type(
            &restrictions,
            body.needs_computer,
            body.room_preference.as_deref(),
        );
        Ok(RestrictionsReport {
            restrictions,
            access_type,
        })
    }
}
