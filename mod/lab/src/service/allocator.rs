//! Computer inventory: availability listing, claim and return, inventory
//! sync from the reference file layer.

use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use serde::Deserialize;
use tracing::{debug, info, warn};

use labkom_core::ServiceError;
use labkom_kv::KVStore;

use crate::model::{AssignedComputer, Computer, ComputerPublic, ComputerStatus};

use super::LabService;

const REMOTE_PASSWORD_LEN: usize = 12;

/// Fresh remote-desktop password from the OS random source.
pub(crate) fn generate_remote_password() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(REMOTE_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Inventory entry in `reference/computers.yaml` (key `config:computers`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputerSeed {
    name: String,
    location: String,
    #[serde(default)]
    installed_software: Vec<String>,
    #[serde(default)]
    remote_access_id: String,
    #[serde(default)]
    remote_access_password: Option<String>,
}

impl LabService {
    /// AVAILABLE computers, optionally narrowed to one room. Public view,
    /// no credentials.
    pub fn available_computers(
        &self,
        room: Option<&str>,
    ) -> Result<Vec<ComputerPublic>, ServiceError> {
        let computers = self
            .store
            .list_computers(Some(ComputerStatus::Available), room)?;
        Ok(computers.iter().map(ComputerPublic::from).collect())
    }

    /// Full computer record, remote credentials included. Admin only.
    pub fn computer_details(&self, name: &str) -> Result<Computer, ServiceError> {
        self.store.get_computer(name)
    }

    /// Claim an AVAILABLE computer for a request.
    ///
    /// The swap is guarded on AVAILABLE: whatever the admin saw when they
    /// picked the machine, a concurrent claim makes this a conflict. A
    /// research-room computer with no stored remote password gets a fresh
    /// generated one as part of the claim.
    pub(crate) fn assign_computer(
        &self,
        name: &str,
        request_id: &str,
    ) -> Result<AssignedComputer, ServiceError> {
        let mut computer = self.store.get_computer(name)?;

        if computer.location == self.policy.research_room
            && computer.remote_access_password.is_none()
        {
            computer.remote_access_password = Some(generate_remote_password());
        }
        computer.status = ComputerStatus::Assigned;
        computer.last_assigned_request_id = Some(request_id.to_string());

        if !self.store.swap_computer(&computer, ComputerStatus::Available)? {
            return Err(ServiceError::Conflict(format!(
                "computer {name} is not available"
            )));
        }

        debug!(computer = %name, request_id = %request_id, "computer assigned");
        Ok(AssignedComputer {
            name: computer.name,
            remote_access_id: computer.remote_access_id,
            remote_access_password: computer.remote_access_password,
        })
    }

    /// Roll back a claim after the request transition lost its race.
    /// Best-effort: the approval already failed, nothing new to surface.
    pub(crate) fn unassign_computer(&self, name: &str, request_id: &str) {
        let mut computer = match self.store.get_computer(name) {
            Ok(c) => c,
            Err(e) => {
                warn!("computer {name} not found while rolling back a claim: {e}");
                return;
            }
        };
        if computer.status != ComputerStatus::Assigned
            || computer.last_assigned_request_id.as_deref() != Some(request_id)
        {
            return;
        }
        computer.status = ComputerStatus::Available;
        computer.last_assigned_request_id = None;
        match self.store.swap_computer(&computer, ComputerStatus::Assigned) {
            Ok(true) => {}
            Ok(false) => warn!("computer {name} moved while rolling back a claim"),
            Err(e) => warn!("computer {name} could not be rolled back: {e}"),
        }
    }

    /// Import computers from `config:computers` that the table does not
    /// know yet. Existing rows keep their live status; the file layer is
    /// the source for new machines only.
    pub(crate) fn sync_inventory(&self) -> Result<(), ServiceError> {
        let raw = match self.kv.get("config:computers") {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("config:computers absent, inventory sync skipped");
                return Ok(());
            }
            Err(e) => {
                warn!("config:computers unavailable, inventory sync skipped: {e}");
                return Ok(());
            }
        };
        let seeds: Vec<ComputerSeed> = match serde_yaml::from_slice(&raw) {
            Ok(seeds) => seeds,
            Err(e) => {
                warn!("config:computers is not valid YAML, inventory sync skipped: {e}");
                return Ok(());
            }
        };

        let mut added = 0;
        for seed in seeds {
            let computer = Computer {
                name: seed.name,
                location: seed.location,
                installed_software: seed.installed_software,
                status: ComputerStatus::Available,
                remote_access_id: seed.remote_access_id,
                remote_access_password: seed.remote_access_password,
                last_assigned_request_id: None,
            };
            if self.store.insert_computer_if_absent(&computer)? {
                added += 1;
            }
        }
        if added > 0 {
            info!("inventory sync: {added} new computers");
        }
        Ok(())
    }
}
