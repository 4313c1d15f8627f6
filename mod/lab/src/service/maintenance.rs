//! Maintenance worklist: computers coming back from revoked requests and
//! license seats waiting for vendor-side cleanup.

use tracing::{info, warn};

use labkom_core::{ServiceError, new_id, now_rfc3339, today_utc};

use crate::model::{
    ComputerStatus, MaintenanceCompleteBody, MaintenanceProgressBody, MaintenanceRow,
    MaintenanceStatus, MaintenanceTarget, MaintenanceTask, Request,
};

use super::LabService;

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl LabService {
    /// Park a just-revoked request's computer in MAINTENANCE and open a
    /// task for the technician. `last_assigned_request_id` stays on the
    /// record so the worklist can show who had the machine.
    pub(crate) fn move_computer_to_maintenance(
        &self,
        name: &str,
        req: &Request,
    ) -> Result<(), ServiceError> {
        let mut computer = self.store.get_computer(name)?;
        computer.status = ComputerStatus::Maintenance;

        if !self.store.swap_computer(&computer, ComputerStatus::Assigned)? {
            warn!("computer {name} was not assigned while revoking {}", req.request_id);
            return Ok(());
        }

        self.open_task(
            MaintenanceTarget::Computer {
                name: name.to_string(),
            },
            req,
        )
    }

    /// Open a cleanup task for the vendor side of a server license or a
    /// handed-out activation key.
    pub(crate) fn open_license_task(&self, req: &Request) -> Result<(), ServiceError> {
        self.open_task(
            MaintenanceTarget::License {
                request_id: req.request_id.clone(),
            },
            req,
        )
    }

    fn open_task(&self, target: MaintenanceTarget, req: &Request) -> Result<(), ServiceError> {
        let now = now_rfc3339();
        let task = MaintenanceTask {
            id: new_id(),
            target,
            status: MaintenanceStatus::InMaintenance,
            last_user: Some(req.nama.clone()),
            request_id: req.request_id.clone(),
            checklist: Default::default(),
            issues: None,
            notes: None,
            storage: None,
            opened_at: now.clone(),
            updated_at: now,
        };
        self.store.insert_maintenance_task(&task)?;
        info!(
            task_id = %task.id,
            target = %task.target.target_name(),
            "maintenance task opened"
        );
        Ok(())
    }

    /// The worklist, oldest task first.
    pub fn maintenance_list(&self) -> Result<Vec<MaintenanceRow>, ServiceError> {
        let today = today_utc();
        let tasks = self.store.list_maintenance_tasks()?;
        Ok(tasks
            .into_iter()
            .map(|t| MaintenanceRow {
                task_id: t.id.clone(),
                kind: t.target.kind().to_string(),
                target_name: t.target.target_name().to_string(),
                status: t.status.display().to_string(),
                last_user: t.last_user.clone(),
                request_id: t.request_id.clone(),
                last_maintenance: t.opened_at.get(..10).unwrap_or(&t.opened_at).to_string(),
                days_ago: t.age_in_days(today),
                checklist: t.checklist,
                issues: t.issues.clone(),
                notes: t.notes.clone(),
                storage: t.storage,
            })
            .collect())
    }

    /// Record partial progress on a task and flag it PENDING_REPAIR.
    /// The underlying computer stays parked until the checklist completes.
    pub fn maintenance_progress(
        &self,
        body: MaintenanceProgressBody,
    ) -> Result<(), ServiceError> {
        let issues = body.issues.trim();
        if issues.is_empty() {
            return Err(ServiceError::Validation("issues is required".into()));
        }

        let mut task = self.store.get_maintenance_task(&body.task_id)?;
        task.checklist = body.checklist;
        task.issues = Some(issues.to_string());
        task.notes = non_blank(body.notes);
        task.storage = non_blank(body.storage);
        task.status = MaintenanceStatus::PendingRepair;
        task.updated_at = now_rfc3339();
        self.store.update_maintenance_task(&task)?;

        info!(task_id = %task.id, "maintenance progress recorded");
        Ok(())
    }

    /// Close out a computer task: checklist done, machine back to
    /// AVAILABLE, task gone.
    pub fn maintenance_complete(
        &self,
        body: MaintenanceCompleteBody,
    ) -> Result<(), ServiceError> {
        let task = self.store.get_maintenance_task(&body.task_id)?;
        Self::require_checklist(&body)?;

        let name = match &task.target {
            MaintenanceTarget::Computer { name } => name.clone(),
            MaintenanceTarget::License { .. } => {
                return Err(ServiceError::Validation(format!(
                    "task {} does not target a computer",
                    task.id
                )));
            }
        };

        let mut computer = self.store.get_computer(&name)?;
        computer.status = ComputerStatus::Available;
        computer.last_assigned_request_id = None;
        if !self
            .store
            .swap_computer(&computer, ComputerStatus::Maintenance)?
        {
            return Err(ServiceError::Conflict(format!(
                "computer {name} is not in maintenance"
            )));
        }

        self.store.delete_maintenance_task(&task.id)?;
        info!(task_id = %task.id, computer = %name, "maintenance complete");
        Ok(())
    }

    /// Close out a license task once the vendor-side seat is released.
    pub fn license_cleanup(&self, body: MaintenanceCompleteBody) -> Result<(), ServiceError> {
        let task = self.store.get_maintenance_task(&body.task_id)?;
        Self::require_checklist(&body)?;

        if !matches!(task.target, MaintenanceTarget::License { .. }) {
            return Err(ServiceError::Validation(format!(
                "task {} does not target a license",
                task.id
            )));
        }

        self.store.delete_maintenance_task(&task.id)?;
        info!(task_id = %task.id, "license cleanup complete");
        Ok(())
    }

    fn require_checklist(body: &MaintenanceCompleteBody) -> Result<(), ServiceError> {
        if !(body.checklist.check_storage && body.checklist.check_junk) {
            return Err(ServiceError::Validation(
                "checkStorage and checkJunk must be completed".into(),
            ));
        }
        Ok(())
    }
}
