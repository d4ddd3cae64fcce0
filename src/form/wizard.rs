use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statig::prelude::*;
use uuid::Uuid;

use super::errors::FormError;
use super::state_machine::{FormEvent, FormRecord, StepFlow};
use super::types::{
    PledgeUpdate, ProjectInfoField, RiskAssessment, RiskItem, Step, Submission, WorkPermitUpdate,
};

/// The frozen record handed to a submission sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRecord {
    pub correlation_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub submission: Submission,
}

/// Control surface over the step machine. These methods are the only way
/// to change the submission or the current step.
pub struct SubmissionWizard {
    machine: StateMachine<StepFlow>,
    record: FormRecord,
}

impl std::fmt::Debug for SubmissionWizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionWizard").field("record", &self.record).finish()
    }
}

impl Default for SubmissionWizard {
    fn default() -> Self {
        Self::new(Submission::default())
    }
}

impl SubmissionWizard {
    /// Start at `ProjectInfo` with the given (normally empty) record.
    pub fn new(submission: Submission) -> Self {
        let correlation_id = crate::telemetry::generate_correlation_id();
        tracing::debug!(correlation.id = %correlation_id, "Submission wizard started");
        Self {
            machine: StepFlow.state_machine(),
            record: FormRecord::new(submission, correlation_id),
        }
    }

    /// Start with an empty record whose pledge lists the given item keys.
    pub fn with_pledge_items<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::new(Submission::with_pledge_items(keys))
    }

    pub fn correlation_id(&self) -> Uuid {
        self.record.correlation_id
    }

    pub fn current_step(&self) -> Step {
        self.record.step()
    }

    pub fn submission(&self) -> &Submission {
        self.record.submission()
    }

    pub fn is_submitted(&self) -> bool {
        self.record.step().is_terminal()
    }

    /// The frozen record, once the wizard reached `Submitted`.
    pub fn submitted_record(&self) -> Option<SubmittedRecord> {
        self.record.submitted_at.map(|submitted_at| SubmittedRecord {
            correlation_id: self.record.correlation_id,
            submitted_at,
            submission: self.record.submission.clone(),
        })
    }

    fn dispatch(&mut self, event: FormEvent) -> Result<(), FormError> {
        self.machine.handle_with_context(&event, &mut self.record);
        match self.record.rejection.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn update_project_info(
        &mut self,
        field: ProjectInfoField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        self.dispatch(FormEvent::UpdateProjectInfo {
            field,
            value: value.into(),
        })
    }

    /// Toggle training completion; the completion timestamp is stamped here.
    pub fn update_training(&mut self, completed: bool) -> Result<(), FormError> {
        self.dispatch(FormEvent::UpdateTraining {
            completed,
            at: Utc::now(),
        })
    }

    pub fn set_risk_assessment(&mut self, items: impl Into<RiskAssessment>) -> Result<(), FormError> {
        self.dispatch(FormEvent::SetRiskAssessment(items.into()))
    }

    /// Add a blank row and return its identifier.
    pub fn add_risk_item(&mut self) -> Result<Uuid, FormError> {
        let item = RiskItem::blank();
        let id = item.id;
        let next = self.submission().risk_assessment.with_appended([item]);
        self.set_risk_assessment(next)?;
        Ok(id)
    }

    pub fn update_risk_item(&mut self, item: RiskItem) -> Result<(), FormError> {
        let next = self.submission().risk_assessment.with_updated(item);
        self.set_risk_assessment(next)
    }

    /// Remove the row with `id`. Unknown identifiers change nothing.
    pub fn remove_risk_item(&mut self, id: Uuid) -> Result<(), FormError> {
        let next = self.submission().risk_assessment.without(id);
        self.set_risk_assessment(next)
    }

    /// Append rows in one step; either all land or none do.
    pub fn append_risk_items(&mut self, items: Vec<RiskItem>) -> Result<usize, FormError> {
        let count = items.len();
        self.dispatch(FormEvent::AppendRiskItems(items))?;
        Ok(count)
    }

    pub fn update_work_permit(&mut self, update: WorkPermitUpdate) -> Result<(), FormError> {
        self.dispatch(FormEvent::UpdateWorkPermit(update))
    }

    pub fn toggle_safety_check(&mut self, label: &str) -> Result<(), FormError> {
        let update = self.submission().work_permit.toggled_check(label);
        self.update_work_permit(update)
    }

    pub fn update_pledge(&mut self, update: PledgeUpdate) -> Result<(), FormError> {
        self.dispatch(FormEvent::UpdatePledge(update))
    }

    pub fn toggle_pledge_item(&mut self, key: &str) -> Result<(), FormError> {
        let update = self.submission().safety_pledge.toggled_item(key);
        self.update_pledge(update)
    }

    pub fn set_agree_to_all(&mut self, agree: bool) -> Result<(), FormError> {
        let update = self.submission().safety_pledge.agree_all(agree);
        self.update_pledge(update)
    }

    /// Move to the next step if the current one validates.
    pub fn go_next(&mut self) -> Result<Step, FormError> {
        self.dispatch(FormEvent::Advance)?;
        Ok(self.current_step())
    }

    /// Move back one step. Never validated.
    pub fn go_prev(&mut self) -> Result<Step, FormError> {
        self.dispatch(FormEvent::Retreat)?;
        Ok(self.current_step())
    }

    /// Freeze the record. Only permitted from `Confirmation`.
    pub fn submit(&mut self) -> Result<SubmittedRecord, FormError> {
        self.dispatch(FormEvent::Submit { at: Utc::now() })?;
        self.submitted_record().ok_or(FormError::InvalidState {
            operation: "submit",
            current: self.current_step(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::types::{WorkPermitType, OTHER_LOCATION};

    fn fill_project_info(wizard: &mut SubmissionWizard) {
        wizard.update_project_info(ProjectInfoField::Location, "오송 공장").unwrap();
        wizard.update_project_info(ProjectInfoField::ConstructionName, "A").unwrap();
        wizard.update_project_info(ProjectInfoField::CompanyName, "B").unwrap();
        wizard.update_project_info(ProjectInfoField::ContactPerson, "C").unwrap();
    }

    fn walk_to_confirmation(wizard: &mut SubmissionWizard) {
        fill_project_info(wizard);
        wizard.go_next().unwrap();
        wizard.update_training(true).unwrap();
        wizard.go_next().unwrap();
        wizard.go_next().unwrap();
        wizard
            .update_work_permit(WorkPermitUpdate {
                permit_type: Some(Some(WorkPermitType::Hazardous)),
                work_date: Some("2026-10-16".to_string()),
                work_start_time: Some("08:30".to_string()),
                work_end_time: Some("17:00".to_string()),
                location: Some("보일러실".to_string()),
                description: Some("용접 작업".to_string()),
                ..Default::default()
            })
            .unwrap();
        wizard.go_next().unwrap();
        wizard.set_agree_to_all(true).unwrap();
        wizard
            .update_pledge(PledgeUpdate {
                name: Some("홍길동".to_string()),
                signature: Some("data:image/png;base64,AAAA".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(wizard.go_next().unwrap(), Step::Confirmation);
    }

    #[test]
    fn test_other_location_scenario() {
        let mut wizard = SubmissionWizard::default();
        wizard.update_project_info(ProjectInfoField::Location, OTHER_LOCATION).unwrap();
        wizard.update_project_info(ProjectInfoField::ConstructionName, "A").unwrap();
        wizard.update_project_info(ProjectInfoField::CompanyName, "B").unwrap();
        wizard.update_project_info(ProjectInfoField::ContactPerson, "C").unwrap();

        let err = wizard.go_next().unwrap_err();
        assert_eq!(err.missing_fields(), ["locationOther"]);
        assert_eq!(wizard.current_step(), Step::ProjectInfo);

        wizard.update_project_info(ProjectInfoField::LocationOther, "Site X").unwrap();
        assert_eq!(wizard.go_next().unwrap(), Step::SafetyTraining);
    }

    #[test]
    fn test_failed_advance_leaves_record_untouched() {
        let mut wizard = SubmissionWizard::default();
        wizard.update_project_info(ProjectInfoField::CompanyName, "B").unwrap();
        let before = wizard.submission().clone();

        assert!(wizard.go_next().is_err());
        assert_eq!(wizard.submission(), &before);
        assert_eq!(wizard.current_step(), Step::ProjectInfo);
    }

    #[test]
    fn test_training_toggle_stamps_and_clears_date() {
        let mut wizard = SubmissionWizard::default();
        wizard.update_training(true).unwrap();
        assert!(wizard.submission().safety_training.completion_date.is_some());

        wizard.update_training(false).unwrap();
        assert!(wizard.submission().safety_training.completion_date.is_none());
    }

    #[test]
    fn test_add_update_remove_risk_rows() {
        let mut wizard = SubmissionWizard::default();
        let first = wizard.add_risk_item().unwrap();
        let second = wizard.add_risk_item().unwrap();
        assert_ne!(first, second);

        let mut edited = wizard.submission().risk_assessment.get(first).unwrap().clone();
        edited.hazard = "추락".to_string();
        wizard.update_risk_item(edited).unwrap();
        assert_eq!(wizard.submission().risk_assessment.get(first).unwrap().hazard, "추락");

        wizard.remove_risk_item(Uuid::new_v4()).unwrap();
        assert_eq!(wizard.submission().risk_assessment.len(), 2);

        wizard.remove_risk_item(first).unwrap();
        assert_eq!(wizard.submission().risk_assessment.len(), 1);
        assert!(wizard.submission().risk_assessment.get(second).is_some());
    }

    #[test]
    fn test_agree_to_all_sets_every_item() {
        let mut wizard = SubmissionWizard::with_pledge_items(["ppe", "no_smoking", "report"]);
        wizard.set_agree_to_all(true).unwrap();
        let pledge = &wizard.submission().safety_pledge;
        assert!(pledge.agreements.values().all(|agreed| *agreed));
        assert!(pledge.agree_to_all);

        wizard.toggle_pledge_item("report").unwrap();
        assert!(!wizard.submission().safety_pledge.agree_to_all);
    }

    #[test]
    fn test_full_walk_and_submit() {
        let mut wizard = SubmissionWizard::with_pledge_items(["ppe"]);
        walk_to_confirmation(&mut wizard);

        let record = wizard.submit().unwrap();
        assert_eq!(record.correlation_id, wizard.correlation_id());
        assert_eq!(wizard.current_step(), Step::Submitted);
        assert_eq!(record.submission.project_info.company_name, "B");
    }

    #[test]
    fn test_submitted_record_is_read_only() {
        let mut wizard = SubmissionWizard::with_pledge_items(["ppe"]);
        walk_to_confirmation(&mut wizard);
        wizard.submit().unwrap();
        let frozen = wizard.submission().clone();

        let err = wizard
            .update_project_info(ProjectInfoField::CompanyName, "changed")
            .unwrap_err();
        assert!(err.is_invalid_state());
        assert!(wizard.append_risk_items(vec![RiskItem::blank()]).is_err());
        assert!(wizard.go_prev().is_err());
        assert!(wizard.submit().is_err());
        assert_eq!(wizard.submission(), &frozen);
        assert_eq!(wizard.current_step(), Step::Submitted);
    }

    #[test]
    fn test_advance_from_confirmation_submits() {
        let mut wizard = SubmissionWizard::with_pledge_items(["ppe"]);
        walk_to_confirmation(&mut wizard);

        assert_eq!(wizard.go_next().unwrap(), Step::Submitted);
        assert!(wizard.submitted_record().is_some());
    }

    #[test]
    fn test_retreat_is_never_validated() {
        let mut wizard = SubmissionWizard::default();
        fill_project_info(&mut wizard);
        wizard.go_next().unwrap();
        // Invalidate the earlier step, then go back and forth through it
        wizard.update_project_info(ProjectInfoField::CompanyName, "").unwrap();
        assert_eq!(wizard.go_prev().unwrap(), Step::ProjectInfo);
        assert!(wizard.go_next().is_err());
    }
}
