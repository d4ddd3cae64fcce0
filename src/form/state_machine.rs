use chrono::{DateTime, Utc};
use statig::prelude::*;
use uuid::Uuid;

use super::errors::FormError;
use super::types::{
    PledgeUpdate, ProjectInfoField, RiskAssessment, RiskItem, Step, Submission, WorkPermitUpdate,
};
use super::validators::validator_for;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    UpdateProjectInfo {
        field: ProjectInfoField,
        value: String,
    },
    UpdateTraining {
        completed: bool,
        at: DateTime<Utc>,
    },
    SetRiskAssessment(RiskAssessment),
    AppendRiskItems(Vec<RiskItem>),
    UpdateWorkPermit(WorkPermitUpdate),
    UpdatePledge(PledgeUpdate),
    Advance,
    Retreat,
    Submit {
        at: DateTime<Utc>,
    },
}

impl FormEvent {
    pub fn operation(&self) -> &'static str {
        match self {
            FormEvent::UpdateProjectInfo { .. } => "update_project_info",
            FormEvent::UpdateTraining { .. } => "update_training",
            FormEvent::SetRiskAssessment(_) => "set_risk_assessment",
            FormEvent::AppendRiskItems(_) => "append_risk_items",
            FormEvent::UpdateWorkPermit(_) => "update_work_permit",
            FormEvent::UpdatePledge(_) => "update_pledge",
            FormEvent::Advance => "advance",
            FormEvent::Retreat => "retreat",
            FormEvent::Submit { .. } => "submit",
        }
    }
}

/// Everything the step handlers read and write: the record, the step
/// pointer and the outcome of the last event.
#[derive(Debug, Clone)]
pub struct FormRecord {
    pub(crate) submission: Submission,
    pub(crate) step: Step,
    pub(crate) correlation_id: Uuid,
    pub(crate) submitted_at: Option<DateTime<Utc>>,
    pub(crate) rejection: Option<FormError>,
}

impl FormRecord {
    pub fn new(submission: Submission, correlation_id: Uuid) -> Self {
        Self {
            submission,
            step: Step::ProjectInfo,
            correlation_id,
            submitted_at: None,
            rejection: None,
        }
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Move forward when the current step's validator passes. Nothing is
    /// touched on failure apart from the recorded rejection.
    fn gate(&mut self, target: State) -> Outcome<State> {
        let step = self.step;
        let Some(validator) = validator_for(step) else {
            return self.reject("advance");
        };

        if !validator.is_valid(&self.submission) {
            let missing = validator.missing_fields(&self.submission);
            tracing::warn!(
                correlation.id = %self.correlation_id,
                step = %step,
                missing = ?missing,
                "Step incomplete, staying put"
            );
            self.rejection = Some(FormError::Validation { step, missing });
            return Handled;
        }

        self.step = step.next();
        tracing::info!(
            correlation.id = %self.correlation_id,
            from = %step,
            to = %self.step,
            "Advanced to next step"
        );
        Transition(target)
    }

    fn back_to(&mut self, target: State) -> Outcome<State> {
        let from = self.step;
        self.step = from.prev();
        tracing::info!(
            correlation.id = %self.correlation_id,
            from = %from,
            to = %self.step,
            "Returned to previous step"
        );
        Transition(target)
    }

    fn freeze(&mut self, at: DateTime<Utc>) -> Outcome<State> {
        self.step = Step::Submitted;
        self.submitted_at = Some(at);
        tracing::info!(
            correlation.id = %self.correlation_id,
            risk_items = self.submission.risk_assessment.len(),
            "Submission frozen"
        );
        Transition(State::submitted())
    }

    fn reject(&mut self, operation: &'static str) -> Outcome<State> {
        tracing::error!(
            correlation.id = %self.correlation_id,
            operation = operation,
            step = %self.step,
            "Operation not permitted in current step"
        );
        self.rejection = Some(FormError::InvalidState {
            operation,
            current: self.step,
        });
        Handled
    }

    fn apply_update(&mut self, event: &FormEvent) -> Outcome<State> {
        match event {
            FormEvent::UpdateProjectInfo { field, value } => {
                self.submission.project_info.set(*field, value.clone());
            }
            FormEvent::UpdateTraining { completed, at } => {
                self.submission.safety_training.set_completed(*completed, *at);
            }
            FormEvent::SetRiskAssessment(assessment) => {
                self.submission.risk_assessment = assessment.clone();
            }
            FormEvent::AppendRiskItems(items) => {
                self.submission.risk_assessment =
                    self.submission.risk_assessment.with_appended(items.iter().cloned());
                tracing::info!(
                    correlation.id = %self.correlation_id,
                    appended = items.len(),
                    total = self.submission.risk_assessment.len(),
                    "Risk items appended"
                );
            }
            FormEvent::UpdateWorkPermit(update) => {
                self.submission.work_permit.merge(update.clone());
            }
            FormEvent::UpdatePledge(update) => {
                self.submission.safety_pledge.merge(update.clone());
            }
            FormEvent::Submit { .. } => return self.reject("submit"),
            FormEvent::Advance | FormEvent::Retreat => {}
        }
        Handled
    }
}

/// Step progression. Each step handles its own `Advance`/`Retreat` and
/// defers field updates to the `editable` superstate; `submitted` accepts
/// nothing.
#[derive(Debug, Default)]
pub struct StepFlow;

#[state_machine(initial = "State::project_info()")]
impl StepFlow {
    #[superstate]
    fn editable(context: &mut FormRecord, event: &FormEvent) -> Outcome<State> {
        context.apply_update(event)
    }

    #[state(superstate = "editable")]
    fn project_info(context: &mut FormRecord, event: &FormEvent) -> Outcome<State> {
        match event {
            FormEvent::Advance => context.gate(State::safety_training()),
            // Already at the first step
            FormEvent::Retreat => Handled,
            _ => Super,
        }
    }

    #[state(superstate = "editable")]
    fn safety_training(context: &mut FormRecord, event: &FormEvent) -> Outcome<State> {
        match event {
            FormEvent::Advance => context.gate(State::risk_assessment()),
            FormEvent::Retreat => context.back_to(State::project_info()),
            _ => Super,
        }
    }

    #[state(superstate = "editable")]
    fn risk_assessment(context: &mut FormRecord, event: &FormEvent) -> Outcome<State> {
        match event {
            FormEvent::Advance => context.gate(State::work_permit()),
            FormEvent::Retreat => context.back_to(State::safety_training()),
            _ => Super,
        }
    }

    #[state(superstate = "editable")]
    fn work_permit(context: &mut FormRecord, event: &FormEvent) -> Outcome<State> {
        match event {
            FormEvent::Advance => context.gate(State::safety_pledge()),
            FormEvent::Retreat => context.back_to(State::risk_assessment()),
            _ => Super,
        }
    }

    #[state(superstate = "editable")]
    fn safety_pledge(context: &mut FormRecord, event: &FormEvent) -> Outcome<State> {
        match event {
            FormEvent::Advance => context.gate(State::confirmation()),
            FormEvent::Retreat => context.back_to(State::work_permit()),
            _ => Super,
        }
    }

    #[state(superstate = "editable")]
    fn confirmation(context: &mut FormRecord, event: &FormEvent) -> Outcome<State> {
        match event {
            // Review-only page: advancing past it is the submission itself
            FormEvent::Advance => context.freeze(Utc::now()),
            FormEvent::Submit { at } => context.freeze(*at),
            FormEvent::Retreat => context.back_to(State::safety_pledge()),
            _ => Super,
        }
    }

    #[state]
    fn submitted(context: &mut FormRecord, event: &FormEvent) -> Outcome<State> {
        context.reject(event.operation())
    }
}
