//! Per-step gate predicates.
//!
//! Each validator reads a single slice of the [`Submission`] and has no side
//! effects. The state machine looks them up through [`validator_for`], so a
//! step's rule can be exercised on its own without driving the wizard.

use super::types::{Pledge, ProjectInfo, RiskAssessment, Step, Submission, TrainingStatus, WorkPermit};

/// Gate for one step: the predicate plus a companion naming what is missing.
#[derive(Clone, Copy)]
pub struct StepValidator {
    pub step: Step,
    check: fn(&Submission) -> bool,
    missing: fn(&Submission) -> Vec<&'static str>,
}

impl StepValidator {
    pub fn is_valid(&self, submission: &Submission) -> bool {
        (self.check)(submission)
    }

    pub fn missing_fields(&self, submission: &Submission) -> Vec<&'static str> {
        (self.missing)(submission)
    }
}

impl std::fmt::Debug for StepValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepValidator").field("step", &self.step).finish()
    }
}

static VALIDATORS: [StepValidator; 6] = [
    StepValidator {
        step: Step::ProjectInfo,
        check: |s| project_info_is_valid(&s.project_info),
        missing: |s| missing_project_info(&s.project_info),
    },
    StepValidator {
        step: Step::SafetyTraining,
        check: |s| training_is_valid(&s.safety_training),
        missing: |s| missing_training(&s.safety_training),
    },
    StepValidator {
        step: Step::RiskAssessment,
        check: |s| risk_assessment_is_valid(&s.risk_assessment),
        missing: |s| missing_risk_assessment(&s.risk_assessment),
    },
    StepValidator {
        step: Step::WorkPermit,
        check: |s| work_permit_is_valid(&s.work_permit),
        missing: |s| missing_work_permit(&s.work_permit),
    },
    StepValidator {
        step: Step::SafetyPledge,
        check: |s| pledge_is_valid(&s.safety_pledge),
        missing: |s| missing_pledge(&s.safety_pledge),
    },
    StepValidator {
        step: Step::Confirmation,
        check: |_| true,
        missing: |_| Vec::new(),
    },
];

/// Validator gating `advance()` out of `step`. `Submitted` has none.
pub fn validator_for(step: Step) -> Option<&'static StepValidator> {
    VALIDATORS.iter().find(|validator| validator.step == step)
}

/// Whether `advance()` from `step` would succeed for this record.
pub fn step_is_valid(step: Step, submission: &Submission) -> bool {
    validator_for(step).is_some_and(|validator| validator.is_valid(submission))
}

pub fn project_info_is_valid(info: &ProjectInfo) -> bool {
    missing_project_info(info).is_empty()
}

pub fn missing_project_info(info: &ProjectInfo) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if info.is_other_location() {
        if info.location_other.is_empty() {
            missing.push("locationOther");
        }
    } else if info.location.is_empty() {
        missing.push("location");
    }
    if info.construction_name.is_empty() {
        missing.push("constructionName");
    }
    if info.company_name.is_empty() {
        missing.push("companyName");
    }
    if info.contact_person.is_empty() {
        missing.push("contactPerson");
    }
    missing
}

pub fn training_is_valid(training: &TrainingStatus) -> bool {
    training.completed
}

pub fn missing_training(training: &TrainingStatus) -> Vec<&'static str> {
    if training.completed {
        Vec::new()
    } else {
        vec!["completed"]
    }
}

/// Every row needs location, task, hazard and reduction measures. Safety
/// measures are optional and the levels always carry a value.
pub fn risk_assessment_is_valid(assessment: &RiskAssessment) -> bool {
    missing_risk_assessment(assessment).is_empty()
}

pub fn missing_risk_assessment(assessment: &RiskAssessment) -> Vec<&'static str> {
    let mut missing = Vec::new();
    for item in assessment.items() {
        let fields = [
            ("location", item.location.is_empty()),
            ("task", item.task.is_empty()),
            ("hazard", item.hazard.is_empty()),
            ("reductionMeasures", item.reduction_measures.is_empty()),
        ];
        for (name, empty) in fields {
            if empty && !missing.contains(&name) {
                missing.push(name);
            }
        }
    }
    missing
}

pub fn work_permit_is_valid(permit: &WorkPermit) -> bool {
    missing_work_permit(permit).is_empty()
}

pub fn missing_work_permit(permit: &WorkPermit) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if permit.permit_type.is_none() {
        missing.push("type");
    }
    let text_fields = [
        ("workDate", &permit.work_date),
        ("workStartTime", &permit.work_start_time),
        ("workEndTime", &permit.work_end_time),
        ("location", &permit.location),
        ("description", &permit.description),
    ];
    for (name, value) in text_fields {
        if value.is_empty() {
            missing.push(name);
        }
    }
    if permit.worker_count == 0 {
        missing.push("workerCount");
    }
    missing
}

pub fn pledge_is_valid(pledge: &Pledge) -> bool {
    missing_pledge(pledge).is_empty()
}

pub fn missing_pledge(pledge: &Pledge) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !pledge.agree_to_all {
        missing.push("agreeToAll");
    }
    if pledge.name.is_empty() {
        missing.push("name");
    }
    if !pledge.is_signed() {
        missing.push("signature");
    }
    missing
}
