// Submission form: record types, per-step validators and the step machine

pub mod errors;
pub mod review;
pub mod state_machine;
pub mod types;
pub mod validators;
pub mod wizard;

pub use errors::FormError;
pub use review::Review;
pub use state_machine::{FormEvent, FormRecord, StepFlow};
pub use types::{
    Pledge, PledgeUpdate, ProjectInfo, ProjectInfoField, RiskAssessment, RiskBand, RiskItem,
    RiskLevel, Step, Submission, TrainingStatus, WorkPermit, WorkPermitType, WorkPermitUpdate,
    IMAGE_ANALYSIS_LOCATION, OTHER_LOCATION,
};
pub use validators::{step_is_valid, validator_for, StepValidator};
pub use wizard::{SubmissionWizard, SubmittedRecord};
