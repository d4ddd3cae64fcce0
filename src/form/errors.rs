use thiserror::Error;

use super::types::Step;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The current step's required fields are incomplete. `missing` names
    /// them for callers that want detail; the message stays generic.
    #[error("Please fill in all required fields before continuing ({step})")]
    Validation {
        step: Step,
        missing: Vec<&'static str>,
    },
    /// The control surface was used in a state that does not allow the
    /// operation. This is a caller defect, not a form error.
    #[error("Operation '{operation}' is not permitted at step '{current}'")]
    InvalidState {
        operation: &'static str,
        current: Step,
    },
}

impl FormError {
    pub fn is_validation(&self) -> bool {
        matches!(self, FormError::Validation { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, FormError::InvalidState { .. })
    }

    /// Missing field names for validation failures, empty otherwise.
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            FormError::Validation { missing, .. } => missing,
            FormError::InvalidState { .. } => &[],
        }
    }
}
