use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::ChainReadError;
use crate::evaluator::{EvalError, PreconditionError};
use crate::invite::InviteFetchError;
use crate::network::SwitchError;
use crate::onboarding::state::StateKind;
use crate::store::PersistenceError;

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("Error checking eligibility: {0}")]
    Chain(#[from] ChainReadError),

    #[error("Failed to switch network: {0}")]
    Switch(#[from] SwitchError),

    #[error("{0}")]
    Validation(String),

    #[error("Error saving data: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Error fetching invite link: {0}")]
    InviteFetch(#[from] InviteFetchError),

    #[error("`{action}` is not available while {state}")]
    InvalidAction { action: &'static str, state: StateKind },
}

impl From<EvalError> for OnboardingError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Precondition(e) => OnboardingError::Precondition(e),
            EvalError::Chain(e) => OnboardingError::Chain(e),
        }
    }
}

/// Severity of a message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertVariant {
    Default,
    Destructive,
}

/// The one message surfaced in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub variant: AlertVariant,
    pub message: String,
}

impl Alert {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            variant: AlertVariant::Default,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            variant: AlertVariant::Destructive,
            message: message.into(),
        }
    }
}

impl From<&OnboardingError> for Alert {
    fn from(err: &OnboardingError) -> Self {
        Alert::error(err.to_string())
    }
}
