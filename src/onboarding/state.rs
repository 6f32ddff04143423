use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::model::eligibility::{EligibilityResult, EligibilityStatus};
use crate::model::identity::IdentityAssertion;
use crate::model::record::{InviteLink, OnboardingRecord};

/// A connected wallet as the workflow tracks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedWallet {
    pub address: Address,
    pub chain_id: u64,
}

/// Onboarding workflow state. Each variant holds only what is valid in it:
/// there is no eligibility result before `Evaluated`, and no identity
/// without a positive result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OnboardingState {
    #[default]
    Disconnected,
    WrongNetwork {
        wallet: ConnectedWallet,
    },
    CorrectNetwork {
        wallet: ConnectedWallet,
    },
    /// Only ever held with a negative result; a positive one moves on to
    /// `IdentityPending` in the same step.
    Evaluated {
        wallet: ConnectedWallet,
        result: EligibilityResult,
    },
    IdentityPending {
        wallet: ConnectedWallet,
        result: EligibilityResult,
        invite: Option<InviteLink>,
    },
    IdentityCaptured {
        wallet: ConnectedWallet,
        result: EligibilityResult,
        identity: IdentityAssertion,
        invite: Option<InviteLink>,
    },
    Persisted {
        wallet: ConnectedWallet,
        record: OnboardingRecord,
        invite: Option<InviteLink>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Disconnected,
    WrongNetwork,
    CorrectNetwork,
    Evaluated,
    IdentityPending,
    IdentityCaptured,
    Persisted,
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StateKind::Disconnected => "disconnected",
            StateKind::WrongNetwork => "on the wrong network",
            StateKind::CorrectNetwork => "on the correct network",
            StateKind::Evaluated => "evaluated",
            StateKind::IdentityPending => "waiting for identity",
            StateKind::IdentityCaptured => "identity captured",
            StateKind::Persisted => "persisted",
        };
        f.write_str(s)
    }
}

impl OnboardingState {
    pub fn kind(&self) -> StateKind {
        match self {
            OnboardingState::Disconnected => StateKind::Disconnected,
            OnboardingState::WrongNetwork { .. } => StateKind::WrongNetwork,
            OnboardingState::CorrectNetwork { .. } => StateKind::CorrectNetwork,
            OnboardingState::Evaluated { .. } => StateKind::Evaluated,
            OnboardingState::IdentityPending { .. } => StateKind::IdentityPending,
            OnboardingState::IdentityCaptured { .. } => StateKind::IdentityCaptured,
            OnboardingState::Persisted { .. } => StateKind::Persisted,
        }
    }

    /// Connected wallet, `None` only while disconnected.
    pub fn wallet(&self) -> Option<&ConnectedWallet> {
        match self {
            OnboardingState::WrongNetwork { wallet }
            | OnboardingState::CorrectNetwork { wallet }
            | OnboardingState::Evaluated { wallet, .. }
            | OnboardingState::IdentityPending { wallet, .. }
            | OnboardingState::IdentityCaptured { wallet, .. }
            | OnboardingState::Persisted { wallet, .. } => Some(wallet),
            OnboardingState::Disconnected => None,
        }
    }

    pub fn eligibility(&self) -> Option<&EligibilityResult> {
        match self {
            OnboardingState::Evaluated { result, .. }
            | OnboardingState::IdentityPending { result, .. }
            | OnboardingState::IdentityCaptured { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn eligibility_status(&self) -> EligibilityStatus {
        match self {
            OnboardingState::Persisted { .. } => EligibilityStatus::Eligible,
            other => EligibilityStatus::from(other.eligibility()),
        }
    }

    pub fn identity(&self) -> Option<&IdentityAssertion> {
        match self {
            OnboardingState::IdentityCaptured { identity, .. } => Some(identity),
            _ => None,
        }
    }

    /// The invite, once it may be shown.
    pub fn revealed_invite(&self) -> Option<&InviteLink> {
        match self {
            OnboardingState::Persisted { invite, .. } => invite.as_ref(),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            OnboardingState::Evaluated { result, .. } => !result.is_eligible,
            OnboardingState::Persisted { invite, .. } => invite.is_some(),
            _ => false,
        }
    }
}
