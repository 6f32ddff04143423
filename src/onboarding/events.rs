use serde::Serialize;

use crate::error::Alert;
use crate::model::eligibility::EligibilityResult;

use super::state::StateKind;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OnboardingEvent {
    StateChanged {
        from: StateKind,
        to: StateKind,
    },
    EligibilityChecked {
        result: EligibilityResult,
    },
    InviteReady {
        url: String,
    },
    RecordPersisted {
        id: String,
        username: String,
    },
    Alert {
        alert: Alert,
    },
    Reset {
        reason: String,
    },
}
