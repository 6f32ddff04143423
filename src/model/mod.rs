pub mod balance;
pub mod chain;
pub mod eligibility;
pub mod identity;
pub mod record;
pub mod wallet;

pub use balance::AssetBalance;
pub use chain::Chain;
pub use eligibility::{EligibilityResult, EligibilityStatus, Threshold};
pub use identity::IdentityAssertion;
pub use record::{InviteLink, OnboardingRecord};
pub use wallet::{WalletEvent, WalletSession};
