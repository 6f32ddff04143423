//! Token-gated community onboarding: check that a wallet holds enough of
//! the gated token (or any of the gated NFT) on the required network, link
//! it to a messaging identity, persist the link and reveal an invite.

pub mod chain;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod identity;
pub mod invite;
pub mod model;
pub mod network;
pub mod onboarding;
pub mod store;
pub mod wallet;

pub use error::{Alert, AlertVariant, OnboardingError};
pub use onboarding::Onboarding;
