//! The onboarding state machine.
//!
//! Sequence: wallet connect → required network → eligibility check →
//! identity capture → record persisted → invite revealed. Every action
//! takes `&mut self` and only moves the state once its awaited step has
//! finished, so a failed step always leaves the previous state in place.

pub mod events;
pub mod state;

use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{Alert, OnboardingError};
use crate::evaluator::{Evaluator, PreconditionError, Prefetch};
use crate::identity::{IdentityCallback, IdentityLinker};
use crate::invite::{FetchStage, InviteIssuer, fetch_invite};
use crate::model::balance::format_amount;
use crate::model::eligibility::EligibilityStatus;
use crate::model::identity::IdentityAssertion;
use crate::model::record::{InviteLink, OnboardingRecord};
use crate::model::wallet::{WalletEvent, WalletSession, short_addr};
use crate::network::NetworkGuard;
use crate::store::RecordStore;

use events::OnboardingEvent;
use state::{ConnectedWallet, OnboardingState, StateKind};

const EVENT_CAPACITY: usize = 64;

pub struct Onboarding {
    guard: NetworkGuard,
    evaluator: Evaluator,
    linker: IdentityLinker,
    store: Arc<dyn RecordStore>,
    invites: Arc<dyn InviteIssuer>,
    state: OnboardingState,
    alert: Option<Alert>,
    events: broadcast::Sender<OnboardingEvent>,
}

impl Onboarding {
    pub fn new(
        guard: NetworkGuard,
        evaluator: Evaluator,
        store: Arc<dyn RecordStore>,
        invites: Arc<dyn InviteIssuer>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            guard,
            evaluator,
            linker: IdentityLinker::new(),
            store,
            invites,
            state: OnboardingState::Disconnected,
            alert: None,
            events,
        }
    }

    // ── Read side ────────────────────────────────────────────────────

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn eligibility_status(&self) -> EligibilityStatus {
        self.state.eligibility_status()
    }

    pub fn revealed_invite(&self) -> Option<&InviteLink> {
        self.state.revealed_invite()
    }

    /// Wallet snapshot as last reported by the wallet collaborator.
    pub fn session(&self) -> WalletSession {
        match self.state.wallet() {
            Some(w) => WalletSession::connected(w.address, w.chain_id),
            None => WalletSession::default(),
        }
    }

    /// Handle for the identity widget. Posts made before the workflow is
    /// ready for them are held until it is.
    pub fn identity_callback(&self) -> IdentityCallback {
        self.linker.callback()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OnboardingEvent> {
        self.events.subscribe()
    }

    // ── Wallet events ────────────────────────────────────────────────

    pub fn handle_wallet_event(&mut self, event: WalletEvent) {
        debug!(?event, state = %self.kind(), "wallet event");
        match event {
            WalletEvent::Disconnected => self.reset("wallet disconnected"),
            WalletEvent::Connected { address, chain_id } => match self.state.wallet().copied() {
                Some(current) if current.address == address => self.on_chain_changed(chain_id),
                Some(_) => {
                    self.reset("wallet account changed");
                    self.connect(address, chain_id);
                }
                None => self.connect(address, chain_id),
            },
            WalletEvent::ChainChanged { chain_id } => self.on_chain_changed(chain_id),
            WalletEvent::AccountChanged { address } => {
                if let Some(current) = self.state.wallet().copied() {
                    if current.address != address {
                        self.reset("wallet account changed");
                        self.connect(address, current.chain_id);
                    }
                }
            }
        }
    }

    /// Drop all session data and return to `Disconnected`. Records already
    /// persisted stay persisted. Safe to call in any state, repeatedly.
    pub fn disconnect(&mut self) {
        self.reset("wallet disconnected");
    }

    fn connect(&mut self, address: Address, chain_id: u64) {
        let wallet = ConnectedWallet { address, chain_id };
        info!(address = %short_addr(&address), chain_id, "wallet connected");
        self.transition(self.network_state(wallet));
    }

    fn network_state(&self, wallet: ConnectedWallet) -> OnboardingState {
        if self.guard.is_satisfied(wallet.chain_id) {
            OnboardingState::CorrectNetwork { wallet }
        } else {
            OnboardingState::WrongNetwork { wallet }
        }
    }

    fn on_chain_changed(&mut self, chain_id: u64) {
        let Some(mut wallet) = self.state.wallet().copied() else {
            return;
        };
        wallet.chain_id = chain_id;

        match self.kind() {
            StateKind::WrongNetwork | StateKind::CorrectNetwork => {
                self.transition(self.network_state(wallet));
            }
            // The record is written; only the invite remains and it does not depend on the chain.
            StateKind::Persisted => {
                if let OnboardingState::Persisted { wallet: w, .. } = &mut self.state {
                    w.chain_id = chain_id;
                }
            }
            _ if self.guard.is_satisfied(chain_id) => {}
            _ => {
                warn!(chain_id, "left the required network after evaluation; discarding session data");
                self.linker.clear();
                self.transition(OnboardingState::WrongNetwork { wallet });
            }
        }
    }

    fn reset(&mut self, reason: &str) {
        info!(reason, from = %self.kind(), "resetting onboarding");
        self.linker.clear();
        self.alert = None;
        self.transition(OnboardingState::Disconnected);
        self.emit(OnboardingEvent::Reset {
            reason: reason.to_string(),
        });
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Ask the wallet to move to the required network.
    pub async fn switch_network(&mut self) -> Result<(), OnboardingError> {
        self.alert = None;
        let kind = self.kind();
        let wallet = match &self.state {
            OnboardingState::WrongNetwork { wallet } => *wallet,
            OnboardingState::Disconnected => return Err(self.fail(PreconditionError::NotConnected.into())),
            _ => return Err(self.invalid("switch_network", kind)),
        };

        let outcome = self.guard.switch_network().await;
        match outcome {
            Ok(()) => {
                let wallet = ConnectedWallet {
                    chain_id: self.guard.required_id(),
                    ..wallet
                };
                self.transition(OnboardingState::CorrectNetwork { wallet });
                Ok(())
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Read both balances and decide. Retriable after any failure; a
    /// positive decision moves straight on to waiting for identity.
    pub async fn check_eligibility(&mut self) -> Result<EligibilityStatus, OnboardingError> {
        self.alert = None;
        let kind = self.kind();
        let session = self.session();
        let wallet = match &self.state {
            OnboardingState::CorrectNetwork { wallet } => *wallet,
            // The evaluator refuses these sessions before any chain read.
            OnboardingState::Disconnected | OnboardingState::WrongNetwork { .. } => {
                let err = match self.evaluator.evaluate(&session).await {
                    Err(e) => e.into(),
                    Ok(_) => OnboardingError::InvalidAction {
                        action: "check_eligibility",
                        state: kind,
                    },
                };
                return Err(self.fail(err));
            }
            _ => return Err(self.invalid("check_eligibility", kind)),
        };

        let outcome = self.evaluator.evaluate(&session).await;
        let evaluation = match outcome {
            Ok(evaluation) => evaluation,
            Err(e) => return Err(self.fail(e.into())),
        };

        let result = evaluation.result;
        self.emit(OnboardingEvent::EligibilityChecked { result: result.clone() });
        self.transition(OnboardingState::Evaluated {
            wallet,
            result: result.clone(),
        });

        if !result.is_eligible {
            let gate = self.evaluator.gate();
            let required = format_amount(gate.threshold.min_token_raw, gate.token_decimals);
            self.set_alert(Alert::error(format!(
                "You are not eligible. Required: either {required} tokens or 1 NFT"
            )));
            return Ok(EligibilityStatus::Ineligible);
        }

        let invite = match evaluation.prefetch {
            Prefetch::Ready(link) => Some(link),
            Prefetch::Failed(e) => {
                let err = OnboardingError::from(e);
                self.set_alert(Alert::from(&err));
                None
            }
            Prefetch::Skipped => None,
        };
        self.transition(OnboardingState::IdentityPending { wallet, result, invite });
        self.sync_identity();
        Ok(EligibilityStatus::Eligible)
    }

    /// Deliver an identity assertion directly (same effect as posting
    /// through [`IdentityCallback`]). A second assertion replaces the first.
    pub fn on_identity_assertion(&mut self, assertion: IdentityAssertion) {
        self.linker.callback().post(assertion);
        self.sync_identity();
    }

    /// Apply a posted assertion if the workflow is ready for one. Returns
    /// whether the state changed.
    pub fn sync_identity(&mut self) -> bool {
        if !matches!(
            self.state,
            OnboardingState::IdentityPending { .. } | OnboardingState::IdentityCaptured { .. }
        ) {
            return false;
        }
        match self.linker.take_pending() {
            Some(identity) => {
                self.apply_identity(identity);
                true
            }
            None => false,
        }
    }

    /// Wait until the widget posts an identity.
    pub async fn wait_for_identity(&mut self) -> Result<(), OnboardingError> {
        let kind = self.kind();
        if kind != StateKind::IdentityPending {
            return Err(self.invalid("wait_for_identity", kind));
        }
        let identity = self.linker.next().await;
        self.apply_identity(identity);
        Ok(())
    }

    fn apply_identity(&mut self, identity: IdentityAssertion) {
        match self.state.clone() {
            OnboardingState::IdentityPending { wallet, result, invite }
            | OnboardingState::IdentityCaptured {
                wallet, result, invite, ..
            } => {
                self.transition(OnboardingState::IdentityCaptured {
                    wallet,
                    result,
                    identity,
                    invite,
                });
            }
            other => debug!(state = %other.kind(), "identity ignored"),
        }
    }

    /// Write the onboarding record, then reveal the invite. Returns the
    /// revealed invite, or `None` if the record was written but no invite
    /// could be obtained (see [`Onboarding::retry_invite`]).
    pub async fn persist(&mut self) -> Result<Option<InviteLink>, OnboardingError> {
        self.alert = None;
        let (wallet, result, identity, invite) = match self.state.clone() {
            OnboardingState::IdentityCaptured {
                wallet,
                result,
                identity,
                invite,
            } => (wallet, result, identity, invite),
            other => return Err(self.invalid("persist", other.kind())),
        };

        if !identity.has_username() {
            return Err(self.fail(OnboardingError::Validation(
                "Please connect your messaging account first".into(),
            )));
        }

        let record = OnboardingRecord::new(wallet.address, &identity, result.token_balance, result.nft_balance);
        let written = self.store.insert(&record).await;
        if let Err(e) = written {
            return Err(self.fail(e.into()));
        }
        self.emit(OnboardingEvent::RecordPersisted {
            id: record.id.to_string(),
            username: record.username.clone(),
        });

        self.transition(OnboardingState::Persisted {
            wallet,
            record,
            invite: invite.clone(),
        });

        match invite {
            Some(link) => {
                self.reveal(&link);
                Ok(Some(link))
            }
            None => match self.fetch_for_reveal().await {
                Ok(link) => Ok(Some(link)),
                Err(_) => Ok(None),
            },
        }
    }

    /// Fetch the invite again after a persisted record could not get one.
    pub async fn retry_invite(&mut self) -> Result<InviteLink, OnboardingError> {
        self.alert = None;
        let kind = self.kind();
        match &self.state {
            OnboardingState::Persisted { invite: Some(link), .. } => Ok(link.clone()),
            OnboardingState::Persisted { invite: None, .. } => self.fetch_for_reveal().await,
            _ => Err(self.invalid("retry_invite", kind)),
        }
    }

    async fn fetch_for_reveal(&mut self) -> Result<InviteLink, OnboardingError> {
        let fetched = fetch_invite(self.invites.as_ref(), FetchStage::Reveal).await;
        match fetched {
            Ok(link) => {
                if let OnboardingState::Persisted { invite, .. } = &mut self.state {
                    *invite = Some(link.clone());
                }
                self.reveal(&link);
                Ok(link)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn reveal(&mut self, link: &InviteLink) {
        info!("invite revealed");
        self.emit(OnboardingEvent::InviteReady { url: link.url.clone() });
        self.set_alert(Alert::info("Your invite link is ready"));
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    fn transition(&mut self, next: OnboardingState) {
        let from = self.state.kind();
        let to = next.kind();
        self.state = next;
        if from != to {
            info!(%from, %to, "onboarding state changed");
            self.emit(OnboardingEvent::StateChanged { from, to });
        }
    }

    fn invalid(&mut self, action: &'static str, state: StateKind) -> OnboardingError {
        self.fail(OnboardingError::InvalidAction { action, state })
    }

    /// Surface an error as the current alert and hand it back to the caller.
    fn fail(&mut self, err: OnboardingError) -> OnboardingError {
        warn!(state = %self.kind(), error = %err, "onboarding action failed");
        self.set_alert(Alert::from(&err));
        err
    }

    fn set_alert(&mut self, alert: Alert) {
        self.emit(OnboardingEvent::Alert { alert: alert.clone() });
        self.alert = Some(alert);
    }

    fn emit(&self, event: OnboardingEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
