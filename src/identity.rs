//! Scoped subscription for the identity widget.
//!
//! The widget gets an [`IdentityCallback`]; the workflow owns the matching
//! [`IdentityLinker`]. The channel holds at most one assertion, and a new
//! post replaces an unread one.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::model::identity::IdentityAssertion;

/// Widget-side handle. Cheap to clone.
#[derive(Clone)]
pub struct IdentityCallback {
    tx: watch::Sender<Option<IdentityAssertion>>,
}

impl IdentityCallback {
    /// Deliver an assertion. No authenticity check is made.
    pub fn post(&self, assertion: IdentityAssertion) {
        info!("identity assertion received");
        self.tx.send_replace(Some(assertion));
    }

    /// Deliver the widget's raw JSON payload.
    pub fn post_json(&self, payload: &str) -> Result<(), serde_json::Error> {
        let assertion = IdentityAssertion::from_json(payload)
            .inspect_err(|e| warn!(line = e.line(), column = e.column(), "malformed identity payload"))?;
        self.post(assertion);
        Ok(())
    }
}

/// Workflow-side end of the subscription.
pub struct IdentityLinker {
    tx: watch::Sender<Option<IdentityAssertion>>,
    rx: watch::Receiver<Option<IdentityAssertion>>,
}

impl IdentityLinker {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(None);
        Self { tx, rx }
    }

    pub fn callback(&self) -> IdentityCallback {
        IdentityCallback { tx: self.tx.clone() }
    }

    /// Take a posted-but-unread assertion, if there is one.
    pub fn take_pending(&mut self) -> Option<IdentityAssertion> {
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next post. The linker keeps its own sender alive, so
    /// the channel never closes underneath it.
    pub async fn next(&mut self) -> IdentityAssertion {
        loop {
            if self.rx.changed().await.is_err() {
                continue;
            }
            if let Some(assertion) = self.rx.borrow_and_update().clone() {
                return assertion;
            }
        }
    }

    /// Drop any held assertion (used on disconnect).
    pub fn clear(&mut self) {
        self.tx.send_replace(None);
        self.rx.borrow_and_update();
    }
}

impl Default for IdentityLinker {
    fn default() -> Self {
        Self::new()
    }
}
