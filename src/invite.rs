use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::record::InviteLink;

pub const DEFAULT_INVITE_SERVICE: &str = "https://tokengate-8acc7ede28d5.herokuapp.com";

/// When an invite fetch happened: right after a positive eligibility check,
/// or after the record was persisted because no prefetched link existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStage {
    Prefetch,
    Reveal,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStage::Prefetch => f.write_str("prefetch"),
            FetchStage::Reveal => f.write_str("reveal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invite {stage} failed: {reason}")]
pub struct InviteFetchError {
    pub stage: FetchStage,
    pub reason: String,
}

impl InviteFetchError {
    pub fn new(stage: FetchStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// The external invite-issuing service.
///
/// Implementations report failures as plain text; the caller tags them
/// with the [`FetchStage`] it was in.
#[async_trait]
pub trait InviteIssuer: Send + Sync {
    async fn generate_link(&self) -> Result<InviteLink, String>;
}

/// Fetch once and tag a failure with `stage`.
pub async fn fetch_invite(issuer: &dyn InviteIssuer, stage: FetchStage) -> Result<InviteLink, InviteFetchError> {
    issuer
        .generate_link()
        .await
        .map_err(|reason| InviteFetchError::new(stage, reason))
}

// ── HTTP issuer ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateLinkResponse {
    #[serde(rename = "inviteLink")]
    invite_link: String,
}

/// `GET {base}/generate-link` → `{"inviteLink": "..."}`.
pub struct HttpInviteIssuer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInviteIssuer {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!("meld-gate/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/generate-link", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl InviteIssuer for HttpInviteIssuer {
    async fn generate_link(&self) -> Result<InviteLink, String> {
        let url = self.endpoint();
        debug!(%url, "requesting invite link");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("invite request failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("invite service error {status}: {body}"));
        }

        let body = resp
            .json::<GenerateLinkResponse>()
            .await
            .map_err(|e| format!("parsing invite response: {e}"))?;

        if body.invite_link.trim().is_empty() {
            return Err("invite service returned an empty link".into());
        }

        info!("invite link issued");
        Ok(InviteLink::new(body.invite_link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base() {
        let issuer = HttpInviteIssuer::new("https://example.test/", None).unwrap();
        assert_eq!(issuer.endpoint(), "https://example.test/generate-link");
    }

    #[test]
    fn test_error_names_stage() {
        let err = InviteFetchError::new(FetchStage::Reveal, "503");
        assert_eq!(err.to_string(), "invite reveal failed: 503");
    }
}
