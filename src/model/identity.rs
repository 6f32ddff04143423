use serde::{Deserialize, Deserializer, Serialize};

/// Messaging-platform identity posted by the login widget.
///
/// The widget sends `{"username": "...", "id": 12345}`; `id` may arrive as
/// a number or a string and is kept as its decimal text. Extra fields
/// (names, photo, auth hash) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAssertion {
    #[serde(default)]
    pub username: String,
    #[serde(rename = "id", deserialize_with = "string_or_number")]
    pub external_id: String,
}

impl IdentityAssertion {
    pub fn new(username: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            external_id: external_id.into(),
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Username with surrounding whitespace and a leading `@` removed.
    pub fn normalized_username(&self) -> &str {
        let trimmed = self.username.trim();
        trimmed.strip_prefix('@').unwrap_or(trimmed)
    }

    pub fn has_username(&self) -> bool {
        !self.normalized_username().is_empty()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
    })
}
