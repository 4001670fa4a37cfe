//! Token identifier generation
//!
//! Every issued token embeds a [`TokenId`] so that callers can correlate an
//! issuance with a later verification, or keep their own "spent token" list.
//! Identifiers are drawn independently from a random space; there is no shared
//! counter, so concurrent issuance needs no coordination.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The random space token identifiers are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenIdSpace {
    /// Random UUID v4 (122 random bits). Collisions are not a practical concern.
    #[default]
    Uuid,
    /// Five digit decimal numbers (`10000..=99999`).
    ///
    /// Only ~90,000 values, so collisions become likely under sustained load.
    /// Use this only when a downstream system expects the short format.
    FiveDigit,
}

impl TokenIdSpace {
    /// Draw a fresh identifier from this space
    pub fn generate(&self) -> TokenId {
        match self {
            TokenIdSpace::Uuid => TokenId(uuid::Uuid::new_v4().to_string()),
            TokenIdSpace::FiveDigit => {
                let n: u32 = rand::rng().random_range(10_000..100_000);
                TokenId(n.to_string())
            }
        }
    }
}

/// Identifier embedded in an issued token
///
/// This value should be treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: &str) -> Self {
        TokenId(id.to_string())
    }

    pub fn new_random() -> Self {
        TokenIdSpace::default().generate()
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TokenId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TokenId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
