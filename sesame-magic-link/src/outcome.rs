use serde_json::Value;

use crate::error::MagicLinkError;

/// Result of a verification attempt
///
/// The three variants are terminal and mutually exclusive. `Rejected` is kept
/// apart from `Error` so that "valid link, unknown user" can be logged and
/// answered differently from "invalid or expired link".
#[derive(Debug)]
pub enum Outcome<I> {
    /// The token could not be verified, or resolving its claims failed
    Error(MagicLinkError),
    /// The token is valid but its claims match no identity
    Rejected { info: Option<Value> },
    /// The token is valid and its claims belong to `identity`
    Authenticated { identity: I, info: Option<Value> },
}

impl<I> Outcome<I> {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Outcome::Authenticated { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn identity(&self) -> Option<&I> {
        match self {
            Outcome::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&MagicLinkError> {
        match self {
            Outcome::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn info(&self) -> Option<&Value> {
        match self {
            Outcome::Rejected { info } | Outcome::Authenticated { info, .. } => info.as_ref(),
            Outcome::Error(_) => None,
        }
    }

    /// Consume the outcome, keeping only the identity
    pub fn into_identity(self) -> Option<I> {
        match self {
            Outcome::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn map<J>(self, f: impl FnOnce(I) -> J) -> Outcome<J> {
        match self {
            Outcome::Error(err) => Outcome::Error(err),
            Outcome::Rejected { info } => Outcome::Rejected { info },
            Outcome::Authenticated { identity, info } => Outcome::Authenticated {
                identity: f(identity),
                info,
            },
        }
    }
}

impl<I> From<MagicLinkError> for Outcome<I> {
    fn from(err: MagicLinkError) -> Self {
        Outcome::Error(err)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_predicates() {
        let authenticated: Outcome<u32> = Outcome::Authenticated {
            identity: 1,
            info: None,
        };
        assert!(authenticated.is_authenticated());
        assert!(!authenticated.is_rejected());
        assert!(!authenticated.is_error());
        assert_eq!(authenticated.identity(), Some(&1));

        let rejected: Outcome<u32> = Outcome::Rejected {
            info: Some(json!("unknown")),
        };
        assert!(rejected.is_rejected());
        assert_eq!(rejected.identity(), None);
        assert_eq!(rejected.info(), Some(&json!("unknown")));

        let error: Outcome<u32> = MagicLinkError::TokenExpired.into();
        assert!(error.is_error());
        assert!(error.error().unwrap().is_expired());
        assert_eq!(error.info(), None);
    }

    #[test]
    fn test_map_and_into_identity() {
        let outcome: Outcome<u32> = Outcome::Authenticated {
            identity: 41,
            info: Some(json!({ "first_login": true })),
        };

        let mapped = outcome.map(|id| id + 1);
        assert_eq!(mapped.info(), Some(&json!({ "first_login": true })));
        assert_eq!(mapped.into_identity(), Some(42));

        let rejected: Outcome<u32> = Outcome::Rejected { info: None };
        assert_eq!(rejected.map(|id| id + 1).into_identity(), None);
    }
}
