//! Validation helpers shared by the sesame strategies.

use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// Practical subset of RFC 5322 addresses
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Checks that an email claim is present, i.e. not empty or whitespace only.
///
/// This is the only requirement the magic link protocol places on the email claim.
/// Use [`validate_email`] when the format should be enforced as well.
pub fn require_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::MissingField("email".to_string()));
    }

    Ok(())
}

/// Checks that an email claim is present and looks like an address.
///
/// ```rust
/// use sesame_core::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    require_email(email)?;

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Validates the base link that tokens are appended to.
///
/// The link must be an absolute `http` or `https` URL with a host and without a
/// query string or fragment, since the token is appended as the final path segment.
///
/// ```rust
/// use sesame_core::validation::validate_verify_link;
///
/// assert!(validate_verify_link("https://example.com/verify").is_ok());
/// assert!(validate_verify_link("https://example.com/verify?next=/").is_err());
/// ```
pub fn validate_verify_link(link: &str) -> Result<(), ValidationError> {
    if link.trim().is_empty() {
        return Err(ValidationError::MissingField("verify_link".to_string()));
    }

    let invalid = |reason: &str| ValidationError::InvalidField(format!("verify_link {reason}: {link}"));

    // Url::parse strips surrounding whitespace and percent-encodes inner spaces
    if link.contains(char::is_whitespace) {
        return Err(invalid("cannot contain whitespace"));
    }

    let url = Url::parse(link).map_err(|e| invalid(&format!("is not a valid URL ({e})")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("must be an http(s) URL"));
    }

    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("is missing a host"));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("cannot contain a query or fragment"));
    }

    Ok(())
}
