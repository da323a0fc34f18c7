//! Opaque API credential.

use std::fmt;

/// An API key for the hosted model services.
///
/// A `Credential` is never blank, and its value never appears in `Debug`
/// or `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret, returning `None` when it is blank.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        let trimmed = secret.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Expose the secret for transmission to the service.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credential_rejected() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   \n").is_none());
    }

    #[test]
    fn test_credential_trimmed() {
        let credential = Credential::new("  secret-key \n").unwrap();
        assert_eq!(credential.expose(), "secret-key");
    }

    #[test]
    fn test_credential_redacted() {
        let credential = Credential::new("secret-key").unwrap();
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.to_string(), "***");
    }
}
