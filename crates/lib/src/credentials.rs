//! Bot secrets, fixed at construction.

use crate::error::CredentialsError;
use std::fmt;

/// Verification token (inbound handshake), page access token (outbound calls) and
/// an optional app secret used to check payload signatures.
///
/// Fields are private and there are no setters; share it behind an `Arc`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    verify_token: String,
    access_token: String,
    app_secret: Option<String>,
}

impl Credentials {
    /// Both tokens are required; empty or whitespace-only values are rejected.
    pub fn new(
        verify_token: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let verify_token = verify_token.into();
        let access_token = access_token.into();
        if verify_token.trim().is_empty() {
            return Err(CredentialsError::MissingVerifyToken);
        }
        if access_token.trim().is_empty() {
            return Err(CredentialsError::MissingAccessToken);
        }
        Ok(Self {
            verify_token,
            access_token,
            app_secret: None,
        })
    }

    /// Enable payload signature checks. Empty secrets are ignored.
    pub fn with_app_secret(mut self, app_secret: impl Into<String>) -> Self {
        let secret = app_secret.into();
        self.app_secret = if secret.trim().is_empty() {
            None
        } else {
            Some(secret)
        };
        self
    }

    pub fn verify_token(&self) -> &str {
        &self.verify_token
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn app_secret(&self) -> Option<&str> {
        self.app_secret.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("verify_token", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("app_secret", &self.app_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_tokens() {
        let c = Credentials::new("V1", "T1").unwrap();
        assert_eq!(c.verify_token(), "V1");
        assert_eq!(c.access_token(), "T1");
        assert_eq!(c.app_secret(), None);
    }

    #[test]
    fn empty_tokens_rejected() {
        assert_eq!(
            Credentials::new("", "T1").unwrap_err(),
            CredentialsError::MissingVerifyToken
        );
        assert_eq!(
            Credentials::new("V1", "  ").unwrap_err(),
            CredentialsError::MissingAccessToken
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let c = Credentials::new("verify-secret", "access-secret")
            .unwrap()
            .with_app_secret("app-secret");
        let out = format!("{:?}", c);
        assert!(!out.contains("verify-secret"));
        assert!(!out.contains("access-secret"));
        assert!(!out.contains("app-secret"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn blank_app_secret_is_ignored() {
        let c = Credentials::new("V1", "T1").unwrap().with_app_secret(" ");
        assert_eq!(c.app_secret(), None);
    }
}
