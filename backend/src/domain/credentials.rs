//! Session credentials: issuing and verifying the signed token that proves
//! which email a request acts for.
//!
//! Tokens are stateless. Logging out only clears the cookie; a captured token
//! stays valid until `exp`.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::error;
use zeroize::Zeroizing;

use super::ports::{CredentialCodec, CredentialCodecError};
use super::{Email, Error};

/// How long an issued credential stays valid.
pub const SESSION_VALIDITY_DAYS: i64 = 365;

/// Claims carried inside the signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// The verified identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    email: Email,
}

impl Identity {
    pub fn new(email: Email) -> Self {
        Self { email }
    }

    pub fn email(&self) -> &Email {
        &self.email
    }
}

/// Why a presented credential was refused. Every variant maps to 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("no session credential presented")]
    Missing,
    #[error("session credential is invalid")]
    Invalid,
    #[error("session credential has expired")]
    Expired,
}

/// A freshly signed credential. The token is wiped from memory on drop.
#[derive(Debug)]
pub struct IssuedCredential {
    token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

impl IssuedCredential {
    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Issues and verifies session credentials.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use realscape::domain::{CredentialIssuer, Email};
/// use realscape::outbound::credentials::JwtCredentialCodec;
///
/// let codec = JwtCredentialCodec::new(b"an example secret that is long enough");
/// let issuer = CredentialIssuer::new(Arc::new(codec), Arc::new(DefaultClock));
/// let email = Email::new("ada@example.com").expect("valid email");
///
/// let issued = issuer.issue(&email).expect("issue credential");
/// let identity = issuer.verify(Some(issued.token())).expect("fresh token verifies");
/// assert_eq!(identity.email(), &email);
/// ```
#[derive(Clone)]
pub struct CredentialIssuer {
    codec: Arc<dyn CredentialCodec>,
    clock: Arc<dyn Clock>,
    validity: Duration,
}

impl CredentialIssuer {
    pub fn new(codec: Arc<dyn CredentialCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            codec,
            clock,
            validity: Duration::days(SESSION_VALIDITY_DAYS),
        }
    }

    /// Sign a credential for `email`, valid for [`SESSION_VALIDITY_DAYS`].
    pub fn issue(&self, email: &Email) -> Result<IssuedCredential, Error> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + self.validity;
        let claims = SessionClaims {
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = self.codec.encode(&claims).map_err(|err| {
            error!(error = %err, "session credential signing failed");
            Error::internal("failed to issue session credential")
        })?;
        Ok(IssuedCredential {
            token: Zeroizing::new(token),
            expires_at,
        })
    }

    /// Check signature and expiry and return the identity the token names.
    pub fn verify(&self, token: Option<&str>) -> Result<Identity, CredentialError> {
        let token = token
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(CredentialError::Missing)?;
        let claims = self.codec.decode(token).map_err(|err| match err {
            CredentialCodecError::Signing { .. }
            | CredentialCodecError::Malformed { .. }
            | CredentialCodecError::BadSignature => CredentialError::Invalid,
        })?;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(CredentialError::Invalid)?;
        if expires_at <= self.clock.utc() {
            return Err(CredentialError::Expired);
        }

        Email::new(claims.email)
            .map(Identity::new)
            .map_err(|_| CredentialError::Invalid)
    }
}
