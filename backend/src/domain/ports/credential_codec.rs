//! Driven port for signing and decoding session credentials.
//!
//! The codec only deals with signatures and encoding. Expiry is judged by
//! [`crate::domain::CredentialIssuer`] against the injected clock.

use crate::domain::SessionClaims;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential codecs.
    pub enum CredentialCodecError {
        /// Signing failed; the key or claims could not be encoded.
        Signing { message: String } => "failed to sign session credential: {message}",
        /// The token is not a well-formed credential.
        Malformed { message: String } => "malformed session credential: {message}",
        /// The signature does not match the server secret.
        BadSignature => "session credential signature mismatch",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CredentialCodec: Send + Sync {
    fn encode(&self, claims: &SessionClaims) -> Result<String, CredentialCodecError>;

    fn decode(&self, token: &str) -> Result<SessionClaims, CredentialCodecError>;
}
