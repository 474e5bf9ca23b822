//! Token secret fingerprinting for operational visibility.
//!
//! Logs a truncated SHA-256 of the signing secret at startup so operators can
//! tell which secret is live (and whether two instances agree) without the
//! secret itself reaching the logs.

use sha2::{Digest, Sha256};

use super::TokenSecret;

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 fingerprint of the secret, as 16 hex characters.
///
/// # Examples
///
/// ```rust
/// use realscape::inbound::http::session_config::TokenSecret;
/// use realscape::inbound::http::session_config::fingerprint::secret_fingerprint;
///
/// let fp = secret_fingerprint(&TokenSecret::new(vec![b'a'; 32]));
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &TokenSecret) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
