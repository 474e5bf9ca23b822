//! HS256 JSON Web Token implementation of the `CredentialCodec` port.
//!
//! `jsonwebtoken` checks the signature and the presence of `exp`; whether
//! `exp` has passed is decided by the domain against the injected clock, so
//! built-in expiry validation is switched off here.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::SessionClaims;
use crate::domain::ports::{CredentialCodec, CredentialCodecError};

/// Signs and decodes session claims with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtCredentialCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCredentialCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtCredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCredentialCodec")
            .field("algorithm", &"HS256")
            .finish_non_exhaustive()
    }
}

impl CredentialCodec for JwtCredentialCodec {
    fn encode(&self, claims: &SessionClaims) -> Result<String, CredentialCodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|err| CredentialCodecError::signing(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, CredentialCodecError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature => CredentialCodecError::bad_signature(),
                _ => CredentialCodecError::malformed(err.to_string()),
            })
    }
}
