//! Session credential configuration parsing and validation.
//!
//! Collects the signing secret and cookie attributes from the environment so
//! they are validated in one place and can be tested against `MockEnv`.
//! Development tolerates missing or malformed values (with a warning);
//! production refuses to start on them.

pub mod fingerprint;

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

pub(crate) const SECRET_DEFAULT_PATH: &str = "/var/run/secrets/token_secret";
/// Minimum secret length accepted in production (HS256 block size).
pub(crate) const SECRET_MIN_LEN: usize = 32;
pub(crate) const ENVIRONMENT_ENV: &str = "REALSCAPE_ENVIRONMENT";
pub(crate) const SECRET_ENV: &str = "TOKEN_SECRET";
pub(crate) const SECRET_FILE_ENV: &str = "TOKEN_SECRET_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "TOKEN_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "TOKEN_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "TOKEN_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const ENVIRONMENT_EXPECTED: &str = "development|production";

/// Deployment environment; selects cookie defaults and validation strictness.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeploymentMode {
    /// Same-site cookies without `Secure`; lenient parsing.
    Development,
    /// Cross-site `Secure` cookies; strict parsing.
    Production,
}

impl DeploymentMode {
    /// Read [`ENVIRONMENT_ENV`], falling back to the build profile.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mockable::MockEnv;
    /// use realscape::inbound::http::session_config::DeploymentMode;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|_| Some("production".to_owned()));
    /// assert_eq!(
    ///     DeploymentMode::detect(&env).expect("known environment"),
    ///     DeploymentMode::Production
    /// );
    /// ```
    pub fn detect<E: Env>(env: &E) -> Result<Self, SessionConfigError> {
        match env.string(ENVIRONMENT_ENV) {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "production" | "prod" => Ok(Self::Production),
                "development" | "dev" => Ok(Self::Development),
                _ => Err(SessionConfigError::InvalidEnv {
                    name: ENVIRONMENT_ENV,
                    value,
                    expected: ENVIRONMENT_EXPECTED,
                }),
            },
            None if cfg!(debug_assertions) => Ok(Self::Development),
            None => Ok(Self::Production),
        }
    }

    fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    fn default_cookie_secure(self) -> bool {
        !self.is_development()
    }

    fn default_same_site(self) -> SameSite {
        match self {
            Self::Development => SameSite::Strict,
            Self::Production => SameSite::None,
        }
    }
}

/// HMAC secret used to sign session credentials. Wiped on drop.
pub struct TokenSecret(Zeroizing<Vec<u8>>);

impl TokenSecret {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
    }
}

/// Cookie attributes applied to the `token` cookie.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: SameSite,
}

/// Session settings derived from the environment.
#[derive(Debug)]
pub struct SessionSettings {
    pub secret: TokenSecret,
    pub cookie: CookieSettings,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret exists but is too short for production.
    #[error("token secret too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
    /// `SameSite=None` requires a secure cookie in production.
    #[error("TOKEN_SAMESITE=None requires TOKEN_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Production must not run on a generated secret.
    #[error("TOKEN_ALLOW_EPHEMERAL must be 0 in production")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables.
///
/// The secret comes from `TOKEN_SECRET` when set, otherwise from the file
/// named by `TOKEN_SECRET_FILE`.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::SameSite;
/// use mockable::MockEnv;
/// use realscape::inbound::http::session_config::{DeploymentMode, session_settings_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "TOKEN_SECRET" => Some("0123456789abcdef0123456789abcdef".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, DeploymentMode::Production).expect("valid");
/// assert!(settings.cookie.secure);
/// assert_eq!(settings.cookie.same_site, SameSite::None);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: DeploymentMode,
) -> Result<SessionSettings, SessionConfigError> {
    let secure = cookie_secure_from_env(env, mode)?;
    let same_site = same_site_from_env(env, mode, secure)?;
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let secret = secret_from_env(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        secret,
        cookie: CookieSettings { secure, same_site },
    })
}

fn lenient_or<T>(
    mode: DeploymentMode,
    fallback: T,
    error: SessionConfigError,
) -> Result<T, SessionConfigError> {
    if mode.is_development() {
        warn!(error = %error, "ignoring invalid session setting in development");
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn cookie_secure_from_env<E: Env>(
    env: &E,
    mode: DeploymentMode,
) -> Result<bool, SessionConfigError> {
    let default = mode.default_cookie_secure();
    let Some(value) = env.string(COOKIE_SECURE_ENV) else {
        return Ok(default);
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None => lenient_or(
            mode,
            default,
            SessionConfigError::InvalidEnv {
                name: COOKIE_SECURE_ENV,
                value,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: DeploymentMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default = mode.default_same_site();
    let same_site = match env.string(SAMESITE_ENV) {
        None => default,
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "lax" => SameSite::Lax,
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => {
                return lenient_or(
                    mode,
                    default,
                    SessionConfigError::InvalidEnv {
                        name: SAMESITE_ENV,
                        value,
                        expected: SAMESITE_EXPECTED,
                    },
                );
            }
        },
    };

    if same_site == SameSite::None && !cookie_secure {
        if mode.is_development() {
            warn!("TOKEN_SAMESITE=None without Secure; browsers will drop the cookie");
        } else {
            return Err(SessionConfigError::InsecureSameSiteNone);
        }
    }
    Ok(same_site)
}

fn allow_ephemeral_from_env<E: Env>(
    env: &E,
    mode: DeploymentMode,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if !mode.is_development() => Err(SessionConfigError::EphemeralNotAllowed),
        Some(flag) => Ok(flag),
        None => lenient_or(
            mode,
            false,
            SessionConfigError::InvalidEnv {
                name: ALLOW_EPHEMERAL_ENV,
                value,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

fn secret_from_env<E: Env>(
    env: &E,
    mode: DeploymentMode,
    allow_ephemeral: bool,
) -> Result<TokenSecret, SessionConfigError> {
    if let Some(value) = env.string(SECRET_ENV).filter(|v| !v.trim().is_empty()) {
        return checked_secret(value.into_bytes(), mode);
    }

    let path = PathBuf::from(
        env.string(SECRET_FILE_ENV)
            .unwrap_or_else(|| SECRET_DEFAULT_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(bytes) => checked_secret(bytes, mode),
        Err(error) if mode.is_development() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary token secret (dev only)"
            );
            Ok(TokenSecret::new(Key::generate().master().to_vec()))
        }
        Err(error) => Err(SessionConfigError::SecretRead {
            path,
            source: error,
        }),
    }
}

fn checked_secret(
    mut bytes: Vec<u8>,
    mode: DeploymentMode,
) -> Result<TokenSecret, SessionConfigError> {
    let length = bytes.len();
    if !mode.is_development() && length < SECRET_MIN_LEN {
        bytes.zeroize();
        return Err(SessionConfigError::SecretTooShort {
            length,
            min_len: SECRET_MIN_LEN,
        });
    }
    Ok(TokenSecret::new(bytes))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
