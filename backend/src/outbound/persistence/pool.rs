//! The process-wide PostgreSQL pool.
//!
//! `main` builds exactly one [`DbPool`] from the `REALSCAPE_DATABASE_URL` and
//! `REALSCAPE_POOL_*` settings and hands clones to the user, offer and
//! property adapters. A checkout that outlives `connection_timeout` becomes
//! [`PoolError::Checkout`], which the adapters report as an unavailable store
//! (HTTP 503).

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::info;

/// Errors raised while building or drawing from the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("no database connection available: {message}")]
    Checkout { message: String },
    #[error("could not build database pool: {message}")]
    Build { message: String },
    #[error("pool keeps {min_idle} idle connections but allows only {max_size}")]
    IdleExceedsMax { min_idle: u32, max_size: u32 },
    #[error("pool must allow at least one connection")]
    Empty,
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Sizing and timeout settings for [`DbPool`].
///
/// ```
/// use std::time::Duration;
/// use realscape::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://realscape@localhost/realscape")
///     .with_max_size(20)
///     .with_min_idle(Some(4))
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_size(), 20);
/// assert_eq!(config.min_idle(), Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    pub const DEFAULT_MAX_SIZE: u32 = 10;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Ten connections, none kept idle, a thirty second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: Self::DEFAULT_MAX_SIZE,
            min_idle: None,
            connection_timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Connections bb8 keeps open while the service is idle.
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn min_idle(&self) -> Option<u32> {
        self.min_idle
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// Reject sizes bb8 would refuse (it panics on `min_idle > max_size`).
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_size == 0 {
            return Err(PoolError::Empty);
        }
        match self.min_idle {
            Some(min_idle) if min_idle > self.max_size => Err(PoolError::IdleExceedsMax {
                min_idle,
                max_size: self.max_size,
            }),
            _ => Ok(()),
        }
    }
}

/// Cloneable handle to the shared bb8 pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Validate `config` and build the pool.
    ///
    /// With `min_idle` set, bb8 opens that many connections before
    /// returning, so an unreachable database fails here rather than on the
    /// first request.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        info!(
            max_size = config.max_size,
            min_idle = ?config.min_idle,
            timeout_secs = config.connection_timeout.as_secs(),
            "database pool ready"
        );
        Ok(Self { inner })
    }

    /// Check out a connection, waiting at most the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
