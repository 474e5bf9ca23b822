//! HTTP server settings loaded via OrthoConfig, and the runtime
//! configuration built from them.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use realscape::domain::{PolicyParseError, RoutePolicy};
use realscape::inbound::http::session_config::{CookieSettings, TokenSecret};
use realscape::outbound::persistence::{DbPool, PoolConfig};
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings read from `REALSCAPE_*` variables, config files and flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REALSCAPE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_max_size: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
    /// Connections kept open while idle; also opened eagerly at startup.
    pub pool_min_idle: Option<u32>,
    /// Comma-separated `operation=requirement` entries, e.g.
    /// `read_role=authenticated,submit_offer=authenticated`.
    pub route_policy: Option<String>,
}

/// Errors raised while interpreting [`ServerSettings`].
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid route policy: {0}")]
    RoutePolicy(#[from] PolicyParseError),
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// The default access table with any configured overrides applied.
    pub fn route_policy(&self) -> Result<RoutePolicy, SettingsError> {
        let policy = RoutePolicy::default();
        match self.route_policy.as_deref() {
            Some(overrides) => Ok(policy.with_overrides(overrides)?),
            None => Ok(policy),
        }
    }

    /// Pool settings, or `None` when no database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())?;
        let timeout = self
            .pool_timeout_secs
            .map_or(PoolConfig::DEFAULT_TIMEOUT, Duration::from_secs);
        Some(
            PoolConfig::new(url)
                .with_max_size(self.pool_max_size.unwrap_or(PoolConfig::DEFAULT_MAX_SIZE))
                .with_min_idle(self.pool_min_idle)
                .with_connection_timeout(timeout),
        )
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) secret: TokenSecret,
    pub(crate) cookie: CookieSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) policy: RoutePolicy,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        secret: TokenSecret,
        cookie: CookieSettings,
        bind_addr: SocketAddr,
        policy: RoutePolicy,
    ) -> Self {
        Self {
            secret,
            cookie,
            bind_addr,
            policy,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use realscape::domain::{AccessRequirement, Operation};
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "REALSCAPE_BIND_ADDR",
        "REALSCAPE_DATABASE_URL",
        "REALSCAPE_POOL_MAX_SIZE",
        "REALSCAPE_POOL_TIMEOUT_SECS",
        "REALSCAPE_POOL_MIN_IDLE",
        "REALSCAPE_ROUTE_POLICY",
    ];

    fn load_with(values: [Option<&str>; 6]) -> ServerSettings {
        let _guard = lock_env(
            VARS.into_iter()
                .zip(values)
                .map(|(name, value)| (name, value.map(str::to_owned))),
        );
        ServerSettings::load_from_iter([OsString::from("realscape")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with([None; 6]);
        assert_eq!(
            settings.bind_addr().expect("default bind address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal address")
        );
        assert!(settings.pool_config().is_none());
        assert_eq!(
            settings.route_policy().expect("default policy"),
            RoutePolicy::default()
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with([
            Some("127.0.0.1:9000"),
            Some("postgres://localhost/realscape"),
            Some("4"),
            Some("5"),
            Some("2"),
            Some("read_role=authenticated"),
        ]);

        assert_eq!(settings.bind_addr().expect("bind").port(), 9000);
        let pool = settings.pool_config().expect("pool configured");
        assert_eq!(pool.database_url(), "postgres://localhost/realscape");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.min_idle(), Some(2));
        assert_eq!(pool.connection_timeout(), Duration::from_secs(5));
        assert_eq!(
            settings
                .route_policy()
                .expect("policy")
                .requirement(Operation::ReadRole),
            &AccessRequirement::Authenticated
        );
    }

    #[rstest]
    #[case(Some("not an address"), None)]
    #[case(None, Some("read_role=superuser"))]
    fn invalid_values_are_reported(#[case] bind: Option<&str>, #[case] policy: Option<&str>) {
        let settings = load_with([bind, None, None, None, None, policy]);
        let failed = settings.bind_addr().is_err() || settings.route_policy().is_err();
        assert!(failed);
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let settings = load_with([None, Some("  "), None, None, None, None]);
        assert!(settings.pool_config().is_none());
    }
}
