//! Builders for HTTP state: picks Diesel adapters when a pool is configured,
//! otherwise in-memory stores with the fixture property directory.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use realscape::domain::ports::{
    FixturePropertyDirectory, OfferRepository, PropertyDirectory, UserRepository,
};
use realscape::domain::{CredentialIssuer, OfferLedgerService, UserRegistryService};
use realscape::inbound::http::state::HttpState;
use realscape::outbound::credentials::JwtCredentialCodec;
use realscape::outbound::memory::{InMemoryOfferRepository, InMemoryUserRepository};
use realscape::outbound::persistence::{
    DbPool, DieselOfferRepository, DieselPropertyDirectory, DieselUserRepository,
};
use tracing::{info, warn};

use super::ServerConfig;

/// Logged at startup when no database is configured.
pub(super) const IN_MEMORY_WARNING: &str = "no database configured: users and offers are kept \
    in memory and lost on restart; every property id is accepted, so offers for unknown \
    properties are never refused and only admins can accept or reject offers";

/// Repository adapters backing the driving services.
struct Repositories {
    users: Arc<dyn UserRepository>,
    offers: Arc<dyn OfferRepository>,
    properties: Arc<dyn PropertyDirectory>,
}

impl Repositories {
    fn from_pool(pool: &Option<DbPool>) -> Self {
        match pool {
            Some(pool) => {
                info!("using PostgreSQL stores");
                Self {
                    users: Arc::new(DieselUserRepository::new(pool.clone())),
                    offers: Arc::new(DieselOfferRepository::new(pool.clone())),
                    properties: Arc::new(DieselPropertyDirectory::new(pool.clone())),
                }
            }
            None => {
                warn!("{IN_MEMORY_WARNING}");
                Self {
                    users: Arc::new(InMemoryUserRepository::new()),
                    offers: Arc::new(InMemoryOfferRepository::new()),
                    properties: Arc::new(FixturePropertyDirectory),
                }
            }
        }
    }
}

/// Wire the driving services onto the configured adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let Repositories {
        users,
        offers,
        properties,
    } = Repositories::from_pool(&config.db_pool);
    let issuer = CredentialIssuer::new(
        Arc::new(JwtCredentialCodec::new(config.secret.as_bytes())),
        clock.clone(),
    );

    web::Data::new(HttpState::new(
        Arc::new(UserRegistryService::new(users, clock.clone())),
        Arc::new(OfferLedgerService::new(offers, properties, clock)),
        Arc::new(issuer),
        config.cookie,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::SameSite;
    use realscape::domain::{Email, PropertyId, RoutePolicy};
    use realscape::inbound::http::session_config::{CookieSettings, TokenSecret};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn in_memory_state_issues_verifiable_credentials() {
        let config = ServerConfig::new(
            TokenSecret::new(vec![9; 32]),
            CookieSettings {
                secure: true,
                same_site: SameSite::None,
            },
            "127.0.0.1:0".parse().expect("literal address"),
            RoutePolicy::default(),
        );
        let state = build_http_state(&config);
        let email = Email::new("ada@example.com").expect("valid email");

        let credential = state.credentials.issue(&email).expect("issue");
        let identity = state
            .credentials
            .verify(Some(credential.token()))
            .expect("verify");
        assert_eq!(identity.email(), &email);
        assert!(state.cookie.secure);
        assert!(state.users.list_users().await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn in_memory_fallback_accepts_any_property_and_says_so() {
        let repositories = Repositories::from_pool(&None);

        let id = PropertyId::random();
        let summary = repositories
            .properties
            .find(&id)
            .await
            .expect("lookup")
            .expect("every id is known");
        assert!(summary.owner_email.is_none());
        assert!(IN_MEMORY_WARNING.contains("every property id is accepted"));
        assert!(IN_MEMORY_WARNING.contains("only admins"));
    }
}
