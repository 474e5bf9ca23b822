//! Shared HTTP adapter state.
//!
//! HTTP handlers and the access gate accept this state via
//! `actix_web::web::Data` so they only depend on driving ports and remain
//! testable without I/O.

use std::sync::Arc;

use crate::domain::CredentialIssuer;
use crate::domain::ports::{OfferLedger, UserRegistry};

use super::session_config::CookieSettings;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRegistry>,
    pub offers: Arc<dyn OfferLedger>,
    pub credentials: Arc<CredentialIssuer>,
    pub cookie: CookieSettings,
}

impl HttpState {
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use actix_web::cookie::SameSite;
    /// use mockable::DefaultClock;
    /// use realscape::domain::ports::FixturePropertyDirectory;
    /// use realscape::domain::{CredentialIssuer, OfferLedgerService, UserRegistryService};
    /// use realscape::inbound::http::session_config::CookieSettings;
    /// use realscape::inbound::http::state::HttpState;
    /// use realscape::outbound::credentials::JwtCredentialCodec;
    /// use realscape::outbound::memory::{InMemoryOfferRepository, InMemoryUserRepository};
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let users = UserRegistryService::new(Arc::new(InMemoryUserRepository::default()), clock.clone());
    /// let offers = OfferLedgerService::new(
    ///     Arc::new(InMemoryOfferRepository::default()),
    ///     Arc::new(FixturePropertyDirectory),
    ///     clock.clone(),
    /// );
    /// let issuer = CredentialIssuer::new(Arc::new(JwtCredentialCodec::new(&[7; 32])), clock);
    /// let state = HttpState::new(
    ///     Arc::new(users),
    ///     Arc::new(offers),
    ///     Arc::new(issuer),
    ///     CookieSettings { secure: false, same_site: SameSite::Strict },
    /// );
    /// assert!(!state.cookie.secure);
    /// ```
    pub fn new(
        users: Arc<dyn UserRegistry>,
        offers: Arc<dyn OfferLedger>,
        credentials: Arc<CredentialIssuer>,
        cookie: CookieSettings,
    ) -> Self {
        Self {
            users,
            offers,
            credentials,
            cookie,
        }
    }
}
