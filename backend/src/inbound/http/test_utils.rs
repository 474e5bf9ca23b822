//! Test helpers for inbound HTTP components.
//!
//! [`TestHarness`] wires the real domain services to the in-memory adapters
//! and a fixed clock, so handler tests exercise the full request path
//! (trace, gate, extractors, service, store) without PostgreSQL.

use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use mockable::Clock;

use crate::Trace;
use crate::domain::ports::{OfferRepository, UserRepository};
use crate::domain::{
    CredentialIssuer, Email, NewOffer, Offer, OfferAmount, OfferLedgerService, PropertyId,
    PropertySummary, PropertyVerification, Role, RoutePolicy, User, UserProfile,
    UserRegistration, UserRegistryService, UserStatus,
};
use crate::outbound::credentials::JwtCredentialCodec;
use crate::outbound::memory::{
    InMemoryOfferRepository, InMemoryPropertyDirectory, InMemoryUserRepository,
};
use crate::test_support::MutableClock;

use super::error::{json_config, path_config, query_config};
use super::routes::configure;
use super::session::SESSION_COOKIE;
use super::session_config::CookieSettings;
use super::state::HttpState;

pub(crate) const TEST_SECRET: &[u8] = b"realscape-test-secret-0123456789abcdef";
pub(crate) const NOW: &str = "2026-03-01T12:00:00Z";

pub(crate) struct TestHarness {
    pub state: HttpState,
    pub users: Arc<InMemoryUserRepository>,
    pub offers: Arc<InMemoryOfferRepository>,
    pub properties: Arc<InMemoryPropertyDirectory>,
    pub clock: Arc<MutableClock>,
    pub policy: RoutePolicy,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_policy(RoutePolicy::default())
    }

    pub fn with_policy(policy: RoutePolicy) -> Self {
        let clock = Arc::new(MutableClock::at(NOW));
        let users = Arc::new(InMemoryUserRepository::new());
        let offers = Arc::new(InMemoryOfferRepository::new());
        let properties = Arc::new(InMemoryPropertyDirectory::new());
        let issuer = CredentialIssuer::new(
            Arc::new(JwtCredentialCodec::new(TEST_SECRET)),
            clock.clone(),
        );
        let state = HttpState::new(
            Arc::new(UserRegistryService::new(users.clone(), clock.clone())),
            Arc::new(OfferLedgerService::new(
                offers.clone(),
                properties.clone(),
                clock.clone(),
            )),
            Arc::new(issuer),
            CookieSettings {
                secure: false,
                same_site: SameSite::Strict,
            },
        );
        Self {
            state,
            users,
            offers,
            properties,
            clock,
            policy,
        }
    }

    /// Application with the production middleware and route table.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let policy = self.policy.clone();
        App::new()
            .wrap(Trace)
            .app_data(web::Data::new(self.state.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .configure(move |cfg| configure(cfg, &policy))
    }

    /// A `token` cookie holding a fresh credential for `email`.
    pub fn cookie_for(&self, email: &str) -> Cookie<'static> {
        Cookie::new(SESSION_COOKIE, self.token_for(email))
    }

    pub fn token_for(&self, email: &str) -> String {
        let email = Email::new(email).expect("valid test email");
        let credential = self
            .state
            .credentials
            .issue(&email)
            .expect("issuing test credential");
        credential.token().to_owned()
    }

    /// Store a user directly, bypassing the registry's transition rules.
    pub async fn register(&self, email: &str, role: Role, status: UserStatus) -> User {
        let registration = UserRegistration {
            email: Email::new(email).expect("valid test email"),
            profile: UserProfile::default(),
            created_at: self.clock.utc(),
        };
        let user = self
            .users
            .insert_if_absent(&registration)
            .await
            .expect("insert test user");
        self.users
            .set_role(user.id(), role)
            .await
            .expect("set test role")
            .expect("test user present");
        self.users
            .set_status(user.id(), status)
            .await
            .expect("set test status")
            .expect("test user present")
    }

    pub fn list_property(&self, owner: Option<&str>) -> PropertyId {
        let id = PropertyId::random();
        self.properties
            .insert(PropertySummary {
                id,
                verification: PropertyVerification::Verified,
                owner_email: owner.map(|email| Email::new(email).expect("valid owner email")),
            })
            .expect("insert test property");
        id
    }

    pub async fn offer(&self, property_id: PropertyId, buyer: &str, amount: i64) -> Offer {
        self.offers
            .insert(&NewOffer {
                property_id,
                user_email: Email::new(buyer).expect("valid buyer email"),
                amount: OfferAmount::new(amount).expect("positive amount"),
                submitted_at: self.clock.utc(),
            })
            .await
            .expect("insert test offer")
    }
}
