//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every marketplace route, the wire schemas they use,
//! and the `cookieAuth` security scheme describing the `token` cookie. The
//! document backs Swagger UI in debug builds and `cargo run --bin
//! openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{ErrorCode, OfferPayload, OfferStatus, Role, UserPayload, UserStatus};
use crate::inbound::http::auth::{SessionAck, SessionRequest};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::offers::SubmitOfferRequest;
use crate::inbound::http::session::SESSION_COOKIE;
use crate::inbound::http::users::{ProfileRequest, RoleRequest, RoleResponse};

/// Enrich the generated document with the session credential schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "cookieAuth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE,
                "Session credential issued by POST /jwt.",
            ))),
        );
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Realscape marketplace API",
        description = "Session credentials, user status registry and the exclusive offer ledger."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::issue_session,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::ensure_user,
        crate::inbound::http::users::request_upgrade,
        crate::inbound::http::users::get_role,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::set_role,
        crate::inbound::http::users::flag_fraud,
        crate::inbound::http::users::remove_user,
        crate::inbound::http::offers::submit_offer,
        crate::inbound::http::offers::list_offers,
        crate::inbound::http::offers::get_offer,
        crate::inbound::http::offers::accept_offer,
        crate::inbound::http::offers::reject_offer,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserPayload,
        OfferPayload,
        crate::domain::Error,
        ErrorCode,
        Role,
        UserStatus,
        OfferStatus,
        SessionRequest,
        SessionAck,
        ProfileRequest,
        RoleRequest,
        RoleResponse,
        SubmitOfferRequest,
        ProbeStatus,
    )),
    tags(
        (name = "auth", description = "Session credential issue and removal"),
        (name = "users", description = "User status registry"),
        (name = "offers", description = "Purchase offers and decisions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
