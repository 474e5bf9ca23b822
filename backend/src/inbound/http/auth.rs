//! Session endpoints.
//!
//! ```text
//! POST /jwt {"email":"buyer@example.com"}   (Authorization: Bearer <id token>)
//! GET  /logout
//! ```
//!
//! Login itself happens at the external identity provider, which hands the
//! client a bearer credential signed with the shared server secret. `POST
//! /jwt` converts that proven identity (or an existing session) into a fresh
//! session cookie. The payload email must name the identity the credential
//! proves; nobody can obtain a session for someone else.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::access_gate::{Authenticated, FORBIDDEN_MESSAGE};
use crate::inbound::http::session::{removal_cookie, session_cookie};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{EMAIL, parse_email};

/// Request body for `POST /jwt`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[schema(example = "buyer@example.com")]
    pub email: String,
}

/// Acknowledgement returned by the session endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct SessionAck {
    pub success: bool,
}

/// Issue a session credential for a proven identity and set it as the
/// `token` cookie.
///
/// Takes [`Authenticated`] directly, so the route stays closed even if the
/// route policy is overridden to `public`.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Credential issued", body = SessionAck,
            headers(("Set-Cookie" = String, description = "`token` session cookie"))),
        (status = 400, description = "Invalid email", body = Error),
        (status = 401, description = "No verified credential presented", body = Error),
        (status = 403, description = "Payload names a different identity", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "issueSession",
    security(("bearerAuth" = []), ("cookieAuth" = []))
)]
pub async fn issue_session(
    state: web::Data<HttpState>,
    Authenticated(identity): Authenticated,
    payload: web::Json<SessionRequest>,
) -> ApiResult<HttpResponse> {
    let email = parse_email(EMAIL, &payload.email)?;
    if identity.email() != &email {
        warn!(
            presented = %identity.email(),
            requested = %email,
            "session requested for a different identity"
        );
        return Err(Error::forbidden(FORBIDDEN_MESSAGE));
    }
    let credential = state.credentials.issue(&email)?;
    debug!(expires_at = %credential.expires_at(), "session credential issued");
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(credential.token(), state.cookie))
        .json(SessionAck { success: true }))
}

/// Clear the session cookie.
///
/// Credentials are stateless: a copy of the token captured elsewhere stays
/// valid until it expires.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 200, description = "Cookie cleared", body = SessionAck)
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
pub async fn logout(state: web::Data<HttpState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(removal_cookie(state.cookie))
        .json(SessionAck { success: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRepository;
    use crate::domain::{Email, Role, RoutePolicy, UserStatus};
    use crate::inbound::http::session::SESSION_COOKIE;
    use crate::inbound::http::test_utils::TestHarness;
    use actix_web::cookie::SameSite;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    const ADMIN: &str = "admin@example.com";
    const BUYER: &str = "buyer@example.com";

    fn jwt_request(payload: Value) -> test::TestRequest {
        test::TestRequest::post().uri("/jwt").set_json(payload)
    }

    fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
        (AUTHORIZATION, format!("Bearer {token}"))
    }

    #[rstest]
    #[actix_web::test]
    async fn issuing_sets_an_http_only_token_cookie() {
        let harness = TestHarness::new();
        let app = test::init_service(harness.app()).await;

        let res = test::call_service(
            &app,
            jwt_request(json!({"email": "Buyer@Example.com"}))
                .insert_header(bearer(&harness.token_for(BUYER)))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("token cookie")
            .into_owned();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        let identity = harness
            .state
            .credentials
            .verify(Some(cookie.value()))
            .expect("issued token verifies");
        assert_eq!(identity.email().as_ref(), BUYER);

        let body: SessionAck = test::read_body_json(res).await;
        assert!(body.success);
    }

    #[rstest]
    #[actix_web::test]
    async fn an_existing_session_can_be_refreshed() {
        let harness = TestHarness::new();
        let app = test::init_service(harness.app()).await;

        let res = test::call_service(
            &app,
            jwt_request(json!({"email": BUYER}))
                .cookie(harness.cookie_for(BUYER))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.response().cookies().any(|c| c.name() == SESSION_COOKIE));
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_caller_cannot_mint_an_admin_session() {
        let harness = TestHarness::new();
        harness.register(ADMIN, Role::Admin, UserStatus::Verified).await;
        let victim = harness.register(BUYER, Role::Customer, UserStatus::None).await;
        let app = test::init_service(harness.app()).await;

        let res = test::call_service(&app, jwt_request(json!({"email": ADMIN})).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.response().cookies().next().is_none());
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({"code": "unauthorized", "message": "unauthorized access"})
        );

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/users/{}/fraud", victim.id()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let stored = harness
            .users
            .find_by_email(&Email::new(BUYER).expect("valid email"))
            .await
            .expect("lookup")
            .expect("victim present");
        assert_eq!(stored.status(), UserStatus::None);
    }

    #[rstest]
    #[actix_web::test]
    async fn session_for_another_identity_is_forbidden() {
        let harness = TestHarness::new();
        harness.register(ADMIN, Role::Admin, UserStatus::Verified).await;
        let app = test::init_service(harness.app()).await;

        let res = test::call_service(
            &app,
            jwt_request(json!({"email": ADMIN}))
                .insert_header(bearer(&harness.token_for(BUYER)))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(res.response().cookies().next().is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn public_policy_override_does_not_open_session_issue() {
        let policy = RoutePolicy::default()
            .with_overrides("issue_session=public")
            .expect("valid overrides");
        let harness = TestHarness::with_policy(policy);
        let app = test::init_service(harness.app()).await;

        let res = test::call_service(&app, jwt_request(json!({"email": ADMIN})).to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.response().cookies().next().is_none());
    }

    #[rstest]
    #[case(json!({"email": "not-an-email"}))]
    #[case(json!({"email": "   "}))]
    #[actix_web::test]
    async fn invalid_email_is_rejected(#[case] payload: Value) {
        let harness = TestHarness::new();
        let app = test::init_service(harness.app()).await;

        let res = test::call_service(
            &app,
            jwt_request(payload)
                .insert_header(bearer(&harness.token_for(BUYER)))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.response().cookies().next().is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_clears_the_cookie() {
        let harness = TestHarness::new();
        let app = test::init_service(harness.app()).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/logout").to_request())
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("removal cookie")
            .into_owned();
        assert_eq!(cookie.value(), "");
        assert_eq!(
            cookie.max_age(),
            Some(actix_web::cookie::time::Duration::ZERO)
        );
    }
}
