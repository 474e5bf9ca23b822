//! Handler tests for the user registry routes.

use super::*;
use crate::domain::{Operation, RoutePolicy, UserId, UserStatus};
use crate::inbound::http::test_utils::TestHarness;
use actix_web::http::StatusCode;
use actix_web::test;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const ADMIN: &str = "admin@example.com";
const BUYER: &str = "buyer@example.com";

#[fixture]
fn harness() -> TestHarness {
    TestHarness::new()
}

#[rstest]
#[actix_web::test]
async fn ensure_user_creates_a_customer_with_profile(harness: TestHarness) {
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/users/Buyer@Example.com")
            .set_json(json!({"name": "Ada", "photoUrl": "https://img.example.com/ada.png"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("email").and_then(Value::as_str), Some(BUYER));
    assert_eq!(body.get("role").and_then(Value::as_str), Some("customer"));
    assert_eq!(body.get("status").and_then(Value::as_str), Some("none"));
    assert_eq!(body.get("name").and_then(Value::as_str), Some("Ada"));
}

#[rstest]
#[actix_web::test]
async fn ensure_user_is_idempotent_and_accepts_no_body(harness: TestHarness) {
    let existing = harness.register(BUYER, Role::Agent, UserStatus::Verified).await;
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post().uri("/users/buyer@example.com").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let expected_id = existing.id().to_string();
    assert_eq!(
        body.get("id").and_then(Value::as_str),
        Some(expected_id.as_str())
    );
    assert_eq!(body.get("role").and_then(Value::as_str), Some("agent"));
}

#[rstest]
#[actix_web::test]
async fn get_role_returns_null_for_unknown_users(harness: TestHarness) {
    harness.register(ADMIN, Role::Admin, UserStatus::None).await;
    let app = test::init_service(harness.app()).await;

    let known = test::call_service(
        &app,
        test::TestRequest::get().uri("/users/role/admin@example.com").to_request(),
    )
    .await;
    let known: RoleResponse = test::read_body_json(known).await;
    assert_eq!(known.role, Some(Role::Admin));

    let unknown = test::call_service(
        &app,
        test::TestRequest::get().uri("/users/role/nobody@example.com").to_request(),
    )
    .await;
    let unknown: Value = test::read_body_json(unknown).await;
    assert_eq!(unknown, json!({"role": null}));
}

#[rstest]
#[actix_web::test]
async fn request_upgrade_moves_status_to_requested_once(harness: TestHarness) {
    harness.register(BUYER, Role::Customer, UserStatus::None).await;
    let app = test::init_service(harness.app()).await;
    let request = || {
        test::TestRequest::patch()
            .uri("/users/buyer@example.com")
            .cookie(harness.cookie_for(BUYER))
            .to_request()
    };

    let first = test::call_service(&app, request()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let body: Value = test::read_body_json(first).await;
    assert_eq!(body.get("status").and_then(Value::as_str), Some("requested"));

    let second = test::call_service(&app, request()).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(second).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("You have already requested, wait for some time.")
    );
    assert_eq!(body.pointer("/details/code"), Some(&json!("already_requested")));
}

#[rstest]
#[actix_web::test]
async fn request_upgrade_requires_matching_identity(harness: TestHarness) {
    harness.register(BUYER, Role::Customer, UserStatus::None).await;
    let app = test::init_service(harness.app()).await;

    let anonymous = test::call_service(
        &app,
        test::TestRequest::patch().uri("/users/buyer@example.com").to_request(),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let someone_else = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri("/users/buyer@example.com")
            .cookie(harness.cookie_for("mallory@example.com"))
            .to_request(),
    )
    .await;
    assert_eq!(someone_else.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn fraud_flag_blocks_upgrade_and_survives_role_change(harness: TestHarness) {
    harness.register(ADMIN, Role::Admin, UserStatus::None).await;
    let buyer = harness.register(BUYER, Role::Customer, UserStatus::None).await;
    let app = test::init_service(harness.app()).await;
    let admin = harness.cookie_for(ADMIN);

    let flagged = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/users/{}/fraud", buyer.id()))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(flagged.status(), StatusCode::OK);

    let upgrade = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri("/users/buyer@example.com")
            .cookie(harness.cookie_for(BUYER))
            .to_request(),
    )
    .await;
    assert_eq!(upgrade.status(), StatusCode::BAD_REQUEST);

    let promoted = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/users/{}/role", buyer.id()))
            .cookie(admin)
            .set_json(json!({"role": "agent"}))
            .to_request(),
    )
    .await;
    assert_eq!(promoted.status(), StatusCode::OK);
    let body: Value = test::read_body_json(promoted).await;
    assert_eq!(body.get("role").and_then(Value::as_str), Some("agent"));
    assert_eq!(body.get("status").and_then(Value::as_str), Some("fraud"));
}

#[rstest]
#[actix_web::test]
async fn set_role_on_unknown_user_is_not_found(harness: TestHarness) {
    harness.register(ADMIN, Role::Admin, UserStatus::None).await;
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/users/{}/role", UserId::random()))
            .cookie(harness.cookie_for(ADMIN))
            .set_json(json!({"role": "agent"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("message").and_then(Value::as_str), Some("User not found"));
}

#[rstest]
#[case("/users", test::TestRequest::get())]
#[case("/users/3fa85f64-5717-4562-b3fc-2c963f66afa6/fraud", test::TestRequest::put())]
#[case("/users/3fa85f64-5717-4562-b3fc-2c963f66afa6", test::TestRequest::delete())]
#[actix_web::test]
async fn admin_routes_refuse_customers(
    harness: TestHarness,
    #[case] uri: &str,
    #[case] request: test::TestRequest,
) {
    harness.register(BUYER, Role::Customer, UserStatus::None).await;
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        request.uri(uri).cookie(harness.cookie_for(BUYER)).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn admin_lists_and_removes_users(harness: TestHarness) {
    harness.register(ADMIN, Role::Admin, UserStatus::None).await;
    let buyer = harness.register(BUYER, Role::Customer, UserStatus::None).await;
    let app = test::init_service(harness.app()).await;
    let admin = harness.cookie_for(ADMIN);

    let listed = test::call_service(
        &app,
        test::TestRequest::get().uri("/users").cookie(admin.clone()).to_request(),
    )
    .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let users: Vec<Value> = test::read_body_json(listed).await;
    assert_eq!(users.len(), 2);

    let removed = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/users/{}", buyer.id()))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let again = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/users/{}", buyer.id()))
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn role_lookup_can_be_made_private_by_policy() {
    let policy = RoutePolicy::default()
        .with_overrides("read_role=authenticated")
        .expect("valid override");
    let harness = TestHarness::with_policy(policy);
    assert_eq!(
        harness.policy.requirement(Operation::ReadRole).to_string(),
        "authenticated"
    );
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/users/role/buyer@example.com").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
