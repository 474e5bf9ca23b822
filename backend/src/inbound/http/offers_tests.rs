//! Handler tests for the offer ledger routes.

use super::*;
use crate::domain::ports::OfferLedger;
use crate::domain::{
    OfferFilter, OfferId, OfferStatus, PropertyId, Role, RoutePolicy, UserStatus,
};
use crate::inbound::http::test_utils::TestHarness;
use actix_web::http::StatusCode;
use actix_web::test;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const ADMIN: &str = "admin@example.com";
const OWNER: &str = "owner@example.com";
const BUYER: &str = "buyer@example.com";
const RIVAL: &str = "rival@example.com";

#[fixture]
fn harness() -> TestHarness {
    TestHarness::new()
}

fn status_of(body: &Value) -> Option<&str> {
    body.get("boughtStatus").and_then(Value::as_str)
}

#[rstest]
#[actix_web::test]
async fn submit_records_a_pending_offer(harness: TestHarness) {
    let property = harness.list_property(Some(OWNER));
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/offers")
            .cookie(harness.cookie_for(BUYER))
            .set_json(json!({
                "propertyId": property.to_string(),
                "userEmail": BUYER,
                "amount": 250_000
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(status_of(&body), Some("pending"));
    assert_eq!(body.get("amount").and_then(Value::as_i64), Some(250_000));
    assert_eq!(body.get("userEmail").and_then(Value::as_str), Some(BUYER));
}

#[rstest]
#[case(json!({"propertyId": "not-a-uuid", "userEmail": BUYER, "amount": 10}), StatusCode::BAD_REQUEST)]
#[case(json!({"propertyId": PropertyId::random().to_string(), "userEmail": BUYER, "amount": 0}), StatusCode::BAD_REQUEST)]
#[case(json!({"propertyId": PropertyId::random().to_string(), "userEmail": BUYER, "amount": 10}), StatusCode::NOT_FOUND)]
#[case(json!({"propertyId": PropertyId::random().to_string(), "userEmail": RIVAL, "amount": 10}), StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn submit_rejects_bad_offers(
    harness: TestHarness,
    #[case] payload: Value,
    #[case] expected: StatusCode,
) {
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/offers")
            .cookie(harness.cookie_for(BUYER))
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn anonymous_submit_is_accepted_by_default(harness: TestHarness) {
    let property = harness.list_property(None);
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(&app, anonymous_submit(property).to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("userEmail").and_then(Value::as_str), Some(BUYER));
}

#[rstest]
#[actix_web::test]
async fn policy_can_require_a_session_to_submit() {
    let policy = RoutePolicy::default()
        .with_overrides("submit_offer=authenticated")
        .expect("valid overrides");
    let harness = TestHarness::with_policy(policy);
    let property = harness.list_property(None);
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(&app, anonymous_submit(property).to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({"code": "unauthorized", "message": "unauthorized access"})
    );
}

fn anonymous_submit(property: PropertyId) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/offers")
        .set_json(json!({
            "propertyId": property.to_string(),
            "userEmail": BUYER,
            "amount": 100
        }))
}

#[rstest]
#[actix_web::test]
async fn list_filters_by_buyer_and_property(harness: TestHarness) {
    let first = harness.list_property(None);
    let second = harness.list_property(None);
    harness.offer(first, BUYER, 100).await;
    harness.offer(second, BUYER, 200).await;
    harness.offer(first, RIVAL, 300).await;
    let app = test::init_service(harness.app()).await;

    let list = |uri: String| {
        let app = &app;
        async move {
            let res = test::call_service(app, test::TestRequest::get().uri(&uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
            test::read_body_json::<Vec<Value>, _>(res).await
        }
    };

    assert_eq!(list("/offers".into()).await.len(), 3);
    assert_eq!(list(format!("/offers?userEmail={BUYER}")).await.len(), 2);
    assert_eq!(list(format!("/offers?propertyId={first}")).await.len(), 2);
    assert_eq!(
        list(format!("/offers?propertyId={first}&userEmail={RIVAL}"))
            .await
            .len(),
        1
    );
}

#[rstest]
#[actix_web::test]
async fn malformed_filter_is_an_invalid_request(harness: TestHarness) {
    let app = test::init_service(harness.app()).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/offers?propertyId=P100").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn get_unknown_offer_is_not_found(harness: TestHarness) {
    let app = test::init_service(harness.app()).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/offers/{}", OfferId::random()))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("message").and_then(Value::as_str), Some("Offer not found"));
}

#[rstest]
#[actix_web::test]
async fn last_accept_wins_across_siblings(harness: TestHarness) {
    harness.register(ADMIN, Role::Admin, UserStatus::None).await;
    let property = harness.list_property(None);
    let o1 = harness.offer(property, BUYER, 100).await;
    let o2 = harness.offer(property, RIVAL, 120).await;
    let app = test::init_service(harness.app()).await;
    let decide = |id: OfferId, verb: &'static str| {
        test::TestRequest::patch()
            .uri(&format!("/offers/{id}/{verb}"))
            .cookie(harness.cookie_for(ADMIN))
            .to_request()
    };

    let res = test::call_service(&app, decide(o1.id, "accept")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(&app, decide(o2.id, "accept")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(status_of(&body), Some("accepted"));

    let offers = harness
        .state
        .offers
        .list(&OfferFilter {
            property_id: Some(property),
            user_email: None,
        })
        .await
        .expect("list offers");
    let accepted: Vec<_> = offers
        .iter()
        .filter(|offer| offer.status == OfferStatus::Accepted)
        .collect();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].id, o2.id);
}

#[rstest]
#[actix_web::test]
async fn owner_may_decide_but_other_users_may_not(harness: TestHarness) {
    let property = harness.list_property(Some(OWNER));
    let offer = harness.offer(property, BUYER, 100).await;
    let app = test::init_service(harness.app()).await;

    let stranger = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/offers/{}/accept", offer.id))
            .cookie(harness.cookie_for(BUYER))
            .to_request(),
    )
    .await;
    assert_eq!(stranger.status(), StatusCode::FORBIDDEN);

    let owner = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/offers/{}/reject", offer.id))
            .cookie(harness.cookie_for(OWNER))
            .to_request(),
    )
    .await;
    assert_eq!(owner.status(), StatusCode::OK);
    let body: Value = test::read_body_json(owner).await;
    assert_eq!(status_of(&body), Some("rejected"));
}

#[rstest]
#[actix_web::test]
async fn rejecting_an_accepted_offer_is_refused(harness: TestHarness) {
    harness.register(ADMIN, Role::Admin, UserStatus::None).await;
    let property = harness.list_property(None);
    let offer = harness.offer(property, BUYER, 100).await;
    let app = test::init_service(harness.app()).await;
    let admin = harness.cookie_for(ADMIN);

    let accepted = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/offers/{}/accept", offer.id))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(accepted.status(), StatusCode::OK);

    let rejected = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/offers/{}/reject", offer.id))
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(rejected).await;
    assert_eq!(body.pointer("/details/code"), Some(&json!("invalid_transition")));
}

#[rstest]
#[actix_web::test]
async fn deciding_without_a_session_is_unauthorized(harness: TestHarness) {
    let property = harness.list_property(None);
    let offer = harness.offer(property, BUYER, 100).await;
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/offers/{}/accept", offer.id))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("unauthorized access")
    );
}
