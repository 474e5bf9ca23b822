//! Integration tests for the Diesel adapters against a real PostgreSQL.
//!
//! Run with `TEST_DATABASE_URL=postgres://…`; every test skips otherwise.
//! Each test works on fresh properties and unique emails, so the suite can
//! share one database and run in parallel.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use realscape::domain::ports::{
    OfferPersistenceError, OfferRepository, PropertyDirectory, UserRepository,
};
use realscape::domain::{
    Email, NewOffer, Offer, OfferAmount, OfferFilter, OfferId, OfferStatus, PropertyId, Role,
    UserProfile, UserRegistration, UserStatus,
};
use realscape::outbound::persistence::{
    DieselOfferRepository, DieselPropertyDirectory, DieselUserRepository,
};
use rstest::rstest;

mod support;

use support::{insert_property, test_pool, unique_email};

fn registration(email: &str) -> UserRegistration {
    UserRegistration {
        email: Email::new(email).expect("valid email"),
        profile: UserProfile::default(),
        created_at: Utc::now(),
    }
}

fn new_offer(property_id: PropertyId, buyer: &str, amount: i64) -> NewOffer {
    NewOffer {
        property_id,
        user_email: Email::new(buyer).expect("valid email"),
        amount: OfferAmount::new(amount).expect("positive amount"),
        submitted_at: Utc::now(),
    }
}

async fn seed_offers(
    repo: &DieselOfferRepository,
    property_id: PropertyId,
    count: i64,
) -> Vec<Offer> {
    let mut offers = Vec::new();
    for n in 1..=count {
        let offer = repo
            .insert(&new_offer(property_id, &unique_email("buyer"), 1_000 * n))
            .await
            .expect("insert offer");
        offers.push(offer);
    }
    offers
}

#[rstest]
#[tokio::test]
async fn users_are_inserted_once_and_transition_by_cas() {
    let Some(pool) = test_pool().await else { return };
    let repo = DieselUserRepository::new(pool);
    let email = unique_email("ada");

    let first = repo
        .insert_if_absent(&registration(&email))
        .await
        .expect("first insert");
    let second = repo
        .insert_if_absent(&registration(&email))
        .await
        .expect("second insert");
    assert_eq!(first.id(), second.id());
    assert_eq!(first.role(), Role::Customer);
    assert_eq!(first.status(), UserStatus::None);

    let requested = repo
        .compare_and_set_status(first.id(), UserStatus::None, UserStatus::Requested)
        .await
        .expect("cas")
        .expect("condition held");
    assert_eq!(requested.status(), UserStatus::Requested);

    let stale = repo
        .compare_and_set_status(first.id(), UserStatus::None, UserStatus::Requested)
        .await
        .expect("cas");
    assert!(stale.is_none());

    let promoted = repo
        .set_role(first.id(), Role::Agent)
        .await
        .expect("set role")
        .expect("user present");
    assert_eq!(promoted.role(), Role::Agent);
    assert_eq!(promoted.status(), UserStatus::Requested);

    assert!(repo.delete(first.id()).await.expect("delete"));
    assert!(
        repo.find_by_email(&Email::new(&email).expect("valid email"))
            .await
            .expect("lookup")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn offers_on_unknown_properties_are_refused() {
    let Some(pool) = test_pool().await else { return };
    let repo = DieselOfferRepository::new(pool);

    let err = repo
        .insert(&new_offer(PropertyId::random(), &unique_email("buyer"), 500))
        .await
        .expect_err("foreign key violation");
    assert!(matches!(err, OfferPersistenceError::UnknownProperty { .. }));
}

#[rstest]
#[tokio::test]
async fn property_directory_reads_owner_and_verification() {
    let Some(pool) = test_pool().await else { return };
    let owner = unique_email("owner");
    let property_id = insert_property(&pool, Some(&owner)).await;
    let directory = DieselPropertyDirectory::new(pool);

    let summary = directory
        .find(&property_id)
        .await
        .expect("lookup")
        .expect("property present");
    assert_eq!(
        summary.owner_email,
        Some(Email::new(&owner).expect("valid email"))
    );
    assert!(
        directory
            .find(&PropertyId::random())
            .await
            .expect("lookup")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn accept_rejects_siblings_and_last_accept_wins() {
    let Some(pool) = test_pool().await else { return };
    let property_id = insert_property(&pool, None).await;
    let repo = DieselOfferRepository::new(pool);
    let offers = seed_offers(&repo, property_id, 3).await;
    let (o1, o2) = (offers[0].id, offers[1].id);

    repo.accept_exclusive(&o1, Utc::now())
        .await
        .expect("accept o1")
        .expect("o1 present");
    let accepted = repo
        .accept_exclusive(&o2, Utc::now())
        .await
        .expect("accept o2")
        .expect("o2 present");
    assert_eq!(accepted.status, OfferStatus::Accepted);

    let stored = repo
        .list(&OfferFilter {
            property_id: Some(property_id),
            user_email: None,
        })
        .await
        .expect("list");
    assert_eq!(stored.len(), 3);
    for offer in stored {
        let expected = if offer.id == o2 {
            OfferStatus::Accepted
        } else {
            OfferStatus::Rejected
        };
        assert_eq!(offer.status, expected, "offer {}", offer.id);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_commit_exactly_one() {
    let Some(pool) = test_pool().await else { return };
    let property_id = insert_property(&pool, None).await;
    let repo = Arc::new(DieselOfferRepository::new(pool));
    let offers = seed_offers(&repo, property_id, 6).await;

    let tasks = offers.iter().map(|offer| {
        let repo = Arc::clone(&repo);
        let id = offer.id;
        tokio::spawn(async move { repo.accept_exclusive(&id, Utc::now()).await })
    });
    for outcome in join_all(tasks).await {
        outcome
            .expect("task joined")
            .expect("accept committed")
            .expect("offer present");
    }

    let accepted = repo
        .list(&OfferFilter {
            property_id: Some(property_id),
            user_email: None,
        })
        .await
        .expect("list")
        .into_iter()
        .filter(|offer| offer.status == OfferStatus::Accepted)
        .count();
    assert_eq!(accepted, 1);
}

#[rstest]
#[tokio::test]
async fn accept_of_missing_offer_is_none() {
    let Some(pool) = test_pool().await else { return };
    let repo = DieselOfferRepository::new(pool);
    let outcome = repo
        .accept_exclusive(&OfferId::random(), Utc::now())
        .await
        .expect("query runs");
    assert!(outcome.is_none());
}
