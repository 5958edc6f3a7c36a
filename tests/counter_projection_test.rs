mod common;

use common::{Harness, party, user};
use relation_service::application_port::*;
use relation_service::domain_model::*;

#[tokio::test]
async fn absent_counters_read_as_zero() {
    let h = Harness::new();

    assert_eq!(h.friends.get_friend_count(user(1)).await.unwrap(), 0);

    let counts = h
        .friends
        .get_many_friend_count(&[user(1), user(2)])
        .await
        .unwrap();
    assert_eq!(counts.len(), 2);
    assert!(counts.values().all(|c| *c == 0));
}

#[tokio::test]
async fn requests_count_for_both_users_and_acceptance_does_not() {
    let h = Harness::new();
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();
    h.friends
        .accept_friend_request(user(2), user(1))
        .await
        .unwrap();

    let events = h.drain_outbox().await;
    h.project_all(&events).await;

    let counts = h
        .friends
        .get_many_friend_count(&[user(1), user(2), user(3)])
        .await
        .unwrap();
    assert_eq!(counts[&user(1)], 1);
    assert_eq!(counts[&user(2)], 1);
    assert_eq!(counts[&user(3)], 0);
}

#[tokio::test]
async fn duplicated_and_reordered_delivery_converges() {
    let h = Harness::new();
    for n in 2..=4 {
        h.friends
            .create_friend_request(user(1), user(n))
            .await
            .unwrap();
    }
    h.friends
        .decline_friend_request(user(3), user(1))
        .await
        .unwrap();
    h.favorites.favor_party(user(1), party(9)).await.unwrap();
    h.favorites.favor_party(user(2), party(9)).await.unwrap();
    h.favorites.defavor_party(user(2), party(9)).await.unwrap();

    let events = h.drain_outbox().await;
    assert_eq!(events.len(), 7);

    // every event twice, newest first
    let mut delivery: Vec<EventEnvelope> = events.iter().rev().cloned().collect();
    delivery.extend(events.iter().cloned());
    h.project_all(&delivery).await;

    assert_eq!(h.friends.get_friend_count(user(1)).await.unwrap(), 2);
    assert_eq!(h.friends.get_friend_count(user(3)).await.unwrap(), 0);
    assert_eq!(h.friends.get_friend_count(user(4)).await.unwrap(), 1);
    assert_eq!(
        h.favorites.get_favorite_party_count(party(9)).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn defavoring_something_never_favored_emits_nothing() {
    let h = Harness::new();

    h.favorites.defavor_party(user(1), party(9)).await.unwrap();

    assert!(h.drain_outbox().await.is_empty());
}
