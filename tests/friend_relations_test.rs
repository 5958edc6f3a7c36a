mod common;

use chrono::{DateTime, Utc};
use common::{Harness, user};
use relation_service::application_port::*;
use relation_service::domain_model::*;
use relation_service::domain_port::*;
use relation_service::infra_memory::MemoryOutboxRepo;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn request_lands_in_the_targets_partition_as_pending() {
    let h = Harness::new();

    let edge = h
        .friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();
    assert_eq!((edge.owner, edge.peer, edge.accepted), (user(2), user(1), false));

    let incoming = h
        .friends
        .get_incoming_friend_requests(user(2), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert_eq!(incoming.items, vec![edge]);
    assert!(incoming.is_last());

    let friends = h
        .friends
        .get_friends_of_user(user(2), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert!(friends.items.is_empty());
}

#[tokio::test]
async fn duplicate_request_is_already_exists_and_emits_once() {
    let h = Harness::new();

    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();
    let err = h
        .friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let events = h.drain_outbox().await;
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].body,
        RelationEvent::FriendRequested(FriendPair {
            user_id: user(1),
            friend_id: user(2),
        })
    );
}

#[tokio::test]
async fn requesting_yourself_is_invalid() {
    let h = Harness::new();

    let err = h
        .friends
        .create_friend_request(user(1), user(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn accept_makes_both_directions_accepted() {
    let h = Harness::new();
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();

    h.friends
        .accept_friend_request(user(2), user(1))
        .await
        .unwrap();

    for (owner, peer) in [(user(1), user(2)), (user(2), user(1))] {
        let page = h
            .friends
            .get_friends_of_user(owner, &PageCursor::first(), PageSize(0))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].peer, peer);
        assert!(page.items[0].accepted);
        assert!(page.items[0].accepted_at.is_some());
    }

    let incoming = h
        .friends
        .get_incoming_friend_requests(user(2), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert!(incoming.items.is_empty());
}

#[tokio::test]
async fn accept_without_pending_request_fails_and_writes_nothing() {
    let h = Harness::new();

    let err = h
        .friends
        .accept_friend_request(user(2), user(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);

    // the mirror edge must not exist either
    let err = h
        .friends
        .get_friend_relation(user(1), user(2))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(h.drain_outbox().await.is_empty());
}

#[tokio::test]
async fn second_accept_is_failed_precondition() {
    let h = Harness::new();
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();
    h.friends
        .accept_friend_request(user(2), user(1))
        .await
        .unwrap();

    let err = h
        .friends
        .accept_friend_request(user(2), user(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
}

#[tokio::test]
async fn concurrent_accepts_have_exactly_one_winner() {
    let h = Harness::new();
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();
    h.drain_outbox().await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let friends = h.friends.clone();
        tasks.push(tokio::spawn(async move {
            friends.accept_friend_request(user(2), user(1)).await
        }));
    }

    let mut wins = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => wins += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::FailedPrecondition),
        }
    }
    assert_eq!(wins, 1);

    let accepted: Vec<_> = h
        .drain_outbox()
        .await
        .into_iter()
        .filter(|e| e.body.event_type() == EventType::FriendAccepted)
        .collect();
    assert_eq!(accepted.len(), 1);
}

#[tokio::test]
async fn decline_drops_the_pending_request_only() {
    let h = Harness::new();
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();

    h.friends
        .decline_friend_request(user(2), user(1))
        .await
        .unwrap();
    // absent is fine
    h.friends
        .decline_friend_request(user(2), user(1))
        .await
        .unwrap();

    let err = h
        .friends
        .get_friend_relation(user(1), user(2))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let types: Vec<_> = h
        .drain_outbox()
        .await
        .iter()
        .map(|e| e.body.event_type())
        .collect();
    assert_eq!(types, vec![EventType::FriendRequested, EventType::FriendRemoved]);
}

#[tokio::test]
async fn remove_clears_both_listings_and_is_idempotent() {
    let h = Harness::new();
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();
    h.friends
        .accept_friend_request(user(2), user(1))
        .await
        .unwrap();

    h.friends
        .remove_friend_relation(user(1), user(2))
        .await
        .unwrap();
    h.friends
        .remove_friend_relation(user(2), user(1))
        .await
        .unwrap();

    for owner in [user(1), user(2)] {
        let page = h
            .friends
            .get_friends_of_user(owner, &PageCursor::first(), PageSize(0))
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }

    let removed = h
        .drain_outbox()
        .await
        .into_iter()
        .filter(|e| e.body.event_type() == EventType::FriendRemoved)
        .count();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn relation_is_found_from_either_side() {
    let h = Harness::new();
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();

    let a = h.friends.get_friend_relation(user(1), user(2)).await.unwrap();
    let b = h.friends.get_friend_relation(user(2), user(1)).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.owner, user(2));
}

#[tokio::test]
async fn pages_walk_the_whole_listing_and_end_with_an_empty_cursor() {
    let h = Harness::new();
    let owner = user(100);
    for n in 1..=5 {
        h.friends
            .create_friend_request(user(n), owner)
            .await
            .unwrap();
        h.friends.accept_friend_request(owner, user(n)).await.unwrap();
    }

    let mut sizes = Vec::new();
    let mut seen = Vec::new();
    let mut cursor = PageCursor::first();
    loop {
        let page = h
            .friends
            .get_friends_of_user(owner, &cursor, PageSize(2))
            .await
            .unwrap();
        sizes.push(page.items.len());
        seen.extend(page.items.iter().map(|e| e.peer));

        // cursors survive the wire form
        cursor = PageCursor::decode(&page.next.encode()).unwrap();
        if cursor.is_empty() {
            break;
        }
    }

    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(seen, (1..=5).map(user).collect::<Vec<_>>());
}

#[tokio::test]
async fn exact_multiple_of_the_page_size_still_terminates() {
    let h = Harness::new();
    let owner = user(100);
    for n in 1..=4 {
        h.friends
            .create_friend_request(user(n), owner)
            .await
            .unwrap();
    }

    let first = h
        .friends
        .get_incoming_friend_requests(owner, &PageCursor::first(), PageSize(2))
        .await
        .unwrap();
    let second = h
        .friends
        .get_incoming_friend_requests(owner, &first.next, PageSize(2))
        .await
        .unwrap();

    assert_eq!(second.items.len(), 2);
    assert!(second.is_last());
}

#[tokio::test]
async fn cursor_from_another_listing_is_rejected() {
    let h = Harness::new();
    let owner = user(100);
    for n in 1..=3 {
        h.friends
            .create_friend_request(user(n), owner)
            .await
            .unwrap();
    }

    let requests = h
        .friends
        .get_incoming_friend_requests(owner, &PageCursor::first(), PageSize(1))
        .await
        .unwrap();
    let err = h
        .friends
        .get_friends_of_user(owner, &requests.next, PageSize(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = h
        .friends
        .get_friends_of_user(owner, &PageCursor::from_bytes(b"junk".to_vec()), PageSize(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn crossing_request_is_already_exists() {
    let h = Harness::new();
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();

    let err = h
        .friends
        .create_friend_request(user(2), user(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let incoming_1 = h
        .friends
        .get_incoming_friend_requests(user(1), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert!(incoming_1.items.is_empty());
    assert_eq!(h.drain_outbox().await.len(), 1);
}

#[tokio::test]
async fn crossing_requests_leave_counters_consistent() {
    let h = Harness::new();
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();
    let _ = h.friends.create_friend_request(user(2), user(1)).await;
    h.friends
        .accept_friend_request(user(2), user(1))
        .await
        .unwrap();
    h.friends
        .remove_friend_relation(user(1), user(2))
        .await
        .unwrap();

    let events = h.drain_outbox().await;
    h.project_all(&events).await;

    let counts = h
        .friends
        .get_many_friend_count(&[user(1), user(2)])
        .await
        .unwrap();
    assert_eq!(counts[&user(1)], 0);
    assert_eq!(counts[&user(2)], 0);
}

/// Never finishes enqueueing `FriendAccepted`, so an accept stays parked inside its batch.
struct StallOnAccept(MemoryOutboxRepo);

#[async_trait::async_trait]
impl OutboxRepo for StallOnAccept {
    async fn enqueue_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        event: &OutboxEvent,
    ) -> anyhow::Result<()> {
        if event.event_type == EventType::FriendAccepted {
            std::future::pending::<()>().await;
        }
        self.0.enqueue_in_tx(tx, event).await
    }

    async fn claim_ready_batch_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        now: DateTime<Utc>,
        limit: u32,
    ) -> anyhow::Result<Vec<OutboxEvent>> {
        self.0.claim_ready_batch_in_tx(tx, now, limit).await
    }

    async fn mark_delivered_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        event_id: EventId,
        delivered_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.0.mark_delivered_in_tx(tx, event_id, delivered_at).await
    }

    async fn reschedule_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        event_id: EventId,
        next_attempt_at: DateTime<Utc>,
        last_error: &str,
    ) -> anyhow::Result<()> {
        self.0
            .reschedule_in_tx(tx, event_id, next_attempt_at, last_error)
            .await
    }
}

#[tokio::test]
async fn abandoned_accept_leaves_the_request_pending() {
    let h = Harness::with_outbox(Arc::new(StallOnAccept(MemoryOutboxRepo::new())));
    h.friends
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();
    h.drain_outbox().await;

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        h.friends.accept_friend_request(user(2), user(1)),
    )
    .await;
    assert!(abandoned.is_err());

    let edge = h
        .friends
        .get_friend_relation(user(2), user(1))
        .await
        .unwrap();
    assert_eq!((edge.owner, edge.accepted), (user(2), false));
    for n in [1, 2] {
        let friends = h
            .friends
            .get_friends_of_user(user(n), &PageCursor::first(), PageSize(0))
            .await
            .unwrap();
        assert!(friends.items.is_empty());
    }
    assert!(h.drain_outbox().await.is_empty());
}
