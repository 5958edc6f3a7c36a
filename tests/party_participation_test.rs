mod common;

use common::{Harness, party, user};
use relation_service::application_port::*;
use relation_service::domain_model::*;
use std::time::Duration;

const HOUR: Duration = Duration::from_secs(3600);

async fn invites_of(h: &Harness, n: u128) -> Vec<PartyId> {
    h.participation
        .get_user_invites(user(n), &PageCursor::first(), PageSize(0))
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|invite| invite.party_id)
        .collect()
}

#[tokio::test]
async fn zero_validity_is_invalid() {
    let h = Harness::new();

    let err = h
        .participation
        .invite(user(1), user(2), party(9), Duration::ZERO)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(invites_of(&h, 1).await.is_empty());
}

#[tokio::test]
async fn live_invite_cannot_be_issued_twice() {
    let h = Harness::new();
    h.participation
        .invite(user(1), user(2), party(9), HOUR)
        .await
        .unwrap();

    let err = h
        .participation
        .invite(user(1), user(3), party(9), HOUR)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(invites_of(&h, 1).await, vec![party(9)]);
}

#[tokio::test]
async fn expired_invite_is_hidden_and_replaceable() {
    let h = Harness::new();
    h.participation
        .invite(user(1), user(2), party(9), Duration::from_millis(5))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(invites_of(&h, 1).await.is_empty());
    let err = h.participation.accept(user(1), party(9)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);

    let renewed = h
        .participation
        .invite(user(1), user(3), party(9), HOUR)
        .await
        .unwrap();
    assert_eq!(renewed.inviter_id, user(3));
    assert_eq!(invites_of(&h, 1).await, vec![party(9)]);
}

#[tokio::test]
async fn accept_turns_the_invite_into_participation() {
    let h = Harness::new();
    h.participation
        .invite(user(1), user(2), party(9), HOUR)
        .await
        .unwrap();

    let participant = h.participation.accept(user(1), party(9)).await.unwrap();
    assert_eq!((participant.user_id, participant.party_id), (user(1), party(9)));

    assert!(invites_of(&h, 1).await.is_empty());
    let members = h
        .participation
        .get_party_participants(party(9), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert_eq!(members.items, vec![participant.clone()]);
    let parties = h
        .participation
        .get_user_parties(user(1), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert_eq!(parties.items, vec![participant]);
}

#[tokio::test]
async fn accept_without_invite_is_failed_precondition() {
    let h = Harness::new();

    let err = h.participation.accept(user(1), party(9)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
    let members = h
        .participation
        .get_party_participants(party(9), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert!(members.items.is_empty());
}

#[tokio::test]
async fn accept_by_existing_participant_keeps_the_invite() {
    let h = Harness::new();
    h.participation.join(user(1), party(9)).await.unwrap();
    h.participation
        .invite(user(1), user(2), party(9), HOUR)
        .await
        .unwrap();

    let err = h.participation.accept(user(1), party(9)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(invites_of(&h, 1).await, vec![party(9)]);
}

#[tokio::test]
async fn decline_drops_the_invite() {
    let h = Harness::new();
    h.participation
        .invite(user(1), user(2), party(9), HOUR)
        .await
        .unwrap();

    h.participation.decline(user(1), party(9)).await.unwrap();
    h.participation.decline(user(1), party(9)).await.unwrap();

    assert!(invites_of(&h, 1).await.is_empty());
}

#[tokio::test]
async fn join_twice_then_leave() {
    let h = Harness::new();
    h.participation.join(user(1), party(9)).await.unwrap();

    let err = h.participation.join(user(1), party(9)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    h.participation.leave(user(1), party(9)).await.unwrap();
    h.participation.leave(user(1), party(9)).await.unwrap();

    let parties = h
        .participation
        .get_user_parties(user(1), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert!(parties.items.is_empty());
}

#[tokio::test]
async fn participants_page_by_user_id() {
    let h = Harness::new();
    for n in 1..=3 {
        h.participation.join(user(n), party(9)).await.unwrap();
    }
    h.participation.join(user(1), party(8)).await.unwrap();

    let first = h
        .participation
        .get_party_participants(party(9), &PageCursor::first(), PageSize(2))
        .await
        .unwrap();
    assert_eq!(
        first.items.iter().map(|p| p.user_id).collect::<Vec<_>>(),
        vec![user(1), user(2)]
    );

    let rest = h
        .participation
        .get_party_participants(party(9), &first.next, PageSize(2))
        .await
        .unwrap();
    assert_eq!(
        rest.items.iter().map(|p| p.user_id).collect::<Vec<_>>(),
        vec![user(3)]
    );
    assert!(rest.is_last());

    let err = h
        .participation
        .get_user_parties(user(1), &first.next, PageSize(2))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn purge_removes_only_expired_invites() {
    let h = Harness::new();
    h.participation
        .invite(user(1), user(2), party(8), Duration::from_millis(5))
        .await
        .unwrap();
    h.participation
        .invite(user(1), user(2), party(9), HOUR)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let purged = h
        .party_participation_repo
        .purge_expired_invites(chrono::Utc::now())
        .await
        .unwrap();

    assert_eq!(purged, 1);
    assert_eq!(invites_of(&h, 1).await, vec![party(9)]);
}
