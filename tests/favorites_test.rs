mod common;

use common::{Harness, party, user};
use relation_service::application_port::*;
use relation_service::domain_model::*;

#[tokio::test]
async fn favorite_is_visible_from_both_sides() {
    let h = Harness::new();

    let edge = h.favorites.favor_party(user(1), party(7)).await.unwrap();
    assert_eq!((edge.user_id, edge.party_id), (user(1), party(7)));

    let by_user = h
        .favorites
        .get_favorite_parties_by_user(user(1), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert_eq!(by_user.items, vec![edge.clone()]);

    let by_party = h
        .favorites
        .get_favorising_users_by_party(party(7), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert_eq!(by_party.items, vec![edge]);
}

#[tokio::test]
async fn favoring_twice_is_already_exists() {
    let h = Harness::new();
    h.favorites.favor_party(user(1), party(7)).await.unwrap();

    let err = h
        .favorites
        .favor_party(user(1), party(7))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn defavor_removes_from_both_listings() {
    let h = Harness::new();
    h.favorites.favor_party(user(1), party(7)).await.unwrap();

    h.favorites.defavor_party(user(1), party(7)).await.unwrap();

    let by_user = h
        .favorites
        .get_favorite_parties_by_user(user(1), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    let by_party = h
        .favorites
        .get_favorising_users_by_party(party(7), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert!(by_user.items.is_empty());
    assert!(by_party.items.is_empty());

    let types: Vec<_> = h
        .drain_outbox()
        .await
        .iter()
        .map(|e| e.body.event_type())
        .collect();
    assert_eq!(
        types,
        vec![EventType::PartyFavorited, EventType::PartyUnfavorited]
    );
}

#[tokio::test]
async fn favorites_default_to_pages_of_ten() {
    let h = Harness::new();
    for n in 1..=12 {
        h.favorites.favor_party(user(1), party(n)).await.unwrap();
    }

    let first = h
        .favorites
        .get_favorite_parties_by_user(user(1), &PageCursor::first(), PageSize(0))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 10);

    let rest = h
        .favorites
        .get_favorite_parties_by_user(user(1), &first.next, PageSize(0))
        .await
        .unwrap();
    assert_eq!(
        rest.items.iter().map(|e| e.party_id).collect::<Vec<_>>(),
        vec![party(11), party(12)]
    );
    assert!(rest.is_last());
}
