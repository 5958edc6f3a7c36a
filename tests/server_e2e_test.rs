mod common;

use common::{eventually, memory_settings, party, user};
use relation_service::server::Server;
use std::time::Duration;

#[tokio::test]
async fn counters_follow_writes_through_the_relay() {
    let server = Server::try_new(&memory_settings()).await.unwrap();

    server
        .friend_service
        .create_friend_request(user(1), user(2))
        .await
        .unwrap();
    server
        .favorite_service
        .favor_party(user(1), party(9))
        .await
        .unwrap();

    let counts = eventually(Duration::from_secs(5), Duration::from_millis(50), || async {
        let counts = server
            .friend_service
            .get_many_friend_count(&[user(1), user(2)])
            .await
            .unwrap();
        let favorites = server
            .favorite_service
            .get_favorite_party_count(party(9))
            .await
            .unwrap();
        (counts[&user(1)] == 1 && counts[&user(2)] == 1 && favorites == 1).then_some(counts)
    })
    .await;
    assert_eq!(counts.len(), 2);

    server
        .friend_service
        .remove_friend_relation(user(2), user(1))
        .await
        .unwrap();

    eventually(Duration::from_secs(5), Duration::from_millis(50), || async {
        let count = server.friend_service.get_friend_count(user(1)).await.unwrap();
        (count == 0).then_some(())
    })
    .await;

    tokio::time::timeout(Duration::from_secs(5), server.shutdown())
        .await
        .unwrap();
}
