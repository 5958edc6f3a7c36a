#![allow(dead_code)]

use relation_service::application_impl::*;
use relation_service::domain_model::*;
use relation_service::domain_port::*;
use relation_service::infra_memory::*;
use relation_service::settings::{Settings, parse_settings_toml};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub fn user(n: u128) -> UserId {
    UserId(uuid::Uuid::from_u128(n))
}

pub fn party(n: u128) -> PartyId {
    PartyId(uuid::Uuid::from_u128(n))
}

/// Services wired onto the in-memory backends, without the background relay.
pub struct Harness {
    pub tx_manager: Arc<dyn TxManager>,
    pub outbox_repo: Arc<dyn OutboxRepo>,
    pub party_participation_repo: Arc<dyn PartyParticipationRepo>,
    pub counter_store: Arc<MemoryCounterStore>,
    pub friends: Arc<RealFriendService>,
    pub favorites: Arc<RealFavoriteService>,
    pub participation: Arc<RealParticipationService>,
    pub projector: CounterProjector,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_outbox(Arc::new(MemoryOutboxRepo::new()))
    }

    /// Same wiring, with the outbox repository swapped out.
    pub fn with_outbox(outbox_repo: Arc<dyn OutboxRepo>) -> Self {
        let db = MemoryDatabase::new();
        let tx_manager: Arc<dyn TxManager> = Arc::new(MemoryTxManager::new(db.clone()));
        let friend_relation_repo: Arc<dyn FriendRelationRepo> =
            Arc::new(MemoryFriendRelationRepo::new(db.clone()));
        let favorite_party_repo: Arc<dyn FavoritePartyRepo> =
            Arc::new(MemoryFavoritePartyRepo::new(db.clone()));
        let party_participation_repo: Arc<dyn PartyParticipationRepo> =
            Arc::new(MemoryPartyParticipationRepo::new(db));
        let counter_store = Arc::new(MemoryCounterStore::new());

        let friends = Arc::new(RealFriendService::new(
            friend_relation_repo,
            outbox_repo.clone(),
            counter_store.clone(),
            tx_manager.clone(),
        ));
        let favorites = Arc::new(RealFavoriteService::new(
            favorite_party_repo,
            outbox_repo.clone(),
            counter_store.clone(),
            tx_manager.clone(),
        ));
        let participation = Arc::new(RealParticipationService::new(
            party_participation_repo.clone(),
            tx_manager.clone(),
        ));
        let projector = CounterProjector::new(counter_store.clone());

        Self {
            tx_manager,
            outbox_repo,
            party_participation_repo,
            counter_store,
            friends,
            favorites,
            participation,
            projector,
        }
    }

    /// Takes every pending event out of the outbox, oldest first.
    pub async fn drain_outbox(&self) -> Vec<EventEnvelope> {
        let mut tx = self.tx_manager.begin().await.unwrap();
        let batch = self
            .outbox_repo
            .claim_ready_batch_in_tx(&mut *tx, chrono::Utc::now(), 1024)
            .await
            .unwrap();
        for event in &batch {
            self.outbox_repo
                .mark_delivered_in_tx(&mut *tx, event.event_id, chrono::Utc::now())
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();

        batch
            .into_iter()
            .map(|event| serde_json::from_value(event.payload_json).unwrap())
            .collect()
    }

    pub async fn project_all(&self, events: &[EventEnvelope]) {
        for envelope in events {
            self.projector.project(envelope).await.unwrap();
        }
    }
}

pub fn memory_settings() -> Settings {
    parse_settings_toml(
        r#"
[http]
address = "127.0.0.1:0"
request_timeout_ms = 2000

[log]
filter = "info"

[store]
backend = "memory"
invite_purge_interval_secs = 1

[counter]
backend = "memory"

[bus]
backend = "memory"
"#,
    )
    .unwrap()
}

pub async fn eventually<T, F, Fut>(timeout: Duration, interval: Duration, mut f: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = std::time::Instant::now();
    loop {
        if let Some(v) = f().await {
            return v;
        }
        if start.elapsed() > timeout {
            panic!("condition not met within {:?}", timeout);
        }
        tokio::time::sleep(interval).await;
    }
}
