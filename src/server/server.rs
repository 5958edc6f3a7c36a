use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::EventType;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::server::*;
use crate::settings::{self, BusBackendKind, CounterBackendKind, Settings, StoreBackendKind};
use anyhow::anyhow;
use nanoid::nanoid;
use sqlx::{MySql, MySqlPool, Pool};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct StoreAdapters {
    tx_manager: Arc<dyn TxManager>,
    friend_relation_repo: Arc<dyn FriendRelationRepo>,
    favorite_party_repo: Arc<dyn FavoritePartyRepo>,
    party_participation_repo: Arc<dyn PartyParticipationRepo>,
    outbox_repo: Arc<dyn OutboxRepo>,
    pool: Option<MySqlPool>,
}

async fn build_store(store: &settings::Store) -> anyhow::Result<StoreAdapters> {
    match store.backend {
        StoreBackendKind::Memory => {
            let db = MemoryDatabase::new();
            Ok(StoreAdapters {
                tx_manager: Arc::new(MemoryTxManager::new(db.clone())),
                friend_relation_repo: Arc::new(MemoryFriendRelationRepo::new(db.clone())),
                favorite_party_repo: Arc::new(MemoryFavoritePartyRepo::new(db.clone())),
                party_participation_repo: Arc::new(MemoryPartyParticipationRepo::new(db)),
                outbox_repo: Arc::new(MemoryOutboxRepo::new()),
                pool: None,
            })
        }
        StoreBackendKind::Mysql => {
            let dsn = store
                .mysql_dsn
                .as_deref()
                .ok_or_else(|| anyhow!("store.mysql_dsn is required for the mysql backend"))?;
            let pool = Pool::<MySql>::connect(dsn).await?;
            Ok(StoreAdapters {
                tx_manager: Arc::new(MySqlTxManager::new(pool.clone())),
                friend_relation_repo: Arc::new(MySqlFriendRelationRepo::new(pool.clone())),
                favorite_party_repo: Arc::new(MySqlFavoritePartyRepo::new(pool.clone())),
                party_participation_repo: Arc::new(MySqlPartyParticipationRepo::new(
                    pool.clone(),
                )),
                outbox_repo: Arc::new(MySqlOutboxRepo::new()),
                pool: Some(pool),
            })
        }
    }
}

async fn build_counter_store(counter: &settings::Counter) -> anyhow::Result<Arc<dyn CounterStore>> {
    match counter.backend {
        CounterBackendKind::Memory => Ok(Arc::new(MemoryCounterStore::new())),
        CounterBackendKind::Redis => {
            let dsn = counter
                .redis_dsn
                .as_deref()
                .ok_or_else(|| anyhow!("counter.redis_dsn is required for the redis backend"))?;
            let redis_client = redis::Client::open(dsn)?;
            let redis_manager = redis_client.get_connection_manager().await?;
            Ok(Arc::new(RedisCounterStore::new(
                redis_manager,
                counter.key_prefix.clone(),
                counter.dedupe_ttl_secs,
            )))
        }
    }
}

fn build_bus(
    bus: &settings::Bus,
    run_id: &str,
    cancel: &CancellationToken,
) -> anyhow::Result<(Arc<dyn EventPublisher>, Arc<dyn EventConsumer>)> {
    match bus.backend {
        BusBackendKind::Memory => {
            let memory_bus = Arc::new(MemoryEventBus::new(cancel.clone()));
            let publisher: Arc<dyn EventPublisher> = memory_bus.clone();
            let consumer: Arc<dyn EventConsumer> = memory_bus;
            Ok((publisher, consumer))
        }
        BusBackendKind::Kafka => {
            let bootstrap = bus
                .bootstrap_servers
                .as_deref()
                .ok_or_else(|| anyhow!("bus.bootstrap_servers is required for the kafka backend"))?;
            let publisher: Arc<dyn EventPublisher> = Arc::new(KafkaPublisher::new(
                bootstrap,
                &format!("{}-pub-{}", bus.client_id, run_id),
            )?);
            let consumer: Arc<dyn EventConsumer> = Arc::new(KafkaConsumer::new(
                bootstrap,
                &format!("{}-sub-{}", bus.client_id, run_id),
                cancel.clone(),
            ));
            Ok((publisher, consumer))
        }
    }
}

pub struct Server {
    pub friend_service: Arc<dyn FriendService>,
    pub favorite_service: Arc<dyn FavoriteService>,
    pub participation_service: Arc<dyn ParticipationService>,
    pub request_timeout: Duration,
    task_handles: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
    cancel: CancellationToken,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);

        let store = build_store(&settings.store).await?;
        let counter_store = build_counter_store(&settings.counter).await?;

        let friend_service: Arc<dyn FriendService> = Arc::new(RealFriendService::new(
            store.friend_relation_repo.clone(),
            store.outbox_repo.clone(),
            counter_store.clone(),
            store.tx_manager.clone(),
        ));
        let favorite_service: Arc<dyn FavoriteService> = Arc::new(RealFavoriteService::new(
            store.favorite_party_repo.clone(),
            store.outbox_repo.clone(),
            counter_store.clone(),
            store.tx_manager.clone(),
        ));
        let participation_service: Arc<dyn ParticipationService> =
            Arc::new(RealParticipationService::new(
                store.party_participation_repo.clone(),
                store.tx_manager.clone(),
            ));

        // region runtime infra
        let cancel = CancellationToken::new();

        let (publisher, consumer) = build_bus(&settings.bus, &run_id, &cancel)?;

        let notifier = Notifier::new(
            store.tx_manager.clone(),
            store.outbox_repo.clone(),
            publisher,
            &settings.bus.topic_prefix,
            cancel.clone(),
        );
        let projection_handler: Arc<dyn EventHandler> = Arc::new(CounterProjectionHandler::new(
            Arc::new(CounterProjector::new(counter_store)),
        ));
        let reaper = InviteReaper::new(
            store.party_participation_repo.clone(),
            Duration::from_secs(settings.store.invite_purge_interval_secs.max(1)),
            cancel.clone(),
        );

        let topics: Vec<String> = EventType::ALL
            .iter()
            .map(|t| topic_name(&settings.bus.topic_prefix, *t))
            .collect();
        let consumer_group = settings.bus.consumer_group.clone();

        let projector_handle = tokio::spawn(async move {
            let topics: Vec<&str> = topics.iter().map(String::as_str).collect();
            if let Err(e) = consumer
                .run(&consumer_group, &topics, projection_handler)
                .await
            {
                error!("counter projector stopped: {e:#}");
            }
        });
        let notifier_handle = tokio::spawn(async move {
            if let Err(e) = notifier.run().await {
                error!("notifier stopped: {e:#}");
            }
        });
        let reaper_handle = tokio::spawn(async move {
            if let Err(e) = reaper.run().await {
                error!("invite reaper stopped: {e:#}");
            }
        });

        // endregion

        info!(%run_id, "server started");

        Ok(Self {
            friend_service,
            favorite_service,
            participation_service,
            request_timeout: Duration::from_millis(settings.http.request_timeout_ms),
            task_handles: Mutex::new(vec![
                ("notifier", notifier_handle),
                ("counter projector", projector_handle),
                ("invite reaper", reaper_handle),
            ]),
            cancel,
            pool: store.pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handles = match self.task_handles.lock() {
            Ok(mut lock) => std::mem::take(&mut *lock),
            Err(_) => Vec::new(),
        };
        for (name, handle) in handles {
            let r = handle.await;
            info!("{name} handle dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
