use crate::server::{EventConsumer, EventHandler, HandleOutcome, MAX_DELIVERY_ATTEMPTS};
use futures_util::StreamExt;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::{ClientConfig, Message};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct KafkaConsumer {
    bootstrap_servers: String,
    client_id: String,
    cancellation_token: CancellationToken,
}

impl KafkaConsumer {
    pub fn new(
        bootstrap_servers: &str,
        client_id: &str,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.to_string(),
            client_id: client_id.to_string(),
            cancellation_token,
        }
    }

    async fn ensure_topics(bootstrap: &str, topics: &[&str]) -> anyhow::Result<()> {
        let admin: AdminClient<_> = ClientConfig::new()
            .set("bootstrap.servers", bootstrap)
            .create()?;

        let new_topics: Vec<_> = topics
            .iter()
            .map(|t| NewTopic::new(t, 1, TopicReplication::Fixed(1)))
            .collect();

        // already-existing topics come back as per-topic errors, which are fine
        for result in admin
            .create_topics(&new_topics, &AdminOptions::new())
            .await?
        {
            if let Err((topic, code)) = result {
                debug!(%topic, ?code, "topic not created");
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl EventConsumer for KafkaConsumer {
    async fn run(
        &self,
        consumer_group_id: &str,
        topics: &[&str],
        handler: Arc<dyn EventHandler>,
    ) -> anyhow::Result<()> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("client.id", &self.client_id)
            .set("group.id", consumer_group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()?;

        Self::ensure_topics(&self.bootstrap_servers, topics).await?;
        consumer.subscribe(topics)?;
        info!(group = consumer_group_id, ?topics, "kafka consumer subscribed");

        let mut stream = consumer.stream();

        loop {
            let result = tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    info!("kafka consumer shutting down...");
                    break;
                }
                msg = stream.next() => msg,
            };

            let Some(message) = result else {
                error!("kafka consumer stream terminated");
                break;
            };

            match message {
                Err(e) => {
                    // broker hiccup
                    warn!(error = ?e, "consumer poll error");
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                Ok(m) => {
                    let payload = m.payload().unwrap_or(&[]);

                    // retry in place: committing a later offset would skip this one
                    let mut attempts = 0;
                    loop {
                        if self.cancellation_token.is_cancelled() {
                            break;
                        }
                        let handled = match handler.handle(payload).await {
                            Ok(HandleOutcome::Commit) => true,
                            Ok(HandleOutcome::Retry) => {
                                debug!(
                                    topic = m.topic(),
                                    partition = m.partition(),
                                    offset = m.offset(),
                                    "handler asked for redelivery"
                                );
                                false
                            }
                            Err(e) => {
                                error!(
                                    error = ?e,
                                    topic = m.topic(),
                                    offset = m.offset(),
                                    "handler error"
                                );
                                false
                            }
                        };

                        attempts += 1;
                        if !handled {
                            if attempts < MAX_DELIVERY_ATTEMPTS {
                                tokio::time::sleep(Duration::from_millis(50 * u64::from(attempts)))
                                    .await;
                                continue;
                            }
                            error!(
                                topic = m.topic(),
                                partition = m.partition(),
                                offset = m.offset(),
                                attempts,
                                "delivery attempts exhausted, message dropped"
                            );
                        }

                        if let Err(e) = consumer.commit_message(&m, CommitMode::Async) {
                            warn!(error = ?e, "commit failed but ignored");
                        }
                        break;
                    }
                }
            }
        }

        consumer.unsubscribe();

        Ok(())
    }
}
