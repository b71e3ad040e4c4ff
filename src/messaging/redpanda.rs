use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    consumer::{Consumer, StreamConsumer},
    Message,
};

use crate::config::KafkaConfig;
use super::MessageSource;

/// Consumer-group member reading one topic.
///
/// Offsets are auto-committed, so delivery is at-most-once from the
/// listener's point of view: a message that fails processing is not redelivered.
pub struct RedpandaConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl RedpandaConsumer {
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .context("Failed to create Redpanda consumer")?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .with_context(|| format!("Failed to subscribe to {}", config.topic))?;

        tracing::info!(
            brokers = %config.brokers,
            topic = %config.topic,
            group_id = %config.group_id,
            "Subscribed to Redpanda topic"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
        })
    }
}

#[async_trait]
impl MessageSource for RedpandaConsumer {
    async fn next_message(&self) -> Result<Vec<u8>> {
        let message = self
            .consumer
            .recv()
            .await
            .with_context(|| format!("Failed to read from {}", self.topic))?;

        tracing::debug!(
            topic = %message.topic(),
            partition = message.partition(),
            offset = message.offset(),
            "Received message"
        );

        Ok(message.payload().map(<[u8]>::to_vec).unwrap_or_default())
    }
}
