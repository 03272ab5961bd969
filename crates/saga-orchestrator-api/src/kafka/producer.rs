//! Kafka-backed implementation of [`MessageProducer`].

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use saga_orchestrator_core::{MessageProducer, OutboundMessage, SagaError, SagaResult, TopicConfig};

pub struct KafkaProducer {
    producer: FutureProducer,
    topics: TopicConfig,
}

impl KafkaProducer {
    pub fn new(bootstrap_servers: &str, topics: TopicConfig) -> SagaResult<Self> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| SagaError::DispatchFailed {
                message: format!("failed to create kafka producer: {e}"),
            })?;
        Ok(Self { producer, topics })
    }
}

#[async_trait]
impl MessageProducer for KafkaProducer {
    async fn send(&self, message: &OutboundMessage) -> SagaResult<()> {
        let topic = self.topics.resolve(message.topic);
        let payload = serde_json::to_vec(&message.value)?;
        let record = FutureRecord::to(topic).key(&message.key).payload(&payload);

        self.producer
            .send(record, Timeout::After(Duration::from_secs(5)))
            .await
            .map_err(|(error, _)| SagaError::DispatchFailed {
                message: format!("kafka produce to {topic} failed: {error}"),
            })?;
        Ok(())
    }
}
