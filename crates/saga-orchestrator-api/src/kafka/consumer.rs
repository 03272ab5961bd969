//! Kafka consumer loops: one per status topic feeding the correlator, plus the
//! saga command consumer that ingests new sagas (§4.6, §5 "one worker per topic").
//!
//! Message parsing is split out as plain functions over bytes/headers rather than
//! `BorrowedMessage` itself, so it can be unit tested without a live broker.

use std::sync::Arc;

use futures_util::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{Headers, Message};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

use saga_orchestrator_core::{
    Correlator, EventTopic, Saga, SagaExecutor, SagaType, StatusEvent, Step,
};

fn build_consumer(bootstrap_servers: &str, group_id: &str, topic: &str) -> Option<StreamConsumer> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", bootstrap_servers)
        .set("group.id", group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .create()
        .map_err(|e| tracing::error!(error = %e, topic, "failed to create kafka consumer"))
        .ok()?;
    if let Err(e) = consumer.subscribe(&[topic]) {
        tracing::error!(error = %e, topic, "failed to subscribe to topic");
        return None;
    }
    Some(consumer)
}

fn header_value<H: Headers>(headers: &H, key: &str) -> Option<String> {
    for i in 0..headers.count() {
        let header = headers.get(i);
        if header.key == key {
            return header
                .value
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned());
        }
    }
    None
}

fn parse_status_event(payload: &[u8], topic: EventTopic) -> Option<StatusEvent> {
    let value: Value = serde_json::from_slice(payload).ok()?;
    let transaction_id = Uuid::parse_str(value.get("transactionId")?.as_str()?).ok()?;
    let event_type = value.get("type")?.as_str()?.to_string();
    let body = value.get("body").cloned().unwrap_or_else(|| value.clone());
    Some(StatusEvent {
        topic,
        event_type,
        transaction_id,
        body,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SagaCommandWire {
    transaction_id: Uuid,
    saga_type: SagaType,
    initiated_by: String,
    steps: Vec<Step>,
}

fn parse_saga_command(payload: &[u8], tenant_id: String) -> Option<Saga> {
    let wire: SagaCommandWire = serde_json::from_slice(payload)
        .map_err(|e| tracing::warn!(error = %e, "malformed saga command payload"))
        .ok()?;
    Some(Saga {
        transaction_id: wire.transaction_id,
        saga_type: wire.saga_type,
        initiated_by: wire.initiated_by,
        tenant_id,
        steps: wire.steps,
    })
}

/// Runs until `shutdown` is signaled or the stream ends; intended to be spawned
/// as its own task and cancelled on shutdown (§5).
pub async fn run_status_consumer(
    bootstrap_servers: String,
    group_id: String,
    topic: String,
    event_topic: EventTopic,
    correlator: Arc<Correlator>,
    mut shutdown: watch::Receiver<bool>,
) {
    let Some(consumer) = build_consumer(&bootstrap_servers, &group_id, &topic) else {
        return;
    };
    let mut stream = consumer.stream();
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                tracing::info!(topic, "shutdown signal received, stopping consumer");
                return;
            }
            next = stream.next() => {
                let Some(result) = next else { return };
                match result {
                    Ok(message) => match message.payload() {
                        Some(payload) => {
                            if let Some(event) = parse_status_event(payload, event_topic) {
                                correlator.handle(event).await;
                            } else {
                                tracing::debug!(topic, "dropping malformed status event");
                            }
                        }
                        None => tracing::debug!(topic, "dropping status event with no payload"),
                    },
                    Err(error) => tracing::warn!(%error, topic, "kafka consume error"),
                }
            }
        }
    }
}

pub async fn run_saga_command_consumer(
    bootstrap_servers: String,
    group_id: String,
    topic: String,
    executor: Arc<SagaExecutor>,
    mut shutdown: watch::Receiver<bool>,
) {
    let Some(consumer) = build_consumer(&bootstrap_servers, &group_id, &topic) else {
        return;
    };
    let mut stream = consumer.stream();
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                tracing::info!(topic, "shutdown signal received, stopping consumer");
                return;
            }
            next = stream.next() => {
                let Some(result) = next else { return };
                match result {
                    Ok(message) => {
                        let Some(payload) = message.payload() else {
                            tracing::debug!(topic, "dropping saga command with no payload");
                            continue;
                        };
                        let tenant_id = message
                            .headers()
                            .and_then(|h| header_value(h, "TENANT_ID"))
                            .unwrap_or_else(|| "default".to_string());
                        let Some(saga) = parse_saga_command(payload, tenant_id) else {
                            continue;
                        };
                        if let Err(error) = executor.ingest(saga).await {
                            tracing::warn!(%error, "rejected malformed saga command");
                        }
                    }
                    Err(error) => tracing::warn!(%error, topic, "kafka consume error"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdkafka::message::{Header, OwnedHeaders};

    #[test]
    fn parse_status_event_extracts_topic_type_and_transaction_id() {
        let id = Uuid::new_v4();
        let payload = serde_json::json!({
            "transactionId": id.to_string(),
            "type": "MESO_CHANGED",
            "body": {"amount": 5}
        })
        .to_string();
        let event = parse_status_event(payload.as_bytes(), EventTopic::CharacterStatus).unwrap();
        assert_eq!(event.transaction_id, id);
        assert_eq!(event.event_type, "MESO_CHANGED");
        assert_eq!(event.body, serde_json::json!({"amount": 5}));
    }

    #[test]
    fn parse_status_event_falls_back_to_the_whole_value_when_body_is_absent() {
        let id = Uuid::new_v4();
        let payload = serde_json::json!({
            "transactionId": id.to_string(),
            "type": "MESO_CHANGED"
        })
        .to_string();
        let event = parse_status_event(payload.as_bytes(), EventTopic::CharacterStatus).unwrap();
        assert_eq!(event.body["transactionId"], id.to_string());
    }

    #[test]
    fn parse_status_event_rejects_a_missing_transaction_id() {
        let payload = serde_json::json!({"type": "MESO_CHANGED"}).to_string();
        assert!(parse_status_event(payload.as_bytes(), EventTopic::CharacterStatus).is_none());
    }

    #[test]
    fn parse_status_event_rejects_malformed_json() {
        assert!(parse_status_event(b"not json", EventTopic::CharacterStatus).is_none());
    }

    fn saga_command_payload(id: Uuid) -> String {
        let now = "2024-01-01T00:00:00Z";
        serde_json::json!({
            "transactionId": id.to_string(),
            "sagaType": "inventory_transaction",
            "initiatedBy": "test",
            "steps": [{
                "stepId": "a",
                "action": "award_mesos",
                "payload": {
                    "characterId": 1, "worldId": 0, "channelId": 0,
                    "actorId": 0, "actorType": "SYSTEM", "amount": 10
                },
                "createdAt": now,
                "updatedAt": now
            }]
        })
        .to_string()
    }

    #[test]
    fn parse_saga_command_uses_the_passed_tenant_id() {
        let id = Uuid::new_v4();
        let payload = saga_command_payload(id);
        let saga = parse_saga_command(payload.as_bytes(), "tenant-a".to_string()).unwrap();
        assert_eq!(saga.transaction_id, id);
        assert_eq!(saga.tenant_id, "tenant-a");
        assert_eq!(saga.steps.len(), 1);
    }

    #[test]
    fn parse_saga_command_rejects_malformed_payload() {
        assert!(parse_saga_command(b"not json", "tenant-a".to_string()).is_none());
    }

    #[test]
    fn header_value_finds_a_matching_key_and_ignores_others() {
        let headers = OwnedHeaders::new()
            .insert(Header {
                key: "REGION",
                value: Some("na"),
            })
            .insert(Header {
                key: "TENANT_ID",
                value: Some("tenant-a"),
            });
        assert_eq!(header_value(&headers, "TENANT_ID"), Some("tenant-a".to_string()));
        assert_eq!(header_value(&headers, "MISSING"), None);
    }
}
