use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dotenvy::dotenv;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use saga_orchestrator_api::kafka::{run_saga_command_consumer, run_status_consumer};
use saga_orchestrator_api::{api, telemetry, HttpValidationClient, KafkaProducer};
use saga_orchestrator_core::{Correlator, EventTopic, SagaConfig, SagaExecutor, SagaStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    telemetry::init_tracing();

    let config = SagaConfig::from_env().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("invalid configuration: {e}"))
    })?;

    let store = Arc::new(SagaStore::new());
    let producer = Arc::new(
        KafkaProducer::new(&config.bootstrap_servers, config.topics.clone()).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::Other, format!("failed to start kafka producer: {e}"))
        })?,
    );
    let validation_client = Arc::new(HttpValidationClient::new(config.query_aggregator_url.clone()));

    let executor = Arc::new(SagaExecutor::new(store.clone(), producer, validation_client));
    let correlator = Arc::new(Correlator::new(store.clone(), executor.clone()));

    // Process-wide shutdown context (§5): closing this sender unblocks every
    // consumer loop's `shutdown.changed()` branch.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer_handles = spawn_consumers(&config, executor, correlator, shutdown_rx);

    tracing::info!(host = %config.rest_host, port = config.rest_port, "starting saga orchestrator");

    let rest_host = config.rest_host.clone();
    let rest_port = config.rest_port;
    let store_data = web::Data::from(store);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(store_data.clone())
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .configure(api::configure_routes)
    })
    .bind((rest_host, rest_port))?
    .run();

    let server_handle = server.handle();
    let mut server_task: JoinHandle<std::io::Result<()>> = tokio::spawn(server);

    tokio::select! {
        result = &mut server_task => {
            let _ = shutdown_tx.send(true);
            wait_for_consumers(consumer_handles).await;
            return result.unwrap_or_else(|e| Err(std::io::Error::new(std::io::ErrorKind::Other, e)));
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("ctrl-c received, shutting down");
        }
    }

    let _ = shutdown_tx.send(true);
    server_handle.stop(true).await;
    wait_for_consumers(consumer_handles).await;
    server_task
        .await
        .unwrap_or_else(|e| Err(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

async fn wait_for_consumers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(error) = handle.await {
            tracing::warn!(%error, "consumer task panicked");
        }
    }
}

fn spawn_consumers(
    config: &SagaConfig,
    executor: Arc<SagaExecutor>,
    correlator: Arc<Correlator>,
    shutdown_rx: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let bootstrap = config.bootstrap_servers.clone();
    let group_id = config.consumer_group_id.clone();
    let mut handles = Vec::new();

    handles.push(tokio::spawn(run_saga_command_consumer(
        bootstrap.clone(),
        group_id.clone(),
        config.topics.command_topic_saga.clone(),
        executor,
        shutdown_rx.clone(),
    )));

    let status_topics = [
        (config.topics.event_topic_asset_status.clone(), EventTopic::AssetStatus),
        (
            config.topics.event_topic_compartment_status.clone(),
            EventTopic::CompartmentStatus,
        ),
        (
            config.topics.event_topic_character_status.clone(),
            EventTopic::CharacterStatus,
        ),
        (config.topics.event_topic_skill_status.clone(), EventTopic::SkillStatus),
        (config.topics.event_topic_guild_status.clone(), EventTopic::GuildStatus),
        (config.topics.event_topic_invite_status.clone(), EventTopic::InviteStatus),
    ];

    for (topic, event_topic) in status_topics {
        handles.push(tokio::spawn(run_status_consumer(
            bootstrap.clone(),
            group_id.clone(),
            topic,
            event_topic,
            correlator.clone(),
            shutdown_rx.clone(),
        )));
    }

    handles
}
