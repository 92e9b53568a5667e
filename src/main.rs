use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use kafka_inspector::config::Config;
use kafka_inspector::kafka::{ClientConfigBuilder, RecordPublisher, TailFetcher, TopicAdmin};
use kafka_inspector::router::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::init_with_defaults()
        .context("failed to load configuration from environment variables")?;

    info!("starting kafka-inspector, brokers at {}", config.kafka_hosts);

    let consumer_config =
        ClientConfigBuilder::for_tail_consumer(&config.kafka_hosts, &config.kafka_consumer_group)
            .with_tls(config.kafka_tls)
            .build();
    let fetcher = TailFetcher::new(
        consumer_config,
        config.metadata_timeout(),
        config.poll_timeout(),
    );

    let admin_config = ClientConfigBuilder::for_admin(&config.kafka_hosts)
        .with_tls(config.kafka_tls)
        .build();
    let admin = TopicAdmin::new(admin_config, config.admin_timeout());

    let producer_config = ClientConfigBuilder::for_producer(&config.kafka_hosts)
        .with_tls(config.kafka_tls)
        .build();
    let publisher = RecordPublisher::new(producer_config, config.publish_timeout());

    let recorder_handle = config.export_prometheus.then(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus metrics recorder")
    });
    let bind = config.bind_address();
    let app = router(
        AppState {
            fetcher,
            admin,
            publisher,
            config,
        },
        recorder_handle,
    );

    info!("listening on {}", bind);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
