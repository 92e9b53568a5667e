use std::time::Duration;

use kafka_inspector::kafka::{AdminError, ClientConfigBuilder, TopicAdmin};

use anyhow::Result;
use uuid::Uuid;

const KAFKA_BROKERS: &str = "localhost:9092";
const TEST_TOPIC_BASE: &str = "inspector-topic-admin-integration-test";

fn test_admin() -> TopicAdmin {
    let config = ClientConfigBuilder::for_admin(KAFKA_BROKERS).build();
    TopicAdmin::new(config, Duration::from_secs(5))
}

async fn list_topics(admin: &TopicAdmin) -> Result<Vec<kafka_inspector::kafka::TopicSummary>> {
    let admin = admin.clone();
    Ok(tokio::task::spawn_blocking(move || admin.list_topics()).await??)
}

/// A created topic shows up in the cluster listing with its partition count,
/// and disappears after deletion.
#[tokio::test]
#[ignore = "requires a local Kafka broker on localhost:9092"]
async fn created_topic_is_listed_then_deleted() -> Result<()> {
    let topic = format!("{}-{}", TEST_TOPIC_BASE, Uuid::now_v7());
    let admin = test_admin();

    admin.create_topic(&topic, 3, 1).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let listed = list_topics(&admin).await?;
    let summary = listed
        .iter()
        .find(|t| t.name == topic)
        .expect("created topic should appear in the listing");
    assert_eq!(summary.partition_count, 3);

    admin.delete_topic(&topic).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let listed = list_topics(&admin).await?;
    assert!(listed.iter().all(|t| t.name != topic));

    Ok(())
}

/// Creating a topic that already exists surfaces the dedicated conflict error
/// instead of a generic operation failure.
#[tokio::test]
#[ignore = "requires a local Kafka broker on localhost:9092"]
async fn creating_existing_topic_is_a_conflict() -> Result<()> {
    let topic = format!("{}-{}", TEST_TOPIC_BASE, Uuid::now_v7());
    let admin = test_admin();

    admin.create_topic(&topic, 1, 1).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let err = admin
        .create_topic(&topic, 1, 1)
        .await
        .expect_err("duplicate create should fail");
    assert!(matches!(err, AdminError::TopicAlreadyExists(_)));

    admin.delete_topic(&topic).await?;
    Ok(())
}

/// Deleting a topic that never existed reports a per-topic operation error.
#[tokio::test]
#[ignore = "requires a local Kafka broker on localhost:9092"]
async fn deleting_unknown_topic_fails() -> Result<()> {
    let topic = format!("{}-{}", TEST_TOPIC_BASE, Uuid::now_v7());
    let admin = test_admin();

    let err = admin
        .delete_topic(&topic)
        .await
        .expect_err("deleting a nonexistent topic should fail");
    assert!(matches!(err, AdminError::Operation { .. }));

    Ok(())
}
