
use futures::StreamExt;
use scrape_relay::{
    infrastructure::config::RedisConfig,
    messaging::{domain::MessageSink, redis::RedisSink},
    ObjectPublisher, PublishContext,
};
use serde_json::Value;
use std::time::Duration;
use test_helpers::*;
use testcontainers_modules::{redis::Redis, testcontainers::runners::AsyncRunner};

/// Publishes an object graph to a real Redis and reads it back from a subscriber
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_publish_object_graph_to_redis_channel() {
    let container = Redis::default().start().await.unwrap();
    let port = container.get_host_port_ipv4(6379).await.unwrap();

    let config = RedisConfig {
        host: "127.0.0.1".to_string(),
        port,
        channel: Some("scrapes".to_string()),
        ..RedisConfig::default()
    };

    let client = redis::Client::open(config.connection_info()).unwrap();
    let mut pubsub = client.get_async_pubsub().await.unwrap();
    pubsub.subscribe("scrapes").await.unwrap();

    let sink = RedisSink::connect(&config).await.unwrap();
    let context = PublishContext {
        jurisdiction: Some(nc_jurisdiction()),
        ..PublishContext::default()
    };
    let mut publisher = ObjectPublisher::new(sink, context);

    let mut bill = create_test_bill("SB 9").with_related(create_test_person("Sponsor"));
    publisher.save_object(&mut bill).await.unwrap();

    let mut stream = pubsub.on_message();
    let mut received = Vec::new();
    for _ in 0..2 {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for message")
            .expect("subscription closed");
        let payload: String = msg.get_payload().unwrap();
        received.push(serde_json::from_str::<Value>(&payload).unwrap());
    }

    assert_eq!(received[0]["type"], "bill");
    assert_eq!(received[0]["jurisdiction"], NC_JURISDICTION);
    assert_eq!(received[1]["type"], "person");
    assert_eq!(received[1]["_id"], Value::String(bill.related[0].id.clone()));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_reconnect_after_server_restart() {
    let container = Redis::default().start().await.unwrap();
    let port = container.get_host_port_ipv4(6379).await.unwrap();

    let config = RedisConfig {
        host: "127.0.0.1".to_string(),
        port,
        channel: Some("scrapes".to_string()),
        ..RedisConfig::default()
    };

    let mut sink = RedisSink::connect(&config).await.unwrap();
    assert!(sink.health_check().await.unwrap());

    sink.reconnect().await.unwrap();
    sink.publish(br#"{"type":"person"}"#, &Default::default())
        .await
        .unwrap();

    let stats = sink.stats();
    assert_eq!(stats.messages_published, 1);
    // one connection at startup, one explicit reconnect
    assert_eq!(stats.reconnects, 2);
}

#[tokio::test]
async fn test_connect_to_missing_server_fails() {
    let config = RedisConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        channel: Some("scrapes".to_string()),
        ..RedisConfig::default()
    };

    assert!(RedisSink::connect(&config).await.is_err());
}
