
use scrape_relay::{
    infrastructure::app::ScrapeRelay,
    messaging::{domain::MessageSink, publisher::PublishError},
    scrape::parser::read_objects,
    ObjectPublisher, ObjectType, PublishContext, RelayError,
};
use std::time::Duration;
use test_helpers::*;

#[tokio::test]
async fn test_fixture_is_published_depth_first_with_metadata() {
    let mut objects = read_objects(&fixture_path("nc_senate.jsonl")).await.unwrap();
    let relay = ScrapeRelay::new(nc_config()).unwrap();
    let (sink, recorded) = RecordingSink::new();

    let report = relay.publish_with(sink, &mut objects).await.unwrap();

    assert_eq!(
        recorded.ids(),
        vec![
            "org-nc-senate",
            "post-nc-s1",
            "person-nc-s1",
            "bill-nc-s12",
            "vote-nc-s12",
            "event-nc-rules",
        ]
    );
    assert_eq!(report.messages_sent, 6);
    assert_eq!(report.validation_warnings, 0);
    assert_eq!(report.sent_by_type[&ObjectType::Person], 1);

    for message in recorded.messages() {
        assert_eq!(message["jurisdiction"], NC_JURISDICTION);
        assert!(message.get("_related").is_none());
        assert!(message.get("_type").is_none());
    }

    let messages = recorded.messages();
    assert_eq!(messages[0]["type"], "organization");
    assert_eq!(messages[0]["jurisdiction_id"], NC_JURISDICTION);
    assert_eq!(messages[1]["type"], "post");
    assert!(messages[1].get("jurisdiction_id").is_none());
    assert_eq!(messages[4]["type"], "vote_event");
    assert_eq!(messages[4]["jurisdiction_id"], NC_JURISDICTION);
}

#[tokio::test]
async fn test_every_message_gets_a_pubdate() {
    let mut objects = vec![create_test_person("Ann"), create_test_bill("HB 2")];
    let (sink, recorded) = RecordingSink::new();

    let relay = ScrapeRelay::new(nc_config()).unwrap();
    relay.publish_with(sink, &mut objects).await.unwrap();

    let attributes = recorded.attributes();
    assert_eq!(attributes.len(), 2);
    assert!(attributes.iter().all(|a| a.contains_key("pubdate")));
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let mut objects = vec![create_test_bill("HB 3").with_related(create_test_person("Sponsor"))];
    let (sink, recorded) = RecordingSink::failing(2);

    let relay = ScrapeRelay::new(nc_config()).unwrap();
    let report = relay.publish_with(sink, &mut objects).await.unwrap();

    assert_eq!(report.retries, 2);
    assert_eq!(recorded.messages().len(), 2);
}

#[tokio::test]
async fn test_persistent_failure_stops_the_run() {
    let mut objects = vec![create_test_person("Ann"), create_test_person("Bob")];
    let (sink, recorded) = RecordingSink::failing(u32::MAX);

    let mut config = nc_config();
    config.output.max_retries = 1;
    let relay = ScrapeRelay::new(config).unwrap();

    let err = relay.publish_with(sink, &mut objects).await.unwrap_err();
    assert!(matches!(
        err,
        RelayError::Publish(PublishError::RetriesExhausted { attempts: 2, .. })
    ));
    assert!(recorded.messages().is_empty());
}

#[tokio::test]
async fn test_lenient_run_publishes_invalid_objects() {
    let invalid_bill = scrape_relay::ScrapeObject::new(ObjectType::Bill).with_field("identifier", "HB 4");
    let mut objects = vec![invalid_bill, create_test_person("Ann")];
    let (sink, recorded) = RecordingSink::new();

    let mut config = nc_config();
    config.output.strict_validation = false;
    let relay = ScrapeRelay::new(config).unwrap();

    let report = relay.publish_with(sink, &mut objects).await.unwrap();
    assert_eq!(report.validation_warnings, 1);
    assert_eq!(recorded.messages().len(), 2);
}

#[tokio::test]
async fn test_strict_run_stops_at_invalid_object() {
    let invalid_bill = scrape_relay::ScrapeObject::new(ObjectType::Bill).with_field("identifier", "HB 4");
    let mut objects = vec![invalid_bill, create_test_person("Ann")];
    let (sink, recorded) = RecordingSink::new();

    let relay = ScrapeRelay::new(nc_config()).unwrap();
    let err = relay.publish_with(sink, &mut objects).await.unwrap_err();

    assert!(matches!(err, RelayError::Publish(PublishError::Validation(_))));
    // sent before validation ran
    assert_eq!(recorded.ids(), vec![objects[0].id.clone()]);
}

#[tokio::test]
async fn test_publisher_tracks_output_names() {
    let mut bill = create_test_bill("HB 5").with_related(create_test_person("Sponsor"));
    let (sink, _recorded) = RecordingSink::new();

    let context = PublishContext {
        jurisdiction: Some(nc_jurisdiction()),
        strict_validation: true,
        max_retries: 0,
        retry_delay: Duration::ZERO,
    };
    let mut publisher = ObjectPublisher::new(sink, context);
    publisher.save_object(&mut bill).await.unwrap();

    let names = publisher.output_names();
    assert!(names[&ObjectType::Bill].contains(&bill.id));
    assert!(names[&ObjectType::Person].contains(&bill.related[0].id));
    assert_eq!(publisher.sink().stats().messages_published, 2);
}
