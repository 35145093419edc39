//! End-to-end flows over the terms-of-use acceptance trail.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use idem_core::{Element, ElementError};
use idem_userdata::{ToUEvent, ToUList, UserEvent, UserEventList};

/// Users re-accept when the terms change; every acceptance stays on record.
#[test]
fn test_reaccepting_a_new_version() {
    let mut acceptances = ToUList::default();
    acceptances
        .add(ToUEvent::at(
            "2016-v1",
            "tou_plugin",
            Utc::now() - Duration::days(400),
        ))
        .unwrap();
    acceptances.add(ToUEvent::new("2017-v1", "tou_plugin")).unwrap();

    assert_eq!(acceptances.count(), 2);
    assert!(acceptances.has_accepted("2016-v1"));
    assert!(acceptances.has_accepted("2017-v1"));
    assert!(!acceptances.has_accepted("2018-v1"));
}

/// Two sessions syncing the same acceptance record one event, not two.
#[test]
fn test_concurrent_sync_records_once() {
    let event = ToUEvent::new("2017-v1", "tou_plugin");
    let record = event.to_record();

    let acceptances = ToUList::from_records(vec![record.clone(), record]).unwrap();
    assert_eq!(acceptances.count(), 1);
    assert!(acceptances.has_accepted("2017-v1"));
}

/// An event id can never be reused for a different acceptance.
#[test]
fn test_event_ids_pin_content() {
    let event = ToUEvent::new("2017-v1", "tou_plugin");
    let reused = ToUEvent::new("2018-v1", "tou_plugin").with_event_id(event.key());

    let mut acceptances = ToUList::new(vec![event]).unwrap();
    assert_matches!(
        acceptances.add(reused),
        Err(ElementError::Duplicate { .. })
    );
    assert!(!acceptances.has_accepted("2018-v1"));
}

/// Acceptances survive a storage cycle with ids and timestamps intact.
#[test]
fn test_acceptances_survive_storage() {
    let mut acceptances = ToUList::default();
    acceptances
        .add(ToUEvent::at(
            "2016-v1",
            "tou_plugin",
            Utc::now() - Duration::days(400),
        ))
        .unwrap();
    acceptances.add(ToUEvent::new("2017-v1", "tou_plugin")).unwrap();

    let restored = ToUList::from_records(acceptances.to_records()).unwrap();
    assert_eq!(restored, acceptances);
}

/// The mixed event list decodes by tag and replays idempotently too.
#[test]
fn test_mixed_event_list_round_trip() {
    let mut events = UserEventList::default();
    events
        .add(UserEvent::Tou(ToUEvent::new("2017-v1", "tou_plugin")))
        .unwrap();

    let mut records = events.to_records();
    records.push(records[0].clone());

    let restored = UserEventList::from_records(records).unwrap();
    assert_eq!(restored.count(), 1);
    assert_eq!(restored, events);
}
