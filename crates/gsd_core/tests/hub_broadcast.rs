use gsd_core::UpdateHub;
use serde_json::json;
use std::time::Duration;

const NEGATIVE_WAIT: Duration = Duration::from_millis(100);

#[test]
fn all_subscribers_receive_identical_bytes_in_broadcast_order() {
    let hub = UpdateHub::spawn().unwrap();
    let first = hub.subscribe();
    let second = hub.subscribe();

    hub.broadcast("project_created", &json!({"id": "p1", "name": "one"}));
    hub.broadcast("project_created", &json!({"id": "p2", "name": "two"}));

    let first_events = [first.recv().unwrap(), first.recv().unwrap()];
    let second_events = [second.recv().unwrap(), second.recv().unwrap()];
    assert_eq!(first_events, second_events);

    let event: serde_json::Value = serde_json::from_slice(&first_events[0]).unwrap();
    assert_eq!(event["type"], "project_created");
    assert_eq!(event["data"]["id"], "p1");
    let event: serde_json::Value = serde_json::from_slice(&first_events[1]).unwrap();
    assert_eq!(event["data"]["id"], "p2");
}

#[test]
fn unregistered_subscriber_stops_receiving() {
    let hub = UpdateHub::spawn().unwrap();
    let leaver = hub.subscribe();
    let stayer = hub.subscribe();

    hub.broadcast("tick", &json!(1));
    assert!(leaver.recv().is_some());
    assert!(stayer.recv().is_some());

    hub.unsubscribe(leaver.id());
    // Unregistering twice is a no-op, not an error.
    hub.unsubscribe(leaver.id());

    hub.broadcast("tick", &json!(2));
    assert!(stayer.recv().is_some());
    // The leaver's channel is closed once the hub drops its sink.
    assert!(leaver.recv().is_none());
}

#[test]
fn dropping_a_subscription_unregisters_it() {
    let hub = UpdateHub::spawn().unwrap();
    let dropped = hub.subscribe();
    let stayer = hub.subscribe();

    drop(dropped);

    hub.broadcast("tick", &json!({}));
    assert!(stayer.recv().is_some());
    assert!(stayer.recv_timeout(NEGATIVE_WAIT).is_none());
}

#[test]
fn stalled_subscriber_is_evicted_without_stalling_the_rest() {
    let hub = UpdateHub::spawn().unwrap();
    // Buffer depth 1: the second undelivered event marks this subscriber
    // as stalled.
    let stalled = hub.subscribe_with_buffer(1);
    let healthy = hub.subscribe();

    hub.broadcast("tick", &json!(1));
    hub.broadcast("tick", &json!(2));
    hub.broadcast("tick", &json!(3));

    // The healthy subscriber sees every event; the broadcaster never saw
    // an error.
    for expected in [1, 2, 3] {
        let event: serde_json::Value =
            serde_json::from_slice(&healthy.recv().unwrap()).unwrap();
        assert_eq!(event["data"], json!(expected));
    }

    // The stalled subscriber got the buffered first event, then closure.
    let event: serde_json::Value = serde_json::from_slice(&stalled.recv().unwrap()).unwrap();
    assert_eq!(event["data"], json!(1));
    assert!(stalled.recv().is_none());
}

#[test]
fn serialization_failure_drops_the_event_but_not_the_hub() {
    struct Broken;

    impl serde::Serialize for Broken {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("unserializable payload"))
        }
    }

    let hub = UpdateHub::spawn().unwrap();
    let subscription = hub.subscribe();

    hub.broadcast("broken", &Broken);
    hub.broadcast("intact", &json!({"ok": true}));

    // Only the serializable event arrives; the broken one was dropped
    // before fan-out.
    let event: serde_json::Value =
        serde_json::from_slice(&subscription.recv().unwrap()).unwrap();
    assert_eq!(event["type"], "intact");
}

#[test]
fn raw_broadcast_echoes_bytes_verbatim() {
    let hub = UpdateHub::spawn().unwrap();
    let first = hub.subscribe();
    let second = hub.subscribe();

    let inbound = br#"{"type":"client_ping"}"#.to_vec();
    hub.broadcast_raw(inbound.clone());

    assert_eq!(first.recv().unwrap(), inbound);
    assert_eq!(second.recv().unwrap(), inbound);
}

#[test]
fn subscribers_registered_later_miss_earlier_events() {
    let hub = UpdateHub::spawn().unwrap();
    let early = hub.subscribe();

    hub.broadcast("tick", &json!(1));
    assert!(early.recv().is_some());

    // Delivery is best effort for connected subscribers only; there is no
    // replay for late joiners.
    let late = hub.subscribe();
    hub.broadcast("tick", &json!(2));
    assert!(early.recv().is_some());
    let event: serde_json::Value = serde_json::from_slice(&late.recv().unwrap()).unwrap();
    assert_eq!(event["data"], json!(2));
    assert!(late.recv_timeout(NEGATIVE_WAIT).is_none());
}
