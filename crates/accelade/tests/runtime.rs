use accelade::shared::SharedDataError;
use accelade::{EventBusConfig, Listener, Runtime, RuntimeConfig};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn runtime_applies_event_config() {
    let config = RuntimeConfig { events: EventBusConfig { max_listeners: 2 }, ..RuntimeConfig::default() };
    let runtime = Runtime::new(config);

    assert_eq!(runtime.config().events.max_listeners, 2);
    assert!(runtime.shared().is_empty());
    assert!(runtime.events().event_names().is_empty());
}

#[test]
fn bootstrap_replaces_tree_silently() {
    let runtime = Runtime::default();
    let writes = Arc::new(AtomicUsize::new(0));
    let counter = writes.clone();
    runtime.shared().subscribe_all(move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    runtime.shared().set("stale", true);
    runtime.bootstrap(Some(object(json!({ "page": "home" }))));
    runtime.bootstrap(None);

    assert_eq!(writes.load(Ordering::SeqCst), 1, "only the explicit set notifies");
    assert_eq!(runtime.shared().get("page"), Some(json!("home")));
    assert!(!runtime.shared().has("stale"));
}

#[test]
fn bootstrap_json_rejects_non_object_payload() {
    let runtime = Runtime::default();
    runtime.bootstrap_json(r#"{ "user": { "id": 7 } }"#).expect("object payload");

    let err = runtime.bootstrap_json(r#""just a string""#).unwrap_err();
    assert!(matches!(err, SharedDataError::InvalidPayload { .. }));
    assert_eq!(runtime.shared().get("user.id"), Some(json!(7)));
}

#[test]
fn handles_share_state_with_runtime() {
    let runtime = Runtime::default();
    let events = runtime.events().clone();
    let shared = runtime.shared().clone();

    events.on(
        "bridge:response",
        Listener::new(move |data| {
            if let Some(Value::Object(patch)) = data.get("shared") {
                shared.merge(patch.clone());
            }
        }),
    );

    let invoked = runtime
        .events()
        .emit("bridge:response", &json!({ "shared": { "flash": "Saved", "count": 2 } }));

    assert_eq!(invoked, 1);
    assert_eq!(runtime.shared().get("flash"), Some(json!("Saved")));
    assert_eq!(runtime.shared().create_proxy().get_or("count", 0), json!(2));
}

#[test]
fn reset_clears_store_listeners_and_topics() {
    let runtime = Runtime::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    runtime.events().on(
        "tick",
        Listener::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    let counter = calls.clone();
    runtime.shared().subscribe("x", move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    runtime.shared().set("x", 1);

    runtime.reset();

    assert_eq!(runtime.events().emit("tick", &Value::Null), 0);
    runtime.shared().set("x", 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!runtime.events().has_listeners("tick"));
    assert_eq!(runtime.shared().keys(), vec!["x".to_owned()]);
}
