//! Append-time invariants of the store (scenario S4, properties P1–P3).

mod common;
use common::*;

use ontic_core::StructuralError;

#[test]
fn self_caused_append_is_rejected_and_count_unchanged() {
    let store = bootstrap_store();
    let before = store.count();
    let err = store
        .append(EventDraft::new("x", "t", "v").with_id("loop").with_cause(EventId::from("loop")).with_actor("alice"))
        .unwrap_err();
    assert_eq!(err, StructuralError::CycleDetected(EventId::from("loop")));
    assert_eq!(store.count(), before);
}

#[test]
fn every_cause_exists_or_is_genesis() {
    // P1: after arbitrary appends, each cause id resolves in the store or in
    // the genesis id set
    let store = person_store();
    store.append(EventDraft::new("Person", "Individual", "john").with_actor("alice")).unwrap();
    store.append(EventDraft::new("john", "age", "30").with_actor("alice").with_model("Model Person")).unwrap();
    store.append(EventDraft::new("john", "age", "31").with_actor("alice").with_model("Model Person")).unwrap();

    for ev in store.list(&Filter::default()) {
        for cause in ev.cause.iter() {
            assert!(
                store.get(cause).is_ok() || store.is_genesis_id(cause),
                "event {} has dangling cause {}",
                ev.id,
                cause
            );
        }
    }
}

#[test]
fn cause_closures_never_return_to_their_origin() {
    // P2 over the whole bootstrapped store plus user history
    let store = person_store();
    store.append(EventDraft::new("Person", "Individual", "john").with_actor("alice")).unwrap();
    store.append(EventDraft::new("john", "age", "30").with_actor("alice").with_model("Model Person")).unwrap();

    for ev in store.list(&Filter::default()) {
        assert!(store.check_acyclicity(&ev.id).unwrap(), "cycle through {}", ev.id);
    }
}

#[test]
fn per_actor_per_subject_history_is_a_chain() {
    // P3: one actor's writes on one (base, model) link each event to its
    // predecessor
    let store = person_store();
    store.append(EventDraft::new("Person", "Individual", "john").with_actor("alice")).unwrap();
    let mut previous: Option<EventId> = None;
    for value in ["30", "31", "32", "33"] {
        let ev = store.append(EventDraft::new("john", "age", value).with_actor("alice").with_model("Model Person")).unwrap();
        if let Some(prev) = &previous {
            assert!(ev.cause.contains(prev), "{} does not chain to {}", ev.id, prev);
        }
        previous = Some(ev.id);
    }

    // an interleaved actor gets an independent chain
    let b1 = store.append(EventDraft::new("john", "age", "40").with_actor("bob").with_model("Model Person")).unwrap();
    let b2 = store.append(EventDraft::new("john", "age", "41").with_actor("bob").with_model("Model Person")).unwrap();
    assert!(b2.cause.contains(&b1.id));
    assert!(!b2.cause.contains(previous.as_ref().unwrap()));
}

#[test]
fn dates_are_monotonic_per_append_order() {
    let store = bootstrap_store();
    let mut last = String::new();
    for i in 0..50 {
        let ev = store.append(EventDraft::new("x", "tick", i.to_string()).with_actor("alice")).unwrap();
        assert!(ev.date > last);
        last = ev.date;
    }
}

#[test]
fn latest_value_follows_the_greatest_date() {
    // P8: the projected state equals the latest matching event's value
    let store = person_store();
    store.append(EventDraft::new("Person", "Individual", "john").with_actor("alice")).unwrap();
    for value in ["30", "31", "29"] {
        store.append(EventDraft::new("john", "age", value).with_actor("alice").with_model("Model Person")).unwrap();
    }
    let latest = store
        .list(&Filter::default().base("john").kind("age"))
        .into_iter()
        .max_by(|a, b| a.date.cmp(&b.date))
        .unwrap();
    assert_eq!(latest.value, "29");
    assert_eq!(model::latest_value(&store, "john", "age"), Some(Value::Int(29)));
}
