//! Genesis bootstrap roundtrip (scenario S1, property P4).

mod common;
use common::*;

#[test]
fn bootstrap_roundtrip() {
    let store = bootstrap_store();
    assert_eq!(store.count(), genesis::genesis_event_count());
    assert_eq!(genesis::genesis_event_count(), 150);

    let root = store.get(&EventId::from("Event")).unwrap();
    assert_eq!(root.id, "Event");
    assert_eq!(root.base, "Event");
    assert_eq!(root.kind, "Event");
    assert_eq!(root.value, "Event");
    assert_eq!(root.cause.to_strings(), vec!["Event"]);
    assert_eq!(root.model, "Event");
}

#[test]
fn genesis_is_idempotent() {
    let store = bootstrap_store();
    let before = store.list(&Filter::default());
    let added = genesis::load_if_empty(&store, &GenesisConfig::default()).unwrap();
    assert_eq!(added, 0);
    assert_eq!(store.list(&Filter::default()), before);
}

#[test]
fn two_bootstraps_are_byte_identical() {
    let a = bootstrap_store();
    let b = bootstrap_store();
    let left: Vec<String> = a.list(&Filter::default()).iter().map(|ev| ev.to_json().unwrap()).collect();
    let right: Vec<String> = b.list(&Filter::default()).iter().map(|ev| ev.to_json().unwrap()).collect();
    assert_eq!(left, right);
}

#[test]
fn genesis_dates_are_ordered_and_stable() {
    let store = bootstrap_store();
    let events = store.list(&Filter::default());
    assert_eq!(events[0].date, "1970-01-01T00:00:00.000Z");
    for pair in events.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
}

#[test]
fn well_known_identifiers_are_present() {
    let store = bootstrap_store();
    for id in ["Concept", "Model", "Individual", "Attribute", "Relation", "Restriction", "Required", "Default", "SetValue",
        "Numeric", "Boolean", "TextType", "DateTime", "EnumType", "system", "engine", "guest", "view", "admin"]
    {
        assert!(store.get(&EventId::from(id)).is_ok(), "missing genesis id {}", id);
        assert!(store.is_genesis_id(&EventId::from(id)), "{} not in the genesis id set", id);
    }
    assert!(!store.is_genesis_id(&EventId::from("nonsense")));
}

#[test]
fn user_appends_sort_after_genesis() {
    let store = bootstrap_store();
    let ev = store.append(EventDraft::new("Concept", "Instance", "Person").with_actor("alice")).unwrap();
    let all = store.list(&Filter::default());
    assert_eq!(all.last().unwrap().id, ev.id);
}
