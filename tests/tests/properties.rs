//! Randomized checks of the quantified invariants (P1–P3 and the cause/value
//! normalization rules).

mod common;
use common::*;

use proptest::prelude::*;
use proptest::sample::Index;

proptest! {
    #[test]
    fn cause_normalization_always_yields_a_list(input in prop_oneof![
        Just(serde_json::Value::Null),
        any::<String>().prop_map(serde_json::Value::String),
        proptest::collection::vec("[a-z]{1,8}", 0..5).prop_map(|ids| serde_json::json!(ids)),
    ]) {
        let mut wire = serde_json::json!({ "base": "b", "type": "t" });
        wire["cause"] = input.clone();
        let draft: EventDraft = serde_json::from_value(wire).unwrap();
        match input {
            serde_json::Value::Null => prop_assert!(draft.cause.is_empty()),
            serde_json::Value::String(s) => {
                prop_assert_eq!(draft.cause.len(), if s.trim().is_empty() { 0 } else { 1 });
            }
            serde_json::Value::Array(items) => prop_assert_eq!(draft.cause.len(), items.len()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn integer_payloads_coerce_and_roundtrip(i in any::<i64>()) {
        let value = Value::parse(&i.to_string());
        prop_assert_eq!(&value, &Value::Int(i));
        prop_assert_eq!(value.canonical(), i.to_string());
    }

    #[test]
    fn non_numeric_payloads_stay_strings(s in "[a-zA-Z][a-zA-Z ]{0,12}") {
        let value = Value::parse(&s);
        match value {
            Value::Null | Value::String(_) => {}
            other => prop_assert!(false, "unexpected coercion to {:?}", other),
        }
    }

    #[test]
    fn random_edit_sequences_form_chains(values in proptest::collection::vec("[a-z0-9]{1,6}", 1..12)) {
        // P3 under arbitrary edit payloads
        let store = EventStore::new();
        let mut previous: Option<EventId> = None;
        for value in &values {
            let ev = store
                .append(EventDraft::new("subject", "field", value.as_str()).with_actor("alice").with_model("M"))
                .unwrap();
            if let Some(prev) = &previous {
                prop_assert!(ev.cause.contains(prev));
            }
            previous = Some(ev.id);
        }
        for ev in store.list(&Filter::default()) {
            prop_assert!(store.check_acyclicity(&ev.id).unwrap());
        }
    }

    #[test]
    fn random_parent_choices_keep_the_dag_acyclic(choices in proptest::collection::vec(any::<Index>(), 1..20)) {
        // P1 + P2: parents are always drawn from stored events, so every
        // closure terminates away from its origin
        let store = EventStore::new();
        let mut ids: Vec<EventId> = Vec::new();
        for (n, choice) in choices.iter().enumerate() {
            let cause = match ids.is_empty() {
                true => Cause::default(),
                false => Cause::single(ids[choice.index(ids.len())].clone()),
            };
            let ev = store
                .append(EventDraft::new("n", "t", n.to_string()).with_actor(ACTOR_SYSTEM).with_cause(cause))
                .unwrap();
            ids.push(ev.id);
        }
        for id in &ids {
            prop_assert!(store.check_acyclicity(id).unwrap());
            for cause in store.get(id).unwrap().cause.iter() {
                prop_assert!(store.get(cause).is_ok());
            }
        }
    }
}
