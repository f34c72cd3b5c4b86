//! Graph queries with accessors (scenario S6) and compensating deletes (P9).

mod common;
use common::*;

use ontic_core::query::QueryOutput;

fn person(store: &EventStore, name: &str, age: &str) {
    store.append(EventDraft::new("Person", "Individual", name).with_actor("alice")).unwrap();
    store.append(EventDraft::new(name, "age", age).with_actor("alice").with_model("Model Person")).unwrap();
}

#[test]
fn query_with_index_and_property_accessor() {
    let store = person_store();
    person(&store, "john", "30");
    person(&store, "mary", "40");

    let out = query::query_str(&store, r#"$($EQ.$Base("Person"), $GT.age(35))[-1].age"#).unwrap();
    assert_eq!(out, QueryOutput::Value(Value::Int(40)));
    if let QueryOutput::Value(v) = out {
        assert_eq!(v.canonical(), "40");
    }
}

#[test]
fn comparison_operators_filter_on_latest_values() {
    let store = person_store();
    person(&store, "john", "30");
    person(&store, "mary", "40");
    person(&store, "paul", "50");

    let out = query::query_str(&store, r#"$($EQ.$Base("Person"), $GE.age(40))"#).unwrap();
    assert_eq!(out, QueryOutput::Individuals(vec!["mary".into(), "paul".into()]));

    let out = query::query_str(&store, r#"$($EQ.$Base("Person"), $LT.age(40))"#).unwrap();
    assert_eq!(out, QueryOutput::Individuals(vec!["john".into()]));

    // the latest event wins: paul gets younger
    store.append(EventDraft::new("paul", "age", "20").with_actor("alice").with_model("Model Person")).unwrap();
    let out = query::query_str(&store, r#"$($EQ.$Base("Person"), $LT.age(40))"#).unwrap();
    assert_eq!(out, QueryOutput::Individuals(vec!["john".into(), "paul".into()]));
}

#[test]
fn or_conditions_union_matches() {
    let store = person_store();
    person(&store, "john", "30");
    person(&store, "mary", "40");
    person(&store, "paul", "50");

    let out = query::query_str(&store, r#"$($OR($EQ.age(30), $EQ.age(50)))"#).unwrap();
    assert_eq!(out, QueryOutput::Individuals(vec!["john".into(), "paul".into()]));
}

#[test]
fn deleted_individuals_disappear_and_can_be_restored() {
    // P9
    let store = person_store();
    person(&store, "john", "30");
    person(&store, "mary", "40");

    store.append(EventDraft::new("john", "deleted", "1").with_actor("alice")).unwrap();
    let out = query::query_str(&store, r#"$($EQ.$Base("Person"))"#).unwrap();
    assert_eq!(out, QueryOutput::Individuals(vec!["mary".into()]));

    store.append(EventDraft::new("john", "deleted", "0").with_actor("alice")).unwrap();
    let out = query::query_str(&store, r#"$($EQ.$Base("Person"))"#).unwrap();
    assert_eq!(out, QueryOutput::Individuals(vec!["john".into(), "mary".into()]));
}

#[test]
fn delete_kind_spellings_and_truthy_values() {
    let store = person_store();
    person(&store, "john", "30");

    store.append(EventDraft::new("john", "Delete", "true").with_actor("alice")).unwrap();
    assert!(model::is_deleted(&store, "john"));

    store.append(EventDraft::new("john", "delete", "no").with_actor("alice")).unwrap();
    assert!(!model::is_deleted(&store, "john"));
}

#[test]
fn genesis_individuals_are_queryable() {
    let store = bootstrap_store();
    let out = query::query_str(&store, r#"$($EQ.$Base("Actor"))"#).unwrap();
    let QueryOutput::Individuals(names) = out else {
        panic!("expected a name selection");
    };
    assert!(names.contains(&"system".to_string()));
    assert!(names.contains(&"engine".to_string()));
}
