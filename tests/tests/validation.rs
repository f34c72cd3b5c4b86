//! Validator scenarios (S5) on a BSL-loaded schema.

mod common;
use common::*;

use ontic_core::{Violation, ViolationCode};

fn individual(store: &EventStore, name: &str) {
    store.append(EventDraft::new("Person", "Individual", name).with_actor("system")).unwrap();
}

fn codes(result: Result<(), Vec<Violation>>) -> Vec<ViolationCode> {
    result.unwrap_err().into_iter().map(|v| v.code).collect()
}

#[test]
fn unique_violation_on_the_second_individual() {
    let store = person_store();
    individual(&store, "john");
    individual(&store, "mary");

    let first = EventDraft::new("john", "email", "a@b").with_actor("alice").with_model("Model Person");
    assert!(validator::validate_event(&store, &first).is_ok());
    store.append(first).unwrap();

    let second = EventDraft::new("mary", "email", "a@b").with_actor("alice").with_model("Model Person");
    assert_eq!(codes(validator::validate_event(&store, &second)), vec![ViolationCode::Value003]);

    // a different address passes
    let third = EventDraft::new("mary", "email", "m@b").with_actor("alice").with_model("Model Person");
    assert!(validator::validate_event(&store, &third).is_ok());
}

#[test]
fn violations_carry_the_wire_shape() {
    let store = person_store();
    individual(&store, "john");

    let bad = EventDraft::new("john", "age", "old").with_actor("alice").with_model("Model Person");
    let violations = validator::validate_event(&store, &bad).unwrap_err();
    assert_eq!(violations.len(), 1);
    let json = serde_json::to_value(&violations[0]).unwrap();
    assert_eq!(json["type"], "value");
    assert_eq!(json["code"], "VALUE_001");
    assert_eq!(json["field"], "age");
    assert!(json["message"].as_str().unwrap().contains("Numeric"));
}

#[test]
fn structural_kinds_and_system_actors_bypass_validation() {
    let store = person_store();
    // Individual is structural
    assert!(validator::validate_event(&store, &EventDraft::new("Person", "Individual", "paul").with_actor("alice")).is_ok());
    // the system actor writes schema freely
    assert!(validator::validate_event(&store, &EventDraft::new("john", "age", "not a number").with_actor(ACTOR_SYSTEM)).is_ok());
}

#[test]
fn admin_role_grants_pass_genesis_permissions() {
    let store = person_store();
    // engine holds admin via the genesis grant; any Permission whitelist admits it
    let schema = "\
Person: Model: Model Person2
: Attribute: salary
:: Permission: hr
";
    genesis::load_bulk_str(&store, schema, "boot2");
    individual(&store, "john");
    store.append(EventDraft::new("john", "SetModel", "Model Person2").with_actor("system")).unwrap();

    let by_engine = EventDraft::new("john", "salary", "10").with_actor("engine").with_model("Model Person2");
    assert!(validator::validate_event(&store, &by_engine).is_ok());

    let by_alice = EventDraft::new("john", "salary", "10").with_actor("alice").with_model("Model Person2");
    assert_eq!(codes(validator::validate_event(&store, &by_alice)), vec![ViolationCode::Semantic008]);
}
