#[allow(unused)]
pub use ontic_core::{
    genesis::{self, GenesisConfig},
    model, query, recalc,
    store::{EventStore, Filter},
    validator, BasicDriver, Dataflow, Value,
};
#[allow(unused)]
pub use ontic_proto::{Cause, Event, EventDraft, EventId, ACTOR_ENGINE, ACTOR_SYSTEM};

use std::str::FromStr;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// Empty store with the full genesis ontology loaded.
#[allow(unused)]
pub fn bootstrap_store() -> EventStore {
    let store = EventStore::new();
    genesis::load_if_empty(&store, &GenesisConfig::default()).expect("genesis load");
    store
}

/// Bootstrapped store plus a small Person schema loaded through the generic
/// BSL dialect, the way a bulk file would arrive.
#[allow(unused)]
pub fn person_store() -> EventStore {
    let store = bootstrap_store();
    let schema = "\
Concept: Person
Person: Model: Model Person
: Attribute: name
: Attribute: age
:: DataType: Numeric
: Attribute: email
:: Unique: 1
";
    let loaded = genesis::load_bulk_str(&store, schema, "boot");
    assert_eq!(loaded, 7);
    store
}
