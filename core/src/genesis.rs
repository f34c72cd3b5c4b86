//! The genesis bootstrap: a fixed table of stable-id events that makes the
//! system self-describing before any user event, plus the optional bulk BSL
//! loads (bootstrap and thesaurus) with deterministic content-addressed ids.

use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, info, warn};

use ontic_proto::{genesis_stamp, Cause, EventDraft, EventId, ACTOR_GENESIS, ACTOR_SYSTEM};

use crate::bsl;
use crate::store::EventStore;

pub const BOOTSTRAP_PREFIX: &str = "boot";
pub const THESAURUS_PREFIX: &str = "thes";

/// Paths recognized by the core. Everything else (ports, keys, hosts) belongs
/// to collaborator layers.
#[derive(Debug, Clone, Default)]
pub struct GenesisConfig {
    /// Optional genesis-dialect BSL appended after the built-in table.
    pub genesis_path: Option<PathBuf>,
    /// Optional generic-dialect bulk load with `boot_` ids.
    pub bootstrap_path: Option<PathBuf>,
    /// Optional generic-dialect bulk load with `thes_` ids.
    pub thesaurus_path: Option<PathBuf>,
}

/// Number of events in the built-in table.
pub fn genesis_event_count() -> usize { GENESIS_TABLE.len() }

pub fn genesis_ids() -> impl Iterator<Item = EventId> { GENESIS_TABLE.iter().map(|row| EventId::from(row.0)) }

/// Populate an empty store with the root ontology and the configured bulk
/// files. No-op when the store already holds events.
pub fn load_if_empty(store: &EventStore, config: &GenesisConfig) -> anyhow::Result<usize> {
    if store.count() > 0 {
        debug!("store is not empty, skipping genesis load");
        return Ok(0);
    }

    store.seed_genesis_ids(genesis_ids());

    let mut step = 0u64;
    let mut count = 0usize;
    for row in GENESIS_TABLE {
        let (id, base, kind, value, cause, model) = *row;
        let cause = Cause::new(
            cause.split(',').map(str::trim).filter(|s| !s.is_empty()).map(EventId::from).collect::<Vec<_>>(),
        );
        let draft = EventDraft::new(base, kind, value)
            .with_id(id)
            .with_actor(ACTOR_GENESIS)
            .with_date(genesis_stamp(step))
            .with_cause(cause)
            .with_model(model);
        step += 1;
        match store.append(draft) {
            Ok(_) => count += 1,
            Err(err) => warn!(%err, id, "skipping genesis row"),
        }
    }

    if let Some(path) = &config.genesis_path {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading genesis file {}", path.display()))?;
        count += load_genesis_str(store, &text, &mut step);
    }
    if let Some(path) = &config.bootstrap_path {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading bootstrap file {}", path.display()))?;
        count += load_bulk_str(store, &text, BOOTSTRAP_PREFIX);
    }
    if let Some(path) = &config.thesaurus_path {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading thesaurus file {}", path.display()))?;
        count += load_bulk_str(store, &text, THESAURUS_PREFIX);
    }

    info!(count, "genesis load complete");
    Ok(count)
}

/// Append genesis-dialect text. Ids from the file join the genesis id set so
/// the file may reference its own rows in any order.
pub fn load_genesis_str(store: &EventStore, text: &str, step: &mut u64) -> usize {
    let drafts = bsl::genesis::parse(text);
    store.seed_genesis_ids(drafts.iter().filter_map(|d| d.id.clone()));
    let mut count = 0;
    for mut draft in drafts {
        draft.date = Some(genesis_stamp(*step));
        *step += 1;
        match store.append(draft) {
            Ok(_) => count += 1,
            Err(err) => warn!(%err, "skipping genesis file row"),
        }
    }
    count
}

/// Append generic-dialect text as a system bulk load with deterministic ids.
/// Offending events are skipped, the rest of the file still loads.
pub fn load_bulk_str(store: &EventStore, text: &str, prefix: &str) -> usize {
    store.register_system_prefix(prefix);
    let mut count = 0;
    for draft in bsl::GenericParser::new(ACTOR_SYSTEM).with_deterministic_ids(prefix).parse(text) {
        match store.append(draft) {
            Ok(_) => count += 1,
            Err(err) => warn!(%err, "skipping bulk row"),
        }
    }
    count
}

// (id, base, type, value, cause, model); cause is a comma-joined id list.
//
// Ids are global and unique (I1), so a name shared between the concept list
// and the restriction-kind list (`DataType`) is declared once, as the concept.
#[rustfmt::skip]
const GENESIS_TABLE: &[(&str, &str, &str, &str, &str, &str)] = &[
    // the self-referential root
    ("Event", "Event", "Event", "Event", "Event", "Event"),

    // core concepts
    ("Concept", "Concept", "Instance", "Concept", "Event", "Concept"),
    ("Instance", "Concept", "Instance", "Instance", "Concept", "Concept"),
    ("Model", "Concept", "Instance", "Model", "Concept", "Concept"),
    ("Individual", "Concept", "Instance", "Individual", "Concept", "Concept"),
    ("Attribute", "Concept", "Instance", "Attribute", "Concept", "Concept"),
    ("Relation", "Concept", "Instance", "Relation", "Concept", "Concept"),
    ("Role", "Concept", "Instance", "Role", "Concept", "Concept"),
    ("Restriction", "Concept", "Instance", "Restriction", "Concept", "Concept"),
    ("DataType", "Concept", "Instance", "DataType", "Concept", "Concept"),
    ("Actor", "Concept", "Instance", "Actor", "Concept", "Concept"),
    ("Session", "Concept", "Instance", "Session", "Concept", "Concept"),
    ("Schema", "Concept", "Instance", "Schema", "Concept", "Concept"),
    ("Query", "Concept", "Instance", "Query", "Concept", "Concept"),
    ("Rule", "Concept", "Instance", "Rule", "Concept", "Concept"),
    ("Source", "Concept", "Instance", "Source", "Concept", "Concept"),
    ("Tag", "Concept", "Instance", "Tag", "Concept", "Concept"),
    ("Instruction", "Concept", "Instance", "Instruction", "Concept", "Concept"),

    // data types
    ("Numeric", "DataType", "Instance", "Numeric", "DataType", "DataType"),
    ("Boolean", "DataType", "Instance", "Boolean", "DataType", "DataType"),
    ("TextType", "DataType", "Instance", "TextType", "DataType", "DataType"),
    ("DateTime", "DataType", "Instance", "DateTime", "DataType", "DataType"),
    ("DateType", "DataType", "Instance", "DateType", "DataType", "DataType"),
    ("EnumType", "DataType", "Instance", "EnumType", "DataType", "DataType"),
    ("JsonType", "DataType", "Instance", "JsonType", "DataType", "DataType"),
    ("UrlType", "DataType", "Instance", "UrlType", "DataType", "DataType"),
    ("FloatType", "DataType", "Instance", "FloatType", "DataType", "DataType"),
    ("FileType", "DataType", "Instance", "FileType", "DataType", "DataType"),
    ("ImageType", "DataType", "Instance", "ImageType", "DataType", "DataType"),
    ("ReferenceType", "DataType", "Instance", "ReferenceType", "DataType", "DataType"),

    // restriction kinds (`DataType` doubles as the concept above)
    ("Required", "Restriction", "Instance", "Required", "Restriction", "Restriction"),
    ("Range", "Restriction", "Instance", "Range", "Restriction", "Restriction"),
    ("SetRange", "Restriction", "Instance", "SetRange", "Restriction", "Restriction"),
    ("Default", "Restriction", "Instance", "Default", "Restriction", "Restriction"),
    ("SetValue", "Restriction", "Instance", "SetValue", "Restriction", "Restriction"),
    ("Condition", "Restriction", "Instance", "Condition", "Restriction", "Restriction"),
    ("ValueCondition", "Restriction", "Instance", "ValueCondition", "Restriction", "Restriction"),
    ("Unique", "Restriction", "Instance", "Unique", "Restriction", "Restriction"),
    ("UniqueIdentifier", "Restriction", "Instance", "UniqueIdentifier", "Restriction", "Restriction"),
    ("Multiple", "Restriction", "Instance", "Multiple", "Restriction", "Restriction"),
    ("Immutable", "Restriction", "Instance", "Immutable", "Restriction", "Restriction"),
    ("Permission", "Restriction", "Instance", "Permission", "Restriction", "Restriction"),

    // core relation names
    ("isA", "Relation", "Instance", "isA", "Relation", "Relation"),
    ("hasA", "Relation", "Instance", "hasA", "Relation", "Relation"),
    ("partOf", "Relation", "Instance", "partOf", "Relation", "Relation"),
    ("relatedTo", "Relation", "Instance", "relatedTo", "Relation", "Relation"),
    ("instanceOf", "Relation", "Instance", "instanceOf", "Relation", "Relation"),
    ("subConceptOf", "Relation", "Instance", "subConceptOf", "Relation", "Relation"),
    ("describes", "Relation", "Instance", "describes", "Relation", "Relation"),
    ("derivesFrom", "Relation", "Instance", "derivesFrom", "Relation", "Relation"),

    // system actors
    ("system", "Actor", "Individual", "system", "Actor", "Model Actor"),
    ("engine", "Actor", "Individual", "engine", "Actor", "Model Actor"),
    ("guest", "Actor", "Individual", "guest", "Actor", "Model Actor"),
    ("view", "Actor", "Individual", "view", "Actor", "Model Actor"),
    ("anonymous", "Actor", "Individual", "anonymous", "Actor", "Model Actor"),
    ("system.SetModel", "system", "SetModel", "Model Actor", "system", ""),
    ("engine.SetModel", "engine", "SetModel", "Model Actor", "engine", ""),
    ("guest.SetModel", "guest", "SetModel", "Model Actor", "guest", ""),
    ("view.SetModel", "view", "SetModel", "Model Actor", "view", ""),
    ("anonymous.SetModel", "anonymous", "SetModel", "Model Actor", "anonymous", ""),

    // system roles and grants
    ("admin", "Role", "Individual", "admin", "Role", "Model Role"),
    ("editor", "Role", "Individual", "editor", "Role", "Model Role"),
    ("viewer", "Role", "Individual", "viewer", "Role", "Model Role"),
    ("user", "Role", "Individual", "user", "Role", "Model Role"),
    ("system.Role.admin", "system", "Role", "admin", "system", "Model Actor"),
    ("engine.Role.admin", "engine", "Role", "admin", "engine", "Model Actor"),
    ("view.Role.viewer", "view", "Role", "viewer", "view", "Model Actor"),
    ("guest.Role.viewer", "guest", "Role", "viewer", "guest", "Model Actor"),

    // Model Event describes the record itself
    ("ModelEvent", "Event", "Model", "Model Event", "Event", ""),
    ("Event.id", "Event", "Attribute", "id", "ModelEvent", ""),
    ("Event.base", "Event", "Attribute", "base", "ModelEvent", ""),
    ("Event.type", "Event", "Attribute", "type", "ModelEvent", ""),
    ("Event.value", "Event", "Attribute", "value", "ModelEvent", ""),
    ("Event.actor", "Event", "Attribute", "actor", "ModelEvent", ""),
    ("Event.date", "Event", "Attribute", "date", "ModelEvent", ""),
    ("Event.cause", "Event", "Relation", "cause", "ModelEvent", ""),
    ("Event.model", "Event", "Relation", "model", "ModelEvent", ""),
    ("Event.session", "Event", "Attribute", "session", "ModelEvent", ""),
    ("Event.id.Required", "id", "Required", "1", "Event.id", ""),
    ("Event.type.Required", "type", "Required", "1", "Event.type", ""),
    ("Event.date.DataType", "date", "DataType", "DateTime", "Event.date", ""),

    // Model Concept
    ("ModelConcept", "Concept", "Model", "Model Concept", "Concept", ""),
    ("Concept.name", "Concept", "Attribute", "name", "ModelConcept", ""),
    ("Concept.description", "Concept", "Attribute", "description", "ModelConcept", ""),
    ("Concept.name.Required", "name", "Required", "1", "Concept.name", ""),
    ("Concept.name.Unique", "name", "Unique", "1", "Concept.name", ""),
    ("Concept.name.DataType", "name", "DataType", "TextType", "Concept.name", ""),
    ("Concept.description.DataType", "description", "DataType", "TextType", "Concept.description", ""),

    // Model Individual
    ("ModelIndividual", "Individual", "Model", "Model Individual", "Individual", ""),
    ("Individual.label", "Individual", "Attribute", "label", "ModelIndividual", ""),
    ("Individual.comment", "Individual", "Attribute", "comment", "ModelIndividual", ""),
    ("Individual.label.DataType", "label", "DataType", "TextType", "Individual.label", ""),

    // Model Attribute
    ("ModelAttribute", "Attribute", "Model", "Model Attribute", "Attribute", ""),
    ("Attribute.label", "Attribute", "Attribute", "label", "ModelAttribute", ""),
    ("Attribute.order", "Attribute", "Attribute", "order", "ModelAttribute", ""),
    ("Attribute.order.DataType", "order", "DataType", "Numeric", "Attribute.order", ""),

    // Model Relation
    ("ModelRelation", "Relation", "Model", "Model Relation", "Relation", ""),
    ("Relation.label", "Relation", "Attribute", "label", "ModelRelation", ""),
    ("Relation.inverse", "Relation", "Attribute", "inverse", "ModelRelation", ""),
    ("Relation.inverse.DataType", "inverse", "DataType", "TextType", "Relation.inverse", ""),

    // Model Actor
    ("ModelActor", "Actor", "Model", "Model Actor", "Actor", ""),
    ("Actor.name", "Actor", "Attribute", "name", "ModelActor", ""),
    ("Actor.contact", "Actor", "Attribute", "contact", "ModelActor", ""),
    ("Actor.name.Required", "name", "Required", "1", "Actor.name", ""),

    // Model Role
    ("ModelRole", "Role", "Model", "Model Role", "Role", ""),
    ("Role.description", "Role", "Attribute", "description", "ModelRole", ""),
    ("Role.description.DataType", "description", "DataType", "TextType", "Role.description", ""),

    // Model Schema
    ("ModelSchema", "Schema", "Model", "Model Schema", "Schema", ""),
    ("Schema.instruction", "Schema", "Attribute", "instruction", "ModelSchema", ""),
    ("Schema.target", "Schema", "Attribute", "target", "ModelSchema", ""),
    ("Schema.examples", "Schema", "Attribute", "examples", "ModelSchema", ""),
    ("Schema.instruction.Required", "instruction", "Required", "1", "Schema.instruction", ""),
    ("Schema.instruction.DataType", "instruction", "DataType", "TextType", "Schema.instruction", ""),
    ("Schema.target.DataType", "target", "DataType", "TextType", "Schema.target", ""),
    ("Schema.examples.DataType", "examples", "DataType", "TextType", "Schema.examples", ""),

    // schema-instruction individuals
    ("schema_concept", "Schema", "Individual", "schema_concept", "Schema", ""),
    ("schema_concept.SetModel", "schema_concept", "SetModel", "Model Schema", "schema_concept", ""),
    ("schema_concept.instruction", "schema_concept", "instruction", "Declare a concept as `Concept: <Name>` before using it as a base.", "schema_concept.SetModel", "Model Schema"),
    ("schema_concept.target", "schema_concept", "target", "Concept", "schema_concept.SetModel", "Model Schema"),
    ("schema_model", "Schema", "Individual", "schema_model", "Schema", ""),
    ("schema_model.SetModel", "schema_model", "SetModel", "Model Schema", "schema_model", ""),
    ("schema_model.instruction", "schema_model", "instruction", "Attach a model as `<Concept>: Model: Model <Name>`; nested lines add its fields.", "schema_model.SetModel", "Model Schema"),
    ("schema_model.target", "schema_model", "target", "Model", "schema_model.SetModel", "Model Schema"),
    ("schema_individual", "Schema", "Individual", "schema_individual", "Schema", ""),
    ("schema_individual.SetModel", "schema_individual", "SetModel", "Model Schema", "schema_individual", ""),
    ("schema_individual.instruction", "schema_individual", "instruction", "Create an individual as `<Concept>: <name>`; lowercase names are individuals.", "schema_individual.SetModel", "Model Schema"),
    ("schema_individual.target", "schema_individual", "target", "Individual", "schema_individual.SetModel", "Model Schema"),
    ("schema_attribute", "Schema", "Individual", "schema_attribute", "Schema", ""),
    ("schema_attribute.SetModel", "schema_attribute", "SetModel", "Model Schema", "schema_attribute", ""),
    ("schema_attribute.instruction", "schema_attribute", "instruction", "Add attributes under a model line as `: Attribute: <field>`.", "schema_attribute.SetModel", "Model Schema"),
    ("schema_attribute.target", "schema_attribute", "target", "Attribute", "schema_attribute.SetModel", "Model Schema"),
    ("schema_relation", "Schema", "Individual", "schema_relation", "Schema", ""),
    ("schema_relation.SetModel", "schema_relation", "SetModel", "Model Schema", "schema_relation", ""),
    ("schema_relation.instruction", "schema_relation", "instruction", "Add relations under a model line as `: Relation: <field>`; Range restricts the target concept.", "schema_relation.SetModel", "Model Schema"),
    ("schema_relation.target", "schema_relation", "target", "Relation", "schema_relation.SetModel", "Model Schema"),
    ("schema_restriction", "Schema", "Individual", "schema_restriction", "Schema", ""),
    ("schema_restriction.SetModel", "schema_restriction", "SetModel", "Model Schema", "schema_restriction", ""),
    ("schema_restriction.instruction", "schema_restriction", "instruction", "Nest restrictions under a field line, e.g. `:: Required: 1` or `:: Default: 10`.", "schema_restriction.SetModel", "Model Schema"),
    ("schema_setmodel", "Schema", "Individual", "schema_setmodel", "Schema", ""),
    ("schema_setmodel.SetModel", "schema_setmodel", "SetModel", "Model Schema", "schema_setmodel", ""),
    ("schema_setmodel.instruction", "schema_setmodel", "instruction", "Bind an individual to a model as `<name>: SetModel: Model <Name>`.", "schema_setmodel.SetModel", "Model Schema"),
    ("schema_property", "Schema", "Individual", "schema_property", "Schema", ""),
    ("schema_property.SetModel", "schema_property", "SetModel", "Model Schema", "schema_property", ""),
    ("schema_property.instruction", "schema_property", "instruction", "Set a property as `<name>: <field>: <value>`; the latest event wins.", "schema_property.SetModel", "Model Schema"),
    ("schema_query", "Schema", "Individual", "schema_query", "Schema", ""),
    ("schema_query.SetModel", "schema_query", "SetModel", "Model Schema", "schema_query", ""),
    ("schema_query.instruction", "schema_query", "instruction", "Query individuals as `$(cond, ...)` with accessors like `[0]` and `.field`.", "schema_query.SetModel", "Model Schema"),
    ("schema_rule", "Schema", "Individual", "schema_rule", "Schema", ""),
    ("schema_rule.SetModel", "schema_rule", "SetModel", "Model Schema", "schema_rule", ""),
    ("schema_rule.instruction", "schema_rule", "instruction", "Derive values with SetValue expressions over `$.field` references; Condition gates them.", "schema_rule.SetModel", "Model Schema"),
];
