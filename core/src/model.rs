//! Projections over the event log. Concepts, models, fields, restrictions and
//! individuals are not stored as records of their own; everything here is a
//! read-side interpretation of events, recomputed from the store on demand.

use std::collections::BTreeMap;

use ontic_proto::{Event, EventId, DELETE_KINDS};

use crate::error::RecalcError;
use crate::store::{EventStore, Filter};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Attribute,
    Relation,
}

/// A field (Attribute or Relation) of a model, with its restrictions keyed by
/// restriction kind. Latest restriction event per kind wins.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    pub event_id: EventId,
    pub restrictions: BTreeMap<String, String>,
}

impl FieldDef {
    pub fn restriction(&self, kind: &str) -> Option<&str> { self.restrictions.get(kind).map(|s| s.as_str()) }
}

#[derive(Debug, Clone)]
pub struct ModelDef {
    pub concept: String,
    pub name: String,
    pub event_id: EventId,
    pub fields: Vec<FieldDef>,
}

impl ModelDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> { self.fields.iter().find(|f| f.name == name) }
}

/// The latest `Individual` event declaring this name; its base is the concept.
pub fn declaring_event(store: &EventStore, name: &str) -> Option<Event> {
    store.list(&Filter::default().kind("Individual")).into_iter().filter(|ev| ev.value == name).last()
}

pub fn resolve_concept(store: &EventStore, individual: &str) -> Option<String> {
    declaring_event(store, individual).map(|ev| ev.base)
}

/// Latest `SetModel` binding, falling back to the `Model <Concept>` convention.
pub fn resolve_model_name(store: &EventStore, individual: &str, concept: &str) -> String {
    store
        .list(&Filter::default().base(individual).kind("SetModel"))
        .last()
        .map(|ev| ev.value.clone())
        .unwrap_or_else(|| format!("Model {}", concept))
}

/// Latest `Model` event declaring this model for the concept; falls back to
/// any `Model` event with a matching name.
pub fn resolve_model_event(store: &EventStore, concept: &str, model_name: &str) -> Option<Event> {
    let models = store.list(&Filter::default().kind("Model"));
    models
        .iter()
        .filter(|ev| ev.base == concept && ev.value == model_name)
        .last()
        .or_else(|| models.iter().filter(|ev| ev.value == model_name).last())
        .cloned()
}

/// Latest `Model` event with this name regardless of concept. Used by the
/// validator, which starts from a draft's model name alone.
pub fn model_event_by_name(store: &EventStore, model_name: &str) -> Option<Event> {
    store.list(&Filter::default().kind("Model")).into_iter().filter(|ev| ev.value == model_name).last()
}

/// Attribute/Relation events whose cause contains the model's id, each with
/// its restrictions (events whose cause contains the field's id).
pub fn load_fields(store: &EventStore, model_id: &EventId) -> Vec<FieldDef> {
    let mut fields: Vec<FieldDef> = Vec::new();
    for (kind_name, kind) in [("Attribute", FieldKind::Attribute), ("Relation", FieldKind::Relation)] {
        for ev in store.list(&Filter::default().kind(kind_name)) {
            if ev.cause.contains(model_id) {
                fields.push(FieldDef { name: ev.value.clone(), kind, event_id: ev.id.clone(), restrictions: BTreeMap::new() });
            }
        }
    }

    // one pass over the log attaches restrictions to their fields
    for ev in store.list(&Filter::default()) {
        for field in fields.iter_mut() {
            if ev.id != field.event_id && ev.cause.contains(&field.event_id) {
                field.restrictions.insert(ev.kind.clone(), ev.value.clone());
            }
        }
    }
    fields
}

/// An individual fully resolved to its effective model, ready for
/// recalculation.
#[derive(Debug, Clone)]
pub struct ResolvedIndividual {
    pub name: String,
    pub declaring: Event,
    pub model: ModelDef,
}

pub fn resolve_individual(store: &EventStore, base: &str) -> Result<ResolvedIndividual, RecalcError> {
    let declaring = declaring_event(store, base).ok_or_else(|| RecalcError::UnknownIndividual(base.to_string()))?;
    let concept = declaring.base.clone();
    let model_name = resolve_model_name(store, base, &concept);
    let model_event =
        resolve_model_event(store, &concept, &model_name).ok_or_else(|| RecalcError::ModelNotFound(model_name.clone()))?;
    let fields = load_fields(store, &model_event.id);
    Ok(ResolvedIndividual {
        name: base.to_string(),
        declaring,
        model: ModelDef { concept, name: model_name, event_id: model_event.id, fields },
    })
}

/// Latest property event for (individual, field).
pub fn latest_property(store: &EventStore, base: &str, field: &str) -> Option<Event> {
    store.list(&Filter::default().base(base).kind(field)).into_iter().last()
}

pub fn latest_value(store: &EventStore, base: &str, field: &str) -> Option<Value> {
    latest_property(store, base, field).map(|ev| Value::parse(&ev.value))
}

/// Current coerced state of the individual over the given field set. Fields
/// whose latest value is absent or null are left out of the map.
pub fn individual_state(store: &EventStore, base: &str, fields: &[FieldDef]) -> BTreeMap<String, Value> {
    let mut state = BTreeMap::new();
    for field in fields {
        if let Some(value) = latest_value(store, base, &field.name) {
            if !value.is_null() {
                state.insert(field.name.clone(), value);
            }
        }
    }
    state
}

/// Compensating-delete projection: the latest delete-kind event decides, so a
/// later falsy event restores the individual.
pub fn is_deleted(store: &EventStore, base: &str) -> bool {
    let mut latest: Option<Event> = None;
    for kind in DELETE_KINDS {
        if let Some(ev) = store.list(&Filter::default().base(base).kind(*kind)).into_iter().last() {
            match &latest {
                Some(prev) if prev.date >= ev.date => {}
                _ => latest = Some(ev),
            }
        }
    }
    latest.map(|ev| Value::parse(&ev.value).is_truthy()).unwrap_or(false)
}

/// All individuals in declaration order (latest declaring event per name).
pub fn individuals(store: &EventStore) -> Vec<Event> {
    let mut latest: BTreeMap<String, Event> = BTreeMap::new();
    for ev in store.list(&Filter::default().kind("Individual")) {
        latest.insert(ev.value.clone(), ev);
    }
    let mut out: Vec<Event> = latest.into_values().collect();
    out.sort_by(|a, b| a.date.cmp(&b.date));
    out
}
