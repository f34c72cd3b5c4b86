//! Recalculation of one individual to the fixed point of its model rules:
//! `Default` restrictions fill absent values once, then `SetValue` rules
//! (gated by `Condition`) iterate in dependency order until a pass changes
//! nothing. Expression failures are absorbed as "no value / condition false";
//! only resolution failures surface to the caller.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use tracing::{debug, warn};

use onticql::parse_expression;
use ontic_proto::{Cause, Event, EventDraft};

use crate::error::RecalcError;
use crate::eval::{evaluate, EvalContext};
use crate::model::{self, FieldDef, ResolvedIndividual};
use crate::store::EventStore;
use crate::value::Value;

pub const DEFAULT_MAX_ITER: usize = 25;

pub fn recalc_individual(store: &EventStore, base: &str, actor: &str, max_iter: usize) -> Result<Vec<Event>, RecalcError> {
    let resolved = model::resolve_individual(store, base)?;
    let fields = &resolved.model.fields;
    let mut state = model::individual_state(store, base, fields);
    let mut emitted: Vec<Event> = Vec::new();

    apply_defaults(store, &resolved, &mut state, &mut emitted, actor)?;

    let order = dependency_order(fields);
    let by_name: HashMap<&str, &FieldDef> = fields.iter().map(|f| (f.name.as_str(), f)).collect();

    let mut iterations = 0usize;
    loop {
        if iterations >= max_iter {
            warn!(individual = base, max_iter, "recalc hit the iteration cap, keeping partial progress");
            break;
        }
        iterations += 1;

        let mut changed = false;
        for name in &order {
            let Some(field) = by_name.get(name.as_str()) else { continue };
            let Some(set_text) = field.restriction("SetValue") else { continue };

            if let Some(cond_text) = field.restriction("Condition") {
                let holds = parse_expression(cond_text)
                    .ok()
                    .and_then(|expr| {
                        let cx = context(&state, actor, base);
                        evaluate(&expr, &cx).ok()
                    })
                    .map(|v| v.is_truthy())
                    .unwrap_or(false);
                if !holds {
                    continue;
                }
            }

            let Ok(expr) = parse_expression(set_text) else {
                debug!(individual = base, field = %field.name, "unparseable SetValue expression, skipping");
                continue;
            };
            let value = {
                let cx = context(&state, actor, base);
                match evaluate(&expr, &cx) {
                    Ok(v) => v,
                    Err(err) => {
                        debug!(individual = base, field = %field.name, %err, "SetValue evaluation failed, skipping");
                        continue;
                    }
                }
            };

            // string-form comparison avoids rewrites on numeric-precision noise
            let current = state.get(&field.name).map(|v| v.canonical()).unwrap_or_default();
            if current.trim() == value.canonical().trim() {
                continue;
            }

            let event = append_property(store, &resolved, &field.name, &value, actor)?;
            emitted.push(event);
            if value.is_null() {
                state.remove(&field.name);
            } else {
                state.insert(field.name.clone(), value);
            }
            changed = true;
        }

        if !changed {
            break;
        }
    }

    Ok(emitted)
}

fn context<'a>(state: &'a BTreeMap<String, Value>, actor: &'a str, individual: &'a str) -> EvalContext<'a> {
    EvalContext { state, input_value: None, actor: Some(actor), individual: Some(individual) }
}

/// Fill fields that have a `Default` and no current value. Order among
/// defaults is irrelevant: each touches a different field.
fn apply_defaults(
    store: &EventStore,
    resolved: &ResolvedIndividual,
    state: &mut BTreeMap<String, Value>,
    emitted: &mut Vec<Event>,
    actor: &str,
) -> Result<(), RecalcError> {
    for field in &resolved.model.fields {
        let Some(text) = field.restriction("Default") else { continue };
        if state.contains_key(&field.name) {
            continue;
        }

        let value = match parse_expression(text) {
            Ok(expr) => {
                let cx = context(state, actor, &resolved.name);
                match evaluate(&expr, &cx) {
                    Ok(v) => v,
                    Err(err) => {
                        debug!(individual = %resolved.name, field = %field.name, %err, "Default evaluation failed, skipping");
                        continue;
                    }
                }
            }
            // a Default that is not an expression is a plain literal value
            Err(_) => Value::parse(text),
        };
        if value.is_null() {
            continue;
        }

        let event = append_property(store, resolved, &field.name, &value, actor)?;
        emitted.push(event);
        state.insert(field.name.clone(), value);
    }
    Ok(())
}

fn append_property(
    store: &EventStore,
    resolved: &ResolvedIndividual,
    field: &str,
    value: &Value,
    actor: &str,
) -> Result<Event, RecalcError> {
    // root at the declaring event; auto-chain threads consecutive writes
    let draft = EventDraft::new(resolved.name.clone(), field, value.canonical())
        .with_actor(actor)
        .with_model(resolved.model.name.clone())
        .with_cause(Cause::single(resolved.declaring.id.clone()));
    Ok(store.append(draft)?)
}

/// Kahn's topological sort over the field dependency graph (an edge runs from
/// each `$.ref` to the field whose rule reads it). Cycles are tolerated: the
/// leftover fields are appended in declaration order and fixpoint iteration
/// takes it from there.
fn dependency_order(fields: &[FieldDef]) -> Vec<String> {
    let names: BTreeSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let mut deps: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for field in fields {
        let mut field_deps = BTreeSet::new();
        for key in ["SetValue", "Condition"] {
            if let Some(text) = field.restriction(key) {
                if let Ok(expr) = parse_expression(text) {
                    for referenced in expr.field_refs() {
                        if names.contains(referenced.as_str()) && referenced != field.name {
                            field_deps.insert(referenced);
                        }
                    }
                }
            }
        }
        deps.insert(&field.name, field_deps);
    }

    let mut indegree: BTreeMap<&str, usize> = fields.iter().map(|f| (f.name.as_str(), deps[f.name.as_str()].len())).collect();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for field in fields {
        for dep in &deps[field.name.as_str()] {
            dependents.entry(dep.as_str()).or_default().push(&field.name);
        }
    }

    let mut queue: VecDeque<&str> = fields.iter().map(|f| f.name.as_str()).filter(|name| indegree[name] == 0).collect();
    let mut order: Vec<String> = Vec::new();
    while let Some(name) = queue.pop_front() {
        order.push(name.to_string());
        for dependent in dependents.get(name).into_iter().flatten() {
            if let Some(entry) = indegree.get_mut(dependent) {
                *entry -= 1;
                if *entry == 0 {
                    queue.push_back(dependent);
                }
            }
        }
    }

    if order.len() < fields.len() {
        debug!("field dependency cycle, appending the remainder in declaration order");
        for field in fields {
            if !order.iter().any(|n| n == &field.name) {
                order.push(field.name.clone());
            }
        }
    }
    order
}
