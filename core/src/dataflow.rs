//! The driver layer above recalc: watches the log for fresh events and
//! recalculates the individuals whose state may have changed, until nothing
//! new is produced.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use onticql::parse_expression;
use ontic_proto::{Event, ACTOR_ENGINE};

use crate::eval::{evaluate, EvalContext};
use crate::model;
use crate::recalc::{recalc_individual, DEFAULT_MAX_ITER};
use crate::store::EventStore;

/// One armed rule of an individual's model: a `Condition` gate or a
/// `SetValue` derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub individual: String,
    pub field: String,
    pub kind: GuardKind,
    pub expression: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    Condition,
    SetValue,
}

pub trait Dataflow {
    /// Recalculate individuals touched since the previous step.
    fn step(&mut self) -> anyhow::Result<Vec<Event>>;

    /// Step until a step produces nothing, or the iteration cap is hit.
    /// Returns the number of steps taken and everything produced.
    fn to_fixpoint(&mut self, max_iter: usize) -> anyhow::Result<(usize, Vec<Event>)>;

    /// Recalculate exactly the individuals touched by the given events.
    fn incremental(&mut self, events: &[Event]) -> anyhow::Result<Vec<Event>>;

    fn list_guards(&self) -> Vec<Guard>;

    /// Guards whose gate currently holds: a `Condition` that evaluates
    /// truthy, or a `SetValue` whose field has no blocking condition.
    fn list_active_guards(&self) -> Vec<Guard>;
}

/// Cursor-driven driver over `since(date)`. Emitted recalc events land after
/// the cursor, so the next step revisits them; recalc idempotence (P6) makes
/// that a no-op and the fixpoint loop terminates.
pub struct BasicDriver {
    store: Arc<EventStore>,
    cursor: String,
    max_iter: usize,
}

impl BasicDriver {
    pub fn new(store: Arc<EventStore>) -> Self { Self { store, cursor: String::new(), max_iter: DEFAULT_MAX_ITER } }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn touched_individuals(&self, events: &[Event]) -> BTreeSet<String> {
        let mut bases = BTreeSet::new();
        for ev in events {
            // a property write touches its base; an Individual declaration
            // touches the newly-declared name
            if ev.kind == "Individual" {
                bases.insert(ev.value.clone());
            } else {
                bases.insert(ev.base.clone());
            }
        }
        bases
    }

    fn recalc_all(&self, bases: BTreeSet<String>) -> Vec<Event> {
        let mut produced = Vec::new();
        for base in bases {
            match recalc_individual(&self.store, &base, ACTOR_ENGINE, self.max_iter) {
                Ok(events) => produced.extend(events),
                // non-individuals and schema subjects simply have nothing to recalc
                Err(err) => debug!(%base, %err, "skipping recalc"),
            }
        }
        produced
    }

    fn guards(&self, only_active: bool) -> Vec<Guard> {
        let mut out = Vec::new();
        for declaring in model::individuals(&self.store) {
            let name = declaring.value.clone();
            let Ok(resolved) = model::resolve_individual(&self.store, &name) else {
                continue;
            };
            let state = model::individual_state(&self.store, &name, &resolved.model.fields);

            for field in &resolved.model.fields {
                let condition = field.restriction("Condition");
                let condition_holds = match condition {
                    None => true,
                    Some(text) => parse_expression(text)
                        .ok()
                        .and_then(|expr| {
                            let cx = EvalContext {
                                state: &state,
                                input_value: None,
                                actor: None,
                                individual: Some(&name),
                            };
                            evaluate(&expr, &cx).ok()
                        })
                        .map(|v| v.is_truthy())
                        .unwrap_or(false),
                };

                if let Some(text) = condition {
                    if !only_active || condition_holds {
                        out.push(Guard {
                            individual: name.clone(),
                            field: field.name.clone(),
                            kind: GuardKind::Condition,
                            expression: text.to_string(),
                        });
                    }
                }
                if let Some(text) = field.restriction("SetValue") {
                    if !only_active || condition_holds {
                        out.push(Guard {
                            individual: name.clone(),
                            field: field.name.clone(),
                            kind: GuardKind::SetValue,
                            expression: text.to_string(),
                        });
                    }
                }
            }
        }
        out
    }
}

impl Dataflow for BasicDriver {
    fn step(&mut self) -> anyhow::Result<Vec<Event>> {
        let fresh = self.store.since(&self.cursor);
        if let Some(last) = fresh.last() {
            self.cursor = last.date.clone();
        }
        if fresh.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.recalc_all(self.touched_individuals(&fresh)))
    }

    fn to_fixpoint(&mut self, max_iter: usize) -> anyhow::Result<(usize, Vec<Event>)> {
        let mut produced = Vec::new();
        for iteration in 1..=max_iter {
            let events = self.step()?;
            if events.is_empty() {
                return Ok((iteration, produced));
            }
            produced.extend(events);
        }
        warn!(max_iter, "dataflow hit the iteration cap");
        Ok((max_iter, produced))
    }

    fn incremental(&mut self, events: &[Event]) -> anyhow::Result<Vec<Event>> {
        Ok(self.recalc_all(self.touched_individuals(events)))
    }

    fn list_guards(&self) -> Vec<Guard> { self.guards(false) }

    fn list_active_guards(&self) -> Vec<Guard> { self.guards(true) }
}
