//! The indexed append-only event store. One logical writer, many readers:
//! appends serialize behind a mutex so the auto-chain lookup and the cycle
//! check always observe a consistent prefix of history, while reads go
//! straight to the log and the lock-free indexes.

use dashmap::{DashMap, DashSet};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::debug;

use ontic_proto::{is_privileged_actor, Event, EventDraft, EventId, WallClock};

use crate::error::{RetrievalError, StructuralError};
use crate::storage::{EventLog, MemoryLog};

/// Narrows `list` by any subset of base / type / actor / session.
#[derive(Debug, Default, Clone)]
pub struct Filter {
    pub base: Option<String>,
    pub kind: Option<String>,
    pub actor: Option<String>,
    pub session: Option<String>,
}

impl Filter {
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    fn matches(&self, ev: &Event) -> bool {
        self.base.as_deref().map_or(true, |b| ev.base == b)
            && self.kind.as_deref().map_or(true, |k| ev.kind == k)
            && self.actor.as_deref().map_or(true, |a| ev.actor == a)
            && self.session.as_deref().map_or(true, |s| ev.session.as_deref() == Some(s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub concepts: usize,
    pub individuals: usize,
    pub models: usize,
    #[serde(rename = "byActor")]
    pub by_actor: BTreeMap<String, usize>,
}

pub struct EventStore {
    log: Arc<dyn EventLog>,
    clock: WallClock,
    ids: DashMap<EventId, usize>,
    by_base: DashMap<String, Vec<usize>>,
    by_kind: DashMap<String, Vec<usize>>,
    by_actor: DashMap<String, Vec<usize>>,
    by_session: DashMap<String, Vec<usize>>,
    genesis_ids: DashSet<EventId>,
    system_prefixes: DashSet<String>,
    write: Mutex<()>,
}

impl EventStore {
    pub fn new() -> Self { Self::with_log(Arc::new(MemoryLog::new())) }

    pub fn with_log(log: Arc<dyn EventLog>) -> Self {
        Self {
            log,
            clock: WallClock::new(),
            ids: DashMap::new(),
            by_base: DashMap::new(),
            by_kind: DashMap::new(),
            by_actor: DashMap::new(),
            by_session: DashMap::new(),
            genesis_ids: DashSet::new(),
            system_prefixes: DashSet::new(),
            write: Mutex::new(()),
        }
    }

    /// Register the well-known genesis identifiers before loading them.
    /// Membership lifts the "cause must already exist" rule and permits the
    /// root event's self-reference.
    pub fn seed_genesis_ids(&self, ids: impl IntoIterator<Item = EventId>) {
        for id in ids {
            self.genesis_ids.insert(id);
        }
    }

    /// Register an id prefix used by a bulk BSL load (`boot`, `thes`, …).
    pub fn register_system_prefix(&self, prefix: impl Into<String>) { self.system_prefixes.insert(prefix.into()); }

    pub fn is_genesis_id(&self, id: &EventId) -> bool { self.genesis_ids.contains(id) }

    pub fn is_system_id(&self, id: &EventId) -> bool {
        match id.as_str().split_once('_') {
            Some((prefix, _)) => self.system_prefixes.contains(prefix),
            None => false,
        }
    }

    /// Append one event. Atomic per event: either the fully-formed record
    /// becomes visible to all subsequent reads, or nothing is written.
    pub fn append(&self, draft: EventDraft) -> Result<Event, StructuralError> {
        let _guard = self.write.lock().unwrap();

        if draft.base.trim().is_empty() || draft.kind.trim().is_empty() {
            return Err(StructuralError::MalformedEvent("base and type are required".into()));
        }

        let id = draft.id.clone().unwrap_or_else(EventId::generate);
        if self.ids.contains_key(&id) {
            return Err(StructuralError::DuplicateId(id));
        }

        let date = draft.date.clone().unwrap_or_else(|| self.clock.now_stamp());

        let mut cause = draft.cause.clone();
        if !is_privileged_actor(&draft.actor) {
            if let Some(prev) = self.chain_head(&draft.base, &draft.model, &draft.actor) {
                cause.push(prev);
            }
        }

        // the genesis root is the single legal self-reference
        if cause.contains(&id) && !self.is_genesis_id(&id) {
            return Err(StructuralError::CycleDetected(id));
        }
        for parent in cause.iter() {
            if parent != &id && !self.ids.contains_key(parent) && !self.is_genesis_id(parent) {
                return Err(StructuralError::MalformedEvent(format!("unknown cause reference {}", parent)));
            }
        }
        // direct self-reference was policed above; the closure walk checks
        // the remaining parents
        let parents: Vec<EventId> = cause.iter().filter(|c| **c != id).cloned().collect();
        if self.closure_reaches(&parents, &id) {
            return Err(StructuralError::CycleDetected(id));
        }

        let event = Event {
            id: id.clone(),
            base: draft.base,
            kind: draft.kind,
            value: draft.value,
            actor: draft.actor,
            date,
            cause,
            model: draft.model,
            session: draft.session,
        };

        let pos = self.log.push(event.clone());
        self.ids.insert(id, pos);
        self.by_base.entry(event.base.clone()).or_default().push(pos);
        self.by_kind.entry(event.kind.clone()).or_default().push(pos);
        self.by_actor.entry(event.actor.clone()).or_default().push(pos);
        if let Some(session) = &event.session {
            self.by_session.entry(session.clone()).or_default().push(pos);
        }

        debug!(%event, "append");
        Ok(event)
    }

    pub fn get(&self, id: &EventId) -> Result<Event, RetrievalError> {
        let pos = self.ids.get(id).map(|p| *p).ok_or_else(|| RetrievalError::NotFound(id.clone()))?;
        self.log.at(pos).cloned().ok_or_else(|| RetrievalError::NotFound(id.clone()))
    }

    /// Events matching the filter, ordered by date ascending (ties keep
    /// arrival order).
    pub fn list(&self, filter: &Filter) -> Vec<Event> {
        let candidates: Vec<usize> = if let Some(base) = &filter.base {
            self.by_base.get(base).map(|v| v.value().clone()).unwrap_or_default()
        } else if let Some(kind) = &filter.kind {
            self.by_kind.get(kind).map(|v| v.value().clone()).unwrap_or_default()
        } else if let Some(actor) = &filter.actor {
            self.by_actor.get(actor).map(|v| v.value().clone()).unwrap_or_default()
        } else if let Some(session) = &filter.session {
            self.by_session.get(session).map(|v| v.value().clone()).unwrap_or_default()
        } else {
            (0..self.log.len()).collect()
        };

        let mut out: Vec<Event> =
            candidates.into_iter().filter_map(|pos| self.log.at(pos)).filter(|ev| filter.matches(ev)).cloned().collect();
        out.sort_by(|a, b| a.date.cmp(&b.date));
        out
    }

    /// Events with date strictly greater than the given stamp, date ascending.
    pub fn since(&self, date: &str) -> Vec<Event> {
        let mut out: Vec<Event> =
            (0..self.log.len()).filter_map(|pos| self.log.at(pos)).filter(|ev| ev.date.as_str() > date).cloned().collect();
        out.sort_by(|a, b| a.date.cmp(&b.date));
        out
    }

    pub fn count(&self) -> usize { self.log.len() }

    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats { total: 0, concepts: 0, individuals: 0, models: 0, by_actor: BTreeMap::new() };
        for pos in 0..self.log.len() {
            let Some(ev) = self.log.at(pos) else { continue };
            stats.total += 1;
            if ev.base == "Concept" && ev.kind == "Instance" {
                stats.concepts += 1;
            }
            if ev.kind == "Individual" {
                stats.individuals += 1;
            }
            if ev.kind == "Model" {
                stats.models += 1;
            }
            *stats.by_actor.entry(ev.actor.clone()).or_insert(0) += 1;
        }
        stats
    }

    /// Offline audit: walk the stored event's cause closure and confirm it
    /// never returns to the event itself. Append enforces this already; this
    /// re-checks imported history.
    pub fn check_acyclicity(&self, id: &EventId) -> Result<bool, RetrievalError> {
        let event = self.get(id)?;
        // the genesis root's reflexive self-loop is sanctioned; audit the rest
        let parents: Vec<EventId> = event.cause.iter().filter(|c| *c != id).cloned().collect();
        Ok(!self.closure_reaches(&parents, id))
    }

    /// Most recent event with an identical (base, model, actor) triple; the
    /// auto-chain rule threads each actor's per-subject edits into the DAG.
    fn chain_head(&self, base: &str, model: &str, actor: &str) -> Option<EventId> {
        let positions = self.by_base.get(base)?;
        positions
            .iter()
            .rev()
            .filter_map(|pos| self.log.at(*pos))
            .find(|ev| ev.model == model && ev.actor == actor)
            .map(|ev| ev.id.clone())
    }

    /// Whether the reflexive-transitive cause closure of `start` contains
    /// `target`. Bounded by the event count.
    fn closure_reaches(&self, start: &[EventId], target: &EventId) -> bool {
        let mut visited: HashSet<EventId> = HashSet::new();
        let mut stack: Vec<EventId> = start.to_vec();
        while let Some(id) = stack.pop() {
            if &id == target {
                return true;
            }
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(pos) = self.ids.get(&id).map(|p| *p) {
                if let Some(ev) = self.log.at(pos) {
                    // skip the genesis root's self-loop
                    stack.extend(ev.cause.iter().filter(|c| **c != ev.id).cloned());
                }
            }
        }
        false
    }
}

impl Default for EventStore {
    fn default() -> Self { Self::new() }
}
