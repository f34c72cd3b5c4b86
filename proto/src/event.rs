use serde::{Deserialize, Deserializer, Serialize};

use crate::id::EventId;

/// Ordered list of parent event ids forming the cause DAG.
///
/// Order is significant (it records the author's intent plus the auto-chain
/// tail), so unlike a version vector this is never sorted or deduplicated
/// beyond the push-time containment check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cause(Vec<EventId>);

impl Cause {
    pub fn new(ids: impl Into<Vec<EventId>>) -> Self { Self(ids.into()) }

    pub fn single(id: impl Into<EventId>) -> Self { Self(vec![id.into()]) }

    pub fn as_slice(&self) -> &[EventId] { &self.0 }

    pub fn contains(&self, id: &EventId) -> bool { self.0.iter().any(|c| c == id) }

    /// Append an id unless it is already present.
    pub fn push(&mut self, id: EventId) {
        if !self.contains(&id) {
            self.0.push(id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventId> { self.0.iter() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn to_strings(&self) -> Vec<String> { self.0.iter().map(|id| id.as_str().to_string()).collect() }
}

impl From<Vec<EventId>> for Cause {
    fn from(ids: Vec<EventId>) -> Self { Self(ids) }
}

impl From<EventId> for Cause {
    fn from(id: EventId) -> Self { Self(vec![id]) }
}

impl<'a> IntoIterator for &'a Cause {
    type Item = &'a EventId;
    type IntoIter = std::slice::Iter<'a, EventId>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

/// Wire inputs are lenient: `null`, a bare string, or an array of strings all
/// normalize to a list. A blank string normalizes to the empty list.
impl<'de> Deserialize<'de> for Cause {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Many(Vec<String>),
            One(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => Cause::default(),
            Some(Raw::One(s)) if s.trim().is_empty() => Cause::default(),
            Some(Raw::One(s)) => Cause::single(s.trim()),
            Some(Raw::Many(ids)) => Cause(ids.into_iter().map(EventId::from).collect()),
        })
    }
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.to_strings().join(","))
    }
}

/// The single universal record. Ontology, schema, data and derivations are
/// all statements of this one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// Subject the event is about.
    pub base: String,
    /// Kind of statement. Serialized as `type` on the wire.
    #[serde(rename = "type")]
    pub kind: String,
    /// Statement payload; numbers and booleans are carried in string form.
    pub value: String,
    pub actor: String,
    /// ISO-8601 with millisecond precision; lexicographic order is temporal order.
    pub date: String,
    pub cause: Cause,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl Event {
    pub fn to_json(&self) -> Result<String, serde_json::Error> { serde_json::to_string(self) }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> { serde_json::from_str(json) }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event({} {}:{}={} by {} at {})", self.id, self.base, self.kind, self.value, self.actor, self.date)
    }
}

/// A partial record accepted by `append` and produced by the parsers.
/// Missing id/date are allocated at append time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub base: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub cause: Cause,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl EventDraft {
    pub fn new(base: impl Into<String>, kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self { base: base.into(), kind: kind.into(), value: value.into(), ..Default::default() }
    }

    pub fn with_id(mut self, id: impl Into<EventId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = cause.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }
}

impl From<Event> for EventDraft {
    fn from(ev: Event) -> Self {
        Self {
            id: Some(ev.id),
            base: ev.base,
            kind: ev.kind,
            value: ev.value,
            actor: ev.actor,
            date: Some(ev.date),
            cause: ev.cause,
            model: ev.model,
            session: ev.session,
        }
    }
}
