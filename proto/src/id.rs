use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of a single event.
///
/// Three families share this one string-typed namespace: generated ids (ULID
/// strings, 26 chars), genesis ids (fixed words such as `Event` or `Concept`),
/// and bulk-load ids (`<prefix>_<md5_8>`). They cannot collide: ULIDs are
/// always 26 Crockford-base32 chars, genesis ids are short words, and bulk ids
/// carry an underscore-joined prefix.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Allocate a fresh id for a user-appended event.
    pub fn generate() -> Self { EventId(Ulid::new().to_string()) }

    /// Deterministic id for bulk-loaded events: `<prefix>_<md5_8(base:type:value:index)>`.
    /// Re-running the same load produces identical ids.
    pub fn bulk(prefix: &str, base: &str, kind: &str, value: &str, index: usize) -> Self {
        let digest = md5::compute(format!("{}:{}:{}:{}", base, kind, value, index));
        let hex = format!("{:x}", digest);
        EventId(format!("{}_{}", prefix, &hex[..8]))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn into_string(self) -> String { self.0 }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self { EventId(s.to_string()) }
}

impl From<String> for EventId {
    fn from(s: String) -> Self { EventId(s) }
}

impl From<EventId> for String {
    fn from(id: EventId) -> String { id.0 }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str { &self.0 }
}

impl PartialEq<str> for EventId {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

impl PartialEq<&str> for EventId {
    fn eq(&self, other: &&str) -> bool { self.0 == *other }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
