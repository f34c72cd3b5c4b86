use append_only_vec::AppendOnlyVec;
use ontic_proto::Event;

use super::EventLog;

/// The shipped backend: events live in an append-only vector, so readers can
/// hold references into a stable prefix while the single writer appends.
pub struct MemoryLog {
    events: AppendOnlyVec<Event>,
}

impl MemoryLog {
    pub fn new() -> Self { Self { events: AppendOnlyVec::new() } }
}

impl Default for MemoryLog {
    fn default() -> Self { Self::new() }
}

impl EventLog for MemoryLog {
    fn push(&self, event: Event) -> usize { self.events.push(event) }

    fn len(&self) -> usize { self.events.len() }

    fn at(&self, index: usize) -> Option<&Event> {
        if index < self.events.len() {
            Some(&self.events[index])
        } else {
            None
        }
    }
}
