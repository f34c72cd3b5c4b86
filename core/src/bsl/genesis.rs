//! The genesis BSL dialect: one event per line with an explicit id and
//! optional metadata.
//!
//! ```text
//! [Event] Event: Event: Event {cause=Event, model=Event}
//! [Concept] Concept: Instance: Concept {cause=Event, model=Concept}
//! ```
//!
//! `cause` is a comma-separated id list; absent, it defaults to the line's
//! own id (the self-reference only the root event legitimately uses).

use tracing::warn;

use ontic_proto::{Cause, EventDraft, EventId, ACTOR_GENESIS};

pub fn parse(input: &str) -> Vec<EventDraft> {
    let mut drafts = Vec::new();
    for (line_no, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Some(draft) => drafts.push(draft),
            None => warn!(line = line_no + 1, "dropping genesis BSL line: expected `[ID] Base: Type: Value {{meta}}`"),
        }
    }
    drafts
}

fn parse_line(line: &str) -> Option<EventDraft> {
    let rest = line.strip_prefix('[')?;
    let (id, mut remainder) = rest.split_once(']')?;
    let id = id.trim();
    if id.is_empty() {
        return None;
    }

    let mut meta = None;
    let trimmed = remainder.trim_end();
    if trimmed.ends_with('}') {
        let brace = trimmed.rfind('{')?;
        meta = Some(&trimmed[brace + 1..trimmed.len() - 1]);
        remainder = &trimmed[..brace];
    }

    let parts: Vec<&str> = remainder.splitn(3, ':').map(str::trim).collect();
    let (base, kind, value) = match parts[..] {
        [base, kind, value] => (base, kind, value),
        _ => return None,
    };
    if base.is_empty() || kind.is_empty() {
        return None;
    }

    let (cause, model) = meta.map(parse_meta).unwrap_or((None, None));
    let cause = match cause {
        Some(ids) => Cause::new(ids.into_iter().map(EventId::from).collect::<Vec<_>>()),
        None => Cause::single(id),
    };

    let mut draft = EventDraft::new(base, kind, value).with_id(id).with_actor(ACTOR_GENESIS).with_cause(cause);
    if let Some(model) = model {
        draft = draft.with_model(model);
    }
    Some(draft)
}

/// `{cause=a,b, model=M}`: a bare token continues the preceding key's list.
fn parse_meta(meta: &str) -> (Option<Vec<String>>, Option<String>) {
    #[derive(PartialEq)]
    enum Key {
        CauseKey,
        Other,
    }

    let mut cause: Option<Vec<String>> = None;
    let mut model: Option<String> = None;
    let mut last = Key::Other;

    for token in meta.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.split_once('=') {
            Some((key, value)) => match key.trim() {
                "cause" => {
                    cause = Some(vec![value.trim().to_string()]);
                    last = Key::CauseKey;
                }
                "model" => {
                    model = Some(value.trim().to_string());
                    last = Key::Other;
                }
                _ => last = Key::Other,
            },
            None => {
                if last == Key::CauseKey {
                    if let Some(list) = cause.as_mut() {
                        list.push(token.to_string());
                    }
                }
            }
        }
    }
    (cause, model)
}
