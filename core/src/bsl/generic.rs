//! The generic BSL dialect. Nesting by leading colons:
//!
//! ```text
//! Person: Model: Model Person
//! : Attribute: name
//! :: Required: 1
//! ```
//!
//! Root lines with two parts infer their type from the value; nested lines
//! inherit their base from the enclosing parent and their cause from the
//! parent's event.

use std::collections::HashMap;

use tracing::warn;

use ontic_proto::{Cause, EventDraft, EventId};

struct ParentFrame {
    id: EventId,
    base: String,
    kind: String,
    value: String,
}

impl ParentFrame {
    /// The subject a child line talks about: a Model/SetModel line models its
    /// base, anything else (Attribute, Individual, …) declares its value.
    fn child_base(&self) -> &str {
        if self.kind == "Model" || self.kind == "SetModel" {
            &self.base
        } else {
            &self.value
        }
    }
}

pub struct GenericParser {
    actor: String,
    session: Option<String>,
    id_prefix: Option<String>,
}

impl GenericParser {
    pub fn new(actor: impl Into<String>) -> Self { Self { actor: actor.into(), session: None, id_prefix: None } }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Allocate `<prefix>_<md5_8>` ids instead of random ones, so re-running
    /// the same load produces an identical event set.
    pub fn with_deterministic_ids(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    pub fn parse(&self, input: &str) -> Vec<EventDraft> {
        let mut drafts: Vec<EventDraft> = Vec::new();
        let mut parents: Vec<ParentFrame> = Vec::new();
        // batch-local projections used for cause and model inference
        let mut concept_instances: HashMap<String, EventId> = HashMap::new();
        let mut individuals: HashMap<String, EventId> = HashMap::new();
        let mut individual_concepts: HashMap<String, String> = HashMap::new();
        let mut set_models: HashMap<String, (String, EventId)> = HashMap::new();

        for (line_no, raw) in input.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let depth = line.chars().take_while(|c| *c == ':').count();
            let rest = &line[depth..];

            let (base, kind, value) = if depth == 0 {
                let parts: Vec<&str> = rest.splitn(3, ':').map(str::trim).collect();
                match parts[..] {
                    [base, kind, value] => (base.to_string(), kind.to_string(), value.to_string()),
                    [base, value] => (base.to_string(), infer_kind(value).to_string(), value.to_string()),
                    _ => {
                        warn!(line = line_no + 1, "dropping BSL line: expected `Base: Value` or `Base: Type: Value`");
                        continue;
                    }
                }
            } else {
                let Some(parent) = parents.get(depth - 1) else {
                    warn!(line = line_no + 1, depth, "dropping BSL line: no parent at enclosing level");
                    continue;
                };
                // two parts only: restriction values may themselves contain colons
                let Some((kind, value)) = rest.split_once(':') else {
                    warn!(line = line_no + 1, "dropping BSL line: expected `Type: Value`");
                    continue;
                };
                (parent.child_base().to_string(), kind.trim().to_string(), value.trim().to_string())
            };

            if base.is_empty() || kind.is_empty() {
                warn!(line = line_no + 1, "dropping BSL line: empty base or type");
                continue;
            }

            let id = match &self.id_prefix {
                Some(prefix) => EventId::bulk(prefix, &base, &kind, &value, drafts.len()),
                None => EventId::generate(),
            };

            let cause = if depth > 0 {
                Cause::single(parents[depth - 1].id.clone())
            } else {
                self.infer_root_cause(&kind, &base, &concept_instances, &individuals, &set_models)
            };

            let model = match kind.as_str() {
                "Instance" | "Model" | "Individual" | "SetModel" | "Attribute" | "Relation" | "Role" => String::new(),
                _ => set_models
                    .get(&base)
                    .map(|(model, _)| model.clone())
                    .or_else(|| individual_concepts.get(&base).map(|concept| format!("Model {}", concept)))
                    .unwrap_or_default(),
            };

            let mut draft =
                EventDraft::new(base.clone(), kind.clone(), value.clone()).with_id(id.clone()).with_actor(self.actor.as_str()).with_cause(cause);
            if !model.is_empty() {
                draft = draft.with_model(model);
            }
            if let Some(session) = &self.session {
                draft = draft.with_session(session.clone());
            }

            if kind == "Instance" && base == "Concept" {
                concept_instances.insert(value.clone(), id.clone());
            }
            if kind == "Individual" {
                individuals.insert(value.clone(), id.clone());
                individual_concepts.insert(value.clone(), base.clone());
            }
            if kind == "SetModel" {
                set_models.insert(base.clone(), (value.clone(), id.clone()));
            }

            parents.truncate(depth);
            parents.push(ParentFrame { id, base, kind, value });
            drafts.push(draft);
        }
        drafts
    }

    fn infer_root_cause(
        &self,
        kind: &str,
        base: &str,
        concept_instances: &HashMap<String, EventId>,
        individuals: &HashMap<String, EventId>,
        set_models: &HashMap<String, (String, EventId)>,
    ) -> Cause {
        match kind {
            "Individual" => concept_instances
                .get(base)
                .cloned()
                .map(Cause::from)
                // the Concept concept itself is a well-known genesis id
                .unwrap_or_else(|| Cause::single("Concept")),
            "Instance" => match concept_instances.get(base) {
                Some(id) => Cause::single(id.clone()),
                None if base == "Concept" => Cause::single("Concept"),
                None => Cause::default(),
            },
            "Model" => concept_instances.get(base).cloned().map(Cause::from).unwrap_or_default(),
            "SetModel" => individuals.get(base).cloned().map(Cause::from).unwrap_or_default(),
            _ => set_models
                .get(base)
                .map(|(_, id)| Cause::single(id.clone()))
                .or_else(|| individuals.get(base).map(|id| Cause::single(id.clone())))
                .unwrap_or_default(),
        }
    }
}

fn infer_kind(value: &str) -> &'static str {
    if value.starts_with("Model ") {
        "Model"
    } else if value.chars().next().map(|c| c.is_lowercase() || c == '_').unwrap_or(false) {
        "Individual"
    } else {
        "Instance"
    }
}
