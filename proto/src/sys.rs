//! Shared vocabulary: well-known actor names and event kinds that the store,
//! validator and parsers all agree on.

/// Actor of the built-in genesis table and genesis-dialect loads.
pub const ACTOR_GENESIS: &str = "genesis";
/// Actor of bulk BSL loads and other machine writes.
pub const ACTOR_SYSTEM: &str = "system";
/// Actor of recalc-emitted derivations.
pub const ACTOR_ENGINE: &str = "engine";

/// Kinds that declare structure rather than carry field values. Events of
/// these kinds bypass restriction validation.
pub const STRUCTURAL_KINDS: &[&str] = &["Instance", "Model", "Individual", "SetModel", "Attribute", "Relation", "Role"];

/// Kinds that mark a compensating delete of the base individual.
pub const DELETE_KINDS: &[&str] = &["delete", "deleted", "Delete"];

/// True when appends by this actor skip the auto-chain rule and validation.
pub fn is_privileged_actor(actor: &str) -> bool { actor == ACTOR_SYSTEM || actor == ACTOR_GENESIS }

pub fn is_structural_kind(kind: &str) -> bool { STRUCTURAL_KINDS.contains(&kind) }

pub fn is_delete_kind(kind: &str) -> bool { DELETE_KINDS.contains(&kind) }
