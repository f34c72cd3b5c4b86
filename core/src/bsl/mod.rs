//! BSL: the textual input language. Two dialects share the `Base: Type:
//! Value` backbone: the generic dialect nests with leading colons and infers
//! ids, types and causes; the genesis dialect carries explicit `[ID]` ids and
//! `{key=value}` metadata. Both parsers are pure: they produce drafts and
//! never touch the store. Lines that fail to parse are dropped with a
//! diagnostic; a bad line never aborts the file.

pub mod generic;
pub mod genesis;

pub use generic::GenericParser;
