pub mod bsl;
pub mod dataflow;
pub mod error;
pub mod eval;
pub mod genesis;
pub mod model;
pub mod query;
pub mod recalc;
pub mod storage;
pub mod store;
pub mod validator;
pub mod value;

pub use ontic_proto as proto;

pub use dataflow::{BasicDriver, Dataflow, Guard, GuardKind};
pub use error::{RecalcError, RetrievalError, StructuralError, Violation, ViolationCode};
pub use genesis::GenesisConfig;
pub use store::{EventStore, Filter, StoreStats};
pub use value::Value;
