use ontic_proto::EventId;
use serde::Serialize;
use thiserror::Error;

/// Fatal append-time failures. Never retried.
#[derive(Error, Debug, PartialEq)]
pub enum StructuralError {
    #[error("cycle detected: cause closure of {0} reaches itself")]
    CycleDetected(EventId),
    #[error("duplicate id {0}")]
    DuplicateId(EventId),
    #[error("malformed event: {0}")]
    MalformedEvent(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum RetrievalError {
    #[error("event {0} not found")]
    NotFound(EventId),
}

/// Failures resolving an individual to its model. Surfaced to the caller of
/// recalc; expression errors are absorbed below this level.
#[derive(Error, Debug, PartialEq)]
pub enum RecalcError {
    #[error("unknown individual {0}")]
    UnknownIndividual(String),
    #[error("model {0} not found")]
    ModelNotFound(String),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Expression evaluation failures. Callers decide whether these mean
/// "condition false" (recalc) or "skip check" (validator).
#[derive(Error, Debug)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] onticql::ParseError),
    #[error("not comparable: {0}")]
    NotComparable(String),
    #[error("not numeric: {0}")]
    NotNumeric(String),
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    #[serde(rename = "value")]
    Value,
    #[serde(rename = "semantic")]
    Semantic,
}

/// The fixed wire-visible code set. The codes are part of the external
/// contract; new checks must reuse or extend this list deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationCode {
    #[serde(rename = "VALUE_001")]
    Value001,
    #[serde(rename = "VALUE_002")]
    Value002,
    #[serde(rename = "VALUE_003")]
    Value003,
    #[serde(rename = "VALUE_004")]
    Value004,
    #[serde(rename = "VALUE_005")]
    Value005,
    #[serde(rename = "SEMANTIC_005")]
    Semantic005,
    #[serde(rename = "SEMANTIC_006")]
    Semantic006,
    #[serde(rename = "SEMANTIC_008")]
    Semantic008,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::Value001 => "VALUE_001",
            ViolationCode::Value002 => "VALUE_002",
            ViolationCode::Value003 => "VALUE_003",
            ViolationCode::Value004 => "VALUE_004",
            ViolationCode::Value005 => "VALUE_005",
            ViolationCode::Semantic005 => "SEMANTIC_005",
            ViolationCode::Semantic006 => "SEMANTIC_006",
            ViolationCode::Semantic008 => "SEMANTIC_008",
        }
    }
}

impl std::fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.as_str()) }
}

/// One accumulated restriction violation. The validator returns the complete
/// list so callers can show every problem at once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub code: ViolationCode,
    pub message: String,
    pub field: String,
}

impl Violation {
    pub fn value(code: ViolationCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: ViolationKind::Value, code, message: message.into(), field: field.into() }
    }

    pub fn semantic(code: ViolationCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: ViolationKind::Semantic, code, message: message.into(), field: field.into() }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.code, self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_wire_shape() {
        let v = Violation::value(ViolationCode::Value003, "email", "email must be unique");
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"type":"value","code":"VALUE_003","message":"email must be unique","field":"email"}"#);
    }
}
