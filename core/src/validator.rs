//! Restriction validation for a candidate event. All checks run and all
//! violations are returned together; nothing short-circuits.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use onticql::parse_expression;
use ontic_proto::{is_privileged_actor, is_structural_kind, EventDraft};

use crate::error::{Violation, ViolationCode};
use crate::eval::{evaluate, EvalContext};
use crate::model;
use crate::store::{EventStore, Filter};
use crate::value::{is_boolean_token, is_numeric_token, Value};

/// Validate a draft against the restrictions of its model's field definition.
///
/// Skipped entirely for privileged actors and structural kinds. When the
/// draft's model cannot be resolved the event passes (bulk loads may write
/// data ahead of its schema); when the model exists but does not define the
/// field, that alone is the violation.
pub fn validate_event(store: &EventStore, draft: &EventDraft) -> Result<(), Vec<Violation>> {
    if is_privileged_actor(&draft.actor) || is_structural_kind(&draft.kind) {
        return Ok(());
    }

    let Some(model_event) = model::model_event_by_name(store, &draft.model) else {
        return Ok(());
    };
    let fields = model::load_fields(store, &model_event.id);
    let Some(field) = fields.iter().find(|f| f.name == draft.kind) else {
        return Err(vec![Violation::semantic(
            ViolationCode::Semantic006,
            draft.kind.as_str(),
            format!("field {} is not defined by model {}", draft.kind, draft.model),
        )]);
    };

    let mut violations = Vec::new();
    let field_name = field.name.as_str();
    let value_present = !draft.value.trim().is_empty();

    if truthy(field.restriction("Required")) && !value_present {
        violations.push(Violation::value(ViolationCode::Value005, field_name, format!("{} is required", field_name)));
    }

    if let Some(data_type) = field.restriction("DataType") {
        if value_present && !value_fits_type(&draft.value, data_type) {
            violations.push(Violation::value(
                ViolationCode::Value001,
                field_name,
                format!("{} is not a valid {}", draft.value, data_type),
            ));
        }
    }

    if let Some(concept) = field.restriction("Range") {
        if value_present && !individual_of_concept_exists(store, concept, &draft.value) {
            violations.push(Violation::value(
                ViolationCode::Value001,
                field_name,
                format!("{} is not an individual of {}", draft.value, concept),
            ));
        }
    }

    if let Some(expr_text) = field.restriction("ValueCondition") {
        // parse/eval failures skip the check rather than block the write
        if let Ok(expr) = parse_expression(expr_text) {
            let state = model::individual_state(store, &draft.base, &fields);
            let input = Value::parse(&draft.value);
            let cx = EvalContext {
                state: &state,
                input_value: Some(&input),
                actor: Some(&draft.actor),
                individual: Some(&draft.base),
            };
            if let Ok(result) = evaluate(&expr, &cx) {
                if !result.is_truthy() {
                    violations.push(Violation::value(
                        ViolationCode::Value002,
                        field_name,
                        format!("value {} rejected by condition {}", draft.value, expr_text),
                    ));
                }
            }
        }
    }

    if truthy(field.restriction("Unique")) && value_present {
        if let Some(concept) = model::resolve_concept(store, &draft.base) {
            let proposed = Value::parse(&draft.value);
            let taken = model::individuals(store)
                .iter()
                .filter(|decl| decl.base == concept && decl.value != draft.base)
                .any(|decl| {
                    model::latest_value(store, &decl.value, field_name).map(|v| v.eq_value(&proposed)).unwrap_or(false)
                });
            if taken {
                violations.push(Violation::value(
                    ViolationCode::Value003,
                    field_name,
                    format!("{} {} is already used by another {}", field_name, draft.value, concept),
                ));
            }
        }
    }

    if truthy(field.restriction("UniqueIdentifier")) && value_present {
        let proposed = Value::parse(&draft.value);
        let taken = store
            .list(&Filter::default().kind(field_name))
            .iter()
            .any(|ev| ev.base != draft.base && Value::parse(&ev.value).eq_value(&proposed));
        if taken {
            violations.push(Violation::value(
                ViolationCode::Value003,
                field_name,
                format!("{} {} is already taken", field_name, draft.value),
            ));
        }
    }

    let existing = || !store.list(&Filter::default().base(draft.base.as_str()).kind(field_name)).is_empty();

    if let Some(multiple) = field.restriction("Multiple") {
        if !Value::parse(multiple).is_truthy() && existing() {
            violations.push(Violation::value(
                ViolationCode::Value004,
                field_name,
                format!("{} does not allow multiple values", field_name),
            ));
        }
    }

    if truthy(field.restriction("Immutable")) && existing() {
        violations.push(Violation::semantic(
            ViolationCode::Semantic005,
            field_name,
            format!("{} is immutable once set", field_name),
        ));
    }

    if let Some(whitelist) = field.restriction("Permission") {
        let allowed = whitelist.split(',').map(str::trim).any(|actor| actor == draft.actor);
        if !allowed && !has_admin_role(store, &draft.actor) {
            violations.push(Violation::semantic(
                ViolationCode::Semantic008,
                field_name,
                format!("actor {} may not write {}", draft.actor, field_name),
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn truthy(restriction: Option<&str>) -> bool { restriction.map(|v| Value::parse(v).is_truthy()).unwrap_or(false) }

fn value_fits_type(value: &str, data_type: &str) -> bool {
    let v = value.trim();
    match data_type {
        "Numeric" => is_numeric_token(v),
        "Boolean" => is_boolean_token(v),
        "DateTime" => is_datetime_token(v),
        // enum membership is declared via SetRange and checked elsewhere
        "EnumType" => true,
        _ => true,
    }
}

fn is_datetime_token(v: &str) -> bool {
    NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(v).is_ok()
}

fn individual_of_concept_exists(store: &EventStore, concept: &str, name: &str) -> bool {
    model::individuals(store).iter().any(|decl| decl.base == concept && decl.value == name)
}

fn has_admin_role(store: &EventStore, actor: &str) -> bool {
    store.list(&Filter::default().base(actor).kind("Role")).iter().any(|ev| ev.value == "admin")
}
