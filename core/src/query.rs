//! Graph-query evaluation: `$(cond, …)` selects individuals, the accessor
//! chain narrows the selection to an element or dereferences to latest
//! property values. Deleted individuals never appear in results.

use onticql::ast::{Accessor, Condition, Literal, MatchOperator, MetaKey, Query};
use ontic_proto::Event;

use crate::model;
use crate::store::{EventStore, Filter};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// The bare selection: individual names in declaration order.
    Individuals(Vec<String>),
    /// After an index accessor.
    Individual(Option<String>),
    /// After a property accessor over a multi-selection.
    Values(Vec<Value>),
    /// Fully narrowed to one value.
    Value(Value),
}

pub fn run_query(store: &EventStore, query: &Query) -> QueryOutput {
    let mut names = Vec::new();
    for declaring in model::individuals(store) {
        let name = declaring.value.clone();
        if model::is_deleted(store, &name) {
            continue;
        }
        if query.conditions.iter().all(|cond| condition_matches(store, &name, &declaring, cond)) {
            names.push(name);
        }
    }

    let mut out = QueryOutput::Individuals(names);
    for accessor in &query.accessors {
        out = apply_accessor(store, out, accessor);
    }
    out
}

/// Parse-and-run convenience for callers holding query text.
pub fn query_str(store: &EventStore, input: &str) -> Result<QueryOutput, onticql::ParseError> {
    Ok(run_query(store, &onticql::parse_query(input)?))
}

fn condition_matches(store: &EventStore, name: &str, declaring: &Event, cond: &Condition) -> bool {
    match cond {
        Condition::Or(conds) => conds.iter().any(|c| condition_matches(store, name, declaring, c)),
        Condition::Meta { key, value } => {
            // the individual's event set: everything about it plus its declaration
            match key {
                MetaKey::Base => name == value.as_str() || declaring.base == *value,
                MetaKey::Model => {
                    declaring.model == *value || store.list(&Filter::default().base(name)).iter().any(|ev| ev.model == *value)
                }
                MetaKey::Actor => {
                    declaring.actor == *value || store.list(&Filter::default().base(name)).iter().any(|ev| ev.actor == *value)
                }
            }
        }
        Condition::Field { operator, name: field, value } => {
            let Some(current) = model::latest_value(store, name, field) else {
                return false;
            };
            let target = literal_value(value);
            match operator {
                MatchOperator::Eq => current.eq_value(&target),
                MatchOperator::Ne => !current.eq_value(&target),
                _ => match current.compare(&target) {
                    Some(ordering) => match operator {
                        MatchOperator::Gt => ordering.is_gt(),
                        MatchOperator::Ge => ordering.is_ge(),
                        MatchOperator::Lt => ordering.is_lt(),
                        MatchOperator::Le => ordering.is_le(),
                        MatchOperator::Eq | MatchOperator::Ne => unreachable!(),
                    },
                    None => false,
                },
            }
        }
    }
}

fn apply_accessor(store: &EventStore, out: QueryOutput, accessor: &Accessor) -> QueryOutput {
    match (out, accessor) {
        (QueryOutput::Individuals(names), Accessor::Index(i)) => QueryOutput::Individual(pick(names, *i)),
        (QueryOutput::Individuals(names), Accessor::Property(prop)) => QueryOutput::Values(
            names.iter().map(|name| model::latest_value(store, name, prop).unwrap_or(Value::Null)).collect(),
        ),
        (QueryOutput::Individual(name), Accessor::Property(prop)) => {
            QueryOutput::Value(name.and_then(|n| model::latest_value(store, &n, prop)).unwrap_or(Value::Null))
        }
        (QueryOutput::Individual(name), Accessor::Index(i)) => {
            QueryOutput::Individual(pick(name.into_iter().collect(), *i))
        }
        (QueryOutput::Values(values), Accessor::Index(i)) => QueryOutput::Value(pick(values, *i).unwrap_or(Value::Null)),
        // a plain value cannot be narrowed further
        (QueryOutput::Values(values), Accessor::Property(_)) => QueryOutput::Values(values),
        (QueryOutput::Value(v), _) => QueryOutput::Value(v),
    }
}

fn pick<T>(items: Vec<T>, index: i64) -> Option<T> {
    let len = items.len() as i64;
    let idx = if index < 0 { len + index } else { index };
    if (0..len).contains(&idx) {
        items.into_iter().nth(idx as usize)
    } else {
        None
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Integer(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Boolean(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}
