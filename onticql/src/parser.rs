use crate::ast;
use crate::error::ParseError;
use crate::grammar::{OnticqlParser, Rule};
use pest::iterators::Pair;
use pest::Parser;

/// Parse a restriction expression (`Default`, `SetValue`, `Condition`,
/// `ValueCondition` bodies) into its AST.
pub fn parse_expression(input: &str) -> Result<ast::Expr, ParseError> {
    let mut pairs = OnticqlParser::parse(Rule::Expression, input).map_err(|e| ParseError::SyntaxError(e.to_string()))?;
    let expression = pairs.next().ok_or(ParseError::EmptyExpression)?;
    let ternary = expression.into_inner().next().ok_or(ParseError::EmptyExpression)?;
    parse_ternary(ternary)
}

/// Parse a `$(cond, …)` graph query with its accessor chain.
pub fn parse_query(input: &str) -> Result<ast::Query, ParseError> {
    let mut pairs = OnticqlParser::parse(Rule::QueryExpr, input).map_err(|e| ParseError::SyntaxError(e.to_string()))?;
    let query = pairs.next().ok_or(ParseError::EmptyExpression)?;

    let mut conditions = Vec::new();
    let mut accessors = Vec::new();
    for pair in query.into_inner() {
        match pair.as_rule() {
            Rule::Selection => {
                for cond in pair.into_inner() {
                    conditions.push(parse_cond(cond)?);
                }
            }
            Rule::Accessor => accessors.push(parse_accessor(pair)?),
            Rule::EOI => {}
            other => return Err(ParseError::UnexpectedRule { expected: "Selection or Accessor", got: other }),
        }
    }
    if conditions.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    Ok(ast::Query { conditions, accessors })
}

fn parse_ternary(pair: Pair<Rule>) -> Result<ast::Expr, ParseError> {
    let mut inner = pair.into_inner();
    let condition = parse_disjunction(inner.next().ok_or(ParseError::MissingOperand("condition"))?)?;
    match (inner.next(), inner.next()) {
        (Some(then_branch), Some(else_branch)) => Ok(ast::Expr::Ternary {
            condition: Box::new(condition),
            then_branch: Box::new(parse_ternary(then_branch)?),
            else_branch: Box::new(parse_ternary(else_branch)?),
        }),
        _ => Ok(condition),
    }
}

fn parse_disjunction(pair: Pair<Rule>) -> Result<ast::Expr, ParseError> {
    let mut inner = pair.into_inner();
    let mut expr = parse_conjunction(inner.next().ok_or(ParseError::MissingOperand("left"))?)?;
    for next in inner {
        expr = ast::Expr::Or(Box::new(expr), Box::new(parse_conjunction(next)?));
    }
    Ok(expr)
}

fn parse_conjunction(pair: Pair<Rule>) -> Result<ast::Expr, ParseError> {
    let mut inner = pair.into_inner();
    let mut expr = parse_comparison(inner.next().ok_or(ParseError::MissingOperand("left"))?)?;
    for next in inner {
        expr = ast::Expr::And(Box::new(expr), Box::new(parse_comparison(next)?));
    }
    Ok(expr)
}

fn parse_comparison(pair: Pair<Rule>) -> Result<ast::Expr, ParseError> {
    let mut inner = pair.into_inner();
    let left = parse_additive(inner.next().ok_or(ParseError::MissingOperand("left"))?)?;
    let Some(op) = inner.next() else {
        return Ok(left);
    };
    let operator = match op.as_str() {
        // both strict forms alias to value equality
        "==" | "===" => ast::ComparisonOperator::Equal,
        "!=" | "!==" => ast::ComparisonOperator::NotEqual,
        ">=" => ast::ComparisonOperator::GreaterThanOrEqual,
        "<=" => ast::ComparisonOperator::LessThanOrEqual,
        ">" => ast::ComparisonOperator::GreaterThan,
        "<" => ast::ComparisonOperator::LessThan,
        other => return Err(ParseError::InvalidLiteral(other.to_string())),
    };
    let right = parse_additive(inner.next().ok_or(ParseError::MissingOperand("right"))?)?;
    Ok(ast::Expr::Compare { left: Box::new(left), operator, right: Box::new(right) })
}

fn parse_additive(pair: Pair<Rule>) -> Result<ast::Expr, ParseError> {
    let mut inner = pair.into_inner();
    let mut expr = parse_multiplicative(inner.next().ok_or(ParseError::MissingOperand("left"))?)?;
    while let Some(op) = inner.next() {
        let operator = match op.as_str() {
            "+" => ast::InfixOperator::Add,
            "-" => ast::InfixOperator::Subtract,
            other => return Err(ParseError::InvalidLiteral(other.to_string())),
        };
        let right = parse_multiplicative(inner.next().ok_or(ParseError::MissingOperand("right"))?)?;
        expr = ast::Expr::Infix { left: Box::new(expr), operator, right: Box::new(right) };
    }
    Ok(expr)
}

fn parse_multiplicative(pair: Pair<Rule>) -> Result<ast::Expr, ParseError> {
    let mut inner = pair.into_inner();
    let mut expr = parse_unary(inner.next().ok_or(ParseError::MissingOperand("left"))?)?;
    while let Some(op) = inner.next() {
        let operator = match op.as_str() {
            "*" => ast::InfixOperator::Multiply,
            "/" => ast::InfixOperator::Divide,
            other => return Err(ParseError::InvalidLiteral(other.to_string())),
        };
        let right = parse_unary(inner.next().ok_or(ParseError::MissingOperand("right"))?)?;
        expr = ast::Expr::Infix { left: Box::new(expr), operator, right: Box::new(right) };
    }
    Ok(expr)
}

fn parse_unary(pair: Pair<Rule>) -> Result<ast::Expr, ParseError> {
    let mut not_count = 0usize;
    let mut primary = None;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::Bang => not_count += 1,
            Rule::Primary => primary = Some(p),
            other => return Err(ParseError::UnexpectedRule { expected: "Bang or Primary", got: other }),
        }
    }
    let mut expr = parse_primary(primary.ok_or(ParseError::MissingOperand("operand"))?)?;
    for _ in 0..not_count {
        expr = ast::Expr::Not(Box::new(expr));
    }
    Ok(expr)
}

fn parse_primary(pair: Pair<Rule>) -> Result<ast::Expr, ParseError> {
    let inner = pair.into_inner().next().ok_or(ParseError::MissingOperand("primary"))?;
    match inner.as_rule() {
        Rule::IsNaN => {
            let arg = inner.into_inner().next().ok_or(ParseError::MissingOperand("isNaN argument"))?;
            Ok(ast::Expr::IsNan(Box::new(parse_ternary(arg)?)))
        }
        Rule::Paren => {
            let arg = inner.into_inner().next().ok_or(ParseError::EmptyExpression)?;
            parse_ternary(arg)
        }
        Rule::FieldRef => {
            let ident = inner.into_inner().next().ok_or(ParseError::MissingOperand("field name"))?;
            Ok(ast::Expr::Field(ident.as_str().to_string()))
        }
        Rule::InputRef => Ok(ast::Expr::InputValue),
        Rule::ActorRef => Ok(ast::Expr::CurrentActor),
        Rule::IndividualRef => Ok(ast::Expr::CurrentIndividual),
        Rule::Boolean => Ok(ast::Expr::Literal(ast::Literal::Boolean(inner.as_str() == "true"))),
        Rule::Null => Ok(ast::Expr::Literal(ast::Literal::Null)),
        Rule::Float => {
            let f = inner.as_str().parse::<f64>().map_err(|_| ParseError::InvalidLiteral(inner.as_str().to_string()))?;
            Ok(ast::Expr::Literal(ast::Literal::Float(f)))
        }
        Rule::Integer => {
            let i = inner.as_str().parse::<i64>().map_err(|_| ParseError::InvalidLiteral(inner.as_str().to_string()))?;
            Ok(ast::Expr::Literal(ast::Literal::Integer(i)))
        }
        Rule::StringLit => {
            let content = inner.into_inner().next().map(|p| p.as_str().to_string()).unwrap_or_default();
            Ok(ast::Expr::Literal(ast::Literal::String(content)))
        }
        other => Err(ParseError::UnexpectedRule { expected: "a primary expression", got: other }),
    }
}

fn parse_cond(pair: Pair<Rule>) -> Result<ast::Condition, ParseError> {
    let inner = pair.into_inner().next().ok_or(ParseError::MissingOperand("condition"))?;
    match inner.as_rule() {
        Rule::OrCond => {
            let conds = inner.into_inner().map(parse_cond).collect::<Result<Vec<_>, _>>()?;
            Ok(ast::Condition::Or(conds))
        }
        Rule::MatchCond => {
            let mut it = inner.into_inner();
            let op = it.next().ok_or(ParseError::MissingOperand("operator"))?;
            let key = it.next().ok_or(ParseError::MissingOperand("key"))?;
            let arg = it.next().ok_or(ParseError::MissingOperand("argument"))?;

            let operator = match op.as_str() {
                "$EQ" => ast::MatchOperator::Eq,
                "$NE" => ast::MatchOperator::Ne,
                "$GT" => ast::MatchOperator::Gt,
                "$LT" => ast::MatchOperator::Lt,
                "$GE" => ast::MatchOperator::Ge,
                "$LE" => ast::MatchOperator::Le,
                other => return Err(ParseError::InvalidCondition(other.to_string())),
            };
            let value = parse_cond_arg(arg)?;

            let key_inner = key.into_inner().next().ok_or(ParseError::MissingOperand("key"))?;
            match key_inner.as_rule() {
                Rule::MetaKey => {
                    if operator != ast::MatchOperator::Eq {
                        return Err(ParseError::InvalidCondition(format!("{} supports $EQ only", key_inner.as_str())));
                    }
                    let key = match key_inner.as_str() {
                        "$Base" => ast::MetaKey::Base,
                        "$Model" => ast::MetaKey::Model,
                        "$Actor" => ast::MetaKey::Actor,
                        other => return Err(ParseError::InvalidCondition(other.to_string())),
                    };
                    Ok(ast::Condition::Meta { key, value: literal_text(value) })
                }
                Rule::Ident => Ok(ast::Condition::Field { operator, name: key_inner.as_str().to_string(), value }),
                other => Err(ParseError::UnexpectedRule { expected: "MetaKey or Ident", got: other }),
            }
        }
        other => Err(ParseError::UnexpectedRule { expected: "OrCond or MatchCond", got: other }),
    }
}

fn parse_cond_arg(pair: Pair<Rule>) -> Result<ast::Literal, ParseError> {
    let inner = pair.into_inner().next().ok_or(ParseError::MissingOperand("argument"))?;
    match inner.as_rule() {
        Rule::StringLit => {
            let content = inner.into_inner().next().map(|p| p.as_str().to_string()).unwrap_or_default();
            Ok(ast::Literal::String(content))
        }
        Rule::Float => {
            let f = inner.as_str().parse::<f64>().map_err(|_| ParseError::InvalidLiteral(inner.as_str().to_string()))?;
            Ok(ast::Literal::Float(f))
        }
        Rule::Integer => {
            let i = inner.as_str().parse::<i64>().map_err(|_| ParseError::InvalidLiteral(inner.as_str().to_string()))?;
            Ok(ast::Literal::Integer(i))
        }
        other => Err(ParseError::UnexpectedRule { expected: "a literal argument", got: other }),
    }
}

fn literal_text(lit: ast::Literal) -> String {
    match lit {
        ast::Literal::String(s) => s,
        ast::Literal::Integer(i) => i.to_string(),
        ast::Literal::Float(f) => f.to_string(),
        ast::Literal::Boolean(b) => b.to_string(),
        ast::Literal::Null => String::new(),
    }
}

fn parse_accessor(pair: Pair<Rule>) -> Result<ast::Accessor, ParseError> {
    let inner = pair.into_inner().next().ok_or(ParseError::MissingOperand("accessor"))?;
    match inner.as_rule() {
        Rule::IndexAccessor => {
            let n = inner.into_inner().next().ok_or(ParseError::MissingOperand("index"))?;
            let i = n.as_str().parse::<i64>().map_err(|_| ParseError::InvalidLiteral(n.as_str().to_string()))?;
            Ok(ast::Accessor::Index(i))
        }
        Rule::PropAccessor => {
            let ident = inner.into_inner().next().ok_or(ParseError::MissingOperand("property"))?;
            Ok(ast::Accessor::Property(ident.as_str().to_string()))
        }
        other => Err(ParseError::UnexpectedRule { expected: "IndexAccessor or PropAccessor", got: other }),
    }
}
