use serde_json::{Map, Value};

use crate::error::{ChromaError, Result};

/// Comparison operators accepted in metadata filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhereOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
}

impl WhereOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhereOperator::Eq => "$eq",
            WhereOperator::Ne => "$ne",
            WhereOperator::Gt => "$gt",
            WhereOperator::Gte => "$gte",
            WhereOperator::Lt => "$lt",
            WhereOperator::Lte => "$lte",
            WhereOperator::In => "$in",
            WhereOperator::Nin => "$nin",
        }
    }

    /// `$in` / `$nin` take a list, everything else a scalar.
    pub fn takes_list(&self) -> bool {
        matches!(self, WhereOperator::In | WhereOperator::Nin)
    }
}

/// Metadata filter expression, serialized to Chroma's `where` document.
///
/// Variants are public so trees can be pattern-matched; prefer the
/// constructors, which validate value arity up front. Serialization
/// validates again either way.
#[derive(Clone, Debug, PartialEq)]
pub enum Where {
    Comparison {
        field: String,
        operator: WhereOperator,
        value: Value,
    },
    And(Vec<Where>),
    Or(Vec<Where>),
}

impl Where {
    /// Build a single comparison.
    ///
    /// A scalar given to `$in`/`$nin` is wrapped into a one-element list; a
    /// list given to a scalar operator is rejected.
    pub fn new(field: impl Into<String>, operator: WhereOperator, value: impl Into<Value>) -> Result<Self> {
        let field = field.into();
        let mut value = value.into();
        if operator.takes_list() && !value.is_array() {
            value = Value::Array(vec![value]);
        }
        validate_comparison(&field, operator, &value)?;
        Ok(Where::Comparison {
            field,
            operator,
            value,
        })
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(field, WhereOperator::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(field, WhereOperator::Ne, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(field, WhereOperator::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(field, WhereOperator::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(field, WhereOperator::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(field, WhereOperator::Lte, value)
    }

    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect::<Vec<Value>>();
        Self::new(field, WhereOperator::In, Value::Array(list))
    }

    pub fn not_in<I, V>(field: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect::<Vec<Value>>();
        Self::new(field, WhereOperator::Nin, Value::Array(list))
    }

    pub fn and(exprs: Vec<Where>) -> Result<Self> {
        if exprs.is_empty() {
            return Err(ChromaError::Validation(
                "$and requires at least one sub-expression".into(),
            ));
        }
        Ok(Where::And(exprs))
    }

    pub fn or(exprs: Vec<Where>) -> Result<Self> {
        if exprs.is_empty() {
            return Err(ChromaError::Validation(
                "$or requires at least one sub-expression".into(),
            ));
        }
        Ok(Where::Or(exprs))
    }

    /// Serialize to the wire predicate document.
    pub fn to_value(&self) -> Result<Value> {
        match self {
            Where::Comparison {
                field,
                operator,
                value,
            } => {
                validate_comparison(field, *operator, value)?;
                Ok(single_entry(
                    field.clone(),
                    single_entry(operator.as_str().to_string(), value.clone()),
                ))
            }
            Where::And(exprs) => combinator("$and", exprs.as_slice(), Where::to_value),
            Where::Or(exprs) => combinator("$or", exprs.as_slice(), Where::to_value),
        }
    }
}

/// Document text filter, serialized to Chroma's `where_document` document.
#[derive(Clone, Debug, PartialEq)]
pub enum WhereDocument {
    Contains(String),
    NotContains(String),
    And(Vec<WhereDocument>),
    Or(Vec<WhereDocument>),
}

impl WhereDocument {
    pub fn contains(text: impl Into<String>) -> Self {
        WhereDocument::Contains(text.into())
    }

    pub fn not_contains(text: impl Into<String>) -> Self {
        WhereDocument::NotContains(text.into())
    }

    pub fn and(exprs: Vec<WhereDocument>) -> Result<Self> {
        if exprs.is_empty() {
            return Err(ChromaError::Validation(
                "$and requires at least one sub-expression".into(),
            ));
        }
        Ok(WhereDocument::And(exprs))
    }

    pub fn or(exprs: Vec<WhereDocument>) -> Result<Self> {
        if exprs.is_empty() {
            return Err(ChromaError::Validation(
                "$or requires at least one sub-expression".into(),
            ));
        }
        Ok(WhereDocument::Or(exprs))
    }

    pub fn to_value(&self) -> Result<Value> {
        match self {
            WhereDocument::Contains(text) => text_operator("$contains", text),
            WhereDocument::NotContains(text) => text_operator("$not_contains", text),
            WhereDocument::And(exprs) => {
                combinator("$and", exprs.as_slice(), WhereDocument::to_value)
            }
            WhereDocument::Or(exprs) => {
                combinator("$or", exprs.as_slice(), WhereDocument::to_value)
            }
        }
    }
}

fn single_entry(key: String, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key, value);
    Value::Object(map)
}

fn combinator<T>(key: &str, exprs: &[T], to_value: fn(&T) -> Result<Value>) -> Result<Value> {
    if exprs.is_empty() {
        return Err(ChromaError::Validation(format!(
            "{key} requires at least one sub-expression"
        )));
    }
    let parts = exprs.iter().map(to_value).collect::<Result<Vec<_>>>()?;
    Ok(single_entry(key.to_string(), Value::Array(parts)))
}

fn text_operator(key: &str, text: &str) -> Result<Value> {
    if text.is_empty() {
        return Err(ChromaError::Validation(format!(
            "{key} requires non-empty text"
        )));
    }
    Ok(single_entry(key.to_string(), Value::String(text.to_string())))
}

fn validate_comparison(field: &str, operator: WhereOperator, value: &Value) -> Result<()> {
    if field.is_empty() {
        return Err(ChromaError::Validation("filter field must not be empty".into()));
    }
    let op = operator.as_str();

    if !operator.takes_list() {
        return match value {
            Value::Array(_) => Err(ChromaError::Validation(format!(
                "{op} on {field:?} expects a scalar, got a list"
            ))),
            other => scalar_kind(other).map(|_| ()).ok_or_else(|| {
                ChromaError::Validation(format!(
                    "{op} on {field:?} expects a string, number or bool"
                ))
            }),
        };
    }

    let Value::Array(items) = value else {
        return Err(ChromaError::Validation(format!(
            "{op} on {field:?} expects a list"
        )));
    };
    let Some(first) = items.first() else {
        return Err(ChromaError::Validation(format!(
            "{op} on {field:?} expects a non-empty list"
        )));
    };
    let kind = scalar_kind(first).ok_or_else(|| {
        ChromaError::Validation(format!(
            "{op} on {field:?} expects a list of strings, numbers or bools"
        ))
    })?;
    if items.iter().any(|v| scalar_kind(v) != Some(kind)) {
        return Err(ChromaError::Validation(format!(
            "{op} on {field:?} expects a homogeneous list"
        )));
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScalarKind {
    String,
    Number,
    Bool,
}

fn scalar_kind(value: &Value) -> Option<ScalarKind> {
    match value {
        Value::String(_) => Some(ScalarKind::String),
        Value::Number(_) => Some(ScalarKind::Number),
        Value::Bool(_) => Some(ScalarKind::Bool),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
