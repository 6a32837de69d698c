//! Query construction for collection reads.
//!
//! The data mode is a required input of [`Query::scoped`]; callers never read
//! it from ambient state.

use std::cmp::Ordering as CmpOrdering;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use rihla_core::DataMode;

use super::Document;

pub const DATA_MODE_FIELD: &str = "dataMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    /// Equal, or the field is absent (documents written before the field existed).
    EqOrAbsent,
    /// String equality ignoring letter case.
    EqIgnoreCase,
    Ne,
    Gte,
    Lte,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: JsonValue,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<JsonValue>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn new(field: &str, op: FilterOp, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let actual = doc.get(&self.field);
        match self.op {
            FilterOp::Eq => actual == Some(&self.value),
            FilterOp::EqOrAbsent => {
                matches!(actual, None | Some(JsonValue::Null)) || actual == Some(&self.value)
            }
            FilterOp::EqIgnoreCase => match (actual, &self.value) {
                (Some(JsonValue::String(a)), JsonValue::String(b)) => {
                    a.to_lowercase() == b.to_lowercase()
                }
                _ => false,
            },
            FilterOp::Ne => actual != Some(&self.value),
            FilterOp::Gte => actual
                .and_then(|a| compare(a, &self.value))
                .is_some_and(|o| o != CmpOrdering::Less),
            FilterOp::Lte => actual
                .and_then(|a| compare(a, &self.value))
                .is_some_and(|o| o != CmpOrdering::Greater),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub field: String,
    pub direction: Direction,
}

/// Filters (all must match), optional ordering and limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<Ordering>,
    pub limit: Option<usize>,
}

impl Query {
    /// Match every document in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only documents of `mode`. Legacy documents without a `dataMode`
    /// field count as production data.
    pub fn scoped(mode: DataMode) -> Self {
        let op = match mode {
            DataMode::Production => FilterOp::EqOrAbsent,
            DataMode::Test => FilterOp::Eq,
        };
        Self::all().filter(Filter::new(DATA_MODE_FIELD, op, mode.as_str()))
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<JsonValue>) -> Self {
        self.filter(Filter::eq(field, value))
    }

    pub fn where_eq_ignore_case(self, field: &str, value: &str) -> Self {
        self.filter(Filter::new(field, FilterOp::EqIgnoreCase, value))
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(Ordering {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Sort by the requested field; documents missing it sort last.
    pub fn compare_docs(&self, a: &Document, b: &Document) -> CmpOrdering {
        let Some(ordering) = &self.order_by else {
            return CmpOrdering::Equal;
        };
        let ord = match (a.get(&ordering.field), b.get(&ordering.field)) {
            (Some(x), Some(y)) => compare(x, y).unwrap_or(CmpOrdering::Equal),
            (Some(_), None) => return CmpOrdering::Less,
            (None, Some(_)) => return CmpOrdering::Greater,
            (None, None) => CmpOrdering::Equal,
        };
        match ordering.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

fn compare(a: &JsonValue, b: &JsonValue) -> Option<CmpOrdering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (JsonValue::String(x), JsonValue::String(y)) => Some(x.cmp(y)),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
