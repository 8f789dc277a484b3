//! Structured boolean queries over transaction records
//!
//! A query is a conjunction of `term` and `range` predicates on the
//! `confirmed` and `block_number` fields, mirroring a document store's
//! bool/filter DSL. Queries serialize to that DSL for logging.

use crate::records::TransactionRecord;
use serde_json::{json, Value};

/// Queryable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Confirmed,
    BlockNumber,
}

/// Value matched by a `term` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermValue {
    Bool(bool),
    Int(u64),
}

/// Bounds of a `range` predicate. Unset bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range {
    pub gt: Option<u64>,
    pub gte: Option<u64>,
    pub lt: Option<u64>,
    pub lte: Option<u64>,
}

impl Range {
    fn contains(&self, v: u64) -> bool {
        self.gt.map_or(true, |b| v > b)
            && self.gte.map_or(true, |b| v >= b)
            && self.lt.map_or(true, |b| v < b)
            && self.lte.map_or(true, |b| v <= b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Term(Field, TermValue),
    Range(Field, Range),
}

impl Predicate {
    fn matches(&self, record: &TransactionRecord) -> bool {
        match *self {
            Predicate::Term(Field::Confirmed, TermValue::Bool(b)) => record.confirmed == b,
            Predicate::Term(Field::BlockNumber, TermValue::Int(n)) => record.block_number == n,
            // Type mismatch never matches
            Predicate::Term(_, _) => false,
            Predicate::Range(Field::BlockNumber, range) => range.contains(record.block_number),
            Predicate::Range(Field::Confirmed, range) => range.contains(record.confirmed as u64),
        }
    }

    fn to_dsl(&self) -> Value {
        match self {
            Predicate::Term(field, value) => {
                let value = match value {
                    TermValue::Bool(b) => json!(b),
                    TermValue::Int(n) => json!(n),
                };
                json!({ "term": { field_name(*field): value } })
            }
            Predicate::Range(field, range) => {
                let mut bounds = serde_json::Map::new();
                for (name, bound) in [
                    ("gt", range.gt),
                    ("gte", range.gte),
                    ("lt", range.lt),
                    ("lte", range.lte),
                ] {
                    if let Some(b) = bound {
                        bounds.insert(name.to_string(), json!(b));
                    }
                }
                json!({ "range": { field_name(*field): bounds } })
            }
        }
    }
}

fn field_name(field: Field) -> &'static str {
    match field {
        Field::Confirmed => "confirmed",
        Field::BlockNumber => "block_number",
    }
}

/// Conjunction of predicates. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolQuery {
    pub must: Vec<Predicate>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term_confirmed(mut self, confirmed: bool) -> Self {
        self.must
            .push(Predicate::Term(Field::Confirmed, TermValue::Bool(confirmed)));
        self
    }

    pub fn term_block_number(mut self, block_number: u64) -> Self {
        self.must
            .push(Predicate::Term(Field::BlockNumber, TermValue::Int(block_number)));
        self
    }

    pub fn range_block_number(mut self, range: Range) -> Self {
        self.must.push(Predicate::Range(Field::BlockNumber, range));
        self
    }

    /// Unconfirmed, mined transactions at or below `boundary`.
    pub fn confirmable(boundary: u64) -> Self {
        Self::new().term_confirmed(false).range_block_number(Range {
            gt: Some(0),
            lte: Some(boundary),
            ..Range::default()
        })
    }

    /// Unconfirmed transactions that have not been fetched from the chain.
    pub fn uninitialized() -> Self {
        Self::new().term_confirmed(false).term_block_number(0)
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.must.iter().all(|p| p.matches(record))
    }

    /// Render as a bool/filter document query.
    pub fn to_dsl(&self) -> Value {
        let filters: Vec<Value> = self.must.iter().map(Predicate::to_dsl).collect();
        json!({ "query": { "bool": { "must": filters } } })
    }
}
