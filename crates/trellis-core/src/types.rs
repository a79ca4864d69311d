//! Triples, patterns, query variables, and solutions
//!
//! The store works over ordered (subject, predicate, object) triples of
//! opaque [`Value`]s. Queries are 3-tuples of [`Term`]s, where each position
//! is a concrete value, a wildcard, or a named query variable; variables are
//! written with a leading `?` sentinel when parsed from strings. A
//! [`Solution`] is one variable-name → value binding record produced per
//! matching triple.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use trellis_types::Value;

/// Store-scoped fact identifier: assigned at insertion, monotonically
/// increasing, never reused.
pub type FactId = u64;

/// A set of fact identifiers
pub type FactIdSet = HashSet<FactId>;

/// A set of materialized triples
pub type TripleSet = HashSet<Triple>;

/// A set of variable-binding records
pub type SolutionSet = HashSet<Solution>;

/// The three fields of a triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// First position
    Subject,
    /// Second position
    Predicate,
    /// Third position
    Object,
}

impl Field {
    /// All fields, in triple order
    pub const ALL: [Field; 3] = [Field::Subject, Field::Predicate, Field::Object];

    /// Lowercase field name, used as a logging key
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Subject => "subject",
            Field::Predicate => "predicate",
            Field::Object => "object",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered (subject, predicate, object) fact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject field
    pub subject: Value,
    /// Predicate field
    pub predicate: Value,
    /// Object field
    pub object: Value,
}

impl Triple {
    /// Build a triple from anything convertible into field values
    pub fn new(
        subject: impl Into<Value>,
        predicate: impl Into<Value>,
        object: impl Into<Value>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Value at the given field position
    pub fn field(&self, field: Field) -> &Value {
        match field {
            Field::Subject => &self.subject,
            Field::Predicate => &self.predicate,
            Field::Object => &self.object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

/// One position of a query pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Exact-match against a concrete value
    Value(Value),
    /// Matches anything
    Wildcard,
    /// Named query variable; binds the matched field value in solutions
    Variable(String),
}

impl Term {
    /// Concrete-value term
    pub fn value(value: impl Into<Value>) -> Self {
        Term::Value(value.into())
    }

    /// Named variable term (name without the `?` sentinel)
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// True for the wildcard marker
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Term::Wildcard)
    }

    /// Variable name, if this term is a variable
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            Term::Value(_) | Term::Wildcard => None,
        }
    }
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        Term::Value(value)
    }
}

/// Strings with a leading `?` parse as query variables, everything else as
/// a concrete string value.
impl From<&str> for Term {
    fn from(raw: &str) -> Self {
        match raw.strip_prefix('?') {
            Some(name) => Term::Variable(name.to_string()),
            None => Term::Value(Value::from(raw)),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Value(value) => write!(f, "{value}"),
            Term::Wildcard => write!(f, "*"),
            Term::Variable(name) => write!(f, "?{name}"),
        }
    }
}

/// A 3-tuple query pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    terms: [Term; 3],
}

impl Pattern {
    /// Build a pattern from anything convertible into terms
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self { terms: [subject.into(), predicate.into(), object.into()] }
    }

    /// Term at the given field position
    pub fn term(&self, field: Field) -> &Term {
        match field {
            Field::Subject => &self.terms[0],
            Field::Predicate => &self.terms[1],
            Field::Object => &self.terms[2],
        }
    }

    /// True when no position carries a concrete value, so the pattern
    /// selects every fact in the store
    pub fn is_unconstrained(&self) -> bool {
        self.terms.iter().all(|term| !matches!(term, Term::Value(_)))
    }

    /// Variables in field order, as (position, name) pairs
    pub fn variables(&self) -> Vec<(Field, String)> {
        Field::ALL
            .iter()
            .filter_map(|&field| {
                self.term(field).variable_name().map(|name| (field, name.to_string()))
            })
            .collect()
    }

    /// The concrete-value-only pattern underlying a parametric query:
    /// variables are replaced by wildcards
    pub fn erase_variables(&self) -> Pattern {
        let erase = |term: &Term| match term {
            Term::Variable(_) => Term::Wildcard,
            other => other.clone(),
        };
        Self {
            terms: [
                erase(&self.terms[0]),
                erase(&self.terms[1]),
                erase(&self.terms[2]),
            ],
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.terms[0], self.terms[1], self.terms[2])
    }
}

/// A mapping from query-variable name to bound value, produced once per
/// matching triple
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    bindings: BTreeMap<String, Value>,
}

impl Solution {
    /// Empty binding record
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`. Returns false iff the name is already bound
    /// to a different value; the record is left unchanged in that case.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        match self.bindings.get(&name) {
            Some(existing) => *existing == value,
            None => {
                self.bindings.insert(name, value);
                true
            }
        }
    }

    /// Bound value for a variable name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Number of bound variables
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate bindings in variable-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Combine two records for a natural join: `None` iff a variable name
    /// present in both binds unequal values, otherwise the union of the
    /// bindings.
    pub fn merge(&self, other: &Solution) -> Option<Solution> {
        let mut merged = self.clone();
        for (name, value) in &other.bindings {
            match merged.bindings.get(name) {
                Some(existing) if existing != value => return None,
                Some(_) => {}
                None => {
                    merged.bindings.insert(name.clone(), value.clone());
                }
            }
        }
        Some(merged)
    }
}

// BTreeMap iteration order is deterministic, so hashing the entries in
// order stays consistent with the derived equality.
impl std::hash::Hash for Solution {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for (name, value) in &self.bindings {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}
