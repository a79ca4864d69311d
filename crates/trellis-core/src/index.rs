//! Field Indices for the Triple Store
//!
//! One [`FieldIndex`] exists per triple field (subject, predicate, object).
//! Each maps a field value to the set of identifiers of facts carrying that
//! value, and pairs the mapping with a reactive channel that announces
//! "the set for this key changed" on every insertion.
//!
//! ## Shared Mutable Id-Sets
//!
//! The per-value identifier sets are handed out as [`IdSet`] handles and
//! mutated in place: a set reference obtained from an earlier lookup or an
//! earlier channel delivery observes all later insertions. This aliasing is
//! the contract the query layer relies on — the store is the only mutator,
//! queries only read through the shared handle.
//!
//! ## Selection Subscriptions
//!
//! A selection is a per-(field, key) derivation that narrows the field's raw
//! update channel down to updates for exactly that key. Selections are
//! memoized per key so repeated queries against the same value share one
//! underlying derivation and one downstream subscriber list.

use crate::channel::Channel;
use crate::types::{FactId, FactIdSet, Field};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;
use trellis_types::Value;

/// Shared, in-place-mutated identifier set handle
pub type IdSet = Rc<RefCell<FactIdSet>>;

/// Per-field update event: the key whose set changed, and the (shared)
/// changed set itself
#[derive(Debug, Clone)]
pub struct IndexDelta {
    /// Field value whose identifier set grew
    pub key: Value,
    /// Handle to the changed set
    pub ids: IdSet,
}

/// Statistics for a single field index
#[derive(Debug, Clone)]
pub struct FieldIndexStats {
    pub unique_values: usize,
    pub indexed_facts: usize,
    pub cached_selections: usize,
}

/// Mapping from field value to shared identifier set, with reactive
/// update propagation
#[derive(Debug)]
pub struct FieldIndex {
    field: Field,
    by_value: HashMap<Value, IdSet>,
    channel: Channel<IndexDelta>,
    selections: RefCell<HashMap<Value, Channel<IdSet>>>,
    selections_built: Cell<usize>,
}

impl FieldIndex {
    /// Create an empty index for the given field position
    pub fn new(field: Field) -> Self {
        Self {
            field,
            by_value: HashMap::new(),
            channel: Channel::new(format!("index.{}", field.as_str())),
            selections: RefCell::new(HashMap::new()),
            selections_built: Cell::new(0),
        }
    }

    /// Field position this index covers
    pub fn field(&self) -> Field {
        self.field
    }

    /// Raw per-field update channel
    pub fn channel(&self) -> &Channel<IndexDelta> {
        &self.channel
    }

    /// Insert an identifier into the key's shared set, creating the set on
    /// first use, and return the handle. Emission is left to the caller so
    /// insert-time ordering stays under the store's control.
    pub fn insert(&mut self, key: Value, id: FactId) -> IdSet {
        let ids = Rc::clone(
            self.by_value
                .entry(key)
                .or_insert_with(|| Rc::new(RefCell::new(FactIdSet::new()))),
        );
        ids.borrow_mut().insert(id);
        ids
    }

    /// Current identifier set for a value, if any fact carries it
    pub fn get(&self, key: &Value) -> Option<IdSet> {
        self.by_value.get(key).map(Rc::clone)
    }

    /// Announce a changed set on the raw channel
    pub fn emit(&self, key: Value, ids: IdSet) {
        self.channel.push(IndexDelta { key, ids });
    }

    /// Memoized narrow-cast of the raw channel to exactly one key.
    ///
    /// The first request constructs the derivation and, if the index already
    /// holds a set for the key, seeds it so late-wired queries see current
    /// state. Every later request returns a handle to the same channel.
    pub fn selection(&self, key: &Value) -> Channel<IdSet> {
        if let Some(existing) = self.selections.borrow().get(key) {
            return existing.clone();
        }

        debug!(field = self.field.as_str(), key = %key, "building selection subscription");
        let wanted = key.clone();
        let derived = self.channel.filter_map(
            format!("selection.{}[{}]", self.field.as_str(), key),
            move |delta: &IndexDelta| (delta.key == wanted).then(|| Rc::clone(&delta.ids)),
        );
        if let Some(current) = self.get(key) {
            derived.push(current);
        }
        self.selections_built.set(self.selections_built.get() + 1);
        self.selections.borrow_mut().insert(key.clone(), derived.clone());
        derived
    }

    /// Number of selection derivations constructed so far
    pub fn selections_built(&self) -> usize {
        self.selections_built.get()
    }

    /// Current index statistics
    pub fn stats(&self) -> FieldIndexStats {
        FieldIndexStats {
            unique_values: self.by_value.len(),
            indexed_facts: self.by_value.values().map(|ids| ids.borrow().len()).sum(),
            cached_selections: self.selections.borrow().len(),
        }
    }
}
