//! Triple Storage with Reactive Index Propagation
//!
//! The [`TripleStore`] owns the append-only fact table and the three field
//! indices, and is the single mutator of all shared state. Insertion is
//! idempotent over fact content: a triple equal to one already stored is
//! ignored, so the store behaves as a logical set keyed by content while
//! identifiers stay internal bookkeeping.
//!
//! ## Insertion Pipeline
//!
//! ```text
//! add_fact → assign id → append to table → grow field-index sets
//!          → push global set → push subject / predicate / object deltas
//! ```
//!
//! All index mutation happens before the first channel push, so derived
//! queries that combine several channels see consistent shared sets no
//! matter which push reaches them first.

use crate::channel::Channel;
use crate::index::{FieldIndex, FieldIndexStats, IdSet, IndexDelta};
use crate::types::{FactId, FactIdSet, Field, Triple, TripleSet};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, instrument};
use trellis_types::Value;

/// Overall store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub fact_count: usize,
    pub subject: FieldIndexStats,
    pub predicate: FieldIndexStats,
    pub object: FieldIndexStats,
}

/// Reactive in-memory triple store
///
/// Facts are stored by identifier in an append-only table (identifier ==
/// table index). Each of the three fields is indexed by value, and every
/// index is paired with a channel announcing set growth; the running set of
/// all identifiers is announced on the global channel. Queries are built on
/// top of these channels, see [`TripleStore::query`] and
/// [`TripleStore::param_query`].
#[derive(Debug)]
pub struct TripleStore {
    facts: Rc<RefCell<Vec<Triple>>>,
    subject: FieldIndex,
    predicate: FieldIndex,
    object: FieldIndex,
    all_ids: IdSet,
    global: Channel<IdSet>,
    next_id: FactId,
}

impl Default for TripleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TripleStore {
    /// Create an empty store
    pub fn new() -> Self {
        debug!("creating triple store");
        Self {
            facts: Rc::new(RefCell::new(Vec::new())),
            subject: FieldIndex::new(Field::Subject),
            predicate: FieldIndex::new(Field::Predicate),
            object: FieldIndex::new(Field::Object),
            all_ids: Rc::new(RefCell::new(FactIdSet::new())),
            global: Channel::new("index.global"),
            next_id: 0,
        }
    }

    pub(crate) fn index(&self, field: Field) -> &FieldIndex {
        match field {
            Field::Subject => &self.subject,
            Field::Predicate => &self.predicate,
            Field::Object => &self.object,
        }
    }

    fn index_mut(&mut self, field: Field) -> &mut FieldIndex {
        match field {
            Field::Subject => &mut self.subject,
            Field::Predicate => &mut self.predicate,
            Field::Object => &mut self.object,
        }
    }

    pub(crate) fn facts_handle(&self) -> Rc<RefCell<Vec<Triple>>> {
        Rc::clone(&self.facts)
    }

    /// Channel announcing the running set of all fact identifiers
    pub fn global_channel(&self) -> &Channel<IdSet> {
        &self.global
    }

    /// Raw update channel for one field index
    pub fn field_channel(&self, field: Field) -> &Channel<IndexDelta> {
        self.index(field).channel()
    }

    /// Memoized narrow-cast channel for one (field, value) pair
    pub fn selection(&self, field: Field, value: &Value) -> Channel<IdSet> {
        self.index(field).selection(value)
    }

    /// Snapshot of the identifier set currently indexed under a field value
    pub fn ids_for(&self, field: Field, value: &Value) -> Option<FactIdSet> {
        self.index(field).get(value).map(|ids| ids.borrow().clone())
    }

    /// Number of stored facts
    pub fn len(&self) -> usize {
        self.facts.borrow().len()
    }

    /// True when no fact has been added
    pub fn is_empty(&self) -> bool {
        self.facts.borrow().is_empty()
    }

    /// Stored triple for an identifier
    pub fn get_fact(&self, id: FactId) -> Option<Triple> {
        self.facts.borrow().get(id as usize).cloned()
    }

    /// True iff an equal triple is already stored.
    ///
    /// Looks the triple's three field values up in their indices and scans
    /// the smallest candidate set, so the cost is bounded by the most
    /// selective index.
    pub fn has_fact(&self, triple: &Triple) -> bool {
        let mut candidates: Option<IdSet> = None;
        for field in Field::ALL {
            let Some(ids) = self.index(field).get(triple.field(field)) else {
                return false;
            };
            let smaller = match &candidates {
                Some(current) => ids.borrow().len() < current.borrow().len(),
                None => true,
            };
            if smaller {
                candidates = Some(ids);
            }
        }
        let Some(candidates) = candidates else {
            return false;
        };
        let facts = self.facts.borrow();
        candidates.borrow().iter().any(|&id| facts.get(id as usize) == Some(triple))
    }

    /// Insert a fact, returning false without any mutation or emission if
    /// an equal fact already exists.
    ///
    /// A successful insert assigns the next identifier, grows the three
    /// field-index sets and the global set, and then emits in a fixed
    /// order: the global set first, then the subject, predicate, and object
    /// deltas.
    #[instrument(skip(self, triple), fields(fact = %triple))]
    pub fn add_fact(&mut self, triple: Triple) -> bool {
        if self.has_fact(&triple) {
            debug!("duplicate fact ignored");
            return false;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.facts.borrow_mut().push(triple.clone());

        let mut deltas = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let key = triple.field(field).clone();
            let ids = self.index_mut(field).insert(key.clone(), id);
            deltas.push((field, key, ids));
        }
        self.all_ids.borrow_mut().insert(id);
        debug!(fact_id = id, "fact added");

        self.global.push(Rc::clone(&self.all_ids));
        for (field, key, ids) in deltas {
            self.index(field).emit(key, ids);
        }
        true
    }

    /// Insert a sequence of facts; true only if every fact was newly added.
    /// Later facts are inserted regardless of earlier duplicates.
    #[instrument(skip(self, triples))]
    pub fn add_facts(&mut self, triples: impl IntoIterator<Item = Triple>) -> bool {
        let mut all_new = true;
        for triple in triples {
            let added = self.add_fact(triple);
            all_new = all_new && added;
        }
        all_new
    }

    /// Materialize an identifier set into the stored triples.
    ///
    /// This is the integration surface for export and visualization
    /// collaborators working from raw identifier-set channels.
    pub fn resolve(&self, ids: &FactIdSet) -> TripleSet {
        materialize(self.facts.borrow().as_slice(), ids)
    }

    /// Current store statistics
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            fact_count: self.len(),
            subject: self.subject.stats(),
            predicate: self.predicate.stats(),
            object: self.object.stats(),
        }
    }
}

/// Resolve identifiers against the fact table; unknown identifiers are
/// skipped. Shared by [`TripleStore::resolve`] and the query layer's
/// triple-mapping stage.
pub(crate) fn materialize(facts: &[Triple], ids: &FactIdSet) -> TripleSet {
    ids.iter().filter_map(|&id| facts.get(id as usize).cloned()).collect()
}
