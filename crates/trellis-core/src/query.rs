//! Pattern Query Engine
//!
//! A pattern query turns a 3-tuple of terms into a live channel of result
//! sets. Each constrained field contributes its memoized selection channel,
//! unconstrained fields contribute the global index, and a synchronizing
//! reducer recomputes the 3-way set intersection whenever any contributor
//! fires.
//!
//! ```text
//! selection(subject)  ┐
//! selection(predicate)├─ sync → intersection → (optional) id → triple map
//! selection(object)   ┘
//! ```
//!
//! Queries wired after facts were inserted replay current index state, so
//! the first delivered value already reflects every matching fact.

use crate::channel::{Channel, sync};
use crate::index::IdSet;
use crate::store::{TripleStore, materialize};
use crate::types::{FactIdSet, Field, Pattern, Term, TripleSet};
use tracing::debug;

impl TripleStore {
    fn selection_for(&self, field: Field, term: &Term) -> Channel<IdSet> {
        match term {
            Term::Value(value) => self.index(field).selection(value),
            // No constraint: every fact qualifies, which is exactly what the
            // global index reports.
            Term::Wildcard | Term::Variable(_) => self.global_channel().clone(),
        }
    }

    /// Live channel of identifier sets matching the pattern.
    ///
    /// Variables are treated as wildcards here; binding them is the
    /// parametric layer's job ([`TripleStore::param_query`]). Empty
    /// intersections are emitted as empty sets, not suppressed.
    pub fn query_ids(&self, pattern: &Pattern) -> Channel<FactIdSet> {
        debug!(pattern = %pattern, "building pattern query");
        if pattern.is_unconstrained() {
            return self
                .global_channel()
                .map(format!("query.ids{pattern}"), |ids: &IdSet| ids.borrow().clone());
        }

        let sources: Vec<Channel<IdSet>> = Field::ALL
            .iter()
            .map(|&field| self.selection_for(field, pattern.term(field)))
            .collect();
        sync(
            format!("query.ids{pattern}"),
            &sources,
            |slots: &[Option<IdSet>]| Some(intersect(slots)),
            true,
        )
    }

    /// Live channel of triple sets matching the pattern: [`Self::query_ids`]
    /// with a mapping stage that resolves identifiers through the shared
    /// fact table.
    pub fn query(&self, pattern: &Pattern) -> Channel<TripleSet> {
        let facts = self.facts_handle();
        self.query_ids(pattern).map(
            format!("query.triples{pattern}"),
            move |ids: &FactIdSet| materialize(facts.borrow().as_slice(), ids),
        )
    }
}

/// 3-way intersection over the latest per-source sets, intersecting the two
/// smallest sets first. A constrained source that has never fired selects
/// nothing, so the whole intersection is empty.
fn intersect(slots: &[Option<IdSet>]) -> FactIdSet {
    let Some(mut sets) = slots.iter().map(Option::as_ref).collect::<Option<Vec<&IdSet>>>()
    else {
        return FactIdSet::new();
    };
    sets.sort_by_key(|ids| ids.borrow().len());

    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return FactIdSet::new();
    };
    let mut result: FactIdSet = first.borrow().clone();
    for ids in sets {
        if result.is_empty() {
            break;
        }
        let ids = ids.borrow();
        result.retain(|id| ids.contains(id));
    }
    result
}
