//! Join Engine for Solution Streams
//!
//! Combines two live solution streams via natural join: on every update
//! from either side, the reducer pairs the latest binding sets and keeps
//! the merged records whose shared variable names agree.
//!
//! Unlike pattern queries, which emit empty sets, the join suppresses
//! updates that produce zero matches — downstream consumers only ever see
//! non-empty join results.

use crate::channel::{Channel, sync};
use crate::types::SolutionSet;
use tracing::debug;

/// Natural join of two solution sets: all pairwise merges whose shared
/// variable names bind equal values.
pub fn natural_join(left: &SolutionSet, right: &SolutionSet) -> SolutionSet {
    let mut joined = SolutionSet::new();
    for lhs in left {
        for rhs in right {
            if let Some(merged) = lhs.merge(rhs) {
                joined.insert(merged);
            }
        }
    }
    joined
}

/// Live natural join of two solution streams.
///
/// Recomputes on every update from either side once both have fired;
/// updates yielding an empty join are suppressed, not delivered as empty
/// sets.
pub fn join(left: &Channel<SolutionSet>, right: &Channel<SolutionSet>) -> Channel<SolutionSet> {
    let name = format!("join[{} * {}]", left.name(), right.name());
    debug!(name = %name, "building join");
    sync(
        name,
        &[left.clone(), right.clone()],
        |slots: &[Option<SolutionSet>]| {
            let (Some(lhs), Some(rhs)) = (&slots[0], &slots[1]) else {
                return None;
            };
            let joined = natural_join(lhs, rhs);
            if joined.is_empty() { None } else { Some(joined) }
        },
        true,
    )
}
