//! Parametric Query Engine
//!
//! A parametric query layers named-variable binding on top of a pattern
//! query: variable positions are relaxed to wildcards for matching, and
//! every matching triple is turned into one [`Solution`] binding each
//! variable name to the triple's corresponding field value.
//!
//! A pattern with no variables has nothing to resolve and is rejected at
//! construction time, before any channel is wired.

use crate::channel::Channel;
use crate::error::{TrellisError, TrellisResult};
use crate::store::TripleStore;
use crate::types::{Field, Pattern, Solution, SolutionSet, TripleSet};
use tracing::debug;

impl TripleStore {
    /// Live channel of solution sets for a pattern with query variables.
    ///
    /// Fails fast with [`TrellisError::InvalidQuery`] if the pattern
    /// contains no variables.
    pub fn param_query(&self, pattern: &Pattern) -> TrellisResult<Channel<SolutionSet>> {
        let variables = pattern.variables();
        if variables.is_empty() {
            return Err(TrellisError::invalid_query(
                "parametric query pattern contains no query variables",
                pattern,
            ));
        }
        debug!(pattern = %pattern, variables = variables.len(), "building parametric query");

        let concrete = pattern.erase_variables();
        let triples = self.query(&concrete);
        Ok(triples.map(
            format!("query.solutions{pattern}"),
            move |matches: &TripleSet| resolve_solutions(matches, &variables),
        ))
    }
}

/// One binding record per matching triple. A triple whose fields disagree
/// on a repeated variable name (e.g. `[?x, likes, ?x]` over `(a, likes, b)`)
/// is rejected from the solution set rather than bound last-write-wins.
fn resolve_solutions(matches: &TripleSet, variables: &[(Field, String)]) -> SolutionSet {
    let mut solutions = SolutionSet::new();
    for triple in matches {
        let mut solution = Solution::new();
        let consistent = variables
            .iter()
            .all(|(field, name)| solution.bind(name.clone(), triple.field(*field).clone()));
        if consistent {
            solutions.insert(solution);
        }
    }
    solutions
}
