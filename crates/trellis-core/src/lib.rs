#![deny(warnings)]
#![allow(missing_docs)]
//! Core functionality for the Trellis reactive triple store.
//!
//! Trellis keeps a growing set of (subject, predicate, object) facts,
//! indexes each field as facts arrive, and exposes query results as live
//! channels instead of one-shot snapshots. Downstream consumers subscribe
//! once and are re-notified on every insertion that affects their result,
//! with no polling and no re-scan of the store.
//!
//! ## Data Flow
//!
//! ```text
//! add_fact → Field Indices → Selection Channels → Pattern Queries
//!     ↓            ↓                ↓                  ↓
//!  Global      Per-value       Per-(field, key)    Set intersection,
//!  Index       id-sets         narrow-casts        solutions, joins
//! ```
//!
//! Propagation is single-threaded and synchronous: every derived channel is
//! recomputed on the caller's stack inside `add_fact`.

use tracing::{debug, instrument};

/// Single-threaded reactive channel primitive and the multi-source combinator
pub mod channel;
/// Error taxonomy for store and query construction
pub mod error;
/// Per-field identifier indices with cached selection subscriptions
pub mod index;
/// Natural join over solution streams
pub mod join;
/// Pattern query construction over index selections
pub mod query;
/// Parametric queries with named-variable resolution
pub mod solve;
/// Triple storage with reactive index propagation
pub mod store;
/// Triples, patterns, query variables, and solutions
pub mod types;

pub use channel::{Channel, sync};
pub use error::{TrellisError, TrellisResult};
pub use index::{FieldIndex, FieldIndexStats, IdSet, IndexDelta};
pub use join::{join, natural_join};
pub use store::{StoreStats, TripleStore};
pub use types::{
    FactId, FactIdSet, Field, Pattern, Solution, SolutionSet, Term, Triple, TripleSet,
};

// Re-export the shared value type for convenience
pub use trellis_types::Value;

/// Initialize the core store components
#[instrument]
pub fn init() -> anyhow::Result<()> {
    debug!("Initializing Trellis core");
    Ok(())
}
