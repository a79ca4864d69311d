//! Trellis Types
//!
//! This crate defines the shared value type used throughout the Trellis
//! ecosystem (currently `trellis-core`). Triple fields are opaque,
//! equality-comparable scalars; keeping them in their own crate means any
//! future integration layer can speak `Value` without depending on the
//! store itself.

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(missing_docs)]

mod types;
pub use types::Value;
