//! Aggregator crate for the xmlflat workspace.
//!
//! Re-exports the facade so the demos under `demos/` can depend on a single
//! crate name.

pub use xmlflat::*;
