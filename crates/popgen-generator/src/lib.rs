//! Stochastic population generation for gw-popgen.
//!
//! This crate turns a validated [`PopulationConfig`] into an in-memory
//! [`PopulationTable`]: one row per source, the identifier column
//! first, one sampled column per configured parameter.
//!
//! # Architecture
//!
//! ```text
//! PopulationConfig (JSON)
//!        │
//!        ▼
//! ┌─────────────────────┐
//! │  PopulationTable    │
//! │                     │
//! │  - first_index      │──── distributions::sample(rng, name, min, max, count)
//! │  - rng (StdRng)     │         one call per configured parameter
//! └──────────┬──────────┘
//!            │
//!            ▼
//!   rows: [id, param_1, param_2, ...]
//! ```
//!
//! The caller owns the seeded RNG; nothing in this crate seeds
//! independently, so two runs with the same seed and the same call
//! sequence produce identical output.
//!
//! [`PopulationConfig`]: popgen_core::PopulationConfig

pub mod distributions;
pub mod table;

// Re-exports for convenience
pub use distributions::{sample, Distribution};
pub use table::{Column, PopulationTable, TableSlice, ID_COLUMN};

/// Error type for sampling and table assembly.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Distribution name with no registered sampling algorithm
    #[error("Unknown distribution: {0}")]
    UnknownDistribution(String),

    /// Bounds outside the chosen distribution's domain
    #[error("Invalid bounds [{min}, {max}] for distribution '{distribution}'")]
    InvalidBounds {
        distribution: &'static str,
        min: f64,
        max: f64,
    },

    /// The fixed-width identifier space cannot hold the requested rows
    #[error(
        "Identifier overflow: {count} sources starting at index {first_index} exceed the maximum index {max}",
        max = popgen_core::MAX_SOURCE_INDEX
    )]
    IdentifierOverflow { first_index: u64, count: u64 },
}
