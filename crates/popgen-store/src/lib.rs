//! Artifact storage for generated populations.
//!
//! The parameter directory of a population is its own database: each
//! batch of sources is one Parquet file named by the identifier range
//! it contains, and the continuation resolver recovers the next free
//! source index from those filenames. This crate owns both sides of
//! that contract.

pub mod error;
pub mod resolver;
pub mod writer;

// Re-exports for convenience
pub use error::StoreError;
pub use resolver::{resolve_continuation, Continuation, PARAMETER_SUBDIR};
pub use writer::{
    read_artifact_summary, ArtifactSummary, BatchWriter, WriteMetrics, ARTIFACT_EXTENSION,
};
