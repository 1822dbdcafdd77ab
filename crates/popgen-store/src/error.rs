//! Error types for artifact storage.

use thiserror::Error;

/// Errors from continuation resolution and batch writing.
#[derive(Error, Debug)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parquet encode/decode error.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// A file in the parameter directory breaks the artifact naming
    /// contract. Skipping it could hand out identifiers that collide
    /// with rows it contains, so this requires operator cleanup.
    #[error("File '{0}' does not match the artifact naming convention")]
    MalformedArtifactName(String),

    /// Table rows do not divide evenly into batches.
    #[error("Table of {rows} rows cannot be split into full batches of {batch_size}")]
    IncompleteBatch { rows: usize, batch_size: usize },

    /// A written artifact does not read back with the expected shape.
    #[error("Artifact '{path}' failed verification: {reason}")]
    ArtifactVerification { path: String, reason: String },
}
