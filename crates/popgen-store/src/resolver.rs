//! Continuation resolution for an existing population directory.
//!
//! Artifact filenames embed the identifier range they contain, and the
//! zero-padded fixed-width identifier format makes lexicographic
//! filename order coincide with numeric order. The resolver lists the
//! parameter directory, validates every entry against the naming
//! contract, and continues numbering after the last identifier found.

use popgen_core::parse_artifact_stem;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::writer::ARTIFACT_EXTENSION;

/// Subdirectory of a population directory holding parameter artifacts.
pub const PARAMETER_SUBDIR: &str = "sources_parameters";

/// Where the next run should continue from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    /// Directory that holds (or will hold) the batch artifacts
    pub parameter_dir: PathBuf,

    /// Index of the first source the next run may claim
    pub next_index: u64,
}

/// Determine the next usable source index for `output_dir`.
///
/// Creates the parameter subdirectory when it is missing. Any entry
/// present that does not follow the `<first_id>-<last_id>.parquet`
/// naming convention is a fatal error, never skipped: an unparsable
/// file could hold rows whose identifiers a skip-and-continue policy
/// would hand out again.
pub fn resolve_continuation(output_dir: &Path) -> Result<Continuation, StoreError> {
    let parameter_dir = output_dir.join(PARAMETER_SUBDIR);

    if !parameter_dir.exists() {
        fs::create_dir_all(&parameter_dir)?;
        debug!("Created parameter directory {}", parameter_dir.display());
        return Ok(Continuation {
            parameter_dir,
            next_index: 0,
        });
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(&parameter_dir)? {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    let Some(last) = names.last() else {
        return Ok(Continuation {
            parameter_dir,
            next_index: 0,
        });
    };

    for name in &names {
        parse_artifact_name(name)?;
    }

    let (_, last_index) = parse_artifact_name(last)?;
    info!(
        "Found {} existing artifact(s), continuing after index {}",
        names.len(),
        last_index
    );

    Ok(Continuation {
        parameter_dir,
        next_index: last_index + 1,
    })
}

/// Parse `<first_id>-<last_id>.parquet` into its index pair.
fn parse_artifact_name(name: &str) -> Result<(u64, u64), StoreError> {
    let malformed = || StoreError::MalformedArtifactName(name.to_string());

    let stem = name.strip_suffix(ARTIFACT_EXTENSION).ok_or_else(malformed)?;
    let (first, last) = parse_artifact_stem(stem).ok_or_else(malformed)?;
    if first > last {
        return Err(malformed());
    }
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_missing_parameter_dir_is_created() {
        let tmp = TempDir::new().unwrap();

        let continuation = resolve_continuation(tmp.path()).unwrap();

        assert_eq!(continuation.next_index, 0);
        assert_eq!(continuation.parameter_dir, tmp.path().join(PARAMETER_SUBDIR));
        assert!(continuation.parameter_dir.is_dir());
    }

    #[test]
    fn test_empty_parameter_dir_starts_at_zero() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(PARAMETER_SUBDIR)).unwrap();

        let continuation = resolve_continuation(tmp.path()).unwrap();
        assert_eq!(continuation.next_index, 0);
    }

    #[test]
    fn test_continues_after_last_artifact() {
        let tmp = TempDir::new().unwrap();
        let parameter_dir = tmp.path().join(PARAMETER_SUBDIR);
        fs::create_dir(&parameter_dir).unwrap();
        touch(&parameter_dir, "gws000000-gws000009.parquet");
        touch(&parameter_dir, "gws000010-gws000019.parquet");

        let continuation = resolve_continuation(tmp.path()).unwrap();
        assert_eq!(continuation.next_index, 20);
    }

    #[test]
    fn test_listing_order_does_not_matter() {
        let tmp = TempDir::new().unwrap();
        let parameter_dir = tmp.path().join(PARAMETER_SUBDIR);
        fs::create_dir(&parameter_dir).unwrap();
        // Created out of numeric order; the sorted listing still ends
        // at the highest range.
        touch(&parameter_dir, "gws000100-gws000109.parquet");
        touch(&parameter_dir, "gws000000-gws000009.parquet");
        touch(&parameter_dir, "gws000010-gws000099.parquet");

        let continuation = resolve_continuation(tmp.path()).unwrap();
        assert_eq!(continuation.next_index, 110);
    }

    #[test]
    fn test_foreign_file_fails_closed() {
        let tmp = TempDir::new().unwrap();
        let parameter_dir = tmp.path().join(PARAMETER_SUBDIR);
        fs::create_dir(&parameter_dir).unwrap();
        touch(&parameter_dir, "gws000000-gws000009.parquet");
        touch(&parameter_dir, "notes.txt");

        let result = resolve_continuation(tmp.path());
        assert!(matches!(
            result,
            Err(StoreError::MalformedArtifactName(name)) if name == "notes.txt"
        ));
    }

    #[test]
    fn test_wrong_extension_fails_closed() {
        let tmp = TempDir::new().unwrap();
        let parameter_dir = tmp.path().join(PARAMETER_SUBDIR);
        fs::create_dir(&parameter_dir).unwrap();
        touch(&parameter_dir, "gws000000-gws000009.hdf5");

        assert!(matches!(
            resolve_continuation(tmp.path()),
            Err(StoreError::MalformedArtifactName(_))
        ));
    }

    #[test]
    fn test_inverted_range_fails_closed() {
        let tmp = TempDir::new().unwrap();
        let parameter_dir = tmp.path().join(PARAMETER_SUBDIR);
        fs::create_dir(&parameter_dir).unwrap();
        touch(&parameter_dir, "gws000009-gws000000.parquet");

        assert!(matches!(
            resolve_continuation(tmp.path()),
            Err(StoreError::MalformedArtifactName(_))
        ));
    }
}
