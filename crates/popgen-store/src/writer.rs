//! Batch artifact writing.
//!
//! Each batch of rows becomes one Parquet file named by the identifier
//! range it contains. Rows land in a temporary file that is atomically
//! renamed into place on success, so a failure partway through a batch
//! never leaves a final-named artifact with partial content.

use parquet::basic::{Compression, GzipLevel, LogicalType, Repetition, Type as PhysicalType};
use parquet::data_type::{ByteArray, ByteArrayType, DoubleType};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::types::{Type as SchemaType, TypePtr};
use popgen_generator::{PopulationTable, TableSlice, ID_COLUMN};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::StoreError;

/// File extension of every batch artifact, including the dot.
pub const ARTIFACT_EXTENSION: &str = ".parquet";

/// Name of the table stored in each artifact.
pub const ARTIFACT_TABLE_NAME: &str = "sources_parameters";

/// Gzip level applied to every column chunk. Fixed, not per-call
/// tunable.
const COMPRESSION_LEVEL: u32 = 5;

/// Metrics from writing one run's batches.
#[derive(Debug, Clone, Default)]
pub struct WriteMetrics {
    /// Number of artifacts written.
    pub artifacts_written: u64,
    /// Number of rows written across all artifacts.
    pub rows_written: u64,
    /// Total size of all artifacts in bytes.
    pub file_size_bytes: u64,
    /// Wall-clock time for the whole write.
    pub total_duration: Duration,
}

impl WriteMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Writer that splits a population table into fixed-size artifacts.
pub struct BatchWriter {
    parameter_dir: PathBuf,
    batch_size: usize,
    verify: bool,
}

impl BatchWriter {
    /// Create a writer targeting `parameter_dir`.
    pub fn new(parameter_dir: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            parameter_dir: parameter_dir.into(),
            batch_size,
            verify: false,
        }
    }

    /// Re-open each artifact after writing and confirm its shape.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Write the table as consecutive fixed-size batch artifacts.
    ///
    /// Batch `i` covers rows `[i * batch_size, (i + 1) * batch_size)`.
    /// A row count that does not divide evenly into batches fails
    /// before any file is written.
    pub fn write(&self, table: &PopulationTable) -> Result<WriteMetrics, StoreError> {
        let start_time = Instant::now();
        let rows = table.n_rows();

        if self.batch_size == 0 || rows % self.batch_size != 0 {
            return Err(StoreError::IncompleteBatch {
                rows,
                batch_size: self.batch_size,
            });
        }

        let schema = artifact_schema(table)?;
        let mut metrics = WriteMetrics::default();

        for start in (0..rows).step_by(self.batch_size) {
            let batch = table.slice(start..start + self.batch_size);
            let filename = format!(
                "{}-{}{ARTIFACT_EXTENSION}",
                batch.first_id(),
                batch.last_id()
            );
            let path = self.parameter_dir.join(&filename);

            let bytes = self.write_artifact(&path, schema.clone(), &batch)?;

            if self.verify {
                debug!("Re-reading {} for verification", path.display());
                verify_artifact(&path, batch.n_rows(), &table.column_names())?;
            }

            metrics.artifacts_written += 1;
            metrics.rows_written += batch.n_rows() as u64;
            metrics.file_size_bytes += bytes;
            info!("Output saved as {}", path.display());
        }

        metrics.total_duration = start_time.elapsed();
        Ok(metrics)
    }

    /// Serialize one batch into `path` via a temporary file.
    fn write_artifact(
        &self,
        path: &Path,
        schema: TypePtr,
        batch: &TableSlice<'_>,
    ) -> Result<u64, StoreError> {
        let props = Arc::new(
            WriterProperties::builder()
                .set_compression(Compression::GZIP(GzipLevel::try_new(COMPRESSION_LEVEL)?))
                .build(),
        );

        let tmp = NamedTempFile::new_in(&self.parameter_dir)?;
        let mut writer = SerializedFileWriter::new(tmp.as_file().try_clone()?, schema, props)?;

        let ids: Vec<ByteArray> = batch
            .ids()
            .iter()
            .map(|id| ByteArray::from(id.as_str()))
            .collect();
        let parameter_columns: Vec<&[f64]> = batch.columns().map(|(_, values)| values).collect();

        let mut row_group = writer.next_row_group()?;
        let mut column_index = 0;
        while let Some(mut column) = row_group.next_column()? {
            if column_index == 0 {
                column.typed::<ByteArrayType>().write_batch(&ids, None, None)?;
            } else {
                column.typed::<DoubleType>().write_batch(
                    parameter_columns[column_index - 1],
                    None,
                    None,
                )?;
            }
            column.close()?;
            column_index += 1;
        }
        row_group.close()?;
        writer.close()?;

        let bytes = tmp.as_file().metadata()?.len();
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(bytes)
    }
}

/// Build the artifact schema: a required UTF-8 `id` column followed by
/// one required DOUBLE column per parameter, column order preserved.
fn artifact_schema(table: &PopulationTable) -> Result<TypePtr, StoreError> {
    let mut fields = Vec::with_capacity(table.columns().len() + 1);

    let id_field = SchemaType::primitive_type_builder(ID_COLUMN, PhysicalType::BYTE_ARRAY)
        .with_repetition(Repetition::REQUIRED)
        .with_logical_type(Some(LogicalType::String))
        .build()?;
    fields.push(Arc::new(id_field));

    for column in table.columns() {
        let field = SchemaType::primitive_type_builder(&column.name, PhysicalType::DOUBLE)
            .with_repetition(Repetition::REQUIRED)
            .build()?;
        fields.push(Arc::new(field));
    }

    let schema = SchemaType::group_type_builder(ARTIFACT_TABLE_NAME)
        .with_fields(fields)
        .build()?;
    Ok(Arc::new(schema))
}

/// Shape of an artifact as read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSummary {
    /// Number of rows stored.
    pub rows: u64,
    /// Column names, in stored order.
    pub columns: Vec<String>,
}

/// Read the row count and column names of an existing artifact.
pub fn read_artifact_summary(path: &Path) -> Result<ArtifactSummary, StoreError> {
    let file = File::open(path)?;
    let reader = SerializedFileReader::new(file)?;
    let metadata = reader.metadata().file_metadata();
    let schema = metadata.schema_descr();
    let columns = (0..schema.num_columns())
        .map(|i| schema.column(i).name().to_string())
        .collect();
    Ok(ArtifactSummary {
        rows: metadata.num_rows() as u64,
        columns,
    })
}

/// Confirm a written artifact reads back with the expected shape.
fn verify_artifact(
    path: &Path,
    expected_rows: usize,
    expected_columns: &[&str],
) -> Result<(), StoreError> {
    let summary = read_artifact_summary(path)?;

    if summary.rows != expected_rows as u64 {
        return Err(StoreError::ArtifactVerification {
            path: path.display().to_string(),
            reason: format!("expected {} rows, found {}", expected_rows, summary.rows),
        });
    }
    if summary
        .columns
        .iter()
        .map(String::as_str)
        .ne(expected_columns.iter().copied())
    {
        return Err(StoreError::ArtifactVerification {
            path: path.display().to_string(),
            reason: format!(
                "expected columns {:?}, found {:?}",
                expected_columns, summary.columns
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet::record::Field;
    use popgen_core::PopulationConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn test_table(sources_per_file: u64, n_files: u64) -> PopulationTable {
        let json = format!(
            r#"{{
                "population_name": "bns_pop",
                "output_dir": null,
                "random_seed": 42,
                "sources_per_file": {sources_per_file},
                "n_files": {n_files},
                "parameters": {{
                    "mass": {{ "distribution": "uniform", "min": 1.0, "max": 5.0 }},
                    "distance": {{ "distribution": "log_uniform", "min": 10.0, "max": 400.0 }}
                }}
            }}"#
        );
        let config = PopulationConfig::from_json(&json).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        PopulationTable::generate(&config, 0, &mut rng).unwrap()
    }

    fn artifact_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_two_batches() {
        let tmp = TempDir::new().unwrap();
        let table = test_table(10, 2);

        let metrics = BatchWriter::new(tmp.path(), 10).write(&table).unwrap();

        assert_eq!(metrics.artifacts_written, 2);
        assert_eq!(metrics.rows_written, 20);
        assert!(metrics.file_size_bytes > 0);
        assert_eq!(
            artifact_names(tmp.path()),
            vec![
                "gws000000-gws000009.parquet",
                "gws000010-gws000019.parquet"
            ]
        );
    }

    #[test]
    fn test_artifact_shape_reads_back() {
        let tmp = TempDir::new().unwrap();
        let table = test_table(10, 2);
        BatchWriter::new(tmp.path(), 10).write(&table).unwrap();

        let summary =
            read_artifact_summary(&tmp.path().join("gws000000-gws000009.parquet")).unwrap();

        assert_eq!(summary.rows, 10);
        assert_eq!(summary.columns, vec!["id", "mass", "distance"]);
    }

    #[test]
    fn test_artifact_values_read_back() {
        let tmp = TempDir::new().unwrap();
        let table = test_table(5, 1);
        BatchWriter::new(tmp.path(), 5).write(&table).unwrap();

        let path = tmp.path().join("gws000000-gws000004.parquet");
        let reader = SerializedFileReader::new(File::open(path).unwrap()).unwrap();

        let mut row_index = 0;
        for row in reader.get_row_iter(None).unwrap() {
            let row = row.unwrap();
            for (name, field) in row.get_column_iter() {
                match (name.as_str(), field) {
                    ("id", Field::Str(id)) => assert_eq!(id, table.id(row_index)),
                    ("mass", Field::Double(v)) => {
                        assert_eq!(*v, table.columns()[0].values[row_index]);
                    }
                    ("distance", Field::Double(v)) => {
                        assert_eq!(*v, table.columns()[1].values[row_index]);
                    }
                    other => panic!("unexpected column {other:?}"),
                }
            }
            row_index += 1;
        }
        assert_eq!(row_index, 5);
    }

    #[test]
    fn test_indivisible_rows_fail_before_any_write() {
        let tmp = TempDir::new().unwrap();
        let table = test_table(5, 3);

        let result = BatchWriter::new(tmp.path(), 10).write(&table);

        assert!(matches!(
            result,
            Err(StoreError::IncompleteBatch {
                rows: 15,
                batch_size: 10,
            })
        ));
        assert!(artifact_names(tmp.path()).is_empty());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let tmp = TempDir::new().unwrap();
        let table = test_table(5, 1);

        assert!(matches!(
            BatchWriter::new(tmp.path(), 0).write(&table),
            Err(StoreError::IncompleteBatch { .. })
        ));
    }

    #[test]
    fn test_verification_passes_on_good_artifacts() {
        let tmp = TempDir::new().unwrap();
        let table = test_table(10, 2);

        let metrics = BatchWriter::new(tmp.path(), 10)
            .with_verification(true)
            .write(&table)
            .unwrap();
        assert_eq!(metrics.artifacts_written, 2);
    }

    #[test]
    fn test_no_temporary_files_left_behind() {
        let tmp = TempDir::new().unwrap();
        let table = test_table(10, 2);
        BatchWriter::new(tmp.path(), 10).write(&table).unwrap();

        assert_eq!(artifact_names(tmp.path()).len(), 2);
    }
}
