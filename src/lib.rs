//! gw-popgen library
//!
//! Generates synthetic parameter sets for a population of simulated
//! gravitational-wave sources. A JSON configuration maps each physical
//! parameter to a named distribution with bounds; the generated
//! population is split into fixed-size Parquet artifacts under
//! `<output_dir>/sources_parameters/`. Pointing a later run at the same
//! output directory extends the population, continuing source numbering
//! after the last artifact found.
//!
//! # Pipeline
//!
//! ```text
//! PopulationConfig (JSON)
//!        │
//!        ▼
//! resolve_continuation ──► next_index
//!        │
//!        ▼
//! PopulationTable::generate (seeded StdRng)
//!        │
//!        ▼
//! BatchWriter ──► sources_parameters/gws000000-gws000009.parquet, ...
//! ```

use anyhow::Context;
use chrono::Local;
use popgen_core::PopulationConfig;
use popgen_generator::PopulationTable;
use popgen_store::{resolve_continuation, BatchWriter, WriteMetrics};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of one generation run.
#[derive(Debug)]
pub struct RunSummary {
    /// Population directory the artifacts were written under
    pub output_dir: PathBuf,

    /// Index of the first source generated in this run
    pub first_index: u64,

    /// Write metrics across all batches
    pub metrics: WriteMetrics,
}

/// Execute one generation run.
///
/// `output_override` takes precedence over the configuration's
/// `output_dir`; when both are absent a fresh dated population
/// directory is created under the working directory. With `verify`
/// set, each artifact is re-opened after writing and its row count and
/// column set are checked.
pub fn run(
    config_path: &Path,
    output_override: Option<&Path>,
    verify: bool,
) -> anyhow::Result<RunSummary> {
    let config = PopulationConfig::from_file(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let output_dir = resolve_output_dir(&config, output_override)?;
    info!("Population directory: {}", output_dir.display());

    let continuation = resolve_continuation(&output_dir).with_context(|| {
        format!(
            "Failed to resolve continuation state in {}",
            output_dir.display()
        )
    })?;

    // Offsetting the seed by the starting index keeps one run
    // reproducible while continuation runs draw fresh values.
    let seed = config.random_seed.wrapping_add(continuation.next_index);
    let mut rng = StdRng::seed_from_u64(seed);
    debug!("Seeded RNG with {} (base seed {})", seed, config.random_seed);

    info!(
        "Generating {} sources ({} files x {} sources per file) starting at index {}",
        config.total_sources(),
        config.n_files,
        config.sources_per_file,
        continuation.next_index
    );

    let table = PopulationTable::generate(&config, continuation.next_index, &mut rng)
        .context("Failed to generate population table")?;

    let metrics = BatchWriter::new(&continuation.parameter_dir, config.sources_per_file as usize)
        .with_verification(verify)
        .write(&table)
        .context("Failed to write batch artifacts")?;

    info!(
        "Sources parameters files have been successfully created: {} artifact(s), {} rows in {:?}",
        metrics.artifacts_written, metrics.rows_written, metrics.total_duration
    );

    Ok(RunSummary {
        output_dir,
        first_index: continuation.next_index,
        metrics,
    })
}

/// Pick the population directory for this run and make sure it exists.
fn resolve_output_dir(
    config: &PopulationConfig,
    output_override: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    let output_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => match &config.output_dir {
            Some(dir) => dir.clone(),
            None => {
                let dated = format!(
                    "GWsim_{}_{}",
                    config.population_name,
                    Local::now().format("%Y%m%d")
                );
                debug!("Output directory set to {dated}");
                PathBuf::from(dated)
            }
        },
    };

    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            output_dir.display()
        )
    })?;
    Ok(output_dir)
}
