//! In-memory population table assembly.

use popgen_core::{format_source_id, PopulationConfig, MAX_SOURCE_INDEX};
use rand::Rng;
use std::ops::Range;

use crate::distributions;
use crate::GeneratorError;

/// Name of the identifier column, always first in every table.
pub const ID_COLUMN: &str = "id";

/// One named column of sampled values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name (the configured parameter name)
    pub name: String,

    /// One value per source, in row order
    pub values: Vec<f64>,
}

/// In-memory table of generated sources.
///
/// One row per source; the identifier column always comes first and
/// parameter columns follow in configuration declaration order. The
/// table exists only for the duration of one run — persistent state
/// lives entirely in the written batch artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationTable {
    ids: Vec<String>,
    columns: Vec<Column>,
}

impl PopulationTable {
    /// Generate a table of `sources_per_file * n_files` rows whose
    /// identifiers start at `first_index`.
    ///
    /// Each configured parameter triggers exactly one sampler call with
    /// the full row count, so the draw sequence is a deterministic
    /// function of the seed, the parameter order, and the row count.
    pub fn generate<R: Rng>(
        config: &PopulationConfig,
        first_index: u64,
        rng: &mut R,
    ) -> Result<Self, GeneratorError> {
        let count = config.total_sources();

        if first_index > MAX_SOURCE_INDEX || count > MAX_SOURCE_INDEX - first_index + 1 {
            return Err(GeneratorError::IdentifierOverflow { first_index, count });
        }

        let mut columns = Vec::with_capacity(config.parameters.len());
        for parameter in config.parameters.iter() {
            let values = distributions::sample(
                rng,
                &parameter.spec.distribution,
                parameter.spec.min,
                parameter.spec.max,
                count as usize,
            )?;
            columns.push(Column {
                name: parameter.name.clone(),
                values,
            });
        }

        let ids = (first_index..first_index + count)
            .map(format_source_id)
            .collect();

        Ok(Self { ids, columns })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.ids.len()
    }

    /// Column names, identifier first.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names = vec![ID_COLUMN];
        names.extend(self.columns.iter().map(|c| c.name.as_str()));
        names
    }

    /// All identifiers, in row order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Parameter columns, in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Identifier of one row.
    pub fn id(&self, row: usize) -> &str {
        &self.ids[row]
    }

    /// Borrow a contiguous row range as a batch view.
    pub fn slice(&self, rows: Range<usize>) -> TableSlice<'_> {
        TableSlice { table: self, rows }
    }
}

/// Borrowed view over a contiguous row range of a [`PopulationTable`].
#[derive(Debug, Clone)]
pub struct TableSlice<'a> {
    table: &'a PopulationTable,
    rows: Range<usize>,
}

impl TableSlice<'_> {
    /// Number of rows in the slice.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Identifier of the first row.
    pub fn first_id(&self) -> &str {
        self.table.id(self.rows.start)
    }

    /// Identifier of the last row.
    pub fn last_id(&self) -> &str {
        self.table.id(self.rows.end - 1)
    }

    /// Identifiers of the sliced rows.
    pub fn ids(&self) -> &[String] {
        &self.table.ids[self.rows.clone()]
    }

    /// Parameter columns restricted to the sliced rows.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), &c.values[self.rows.clone()]))
    }
}
