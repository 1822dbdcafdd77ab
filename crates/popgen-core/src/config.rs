//! Population configuration loaded from a JSON file.
//!
//! The configuration names the population, points at an output
//! directory (or `null` to request a fresh one), fixes the random seed
//! and batch geometry, and maps each physical parameter to a named
//! distribution with bounds. Parameter declaration order is preserved
//! because it becomes the column order of the generated tables.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing JSON
    #[error("Failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field that parsed but holds an unusable value
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// The same parameter name declared more than once
    #[error("Parameter '{0}' is declared more than once")]
    DuplicateParameter(String),
}

/// Distribution and bounds for one physical parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Named distribution shape, resolved by the sampler
    pub distribution: String,

    /// Lower bound (inclusive)
    pub min: f64,

    /// Upper bound (inclusive)
    pub max: f64,
}

/// One named parameter together with its sampling spec.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    /// Parameter name, used as the column name
    pub name: String,

    /// How to sample it
    pub spec: ParameterSpec,
}

/// Parameter declarations in configuration order.
///
/// The JSON document carries parameters as an object; a streaming
/// deserializer visits object entries in document order, so collecting
/// them into a `Vec` preserves the declaration order that later becomes
/// the table's column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameters(Vec<ParameterDefinition>);

impl Parameters {
    /// Create from an ordered list of definitions.
    pub fn new(parameters: Vec<ParameterDefinition>) -> Self {
        Self(parameters)
    }

    /// Iterate definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.0.iter()
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name.as_str()).collect()
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for parameter in &self.0 {
            map.serialize_entry(&parameter.name, &parameter.spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParametersVisitor;

        impl<'de> Visitor<'de> for ParametersVisitor {
            type Value = Parameters;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of parameter name to distribution spec")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut parameters = Vec::new();
                while let Some((name, spec)) = map.next_entry::<String, ParameterSpec>()? {
                    parameters.push(ParameterDefinition { name, spec });
                }
                Ok(Parameters(parameters))
            }
        }

        deserializer.deserialize_map(ParametersVisitor)
    }
}

/// Population generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Population name, used for the default output directory
    pub population_name: String,

    /// Existing population directory to extend; `null` requests a new one
    pub output_dir: Option<PathBuf>,

    /// Base random seed
    pub random_seed: u64,

    /// Number of sources stored in each output file
    pub sources_per_file: u64,

    /// Number of output files to produce in this run
    pub n_files: u64,

    /// Parameter name to distribution spec, in declaration order
    pub parameters: Parameters,
}

impl PopulationConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Total number of sources generated in one run.
    pub fn total_sources(&self) -> u64 {
        self.sources_per_file * self.n_files
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.population_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "population_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.sources_per_file == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sources_per_file".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.n_files == 0 {
            return Err(ConfigError::InvalidValue {
                field: "n_files".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.sources_per_file.checked_mul(self.n_files).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "sources_per_file".to_string(),
                reason: "sources_per_file * n_files overflows".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for parameter in self.parameters.iter() {
            if !seen.insert(parameter.name.as_str()) {
                return Err(ConfigError::DuplicateParameter(parameter.name.clone()));
            }
            let spec = &parameter.spec;
            if !spec.min.is_finite() || !spec.max.is_finite() || spec.min > spec.max {
                return Err(ConfigError::InvalidValue {
                    field: parameter.name.clone(),
                    reason: format!("bounds [{}, {}] are not a valid interval", spec.min, spec.max),
                });
            }
        }

        Ok(())
    }
}
