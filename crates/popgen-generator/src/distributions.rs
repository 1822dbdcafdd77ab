//! Named distribution shapes and the sampling entry point.
//!
//! Configuration files refer to distributions by name; resolution is a
//! plain lookup and an unrecognized name fails before any file I/O.
//! Every supported shape is a transform of a closed-interval uniform
//! draw, so a caller-owned [`rand::Rng`] is the only source of
//! randomness.

use rand::Rng;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::GeneratorError;

/// Supported distribution shapes, keyed by configuration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// Uniform on `[min, max]`
    Uniform,

    /// Log-uniform on `[min, max]`; requires `min > 0`
    LogUniform,

    /// Density proportional to `cos(x)`: uniform in `sin(x)`.
    /// Declination-style sampling; bounds within `[-pi/2, pi/2]`.
    UniformSin,

    /// Density proportional to `sin(x)`: uniform in `cos(x)`.
    /// Inclination-style sampling; bounds within `[0, pi]`.
    UniformCos,
}

impl Distribution {
    /// Resolve a distribution from its configuration name.
    pub fn from_name(name: &str) -> Result<Self, GeneratorError> {
        match name {
            "uniform" => Ok(Self::Uniform),
            "log_uniform" => Ok(Self::LogUniform),
            "uniform_sin" => Ok(Self::UniformSin),
            "uniform_cos" => Ok(Self::UniformCos),
            _ => Err(GeneratorError::UnknownDistribution(name.to_string())),
        }
    }

    /// The configuration name of this distribution.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::LogUniform => "log_uniform",
            Self::UniformSin => "uniform_sin",
            Self::UniformCos => "uniform_cos",
        }
    }

    fn check_bounds(self, min: f64, max: f64) -> Result<(), GeneratorError> {
        let ok = match self {
            Self::Uniform => min <= max,
            Self::LogUniform => 0.0 < min && min <= max,
            Self::UniformSin => -FRAC_PI_2 <= min && min <= max && max <= FRAC_PI_2,
            Self::UniformCos => 0.0 <= min && min <= max && max <= PI,
        };
        if ok {
            Ok(())
        } else {
            Err(GeneratorError::InvalidBounds {
                distribution: self.name(),
                min,
                max,
            })
        }
    }
}

/// Draw `count` values from the named distribution on `[min, max]`.
///
/// The caller owns the RNG and its seeding; two runs with the same seed
/// and the same call sequence produce identical output. Both bounds are
/// treated as inclusive, so `min == max` yields a constant column.
pub fn sample<R: Rng>(
    rng: &mut R,
    distribution: &str,
    min: f64,
    max: f64,
    count: usize,
) -> Result<Vec<f64>, GeneratorError> {
    let distribution = Distribution::from_name(distribution)?;
    distribution.check_bounds(min, max)?;

    let values = match distribution {
        Distribution::Uniform => (0..count).map(|_| rng.gen_range(min..=max)).collect(),
        Distribution::LogUniform => {
            let (lo, hi) = (min.ln(), max.ln());
            (0..count).map(|_| rng.gen_range(lo..=hi).exp()).collect()
        }
        Distribution::UniformSin => {
            let (lo, hi) = (min.sin(), max.sin());
            (0..count).map(|_| rng.gen_range(lo..=hi).asin()).collect()
        }
        Distribution::UniformCos => {
            // cos is decreasing on [0, pi], so the transformed interval flips
            let (lo, hi) = (max.cos(), min.cos());
            (0..count).map(|_| rng.gen_range(lo..=hi).acos()).collect()
        }
    };

    Ok(values)
}
