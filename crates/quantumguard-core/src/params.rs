//! Run parameters: defaults, validation, and JSON parameter files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QgError, Result};

pub const DEFAULT_N_BITS: usize = 256;
pub const DEFAULT_EVE_PROBABILITY: f64 = 0.5;
pub const DEFAULT_SAMPLE_FRACTION: f64 = 0.2;
pub const DEFAULT_QBER_THRESHOLD: f64 = 0.11;

/// Inputs to one protocol run. Immutable for the duration of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParameters {
    /// Number of qubits Alice sends. Zero is accepted and yields an empty run.
    pub n_bits: usize,
    /// Per-qubit probability that Eve intercepts and resends.
    pub eve_probability: f64,
    /// Fraction of the sifted key revealed to estimate QBER. `0.0` disables
    /// sampling and measures QBER over the whole sifted key.
    pub sample_fraction: f64,
    /// Maximum QBER at which the key is still accepted.
    pub qber_threshold: f64,
    /// Fixed seed for a reproducible run; `None` draws from system entropy.
    pub seed: Option<u64>,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            n_bits: DEFAULT_N_BITS,
            eve_probability: DEFAULT_EVE_PROBABILITY,
            sample_fraction: DEFAULT_SAMPLE_FRACTION,
            qber_threshold: DEFAULT_QBER_THRESHOLD,
            seed: None,
        }
    }
}

impl RunParameters {
    /// Copy of these parameters with a different interception probability.
    pub fn with_eve_probability(&self, eve_probability: f64) -> Self {
        Self {
            eve_probability,
            ..self.clone()
        }
    }

    /// Reject out-of-range inputs instead of clamping them.
    ///
    /// The accept/abort decision is security relevant, so a misconfigured
    /// threshold or fraction must surface as an error rather than be silently
    /// coerced into range.
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("eve_probability", self.eve_probability)?;
        check_unit_interval("sample_fraction", self.sample_fraction)?;
        check_unit_interval("qber_threshold", self.qber_threshold)?;
        Ok(())
    }

    /// Read parameters from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&data)?;
        params.validate()?;
        Ok(params)
    }
}

/// Validate a value that must lie in `[0, 1]`.
pub(crate) fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(QgError::invalid(name, value, "must be a finite number"));
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(QgError::invalid(name, value, "must be within [0, 1]"));
    }
    Ok(())
}
