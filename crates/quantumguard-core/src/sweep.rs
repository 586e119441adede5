//! Sweep Driver: QBER as a function of Eve's interception probability.
//!
//! Each point is an independent [`simulate`] call with only
//! `eve_probability` substituted. When the base parameters carry a seed,
//! every point reuses that same seed. This is intentional: identical seeds
//! give every point the same Alice/Bob bits and bases, so differences along
//! the curve come from Eve alone rather than from independent sampling noise.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::{RunParameters, check_unit_interval};
use crate::protocol::simulate;

/// Probabilities used when the caller does not supply any.
pub const DEFAULT_PROBABILITIES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// One point of the QBER curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub probability: f64,
    pub qber: f64,
}

/// Run the protocol once per probability, preserving input order.
///
/// `params.eve_probability` is ignored; `None` uses [`DEFAULT_PROBABILITIES`].
/// Every probability is validated before the first run starts.
pub fn sweep(params: &RunParameters, probabilities: Option<&[f64]>) -> Result<Vec<SweepPoint>> {
    let probabilities = probabilities.unwrap_or(&DEFAULT_PROBABILITIES);
    for &p in probabilities {
        check_unit_interval("eve_probability", p)?;
    }

    let mut points = Vec::with_capacity(probabilities.len());
    for &probability in probabilities {
        let result = simulate(&params.with_eve_probability(probability))?;
        log::info!(
            "sweep point p={probability:.2}: qber={:.4} ({} sifted)",
            result.qber,
            result.n_sifted()
        );
        points.push(SweepPoint {
            probability,
            qber: result.qber,
        });
    }
    Ok(points)
}
