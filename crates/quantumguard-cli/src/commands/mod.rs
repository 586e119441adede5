pub mod run;
pub mod sweep;
pub mod theory;

use std::path::Path;

use clap::Args;
use quantumguard_core::{QgError, Result, RunParameters};

/// Protocol parameters shared by `run` and `sweep`.
///
/// A `--config` JSON file supplies the base; explicit flags override it.
#[derive(Args, Debug, Default, Clone)]
pub struct ParamArgs {
    /// JSON parameter file (fields: n_bits, eve_probability, sample_fraction, qber_threshold, seed)
    #[arg(long)]
    pub config: Option<String>,

    /// Number of qubits Alice sends
    #[arg(long, short = 'n')]
    pub n_bits: Option<usize>,

    /// Probability that Eve intercepts each qubit, in [0, 1]
    #[arg(long = "eve")]
    pub eve_probability: Option<f64>,

    /// Disable the eavesdropper (forces --eve 0)
    #[arg(long)]
    pub no_eve: bool,

    /// Fraction of the sifted key revealed for QBER, in [0, 1]; 0 measures the whole sift
    #[arg(long)]
    pub sample_fraction: Option<f64>,

    /// Highest QBER at which the key is accepted, in [0, 1]
    #[arg(long = "threshold")]
    pub qber_threshold: Option<f64>,

    /// Random seed for a reproducible run (0 = fresh system entropy)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Merge config file, defaults and flags into validated run parameters.
pub fn resolve_params(args: &ParamArgs) -> Result<RunParameters> {
    let mut params = match &args.config {
        Some(path) => RunParameters::load(Path::new(path))?,
        None => RunParameters::default(),
    };

    if let Some(n) = args.n_bits {
        params.n_bits = n;
    }
    if let Some(p) = args.eve_probability {
        params.eve_probability = p;
    }
    if args.no_eve {
        params.eve_probability = 0.0;
    }
    if let Some(f) = args.sample_fraction {
        params.sample_fraction = f;
    }
    if let Some(t) = args.qber_threshold {
        params.qber_threshold = t;
    }
    if let Some(seed) = args.seed {
        params.seed = (seed != 0).then_some(seed);
    }

    if params.n_bits == 0 {
        return Err(QgError::InvalidParameter {
            name: "n_bits",
            value: 0.0,
            reason: "must be a positive number of qubits",
        });
    }
    params.validate()?;
    log::debug!("resolved parameters: {params:?}");
    Ok(params)
}

/// Horizontal bar for a value in [0, 1].
pub fn bar(value: f64, width: usize) -> String {
    let filled = (value.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(width - filled))
}
