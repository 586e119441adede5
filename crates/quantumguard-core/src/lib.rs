//! # quantumguard-core
//!
//! **BB84 quantum key distribution, simulated end to end.**
//!
//! `quantumguard-core` runs the BB84 protocol over a classical model of
//! projective measurement, with an optional intercept-resend eavesdropper,
//! and decides whether the resulting key can be trusted.
//!
//! ## Quick Start
//!
//! ```
//! use quantumguard_core::{RunParameters, simulate};
//!
//! let params = RunParameters {
//!     n_bits: 128,
//!     eve_probability: 0.5,
//!     sample_fraction: 0.2,
//!     qber_threshold: 0.11,
//!     seed: Some(42),
//! };
//!
//! let run = simulate(&params).unwrap();
//! println!("sifted {} bits, qber {:.3}: {}", run.n_sifted(), run.qber, run.decision);
//! assert_eq!(run.final_key_bits.len() + run.sample_positions.len(), run.n_sifted());
//! ```
//!
//! ## Architecture
//!
//! RandomSource → prepare / intercept / measure → sift → sample QBER → decide
//!
//! - [`rng`]: per-run seeded or entropy-keyed random stream.
//! - [`protocol`]: the engine, producing an immutable [`RunResult`].
//! - [`sweep`]: QBER against Eve's interception probability.
//! - [`export`]: bit-string, hex, CSV and JSON renderings of a run.
//! - [`quality`]: frequency and runs checks on the final key.
//!
//! Nothing here is shared between runs. Each call owns its random stream, so
//! runs are reproducible from their seed and safe to execute in parallel.

pub mod error;
pub mod export;
pub mod params;
pub mod protocol;
pub mod quality;
pub mod rng;
pub mod sweep;
pub mod timestamp;

pub use error::{QgError, Result};
pub use export::{ExportBundle, bits_to_hex, bits_to_string, key_table_csv, sweep_csv};
pub use params::RunParameters;
pub use protocol::{Basis, Decision, QberMode, RunResult, simulate, simulate_with};
pub use quality::{KeyCheck, check_key};
pub use rng::RandomSource;
pub use sweep::{DEFAULT_PROBABILITIES, SweepPoint, sweep};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
