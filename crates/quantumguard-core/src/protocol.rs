//! BB84 protocol engine with an intercept-resend eavesdropper.
//!
//! The engine models the classical information flow implied by projective
//! measurement, not quantum states:
//!
//! ```text
//! Alice (bit, basis) ─▶ [Eve? measure + resend] ─▶ Bob (basis) ─▶ result
//! ```
//!
//! Measuring in the basis a qubit was prepared in returns the prepared bit.
//! Measuring in the other basis returns a fair coin flip. Eve goes through the
//! same rule, and Bob then measures the qubit Eve re-prepared, so every wrong
//! Eve basis guess that survives sifting is a 50% chance of a bit error. That
//! is the statistical footprint the QBER check looks for.
//!
//! # Draw order
//!
//! For `n` qubits the run draws, in this order: Alice's bits, Alice's bases,
//! Bob's bases, one uniform per qubit for Eve's Bernoulli trial, Eve's bases
//! (for every qubit, used only where she acted), then the per-qubit coin flips
//! for basis mismatches in ascending qubit order, and finally the QBER sample.
//! Changing this order changes which draw pairs with which qubit and breaks
//! seeded reproducibility.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::RunParameters;
use crate::rng::RandomSource;
use crate::timestamp::now_iso8601;

/// Measurement/preparation basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Computational basis: |0⟩, |1⟩.
    Z,
    /// Hadamard basis: |+⟩, |−⟩.
    X,
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Z => write!(f, "Z"),
            Self::X => write!(f, "X"),
        }
    }
}

/// Outcome of the QBER threshold check.
///
/// Serialized as the report labels existing consumers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "Secure (Accept Key)")]
    Accept,
    #[serde(rename = "Eavesdropping Detected (Abort)")]
    Abort,
}

impl Decision {
    /// `Accept` iff `qber <= threshold`. Equality accepts.
    pub fn from_qber(qber: f64, threshold: f64) -> Self {
        if qber <= threshold {
            Self::Accept
        } else {
            Self::Abort
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Accept => "Secure (Accept Key)",
            Self::Abort => "Eavesdropping Detected (Abort)",
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the reported QBER was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QberMode {
    /// No sifted bits: QBER is 0.0 by convention and the key is empty.
    NoSiftedBits,
    /// A random sample of the sifted key was revealed and withheld from the key.
    Sampled,
    /// `sample_fraction == 0`: QBER over the entire sifted key, and the entire
    /// sifted key is kept. An inspection mode; nothing is withheld.
    WholeSift,
}

/// Complete record of one protocol run. Never mutated after [`simulate`] returns.
///
/// Per-qubit vectors are parallel and indexed by qubit position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub params: RunParameters,
    pub alice_bits: Vec<u8>,
    pub alice_bases: Vec<Basis>,
    pub bob_bases: Vec<Basis>,
    pub bob_results: Vec<u8>,
    pub eve_acted: Vec<bool>,
    /// Eve's basis per qubit; only meaningful where `eve_acted[i]`.
    pub eve_bases: Vec<Basis>,
    /// Ascending qubit positions where Alice's and Bob's bases agree.
    pub sift_indices: Vec<usize>,
    pub sifted_alice: Vec<u8>,
    pub sifted_bob: Vec<u8>,
    /// Indices into the sifted arrays, in draw order.
    pub sample_positions: Vec<usize>,
    pub qber_mode: QberMode,
    /// Disagreements counted while computing `qber`.
    pub sample_errors: usize,
    pub qber: f64,
    pub final_key_bits: Vec<u8>,
    pub final_key_global_indices: Vec<usize>,
    pub decision: Decision,
    pub timestamp: String,
}

impl RunResult {
    pub fn n_sifted(&self) -> usize {
        self.sift_indices.len()
    }

    /// `(matches, mismatches)` between Alice's and Bob's bases.
    pub fn basis_match_counts(&self) -> (usize, usize) {
        let matches = self.sift_indices.len();
        (matches, self.alice_bases.len() - matches)
    }

    /// Number of qubits Eve intercepted.
    pub fn intercepted_count(&self) -> usize {
        self.eve_acted.iter().filter(|&&acted| acted).count()
    }
}

/// Run one BB84 exchange with a fresh [`RandomSource`] built from `params.seed`.
///
/// Parameters are validated before any randomness is drawn.
pub fn simulate(params: &RunParameters) -> Result<RunResult> {
    params.validate()?;
    let mut rng = RandomSource::new(params.seed);
    Ok(run_with(params, &mut rng))
}

/// Run one exchange drawing from a caller-owned source instead of `params.seed`.
///
/// The recorded `RunResult.params.seed` is the source's seed, so a seeded
/// source replays through [`simulate`] and an entropy source records `None`.
pub fn simulate_with(params: &RunParameters, rng: &mut RandomSource) -> Result<RunResult> {
    params.validate()?;
    Ok(run_with(params, rng))
}

fn run_with(params: &RunParameters, rng: &mut RandomSource) -> RunResult {
    let n = params.n_bits;

    let alice_bits = rng.bits(n);
    let alice_bases = rng.bases(n);
    let bob_bases = rng.bases(n);
    let eve_acted: Vec<bool> = rng
        .units(n)
        .into_iter()
        .map(|u| u < params.eve_probability)
        .collect();
    let eve_bases = rng.bases(n);

    let bob_results: Vec<u8> = (0..n)
        .map(|i| {
            if eve_acted[i] {
                let eve_bit = measure(alice_bits[i], alice_bases[i], eve_bases[i], rng);
                measure(eve_bit, eve_bases[i], bob_bases[i], rng)
            } else {
                measure(alice_bits[i], alice_bases[i], bob_bases[i], rng)
            }
        })
        .collect();

    let sift_indices: Vec<usize> = (0..n).filter(|&i| alice_bases[i] == bob_bases[i]).collect();
    let sifted_alice: Vec<u8> = sift_indices.iter().map(|&i| alice_bits[i]).collect();
    let sifted_bob: Vec<u8> = sift_indices.iter().map(|&i| bob_results[i]).collect();

    let estimate = estimate_qber(&sifted_alice, &sifted_bob, params.sample_fraction, rng);

    let (final_key_bits, final_key_global_indices): (Vec<u8>, Vec<usize>) = match estimate.mode {
        QberMode::Sampled => {
            let mut revealed = vec![false; sift_indices.len()];
            for &p in &estimate.sample_positions {
                revealed[p] = true;
            }
            (0..sift_indices.len())
                .filter(|&k| !revealed[k])
                .map(|k| (sifted_alice[k], sift_indices[k]))
                .unzip()
        }
        QberMode::WholeSift => (sifted_alice.clone(), sift_indices.clone()),
        QberMode::NoSiftedBits => (Vec::new(), Vec::new()),
    };

    let decision = Decision::from_qber(estimate.qber, params.qber_threshold);

    log::debug!(
        "bb84 run: n_bits={} sifted={} sample={} errors={} qber={:.4} mode={:?} decision={}",
        n,
        sift_indices.len(),
        estimate.sample_positions.len(),
        estimate.errors,
        estimate.qber,
        estimate.mode,
        decision
    );

    RunResult {
        params: RunParameters {
            seed: rng.seed(),
            ..params.clone()
        },
        alice_bits,
        alice_bases,
        bob_bases,
        bob_results,
        eve_acted,
        eve_bases,
        sift_indices,
        sifted_alice,
        sifted_bob,
        sample_positions: estimate.sample_positions,
        qber_mode: estimate.mode,
        sample_errors: estimate.errors,
        qber: estimate.qber,
        final_key_bits,
        final_key_global_indices,
        decision,
        timestamp: now_iso8601(),
    }
}

/// Projective measurement of a classically described qubit.
///
/// Same basis returns the prepared bit; the other basis returns a fair coin
/// flip, which is the only place a mismatch consumes a draw.
fn measure(prepared_bit: u8, prepared: Basis, measured: Basis, rng: &mut RandomSource) -> u8 {
    if prepared == measured {
        prepared_bit
    } else {
        rng.bit()
    }
}

struct QberEstimate {
    mode: QberMode,
    sample_positions: Vec<usize>,
    errors: usize,
    qber: f64,
}

/// Sample size for a positive fraction: `floor(fraction * n_sifted)`, never
/// below one.
pub fn sample_size(sample_fraction: f64, n_sifted: usize) -> usize {
    if sample_fraction <= 0.0 || n_sifted == 0 {
        return 0;
    }
    ((sample_fraction * n_sifted as f64).floor() as usize).clamp(1, n_sifted)
}

fn estimate_qber(
    sifted_alice: &[u8],
    sifted_bob: &[u8],
    sample_fraction: f64,
    rng: &mut RandomSource,
) -> QberEstimate {
    let n_sifted = sifted_alice.len();
    if n_sifted == 0 {
        log::warn!("no sifted bits; reporting qber = 0 with an empty key");
        return QberEstimate {
            mode: QberMode::NoSiftedBits,
            sample_positions: Vec::new(),
            errors: 0,
            qber: 0.0,
        };
    }

    let size = sample_size(sample_fraction, n_sifted);
    if size == 0 {
        // Whole-sift mode: qber covers every sifted bit and nothing is withheld.
        log::warn!("sampling disabled; qber measured over the whole sifted key of {n_sifted} bits");
        let errors = count_disagreements(sifted_alice, sifted_bob, 0..n_sifted);
        return QberEstimate {
            mode: QberMode::WholeSift,
            sample_positions: Vec::new(),
            errors,
            qber: errors as f64 / n_sifted as f64,
        };
    }

    let sample_positions = rng.sample_without_replacement(n_sifted, size);
    let errors = count_disagreements(sifted_alice, sifted_bob, sample_positions.iter().copied());
    QberEstimate {
        mode: QberMode::Sampled,
        sample_positions,
        errors,
        qber: errors as f64 / size as f64,
    }
}

fn count_disagreements(
    a: &[u8],
    b: &[u8],
    positions: impl IntoIterator<Item = usize>,
) -> usize {
    positions.into_iter().filter(|&k| a[k] != b[k]).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(n_bits: usize, eve: f64, fraction: f64, seed: u64) -> RunParameters {
        RunParameters {
            n_bits,
            eve_probability: eve,
            sample_fraction: fraction,
            qber_threshold: 0.11,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_decision_boundary_accepts_equal() {
        assert_eq!(Decision::from_qber(0.11, 0.11), Decision::Accept);
        assert_eq!(Decision::from_qber(0.1100001, 0.11), Decision::Abort);
        assert_eq!(Decision::from_qber(0.0, 0.0), Decision::Accept);
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(Decision::Accept.to_string(), "Secure (Accept Key)");
        assert_eq!(Decision::Abort.to_string(), "Eavesdropping Detected (Abort)");
        assert_eq!(
            serde_json::to_string(&Decision::Abort).unwrap(),
            "\"Eavesdropping Detected (Abort)\""
        );
    }

    #[test]
    fn test_basis_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Basis::X).unwrap(), "\"X\"");
        assert_eq!(Basis::Z.to_string(), "Z");
    }

    #[test]
    fn test_sample_size_floor_and_minimum() {
        assert_eq!(sample_size(0.2, 100), 20);
        assert_eq!(sample_size(0.2, 9), 1);
        assert_eq!(sample_size(0.01, 3), 1);
        assert_eq!(sample_size(0.0, 100), 0);
        assert_eq!(sample_size(0.5, 0), 0);
        assert_eq!(sample_size(1.0, 7), 7);
    }

    #[test]
    fn test_measure_same_basis_is_faithful() {
        let mut rng = RandomSource::seeded(0);
        for bit in [0u8, 1] {
            for basis in [Basis::Z, Basis::X] {
                assert_eq!(measure(bit, basis, basis, &mut rng), bit);
            }
        }
    }

    #[test]
    fn test_measure_other_basis_is_coin_flip() {
        let mut rng = RandomSource::seeded(1);
        let ones: usize = (0..4000)
            .map(|_| measure(1, Basis::Z, Basis::X, &mut rng) as usize)
            .sum();
        assert!((1800..=2200).contains(&ones), "ones = {ones}");
    }

    #[test]
    fn test_zero_qubits() {
        let r = simulate(&params(0, 0.5, 0.2, 1)).unwrap();
        assert!(r.alice_bits.is_empty());
        assert!(r.sift_indices.is_empty());
        assert!(r.final_key_bits.is_empty());
        assert!(r.sample_positions.is_empty());
        assert_eq!(r.qber, 0.0);
        assert_eq!(r.qber_mode, QberMode::NoSiftedBits);
        assert_eq!(r.decision, Decision::Accept);
    }

    #[test]
    fn test_parallel_sequences_have_run_length() {
        let r = simulate(&params(300, 0.3, 0.2, 2)).unwrap();
        assert_eq!(r.alice_bits.len(), 300);
        assert_eq!(r.alice_bases.len(), 300);
        assert_eq!(r.bob_bases.len(), 300);
        assert_eq!(r.bob_results.len(), 300);
        assert_eq!(r.eve_acted.len(), 300);
        assert_eq!(r.eve_bases.len(), 300);
        assert_eq!(r.sifted_alice.len(), r.sift_indices.len());
        assert_eq!(r.sifted_bob.len(), r.sift_indices.len());
    }

    #[test]
    fn test_sift_indices_strictly_increasing_and_matching() {
        let r = simulate(&params(500, 0.5, 0.2, 3)).unwrap();
        assert!(r.sift_indices.windows(2).all(|w| w[0] < w[1]));
        for &i in &r.sift_indices {
            assert_eq!(r.alice_bases[i], r.bob_bases[i]);
        }
        let (matches, mismatches) = r.basis_match_counts();
        assert_eq!(matches + mismatches, 500);
    }

    #[test]
    fn test_sample_and_key_partition_sifted_set() {
        let r = simulate(&params(512, 0.5, 0.25, 4)).unwrap();
        assert_eq!(r.qber_mode, QberMode::Sampled);
        assert_eq!(
            r.sample_positions.len(),
            sample_size(0.25, r.n_sifted())
        );
        assert_eq!(
            r.final_key_bits.len() + r.sample_positions.len(),
            r.n_sifted()
        );
        let mut covered: Vec<usize> = r
            .sample_positions
            .iter()
            .map(|&k| r.sift_indices[k])
            .chain(r.final_key_global_indices.iter().copied())
            .collect();
        covered.sort_unstable();
        assert_eq!(covered, r.sift_indices);
        for (bit, &i) in r.final_key_bits.iter().zip(&r.final_key_global_indices) {
            assert_eq!(*bit, r.alice_bits[i]);
        }
    }

    #[test]
    fn test_qber_matches_sample_errors() {
        let r = simulate(&params(1024, 1.0, 0.5, 5)).unwrap();
        let errors = r
            .sample_positions
            .iter()
            .filter(|&&k| r.sifted_alice[k] != r.sifted_bob[k])
            .count();
        assert_eq!(errors, r.sample_errors);
        assert_eq!(r.qber, errors as f64 / r.sample_positions.len() as f64);
    }

    #[test]
    fn test_whole_sift_mode_keeps_everything() {
        let r = simulate(&params(400, 1.0, 0.0, 6)).unwrap();
        assert_eq!(r.qber_mode, QberMode::WholeSift);
        assert!(r.sample_positions.is_empty());
        assert_eq!(r.final_key_bits, r.sifted_alice);
        assert_eq!(r.final_key_global_indices, r.sift_indices);
        let errors = r
            .sifted_alice
            .iter()
            .zip(&r.sifted_bob)
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(r.qber, errors as f64 / r.n_sifted() as f64);
    }

    #[test]
    fn test_no_eve_no_errors() {
        for seed in 0..20 {
            let r = simulate(&params(256, 0.0, 0.2, seed)).unwrap();
            assert_eq!(r.sifted_alice, r.sifted_bob, "seed {seed}");
            assert_eq!(r.qber, 0.0);
            assert_eq!(r.intercepted_count(), 0);
            assert!(r.decision.is_accept());
        }
    }

    #[test]
    fn test_full_interception_marks_every_qubit() {
        let r = simulate(&params(128, 1.0, 0.2, 7)).unwrap();
        assert_eq!(r.intercepted_count(), 128);
    }

    #[test]
    fn test_eve_matching_basis_is_invisible() {
        // Where Eve guessed Alice's basis and Bob sifted, Bob must agree with Alice.
        let r = simulate(&params(2000, 1.0, 0.2, 8)).unwrap();
        for &i in &r.sift_indices {
            if r.eve_bases[i] == r.alice_bases[i] {
                assert_eq!(r.bob_results[i], r.alice_bits[i], "qubit {i}");
            }
        }
    }

    #[test]
    fn test_seeded_runs_identical() {
        let p = params(256, 0.5, 0.2, 42);
        let a = simulate(&p).unwrap();
        let mut b = simulate(&p).unwrap();
        b.timestamp = a.timestamp.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_params_rejected_before_run() {
        let p = RunParameters {
            sample_fraction: -0.5,
            ..Default::default()
        };
        assert!(simulate(&p).is_err());
    }

    #[test]
    fn test_simulate_with_external_source_matches_seeded() {
        let p = params(200, 0.4, 0.2, 99);
        let a = simulate(&p).unwrap();
        let mut rng = RandomSource::seeded(99);
        let mut b = simulate_with(&p, &mut rng).unwrap();
        b.timestamp = a.timestamp.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_simulate_with_records_source_seed() {
        let p = params(200, 0.4, 0.2, 1);
        let mut rng = RandomSource::seeded(7);
        let run = simulate_with(&p, &mut rng).unwrap();
        assert_eq!(run.params.seed, Some(7));
        assert_eq!(run.params.n_bits, 200);

        // The recorded seed replays the run.
        let mut replay = simulate(&run.params).unwrap();
        replay.timestamp = run.timestamp.clone();
        assert_eq!(replay, run);

        let mut entropy = RandomSource::from_entropy();
        assert_eq!(simulate_with(&p, &mut entropy).unwrap().params.seed, None);
    }
}
