//! Diagnostic randomness checks on a final key.
//!
//! These are NIST SP 800-22 style frequency and runs tests applied to the
//! retained key bits. They do not change the accept/abort decision; they are
//! a sanity check that sifting and sampling left an unbiased key behind.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

/// Keys shorter than this are reported as insufficient.
pub const MIN_KEY_BITS: usize = 100;

/// Significance level for pass/fail.
pub const ALPHA: f64 = 0.01;

/// Result of one key check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCheck {
    pub name: String,
    pub p_value: Option<f64>,
    pub passed: bool,
    pub details: String,
}

impl KeyCheck {
    fn from_p(name: &str, p: f64, details: String) -> Self {
        Self {
            name: name.to_string(),
            p_value: Some(p),
            passed: p >= ALPHA,
            details,
        }
    }

    fn insufficient(name: &str, n: usize) -> Self {
        Self {
            name: name.to_string(),
            p_value: None,
            passed: false,
            details: format!("Insufficient key length: need {MIN_KEY_BITS}, got {n}"),
        }
    }
}

/// Proportion of ones should be close to one half.
pub fn monobit(bits: &[u8]) -> KeyCheck {
    let name = "Monobit Frequency";
    let n = bits.len();
    if n < MIN_KEY_BITS {
        return KeyCheck::insufficient(name, n);
    }
    let s: i64 = bits.iter().map(|&b| if b == 0 { -1 } else { 1 }).sum();
    let s_obs = (s as f64).abs() / (n as f64).sqrt();
    let p = erfc(s_obs / std::f64::consts::SQRT_2);
    KeyCheck::from_p(name, p, format!("S={s}, n={n}"))
}

/// Number of uninterrupted runs should match an unbiased source.
pub fn runs(bits: &[u8]) -> KeyCheck {
    let name = "Runs";
    let n = bits.len();
    if n < MIN_KEY_BITS {
        return KeyCheck::insufficient(name, n);
    }
    let ones = bits.iter().filter(|&&b| b != 0).count();
    let prop = ones as f64 / n as f64;
    // Frequency pre-test: the runs statistic is meaningless on a biased key.
    if (prop - 0.5).abs() >= 2.0 / (n as f64).sqrt() {
        return KeyCheck::from_p(name, 0.0, format!("Pre-test failed: proportion={prop:.4}"));
    }
    let transitions = bits.windows(2).filter(|w| w[0] != w[1]).count();
    let observed = transitions + 1;
    let nf = n as f64;
    let expected = 2.0 * nf * prop * (1.0 - prop);
    let z = (observed as f64 - expected).abs() / (2.0 * (2.0 * nf).sqrt() * prop * (1.0 - prop));
    let p = erfc(z);
    KeyCheck::from_p(name, p, format!("runs={observed}, expected={expected:.0}"))
}

/// Run every key check.
pub fn check_key(bits: &[u8]) -> Vec<KeyCheck> {
    vec![monobit(bits), runs(bits)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomSource;

    #[test]
    fn test_short_key_insufficient() {
        for check in check_key(&[1, 0, 1]) {
            assert!(!check.passed);
            assert_eq!(check.p_value, None);
            assert!(check.details.contains("Insufficient"));
        }
    }

    #[test]
    fn test_constant_key_fails() {
        let bits = vec![1u8; 500];
        assert!(!monobit(&bits).passed);
        assert!(!runs(&bits).passed);
    }

    #[test]
    fn test_alternating_key_fails_runs() {
        let bits: Vec<u8> = (0..500).map(|i| (i % 2) as u8).collect();
        assert!(monobit(&bits).passed);
        assert!(!runs(&bits).passed);
    }

    /// Worked example from NIST SP 800-22 sections 2.1.8 and 2.3.8.
    const NIST_EXAMPLE: &str = "1100100100001111110110101010001000100001\
                                0110100011000010001101001100010011000110\
                                01100010100010111000";

    fn parse_bits(s: &str) -> Vec<u8> {
        s.bytes().map(|b| b - b'0').collect()
    }

    #[test]
    fn test_monobit_matches_nist_example() {
        let bits = parse_bits(NIST_EXAMPLE);
        assert_eq!(bits.len(), 100);
        let p = monobit(&bits).p_value.unwrap();
        assert!((p - 0.109599).abs() < 1e-6, "p={p}");
    }

    #[test]
    fn test_runs_matches_nist_example() {
        let bits = parse_bits(NIST_EXAMPLE);
        let check = runs(&bits);
        assert_eq!(check.details, "runs=52, expected=49");
        let p = check.p_value.unwrap();
        assert!((p - 0.500798).abs() < 1e-6, "p={p}");
        assert!(check.passed);
    }

    #[test]
    fn test_runs_of_three_match_closed_form() {
        // 000111 repeated: 400 runs against an expected 600.
        let bits: Vec<u8> = (0..1200).map(|i| ((i / 3) % 2) as u8).collect();
        let p = runs(&bits).p_value.unwrap();
        // erfc(200 / (2 * sqrt(2400) * 0.25))
        let expected = 7.6437583856311e-31;
        assert!(((p - expected) / expected).abs() < 1e-6, "p={p}");
    }

    #[test]
    fn test_random_key_passes() {
        let bits = RandomSource::seeded(2024).bits(4096);
        let checks = check_key(&bits);
        assert_eq!(checks.len(), 2);
        for check in checks {
            let p = check.p_value.unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
        // A balanced key has a monobit statistic near zero.
        assert!(monobit(&bits).p_value.unwrap() > 1e-4);
    }
}
