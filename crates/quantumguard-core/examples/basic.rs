//! Basic BB84 exchange example.
//!
//! Runs one seeded exchange with Eve intercepting half the qubits, prints the
//! outcome, then sweeps the interception probability.
//!
//! Run: `cargo run --example basic`

use quantumguard_core::{RunParameters, bits_to_hex, simulate, sweep};

fn main() {
    let params = RunParameters {
        n_bits: 128,
        eve_probability: 0.5,
        sample_fraction: 0.2,
        qber_threshold: 0.11,
        seed: Some(42),
    };

    let run = match simulate(&params) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("simulation rejected: {e}");
            std::process::exit(1);
        }
    };

    println!("Sifted bits: {}", run.n_sifted());
    println!("QBER (sampled): {:.4}", run.qber);
    println!("Decision: {}", run.decision);
    println!("Final key length: {}", run.final_key_bits.len());
    println!("Final key (hex): {}", bits_to_hex(&run.final_key_bits));

    // Same seed at every point, so only Eve changes along the curve.
    if let Ok(points) = sweep(&params, None) {
        println!("\np(Eve)   QBER");
        for point in points {
            println!("{:>6.2}  {:.4}", point.probability, point.qber);
        }
    }
}
