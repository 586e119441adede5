//! `quantumguard sweep` — QBER curve over Eve's interception probability.

use quantumguard_core::{Result, SweepPoint, sweep, sweep_csv};

use super::{ParamArgs, bar, resolve_params};

/// Bar width for the curve; a full bar is 50% QBER.
const CURVE_WIDTH: usize = 40;
const CURVE_SCALE: f64 = 0.5;

pub fn run(args: &ParamArgs, probabilities: Option<&[f64]>, output_path: Option<&str>) -> Result<()> {
    let params = resolve_params(args)?;
    let points = sweep(&params, probabilities)?;

    println!(
        "📈 QBER vs Eve interception — {} qubits, threshold {:.3}{}",
        params.n_bits,
        params.qber_threshold,
        params
            .seed
            .map_or_else(String::new, |s| format!(", seed {s} (shared by every point)"))
    );
    println!();
    print_curve(&points, params.qber_threshold);

    if let Some(path) = output_path {
        std::fs::write(path, sweep_csv(&points))?;
        println!("\n📄 Curve saved to: {path}");
    }
    Ok(())
}

fn print_curve(points: &[SweepPoint], threshold: f64) {
    println!("{:>6} {:>8}", "p(Eve)", "QBER");
    println!("{}", "-".repeat(18 + CURVE_WIDTH));
    for point in points {
        let marker = if point.qber <= threshold { ' ' } else { '!' };
        println!(
            "{:>6.2} {:>8.4}{marker} {}",
            point.probability,
            point.qber,
            bar(point.qber / CURVE_SCALE, CURVE_WIDTH)
        );
    }
    println!("\n'!' marks points above the accept threshold.");
}
