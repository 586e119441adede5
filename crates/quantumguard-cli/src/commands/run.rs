//! `quantumguard run` — one BB84 exchange.

use std::path::Path;

use quantumguard_core::export::run_log_json;
use quantumguard_core::{
    ExportBundle, QberMode, Result, RunResult, bits_to_hex, bits_to_string, check_key, simulate,
};

use super::{ParamArgs, bar, resolve_params};

pub struct RunCommandConfig<'a> {
    pub params: &'a ParamArgs,
    pub export_dir: Option<&'a str>,
    pub json: bool,
    pub show_key: bool,
    pub preview: usize,
}

pub fn run(config: RunCommandConfig<'_>) -> Result<()> {
    let params = resolve_params(config.params)?;
    let result = simulate(&params)?;

    if config.json {
        println!("{}", run_log_json(&result)?);
    } else {
        print_summary(&result, config.preview, config.show_key);
    }

    if let Some(dir) = config.export_dir {
        let bundle = ExportBundle::write(&result, Path::new(dir))?;
        // Keep stdout clean for --json consumers.
        eprintln!("\n📄 Exported:");
        eprintln!("  {}", bundle.key_table.display());
        eprintln!("  {}", bundle.key_text.display());
        eprintln!("  {}", bundle.run_log.display());
    }
    Ok(())
}

fn print_summary(result: &RunResult, preview: usize, show_key: bool) {
    let p = &result.params;
    println!("🔐 BB84 exchange — {} qubits", p.n_bits);
    println!(
        "   eve={:.2}  sample_fraction={:.2}  threshold={:.3}  seed={}",
        p.eve_probability,
        p.sample_fraction,
        p.qber_threshold,
        p.seed.map_or_else(|| "random".to_string(), |s| s.to_string())
    );
    println!();

    if preview > 0 && !result.alice_bits.is_empty() {
        let n = preview.min(result.alice_bits.len());
        let bases: String = result.alice_bases[..n].iter().map(|b| b.to_string()).collect();
        println!("  Alice bits   {}", bits_to_string(&result.alice_bits[..n]));
        println!("  Alice bases  {bases}");
        println!();
    }

    let (matches, mismatches) = result.basis_match_counts();
    let total = (matches + mismatches).max(1) as f64;
    println!("  {:<20} {}", "Sifted bits:", result.n_sifted());
    println!(
        "  {:<20} {:>6} {}",
        "Basis match:",
        matches,
        bar(matches as f64 / total, 30)
    );
    println!(
        "  {:<20} {:>6} {}",
        "Basis mismatch:",
        mismatches,
        bar(mismatches as f64 / total, 30)
    );
    println!("  {:<20} {}", "Eve intercepted:", result.intercepted_count());

    let qber_label = match result.qber_mode {
        QberMode::Sampled => format!("QBER (sampled {}):", result.sample_positions.len()),
        QberMode::WholeSift => "QBER (whole sift):".to_string(),
        QberMode::NoSiftedBits => "QBER (no sift):".to_string(),
    };
    println!(
        "  {:<20} {:.4} ({} errors)",
        qber_label, result.qber, result.sample_errors
    );
    println!("  {:<20} {}", "Final key length:", result.final_key_bits.len());

    let icon = if result.decision.is_accept() { "✅" } else { "🚨" };
    println!("\n  {icon} Decision: {}", result.decision);

    if show_key {
        println!("\n  Key (bits): {}", bits_to_string(&result.final_key_bits));
        println!("  Key (hex):  {}", bits_to_hex(&result.final_key_bits));
    }

    println!("\n  Key checks:");
    for check in check_key(&result.final_key_bits) {
        let status = if check.passed { "✓" } else { "✗" };
        let p = check
            .p_value
            .map(|p| format!("{p:.4}"))
            .unwrap_or_else(|| "—".to_string());
        println!("    {status} {:<18} p={p:<8} {}", check.name, check.details);
    }
}
