//! CLI for quantumguard — BB84 key exchange with an intercept-resend eavesdropper.

mod commands;

use clap::{Parser, Subcommand};

use commands::ParamArgs;

#[derive(Parser)]
#[command(name = "quantumguard")]
#[command(about = "quantumguard — simulate BB84 key distribution and catch Eve in the QBER")]
#[command(version = quantumguard_core::VERSION)]
struct Cli {
    /// Log protocol internals (equivalent to RUST_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one BB84 exchange and report sifting, QBER and the accept/abort decision
    Run {
        #[command(flatten)]
        params: ParamArgs,

        /// Write sim_result.csv, final_key.txt and sim_result.json into this directory
        #[arg(long, num_args = 0..=1, default_missing_value = "exports")]
        export: Option<String>,

        /// Print the full run log as JSON instead of the summary
        #[arg(long)]
        json: bool,

        /// Print the final key as a bit string and hex
        #[arg(long)]
        show_key: bool,

        /// Number of qubits shown in Alice's bit/basis preview (0 = none)
        #[arg(long, default_value = "32")]
        preview: usize,
    },

    /// Sweep Eve's interception probability and report QBER for each point
    Sweep {
        #[command(flatten)]
        params: ParamArgs,

        /// Comma-separated interception probabilities (default: 0,0.25,0.5,0.75,1)
        #[arg(long, value_delimiter = ',')]
        probabilities: Option<Vec<f64>>,

        /// Write the curve as CSV (probability,qber)
        #[arg(long)]
        output: Option<String>,
    },

    /// Explain BB84, sifting, and why intercept-resend shows up in the QBER
    Theory,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Run {
            params,
            export,
            json,
            show_key,
            preview,
        } => commands::run::run(commands::run::RunCommandConfig {
            params: &params,
            export_dir: export.as_deref(),
            json,
            show_key,
            preview,
        }),
        Commands::Sweep {
            params,
            probabilities,
            output,
        } => commands::sweep::run(&params, probabilities.as_deref(), output.as_deref()),
        Commands::Theory => {
            commands::theory::run();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
