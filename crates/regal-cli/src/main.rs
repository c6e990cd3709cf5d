mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "regal",
    version,
    about = "Extract shelf defects from warehouse racking inspection reports"
)]
struct Cli {
    /// Log parsing decisions to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an inspection report PDF into shelves and their defects
    Parse {
        /// Path to the report PDF
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// JSON file overriding parser heuristics
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Show colour map and reconstructed rows per page
    Inspect {
        /// Path to the report PDF
        input_file: PathBuf,

        /// Only show this page (1-based)
        #[arg(short, long)]
        page: Option<usize>,

        /// JSON file overriding parser heuristics
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Render a view payload (regal-auswahl or pruef-matrix) or a job record from JSON
    View {
        /// Path to the payload JSON
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Build a regal-auswahl selection payload from a report PDF
    Select {
        /// Path to the report PDF
        input_file: PathBuf,

        /// Output format: json (default) or table
        #[arg(short, long, default_value = "json")]
        output: String,

        /// JSON file overriding parser heuristics
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "regal=warn,regal_core=warn",
        1 => "regal=debug,regal_core=debug",
        _ => "regal=trace,regal_core=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
            config,
        } => commands::parse::run(input_file, &output, out, config),
        Commands::Inspect {
            input_file,
            page,
            config,
        } => commands::inspect::run(input_file, page, config),
        Commands::View { input_file, output } => commands::view::run(input_file, &output),
        Commands::Select {
            input_file,
            output,
            config,
        } => commands::select::run(input_file, &output, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
