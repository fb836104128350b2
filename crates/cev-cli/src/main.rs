mod commands;
mod output;

use cev_core::config::Limits;
use cev_core::error::CevError;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cev",
    version,
    about = "Extract structured data from CEV v2 energy-rating reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file with resource limits
    #[arg(long, value_name = "FILE", global = true)]
    limits: Option<PathBuf>,

    /// Refuse documents with more pages than this
    #[arg(long, value_name = "N", global = true)]
    max_pages: Option<usize>,

    /// Give up on pdftotext after this many seconds
    #[arg(long, value_name = "SECS", global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a PDF is a CEV v2 report
    Validate {
        /// Path to PDF file
        input_file: PathBuf,
    },
    /// Extract every page of a CEV v2 report
    Extract {
        /// Path to PDF file
        input_file: PathBuf,

        /// Output format: table (default) or json. Ignored with --out
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Only this page (1-7)
        #[arg(long)]
        page: Option<usize>,

        /// One row per field instead of a label row and a value row. Ignored with --out
        #[arg(long)]
        transpose: bool,

        /// Write the typed records to a JSON file instead of printing tables
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Export a CEV v2 report to an Excel workbook, one sheet per page
    Export {
        /// Path to PDF file
        input_file: PathBuf,

        /// Workbook path (default: <input>_Extracted_Data.xlsx)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print the field layout of the CEV v2 report
    Schema {
        /// Only this page (1-7)
        #[arg(long)]
        page: Option<usize>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_limits(cli: &Cli) -> Result<Limits, CevError> {
    let mut limits = match &cli.limits {
        Some(path) => Limits::load(path)?,
        None => Limits::default(),
    };
    if let Some(max_pages) = cli.max_pages {
        limits.max_pages = max_pages;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        limits.timeout_secs = timeout_secs;
    }
    limits.validate()?;
    Ok(limits)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = resolve_limits(&cli).and_then(|limits| match cli.command {
        Commands::Validate { input_file } => commands::validate::run(input_file, &limits),
        Commands::Extract {
            input_file,
            output,
            page,
            transpose,
            out,
        } => commands::extract::run(input_file, &output, page, transpose, out, &limits),
        Commands::Export { input_file, out } => commands::export::run(input_file, out, &limits),
        Commands::Schema { page } => commands::schema::run(page),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(if e.is_document_problem() { 2 } else { 1 });
    }
}
