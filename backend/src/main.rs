//! Codelist CLI - serve, check and normalize code-list CSV files
//!
//! ```bash
//! codelist serve                      # Start HTTP server (port 3000)
//! codelist serve --data-dir ./data    # Persist uploads as JSON files
//! codelist check codes.csv            # Validate a CSV file
//! codelist normalize codes.csv -o out.csv   # Rewrite in canonical form
//! ```

use clap::{Parser, Subcommand};
use codelist::{decode, encode, Config, CsvFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codelist")]
#[command(about = "Validate, store and regenerate code-list CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: CODELIST_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Store uploads as JSON files in this directory instead of memory
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Largest accepted upload in bytes
        #[arg(long)]
        max_upload_bytes: Option<usize>,
    },

    /// Decode a CSV file and report the first problem, if any
    Check {
        /// Input CSV file
        input: PathBuf,
    },

    /// Decode a CSV file and write it back in canonical form
    Normalize {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            data_dir,
            max_upload_bytes,
        } => cmd_serve(port, data_dir, max_upload_bytes).await,

        Commands::Check { input } => cmd_check(&input),

        Commands::Normalize { input, output } => cmd_normalize(&input, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env();
    if let Some(port) = port {
        config.port = port;
    }
    if data_dir.is_some() {
        config.data_dir = data_dir;
    }
    if let Some(limit) = max_upload_bytes {
        config.max_upload_bytes = limit;
    }

    codelist::server::start_server(config).await
}

fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Checking: {}", input.display());

    let content = fs::read_to_string(input)?;
    let rows = decode(&content, &CsvFormat::default())?;

    eprintln!("✅ {} rows, all codes unique", rows.len());
    Ok(())
}

fn cmd_normalize(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Normalizing: {}", input.display());

    let format = CsvFormat::default();
    let content = fs::read_to_string(input)?;
    let rows = decode(&content, &format)?;
    let bytes = encode(&rows, &format)?;

    match output {
        Some(p) => {
            fs::write(p, &bytes)?;
            eprintln!("💾 {} rows written to: {}", rows.len(), p.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)?;
        }
    }

    Ok(())
}
