//! # Horcrux CLI (`horcrux`)
//!
//! ## Usage
//!
//! ```bash
//! horcrux --config ./config/horcrux.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `horcrux show` | Print the corpus document |
//! | `horcrux append "<text>"` | Append a note (development mode only) |
//! | `horcrux fetch` | Load the document remote-first and summarize it |
//! | `horcrux serve` | Start the HTTP server |
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use horcrux::config;
use horcrux::file_store::FileStore;
use horcrux::ingest::IngestService;
use horcrux::{get, server};

/// Horcrux: a single-document corpus store with note ingestion and
/// remote-first retrieval.
#[derive(Parser)]
#[command(
    name = "horcrux",
    about = "Horcrux: append notes to a JSON corpus and retrieve it remote-first",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// `HORCRUX_MODE`, `HORCRUX_JSON`, and `HORCRUX_MCP_BASE` override the
    /// file's `mode`, `corpus.path`, and `retrieval.remote_base`.
    #[arg(long, global = true, default_value = "./config/horcrux.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the corpus document as pretty JSON.
    Show,

    /// Append a note to the corpus document.
    ///
    /// Fails when `mode = "production"`.
    Append {
        /// Note text; surrounding whitespace is trimmed.
        text: String,
    },

    /// Load the document the way a web page would: remote collaborator
    /// first, static resource as fallback.
    Fetch {
        /// Print the normalized document instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves `/api/ingest`, the static
    /// document route, and `/health`.
    Serve,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Show => {
            get::run_show(&cfg).await?;
        }
        Commands::Append { text } => {
            let store = std::sync::Arc::new(FileStore::new(&cfg.corpus.path));
            let service = IngestService::new(cfg.mode, store);
            let res = service.ingest_text(&text).await?;
            println!("ok");
            println!("notes: {}", res.notes_count);
        }
        Commands::Fetch { json } => {
            get::run_fetch(&cfg, json).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
