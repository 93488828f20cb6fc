//! Print one status line for the Claude Code context piped on stdin.
//!
//! # Examples
//!
//! ```sh
//! # What Claude Code runs on every refresh
//! echo '{"model":{"display_name":"Opus"}}' | ccsl
//!
//! # Diagnose producers against a saved payload
//! ccsl doctor --json payload.json --no-ansi
//!
//! # Add the ccusage segment before the prompt
//! ccsl setup --enable-ccusage --position before:prompt
//! ```

use ccsl::{config, doctor, logging, setup, statusline};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Fast, pluggable status line for Claude Code.
#[derive(Parser)]
#[command(name = "ccsl", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run every producer once and report timings, cache and logs
    Doctor {
        /// Context payload to test with (defaults to a minimal fixture)
        #[arg(long)]
        json: Option<PathBuf>,

        /// Render without ANSI styling
        #[arg(long)]
        no_ansi: bool,
    },

    /// Edit the config file non-interactively
    Setup {
        /// Add the ccusage segment (runs `ccsl-ccusage`)
        #[arg(long)]
        enable_ccusage: bool,

        /// Token limit for the 5h block: a number or "max"
        #[arg(long)]
        token_limit: Option<String>,

        /// Where to insert ccusage: after:<id>, before:<id>, or end
        #[arg(long, default_value = setup::DEFAULT_POSITION)]
        position: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => render().await,
        Some(Command::Doctor { json, no_ansi }) => {
            process::exit(doctor::run(json, no_ansi).await);
        }
        Some(Command::Setup {
            enable_ccusage,
            token_limit,
            position,
        }) => {
            let path = match config::save_path() {
                Ok(path) => path,
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
            let mut loaded = config::load();
            match setup::run(
                &mut loaded.config,
                &path,
                enable_ccusage,
                token_limit.as_deref(),
                &position,
            ) {
                Ok(message) => println!("{message}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            }
        }
    }
}

async fn render() {
    logging::init_render();

    let mut raw = Vec::new();
    if let Err(e) = tokio::io::stdin().read_to_end(&mut raw).await {
        tracing::warn!("Cannot read stdin: {e}");
        process::exit(1);
    }
    // Invalid JSON prints nothing and exits 0.
    if !statusline::is_valid_payload(&raw) {
        return;
    }

    let loaded = config::load();
    let line = statusline::render(Arc::new(loaded.config), &raw).await;
    println!("{line}");
}
