//! Packline CLI - reconcile, submit and label package receipts.
//!
//! # Usage
//!
//! ```bash
//! # Check a draft against its target quantity without sending anything
//! packline reconcile drafts/po-1001.yaml
//!
//! # Submit a draft and write one label batch per package group
//! packline submit drafts/po-1001.yaml --labels labels.jsonl
//!
//! # Build labels for packages that already exist
//! packline labels packages.yaml --format text --default-unit kg
//! ```
//!
//! # Commands
//!
//! - `reconcile` - Validate and reconcile a draft offline
//! - `submit` - Validate, reconcile, submit and print labels
//! - `labels` - Group packages and assemble label records
//!
//! Drafts and package lists are read as JSON when the file ends in `.json`
//! and as YAML otherwise.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use packline_core::Unit;

mod commands;
mod input;
mod output;
mod telemetry;

use output::Format;

#[derive(Parser)]
#[command(name = "packline")]
#[command(author, version, about = "Package reconciliation and label tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a draft and compare its package total with the target
    Reconcile {
        /// Draft file (YAML or JSON)
        draft: PathBuf,

        /// Accepted difference between package total and target
        #[arg(long, env = "PACKLINE_TOLERANCE")]
        tolerance: Option<Decimal>,
    },
    /// Submit a draft to the receiving API and print its labels
    Submit {
        /// Draft file (YAML or JSON)
        draft: PathBuf,

        /// Write labels to this file instead of stdout
        #[arg(short, long)]
        labels: Option<PathBuf>,

        /// Label output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Group existing packages and assemble their labels
    Labels {
        /// Package list file (YAML or JSON)
        packages: PathBuf,

        /// Write labels to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Label output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Barcode for packages without one
        #[arg(long, default_value = "")]
        default_barcode: String,

        /// Item name for packages without one
        #[arg(long, default_value = "")]
        default_name: String,

        /// Grade for packages without one
        #[arg(long)]
        default_grade: Option<String>,

        /// Size for packages without one
        #[arg(long)]
        default_size: Option<String>,

        /// Unit for packages without one (`kg`, `nos`, `litres`)
        #[arg(long, default_value = "kg")]
        default_unit: Unit,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Sentry must be initialized before the subscriber so its layer sees the client
    let _sentry_guard = telemetry::init_sentry();
    telemetry::init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Reconcile { draft, tolerance } => {
            commands::reconcile::run(&draft, tolerance).await?;
        }
        Commands::Submit {
            draft,
            labels,
            format,
        } => {
            commands::submit::run(&draft, labels, format).await?;
        }
        Commands::Labels {
            packages,
            output,
            format,
            default_barcode,
            default_name,
            default_grade,
            default_size,
            default_unit,
        } => {
            let defaults = packline_core::LabelDefaults {
                barcode: default_barcode,
                item_name: default_name,
                item_grade: default_grade,
                item_size: default_size,
                unit: default_unit,
            };
            commands::labels::run(&packages, output, format, &defaults).await?;
        }
    }
    Ok(())
}
