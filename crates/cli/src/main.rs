//! Lantern Market CLI - Database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! lm-cli migrate
//!
//! # Seed the catalog
//! lm-cli seed products catalog.yaml
//!
//! # Inspect or adjust stock
//! lm-cli stock show lantern-brass
//! lm-cli stock reduce lantern-brass 2
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed products` - Upsert products from YAML
//! - `stock show` / `stock reduce` - Inspect or reduce stock

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lm-cli")]
#[command(author, version, about = "Lantern Market CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed data from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Inspect or adjust product stock
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert catalog products from a YAML file
    Products {
        /// Path to the YAML seed file
        file: PathBuf,

        /// Validate the file without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// Show a product's stock
    Show {
        /// Product ID
        product_id: String,
    },
    /// Reduce a product's stock
    Reduce {
        /// Product ID
        product_id: String,

        /// Units to remove
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, dry_run } => {
                commands::seed::products(&file, dry_run).await?;
            }
        },
        Commands::Stock { action } => match action {
            StockAction::Show { product_id } => commands::stock::show(&product_id).await?,
            StockAction::Reduce {
                product_id,
                quantity,
            } => commands::stock::reduce(&product_id, quantity).await?,
        },
    }
    Ok(())
}
