//! CLI administration tool for the tracking service.
//!
//! Inspects issued tracking numbers and checks the database without going
//! through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a stored tracking number
//! cargo run --bin admin -- lookup USIN55K3XQ15OAB2
//!
//! # Preview a tracking number without storing it
//! cargo run --bin admin -- generate --origin US --destination IN \
//!     --weight 1.5 --customer-id 550e8400-e29b-41d4-a716-446655440000
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` components: required for `lookup` and `db`

use tracking_service::config::{Config, mask_connection_string};
use tracking_service::domain::entities::{ShipmentRequest, TrackingRecord};
use tracking_service::domain::repositories::TrackingRepository;
use tracking_service::infrastructure::persistence::PgTrackingRepository;
use tracking_service::utils::code_generator::TrackingCodeGenerator;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use uuid::Uuid;

/// CLI tool for the tracking service.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show details of a stored tracking number
    Lookup {
        /// 16-character tracking number
        code: String,
    },

    /// Preview a tracking number for a shipment (nothing is stored)
    Generate {
        /// Origin country code, up to 3 characters
        #[arg(long)]
        origin: String,

        /// Destination country code, up to 3 characters
        #[arg(long)]
        destination: String,

        /// Weight in kilograms
        #[arg(long)]
        weight: Decimal,

        #[arg(long)]
        customer_id: Uuid,

        #[arg(long, default_value = "admin-preview")]
        slug: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection and count stored tracking numbers
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup { code } => {
            let pool = connect().await?;
            lookup(&pool, &code).await?;
        }
        Commands::Generate {
            origin,
            destination,
            weight,
            customer_id,
            slug,
        } => {
            let request = ShipmentRequest {
                origin_country_id: Some(origin),
                destination_country_id: Some(destination),
                weight: Some(weight),
                customer_id: Some(customer_id),
                customer_slug: Some(slug),
            };
            generate(request)?;
        }
        Commands::Db { action } => {
            let pool = connect().await?;
            handle_db_action(action, &pool).await?;
        }
    }

    Ok(())
}

async fn connect() -> Result<PgPool> {
    let database_url = Config::load_database_url()?;

    PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database {}",
                mask_connection_string(&database_url)
            )
        })
}

/// Prints a stored tracking record.
async fn lookup(pool: &PgPool, code: &str) -> Result<()> {
    println!("{}", "🔎 Tracking Number Lookup".bright_blue().bold());
    println!();

    let repo = PgTrackingRepository::new(Arc::new(pool.clone()));
    let record = repo
        .find_by_code(&code.trim().to_ascii_uppercase())
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {e}"))?;

    match record {
        Some(record) => print_record(&record),
        None => println!("  {}", format!("No tracking number {code}").yellow()),
    }

    println!();
    Ok(())
}

fn print_record(record: &TrackingRecord) {
    println!(
        "  Tracking number: {}",
        record.tracking_number.bright_yellow().bold()
    );
    println!(
        "  Created:         {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );
    println!(
        "  Route:           {} → {}",
        record.origin_country_id.cyan(),
        record.destination_country_id.cyan()
    );
    println!("  Weight:          {} kg", record.weight);
    println!("  Customer:        {} ({})", record.customer_slug.cyan(), record.customer_id);
}

/// Validates the shipment and prints one primary candidate.
fn generate(request: ShipmentRequest) -> Result<()> {
    println!("{}", "✨ Tracking Number Preview".bright_blue().bold());
    println!();

    let shipment = request
        .into_shipment()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let generator = TrackingCodeGenerator::from_os_rng();
    let candidate = generator
        .generate(&shipment)
        .context("Failed to compose tracking number")?;

    println!("  Candidate: {}", candidate.bright_yellow().bold());
    println!(
        "  {}",
        "Not stored; uniqueness is only checked when issued through the API".bright_black()
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());

            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracking_numbers")
                .fetch_one(pool)
                .await
                .context("Failed to count tracking numbers (have migrations run?)")?;

            println!(
                "  Tracking numbers: {}",
                count.to_string().bright_green().bold()
            );
        }
    }

    Ok(())
}
