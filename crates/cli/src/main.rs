//! DineHub CLI - Database migrations and development tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! dh-cli migrate
//!
//! # Create demo orders for the restaurant owned by a user
//! dh-cli seed orders --owner "auth0|abc123" --count 10
//! ```
//!
//! # Environment Variables
//!
//! - `DINEHUB_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dh-cli")]
#[command(author, version, about = "DineHub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with development data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create demo orders for a restaurant
    Orders {
        /// Auth provider subject of the restaurant owner
        #[arg(short, long)]
        owner: String,

        /// Number of orders to create
        #[arg(short, long, default_value_t = 5)]
        count: u32,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Orders { owner, count } => {
                let created = commands::seed::orders(&owner, count).await?;
                tracing::info!("Created {created} orders");
            }
        },
    }
    Ok(())
}
