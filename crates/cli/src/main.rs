//! PPS CLI - Catalog inspection and local cart tools.
//!
//! # Usage
//!
//! ```bash
//! # List products with the price extracted for every variant
//! pps-cli products --limit 20
//!
//! # Show one product from the local cache (or straight from Medusa)
//! pps-cli product prod_01H... --remote
//!
//! # List collections
//! pps-cli collections
//!
//! # Drive a locally persisted cart
//! pps-cli cart add variant_01H... -q 2
//! pps-cli cart show
//! pps-cli cart clear
//! ```
//!
//! # Commands
//!
//! - `products` - List products and fill the product cache
//! - `product` - Show one product
//! - `collections` - List collections
//! - `cart` - Show or mutate a cart persisted under the data directory
//!
//! Configuration comes from the same environment variables as the
//! storefront server (`MEDUSA_BACKEND_URL`, `STOREFRONT_DATA_DIR`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pps-cli")]
#[command(author, version, about = "PPS storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products and fill the product cache
    Products {
        /// Number of products to request (defaults to `MEDUSA_PRODUCT_LIMIT`)
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show one product
    Product {
        /// Product ID
        id: String,

        /// Fetch from Medusa instead of the local cache
        #[arg(long)]
        remote: bool,
    },
    /// List collections
    Collections,
    /// Show or mutate a locally persisted cart
    Cart {
        /// Name of the local cart
        #[arg(long, default_value = "cli")]
        visitor: String,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart as stored locally
    Show,
    /// Add a variant
    Add {
        /// Variant ID
        variant_id: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line item's quantity
    Update {
        /// Line item ID
        line_item_id: String,

        /// New quantity (at least 1)
        quantity: u32,
    },
    /// Remove a line item
    Remove {
        /// Line item ID
        line_item_id: String,
    },
    /// Re-fetch the cart from Medusa
    Refresh,
    /// Forget the local cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pps_storefront=warn,pps_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::from_env()?;

    match cli.command {
        Commands::Products { limit } => commands::catalog::products(&ctx, limit).await?,
        Commands::Product { id, remote } => commands::catalog::product(&ctx, &id, remote).await?,
        Commands::Collections => commands::catalog::collections(&ctx).await?,
        Commands::Cart { visitor, action } => {
            let cart = ctx.cart(&visitor)?;
            match action {
                CartAction::Show => commands::cart::show(&cart)?,
                CartAction::Add {
                    variant_id,
                    quantity,
                } => commands::cart::add(&cart, &variant_id, quantity).await?,
                CartAction::Update {
                    line_item_id,
                    quantity,
                } => commands::cart::update(&cart, &line_item_id, quantity).await?,
                CartAction::Remove { line_item_id } => {
                    commands::cart::remove(&cart, &line_item_id).await?;
                }
                CartAction::Refresh => commands::cart::refresh(&cart).await?,
                CartAction::Clear => commands::cart::clear(&cart).await?,
            }
        }
    }
    Ok(())
}
