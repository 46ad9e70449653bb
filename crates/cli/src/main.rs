//! Shopfront CLI - Catalog administration and a local cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the category tree
//! shopfront categories tree
//!
//! # Create a subcategory
//! shopfront categories add "Áo sơ mi" --parent 65f0c1
//!
//! # Create a product with its image
//! shopfront products add --name "Linen shirt" --price 350000 \
//!     --category 65f0c1 --image ./linen.jpg
//!
//! # Work with the local cart
//! shopfront cart add 65f1aa --color white --size M
//! shopfront cart update 1 -1
//! shopfront cart total 1 2
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_API_URL` - Catalog service base URL (default: <http://localhost:5001>)
//! - `CATALOG_API_TOKEN` - Bearer token for write commands
//! - `SHOPFRONT_CART_DIR` - Directory holding the local cart (default: `.shopfront`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod store;

use commands::cart::LineRef;
use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    /// Directory holding the local cart
    #[arg(long, env = "SHOPFRONT_CART_DIR", default_value = ".shopfront")]
    cart_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Work with the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Print the category tree
    Tree {
        /// Show only root categories
        #[arg(long)]
        collapsed: bool,
    },
    /// Print indented options as used by parent pickers
    Options,
    /// Print the display path of a category
    Path {
        /// Category ID
        id: String,
    },
    /// Create a category
    Add {
        /// Category name
        name: String,

        /// Parent category ID (omit for a root category)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Rename a category
    Rename {
        /// Category ID
        id: String,

        /// New name
        name: String,
    },
    /// Delete a category
    Delete {
        /// Category ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Only products in this category or its descendants
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List products grouped by root category
    Grouped,
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
    /// Create a product
    Add(commands::products::AddProductArgs),
    /// Delete a product
    Delete {
        /// Product ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: String,

        /// Color to buy
        #[arg(long, requires = "size")]
        color: Option<String>,

        /// Size to buy
        #[arg(long, requires = "color")]
        size: Option<String>,
    },
    /// Change a line's quantity
    Update {
        /// Line ID or 1-based position
        line: LineRef,

        /// Amount to add (negative to subtract)
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove a line
    Remove {
        /// Line ID or 1-based position
        line: LineRef,
    },
    /// Total the given lines (all lines when none are given)
    Total {
        /// Line IDs or 1-based positions
        lines: Vec<LineRef>,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output can be piped
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront=info,shopfront_storefront=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::new(cli.cart_dir);

    match cli.command {
        Commands::Categories { action } => match action {
            CategoryAction::Tree { collapsed } => commands::categories::tree(&ctx, collapsed).await,
            CategoryAction::Options => commands::categories::options(&ctx).await,
            CategoryAction::Path { id } => commands::categories::path(&ctx, id.into()).await,
            CategoryAction::Add { name, parent } => {
                commands::categories::add(&ctx, &name, parent.map(Into::into)).await
            }
            CategoryAction::Rename { id, name } => {
                commands::categories::rename(&ctx, id.into(), &name).await
            }
            CategoryAction::Delete { id } => commands::categories::delete(&ctx, id.into()).await,
        },
        Commands::Products { action } => match action {
            ProductAction::List { category } => {
                commands::products::list(&ctx, category.map(Into::into)).await
            }
            ProductAction::Grouped => commands::products::grouped(&ctx).await,
            ProductAction::Show { id } => commands::products::show(&ctx, id.into()).await,
            ProductAction::Add(args) => commands::products::add(&ctx, args).await,
            ProductAction::Delete { id } => commands::products::delete(&ctx, id.into()).await,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add {
                product_id,
                color,
                size,
            } => commands::cart::add(&ctx, product_id.into(), color.zip(size)).await,
            CartAction::Update { line, delta } => commands::cart::update(&ctx, line, delta),
            CartAction::Remove { line } => commands::cart::remove(&ctx, line),
            CartAction::Total { lines } => commands::cart::total(&ctx, &lines),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
    }
}
