//! Mobile Shop CLI - browse the phone catalog and manage a local cart.
//!
//! # Usage
//!
//! ```bash
//! # Browse through a running storefront (default http://127.0.0.1:3000)
//! mobile-shop phones list --search galaxy
//! mobile-shop phones show SMG-S24
//!
//! # Skip the storefront and call the upstream API with PHONES_API_* variables
//! mobile-shop --direct phones list
//!
//! # Cart
//! mobile-shop cart add SMG-S24 --color "Onyx Black" --storage 128GB
//! mobile-shop cart show
//! ```
//!
//! # Commands
//!
//! - `phones list` / `phones show` - Catalog listing and detail
//! - `cart show|add|update|remove|clear` - Local cart kept in `--cart-dir`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mobile_shop_core::{CartItemKey, CartStore, PhoneQuery};

mod commands;
mod storage;

use commands::CatalogSource;
use storage::FileStorage;

#[derive(Parser)]
#[command(name = "mobile-shop")]
#[command(author, version, about = "Mobile Shop catalog and cart")]
struct Cli {
    /// Storefront to browse through
    #[arg(long, global = true, env = "MOBILE_SHOP_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Call the upstream API directly instead of the storefront
    #[arg(long, global = true)]
    direct: bool,

    /// Directory holding the cart file
    #[arg(long, global = true, env = "MOBILE_SHOP_CART_DIR", default_value = ".mobile-shop")]
    cart_dir: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the phone catalog
    Phones {
        #[command(subcommand)]
        action: PhonesAction,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum PhonesAction {
    /// List phones
    List {
        /// Free-text filter
        #[arg(short, long)]
        search: Option<String>,

        /// Page size
        #[arg(short, long)]
        limit: Option<u32>,

        /// Number of phones to skip
        #[arg(short, long)]
        offset: Option<u32>,
    },
    /// Show one phone
    Show {
        /// Phone ID
        id: String,
    },
}

/// Identity of a cart line on the command line.
#[derive(Args)]
struct LineArgs {
    /// Phone ID
    id: String,

    /// Color name, as listed by `phones show`
    #[arg(short, long)]
    color: String,

    /// Storage capacity, as listed by `phones show`
    #[arg(short, long)]
    storage: String,
}

impl From<LineArgs> for CartItemKey {
    fn from(args: LineArgs) -> Self {
        Self {
            id: args.id.into(),
            color: args.color,
            storage: args.storage,
        }
    }
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add a phone in the given configuration
    Add {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Set the quantity of a line (0 removes it)
    Update {
        #[command(flatten)]
        line: LineArgs,

        /// New quantity
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a line
    Remove {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Remove every line
    Clear,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<String, Box<dyn std::error::Error>> = run(cli).await;

    match result {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                print!("{output}");
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            #[allow(clippy::print_stderr)]
            {
                eprintln!("error: {e}");
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let source = if cli.direct {
        CatalogSource::direct()
    } else {
        CatalogSource::proxy(&cli.base_url)?
    };

    match cli.command {
        Commands::Phones { action } => match action {
            PhonesAction::List {
                search,
                limit,
                offset,
            } => {
                let query = PhoneQuery {
                    search,
                    limit,
                    offset,
                };
                let phones = commands::phones::list(&source, &query).await?;
                if cli.json {
                    Ok(to_json_line(&phones)?)
                } else {
                    Ok(commands::phones::render_list(&phones))
                }
            }
            PhonesAction::Show { id } => {
                let phone = commands::phones::show(&source, &id).await?;
                if cli.json {
                    Ok(to_json_line(&phone)?)
                } else {
                    Ok(commands::phones::render_detail(&phone))
                }
            }
        },
        Commands::Cart { action } => {
            let mut store = CartStore::hydrated(FileStorage::new(&cli.cart_dir));
            match action {
                CartAction::Show => {}
                CartAction::Add { line } => {
                    commands::cart::add(&source, &mut store, &line.id, &line.color, &line.storage)
                        .await?;
                }
                CartAction::Update { line, quantity } => {
                    commands::cart::update(&mut store, line.into(), quantity);
                }
                CartAction::Remove { line } => commands::cart::remove(&mut store, line.into()),
                CartAction::Clear => commands::cart::clear(&mut store),
            }

            let snapshot = store.snapshot();
            if cli.json {
                Ok(to_json_line(&snapshot)?)
            } else {
                Ok(commands::cart::render(&snapshot))
            }
        }
    }
}

fn to_json_line(value: &impl serde::Serialize) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}
