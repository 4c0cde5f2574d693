//! inventory - manage a JSON-backed stock list.
//!
//! Usage:
//!   inventory list
//!   inventory add "hex bolts" 120
//!   inventory delete 2
//!   inventory --file store.json list

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

use resmon::inventory::{InventoryError, InventoryStore};

/// Inventory list stored in a JSON file.
#[derive(Parser)]
#[command(name = "inventory", about = "Manage a JSON inventory file", version)]
struct Args {
    /// Inventory file.
    #[arg(short, long, default_value = "inventory.json")]
    file: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every item.
    List,
    /// Append an item.
    Add {
        name: String,
        #[arg(allow_negative_numbers = true)]
        stock: i64,
    },
    /// Remove the item with the given id (as shown by `list`).
    Delete { id: usize },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("resmon={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<(), InventoryError> {
    let mut store = InventoryStore::load(&args.file)?;
    debug!(file = %store.path().display(), "using inventory file");

    match args.command {
        Command::List => println!("{}", store.listing()),
        Command::Add { name, stock } => {
            store.add(&name, stock)?;
            println!("Added {} (Stock: {})", name.trim(), stock);
        }
        Command::Delete { id } => {
            let item = store.delete(id)?;
            println!("Deleted {}", item.name);
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
