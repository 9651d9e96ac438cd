//! chainhistory CLI: read entry chains from a factomd node.
//!
//! # Commands
//! ```
//! chainhistory head    <chain-id>
//! chainhistory history <chain-id> [--json]
//! chainhistory first   <chain-id> [--json]
//! chainhistory block   <keymr>
//! chainhistory entry   <entry-hash>
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use chainhistory_core::{CancellationToken, ChainReader, Hash, Record};
use chainhistory_rpc::{FactomdSource, HttpRpcClient};

mod config;
mod logging;

use config::CliConfig;

type Reader = ChainReader<FactomdSource<HttpRpcClient>>;

#[derive(Parser)]
#[command(
    name = "chainhistory",
    about = "Reconstruct entry chain history from a factomd node",
    long_about = "
Reads a chain's blocks from its head back to its origin and prints every
entry in the order it was written.

ENVIRONMENT VARIABLES:
  CHAINHISTORY_URL   factomd v2 API endpoint
  RUST_LOG           log filter, overrides the configured level
",
    version
)]
struct Cli {
    /// factomd v2 API endpoint (overrides the config file)
    #[arg(long, global = true, env = "CHAINHISTORY_URL")]
    url: Option<String>,

    /// JSON config file with `rpc`, `reader` and `log` sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Maximum number of blocks to walk before giving up
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Entry fetches in flight per block
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a chain's head pointer and state
    Head {
        /// Chain ID (64 hex characters)
        chain: Hash,
    },

    /// Print every entry of a chain, oldest first
    History {
        /// Chain ID (64 hex characters)
        chain: Hash,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the first entry ever written to a chain
    First {
        /// Chain ID (64 hex characters)
        chain: Hash,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the entries of a single entry block
    Block {
        /// Entry block key Merkle root
        keymr: Hash,
    },

    /// Print a single entry
    Entry {
        /// Entry hash
        hash: Hash,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    if let Some(url) = &cli.url {
        cfg.rpc.url = url.clone();
    }
    if let Some(n) = cli.max_depth {
        cfg.reader.max_depth = n;
    }
    if let Some(n) = cli.concurrency {
        cfg.reader.fetch_concurrency = n;
    }
    if cli.verbose {
        cfg.log.level = "debug".into();
    }

    logging::init_tracing(&cfg.log);
    tracing::debug!(url = %cfg.rpc.url, "connecting");

    let url = cfg.rpc.url.clone();
    let source = FactomdSource::http(cfg.rpc).context("failed to create RPC client")?;
    let reader: Reader = ChainReader::new(Arc::new(source), cfg.reader);

    let result = match cli.command {
        Commands::Head { chain } => cmd_head(&reader, &chain).await,
        Commands::History { chain, json } => cmd_history(&reader, &chain, json).await,
        Commands::First { chain, json } => cmd_first(&reader, &chain, json).await,
        Commands::Block { keymr } => cmd_block(&reader, &keymr).await,
        Commands::Entry { hash } => cmd_entry(&reader, &hash).await,
    };
    result.with_context(|| format!("request to {url} failed"))
}

/// Token cancelled on Ctrl-C.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, stopping at next fetch");
            child.cancel();
        }
    });
    token
}

async fn cmd_head(reader: &Reader, chain: &Hash) -> Result<()> {
    let head = reader.chain_head(chain).await?;
    println!("Chain:  {chain}");
    println!("State:  {}", head.state());
    match head.head {
        Some(keymr) => println!("Head:   {keymr}"),
        None => println!("Head:   -"),
    }
    Ok(())
}

async fn cmd_history(reader: &Reader, chain: &Hash, as_json: bool) -> Result<()> {
    let records = reader.full_history_with(chain, &interrupt_token()).await?;

    if as_json {
        let out: Vec<_> = records.iter().map(record_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Chain:   {chain}");
    println!("Entries: {}", records.len());
    for (i, record) in records.iter().enumerate() {
        println!();
        print_record(i, record);
    }
    Ok(())
}

async fn cmd_first(reader: &Reader, chain: &Hash, as_json: bool) -> Result<()> {
    let record = reader.first_record_with(chain, &interrupt_token()).await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&record_json(&record))?);
    } else {
        print_record(0, &record);
    }
    Ok(())
}

async fn cmd_block(reader: &Reader, keymr: &Hash) -> Result<()> {
    let block = reader.block_records(keymr).await?;
    println!("Block:    {keymr}");
    println!("Previous: {}", block.prev_keymr);
    println!("Entries:  {}", block.records.len());
    for (i, record) in block.records.iter().enumerate() {
        println!();
        print_record(i, record);
    }
    Ok(())
}

async fn cmd_entry(reader: &Reader, hash: &Hash) -> Result<()> {
    let record = reader.record(hash).await?;
    print_record(0, &record);
    Ok(())
}

fn print_record(index: usize, record: &Record) {
    println!("[{index}] chain {}", record.chain_id);
    for (i, ext_id) in record.ext_ids_lossy().iter().enumerate() {
        println!("    extid[{i}]: {ext_id}");
    }
    println!("    content:  {}", record.content_lossy());
}

fn record_json(record: &Record) -> serde_json::Value {
    json!({
        "chainid": record.chain_id.to_hex(),
        "extids": record.ext_ids.iter().map(hex::encode).collect::<Vec<_>>(),
        "content": hex::encode(&record.content),
    })
}
