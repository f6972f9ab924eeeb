//! fincollect CLI - register sources, run incremental collections, look up prices.
//!
//! Commands:
//! - `register` - store a new source configuration
//! - `sources` - list registered sources
//! - `collect` - collect one source, or every source when no id is given
//! - `price` - close of a ticker on a date, converted to a currency

mod config;
mod main_lib;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use config::Config;
use fincollect_core::collection::CollectionServiceTrait;
use fincollect_core::prices::PriceServiceTrait;
use fincollect_core::sources::NewSourceConfig;
use main_lib::{build_state, init_tracing, parse_since, price_line};

#[derive(Parser)]
#[command(name = "fincollect", about = "Incremental equity and FX rate collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new source.
    Register {
        source_id: i64,

        /// Source type tag (polygon, frankfurter).
        source_type: String,

        /// Ticker for polygon, base currency for frankfurter.
        url_additional: String,

        /// Earliest date to collect (YYYY-MM-DD or RFC 3339).
        #[arg(long)]
        since: String,

        /// API credential passed to the provider.
        #[arg(long)]
        token: Option<String>,

        /// Storage category. Defaults to the source type's category.
        #[arg(long, default_value = "")]
        end_table: String,
    },
    /// List registered sources.
    Sources,
    /// Collect one source, or all of them.
    Collect {
        source_id: Option<i64>,
    },
    /// Close of a ticker on a date in the requested currency.
    Price {
        ticker: String,

        /// Trading day (YYYY-MM-DD).
        date: NaiveDate,

        currency: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config).await?;

    match cli.command {
        Commands::Register {
            source_id,
            source_type,
            url_additional,
            since,
            token,
            end_table,
        } => {
            let source = state
                .collection_service
                .register_source(NewSourceConfig {
                    source_id,
                    source_type,
                    url_additional,
                    scrape_since: parse_since(&since)?,
                    token,
                    end_table,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&source)?);
        }
        Commands::Sources => {
            let sources = state.collection_service.list_sources()?;
            println!("{}", serde_json::to_string_pretty(&sources)?);
        }
        Commands::Collect {
            source_id: Some(source_id),
        } => {
            let stats = state.collection_service.collect_source(source_id).await?;
            println!("source {}: {}", source_id, stats);
        }
        Commands::Collect { source_id: None } => {
            let mut failures = 0;
            for run in state.collection_service.collect_all().await? {
                match run.result {
                    Ok(stats) => println!("source {}: {}", run.source_id, stats),
                    Err(e) => {
                        failures += 1;
                        println!("source {}: failed: {}", run.source_id, e);
                    }
                }
            }
            if failures > 0 {
                bail!("{} source(s) failed", failures);
            }
        }
        Commands::Price {
            ticker,
            date,
            currency,
        } => {
            let price = state.price_service.price_of(&ticker, date, &currency)?;
            println!("{}", price_line(&ticker, date, &currency, price));
        }
    }

    Ok(())
}
