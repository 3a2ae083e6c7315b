//! Command-line front end that quotes a shipment described in a TOML file.

mod config;
mod logger;
mod render;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use freightrate_carrier_rl::{self as rl, RlConfig};
use freightrate_core::{CarrierRegistry, Carriers, RateOptions, RatingService};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::QuoteFile;

const CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

#[derive(Debug, Parser)]
#[command(name = "freightrate", version, about = "Quote LTL freight shipments")]
struct Cli {
    /// Log debug output from the rating crates.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Quote the shipment described in a TOML file.
    Quote {
        /// Path to the quote file.
        file: PathBuf,
        /// Use the carrier's sandbox endpoint.
        #[arg(long)]
        test: bool,
        /// Log the request and response documents.
        #[arg(long)]
        log_xml: bool,
    },
    /// List the carriers this build can quote.
    Carriers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    let client = Client::builder()
        .user_agent("freightrate/0.1")
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Carriers => {
            let service = rating_service(client, &RlConfig::default());
            render::write_carriers(&mut stdout, &service.carriers())?;
        }
        Command::Quote {
            file,
            test,
            log_xml,
        } => {
            let quote = QuoteFile::load(&file)?;
            if !quote.has_api_key() {
                warn!(
                    "no API key configured; set [carrier].api_key, [options].key or {}",
                    config::API_KEY_ENV
                );
            }

            let options = RateOptions {
                test: test.then_some(true),
                log_xml: log_xml.then_some(true),
                ..RateOptions::default()
            };
            let options = quote.options.merged_with(&options);

            let service = rating_service(client, &quote.carrier);
            let response = service
                .find_rates(&Carriers::RlFreight.into(), &quote.shipment(), &options)
                .await
                .context("rate lookup failed")?;

            if response.log_xml {
                info!(request = ?response.request, response = %response.xml, "carrier documents");
            }
            render::write_rates(&mut stdout, &response)?;
        }
    }

    stdout.flush()?;
    Ok(())
}

fn rating_service(client: Client, config: &RlConfig) -> RatingService {
    let plugins = vec![rl::plugin(client, config)];
    let registry = Arc::new(CarrierRegistry::new(plugins));
    RatingService::new(registry)
}
