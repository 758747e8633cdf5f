use anyhow::{Context, Result};
use clap::Parser;
use ton_numbers::config::{self, Config};
use ton_numbers::output::{OutputFormat, RecordWriter};
use ton_numbers::scanner::Scanner;
use ton_numbers::toncenter::TonCenterClient;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "numbers")]
#[command(about = "List Fragment number items of a TON NFT collection", long_about = None)]
struct Cli {
    /// tsv, json, csv or table
    #[arg(short, long, default_value = "tsv")]
    format: String,

    /// Collection address, raw or user-friendly
    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    page_size: Option<u32>,

    /// TON Center v3 base URL
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the report, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from(cli.format.as_str());

    info!("Starting Fragment number scanner");

    let mut config = Config::from_env()?;
    if let Some(address) = cli.address {
        config.collection_address = address.parse().context("Invalid --address format")?;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = config::validate_page_size(page_size)?;
    }
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    info!("Configuration loaded");
    info!("Collection address: {}", config.collection_address);
    info!("TON Center URL: {}", config.api_url);

    let client = TonCenterClient::new(&config)?;
    let scanner = Scanner::new(
        client.clone(),
        client,
        config.collection_address,
        config.page_size,
    );

    let mut sink = RecordWriter::new(format, std::io::stdout());
    if let Err(e) = scanner.run_and_finish(&mut sink).await {
        error!("Scanner error: {:#}", e);
        return Err(e);
    }

    Ok(())
}
