//! Squiggle initialization script.
//!
//! Sets the mint price on a freshly deployed contract and reads back the
//! collection info.
//!
//! Usage:
//!   cargo run --bin squiggle-initialize -- --price 0.001

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use squiggle_gateway::{
    format_native, parse_native, ChainClient, EthersClient, Gateway, GatewayConfig, GatewayError,
    DEFAULT_MINT_PRICE,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the Squiggle NFT contract with a mint price
#[derive(Parser)]
#[command(name = "squiggle-initialize")]
struct Args {
    /// Mint price in ETH
    #[arg(long, default_value = DEFAULT_MINT_PRICE)]
    price: String,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    println!("{}", "=".repeat(50));
    println!("Squiggle NFT Initialization Script");
    println!("{}", "=".repeat(50));

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    };
    if config.validate().is_err() {
        println!("❌ Please set SQUIGGLE_CONTRACT_ADDRESS to your deployed contract address");
        process::exit(1);
    }

    let gateway = match connect(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&config, &gateway, &args.price).await {
        eprintln!("\n❌ Error: {:#}", e);

        if let Some(GatewayError::AlreadyInitialized) = e.downcast_ref::<GatewayError>() {
            println!("\n📝 Contract is already initialized. Reading current info...");
            if let Ok(info) = gateway.read_contract_info().await {
                println!(" Name: {}", info.name);
                println!(" Symbol: {}", info.symbol);
            }
        }

        process::exit(1);
    }
}

fn connect(config: &GatewayConfig) -> Result<Gateway<EthersClient>> {
    let client = EthersClient::from_env(config).context("creating chain client")?;
    Ok(Gateway::new(config, Arc::new(client))?)
}

async fn run(config: &GatewayConfig, gateway: &Gateway<EthersClient>, price: &str) -> Result<()> {
    println!("\n Contract Address: {:?}", config.contract_address);
    println!(" Initializing with wallet: {:?}", gateway.client().signer_address());

    let price = format_native(parse_native(price)?);
    gateway.initialize(&price).await?.into_confirmed()?;

    println!("\n Verifying initialization...");
    let info = gateway.read_contract_info().await?;

    println!("\n Squiggle NFT contract successfully initialized!");
    println!("{}", "=".repeat(50));
    println!(" Name: {}", info.name);
    println!(" Symbol: {}", info.symbol);
    println!(" Mint Price: {} ETH", price);
    println!("{}", "=".repeat(50));

    println!("\n🔗 View on explorer: {}", config.explorer_address_url());
    Ok(())
}
