//! Squiggle minting script.
//!
//! Usage:
//!   cargo run --bin squiggle-mint -- --payment 0.001

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use squiggle_gateway::{
    ChainClient, EthersClient, Gateway, GatewayConfig, GatewayError, DEFAULT_MINT_PRICE,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Mint a Squiggle NFT
#[derive(Parser)]
#[command(name = "squiggle-mint")]
struct Args {
    /// Payment attached to the mint, in ETH
    #[arg(long, default_value = DEFAULT_MINT_PRICE)]
    payment: String,
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
    println!("Squiggle NFT Minting Script");
    println!("{}", "=".repeat(50));

    if let Err(e) = run(&args.payment).await {
        eprintln!("\n❌ Error: {:#}", e);

        if let Some(GatewayError::InsufficientPayment { .. }) = e.downcast_ref::<GatewayError>() {
            println!("💸 Make sure you're sending enough ETH to cover the mint price");
        }

        process::exit(1);
    }
}

async fn run(payment: &str) -> Result<()> {
    let config = GatewayConfig::from_env()?;
    if config.validate().is_err() {
        println!("❌ Please set SQUIGGLE_CONTRACT_ADDRESS to your deployed contract address");
        return Err(GatewayError::NotConfigured.into());
    }

    let client = EthersClient::from_env(&config).context("creating chain client")?;
    let gateway = Gateway::new(&config, Arc::new(client))?;

    println!("\n📍 Contract Address: {:?}", config.contract_address);
    println!("👤 Minting with wallet: {:?}", gateway.client().signer_address());

    println!("\n📊 Current contract info:");
    let info = gateway.read_contract_info().await?;
    println!(" Name: {}", info.name);
    println!(" Symbol: {}", info.symbol);

    let receipt = gateway.mint(payment).await?.into_confirmed()?;
    println!(
        "✅ NFT minted! Block: {}",
        receipt.block_number.unwrap_or_default()
    );

    println!("\n🔗 View on explorer: {}", config.explorer_tx_url(receipt.transaction_hash));
    println!("\n💡 To view the SVG art, decode the base64 data URI from the tokenURI");
    Ok(())
}
