//! # Squiggle Gateway
//!
//! Typed client for the Squiggle ERC-721 contract deployed on Arbitrum
//! Sepolia. Minting rules and the on-chain SVG art live in the contract; this
//! crate encodes calls, submits transactions, waits for receipts and decodes
//! reads.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use squiggle_gateway::{EthersClient, Gateway, GatewayConfig};
//!
//! # async fn run() -> squiggle_gateway::Result<()> {
//! let config = GatewayConfig::from_env()?;
//! config.validate()?;
//!
//! let client = Arc::new(EthersClient::from_env(&config)?);
//! let gateway = Gateway::new(&config, client)?;
//!
//! let info = gateway.read_contract_info().await?;
//! println!("{} ({})", info.name, info.symbol);
//!
//! let receipt = gateway.mint("0.001").await?;
//! println!("minted in block {:?}", receipt.block_number);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Reverts carrying a known custom error are classified by selector into
//! [`GatewayError`] variants; everything else is a
//! [`GatewayError::NetworkError`].

pub mod amount;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod gateway;
pub mod metadata;
pub mod revert;

pub use amount::{format_native, parse_native};
pub use client::{ChainClient, ClientError, ClientErrorKind, EthersClient, Receipt, ReceiptStatus};
pub use config::GatewayConfig;
pub use contract::{parse_address, CallRequest, ContractMethod, ContractReference};
pub use error::{GatewayError, Result};
pub use gateway::{ContractInfo, Gateway};
pub use metadata::TokenMetadata;
pub use revert::ContractRevert;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mint price used by the operational scripts, in ETH.
pub const DEFAULT_MINT_PRICE: &str = "0.001";
