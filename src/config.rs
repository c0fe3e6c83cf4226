//! Gateway configuration.
//!
//! The contract address is fixed at build time through the
//! `SQUIGGLE_CONTRACT_ADDRESS` environment variable and may be overridden at
//! run time by the same variable. Until it is set, the all-zero sentinel is
//! used and every gateway operation fails with
//! [`GatewayError::NotConfigured`].

use ethers::types::{Address, TxHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::parse_address;
use crate::error::GatewayError;

/// Arbitrum Sepolia chain id.
pub const ARBITRUM_SEPOLIA_CHAIN_ID: u64 = 421614;

/// Public Arbitrum Sepolia RPC endpoint.
pub const ARBITRUM_SEPOLIA_RPC_URL: &str = "https://sepolia-rollup.arbitrum.io/rpc";

/// Block explorer for Arbitrum Sepolia.
pub const ARBISCAN_SEPOLIA_URL: &str = "https://sepolia.arbiscan.io";

/// Address baked in at build time, if any.
const BUILD_CONTRACT_ADDRESS: Option<&str> = option_env!("SQUIGGLE_CONTRACT_ADDRESS");

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid address: {value}")]
    InvalidAddress { var: &'static str, value: String },
    #[error("{var} is not a valid chain id: {value}")]
    InvalidChainId { var: &'static str, value: String },
}

impl From<ConfigError> for GatewayError {
    fn from(e: ConfigError) -> Self {
        GatewayError::invalid_input(e.to_string())
    }
}

/// Everything needed to reach the deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: Address,
    pub explorer_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rpc_url: ARBITRUM_SEPOLIA_RPC_URL.to_string(),
            chain_id: ARBITRUM_SEPOLIA_CHAIN_ID,
            contract_address: Address::zero(),
            explorer_url: ARBISCAN_SEPOLIA_URL.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Configuration for an explicit contract address on Arbitrum Sepolia.
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            ..Self::default()
        }
    }

    /// Build configuration from environment variables.
    ///
    /// * `SQUIGGLE_RPC_URL` - RPC endpoint (default: Arbitrum Sepolia)
    /// * `SQUIGGLE_CHAIN_ID` - chain id (default: 421614)
    /// * `SQUIGGLE_CONTRACT_ADDRESS` - deployed contract (default: build-time value)
    /// * `SQUIGGLE_EXPLORER_URL` - block explorer base URL
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let rpc_url = std::env::var("SQUIGGLE_RPC_URL").unwrap_or(defaults.rpc_url);
        let explorer_url = std::env::var("SQUIGGLE_EXPLORER_URL").unwrap_or(defaults.explorer_url);

        let chain_id = match std::env::var("SQUIGGLE_CHAIN_ID") {
            Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidChainId {
                var: "SQUIGGLE_CHAIN_ID",
                value,
            })?,
            Err(_) => defaults.chain_id,
        };

        let contract_address = match std::env::var("SQUIGGLE_CONTRACT_ADDRESS")
            .ok()
            .or_else(|| BUILD_CONTRACT_ADDRESS.map(str::to_string))
        {
            Some(value) => parse_address(&value).map_err(|_| ConfigError::InvalidAddress {
                var: "SQUIGGLE_CONTRACT_ADDRESS",
                value,
            })?,
            None => Address::zero(),
        };

        Ok(Self {
            rpc_url,
            chain_id,
            contract_address,
            explorer_url,
        })
    }

    /// Whether the contract address has been replaced with a real deployment.
    pub fn is_configured(&self) -> bool {
        !self.contract_address.is_zero()
    }

    /// Start-up check for the operational binaries.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(GatewayError::NotConfigured)
        }
    }

    pub fn explorer_address_url(&self) -> String {
        format!(
            "{}/address/{:?}",
            self.explorer_url.trim_end_matches('/'),
            self.contract_address
        )
    }

    pub fn explorer_tx_url(&self, hash: TxHash) -> String {
        format!("{}/tx/{:?}", self.explorer_url.trim_end_matches('/'), hash)
    }
}
