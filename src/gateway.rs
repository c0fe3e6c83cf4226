//! The contract gateway.
//!
//! Turns typed calls into requests against the single configured Squiggle
//! deployment, waits for confirmation of writes, and classifies failures.

use std::sync::Arc;

use ethers::abi::Token;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::amount::{format_native, parse_native};
use crate::client::{ChainClient, ClientError, ClientErrorKind, Receipt};
use crate::config::GatewayConfig;
use crate::contract::{parse_address, ContractMethod, ContractReference};
use crate::error::{GatewayError, Result};
use crate::metadata::TokenMetadata;
use crate::revert::ContractRevert;

/// Collection name and symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub name: String,
    pub symbol: String,
}

/// Gateway to one Squiggle deployment.
///
/// Cloning is cheap; clones share the contract reference and client, so
/// independent tasks can issue calls concurrently.
pub struct Gateway<C> {
    contract: Arc<ContractReference>,
    client: Arc<C>,
}

impl<C> Clone for Gateway<C> {
    fn clone(&self) -> Self {
        Self {
            contract: Arc::clone(&self.contract),
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: ChainClient> Gateway<C> {
    /// Create a gateway for the contract named in `config`.
    ///
    /// An unconfigured (all-zero) address is accepted here; every operation
    /// then fails with [`GatewayError::NotConfigured`].
    pub fn new(config: &GatewayConfig, client: Arc<C>) -> Result<Self> {
        let contract = ContractReference::squiggle(config.contract_address)?;
        Ok(Self::with_contract(Arc::new(contract), client))
    }

    pub fn with_contract(contract: Arc<ContractReference>, client: Arc<C>) -> Self {
        Self { contract, client }
    }

    pub fn contract(&self) -> &ContractReference {
        &self.contract
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// One-time setup: set the mint price (decimal ETH string).
    pub async fn initialize(&self, mint_price: &str) -> Result<Receipt> {
        self.contract.ensure_configured()?;
        let price = parse_native(mint_price)?;

        info!(
            "Initializing Squiggle NFT contract with mint price: {} ETH",
            format_native(price)
        );
        self.execute(ContractMethod::Initialize, vec![Token::Uint(price)], None)
            .await
    }

    /// Read name and symbol concurrently.
    pub async fn read_contract_info(&self) -> Result<ContractInfo> {
        self.contract.ensure_configured()?;

        let (name, symbol) = tokio::try_join!(
            self.read(ContractMethod::Name, vec![]),
            self.read(ContractMethod::Symbol, vec![]),
        )?;

        Ok(ContractInfo {
            name: string_output(ContractMethod::Name, name)?,
            symbol: string_output(ContractMethod::Symbol, symbol)?,
        })
    }

    /// Number of tokens held by `owner`.
    pub async fn read_balance(&self, owner: &str) -> Result<U256> {
        self.contract.ensure_configured()?;
        let owner = parse_address(owner)?;

        let output = self
            .read(ContractMethod::BalanceOf, vec![Token::Address(owner)])
            .await?;
        uint_output(ContractMethod::BalanceOf, output)
    }

    /// Mint a token, attaching `payment` (decimal ETH string).
    pub async fn mint(&self, payment: &str) -> Result<Receipt> {
        self.contract.ensure_configured()?;
        let value = parse_native(payment)?;

        info!("Minting Squiggle NFT for {} ETH", format_native(value));
        self.execute(ContractMethod::Mint, vec![], Some(value)).await
    }

    pub async fn read_token_uri(&self, token_id: U256) -> Result<String> {
        self.contract.ensure_configured()?;

        let output = self
            .read(ContractMethod::TokenUri, vec![Token::Uint(token_id)])
            .await?;
        let uri = string_output(ContractMethod::TokenUri, output)?;
        if uri.is_empty() {
            return Err(GatewayError::NotFound {
                token_id: token_id.to_string(),
            });
        }
        Ok(uri)
    }

    pub async fn read_owner_of(&self, token_id: U256) -> Result<Address> {
        self.contract.ensure_configured()?;

        let output = self
            .read(ContractMethod::OwnerOf, vec![Token::Uint(token_id)])
            .await?;
        single(ContractMethod::OwnerOf, output)?
            .into_address()
            .ok_or_else(|| unexpected_output(ContractMethod::OwnerOf))
    }

    /// Read `tokenURI` and decode the inline metadata JSON.
    pub async fn read_token_metadata(&self, token_id: U256) -> Result<TokenMetadata> {
        let uri = self.read_token_uri(token_id).await?;
        Ok(TokenMetadata::from_token_uri(&uri)?)
    }

    pub async fn transfer(&self, from: &str, to: &str, token_id: U256) -> Result<Receipt> {
        self.contract.ensure_configured()?;
        let from = parse_address(from)?;
        let to = parse_address(to)?;

        info!(from = ?from, to = ?to, %token_id, "Transferring token");
        self.execute(
            ContractMethod::TransferFrom,
            vec![Token::Address(from), Token::Address(to), Token::Uint(token_id)],
            None,
        )
        .await
    }

    pub async fn approve(&self, to: &str, token_id: U256) -> Result<Receipt> {
        self.contract.ensure_configured()?;
        let to = parse_address(to)?;

        info!(to = ?to, %token_id, "Approving token");
        self.execute(
            ContractMethod::Approve,
            vec![Token::Address(to), Token::Uint(token_id)],
            None,
        )
        .await
    }

    pub async fn set_approval_for_all(&self, operator: &str, approved: bool) -> Result<Receipt> {
        self.contract.ensure_configured()?;
        let operator = parse_address(operator)?;

        info!(operator = ?operator, approved, "Setting approval for all");
        self.execute(
            ContractMethod::SetApprovalForAll,
            vec![Token::Address(operator), Token::Bool(approved)],
            None,
        )
        .await
    }

    async fn read(&self, method: ContractMethod, args: Vec<Token>) -> Result<Vec<Token>> {
        let request = self.contract.request(method, args, None)?;
        let data = self
            .client
            .read(self.contract.address(), &request)
            .await
            .map_err(|e| classify(method, e))?;
        self.contract.decode_output(method, &data)
    }

    /// Submit a write and wait for its receipt.
    async fn execute(
        &self,
        method: ContractMethod,
        args: Vec<Token>,
        value: Option<U256>,
    ) -> Result<Receipt> {
        let request = self.contract.request(method, args, value)?;

        let hash = self
            .client
            .submit(self.contract.address(), &request)
            .await
            .map_err(|e| classify(method, e))?;
        info!("Transaction hash: {:?}", hash);

        debug!("Waiting for transaction confirmation...");
        let receipt = self
            .client
            .wait_for_receipt(hash)
            .await
            .map_err(|e| classify(method, e))?;

        if receipt.is_success() {
            info!(
                "Transaction confirmed in block: {}",
                receipt.block_number.unwrap_or_default()
            );
        } else {
            warn!(hash = ?receipt.transaction_hash, "{} transaction reverted on chain", method);
        }
        Ok(receipt)
    }
}

fn classify(method: ContractMethod, err: ClientError) -> GatewayError {
    match err.kind {
        ClientErrorKind::Reverted(data) => match ContractRevert::decode(&data) {
            Some(revert) => revert.into_error(method),
            None => GatewayError::network(format!("{} reverted: {}", method, err.message)),
        },
        ClientErrorKind::Transport | ClientErrorKind::Dropped => {
            GatewayError::network(format!("{}: {}", method, err.message))
        }
    }
}

fn single(method: ContractMethod, output: Vec<Token>) -> Result<Token> {
    output
        .into_iter()
        .next()
        .ok_or_else(|| unexpected_output(method))
}

fn string_output(method: ContractMethod, output: Vec<Token>) -> Result<String> {
    single(method, output)?
        .into_string()
        .ok_or_else(|| unexpected_output(method))
}

fn uint_output(method: ContractMethod, output: Vec<Token>) -> Result<U256> {
    single(method, output)?
        .into_uint()
        .ok_or_else(|| unexpected_output(method))
}

fn unexpected_output(method: ContractMethod) -> GatewayError {
    GatewayError::network(format!("unexpected output from {}", method))
}
