//! Chain client abstraction.
//!
//! The gateway never talks to a provider directly. It goes through
//! [`ChainClient`], which the binaries implement with `ethers-rs`
//! ([`EthersClient`]) and the tests implement with an in-memory contract.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::MiddlewareError;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionReceipt, TransactionRequest, TxHash, U256};
use thiserror::Error;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::contract::CallRequest;
use crate::error::{GatewayError, Result};

/// What went wrong on the client side, as a discriminant the gateway can
/// match on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// Execution reverted; carries the raw revert data.
    Reverted(Bytes),
    /// RPC or transport failure.
    Transport,
    /// Transaction disappeared before a receipt was produced.
    Dropped,
}

/// Failure reported by a [`ChainClient`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn reverted(data: impl Into<Bytes>, message: impl Into<String>) -> Self {
        Self {
            kind: ClientErrorKind::Reverted(data.into()),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ClientErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn dropped(hash: TxHash) -> Self {
        Self {
            kind: ClientErrorKind::Dropped,
            message: format!("transaction {:?} dropped", hash),
        }
    }

    fn from_middleware<E: MiddlewareError>(err: E) -> Self {
        let message = err.to_string();
        match err.as_error_response().and_then(|resp| resp.as_revert_data()) {
            Some(data) => Self::reverted(data, message),
            None => Self::transport(message),
        }
    }
}

/// Inclusion status of a confirmed transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Failure,
}

/// Confirmation record for a write operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub status: ReceiptStatus,
    pub gas_used: Option<U256>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }

    /// Treat a mined-but-reverted transaction as an error.
    pub fn into_confirmed(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GatewayError::network(format!(
                "transaction {:?} reverted on chain",
                self.transaction_hash
            )))
        }
    }
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        let status = match receipt.status {
            Some(s) if s.is_zero() => ReceiptStatus::Failure,
            _ => ReceiptStatus::Success,
        };
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
            status,
            gas_used: receipt.gas_used,
        }
    }
}

/// Transport used by the gateway to reach the chain.
///
/// Nonce management and signing belong to the implementor.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signing identity.
    fn signer_address(&self) -> Address;

    /// Execute a read-only call and return the raw return data.
    async fn read(
        &self,
        contract: Address,
        request: &CallRequest,
    ) -> std::result::Result<Bytes, ClientError>;

    /// Sign and broadcast a transaction, returning its hash.
    async fn submit(
        &self,
        contract: Address,
        request: &CallRequest,
    ) -> std::result::Result<TxHash, ClientError>;

    /// Wait until `hash` is included and return its receipt.
    async fn wait_for_receipt(&self, hash: TxHash) -> std::result::Result<Receipt, ClientError>;
}

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// `ethers-rs` backed client signing with a local private key.
#[derive(Clone)]
pub struct EthersClient {
    inner: Arc<SignerClient>,
}

impl EthersClient {
    /// Create a client for `config.rpc_url` signing with `wallet`.
    pub fn new(config: &GatewayConfig, wallet: LocalWallet) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| GatewayError::network(format!("Invalid RPC URL: {}", e)))?;
        let wallet = wallet.with_chain_id(config.chain_id);

        Ok(Self {
            inner: Arc::new(SignerMiddleware::new(provider, wallet)),
        })
    }

    /// Create a client with the key in `PRIVATE_KEY`.
    pub fn from_env(config: &GatewayConfig) -> Result<Self> {
        let private_key = std::env::var("PRIVATE_KEY")
            .map_err(|_| GatewayError::invalid_input("PRIVATE_KEY not set"))?;
        let wallet = LocalWallet::from_str(private_key.trim())
            .map_err(|e| GatewayError::invalid_input(format!("Invalid private key: {}", e)))?;
        Self::new(config, wallet)
    }

    fn transaction(&self, contract: Address, request: &CallRequest) -> TransactionRequest {
        let tx = TransactionRequest::new()
            .to(contract)
            .from(self.signer_address())
            .data(request.calldata.clone());
        match request.value {
            Some(value) => tx.value(value),
            None => tx,
        }
    }
}

#[async_trait]
impl ChainClient for EthersClient {
    fn signer_address(&self) -> Address {
        self.inner.signer().address()
    }

    async fn read(
        &self,
        contract: Address,
        request: &CallRequest,
    ) -> std::result::Result<Bytes, ClientError> {
        debug!(method = %request.method, contract = ?contract, "eth_call");
        let tx: TypedTransaction = self.transaction(contract, request).into();
        self.inner
            .call(&tx, None)
            .await
            .map_err(ClientError::from_middleware)
    }

    async fn submit(
        &self,
        contract: Address,
        request: &CallRequest,
    ) -> std::result::Result<TxHash, ClientError> {
        debug!(method = %request.method, contract = ?contract, value = ?request.value, "sending transaction");
        let pending = self
            .inner
            .send_transaction(self.transaction(contract, request), None)
            .await
            .map_err(ClientError::from_middleware)?;
        Ok(pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> std::result::Result<Receipt, ClientError> {
        let receipt = PendingTransaction::new(hash, self.inner.provider())
            .await
            .map_err(|e| ClientError::transport(e.to_string()))?
            .ok_or_else(|| ClientError::dropped(hash))?;
        Ok(receipt.into())
    }
}
