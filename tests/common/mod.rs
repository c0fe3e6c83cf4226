//! In-memory Squiggle contract used as a substitute chain client.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ethers::abi::Token;
use ethers::types::{Address, Bytes, TxHash, U256};
use squiggle_gateway::{
    CallRequest, ChainClient, ClientError, ContractMethod, ContractReference, ContractRevert,
    Gateway, Receipt, ReceiptStatus,
};

pub const CONTRACT: &str = "0x7f916543a53e08b8cbd4a066a1079021d1c91572";
pub const ALICE: &str = "0x00000000000000000000000000000000000a11ce";
pub const BOB: &str = "0x0000000000000000000000000000000000000b0b";
pub const CAROL: &str = "0x00000000000000000000000000000000000ca201";

pub fn address(s: &str) -> Address {
    squiggle_gateway::parse_address(s).unwrap()
}

#[derive(Default)]
struct State {
    owner: Option<Address>,
    mint_price: U256,
    next_token_id: u64,
    owners: HashMap<U256, Address>,
    token_approvals: HashMap<U256, Address>,
    operators: HashSet<(Address, Address)>,
    receipts: HashMap<TxHash, Receipt>,
    block: u64,
    fail_reads: bool,
    revert_on_chain: bool,
}

/// Contract state shared by every signer's client.
pub struct MockChain {
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                next_token_id: 1,
                block: 100,
                ..State::default()
            }),
            calls: AtomicUsize::new(0),
        })
    }

    /// Number of reads and submissions the chain has seen.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    /// Mine subsequent transactions with a failed status and no state change.
    pub fn revert_on_chain(&self, revert: bool) {
        self.state.lock().unwrap().revert_on_chain = revert;
    }

    pub fn client(self: &Arc<Self>, signer: &str) -> MockClient {
        MockClient {
            chain: Arc::clone(self),
            signer: address(signer),
        }
    }
}

pub struct MockClient {
    chain: Arc<MockChain>,
    signer: Address,
}

fn token_uri(token_id: U256) -> String {
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0 Q {} 10 20 0"/></svg>"#,
        token_id
    );
    let json = serde_json::json!({
        "name": format!("Squiggle #{}", token_id),
        "description": "On-chain generative squiggle",
        "image": format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)),
    });
    format!("data:application/json;base64,{}", STANDARD.encode(json.to_string()))
}

fn revert(r: ContractRevert) -> ClientError {
    ClientError::reverted(r.encode(), "execution reverted")
}

fn uint(args: &[Token], i: usize) -> U256 {
    args[i].clone().into_uint().unwrap()
}

fn addr(args: &[Token], i: usize) -> Address {
    args[i].clone().into_address().unwrap()
}

impl State {
    fn owner_of(&self, token_id: U256) -> Result<Address, ClientError> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or_else(|| revert(ContractRevert::NonexistentToken { token_id }))
    }

    fn is_operator(&self, owner: Address, operator: Address) -> bool {
        self.operators.contains(&(owner, operator))
    }

    fn apply(&mut self, signer: Address, request: &CallRequest) -> Result<(), ClientError> {
        let args = &request.args;
        match request.method {
            ContractMethod::Initialize => {
                if self.owner.is_some() {
                    return Err(revert(ContractRevert::InvalidSender));
                }
                self.owner = Some(signer);
                self.mint_price = uint(args, 0);
            }
            ContractMethod::Mint => {
                if request.value.unwrap_or_default() < self.mint_price {
                    return Err(revert(ContractRevert::InsufficientPayment));
                }
                let token_id = U256::from(self.next_token_id);
                self.next_token_id += 1;
                self.owners.insert(token_id, signer);
            }
            ContractMethod::TransferFrom => {
                let (from, to, token_id) = (addr(args, 0), addr(args, 1), uint(args, 2));
                let owner = self.owner_of(token_id)?;
                let approved = self.token_approvals.get(&token_id) == Some(&signer);
                if signer != owner && !approved && !self.is_operator(owner, signer) {
                    return Err(revert(ContractRevert::InsufficientApproval {
                        operator: signer,
                        token_id,
                    }));
                }
                if from != owner {
                    return Err(revert(ContractRevert::IncorrectOwner {
                        sender: from,
                        token_id,
                        owner,
                    }));
                }
                if to.is_zero() {
                    return Err(revert(ContractRevert::InvalidReceiver { receiver: to }));
                }
                self.token_approvals.remove(&token_id);
                self.owners.insert(token_id, to);
            }
            ContractMethod::Approve => {
                let (to, token_id) = (addr(args, 0), uint(args, 1));
                let owner = self.owner_of(token_id)?;
                if signer != owner && !self.is_operator(owner, signer) {
                    return Err(revert(ContractRevert::InvalidApprover { approver: signer }));
                }
                self.token_approvals.insert(token_id, to);
            }
            ContractMethod::SetApprovalForAll => {
                let operator = addr(args, 0);
                if operator.is_zero() {
                    return Err(revert(ContractRevert::InvalidOperator { operator }));
                }
                if args[1].clone().into_bool().unwrap() {
                    self.operators.insert((signer, operator));
                } else {
                    self.operators.remove(&(signer, operator));
                }
            }
            other => panic!("{} is not a write", other),
        }
        Ok(())
    }

    fn query(&self, request: &CallRequest) -> Result<Vec<Token>, ClientError> {
        let args = &request.args;
        Ok(match request.method {
            ContractMethod::Name => vec![Token::String("Squiggle".into())],
            ContractMethod::Symbol => vec![Token::String("SQGL".into())],
            ContractMethod::BalanceOf => {
                let who = addr(args, 0);
                let count = self.owners.values().filter(|o| **o == who).count();
                vec![Token::Uint(U256::from(count))]
            }
            ContractMethod::OwnerOf => vec![Token::Address(self.owner_of(uint(args, 0))?)],
            ContractMethod::TokenUri => {
                let token_id = uint(args, 0);
                self.owner_of(token_id)?;
                vec![Token::String(token_uri(token_id))]
            }
            other => panic!("{} is not a read", other),
        })
    }
}

#[async_trait]
impl ChainClient for MockClient {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn read(&self, contract: Address, request: &CallRequest) -> Result<Bytes, ClientError> {
        self.chain.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(contract, address(CONTRACT));
        tokio::task::yield_now().await;

        let state = self.chain.state.lock().unwrap();
        if state.fail_reads {
            return Err(ClientError::transport("connection refused"));
        }
        let output = state.query(request)?;
        Ok(ethers::abi::encode(&output).into())
    }

    async fn submit(&self, contract: Address, request: &CallRequest) -> Result<TxHash, ClientError> {
        self.chain.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(contract, address(CONTRACT));

        let mut state = self.chain.state.lock().unwrap();
        let status = if state.revert_on_chain {
            ReceiptStatus::Failure
        } else {
            state.apply(self.signer, request)?;
            ReceiptStatus::Success
        };

        state.block += 1;
        let hash = TxHash::from_low_u64_be(state.block);
        let receipt = Receipt {
            transaction_hash: hash,
            block_number: Some(state.block),
            status,
            gas_used: Some(U256::from(21_000)),
        };
        state.receipts.insert(hash, receipt);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt, ClientError> {
        tokio::task::yield_now().await;
        self.chain
            .state
            .lock()
            .unwrap()
            .receipts
            .get(&hash)
            .cloned()
            .ok_or_else(|| ClientError::dropped(hash))
    }
}

pub fn gateway(client: MockClient) -> Gateway<MockClient> {
    let contract = ContractReference::squiggle(address(CONTRACT)).unwrap();
    Gateway::with_contract(Arc::new(contract), Arc::new(client))
}

pub fn unconfigured_gateway(client: MockClient) -> Gateway<MockClient> {
    let contract = ContractReference::squiggle(Address::zero()).unwrap();
    Gateway::with_contract(Arc::new(contract), Arc::new(client))
}
