//! Classification of contract reverts.
//!
//! A revert is identified by the 4-byte selector of the custom error the
//! contract raised. The Squiggle contract raises its own `InvalidSender()` and
//! `InsufficientPayment()` errors plus the standard ERC-721 errors.

use ethers::abi::{ParamType, Token};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::id;

use crate::contract::ContractMethod;
use crate::error::GatewayError;

const INVALID_SENDER: &str = "InvalidSender()";
const INSUFFICIENT_PAYMENT: &str = "InsufficientPayment()";
const NONEXISTENT_TOKEN: &str = "ERC721NonexistentToken(uint256)";
const INSUFFICIENT_APPROVAL: &str = "ERC721InsufficientApproval(address,uint256)";
const INCORRECT_OWNER: &str = "ERC721IncorrectOwner(address,uint256,address)";
const INVALID_APPROVER: &str = "ERC721InvalidApprover(address)";
const INVALID_OPERATOR: &str = "ERC721InvalidOperator(address)";
const INVALID_RECEIVER: &str = "ERC721InvalidReceiver(address)";
const ERROR_STRING: &str = "Error(string)";

/// A decoded contract revert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractRevert {
    /// Raised by `initialize` once the contract has an owner.
    InvalidSender,
    InsufficientPayment,
    NonexistentToken { token_id: U256 },
    InsufficientApproval { operator: Address, token_id: U256 },
    IncorrectOwner { sender: Address, token_id: U256, owner: Address },
    InvalidApprover { approver: Address },
    InvalidOperator { operator: Address },
    InvalidReceiver { receiver: Address },
    /// Plain `require` message.
    Message(String),
    Unknown { selector: [u8; 4] },
}

impl ContractRevert {
    /// Decode raw revert data. Returns `None` when there is no selector.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[..4]);
        let args = &data[4..];

        let decoded = if selector == id(INVALID_SENDER) {
            Some(Self::InvalidSender)
        } else if selector == id(INSUFFICIENT_PAYMENT) {
            Some(Self::InsufficientPayment)
        } else if selector == id(NONEXISTENT_TOKEN) {
            decode_args(&[ParamType::Uint(256)], args).and_then(|mut t| {
                Some(Self::NonexistentToken {
                    token_id: t.remove(0).into_uint()?,
                })
            })
        } else if selector == id(INSUFFICIENT_APPROVAL) {
            decode_args(&[ParamType::Address, ParamType::Uint(256)], args).and_then(|mut t| {
                let token_id = t.remove(1).into_uint()?;
                Some(Self::InsufficientApproval {
                    operator: t.remove(0).into_address()?,
                    token_id,
                })
            })
        } else if selector == id(INCORRECT_OWNER) {
            decode_args(
                &[ParamType::Address, ParamType::Uint(256), ParamType::Address],
                args,
            )
            .and_then(|t| {
                let mut it = t.into_iter();
                Some(Self::IncorrectOwner {
                    sender: it.next()?.into_address()?,
                    token_id: it.next()?.into_uint()?,
                    owner: it.next()?.into_address()?,
                })
            })
        } else if selector == id(INVALID_APPROVER) {
            single_address(args).map(|approver| Self::InvalidApprover { approver })
        } else if selector == id(INVALID_OPERATOR) {
            single_address(args).map(|operator| Self::InvalidOperator { operator })
        } else if selector == id(INVALID_RECEIVER) {
            single_address(args).map(|receiver| Self::InvalidReceiver { receiver })
        } else if selector == id(ERROR_STRING) {
            decode_args(&[ParamType::String], args)
                .and_then(|mut t| t.remove(0).into_string())
                .map(Self::Message)
        } else {
            None
        };

        Some(decoded.unwrap_or(Self::Unknown { selector }))
    }

    /// ABI-encode the revert the way the contract would.
    pub fn encode(&self) -> Bytes {
        let (signature, tokens) = match self {
            Self::InvalidSender => (INVALID_SENDER, vec![]),
            Self::InsufficientPayment => (INSUFFICIENT_PAYMENT, vec![]),
            Self::NonexistentToken { token_id } => (NONEXISTENT_TOKEN, vec![Token::Uint(*token_id)]),
            Self::InsufficientApproval { operator, token_id } => (
                INSUFFICIENT_APPROVAL,
                vec![Token::Address(*operator), Token::Uint(*token_id)],
            ),
            Self::IncorrectOwner {
                sender,
                token_id,
                owner,
            } => (
                INCORRECT_OWNER,
                vec![
                    Token::Address(*sender),
                    Token::Uint(*token_id),
                    Token::Address(*owner),
                ],
            ),
            Self::InvalidApprover { approver } => (INVALID_APPROVER, vec![Token::Address(*approver)]),
            Self::InvalidOperator { operator } => (INVALID_OPERATOR, vec![Token::Address(*operator)]),
            Self::InvalidReceiver { receiver } => (INVALID_RECEIVER, vec![Token::Address(*receiver)]),
            Self::Message(msg) => (ERROR_STRING, vec![Token::String(msg.clone())]),
            Self::Unknown { selector } => return Bytes::from(selector.to_vec()),
        };

        let mut out = id(signature).to_vec();
        out.extend(ethers::abi::encode(&tokens));
        out.into()
    }

    /// Map the revert onto the gateway error taxonomy.
    pub fn into_error(self, method: ContractMethod) -> GatewayError {
        match self {
            Self::InvalidSender if method == ContractMethod::Initialize => {
                GatewayError::AlreadyInitialized
            }
            Self::InvalidSender => GatewayError::Unauthorized {
                reason: format!("{} rejected the sender", method),
            },
            Self::InsufficientPayment => GatewayError::InsufficientPayment {
                reason: "attached value is below the mint price".to_string(),
            },
            Self::NonexistentToken { token_id } => GatewayError::NotFound {
                token_id: token_id.to_string(),
            },
            Self::InsufficientApproval { operator, token_id } => GatewayError::Unauthorized {
                reason: format!("{:?} is not approved for token {}", operator, token_id),
            },
            Self::IncorrectOwner {
                sender,
                token_id,
                owner,
            } => GatewayError::Unauthorized {
                reason: format!(
                    "token {} is owned by {:?}, not {:?}",
                    token_id, owner, sender
                ),
            },
            Self::InvalidApprover { approver } => GatewayError::Unauthorized {
                reason: format!("{:?} cannot approve this token", approver),
            },
            Self::InvalidOperator { operator } => {
                GatewayError::invalid_input(format!("invalid operator {:?}", operator))
            }
            Self::InvalidReceiver { receiver } => {
                GatewayError::invalid_input(format!("invalid receiver {:?}", receiver))
            }
            Self::Message(msg) => GatewayError::network(format!("{} reverted: {}", method, msg)),
            Self::Unknown { selector } => GatewayError::network(format!(
                "{} reverted with unknown error 0x{}",
                method,
                hex::encode(selector)
            )),
        }
    }
}

fn decode_args(types: &[ParamType], data: &[u8]) -> Option<Vec<Token>> {
    ethers::abi::decode(types, data).ok()
}

fn single_address(data: &[u8]) -> Option<Address> {
    decode_args(&[ParamType::Address], data)?.pop()?.into_address()
}
