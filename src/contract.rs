//! Squiggle contract interface and call encoding.

use std::str::FromStr;

use ethers::abi::{Abi, Token};
use ethers::types::{Address, Bytes, U256};
use once_cell::sync::Lazy;

use crate::error::{GatewayError, Result};

/// Human-readable interface of the deployed Squiggle contract.
pub const SQUIGGLE_ABI: &[&str] = &[
    "function initialize(uint256 mintPrice)",
    "function name() view returns (string)",
    "function symbol() view returns (string)",
    "function balanceOf(address owner) view returns (uint256)",
    "function mint() payable",
    "function tokenURI(uint256 tokenId) view returns (string)",
    "function ownerOf(uint256 tokenId) view returns (address)",
    "function transferFrom(address from, address to, uint256 tokenId)",
    "function approve(address to, uint256 tokenId)",
    "function setApprovalForAll(address operator, bool approved)",
];

/// Parsed once and shared by every [`ContractReference`].
static SQUIGGLE_INTERFACE: Lazy<std::result::Result<Abi, String>> =
    Lazy::new(|| ethers::abi::parse_abi(SQUIGGLE_ABI).map_err(|e| e.to_string()));

/// Methods the gateway invokes on the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractMethod {
    Initialize,
    Name,
    Symbol,
    BalanceOf,
    Mint,
    TokenUri,
    OwnerOf,
    TransferFrom,
    Approve,
    SetApprovalForAll,
}

impl ContractMethod {
    /// Method name as it appears in the contract interface.
    pub fn name(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::BalanceOf => "balanceOf",
            Self::Mint => "mint",
            Self::TokenUri => "tokenURI",
            Self::OwnerOf => "ownerOf",
            Self::TransferFrom => "transferFrom",
            Self::Approve => "approve",
            Self::SetApprovalForAll => "setApprovalForAll",
        }
    }

    /// Whether the method changes contract state and needs confirmation.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Self::Initialize | Self::Mint | Self::TransferFrom | Self::Approve | Self::SetApprovalForAll
        )
    }
}

impl core::fmt::Display for ContractMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single call against the contract, ready for the chain client.
#[derive(Clone, Debug, PartialEq)]
pub struct CallRequest {
    pub method: ContractMethod,
    pub args: Vec<Token>,
    /// Value attached to the call, in minor units.
    pub value: Option<U256>,
    /// ABI-encoded calldata (selector followed by arguments).
    pub calldata: Bytes,
}

/// Address and interface of the deployed contract.
///
/// Built once and shared by every call the gateway makes.
#[derive(Clone, Debug)]
pub struct ContractReference {
    address: Address,
    abi: Abi,
}

impl ContractReference {
    /// Reference to a Squiggle deployment at `address`.
    pub fn squiggle(address: Address) -> Result<Self> {
        let abi = SQUIGGLE_INTERFACE
            .clone()
            .map_err(|reason| GatewayError::Interface { reason })?;
        Ok(Self { address, abi })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Precondition for every operation: the sentinel address means the
    /// contract was never configured.
    pub fn ensure_configured(&self) -> Result<()> {
        if self.address.is_zero() {
            return Err(GatewayError::NotConfigured);
        }
        Ok(())
    }

    /// Encode a call to `method`.
    pub fn request(
        &self,
        method: ContractMethod,
        args: Vec<Token>,
        value: Option<U256>,
    ) -> Result<CallRequest> {
        let function = self.function(method)?;
        let calldata = function
            .encode_input(&args)
            .map_err(|e| GatewayError::invalid_input(format!("encoding {}: {}", method, e)))?;

        Ok(CallRequest {
            method,
            args,
            value,
            calldata: calldata.into(),
        })
    }

    /// Decode the return data of a read call.
    pub fn decode_output(&self, method: ContractMethod, data: &[u8]) -> Result<Vec<Token>> {
        self.function(method)?
            .decode_output(data)
            .map_err(|e| GatewayError::network(format!("decoding {} output: {}", method, e)))
    }

    fn function(&self, method: ContractMethod) -> Result<&ethers::abi::Function> {
        self.abi
            .function(method.name())
            .map_err(|e| GatewayError::Interface {
                reason: format!("missing method {}: {}", method, e),
            })
    }
}

/// Parse a `0x`-prefixed, 20-byte hex address.
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| GatewayError::invalid_input(format!("address must start with 0x: {}", input)))?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GatewayError::invalid_input(format!(
            "address must be 40 hex characters: {}",
            input
        )));
    }

    Address::from_str(hex_part)
        .map_err(|e| GatewayError::invalid_input(format!("invalid address {}: {}", input, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ContractReference {
        ContractReference::squiggle(Address::repeat_byte(0x42)).unwrap()
    }

    #[test]
    fn test_interface_has_every_method() {
        let contract = reference();
        for method in [
            ContractMethod::Initialize,
            ContractMethod::Name,
            ContractMethod::Symbol,
            ContractMethod::BalanceOf,
            ContractMethod::Mint,
            ContractMethod::TokenUri,
            ContractMethod::OwnerOf,
            ContractMethod::TransferFrom,
            ContractMethod::Approve,
            ContractMethod::SetApprovalForAll,
        ] {
            assert!(contract.abi().function(method.name()).is_ok(), "{}", method);
        }
    }

    #[test]
    fn test_interface_is_shared_between_references() {
        let a = ContractReference::squiggle(Address::repeat_byte(1)).unwrap();
        let b = ContractReference::squiggle(Address::repeat_byte(2)).unwrap();
        assert_eq!(a.abi(), b.abi());
        assert_eq!((*SQUIGGLE_INTERFACE).as_ref().unwrap(), a.abi());
    }

    #[test]
    fn test_balance_of_calldata() {
        let owner = Address::repeat_byte(0x11);
        let req = reference()
            .request(ContractMethod::BalanceOf, vec![Token::Address(owner)], None)
            .unwrap();

        // balanceOf(address) = 0x70a08231
        assert_eq!(&req.calldata[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(req.calldata.len(), 4 + 32);
        assert_eq!(&req.calldata[16..36], owner.as_bytes());
    }

    #[test]
    fn test_wrong_arguments_rejected() {
        let err = reference()
            .request(ContractMethod::OwnerOf, vec![Token::Bool(true)], None)
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput { .. }));
    }

    #[test]
    fn test_sentinel_is_not_configured() {
        let contract = ContractReference::squiggle(Address::zero()).unwrap();
        assert_eq!(contract.ensure_configured(), Err(GatewayError::NotConfigured));
        assert!(reference().ensure_configured().is_ok());
    }

    #[test]
    fn test_write_methods() {
        assert!(ContractMethod::Mint.is_write());
        assert!(ContractMethod::SetApprovalForAll.is_write());
        assert!(!ContractMethod::TokenUri.is_write());
        assert!(!ContractMethod::BalanceOf.is_write());
    }

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0x7f916543a53e08b8cbd4a066a1079021d1c91572").unwrap();
        assert_eq!(
            format!("{:?}", addr),
            "0x7f916543a53e08b8cbd4a066a1079021d1c91572"
        );

        assert!(parse_address("7f916543a53e08b8cbd4a066a1079021d1c91572").is_err());
        assert!(parse_address("0x7f91").is_err());
        assert!(parse_address("0xzz916543a53e08b8cbd4a066a1079021d1c91572").is_err());
        assert!(parse_address("").is_err());
    }
}
