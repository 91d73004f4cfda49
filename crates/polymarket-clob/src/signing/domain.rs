//! EIP-712 domains and enums shared by order and authentication signing.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::error::UnsupportedConfig;

/// Chain ID for Polygon mainnet.
pub const POLYGON_CHAIN_ID: u64 = 137;

/// Chain ID for Polygon Amoy testnet.
pub const POLYGON_AMOY_CHAIN_ID: u64 = 80002;

const EXCHANGE_DOMAIN_NAME: &str = "Polymarket CTF Exchange";
const CLOB_AUTH_DOMAIN_NAME: &str = "ClobAuthDomain";
const DOMAIN_VERSION: &str = "1";

/// EIP-712 domain for order signing, bound to one exchange contract.
#[derive(Debug, Clone)]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: U256,
    pub verifying_contract: Address,
}

impl Eip712Domain {
    /// Domain of the exchange contract at `verifying_contract` on `chain_id`.
    pub fn exchange(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: EXCHANGE_DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id: U256::from(chain_id),
            verifying_contract,
        }
    }

    /// Compute the EIP-712 domain separator hash.
    pub fn separator(&self) -> B256 {
        let domain_type_hash = keccak256(
            b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
        );

        let name_hash = keccak256(self.name.as_bytes());
        let version_hash = keccak256(self.version.as_bytes());
        // encodeData pads the address to a full word
        let contract_padded = B256::left_padding_from(self.verifying_contract.as_slice());

        let encoded = (
            domain_type_hash,
            name_hash,
            version_hash,
            self.chain_id,
            contract_padded,
        )
            .abi_encode_packed();

        keccak256(&encoded)
    }
}

/// EIP-712 domain for CLOB authentication (no verifyingContract).
#[derive(Debug, Clone)]
pub struct ClobAuthDomain {
    pub name: String,
    pub version: String,
    pub chain_id: U256,
}

impl ClobAuthDomain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            name: CLOB_AUTH_DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id: U256::from(chain_id),
        }
    }

    /// Compute the EIP-712 domain separator hash.
    pub fn separator(&self) -> B256 {
        let domain_type_hash =
            keccak256(b"EIP712Domain(string name,string version,uint256 chainId)");

        let name_hash = keccak256(self.name.as_bytes());
        let version_hash = keccak256(self.version.as_bytes());

        let encoded =
            (domain_type_hash, name_hash, version_hash, self.chain_id).abi_encode_packed();

        keccak256(&encoded)
    }
}

/// keccak256("\x19\x01" ++ domainSeparator ++ structHash)
pub fn typed_data_hash(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut data = Vec::with_capacity(66);
    data.extend_from_slice(&[0x19, 0x01]);
    data.extend_from_slice(domain_separator.as_slice());
    data.extend_from_slice(struct_hash.as_slice());
    keccak256(&data)
}

/// Order side (buy/sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Numeric value used in the signed struct.
    pub fn as_u8(&self) -> u8 {
        match self {
            OrderSide::Buy => 0,
            OrderSide::Sell => 1,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Signature type for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SignatureType {
    /// Externally owned account.
    #[default]
    Eoa,
    /// Email/Magic proxy wallet.
    PolyProxy,
    /// Browser wallet proxy (Gnosis safe).
    PolyGnosisSafe,
}

impl SignatureType {
    /// Numeric value used in the signed struct.
    pub fn as_u8(&self) -> u8 {
        match self {
            SignatureType::Eoa => 0,
            SignatureType::PolyProxy => 1,
            SignatureType::PolyGnosisSafe => 2,
        }
    }
}

impl TryFrom<u8> for SignatureType {
    type Error = UnsupportedConfig;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SignatureType::Eoa),
            1 => Ok(SignatureType::PolyProxy),
            2 => Ok(SignatureType::PolyGnosisSafe),
            other => Err(UnsupportedConfig::SignatureType(other)),
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(value: SignatureType) -> Self {
        value.as_u8()
    }
}
