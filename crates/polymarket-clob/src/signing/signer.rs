//! Private-key signer for orders and L1 authentication messages.
//!
//! Signing operates on pre-computed EIP-712 digests: no EIP-191 text prefix is
//! applied, and the recovery id of the returned signature is in the {27, 28}
//! convention expected by the exchange.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolValue;
use std::str::FromStr;

use super::domain::{typed_data_hash, ClobAuthDomain, Eip712Domain};
use super::order_types::{OrderData, SignedOrder};
use crate::{Error, Result};

/// Fixed attestation signed for L1 authentication.
pub const CLOB_AUTH_MESSAGE: &str = "This message attests that I control the given wallet";

/// Owns a private key bound to one chain.
#[derive(Clone)]
pub struct Signer {
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl Signer {
    /// Create a signer from a hex private key (optionally `0x`-prefixed).
    #[allow(clippy::result_large_err)]
    pub fn new(private_key: &str, chain_id: u64) -> Result<Self> {
        let key = private_key.trim().trim_start_matches("0x");
        if key.is_empty() || chain_id == 0 {
            return Err(Error::Config {
                message: "private key and chain ID are required".to_string(),
            });
        }

        let signer = PrivateKeySigner::from_str(key).map_err(|e| Error::Config {
            message: format!("invalid private key: {}", e),
        })?;

        Ok(Self { signer, chain_id })
    }

    /// Wrap an existing key signer.
    pub fn from_signer(signer: PrivateKeySigner, chain_id: u64) -> Self {
        Self { signer, chain_id }
    }

    /// Address derived from the key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a 32-byte digest and return the `0x`-prefixed 65-byte signature.
    #[allow(clippy::result_large_err)]
    pub fn sign(&self, hash: &B256) -> Result<String> {
        let signature = self
            .signer
            .sign_hash_sync(hash)
            .map_err(|e| Error::Signing {
                message: format!("signing failed: {}", e),
            })?;

        let mut bytes = signature.as_bytes();
        if bytes[64] < 27 {
            bytes[64] += 27;
        }

        Ok(format!("0x{}", hex::encode(bytes)))
    }

    /// Sign an order for the exchange described by `domain`.
    #[allow(clippy::result_large_err)]
    pub fn sign_order(&self, order: &OrderData, domain: &Eip712Domain) -> Result<SignedOrder> {
        let digest = typed_data_hash(domain.separator(), order.struct_hash());
        let signature = self.sign(&digest)?;
        Ok(SignedOrder::from_order_data(order, signature))
    }

    /// Sign the ClobAuth attestation used by L1 headers.
    ///
    /// ClobAuth(address address, string timestamp, uint256 nonce, string message)
    #[allow(clippy::result_large_err)]
    pub fn sign_clob_auth_message(&self, timestamp: u64, nonce: u64) -> Result<String> {
        let domain = ClobAuthDomain::new(self.chain_id);
        let struct_hash = clob_auth_struct_hash(self.address(), timestamp, nonce);
        let digest = typed_data_hash(domain.separator(), struct_hash);
        self.sign(&digest)
    }
}

/// EIP-712 struct hash for ClobAuth. Each field is one 32-byte word.
fn clob_auth_struct_hash(address: Address, timestamp: u64, nonce: u64) -> B256 {
    let type_hash =
        keccak256(b"ClobAuth(address address,string timestamp,uint256 nonce,string message)");

    let timestamp_hash = keccak256(timestamp.to_string().as_bytes());
    let message_hash = keccak256(CLOB_AUTH_MESSAGE.as_bytes());
    let address_padded = B256::left_padding_from(address.as_slice());

    let encoded = (
        type_hash,
        address_padded,
        timestamp_hash,
        U256::from(nonce),
        message_hash,
    )
        .abi_encode_packed();

    keccak256(&encoded)
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("address", &format!("{:?}", self.address()))
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
