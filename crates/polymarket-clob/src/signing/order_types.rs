//! Exchange order structures for EIP-712 signing and submission.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::domain::{OrderSide, SignatureType};

/// Largest salt the CLOB accepts (IEEE 754 safe integer range).
const MAX_SALT: u64 = (1u64 << 53) - 1;

/// Unsigned order, field for field the struct the exchange contract verifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderData {
    /// Random salt for uniqueness.
    pub salt: U256,
    /// Funding address.
    pub maker: Address,
    /// Address whose key signs the order.
    pub signer: Address,
    /// Counterparty; zero for any taker.
    pub taker: Address,
    pub token_id: U256,
    /// Maker amount in 6-decimal base units.
    pub maker_amount: U256,
    /// Taker amount in 6-decimal base units.
    pub taker_amount: U256,
    /// Unix seconds; zero for no expiry.
    pub expiration: U256,
    pub nonce: U256,
    pub fee_rate_bps: U256,
    pub side: OrderSide,
    pub signature_type: SignatureType,
}

impl OrderData {
    /// Compute the EIP-712 struct hash for this order.
    pub fn struct_hash(&self) -> B256 {
        let order_type_hash = keccak256(
            b"Order(uint256 salt,address maker,address signer,address taker,uint256 tokenId,uint256 makerAmount,uint256 takerAmount,uint256 expiration,uint256 nonce,uint256 feeRateBps,uint8 side,uint8 signatureType)",
        );

        // Addresses are left-padded from 20 bytes to 32 bytes.
        let maker_padded = B256::left_padding_from(self.maker.as_slice());
        let signer_padded = B256::left_padding_from(self.signer.as_slice());
        let taker_padded = B256::left_padding_from(self.taker.as_slice());

        let encoded = (
            order_type_hash,
            self.salt,
            maker_padded,
            signer_padded,
            taker_padded,
            self.token_id,
            self.maker_amount,
            self.taker_amount,
            self.expiration,
            self.nonce,
            self.fee_rate_bps,
            U256::from(self.side.as_u8()),
            U256::from(self.signature_type.as_u8()),
        )
            .abi_encode_packed();

        keccak256(&encoded)
    }
}

/// Random salt masked to the range the CLOB API accepts.
pub fn generate_salt() -> U256 {
    U256::from(rand::rng().random::<u64>() & MAX_SALT)
}

/// A signed order ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    /// Order salt (must be a JSON number).
    pub salt: u64,
    pub maker: String,
    pub signer: String,
    pub taker: String,
    pub token_id: String,
    pub maker_amount: String,
    pub taker_amount: String,
    pub expiration: String,
    pub nonce: String,
    pub fee_rate_bps: String,
    pub side: OrderSide,
    pub signature_type: u8,
    /// EIP-712 signature as hex string.
    pub signature: String,
}

impl SignedOrder {
    /// Create from order data and signature.
    pub fn from_order_data(order: &OrderData, signature: String) -> Self {
        Self {
            salt: order.salt.saturating_to::<u64>(),
            maker: order.maker.to_checksum(None),
            signer: order.signer.to_checksum(None),
            taker: order.taker.to_checksum(None),
            token_id: order.token_id.to_string(),
            maker_amount: order.maker_amount.to_string(),
            taker_amount: order.taker_amount.to_string(),
            expiration: order.expiration.to_string(),
            nonce: order.nonce.to_string(),
            fee_rate_bps: order.fee_rate_bps.to_string(),
            side: order.side,
            signature_type: order.signature_type.as_u8(),
            signature,
        }
    }
}
