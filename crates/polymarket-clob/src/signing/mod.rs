//! EIP-712 signing for CLOB orders and authentication messages.
//!
//! # Architecture
//!
//! ```text
//! Signer ──── sign(digest) ───► 65-byte signature (v ∈ {27, 28})
//!   │
//!   ├── sign_order(OrderData, Eip712Domain) ──► SignedOrder
//!   │        (domain bound to the exchange chosen by contract_config)
//!   │
//!   └── sign_clob_auth_message(timestamp, nonce) ──► L1 header signature
//! ```
//!
//! # Example
//!
//! ```ignore
//! use polymarket_clob::signing::{contract_config, Eip712Domain, Signer};
//!
//! let signer = Signer::new("0x...", 137)?;
//! let contracts = contract_config(137, false)?;
//! let domain = Eip712Domain::exchange(137, contracts.exchange);
//! let signed = signer.sign_order(&order, &domain)?;
//! ```

pub mod contracts;
pub mod domain;
pub mod order_types;
pub mod signer;

pub use contracts::{contract_config, ContractConfig};
pub use domain::{
    typed_data_hash, ClobAuthDomain, Eip712Domain, OrderSide, SignatureType,
    POLYGON_AMOY_CHAIN_ID, POLYGON_CHAIN_ID,
};
pub use order_types::{generate_salt, OrderData, SignedOrder};
pub use signer::{Signer, CLOB_AUTH_MESSAGE};
