//! Exchange contract addresses per network.

use alloy_primitives::{address, Address};

use super::domain::{POLYGON_AMOY_CHAIN_ID, POLYGON_CHAIN_ID};
use crate::error::UnsupportedConfig;

/// Contracts an order is settled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractConfig {
    /// Exchange contract; the EIP-712 verifying contract for orders.
    pub exchange: Address,
    /// Collateral (USDC) token.
    pub collateral: Address,
    /// Conditional tokens framework contract.
    pub conditional_tokens: Address,
}

const POLYGON: ContractConfig = ContractConfig {
    exchange: address!("4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E"),
    collateral: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
    conditional_tokens: address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
};

const POLYGON_NEG_RISK: ContractConfig = ContractConfig {
    exchange: address!("C5d563A36AE78145C45a50134d48A1215220f80a"),
    collateral: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
    conditional_tokens: address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
};

const AMOY: ContractConfig = ContractConfig {
    exchange: address!("dFE02Eb6733538f8Ea35D585af8DE5958AD99E40"),
    collateral: address!("9c4e1703476e875070ee25b56a58b008cfb8fa78"),
    conditional_tokens: address!("69308FB512518e39F9b16112fA8d994F4e2Bf8bB"),
};

const AMOY_NEG_RISK: ContractConfig = ContractConfig {
    exchange: address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296"),
    collateral: address!("9c4e1703476e875070ee25b56a58b008cfb8fa78"),
    conditional_tokens: address!("69308FB512518e39F9b16112fA8d994F4e2Bf8bB"),
};

/// Look up the contracts for `chain_id`, using the neg-risk exchange when `neg_risk` is set.
pub fn contract_config(
    chain_id: u64,
    neg_risk: bool,
) -> std::result::Result<ContractConfig, UnsupportedConfig> {
    match (chain_id, neg_risk) {
        (POLYGON_CHAIN_ID, false) => Ok(POLYGON),
        (POLYGON_CHAIN_ID, true) => Ok(POLYGON_NEG_RISK),
        (POLYGON_AMOY_CHAIN_ID, false) => Ok(AMOY),
        (POLYGON_AMOY_CHAIN_ID, true) => Ok(AMOY_NEG_RISK),
        (other, _) => Err(UnsupportedConfig::ChainId(other)),
    }
}
