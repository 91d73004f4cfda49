//! Per-token market metadata cache.
//!
//! Tick size, neg-risk flag and fee rate are fetched once per token and kept
//! for the lifetime of the client. Writes are insert-if-absent, so two
//! concurrent fetches for the same token settle on the first value stored.

use dashmap::DashMap;
use tracing::debug;

use crate::order::TickSize;

#[derive(Debug, Default)]
pub struct MarketMetadataCache {
    tick_sizes: DashMap<String, TickSize>,
    neg_risk: DashMap<String, bool>,
    fee_rates: DashMap<String, u32>,
}

impl MarketMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_size(&self, token_id: &str) -> Option<TickSize> {
        self.tick_sizes.get(token_id).map(|v| *v)
    }

    /// Store a fetched tick size and return the value now cached.
    pub fn insert_tick_size(&self, token_id: &str, tick_size: TickSize) -> TickSize {
        let cached = *self
            .tick_sizes
            .entry(token_id.to_string())
            .or_insert(tick_size);
        debug!(token_id, tick_size = %cached, "Cached tick size");
        cached
    }

    pub fn neg_risk(&self, token_id: &str) -> Option<bool> {
        self.neg_risk.get(token_id).map(|v| *v)
    }

    pub fn insert_neg_risk(&self, token_id: &str, neg_risk: bool) -> bool {
        let cached = *self.neg_risk.entry(token_id.to_string()).or_insert(neg_risk);
        debug!(token_id, neg_risk = cached, "Cached neg-risk flag");
        cached
    }

    pub fn fee_rate_bps(&self, token_id: &str) -> Option<u32> {
        self.fee_rates.get(token_id).map(|v| *v)
    }

    pub fn insert_fee_rate_bps(&self, token_id: &str, fee_rate_bps: u32) -> u32 {
        let cached = *self
            .fee_rates
            .entry(token_id.to_string())
            .or_insert(fee_rate_bps);
        debug!(token_id, fee_rate_bps = cached, "Cached fee rate");
        cached
    }

    /// Number of tokens with any cached field.
    pub fn len(&self) -> usize {
        let mut tokens: Vec<String> = self
            .tick_sizes
            .iter()
            .map(|e| e.key().clone())
            .chain(self.neg_risk.iter().map(|e| e.key().clone()))
            .chain(self.fee_rates.iter().map(|e| e.key().clone()))
            .collect();
        tokens.sort_unstable();
        tokens.dedup();
        tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tick_sizes.is_empty() && self.neg_risk.is_empty() && self.fee_rates.is_empty()
    }
}
