//! CLOB SDK: Polymarket order construction and request authentication
//!
//! This is the root crate that provides benchmark and demo access to the client.
//! The functionality lives in `polymarket-clob`:
//!
//! - `signing`: EIP-712 order and ClobAuth signatures
//! - `auth`: L1 (wallet) and L2 (HMAC) request headers
//! - `order`: rounding, amount calculation, market price resolution, order assembly
//! - `api`: the REST client and its transport seam

// Re-export for benchmarks
pub use polymarket_clob as clob;
