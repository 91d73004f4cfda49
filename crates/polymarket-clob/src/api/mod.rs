//! CLOB REST client and its HTTP transport.

pub mod clob;
pub mod endpoints;
pub mod transport;

pub use clob::{ClobClient, OpenOrderParams};
pub use transport::{HttpRequest, ReqwestTransport, ResponseBody, Transport};
