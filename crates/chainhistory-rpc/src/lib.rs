//! chainhistory-rpc: factomd JSON-RPC implementation of [`BlockSource`].
//!
//! - [`RpcTransport`]: async JSON-RPC transport trait
//! - [`HttpRpcClient`]: `reqwest` transport with retry and request timeout
//! - [`FactomdSource`]: maps `chain-head`, `entry-block` and `entry` onto
//!   [`BlockSource`]
//!
//! [`BlockSource`]: chainhistory_core::BlockSource

pub mod client;
pub mod config;
pub mod request;
pub mod retry;
pub mod source;
pub mod transport;
pub mod wire;

pub use client::HttpRpcClient;
pub use config::{RpcSourceConfig, DEFAULT_URL};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use retry::{RetryConfig, RetryPolicy};
pub use source::FactomdSource;
pub use transport::RpcTransport;
