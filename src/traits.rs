//! Core trait abstractions for log retrieval and time.
//!
//! Event queries and watchers only need two RPC methods and a clock. Putting
//! them behind traits lets tests drive a watcher through reorg-free block
//! sequences, provider failures and long idle periods without a node or real
//! sleeps.
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use network_bindings::{LogProvider, Result};
//! use alloy_rpc_types::{Filter, Log};
//!
//! struct FixedHead(u64);
//!
//! #[async_trait::async_trait]
//! impl LogProvider for FixedHead {
//!     async fn get_block_number(&self) -> Result<u64> {
//!         Ok(self.0)
//!     }
//!
//!     async fn get_logs(&self, _filter: &Filter) -> Result<Vec<Log>> {
//!         Ok(Vec::new())
//!     }
//! }
//! ```

use alloy_rpc_types::{Filter, Log};
use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Trait for the log RPC operations used by event queries and watchers.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Logs arriving across several polls
/// - Provider errors mid-stream
/// - Malformed log payloads
/// - Chains that advance slower than the poll interval
#[async_trait]
pub trait LogProvider: Send + Sync {
    /// Gets the current block number.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn get_block_number(&self) -> Result<u64>;

    /// Fetches the logs matching `filter`, as `eth_getLogs` does.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails or the node rejects the range.
    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>>;
}

/// Trait for time-based operations.
///
/// This trait abstracts sleep and time queries, enabling fast-forward testing
/// where tests can instantly advance through polling loops without actually
/// waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    fn now(&self) -> Instant;
}
