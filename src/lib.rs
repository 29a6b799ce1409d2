//! # network-bindings
//!
//! Typed Rust bindings for the `INetwork` timelock contract and the
//! `ISetMaxNetworkLimitHook` interface.
//!
//! An `INetwork` is an OpenZeppelin `TimelockController` that keeps a
//! minimum execution delay per target and selector, a display name and a
//! metadata URI, and lets its middleware service set maximum network limits
//! on delegators.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use network_bindings::{NetworkContract, NetworkError};
//! use alloy_primitives::{address, fixed_bytes, U256};
//!
//! # async fn example() -> Result<(), NetworkError> {
//! # use alloy_provider::ProviderBuilder;
//! let provider = ProviderBuilder::new()
//!     .connect("http://localhost:8545")
//!     .await
//!     .map_err(NetworkError::Rpc)?;
//! let network = NetworkContract::new(
//!     address!("1234567890123456789012345678901234567890"),
//!     provider,
//! );
//!
//! // Reads run as eth_call
//! let name = network.name().await?;
//!
//! // Writes come back as unsigned transaction requests
//! let admin = address!("0987654321098765432109876543210987654321");
//! let tx = network.update_delay_transaction(
//!     admin,
//!     network.address(),
//!     fixed_bytes!("84da92a7"),
//!     true,
//!     U256::from(86_400),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Watching Events
//!
//! ```rust,no_run
//! use network_bindings::{MinDelayChangeFilter, NetworkContract, WatchConfig};
//! use network_bindings::providers::{AlloyLogProvider, TokioClock};
//! use alloy_network::Ethereum;
//! use alloy_primitives::address;
//! use alloy_provider::ProviderBuilder;
//! use futures::StreamExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
//! let network = NetworkContract::new(
//!     address!("1234567890123456789012345678901234567890"),
//!     provider.clone(),
//! );
//!
//! let changes = network.watch_min_delay_changes(
//!     AlloyLogProvider::<Ethereum, _>::new(provider),
//!     TokioClock::new(),
//!     MinDelayChangeFilter::default(),
//!     WatchConfig::default(),
//! );
//! futures::pin_mut!(changes);
//! while let Some(change) = changes.next().await {
//!     let change = change?;
//!     println!("{} -> {}", change.event.oldDelay, change.event.newDelay);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Public API
//!
//! - [`NetworkContract`], [`SetMaxNetworkLimitHookContract`] and
//!   [`TimelockContract`] - contract wrappers
//! - [`abi`] - runtime view of the embedded ABIs (signatures, selectors,
//!   topics, dynamic decoding)
//! - [`events`] - filters, decoders and the polling [`EventWatcher`]
//! - [`history`] - operations, role members and delays rebuilt from events
//! - [`decode_revert`] and [`NetworkRevert`] - typed revert decoding
//! - [`timelock`] - operation ids, states and roles
//! - [`NetworkError`] and [`Result`] - error types

pub mod abi;
mod config;
pub mod contracts;
mod error;
pub mod events;
pub mod history;
pub mod providers;
mod revert;
pub mod spans;
pub mod testing;
pub mod timelock;
mod traits;

pub use config::WatchConfig;
pub use contracts::{
    network::{DelayParams, InitParams, NetworkContract, NetworkInitParams},
    set_max_network_limit_hook::SetMaxNetworkLimitHookContract,
    timelock::TimelockContract,
};
pub use error::{NetworkError, Result};
pub use events::{EventFilter, EventLog, EventWatcher, MinDelayChangeFilter, SignatureFilter};
pub use history::{DelayEntry, RoleMembers, ScheduledCall, ScheduledOperation};
pub use revert::{decode_revert, revert_from_contract_error, NetworkRevert};
pub use timelock::{BatchOperation, Operation, OperationState, Role};
pub use traits::{Clock, LogProvider};
