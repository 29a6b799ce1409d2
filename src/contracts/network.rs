// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! INetwork contract bindings and wrapper
//!
//! This module contains the Alloy-generated bindings for the `INetwork`
//! contract, a timelocked network that holds per target/selector execution
//! delays, its name and metadata URI, and forwards `setMaxNetworkLimit` to
//! delegators on behalf of its middleware.

use std::future::IntoFuture;

use alloy_network::Ethereum;
use alloy_primitives::{aliases::U96, Address, Bytes, FixedBytes, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{Filter, Log, TransactionRequest};
use alloy_sol_types::sol;
use bon::Builder;
use futures::Stream;
use tracing::{debug, info};

use crate::config::WatchConfig;
use crate::error::Result;
use crate::events::{
    self, EventFilter, EventLog, EventWatcher, MinDelayChangeFilter, SignatureFilter,
};
use crate::history::{self, DelayEntry};
use crate::traits::{Clock, LogProvider};
use INetwork::{INetworkInstance, MetadataURISet, MinDelayChange, NameSet};

pub use INetwork::{DelayParams, NetworkInitParams};

/// Filter for `NameSet` events.
pub type NameSetFilter = SignatureFilter<NameSet>;

/// Filter for `MetadataURISet` events.
pub type MetadataUriSetFilter = SignatureFilter<MetadataURISet>;

/// Parameters for `initialize`, with named setters and defaults.
///
/// Converts into the generated [`NetworkInitParams`] struct.
///
/// # Example
///
/// ```rust
/// use network_bindings::InitParams;
/// use alloy_primitives::{address, U256};
///
/// let admin = address!("1234567890123456789012345678901234567890");
/// let params = InitParams::builder()
///     .global_min_delay(U256::from(86_400))
///     .name("My Network")
///     .default_admin_role_holder(admin)
///     .proposers(vec![admin])
///     .executors(vec![admin])
///     .build();
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct InitParams {
    global_min_delay: U256,
    #[builder(default)]
    delay_params: Vec<DelayParams>,
    #[builder(default)]
    proposers: Vec<Address>,
    #[builder(default)]
    executors: Vec<Address>,
    #[builder(into)]
    name: String,
    #[builder(into, default)]
    metadata_uri: String,
    default_admin_role_holder: Address,
    #[builder(default)]
    name_update_role_holder: Address,
    #[builder(default)]
    metadata_uri_update_role_holder: Address,
}

impl From<InitParams> for NetworkInitParams {
    fn from(params: InitParams) -> Self {
        NetworkInitParams {
            globalMinDelay: params.global_min_delay,
            delayParams: params.delay_params,
            proposers: params.proposers,
            executors: params.executors,
            name: params.name,
            metadataURI: params.metadata_uri,
            defaultAdminRoleHolder: params.default_admin_role_holder,
            nameUpdateRoleHolder: params.name_update_role_holder,
            metadataURIUpdateRoleHolder: params.metadata_uri_update_role_holder,
        }
    }
}

impl DelayParams {
    /// Delay applied to calls of `selector` on `target`.
    pub fn new(target: Address, selector: FixedBytes<4>, delay: U256) -> Self {
        Self {
            target,
            selector,
            delay,
        }
    }
}

/// The INetwork contract wrapper
///
/// Reads are executed with `eth_call`. Writes are returned as
/// [`TransactionRequest`]s for the caller to sign and send.
///
/// # Example
///
/// ```rust,no_run
/// use network_bindings::NetworkContract;
/// use alloy_primitives::address;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
/// let network = NetworkContract::new(
///     address!("1234567890123456789012345678901234567890"),
///     provider,
/// );
///
/// let name = network.name().await?;
/// let registry = network.network_registry().await?;
/// # Ok(())
/// # }
/// ```
pub struct NetworkContract<P: Provider<Ethereum>> {
    instance: INetworkInstance<P>,
}

impl<P: Provider<Ethereum>> NetworkContract<P> {
    /// Create a new NetworkContract
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "network_contract_initialized"
        );
        Self {
            instance: INetworkInstance::new(address, provider),
        }
    }

    /// Returns the contract address
    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    /// The network's display name
    pub async fn name(&self) -> Result<String> {
        let name = self.read("name", self.instance.name().call()).await?;

        debug!(
            contract_address = %self.address(),
            name = %name,
            event = "name_retrieved"
        );
        Ok(name)
    }

    /// The network's metadata URI
    pub async fn metadata_uri(&self) -> Result<String> {
        let uri = self
            .read("metadataURI", self.instance.metadataURI().call())
            .await?;

        debug!(
            contract_address = %self.address(),
            metadata_uri = %uri,
            event = "metadata_uri_retrieved"
        );
        Ok(uri)
    }

    /// Minimum delay that applies to executing `data` against `target`.
    ///
    /// The contract resolves the delay from the selector at the start of
    /// `data`, falling back to the global minimum delay.
    pub async fn get_min_delay(&self, target: Address, data: Bytes) -> Result<U256> {
        let delay = self
            .read("getMinDelay", self.instance.getMinDelay(target, data).call())
            .await?;

        info!(
            contract_address = %self.address(),
            target = %target,
            min_delay = %delay,
            event = "min_delay_retrieved"
        );
        Ok(delay)
    }

    /// Role allowed to call `updateName`
    pub async fn name_update_role(&self) -> Result<B256> {
        self.read("NAME_UPDATE_ROLE", self.instance.NAME_UPDATE_ROLE().call())
            .await
    }

    /// Role allowed to call `updateMetadataURI`
    pub async fn metadata_uri_update_role(&self) -> Result<B256> {
        self.read(
            "METADATA_URI_UPDATE_ROLE",
            self.instance.METADATA_URI_UPDATE_ROLE().call(),
        )
        .await
    }

    /// Address of the network registry the network registered with
    pub async fn network_registry(&self) -> Result<Address> {
        self.read("NETWORK_REGISTRY", self.instance.NETWORK_REGISTRY().call())
            .await
    }

    /// Address of the network middleware service
    pub async fn network_middleware_service(&self) -> Result<Address> {
        self.read(
            "NETWORK_MIDDLEWARE_SERVICE",
            self.instance.NETWORK_MIDDLEWARE_SERVICE().call(),
        )
        .await
    }

    /// Create transaction request for `initialize`
    pub fn initialize_transaction(
        &self,
        from_address: Address,
        params: impl Into<NetworkInitParams>,
    ) -> TransactionRequest {
        let params = params.into();
        info!(
            from_address = %from_address,
            global_min_delay = %params.globalMinDelay,
            delay_params = params.delayParams.len(),
            proposers = params.proposers.len(),
            executors = params.executors.len(),
            name = %params.name,
            contract_address = %self.address(),
            event = "initialize_transaction_created"
        );

        self.instance
            .initialize(params)
            .from(from_address)
            .into_transaction_request()
    }

    /// Create transaction request for `updateDelay`
    ///
    /// Sets (or, with `enabled = false`, clears) the delay that applies to
    /// calls of `selector` on `target`.
    pub fn update_delay_transaction(
        &self,
        from_address: Address,
        target: Address,
        selector: FixedBytes<4>,
        enabled: bool,
        new_delay: U256,
    ) -> TransactionRequest {
        info!(
            from_address = %from_address,
            target = %target,
            selector = %selector,
            enabled = enabled,
            new_delay = %new_delay,
            contract_address = %self.address(),
            event = "update_delay_transaction_created"
        );

        self.instance
            .updateDelay(target, selector, enabled, new_delay)
            .from(from_address)
            .into_transaction_request()
    }

    /// Create transaction request for `updateName`
    pub fn update_name_transaction(
        &self,
        from_address: Address,
        name: impl Into<String>,
    ) -> TransactionRequest {
        let name = name.into();
        info!(
            from_address = %from_address,
            name = %name,
            contract_address = %self.address(),
            event = "update_name_transaction_created"
        );

        self.instance
            .updateName(name)
            .from(from_address)
            .into_transaction_request()
    }

    /// Create transaction request for `updateMetadataURI`
    pub fn update_metadata_uri_transaction(
        &self,
        from_address: Address,
        metadata_uri: impl Into<String>,
    ) -> TransactionRequest {
        let metadata_uri = metadata_uri.into();
        info!(
            from_address = %from_address,
            metadata_uri = %metadata_uri,
            contract_address = %self.address(),
            event = "update_metadata_uri_transaction_created"
        );

        self.instance
            .updateMetadataURI(metadata_uri)
            .from(from_address)
            .into_transaction_request()
    }

    /// Create transaction request for `setMaxNetworkLimit`
    ///
    /// Only the network middleware service may call this; anyone else gets a
    /// `NotMiddleware` revert.
    pub fn set_max_network_limit_transaction(
        &self,
        from_address: Address,
        delegator: Address,
        subnetwork_id: U96,
        max_network_limit: U256,
    ) -> TransactionRequest {
        info!(
            from_address = %from_address,
            delegator = %delegator,
            subnetwork_id = %subnetwork_id,
            max_network_limit = %max_network_limit,
            contract_address = %self.address(),
            event = "set_max_network_limit_transaction_created"
        );

        self.instance
            .setMaxNetworkLimit(delegator, subnetwork_id, max_network_limit)
            .from(from_address)
            .into_transaction_request()
    }

    /// The RPC filter for `MinDelayChange` events matching `filter`
    pub fn min_delay_change_filter(&self, filter: &MinDelayChangeFilter) -> Filter {
        filter.to_filter(self.address())
    }

    /// Fetch `MinDelayChange` events matching `filter`
    ///
    /// History is fetched in ranges of the default
    /// [`WatchConfig::max_block_range`].
    pub async fn query_min_delay_changes<L: LogProvider>(
        &self,
        logs: &L,
        filter: &MinDelayChangeFilter,
    ) -> Result<Vec<EventLog<MinDelayChange>>> {
        self.query_events(logs, filter, &WatchConfig::default()).await
    }

    /// Fetch events of any kind emitted by this contract that match `filter`,
    /// at most `config.max_block_range` blocks per request
    pub async fn query_events<L, F>(
        &self,
        logs: &L,
        filter: &F,
        config: &WatchConfig,
    ) -> Result<Vec<EventLog<F::Event>>>
    where
        L: LogProvider,
        F: EventFilter,
    {
        events::query_events(logs, self.address(), filter, config).await
    }

    /// The current delay for every target and selector ever configured
    ///
    /// Replays `MinDelayChange` events from `from_block`, keeping the latest
    /// change per pair.
    pub async fn current_delays<L: LogProvider>(
        &self,
        logs: &L,
        from_block: u64,
        config: &WatchConfig,
    ) -> Result<Vec<DelayEntry>> {
        let delays =
            history::query_current_delays(logs, self.address(), from_block, config).await?;

        info!(
            contract_address = %self.address(),
            delays = delays.len(),
            event = "current_delays_loaded"
        );
        Ok(delays)
    }

    /// Stream `MinDelayChange` events as they are mined
    ///
    /// The stream stops on the first provider or decode error, after yielding
    /// it, and polling stops when the stream is dropped.
    pub fn watch_min_delay_changes<L, C>(
        &self,
        logs: L,
        clock: C,
        filter: MinDelayChangeFilter,
        config: WatchConfig,
    ) -> impl Stream<Item = Result<EventLog<MinDelayChange>>> + Send + 'static
    where
        L: LogProvider + 'static,
        C: Clock + 'static,
    {
        self.watch_events(logs, clock, filter, config)
    }

    /// Stream events of any kind emitted by this contract that match `filter`
    pub fn watch_events<L, C, F>(
        &self,
        logs: L,
        clock: C,
        filter: F,
        config: WatchConfig,
    ) -> impl Stream<Item = Result<EventLog<F::Event>>> + Send + 'static
    where
        L: LogProvider + 'static,
        C: Clock + 'static,
        F: EventFilter + 'static,
    {
        EventWatcher::builder()
            .logs(logs)
            .clock(clock)
            .address(self.address())
            .filter(filter)
            .config(config)
            .build()
            .into_stream()
    }

    /// Decode a `MinDelayChange` log
    pub fn parse_min_delay_change(log: &Log) -> Result<EventLog<MinDelayChange>> {
        events::decode_event(log)
    }

    /// Decode a `NameSet` log
    pub fn parse_name_set(log: &Log) -> Result<EventLog<NameSet>> {
        events::decode_event(log)
    }

    /// Decode a `MetadataURISet` log
    pub fn parse_metadata_uri_set(log: &Log) -> Result<EventLog<MetadataURISet>> {
        events::decode_event(log)
    }

    async fn read<T, C>(&self, method: &'static str, call: C) -> Result<T>
    where
        C: IntoFuture<Output = std::result::Result<T, alloy_contract::Error>>,
    {
        super::traced_call("INetwork", self.address(), method, call).await
    }
}

sol!(
    #[allow(clippy::too_many_arguments)]
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    INetwork,
    "abis/INetwork.json"
);
