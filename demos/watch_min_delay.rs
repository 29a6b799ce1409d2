// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Watch a network for delay changes
//!
//! Reads the network's name and delays, then streams `MinDelayChange` events.
//!
//! Required environment (a `.env` file works too):
//! - `RPC_URL`: HTTP endpoint of the chain the network lives on
//! - `NETWORK_ADDRESS`: address of the `INetwork` contract
//!
//! Optional:
//! - `FROM_BLOCK`: first block to scan, defaults to the current head
//!
//! Run with: `RUST_LOG=network_bindings=debug cargo run --example watch_min_delay`

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes};
use alloy_provider::ProviderBuilder;
use dotenvy::dotenv;
use futures::StreamExt;
use network_bindings::providers::{AlloyLogProvider, TokioClock};
use network_bindings::{MinDelayChangeFilter, NetworkContract, TimelockContract, WatchConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rpc_url = std::env::var("RPC_URL")?;
    let address: Address = std::env::var("NETWORK_ADDRESS")?.parse()?;
    let from_block = std::env::var("FROM_BLOCK")
        .ok()
        .map(|block| block.parse::<u64>())
        .transpose()?;

    let provider = ProviderBuilder::new().connect_http(rpc_url.parse()?);
    let network = NetworkContract::new(address, provider.clone());
    let timelock = TimelockContract::new(address, provider.clone());

    println!("Network:    {}", network.name().await?);
    println!("Metadata:   {}", network.metadata_uri().await?);
    println!("Registry:   {}", network.network_registry().await?);
    println!("Middleware: {}", network.network_middleware_service().await?);
    println!("Global min delay: {}s", timelock.get_min_delay().await?);
    println!(
        "Delay for empty calldata to itself: {}s\n",
        network.get_min_delay(address, Bytes::new()).await?
    );

    let filter = MinDelayChangeFilter::builder()
        .maybe_from_block(from_block)
        .build();
    let changes = network.watch_min_delay_changes(
        AlloyLogProvider::<Ethereum, _>::new(provider),
        TokioClock::new(),
        filter,
        WatchConfig::default(),
    );
    futures::pin_mut!(changes);

    println!("Watching MinDelayChange events (Ctrl-C to stop)...");
    while let Some(change) = changes.next().await {
        let change = change?;
        let event = &change.event;
        println!(
            "block {:>10}  {} {}  {} ({}) -> {} ({})",
            change.block_number().unwrap_or_default(),
            event.target,
            event.selector,
            event.oldDelay,
            if event.oldEnabledStatus { "on" } else { "off" },
            event.newDelay,
            if event.newEnabledStatus { "on" } else { "off" },
        );
    }
    Ok(())
}
