//! Integration tests for event queries and watching using fake implementations
//!
//! The watcher is driven entirely by `FakeLogProvider` and `FakeClock`, so
//! block progression, provider failures and idle polls are deterministic.

use alloy_primitives::{address, fixed_bytes, Address, FixedBytes, LogData, U256};
use alloy_provider::ProviderBuilder;
use alloy_rpc_types::Log;
use alloy_sol_types::SolEvent;
use futures::StreamExt;
use network_bindings::contracts::network::INetwork::{MinDelayChange, NameSet};
use network_bindings::testing::{FakeClock, FakeLogProvider};
use network_bindings::{
    EventWatcher, MinDelayChangeFilter, NetworkContract, NetworkError, SignatureFilter,
    WatchConfig,
};
use std::time::Duration;

const NETWORK: Address = address!("00000000000000000000000000000000000000aa");
const TARGET_A: Address = address!("1111111111111111111111111111111111111111");
const TARGET_B: Address = address!("2222222222222222222222222222222222222222");
const TARGET_C: Address = address!("3333333333333333333333333333333333333333");
const SET_MAX_NETWORK_LIMIT: FixedBytes<4> = fixed_bytes!("6773522c");

fn min_delay_log(target: Address, new_delay: u64, block: u64) -> Log {
    let event = MinDelayChange {
        target,
        selector: SET_MAX_NETWORK_LIMIT,
        oldEnabledStatus: false,
        oldDelay: U256::ZERO,
        newEnabledStatus: true,
        newDelay: U256::from(new_delay),
    };
    log_at(event.encode_log_data(), block)
}

fn log_at(data: LogData, block: u64) -> Log {
    Log {
        inner: alloy_primitives::Log {
            address: NETWORK,
            data,
        },
        block_number: Some(block),
        ..Default::default()
    }
}

fn watch(
    provider: &FakeLogProvider,
    clock: &FakeClock,
    filter: MinDelayChangeFilter,
    config: WatchConfig,
) -> impl futures::Stream<Item = network_bindings::Result<network_bindings::EventLog<MinDelayChange>>>
{
    EventWatcher::builder()
        .logs(provider.clone())
        .clock(clock.clone())
        .address(NETWORK)
        .filter(filter)
        .config(config)
        .build()
        .into_stream()
}

#[tokio::test]
async fn test_watcher_walks_ranges_and_finishes_at_to_block() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();
    provider.set_head(10);
    for block in [2, 5, 9] {
        provider.push_log(min_delay_log(TARGET_A, block * 100, block));
    }

    let filter = MinDelayChangeFilter::builder()
        .from_block(0)
        .to_block(9)
        .build();
    let config = WatchConfig::default().with_max_block_range(4);

    let events: Vec<_> = watch(&provider, &clock, filter, config).collect().await;

    let blocks: Vec<_> = events
        .iter()
        .map(|event| event.as_ref().unwrap().block_number().unwrap())
        .collect();
    assert_eq!(blocks, vec![2, 5, 9]);

    // [0, 3], [4, 7], [8, 9]
    let ranges: Vec<_> = provider
        .queries()
        .iter()
        .map(|q| (q.get_from_block().unwrap(), q.get_to_block().unwrap()))
        .collect();
    assert_eq!(ranges, vec![(0, 3), (4, 7), (8, 9)]);
    assert_eq!(clock.sleep_count(), 0, "Should never idle while behind the head");
}

#[tokio::test]
async fn test_watcher_sleeps_when_caught_up() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();
    provider.push_heads([3, 3, 6]);
    provider.push_log(min_delay_log(TARGET_A, 60, 5));

    let config = WatchConfig::default().with_poll_interval(Duration::from_secs(12));
    let filter = MinDelayChangeFilter::builder().from_block(1).build();
    let mut stream = Box::pin(watch(&provider, &clock, filter, config));

    let first = stream.next().await.unwrap().unwrap();

    assert_eq!(first.block_number(), Some(5));
    assert_eq!(first.event.newDelay, U256::from(60));
    assert_eq!(clock.sleep_count(), 1);
    assert_eq!(clock.total_sleep_time(), Duration::from_secs(12));
}

#[tokio::test]
async fn test_watcher_yields_provider_error_once_then_ends() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();
    provider.set_head(10);
    provider.push_log(min_delay_log(TARGET_A, 60, 2));
    provider.fail_next_get_logs();

    let filter = MinDelayChangeFilter::builder().from_block(0).build();
    let mut stream = Box::pin(watch(&provider, &clock, filter, WatchConfig::default()));

    let first = stream.next().await.unwrap();
    assert!(
        matches!(first, Err(NetworkError::Provider(_))),
        "Expected the simulated provider error"
    );
    assert!(stream.next().await.is_none(), "Stream should end after an error");
}

#[tokio::test]
async fn test_watcher_block_number_failure_ends_stream() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();
    provider.fail_next_block_number();

    let events: Vec<_> = watch(
        &provider,
        &clock,
        MinDelayChangeFilter::default(),
        WatchConfig::default(),
    )
    .collect()
    .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Err(NetworkError::Provider(_))));
    assert!(provider.queries().is_empty());
}

#[tokio::test]
async fn test_watcher_delivers_events_before_decode_error() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();
    provider.set_head(3);
    provider.push_log(min_delay_log(TARGET_A, 10, 1));

    // Right topics, truncated body
    let valid = min_delay_log(TARGET_A, 20, 2);
    let truncated = LogData::new_unchecked(valid.topics().to_vec(), vec![0u8; 31].into());
    provider.push_log(log_at(truncated, 2));
    provider.push_log(min_delay_log(TARGET_A, 30, 3));

    let filter = MinDelayChangeFilter::builder()
        .from_block(0)
        .to_block(3)
        .build();
    let events: Vec<_> = watch(&provider, &clock, filter, WatchConfig::default())
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].as_ref().unwrap().event.newDelay,
        U256::from(10)
    );
    assert!(matches!(events[1], Err(NetworkError::Abi(_))));
}

#[tokio::test]
async fn test_watcher_stays_behind_head_by_confirmations() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();
    provider.push_heads([10, 10, 11]);
    provider.push_log(min_delay_log(TARGET_A, 6, 6));
    provider.push_log(min_delay_log(TARGET_A, 8, 8));

    let config = WatchConfig::default().with_confirmations(3);
    let filter = MinDelayChangeFilter::builder().from_block(5).build();
    let mut stream = Box::pin(watch(&provider, &clock, filter, config));

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.block_number(), Some(6));
    assert_eq!(provider.queries()[0].get_to_block(), Some(7));

    // Block 8 becomes safe once the head reaches 11
    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(second.block_number(), Some(8));
    assert_eq!(clock.sleep_count(), 1);
}

#[tokio::test]
async fn test_watcher_without_from_block_starts_at_head() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();
    provider.set_head(10);
    provider.push_log(min_delay_log(TARGET_A, 5, 5));
    provider.push_log(min_delay_log(TARGET_B, 10, 10));

    let mut stream = Box::pin(watch(
        &provider,
        &clock,
        MinDelayChangeFilter::default(),
        WatchConfig::default(),
    ));

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.event.target, TARGET_B);
    assert_eq!(provider.queries()[0].get_from_block(), Some(10));
}

#[tokio::test]
async fn test_watcher_applies_target_set() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();
    provider.set_head(5);
    provider.push_log(min_delay_log(TARGET_A, 1, 1));
    provider.push_log(min_delay_log(TARGET_B, 2, 2));
    provider.push_log(min_delay_log(TARGET_C, 3, 3));

    let filter = MinDelayChangeFilter::builder()
        .targets(vec![TARGET_A, TARGET_C])
        .from_block(0)
        .to_block(5)
        .build();
    let targets: Vec<_> = watch(&provider, &clock, filter, WatchConfig::default())
        .map(|event| event.unwrap().event.target)
        .collect()
        .await;

    assert_eq!(targets, vec![TARGET_A, TARGET_C]);
}

#[tokio::test]
async fn test_watcher_rejects_invalid_config() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();

    let config = WatchConfig::default().with_max_block_range(0);
    let events: Vec<_> = watch(&provider, &clock, MinDelayChangeFilter::default(), config)
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Err(NetworkError::InvalidConfig(_))));
    assert!(provider.queries().is_empty());
}

#[tokio::test]
async fn test_contract_query_and_watch_through_wrapper() {
    let provider = FakeLogProvider::new();
    let clock = FakeClock::new();
    provider.set_head(4);
    provider.push_log(min_delay_log(TARGET_A, 1, 1));
    provider.push_log(log_at(
        NameSet {
            name: "Renamed".to_string(),
        }
        .encode_log_data(),
        2,
    ));

    let rpc = ProviderBuilder::new().connect_http("http://localhost:8545".parse().unwrap());
    let network = NetworkContract::new(NETWORK, rpc);

    let filter = MinDelayChangeFilter::builder().from_block(0).build();
    let changes = network
        .query_min_delay_changes(&provider, &filter)
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);

    let names: Vec<_> = network
        .watch_events(
            provider.clone(),
            clock.clone(),
            SignatureFilter::<NameSet>::new().from_block(0).to_block(4),
            WatchConfig::default(),
        )
        .map(|event| event.unwrap().event.name)
        .collect()
        .await;
    assert_eq!(names, vec!["Renamed".to_string()]);
}
