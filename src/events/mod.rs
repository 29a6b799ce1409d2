// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Event filtering, decoding and watching
//!
//! Logs are decoded with the `sol!`-generated event types: indexed arguments
//! come from topics 1..=3 and the rest from the data section, in declaration
//! order. A log whose topic0 belongs to another event is rejected with
//! [`NetworkError::EventMismatch`] rather than decoded.

mod filter;
mod watcher;

pub use filter::{address_topic, selector_topic, EventFilter, MinDelayChangeFilter, SignatureFilter};
pub use watcher::EventWatcher;

use alloy_primitives::{Address, TxHash, B256};
use alloy_rpc_types::Log;
use alloy_sol_types::SolEvent;
use tracing::{debug, error, trace, Instrument};

use crate::config::WatchConfig;
use crate::contracts::network::INetwork::{MetadataURISet, MinDelayChange, NameSet};
use crate::error::{NetworkError, Result};
use crate::spans;
use crate::traits::LogProvider;

/// A decoded event together with the log it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog<E> {
    pub event: E,
    pub log: Log,
}

impl<E> EventLog<E> {
    pub fn address(&self) -> Address {
        self.log.address()
    }

    pub fn block_number(&self) -> Option<u64> {
        self.log.block_number
    }

    pub fn transaction_hash(&self) -> Option<TxHash> {
        self.log.transaction_hash
    }

    pub fn log_index(&self) -> Option<u64> {
        self.log.log_index
    }
}

pub type MinDelayChangeLog = EventLog<MinDelayChange>;
pub type NameSetLog = EventLog<NameSet>;
pub type MetadataUriSetLog = EventLog<MetadataURISet>;

/// Decodes `log` as event `E`.
///
/// # Errors
///
/// - [`NetworkError::EventMismatch`] when topic0 is missing or names another
///   event
/// - [`NetworkError::Abi`] when topics or data do not decode as `E`
pub fn decode_event<E: SolEvent>(log: &Log) -> Result<EventLog<E>> {
    let found = log.topic0().copied();
    if found != Some(E::SIGNATURE_HASH) {
        return Err(NetworkError::EventMismatch {
            expected: E::SIGNATURE_HASH,
            found,
        });
    }

    let event = E::decode_log_data(log.data())?;
    Ok(EventLog {
        event,
        log: log.clone(),
    })
}

pub fn decode_min_delay_change(log: &Log) -> Result<MinDelayChangeLog> {
    decode_event(log)
}

pub fn decode_name_set(log: &Log) -> Result<NameSetLog> {
    decode_event(log)
}

pub fn decode_metadata_uri_set(log: &Log) -> Result<MetadataUriSetLog> {
    decode_event(log)
}

/// Fetches and decodes the events emitted by `address` that match `filter`.
///
/// The range runs from the filter's `from_block` (genesis when unset) to its
/// `to_block`, or to the current head when that is unset. It is fetched in
/// chunks of at most `config.max_block_range` blocks, since nodes reject
/// wide `eth_getLogs` ranges.
///
/// Logs the node returns that fail the local check are dropped. The first
/// log that fails to decode fails the whole query.
pub async fn query_events<L, F>(
    logs: &L,
    address: Address,
    filter: &F,
    config: &WatchConfig,
) -> Result<Vec<EventLog<F::Event>>>
where
    L: LogProvider + ?Sized,
    F: EventFilter,
{
    let (from_block, to_block) = filter.block_range();
    let span = spans::query_events(
        address,
        <F::Event as SolEvent>::SIGNATURE,
        from_block,
        to_block,
    );

    async move {
        let raw = fetch_chunked(logs, address, filter, config)
            .await
            .map_err(|e| {
                error!(
                    contract_address = %address,
                    error = %e,
                    event = "event_query_failed"
                );
                spans::record_error(&e);
                e
            })?;

        let events = raw
            .iter()
            .filter(|log| filter.matches(address, log))
            .map(decode_event::<F::Event>)
            .collect::<Result<Vec<_>>>()
            .inspect_err(spans::record_error)?;

        tracing::Span::current().record("log_count", events.len());
        debug!(
            contract_address = %address,
            event_signature = <F::Event as SolEvent>::SIGNATURE,
            returned = raw.len(),
            matched = events.len(),
            event = "events_queried"
        );
        Ok(events)
    }
    .instrument(span)
    .await
}

async fn fetch_chunked<L, F>(
    logs: &L,
    address: Address,
    filter: &F,
    config: &WatchConfig,
) -> Result<Vec<Log>>
where
    L: LogProvider + ?Sized,
    F: EventFilter,
{
    config.validate()?;
    let (from_block, to_block) = filter.block_range();
    let end = match to_block {
        Some(to_block) => to_block,
        None => {
            let head = logs.get_block_number().await?;
            tracing::Span::current().record("to_block", head);
            head
        }
    };

    let base = filter.to_filter(address);
    let mut raw = Vec::new();
    let mut chunks = 0usize;
    for (start, stop) in block_chunks(from_block.unwrap_or(0), end, config.max_block_range) {
        let query = base.clone().from_block(start).to_block(stop);
        let part = logs.get_logs(&query).await?;
        trace!(
            contract_address = %address,
            from_block = start,
            to_block = stop,
            logs = part.len(),
            event = "event_chunk_fetched"
        );
        raw.extend(part);
        chunks += 1;
    }
    tracing::Span::current().record("chunks", chunks);
    Ok(raw)
}

/// Splits `[from, to]` into consecutive inclusive ranges of at most
/// `max_block_range` blocks. Empty when `from > to`.
pub fn block_chunks(
    from: u64,
    to: u64,
    max_block_range: u64,
) -> impl Iterator<Item = (u64, u64)> {
    let span = max_block_range.max(1);
    let mut next = (from <= to).then_some(from);
    std::iter::from_fn(move || {
        let start = next?;
        let stop = start.saturating_add(span - 1).min(to);
        next = (stop < to).then(|| stop + 1);
        Some((start, stop))
    })
}

/// Topic0 of every event the `INetwork` contract emits
pub fn network_event_topics() -> [B256; 3] {
    [
        MinDelayChange::SIGNATURE_HASH,
        NameSet::SIGNATURE_HASH,
        MetadataURISet::SIGNATURE_HASH,
    ]
}
