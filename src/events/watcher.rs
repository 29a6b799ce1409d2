// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Polling event watcher
//!
//! [`EventWatcher`] turns repeated `eth_getLogs` queries into a single stream
//! of decoded events. Events and failures share the stream: an error is
//! yielded once and then the stream ends. Dropping the stream stops polling.

use std::collections::VecDeque;

use alloy_primitives::Address;
use alloy_sol_types::SolEvent;
use bon::Builder;
use futures::{stream, Stream};
use tracing::{debug, error, trace, Instrument};

use super::{decode_event, EventFilter, EventLog};
use crate::config::WatchConfig;
use crate::error::Result;
use crate::spans;
use crate::traits::{Clock, LogProvider};

/// Watches one contract for events matching a filter.
///
/// # Example
///
/// ```rust,no_run
/// use network_bindings::{EventWatcher, MinDelayChangeFilter, WatchConfig};
/// use network_bindings::providers::{AlloyLogProvider, TokioClock};
/// use alloy_network::Ethereum;
/// use alloy_primitives::address;
/// use alloy_provider::ProviderBuilder;
/// use futures::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
/// let stream = EventWatcher::builder()
///     .logs(AlloyLogProvider::<Ethereum, _>::new(provider))
///     .clock(TokioClock::new())
///     .address(address!("1234567890123456789012345678901234567890"))
///     .filter(MinDelayChangeFilter::default())
///     .config(WatchConfig::default())
///     .build()
///     .into_stream();
///
/// futures::pin_mut!(stream);
/// while let Some(change) = stream.next().await {
///     let change = change?;
///     println!("{:?}", change.event);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct EventWatcher<L, C, F> {
    logs: L,
    clock: C,
    address: Address,
    filter: F,
    #[builder(default)]
    config: WatchConfig,
}

enum PollOutcome<E> {
    /// A block range was queried; more may be available immediately
    Fetched(Vec<Result<EventLog<E>>>),
    /// The cursor is past the safe head
    CaughtUp,
    /// The cursor is past the filter's `to_block`
    Finished,
}

struct WatchState<L, C, F: EventFilter> {
    watcher: EventWatcher<L, C, F>,
    /// Next block to query, unset until the first poll
    cursor: Option<u64>,
    pending: VecDeque<Result<EventLog<F::Event>>>,
    done: bool,
}

impl<L, C, F> EventWatcher<L, C, F>
where
    L: LogProvider + 'static,
    C: Clock + 'static,
    F: EventFilter + 'static,
{
    /// Starts watching.
    ///
    /// Without a `from_block` the watcher starts at the safe head (head minus
    /// confirmations) as seen on the first poll. With a `to_block` the stream
    /// ends once that block has been queried.
    pub fn into_stream(self) -> impl Stream<Item = Result<EventLog<F::Event>>> + Send + 'static {
        let span = spans::watch_events(
            self.address,
            <F::Event as SolEvent>::SIGNATURE,
            self.config.poll_interval.as_millis() as u64,
        );

        let mut pending = VecDeque::new();
        if let Err(e) = self.config.validate() {
            pending.push_back(Err(e));
        }

        let state = WatchState {
            watcher: self,
            cursor: None,
            pending,
            done: false,
        };

        stream::unfold(state, move |mut state| {
            let span = span.clone();
            async move {
                loop {
                    if let Some(item) = state.pending.pop_front() {
                        if let Err(e) = &item {
                            spans::record_error(e);
                            state.done = true;
                            state.pending.clear();
                        }
                        return Some((item, state));
                    }
                    if state.done {
                        return None;
                    }

                    match state.watcher.poll(&mut state.cursor).await {
                        Ok(PollOutcome::Fetched(events)) => state.pending.extend(events),
                        Ok(PollOutcome::CaughtUp) => {
                            trace!(
                                contract_address = %state.watcher.address,
                                cursor = ?state.cursor,
                                event = "watcher_caught_up"
                            );
                            state.watcher.clock.sleep(state.watcher.config.poll_interval).await;
                        }
                        Ok(PollOutcome::Finished) => {
                            debug!(
                                contract_address = %state.watcher.address,
                                event = "watcher_finished"
                            );
                            state.done = true;
                        }
                        Err(e) => {
                            error!(
                                contract_address = %state.watcher.address,
                                cursor = ?state.cursor,
                                error = %e,
                                event = "watcher_poll_failed"
                            );
                            state.pending.push_back(Err(e));
                        }
                    }
                }
            }
            .instrument(span)
        })
    }

    async fn poll(&self, cursor: &mut Option<u64>) -> Result<PollOutcome<F::Event>> {
        let (from_block, to_block) = self.filter.block_range();
        if let (Some(next), Some(to_block)) = (*cursor, to_block) {
            if next > to_block {
                return Ok(PollOutcome::Finished);
            }
        }

        let span = spans::poll_events(self.address, *cursor);
        async {
            let started = self.clock.now();
            let head = self.logs.get_block_number().await?;
            let safe_head = head.saturating_sub(self.config.confirmations);
            tracing::Span::current().record("head_block", head);

            let start = *cursor.get_or_insert(from_block.unwrap_or(safe_head));
            if to_block.is_some_and(|to_block| start > to_block) {
                return Ok(PollOutcome::Finished);
            }
            if start > safe_head {
                return Ok(PollOutcome::CaughtUp);
            }

            let mut end = start
                .saturating_add(self.config.max_block_range - 1)
                .min(safe_head);
            if let Some(to_block) = to_block {
                end = end.min(to_block);
            }
            tracing::Span::current().record("to_block", end);

            let query = self
                .filter
                .to_filter(self.address)
                .from_block(start)
                .to_block(end);
            let raw = self.logs.get_logs(&query).await?;
            *cursor = Some(end + 1);

            let events: Vec<_> = raw
                .iter()
                .filter(|log| self.filter.matches(self.address, log))
                .map(decode_event::<F::Event>)
                .collect();

            tracing::Span::current().record("log_count", events.len());
            debug!(
                contract_address = %self.address,
                from_block = start,
                to_block = end,
                head_block = head,
                events = events.len(),
                elapsed_ms = self.clock.now().duration_since(started).as_millis() as u64,
                event = "watcher_range_polled"
            );
            Ok(PollOutcome::Fetched(events))
        }
        .instrument(span)
        .await
    }
}
