// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Event filters
//!
//! A filter produces the `eth_getLogs` [`Filter`] sent to the node and checks
//! returned logs locally with the same rules. Indexed-argument lists are
//! matched by set membership, and an empty list matches any value.

use std::fmt;
use std::marker::PhantomData;

use alloy_primitives::{Address, FixedBytes, B256};
use alloy_rpc_types::{Filter, Log};
use alloy_sol_types::SolEvent;
use bon::Builder;

use crate::contracts::network::INetwork::MinDelayChange;

/// Topic word of an indexed `address`: left-padded to 32 bytes.
pub fn address_topic(address: Address) -> B256 {
    address.into_word()
}

/// Topic word of an indexed `bytes4`: right-padded to 32 bytes.
pub fn selector_topic(selector: FixedBytes<4>) -> B256 {
    B256::right_padding_from(selector.as_slice())
}

/// Filtering rules for one event type.
pub trait EventFilter: Send + Sync {
    /// The event this filter selects
    type Event: SolEvent + Send + 'static;

    /// Inclusive `(from, to)` block bounds; `None` leaves a side open.
    fn block_range(&self) -> (Option<u64>, Option<u64>);

    /// Filter on contract address and event signature, without block bounds.
    fn base_filter(&self, address: Address) -> Filter {
        Filter::new()
            .address(address)
            .event_signature(Self::Event::SIGNATURE_HASH)
    }

    /// The node-side filter, with block bounds applied.
    fn to_filter(&self, address: Address) -> Filter {
        let mut filter = self.base_filter(address);
        let (from_block, to_block) = self.block_range();
        if let Some(from_block) = from_block {
            filter = filter.from_block(from_block);
        }
        if let Some(to_block) = to_block {
            filter = filter.to_block(to_block);
        }
        filter
    }

    /// Whether `log` passes this filter when emitted by `address`.
    ///
    /// Block bounds are not checked here; they are applied by the query.
    fn matches(&self, address: Address, log: &Log) -> bool {
        log.address() == address && log.topic0() == Some(&Self::Event::SIGNATURE_HASH)
    }
}

/// Filter for `MinDelayChange` events.
///
/// # Example
///
/// ```rust
/// use network_bindings::MinDelayChangeFilter;
/// use alloy_primitives::{address, fixed_bytes};
///
/// let filter = MinDelayChangeFilter::builder()
///     .targets(vec![address!("1111111111111111111111111111111111111111")])
///     .selectors(vec![fixed_bytes!("6773522c")])
///     .from_block(19_000_000)
///     .build();
/// ```
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq)]
pub struct MinDelayChangeFilter {
    /// Targets to match, any when empty
    #[builder(default)]
    pub targets: Vec<Address>,
    /// Selectors to match, any when empty
    #[builder(default)]
    pub selectors: Vec<FixedBytes<4>>,
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
}

impl MinDelayChangeFilter {
    fn target_topics(&self) -> Vec<B256> {
        self.targets.iter().copied().map(address_topic).collect()
    }

    fn selector_topics(&self) -> Vec<B256> {
        self.selectors.iter().copied().map(selector_topic).collect()
    }
}

impl EventFilter for MinDelayChangeFilter {
    type Event = MinDelayChange;

    fn block_range(&self) -> (Option<u64>, Option<u64>) {
        (self.from_block, self.to_block)
    }

    fn base_filter(&self, address: Address) -> Filter {
        let mut filter = Filter::new()
            .address(address)
            .event_signature(MinDelayChange::SIGNATURE_HASH);
        if !self.targets.is_empty() {
            filter = filter.topic1(self.target_topics());
        }
        if !self.selectors.is_empty() {
            filter = filter.topic2(self.selector_topics());
        }
        filter
    }

    fn matches(&self, address: Address, log: &Log) -> bool {
        if log.address() != address || log.topic0() != Some(&MinDelayChange::SIGNATURE_HASH) {
            return false;
        }
        let topics = log.topics();
        let in_set = |set: Vec<B256>, index: usize| {
            set.is_empty() || topics.get(index).is_some_and(|topic| set.contains(topic))
        };
        in_set(self.target_topics(), 1) && in_set(self.selector_topics(), 2)
    }
}

/// Filter matching every occurrence of an event by address and signature.
///
/// Indexed arguments are not constrained. Used for `NameSet` and
/// `MetadataURISet`, and for the timelock's scheduling and role events.
pub struct SignatureFilter<E> {
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
    _event: PhantomData<fn() -> E>,
}

impl<E> SignatureFilter<E> {
    pub fn new() -> Self {
        Self {
            from_block: None,
            to_block: None,
            _event: PhantomData,
        }
    }

    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = Some(block);
        self
    }

    pub fn to_block(mut self, block: u64) -> Self {
        self.to_block = Some(block);
        self
    }
}

impl<E> Default for SignatureFilter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for SignatureFilter<E> {
    fn clone(&self) -> Self {
        Self {
            from_block: self.from_block,
            to_block: self.to_block,
            _event: PhantomData,
        }
    }
}

impl<E: SolEvent> fmt::Debug for SignatureFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureFilter")
            .field("event", &E::SIGNATURE)
            .field("from_block", &self.from_block)
            .field("to_block", &self.to_block)
            .finish()
    }
}

impl<E: SolEvent + Send + 'static> EventFilter for SignatureFilter<E> {
    type Event = E;

    fn block_range(&self) -> (Option<u64>, Option<u64>) {
        (self.from_block, self.to_block)
    }
}
