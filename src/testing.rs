//! Test utilities and fake implementations
//!
//! These fakes implement the crate's traits in memory so event queries and
//! watchers can be exercised without a node: logs are stored with their block
//! numbers, the head block is set by the test, and failures can be injected.

use alloy_rpc_types::{Filter, Log};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::traits::{Clock, LogProvider};
use crate::{NetworkError, Result};

// ============================================================================
// Fake Log Provider
// ============================================================================

/// A fake log provider backed by an in-memory log list.
///
/// `get_logs` applies the filter's address, topic sets and block range to the
/// stored logs, as a node would. The head block can be set directly or
/// scripted per call with [`FakeLogProvider::push_heads`].
#[derive(Clone, Debug, Default)]
pub struct FakeLogProvider {
    logs: Arc<Mutex<Vec<Log>>>,
    head: Arc<Mutex<u64>>,
    scripted_heads: Arc<Mutex<VecDeque<u64>>>,
    queries: Arc<Mutex<Vec<Filter>>>,
    fail_block_number: Arc<Mutex<bool>>,
    fail_get_logs: Arc<Mutex<bool>>,
}

impl FakeLogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block number returned once scripted heads run out
    pub fn set_head(&self, block: u64) {
        *self.head.lock().unwrap() = block;
    }

    /// Queue head block numbers returned by successive `get_block_number`
    /// calls. The last one also becomes the steady head.
    pub fn push_heads(&self, heads: impl IntoIterator<Item = u64>) {
        self.scripted_heads.lock().unwrap().extend(heads);
    }

    /// Store a log; its `block_number` decides which ranges return it
    pub fn push_log(&self, log: Log) {
        self.logs.lock().unwrap().push(log);
    }

    /// Make the next `get_block_number` call fail
    pub fn fail_next_block_number(&self) {
        *self.fail_block_number.lock().unwrap() = true;
    }

    /// Make the next `get_logs` call fail
    pub fn fail_next_get_logs(&self) {
        *self.fail_get_logs.lock().unwrap() = true;
    }

    /// Filters passed to `get_logs`, in call order
    pub fn queries(&self) -> Vec<Filter> {
        self.queries.lock().unwrap().clone()
    }

    fn matches(filter: &Filter, log: &Log) -> bool {
        if !filter.address.matches(&log.address()) {
            return false;
        }
        let topics = log.topics();
        let topics_match = filter.topics.iter().enumerate().all(|(i, set)| {
            set.is_empty() || topics.get(i).is_some_and(|topic| set.matches(topic))
        });
        let block = log.block_number.unwrap_or_default();
        let in_range = filter.get_from_block().map_or(true, |from| block >= from)
            && filter.get_to_block().map_or(true, |to| block <= to);
        topics_match && in_range
    }
}

#[async_trait]
impl LogProvider for FakeLogProvider {
    async fn get_block_number(&self) -> Result<u64> {
        if std::mem::take(&mut *self.fail_block_number.lock().unwrap()) {
            return Err(NetworkError::Provider(
                "Simulated block number error".to_string(),
            ));
        }

        let mut head = self.head.lock().unwrap();
        if let Some(next) = self.scripted_heads.lock().unwrap().pop_front() {
            *head = next;
        }
        Ok(*head)
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        self.queries.lock().unwrap().push(filter.clone());
        if std::mem::take(&mut *self.fail_get_logs.lock().unwrap()) {
            return Err(NetworkError::Provider("Simulated RPC error".to_string()));
        }

        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| Self::matches(filter, log))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
///
/// Sleeping returns immediately and advances the clock by the requested
/// duration.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    /// Get the total time "slept" by this clock
    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }

    /// Get the number of times sleep was called
    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Address, Bytes, LogData, B256};

    const EMITTER: Address = address!("00000000000000000000000000000000000000aa");

    fn log_at(block: u64, topic0: B256) -> Log {
        Log {
            inner: alloy_primitives::Log {
                address: EMITTER,
                data: LogData::new_unchecked(vec![topic0], Bytes::new()),
            },
            block_number: Some(block),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fake_clock_tracks_sleep_calls() {
        let clock = FakeClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(60)).await;
        clock.sleep(Duration::from_secs(120)).await;

        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(180));
        assert_eq!(clock.now().duration_since(start), Duration::from_secs(180));
    }

    #[tokio::test]
    async fn test_fake_log_provider_applies_block_range() {
        let provider = FakeLogProvider::new();
        let topic = B256::repeat_byte(1);
        for block in [1, 5, 9] {
            provider.push_log(log_at(block, topic));
        }

        let filter = Filter::new().address(EMITTER).from_block(2u64).to_block(9u64);
        let logs = provider.get_logs(&filter).await.unwrap();

        let blocks: Vec<_> = logs.iter().filter_map(|log| log.block_number).collect();
        assert_eq!(blocks, vec![5, 9]);
        assert_eq!(provider.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_fake_log_provider_applies_topics() {
        let provider = FakeLogProvider::new();
        provider.push_log(log_at(1, B256::repeat_byte(1)));
        provider.push_log(log_at(1, B256::repeat_byte(2)));

        let filter = Filter::new().event_signature(B256::repeat_byte(2));
        let logs = provider.get_logs(&filter).await.unwrap();

        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].topic0(), Some(&B256::repeat_byte(2)));
    }

    #[tokio::test]
    async fn test_fake_log_provider_scripted_heads() {
        let provider = FakeLogProvider::new();
        provider.push_heads([10, 12]);

        assert_eq!(provider.get_block_number().await.unwrap(), 10);
        assert_eq!(provider.get_block_number().await.unwrap(), 12);
        assert_eq!(provider.get_block_number().await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_fake_log_provider_failure_is_one_shot() {
        let provider = FakeLogProvider::new();
        provider.fail_next_get_logs();

        let result = provider.get_logs(&Filter::new()).await;
        assert!(matches!(result, Err(NetworkError::Provider(_))));
        assert!(provider.get_logs(&Filter::new()).await.is_ok());
    }
}
