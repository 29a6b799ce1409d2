use std::time::Duration;

use crate::error::{NetworkError, Result};

/// Configuration for event watching.
///
/// Controls how often a watcher polls for new blocks, how many blocks a single
/// `eth_getLogs` request may span, and how far behind the head it stays.
///
/// # Examples
///
/// ```rust
/// use network_bindings::WatchConfig;
/// use std::time::Duration;
///
/// // Use defaults (7 second interval, 10 000 block ranges, no confirmations)
/// let config = WatchConfig::default();
///
/// // Customize watching behavior
/// let config = WatchConfig::default()
///     .with_poll_interval(Duration::from_secs(12))
///     .with_confirmations(2);
///
/// // Use preset for local nodes (1 second interval)
/// let config = WatchConfig::fast();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    /// Time to wait after catching up with the head before polling again.
    pub poll_interval: Duration,
    /// Maximum number of blocks covered by one log query.
    pub max_block_range: u64,
    /// Number of blocks to stay behind the head, to avoid reorged logs.
    pub confirmations: u64,
}

impl Default for WatchConfig {
    /// - `poll_interval`: 7 seconds
    /// - `max_block_range`: 10 000
    /// - `confirmations`: 0
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(7),
            max_block_range: 10_000,
            confirmations: 0,
        }
    }
}

impl WatchConfig {
    /// Creates a configuration for local or fast-block chains.
    ///
    /// - `poll_interval`: 1 second
    /// - `max_block_range`: 1 000
    /// - `confirmations`: 0
    pub fn fast() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_block_range: 1_000,
            confirmations: 0,
        }
    }

    /// Sets the interval between polls once caught up.
    ///
    /// # Example
    ///
    /// ```rust
    /// use network_bindings::WatchConfig;
    /// use std::time::Duration;
    ///
    /// let config = WatchConfig::default().with_poll_interval(Duration::from_millis(500));
    /// assert_eq!(config.poll_interval, Duration::from_millis(500));
    /// ```
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum block span of a single log query.
    pub fn with_max_block_range(mut self, blocks: u64) -> Self {
        self.max_block_range = blocks;
        self
    }

    /// Sets how many blocks to stay behind the head.
    pub fn with_confirmations(mut self, blocks: u64) -> Self {
        self.confirmations = blocks;
        self
    }

    /// Checks that the configuration can make progress.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidConfig`] when `max_block_range` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_block_range == 0 {
            return Err(NetworkError::InvalidConfig(
                "max_block_range must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatchConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(7));
        assert_eq!(config.max_block_range, 10_000);
        assert_eq!(config.confirmations, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fast_config() {
        let config = WatchConfig::fast();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.max_block_range, 1_000);
    }

    #[test]
    fn test_builder_methods() {
        let config = WatchConfig::default()
            .with_poll_interval(Duration::from_secs(2))
            .with_max_block_range(50)
            .with_confirmations(3);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_block_range, 50);
        assert_eq!(config.confirmations, 3);
    }

    #[test]
    fn test_zero_block_range_is_invalid() {
        let result = WatchConfig::default().with_max_block_range(0).validate();
        assert!(matches!(result, Err(NetworkError::InvalidConfig(_))));
    }
}
