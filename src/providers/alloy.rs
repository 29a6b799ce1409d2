//! Alloy-based log provider implementation.

use alloy_network::Network;
use alloy_provider::Provider;
use alloy_rpc_types::{Filter, Log};
use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::traits::LogProvider;

/// Production log provider wrapping Alloy's [`Provider`] trait.
///
/// # Type Parameters
///
/// - `N`: The network type (e.g., `Ethereum`)
/// - `P`: The underlying Alloy provider implementation
///
/// # Examples
///
/// ```rust,no_run
/// use network_bindings::providers::AlloyLogProvider;
/// use alloy_network::Ethereum;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new()
///     .connect("http://localhost:8545")
///     .await?;
///
/// let logs = AlloyLogProvider::<Ethereum, _>::new(provider);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AlloyLogProvider<N, P>
where
    N: Network,
    P: Provider<N> + Clone,
{
    provider: P,
    _network: std::marker::PhantomData<N>,
}

impl<N, P> AlloyLogProvider<N, P>
where
    N: Network,
    P: Provider<N> + Clone,
{
    /// Creates a new [`AlloyLogProvider`] wrapping the given Alloy provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _network: std::marker::PhantomData,
        }
    }

    /// Returns a reference to the underlying Alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<N, P> LogProvider for AlloyLogProvider<N, P>
where
    N: Network,
    P: Provider<N> + Clone + Send + Sync,
{
    #[instrument(skip(self))]
    async fn get_block_number(&self) -> Result<u64> {
        trace!("Fetching current block number");
        let block_number = self.provider.get_block_number().await?;

        debug!(
            block_number = block_number,
            "Current block number retrieved"
        );
        Ok(block_number)
    }

    #[instrument(skip(self, filter), fields(from_block = ?filter.get_from_block(), to_block = ?filter.get_to_block()))]
    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        trace!("Fetching logs");
        let logs = self.provider.get_logs(filter).await?;

        debug!(log_count = logs.len(), "Logs retrieved");
        Ok(logs)
    }
}
