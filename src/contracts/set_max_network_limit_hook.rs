// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! ISetMaxNetworkLimitHook contract bindings
//!
//! The hook a delegator calls back into when a network changes its maximum
//! limit. It exposes the same `setMaxNetworkLimit` entry point as `INetwork`.

use alloy_network::Ethereum;
use alloy_primitives::{aliases::U96, Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use ISetMaxNetworkLimitHook::ISetMaxNetworkLimitHookInstance;

/// The ISetMaxNetworkLimitHook contract wrapper
pub struct SetMaxNetworkLimitHookContract<P: Provider<Ethereum>> {
    instance: ISetMaxNetworkLimitHookInstance<P>,
}

impl<P: Provider<Ethereum>> SetMaxNetworkLimitHookContract<P> {
    /// Create a new SetMaxNetworkLimitHookContract
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "set_max_network_limit_hook_initialized"
        );
        Self {
            instance: ISetMaxNetworkLimitHookInstance::new(address, provider),
        }
    }

    /// Returns the contract address
    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    /// Create transaction request for `setMaxNetworkLimit`
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
            event = "hook_set_max_network_limit_transaction_created"
        );

        self.instance
            .setMaxNetworkLimit(delegator, subnetwork_id, max_network_limit)
            .from(from_address)
            .into_transaction_request()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    ISetMaxNetworkLimitHook,
    "abis/ISetMaxNetworkLimitHook.json"
);
