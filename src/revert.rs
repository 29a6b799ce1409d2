// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Typed decoding of network revert data
//!
//! A network reverts with one of its own custom errors or with one inherited
//! from `TimelockController` and `AccessControl`. [`decode_revert`] matches the
//! leading 4-byte selector against both sets.

use alloy_primitives::{Address, FixedBytes, B256, U256};
use alloy_sol_types::{SolError, SolInterface};
use thiserror::Error;
use tracing::{debug, warn};

use crate::contracts::network::INetwork::{self, INetworkErrors};
use crate::contracts::timelock::TimelockController::{self, TimelockControllerErrors};
use crate::error::{NetworkError, Result};
use crate::spans;
use crate::timelock::{OperationState, Role};

/// A decoded network revert
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkRevert {
    #[error("calldata shorter than a selector")]
    InvalidDataLength,
    #[error("new delay is below the global minimum")]
    InvalidNewDelay,
    /// `updateDelay` cannot target the network's own `updateDelay` selector
    #[error("invalid target and selector")]
    InvalidTargetAndSelector,
    #[error("caller is not the network middleware service")]
    NotMiddleware,
    #[error("operation length mismatch: {targets} targets, {payloads} payloads, {values} values")]
    TimelockInvalidOperationLength {
        targets: U256,
        payloads: U256,
        values: U256,
    },
    #[error("delay {delay} is below the minimum of {min_delay}")]
    TimelockInsufficientDelay { delay: U256, min_delay: U256 },
    #[error("operation {operation_id} is not in an expected state")]
    TimelockUnexpectedOperationState {
        operation_id: B256,
        expected_states: B256,
    },
    #[error("predecessor {predecessor_id} has not been executed")]
    TimelockUnexecutedPredecessor { predecessor_id: B256 },
    #[error("caller {caller} is not allowed")]
    TimelockUnauthorizedCaller { caller: Address },
    #[error("account {account} is missing role {needed_role}")]
    AccessControlUnauthorizedAccount { account: Address, needed_role: B256 },
}

impl NetworkRevert {
    /// The custom error's 4-byte selector
    pub fn selector(&self) -> FixedBytes<4> {
        let selector = match self {
            NetworkRevert::InvalidDataLength => INetwork::InvalidDataLength::SELECTOR,
            NetworkRevert::InvalidNewDelay => INetwork::InvalidNewDelay::SELECTOR,
            NetworkRevert::InvalidTargetAndSelector => INetwork::InvalidTargetAndSelector::SELECTOR,
            NetworkRevert::NotMiddleware => INetwork::NotMiddleware::SELECTOR,
            NetworkRevert::TimelockInvalidOperationLength { .. } => {
                TimelockController::TimelockInvalidOperationLength::SELECTOR
            }
            NetworkRevert::TimelockInsufficientDelay { .. } => {
                TimelockController::TimelockInsufficientDelay::SELECTOR
            }
            NetworkRevert::TimelockUnexpectedOperationState { .. } => {
                TimelockController::TimelockUnexpectedOperationState::SELECTOR
            }
            NetworkRevert::TimelockUnexecutedPredecessor { .. } => {
                TimelockController::TimelockUnexecutedPredecessor::SELECTOR
            }
            NetworkRevert::TimelockUnauthorizedCaller { .. } => {
                TimelockController::TimelockUnauthorizedCaller::SELECTOR
            }
            NetworkRevert::AccessControlUnauthorizedAccount { .. } => {
                TimelockController::AccessControlUnauthorizedAccount::SELECTOR
            }
        };
        FixedBytes::from(selector)
    }

    /// The Solidity error name
    pub fn name(&self) -> &'static str {
        match self {
            NetworkRevert::InvalidDataLength => "InvalidDataLength",
            NetworkRevert::InvalidNewDelay => "InvalidNewDelay",
            NetworkRevert::InvalidTargetAndSelector => "InvalidTargetAndSelector",
            NetworkRevert::NotMiddleware => "NotMiddleware",
            NetworkRevert::TimelockInvalidOperationLength { .. } => {
                "TimelockInvalidOperationLength"
            }
            NetworkRevert::TimelockInsufficientDelay { .. } => "TimelockInsufficientDelay",
            NetworkRevert::TimelockUnexpectedOperationState { .. } => {
                "TimelockUnexpectedOperationState"
            }
            NetworkRevert::TimelockUnexecutedPredecessor { .. } => "TimelockUnexecutedPredecessor",
            NetworkRevert::TimelockUnauthorizedCaller { .. } => "TimelockUnauthorizedCaller",
            NetworkRevert::AccessControlUnauthorizedAccount { .. } => {
                "AccessControlUnauthorizedAccount"
            }
        }
    }

    /// States the operation was expected to be in, for
    /// `TimelockUnexpectedOperationState`
    pub fn expected_states(&self) -> Option<Vec<OperationState>> {
        match self {
            NetworkRevert::TimelockUnexpectedOperationState {
                expected_states, ..
            } => Some(OperationState::from_bitmap(*expected_states)),
            _ => None,
        }
    }

    /// The missing role, for `AccessControlUnauthorizedAccount`
    pub fn needed_role(&self) -> Option<Role> {
        match self {
            NetworkRevert::AccessControlUnauthorizedAccount { needed_role, .. } => {
                Role::from_id(*needed_role)
            }
            _ => None,
        }
    }
}

impl From<INetworkErrors> for NetworkRevert {
    fn from(err: INetworkErrors) -> Self {
        match err {
            INetworkErrors::InvalidDataLength(_) => NetworkRevert::InvalidDataLength,
            INetworkErrors::InvalidNewDelay(_) => NetworkRevert::InvalidNewDelay,
            INetworkErrors::InvalidTargetAndSelector(_) => NetworkRevert::InvalidTargetAndSelector,
            INetworkErrors::NotMiddleware(_) => NetworkRevert::NotMiddleware,
        }
    }
}

impl From<TimelockControllerErrors> for NetworkRevert {
    fn from(err: TimelockControllerErrors) -> Self {
        match err {
            TimelockControllerErrors::TimelockInvalidOperationLength(e) => {
                NetworkRevert::TimelockInvalidOperationLength {
                    targets: e.targets,
                    payloads: e.payloads,
                    values: e.values,
                }
            }
            TimelockControllerErrors::TimelockInsufficientDelay(e) => {
                NetworkRevert::TimelockInsufficientDelay {
                    delay: e.delay,
                    min_delay: e.minDelay,
                }
            }
            TimelockControllerErrors::TimelockUnexpectedOperationState(e) => {
                NetworkRevert::TimelockUnexpectedOperationState {
                    operation_id: e.operationId,
                    expected_states: e.expectedStates,
                }
            }
            TimelockControllerErrors::TimelockUnexecutedPredecessor(e) => {
                NetworkRevert::TimelockUnexecutedPredecessor {
                    predecessor_id: e.predecessorId,
                }
            }
            TimelockControllerErrors::TimelockUnauthorizedCaller(e) => {
                NetworkRevert::TimelockUnauthorizedCaller { caller: e.caller }
            }
            TimelockControllerErrors::AccessControlUnauthorizedAccount(e) => {
                NetworkRevert::AccessControlUnauthorizedAccount {
                    account: e.account,
                    needed_role: e.neededRole,
                }
            }
        }
    }
}

/// Decodes revert data returned by a network call.
///
/// # Errors
///
/// - [`NetworkError::RevertDataTooShort`] when `data` has no full selector
/// - [`NetworkError::UnknownSelector`] when no known error has the selector
/// - [`NetworkError::Abi`] when the selector matches but the arguments do not
///   decode
pub fn decode_revert(data: &[u8]) -> Result<NetworkRevert> {
    let span = spans::decode_revert("INetwork", data.len());
    let _guard = span.enter();

    let Some(selector) = data.get(..4) else {
        let err = NetworkError::RevertDataTooShort(data.len());
        spans::record_error(&err);
        return Err(err);
    };
    let selector: [u8; 4] = [selector[0], selector[1], selector[2], selector[3]];

    let revert = if INetworkErrors::valid_selector(selector) {
        NetworkRevert::from(INetworkErrors::abi_decode(data)?)
    } else if TimelockControllerErrors::valid_selector(selector) {
        NetworkRevert::from(TimelockControllerErrors::abi_decode(data)?)
    } else {
        let err = NetworkError::UnknownSelector(FixedBytes::from(selector));
        spans::record_error(&err);
        return Err(err);
    };

    debug!(
        revert = revert.name(),
        selector = %revert.selector(),
        event = "revert_decoded"
    );
    Ok(revert)
}

/// Extracts and decodes the revert carried by a failed contract call, if any.
pub fn revert_from_contract_error(err: &alloy_contract::Error) -> Option<NetworkRevert> {
    let data = err.as_revert_data()?;
    match decode_revert(&data) {
        Ok(revert) => Some(revert),
        Err(e) => {
            warn!(
                error = %e,
                revert_data_len = data.len(),
                event = "revert_not_decoded"
            );
            None
        }
    }
}
