// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Timelock operation helpers
//!
//! An `INetwork` is an OpenZeppelin `TimelockController`: every privileged
//! call is scheduled as an operation, identified by the hash of its call
//! parameters, and becomes executable once its delay has elapsed. This module
//! computes operation ids locally and names the roles the network uses.
//!
//! # Example
//!
//! ```rust
//! use network_bindings::timelock::{Operation, OperationState};
//! use alloy_primitives::{address, Bytes, U256};
//!
//! let op = Operation::builder()
//!     .target(address!("1111111111111111111111111111111111111111"))
//!     .data(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]))
//!     .build();
//!
//! let id = op.id();
//! assert_eq!(OperationState::try_from(2u8).unwrap(), OperationState::Ready);
//! ```

use std::fmt;

use alloy_primitives::{b256, keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Admin of every other role.
pub const DEFAULT_ADMIN_ROLE: B256 = B256::ZERO;
/// `keccak256("PROPOSER_ROLE")`
pub const PROPOSER_ROLE: B256 =
    b256!("b09aa5aeb3702cfd50b6b62bc4532604938f21248a27a1d5ca736082b6819cc1");
/// `keccak256("EXECUTOR_ROLE")`
pub const EXECUTOR_ROLE: B256 =
    b256!("d8aa0f3194971a2a116679f7c2090f6939c8d4e01a2a8d7e41d55e5351469e63");
/// `keccak256("CANCELLER_ROLE")`
pub const CANCELLER_ROLE: B256 =
    b256!("fd643c72710c63c0180259aba6b2d05451e3591a24e58b62239378085726f783");
/// `keccak256("NAME_UPDATE_ROLE")`
pub const NAME_UPDATE_ROLE: B256 =
    b256!("3bf6f84c551338237db5a524ccec1572afadd69fa32192d1f6936304c1c153d3");
/// `keccak256("METADATA_URI_UPDATE_ROLE")`
pub const METADATA_URI_UPDATE_ROLE: B256 =
    b256!("a3a9e0bb3e2e5e68b66921785f226d041e1daddbbf92aa515b7db3ec3518d8fd");

/// Access-control roles held on a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    DefaultAdmin,
    Proposer,
    Executor,
    Canceller,
    NameUpdate,
    MetadataUriUpdate,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::DefaultAdmin,
        Role::Proposer,
        Role::Executor,
        Role::Canceller,
        Role::NameUpdate,
        Role::MetadataUriUpdate,
    ];

    /// The role's Solidity constant name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::DefaultAdmin => "DEFAULT_ADMIN_ROLE",
            Role::Proposer => "PROPOSER_ROLE",
            Role::Executor => "EXECUTOR_ROLE",
            Role::Canceller => "CANCELLER_ROLE",
            Role::NameUpdate => "NAME_UPDATE_ROLE",
            Role::MetadataUriUpdate => "METADATA_URI_UPDATE_ROLE",
        }
    }

    /// The 32-byte role id used by `hasRole` and `getRoleAdmin`
    pub const fn id(&self) -> B256 {
        match self {
            Role::DefaultAdmin => DEFAULT_ADMIN_ROLE,
            Role::Proposer => PROPOSER_ROLE,
            Role::Executor => EXECUTOR_ROLE,
            Role::Canceller => CANCELLER_ROLE,
            Role::NameUpdate => NAME_UPDATE_ROLE,
            Role::MetadataUriUpdate => METADATA_URI_UPDATE_ROLE,
        }
    }

    /// Looks a role up by its id
    pub fn from_id(id: B256) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a scheduled operation, as returned by `getOperationState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperationState {
    /// Never scheduled, or cancelled
    Unset = 0,
    /// Scheduled, delay not yet elapsed
    Waiting = 1,
    /// Delay elapsed, not yet executed
    Ready = 2,
    Done = 3,
}

impl OperationState {
    /// Waiting or ready
    pub fn is_pending(&self) -> bool {
        matches!(self, OperationState::Waiting | OperationState::Ready)
    }

    /// The bitmap OpenZeppelin uses in `TimelockUnexpectedOperationState`
    pub fn bitmap(&self) -> B256 {
        B256::from(U256::from(1u8) << (*self as u8 as usize))
    }

    /// Decodes the `expectedStates` bitmap of a
    /// `TimelockUnexpectedOperationState` revert
    pub fn from_bitmap(bitmap: B256) -> Vec<Self> {
        let bits = U256::from_be_bytes(bitmap.0);
        [
            OperationState::Unset,
            OperationState::Waiting,
            OperationState::Ready,
            OperationState::Done,
        ]
        .into_iter()
        .filter(|state| bits.bit(*state as u8 as usize))
        .collect()
    }
}

impl TryFrom<u8> for OperationState {
    type Error = NetworkError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(OperationState::Unset),
            1 => Ok(OperationState::Waiting),
            2 => Ok(OperationState::Ready),
            3 => Ok(OperationState::Done),
            other => Err(NetworkError::InvalidConfig(format!(
                "unknown operation state {other}"
            ))),
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationState::Unset => "unset",
            OperationState::Waiting => "waiting",
            OperationState::Ready => "ready",
            OperationState::Done => "done",
        };
        f.write_str(s)
    }
}

/// `keccak256(abi.encode(target, value, data, predecessor, salt))`
pub fn hash_operation(
    target: Address,
    value: U256,
    data: &Bytes,
    predecessor: B256,
    salt: B256,
) -> B256 {
    keccak256((target, value, data.clone(), predecessor, salt).abi_encode_params())
}

/// `keccak256(abi.encode(targets, values, payloads, predecessor, salt))`
///
/// The three arrays must have equal lengths, which the contract enforces
/// with `TimelockInvalidOperationLength`.
pub fn hash_operation_batch(
    targets: &[Address],
    values: &[U256],
    payloads: &[Bytes],
    predecessor: B256,
    salt: B256,
) -> Result<B256> {
    if targets.len() != values.len() || targets.len() != payloads.len() {
        return Err(NetworkError::InvalidConfig(format!(
            "batch length mismatch: {} targets, {} values, {} payloads",
            targets.len(),
            values.len(),
            payloads.len()
        )));
    }

    Ok(keccak256(
        (
            targets.to_vec(),
            values.to_vec(),
            payloads.to_vec(),
            predecessor,
            salt,
        )
            .abi_encode_params(),
    ))
}

/// A single-call timelock operation.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub target: Address,
    #[builder(default)]
    pub value: U256,
    #[builder(into, default)]
    pub data: Bytes,
    /// Operation that must be done before this one, zero for none
    #[builder(default)]
    pub predecessor: B256,
    #[builder(default)]
    pub salt: B256,
}

impl Operation {
    /// The operation id the contract derives with `hashOperation`
    pub fn id(&self) -> B256 {
        hash_operation(
            self.target,
            self.value,
            &self.data,
            self.predecessor,
            self.salt,
        )
    }
}

/// A multi-call timelock operation, executed atomically.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct BatchOperation {
    pub targets: Vec<Address>,
    #[builder(default)]
    pub values: Vec<U256>,
    pub payloads: Vec<Bytes>,
    #[builder(default)]
    pub predecessor: B256,
    #[builder(default)]
    pub salt: B256,
}

impl BatchOperation {
    /// Per-call values, zero-filled for every target when none were given
    pub fn resolved_values(&self) -> Vec<U256> {
        if self.values.is_empty() {
            vec![U256::ZERO; self.targets.len()]
        } else {
            self.values.clone()
        }
    }

    /// The operation id the contract derives with `hashOperationBatch`
    pub fn id(&self) -> Result<B256> {
        hash_operation_batch(
            &self.targets,
            &self.resolved_values(),
            &self.payloads,
            self.predecessor,
            self.salt,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};
    use rstest::rstest;

    const TARGET: Address = address!("1111111111111111111111111111111111111111");

    fn salt_one() -> B256 {
        B256::from(U256::from(1))
    }

    #[rstest]
    #[case(Role::Proposer)]
    #[case(Role::Executor)]
    #[case(Role::Canceller)]
    #[case(Role::NameUpdate)]
    #[case(Role::MetadataUriUpdate)]
    fn test_role_id_is_hash_of_name(#[case] role: Role) {
        assert_eq!(role.id(), keccak256(role.as_str()));
        assert_eq!(Role::from_id(role.id()), Some(role));
    }

    #[test]
    fn test_default_admin_role_is_zero() {
        assert_eq!(Role::DefaultAdmin.id(), B256::ZERO);
        assert_eq!(Role::from_id(B256::ZERO), Some(Role::DefaultAdmin));
        assert_eq!(Role::from_id(B256::repeat_byte(0xff)), None);
    }

    #[rstest]
    #[case(0, OperationState::Unset)]
    #[case(1, OperationState::Waiting)]
    #[case(2, OperationState::Ready)]
    #[case(3, OperationState::Done)]
    fn test_operation_state_from_u8(#[case] raw: u8, #[case] state: OperationState) {
        assert_eq!(OperationState::try_from(raw).unwrap(), state);
    }

    #[test]
    fn test_operation_state_rejects_unknown() {
        assert!(matches!(
            OperationState::try_from(4),
            Err(NetworkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_operation_state_bitmap_round_trip() {
        let bitmap = B256::from(
            U256::from_be_bytes(OperationState::Waiting.bitmap().0)
                | U256::from_be_bytes(OperationState::Ready.bitmap().0),
        );
        assert_eq!(
            OperationState::from_bitmap(bitmap),
            vec![OperationState::Waiting, OperationState::Ready]
        );
        assert!(OperationState::Ready.is_pending());
        assert!(!OperationState::Done.is_pending());
    }

    #[test]
    fn test_hash_operation_vector() {
        let id = hash_operation(
            TARGET,
            U256::ZERO,
            &bytes!("deadbeef"),
            B256::ZERO,
            salt_one(),
        );
        assert_eq!(
            id,
            b256!("7245344ed7ebb702ffe52b671a4bd348fd89d0ac0808d24cbd39b39492ed4bb9")
        );
    }

    #[test]
    fn test_hash_operation_batch_vector() {
        let id = hash_operation_batch(
            &[TARGET],
            &[U256::ZERO],
            &[bytes!("deadbeef")],
            B256::ZERO,
            salt_one(),
        )
        .unwrap();
        assert_eq!(
            id,
            b256!("99ce1fa488f314deb158804bca7042c47bf42c03e58ebe8a6c6bb55db357debb")
        );
    }

    #[test]
    fn test_hash_operation_batch_length_mismatch() {
        let result = hash_operation_batch(
            &[TARGET, TARGET],
            &[U256::ZERO],
            &[Bytes::new(), Bytes::new()],
            B256::ZERO,
            B256::ZERO,
        );
        assert!(matches!(result, Err(NetworkError::InvalidConfig(_))));
    }

    #[test]
    fn test_operation_builder_id() {
        let op = Operation::builder()
            .target(TARGET)
            .data(bytes!("deadbeef"))
            .salt(salt_one())
            .build();
        assert_eq!(
            op.id(),
            b256!("7245344ed7ebb702ffe52b671a4bd348fd89d0ac0808d24cbd39b39492ed4bb9")
        );
    }

    #[test]
    fn test_batch_operation_zero_fills_values() {
        let op = BatchOperation::builder()
            .targets(vec![TARGET])
            .payloads(vec![bytes!("deadbeef")])
            .salt(salt_one())
            .build();
        assert_eq!(op.resolved_values(), vec![U256::ZERO]);
        assert_eq!(
            op.id().unwrap(),
            b256!("99ce1fa488f314deb158804bca7042c47bf42c03e58ebe8a6c6bb55db357debb")
        );
    }
}
