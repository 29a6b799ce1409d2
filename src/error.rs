// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{FixedBytes, B256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Malformed ABI JSON: {0}")]
    AbiParse(#[from] serde_json::Error),

    #[error("Unknown ABI type `{ty}` in {item}")]
    UnknownAbiType { item: String, ty: String },

    #[error("No {kind} named `{name}` in the ABI")]
    UnknownItem { kind: &'static str, name: String },

    #[error("No error matches selector {0}")]
    UnknownSelector(FixedBytes<4>),

    #[error("Revert data is {0} bytes, need at least 4 for a selector")]
    RevertDataTooShort(usize),

    #[error("Log topic mismatch: expected {expected}, found {found:?}")]
    EventMismatch { expected: B256, found: Option<B256> },

    #[error("Log has no topic at index {0}")]
    MissingTopic(usize),

    #[error("No event in the ABI matches topic {0}")]
    UnknownTopic(B256),

    #[error("Contract call failed: {0}")]
    Contract(#[from] alloy_contract::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Dynamic ABI error: {0}")]
    DynAbi(#[from] alloy_dyn_abi::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
