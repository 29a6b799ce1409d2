// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Contract Interface Descriptor
//!
//! Holds the canonical ABI of each contract, exactly as compiled from its
//! published interface. The same JSON files feed the `sol!` bindings in
//! [`crate::contracts`], so the typed wrappers and the descriptor cannot drift
//! apart.
//!
//! The descriptor is used at run time to:
//!
//! - enumerate functions, events and errors in declaration order,
//! - classify each function as a read-only call or a transaction,
//! - compute selectors and topic hashes from canonical signatures,
//! - decode logs and revert data without compile-time knowledge of the type.
//!
//! # Example
//!
//! ```rust
//! use network_bindings::abi;
//!
//! let network = abi::network()?;
//! let not_middleware = network.error("NotMiddleware")?;
//! assert_eq!(not_middleware.signature(), "NotMiddleware()");
//!
//! for call in network.bindings().calls() {
//!     println!("{} -> {}", call.signature, call.selector);
//! }
//! # Ok::<(), network_bindings::NetworkError>(())
//! ```

mod binding;
mod kind;

pub use binding::{
    snake_case, CallKind, ContractBindings, ErrorBinding, EventBinding, FunctionBinding,
    ParamBinding,
};
pub use kind::AbiKind;

use alloy_dyn_abi::{DynSolValue, EventExt, JsonAbiExt};
use alloy_json_abi::{AbiItem, Error as AbiError, Event, Function};
use alloy_primitives::{FixedBytes, LogData, B256};
use tracing::{debug, error};

use crate::error::{NetworkError, Result};
use crate::spans;

/// ABI of the `INetwork` contract.
pub const INETWORK_ABI: &str = include_str!("../../abis/INetwork.json");

/// ABI of the `ISetMaxNetworkLimitHook` contract.
pub const SET_MAX_NETWORK_LIMIT_HOOK_ABI: &str =
    include_str!("../../abis/ISetMaxNetworkLimitHook.json");

/// Parses the embedded `INetwork` descriptor.
pub fn network() -> Result<ContractDescriptor> {
    ContractDescriptor::parse("INetwork", INETWORK_ABI)
}

/// Parses the embedded `ISetMaxNetworkLimitHook` descriptor.
pub fn set_max_network_limit_hook() -> Result<ContractDescriptor> {
    ContractDescriptor::parse("ISetMaxNetworkLimitHook", SET_MAX_NETWORK_LIMIT_HOOK_ABI)
}

/// Immutable description of a contract's callable surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    functions: Vec<Function>,
    events: Vec<Event>,
    errors: Vec<AbiError>,
    bindings: ContractBindings,
}

/// A log decoded against the descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
    pub event: String,
    /// Values read from topics 1..=3, paired with their parameter names
    pub indexed: Vec<(String, DynSolValue)>,
    /// Values read from the log data, paired with their parameter names
    pub body: Vec<(String, DynSolValue)>,
}

/// Revert data decoded against the descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRevert {
    pub error: String,
    pub selector: FixedBytes<4>,
    pub args: Vec<(String, DynSolValue)>,
}

impl ContractDescriptor {
    /// Parses ABI JSON, keeping declaration order.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::AbiParse`] if the JSON is malformed
    /// - [`NetworkError::UnknownAbiType`] if a parameter type does not resolve
    pub fn parse(name: impl Into<String>, json: &str) -> Result<Self> {
        let name = name.into();
        let items: Vec<AbiItem<'_>> = serde_json::from_str(json).inspect_err(|e| {
            error!(contract = %name, error = %e, event = "abi_parse_failed");
        })?;

        let mut functions = Vec::new();
        let mut events = Vec::new();
        let mut errors = Vec::new();
        for item in items {
            match item {
                AbiItem::Function(f) => functions.push(f.into_owned()),
                AbiItem::Event(e) => events.push(e.into_owned()),
                AbiItem::Error(e) => errors.push(e.into_owned()),
                // constructor, fallback and receive have no binding
                _ => {}
            }
        }

        let bindings = ContractBindings {
            contract: name.clone(),
            functions: functions
                .iter()
                .map(FunctionBinding::project)
                .collect::<Result<_>>()?,
            events: events
                .iter()
                .map(EventBinding::project)
                .collect::<Result<_>>()?,
            errors: errors
                .iter()
                .map(ErrorBinding::project)
                .collect::<Result<_>>()?,
        };

        debug!(
            contract = %name,
            functions = functions.len(),
            events = events.len(),
            errors = errors.len(),
            event = "contract_descriptor_parsed"
        );

        Ok(Self {
            functions,
            events,
            errors,
            bindings,
        })
    }

    pub fn name(&self) -> &str {
        &self.bindings.contract
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn errors(&self) -> &[AbiError] {
        &self.errors
    }

    /// The binding projection computed when the descriptor was parsed.
    pub fn bindings(&self) -> &ContractBindings {
        &self.bindings
    }

    /// Looks up a function by name. Overloads resolve to the first declared.
    pub fn function(&self, name: &str) -> Result<&Function> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| unknown("function", name))
    }

    pub fn event(&self, name: &str) -> Result<&Event> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| unknown("event", name))
    }

    pub fn error(&self, name: &str) -> Result<&AbiError> {
        self.errors
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| unknown("error", name))
    }

    pub fn function_by_selector(&self, selector: FixedBytes<4>) -> Option<&Function> {
        self.functions.iter().find(|f| f.selector() == selector)
    }

    /// Finds the non-anonymous event whose signature hashes to `topic`.
    pub fn event_by_topic(&self, topic: B256) -> Option<&Event> {
        self.events
            .iter()
            .find(|e| !e.anonymous && e.selector() == topic)
    }

    pub fn error_by_selector(&self, selector: FixedBytes<4>) -> Option<&AbiError> {
        self.errors.iter().find(|e| e.selector() == selector)
    }

    /// Decodes a log keyed by its topic0.
    ///
    /// Indexed parameters are read from topics, the rest from the log data.
    pub fn decode_log(&self, log: &LogData) -> Result<DecodedLog> {
        let topic0 = *log.topics().first().ok_or(NetworkError::MissingTopic(0))?;
        let event = self
            .event_by_topic(topic0)
            .ok_or(NetworkError::UnknownTopic(topic0))?;
        let decoded = event.decode_log(log)?;

        let indexed_names = event.inputs.iter().filter(|p| p.indexed).map(|p| p.name.clone());
        let body_names = event.inputs.iter().filter(|p| !p.indexed).map(|p| p.name.clone());

        Ok(DecodedLog {
            event: event.name.clone(),
            indexed: indexed_names.zip(decoded.indexed).collect(),
            body: body_names.zip(decoded.body).collect(),
        })
    }

    /// Decodes revert data keyed by its 4-byte selector.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::RevertDataTooShort`] when `data` holds no selector
    /// - [`NetworkError::UnknownSelector`] when no declared error matches
    pub fn decode_revert(&self, data: &[u8]) -> Result<DecodedRevert> {
        let span = spans::decode_revert(self.name(), data.len());
        let _guard = span.enter();

        if data.len() < 4 {
            spans::record_error(&NetworkError::RevertDataTooShort(data.len()));
            return Err(NetworkError::RevertDataTooShort(data.len()));
        }
        let selector = FixedBytes::<4>::from_slice(&data[..4]);
        let abi_error = self.error_by_selector(selector).ok_or_else(|| {
            let err = NetworkError::UnknownSelector(selector);
            spans::record_error(&err);
            err
        })?;

        let values = abi_error.abi_decode_input(&data[4..])?;
        let args = abi_error
            .inputs
            .iter()
            .map(|p| p.name.clone())
            .zip(values)
            .collect();

        debug!(
            contract = %self.name(),
            error_name = %abi_error.name,
            selector = %selector,
            event = "revert_decoded"
        );

        Ok(DecodedRevert {
            error: abi_error.name.clone(),
            selector,
            args,
        })
    }
}

fn unknown(kind: &'static str, name: &str) -> NetworkError {
    NetworkError::UnknownItem {
        kind,
        name: name.to_string(),
    }
}
