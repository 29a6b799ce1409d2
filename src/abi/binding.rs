// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Binding projection of a contract ABI
//!
//! A [`ContractBindings`] is what a binding generator derives from the ABI:
//! one call or transact accessor per function, one decoder keyed by topic per
//! event, and one decoder keyed by selector per error.

use alloy_dyn_abi::Specifier;
use alloy_json_abi::{
    Error as AbiError, Event, EventParam, Function, InternalType, Param, StateMutability,
};
use alloy_primitives::{FixedBytes, B256};
use serde::Serialize;

use super::AbiKind;
use crate::error::{NetworkError, Result};

/// Whether a function binds to a read-only call or a state-changing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    /// `view` and `pure` functions, executed with `eth_call`
    Call,
    /// `nonpayable` and `payable` functions, sent as transactions
    Transact,
}

impl From<StateMutability> for CallKind {
    fn from(mutability: StateMutability) -> Self {
        match mutability {
            StateMutability::Pure | StateMutability::View => CallKind::Call,
            StateMutability::NonPayable | StateMutability::Payable => CallKind::Transact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamBinding {
    pub name: String,
    /// Canonical ABI type, with tuples expanded
    pub abi_type: String,
    pub kind: AbiKind,
    /// Struct name from the `internalType`, if the parameter is a struct
    pub struct_name: Option<String>,
}

impl ParamBinding {
    /// The Rust type the generated binding uses for this parameter.
    pub fn rust_type(&self) -> String {
        self.kind.rust_type(self.struct_name.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionBinding {
    pub name: String,
    /// Snake-case accessor name
    pub method_name: String,
    pub signature: String,
    pub selector: FixedBytes<4>,
    pub kind: CallKind,
    pub payable: bool,
    pub inputs: Vec<ParamBinding>,
    pub outputs: Vec<ParamBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventBinding {
    pub name: String,
    pub signature: String,
    /// `None` for anonymous events, which carry no signature topic
    pub topic: Option<B256>,
    pub anonymous: bool,
    /// Parameters found in topics 1..=3, in declaration order
    pub indexed: Vec<ParamBinding>,
    /// Parameters found in the log data, in declaration order
    pub data: Vec<ParamBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBinding {
    pub name: String,
    pub signature: String,
    pub selector: FixedBytes<4>,
    pub inputs: Vec<ParamBinding>,
}

/// Everything a binding generator derives from one contract ABI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractBindings {
    pub contract: String,
    pub functions: Vec<FunctionBinding>,
    pub events: Vec<EventBinding>,
    pub errors: Vec<ErrorBinding>,
}

impl ContractBindings {
    /// Functions bound as read-only calls.
    pub fn calls(&self) -> impl Iterator<Item = &FunctionBinding> {
        self.functions.iter().filter(|f| f.kind == CallKind::Call)
    }

    /// Functions bound as transactions.
    pub fn transactions(&self) -> impl Iterator<Item = &FunctionBinding> {
        self.functions.iter().filter(|f| f.kind == CallKind::Transact)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FunctionBinding {
    pub(crate) fn project(function: &Function) -> Result<Self> {
        let item = format!("function {}", function.name);
        Ok(Self {
            name: function.name.clone(),
            method_name: snake_case(&function.name),
            signature: function.signature(),
            selector: function.selector(),
            kind: CallKind::from(function.state_mutability),
            payable: function.state_mutability == StateMutability::Payable,
            inputs: project_params(&item, &function.inputs)?,
            outputs: project_params(&item, &function.outputs)?,
        })
    }
}

impl EventBinding {
    pub(crate) fn project(event: &Event) -> Result<Self> {
        let item = format!("event {}", event.name);
        let mut indexed = Vec::new();
        let mut data = Vec::new();
        for param in &event.inputs {
            let binding = project_event_param(&item, param)?;
            if param.indexed {
                indexed.push(binding);
            } else {
                data.push(binding);
            }
        }

        Ok(Self {
            name: event.name.clone(),
            signature: event.signature(),
            topic: (!event.anonymous).then(|| event.selector()),
            anonymous: event.anonymous,
            indexed,
            data,
        })
    }
}

impl ErrorBinding {
    pub(crate) fn project(error: &AbiError) -> Result<Self> {
        let item = format!("error {}", error.name);
        Ok(Self {
            name: error.name.clone(),
            signature: error.signature(),
            selector: error.selector(),
            inputs: project_params(&item, &error.inputs)?,
        })
    }
}

fn project_params(item: &str, params: &[Param]) -> Result<Vec<ParamBinding>> {
    params
        .iter()
        .map(|param| {
            let resolved = param.resolve().map_err(|_| NetworkError::UnknownAbiType {
                item: item.to_string(),
                ty: param.ty.clone(),
            })?;
            Ok(ParamBinding {
                name: param.name.clone(),
                abi_type: param.selector_type().into_owned(),
                kind: AbiKind::from(&resolved),
                struct_name: struct_name(param.internal_type.as_ref()),
            })
        })
        .collect()
}

fn project_event_param(item: &str, param: &EventParam) -> Result<ParamBinding> {
    let resolved = param.resolve().map_err(|_| NetworkError::UnknownAbiType {
        item: item.to_string(),
        ty: param.ty.clone(),
    })?;
    Ok(ParamBinding {
        name: param.name.clone(),
        abi_type: param.selector_type().into_owned(),
        kind: AbiKind::from(&resolved),
        struct_name: struct_name(param.internal_type.as_ref()),
    })
}

/// `struct INetwork.DelayParams[]` names the struct `DelayParams`.
fn struct_name(internal_type: Option<&InternalType>) -> Option<String> {
    match internal_type? {
        InternalType::Struct { ty, .. } => ty.split('[').next().map(str::to_string),
        _ => None,
    }
}

/// Converts a Solidity identifier to the snake-case name of its accessor.
///
/// Acronym runs stay together: `metadataURI` becomes `metadata_uri` and
/// `NETWORK_REGISTRY` becomes `network_registry`.
pub fn snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}
