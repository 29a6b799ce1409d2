// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! ABI type to Rust type mapping
//!
//! Mirrors the mapping alloy's `sol!` macro applies when it generates bindings,
//! so a [`ContractBindings`](super::ContractBindings) projection can be checked
//! against the generated code by name.

use alloy_dyn_abi::DynSolType;
use serde::Serialize;

/// The shape of an ABI parameter once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbiKind {
    /// `address`, a 20-byte value
    Address,
    Bool,
    /// `bytesN`
    FixedBytes { size: usize },
    /// `uintN`, an arbitrary precision unsigned integer
    Uint { bits: usize },
    /// `intN`
    Int { bits: usize },
    String,
    Bytes,
    Function,
    /// `T[]`
    Array { element: Box<AbiKind> },
    /// `T[k]`
    FixedArray { element: Box<AbiKind>, len: usize },
    /// An ordered aggregate
    Tuple { components: Vec<AbiKind> },
}

impl AbiKind {
    /// Returns true when the encoding of this kind has a dynamic length.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiKind::String | AbiKind::Bytes | AbiKind::Array { .. } => true,
            AbiKind::FixedArray { element, .. } => element.is_dynamic(),
            AbiKind::Tuple { components } => components.iter().any(AbiKind::is_dynamic),
            _ => false,
        }
    }

    /// The Rust type `sol!` generates for this kind.
    ///
    /// `tuple_name` names the innermost tuple, which `sol!` emits as a struct
    /// when the ABI carries a `struct` internal type.
    pub fn rust_type(&self, tuple_name: Option<&str>) -> String {
        match self {
            AbiKind::Address => "Address".to_string(),
            AbiKind::Bool => "bool".to_string(),
            AbiKind::FixedBytes { size } => format!("FixedBytes<{size}>"),
            AbiKind::Uint { bits } => match bits {
                8 | 16 | 32 | 64 | 128 => format!("u{bits}"),
                _ => format!("U{bits}"),
            },
            AbiKind::Int { bits } => match bits {
                8 | 16 | 32 | 64 | 128 => format!("i{bits}"),
                _ => format!("I{bits}"),
            },
            AbiKind::String => "String".to_string(),
            AbiKind::Bytes => "Bytes".to_string(),
            AbiKind::Function => "Function".to_string(),
            AbiKind::Array { element } => format!("Vec<{}>", element.rust_type(tuple_name)),
            AbiKind::FixedArray { element, len } => {
                format!("[{}; {len}]", element.rust_type(tuple_name))
            }
            AbiKind::Tuple { components } => match tuple_name {
                Some(name) => name.to_string(),
                None => {
                    let inner: Vec<String> =
                        components.iter().map(|c| c.rust_type(None)).collect();
                    format!("({})", inner.join(", "))
                }
            },
        }
    }
}

impl From<&DynSolType> for AbiKind {
    fn from(ty: &DynSolType) -> Self {
        match ty {
            DynSolType::Address => AbiKind::Address,
            DynSolType::Bool => AbiKind::Bool,
            DynSolType::FixedBytes(size) => AbiKind::FixedBytes { size: *size },
            DynSolType::Uint(bits) => AbiKind::Uint { bits: *bits },
            DynSolType::Int(bits) => AbiKind::Int { bits: *bits },
            DynSolType::String => AbiKind::String,
            DynSolType::Bytes => AbiKind::Bytes,
            DynSolType::Function => AbiKind::Function,
            DynSolType::Array(element) => AbiKind::Array {
                element: Box::new(AbiKind::from(element.as_ref())),
            },
            DynSolType::FixedArray(element, len) => AbiKind::FixedArray {
                element: Box::new(AbiKind::from(element.as_ref())),
                len: *len,
            },
            DynSolType::Tuple(components) => AbiKind::Tuple {
                components: components.iter().map(AbiKind::from).collect(),
            },
            // Named structs only appear with eip712 enabled somewhere in the graph
            #[allow(unreachable_patterns)]
            other => AbiKind::Tuple {
                components: other
                    .as_tuple()
                    .map(|c| c.iter().map(AbiKind::from).collect())
                    .unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("address", "Address")]
    #[case("bytes32", "FixedBytes<32>")]
    #[case("bytes4", "FixedBytes<4>")]
    #[case("uint256", "U256")]
    #[case("uint96", "U96")]
    #[case("uint64", "u64")]
    #[case("int24", "I24")]
    #[case("bool", "bool")]
    #[case("string", "String")]
    #[case("bytes", "Bytes")]
    #[case("address[]", "Vec<Address>")]
    #[case("uint256[3]", "[U256; 3]")]
    #[case("(address,bytes4,uint256)", "(Address, FixedBytes<4>, U256)")]
    fn test_rust_type_mapping(#[case] abi: &str, #[case] expected: &str) {
        let ty = DynSolType::parse(abi).unwrap();
        assert_eq!(AbiKind::from(&ty).rust_type(None), expected);
    }

    #[test]
    fn test_named_tuple_inside_array() {
        let ty = DynSolType::parse("(address,bytes4,uint256)[]").unwrap();
        assert_eq!(
            AbiKind::from(&ty).rust_type(Some("DelayParams")),
            "Vec<DelayParams>"
        );
    }

    #[rstest]
    #[case("uint256", false)]
    #[case("string", true)]
    #[case("address[]", true)]
    #[case("(uint256,bytes4)", false)]
    #[case("(uint256,string)", true)]
    #[case("string[2]", true)]
    fn test_is_dynamic(#[case] abi: &str, #[case] dynamic: bool) {
        let ty = DynSolType::parse(abi).unwrap();
        assert_eq!(AbiKind::from(&ty).is_dynamic(), dynamic);
    }
}
