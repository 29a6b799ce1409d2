// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Print the binding surface derived from the embedded ABIs
//!
//! Run with: `cargo run --example inspect_abi`
//! Add `-- --json` to dump the full projection as JSON.

use network_bindings::abi::{self, ContractDescriptor};
use network_bindings::NetworkError;

fn print_descriptor(descriptor: &ContractDescriptor) {
    let bindings = descriptor.bindings();
    println!("== {} ==", descriptor.name());

    println!("\nCalls (eth_call):");
    for function in bindings.calls() {
        println!("  {} {}", function.selector, function.signature);
    }

    println!("\nTransactions:");
    for function in bindings.transactions() {
        let inputs: Vec<_> = function
            .inputs
            .iter()
            .map(|p| format!("{}: {}", p.name, p.rust_type()))
            .collect();
        println!(
            "  {} {} -> {}_transaction({})",
            function.selector,
            function.signature,
            function.method_name,
            inputs.join(", ")
        );
    }

    if !bindings.events.is_empty() {
        println!("\nEvents:");
        for event in &bindings.events {
            let indexed: Vec<_> = event.indexed.iter().map(|p| p.name.as_str()).collect();
            println!("  {}", event.signature);
            if let Some(topic) = event.topic {
                println!("    topic0  {topic}");
            }
            println!("    indexed [{}]", indexed.join(", "));
        }
    }

    if !bindings.errors.is_empty() {
        println!("\nErrors:");
        for error in &bindings.errors {
            println!("  {} {}", error.selector, error.signature);
        }
    }
    println!();
}

fn main() -> Result<(), NetworkError> {
    let json = std::env::args().any(|arg| arg == "--json");

    for descriptor in [abi::network()?, abi::set_max_network_limit_hook()?] {
        if json {
            println!("{}", descriptor.bindings().to_json()?);
        } else {
            print_descriptor(&descriptor);
        }
    }
    Ok(())
}
