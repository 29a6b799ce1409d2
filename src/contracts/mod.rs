//! Network contract bindings
//!
//! This module contains Alloy-generated contract bindings for the network
//! contracts and typed wrappers around them.
//!
//! ## Public API
//!
//! - [`NetworkContract`](network::NetworkContract) for `INetwork`
//! - [`SetMaxNetworkLimitHookContract`](set_max_network_limit_hook::SetMaxNetworkLimitHookContract)
//!   for `ISetMaxNetworkLimitHook`
//! - [`TimelockContract`](timelock::TimelockContract) for the inherited
//!   OpenZeppelin `TimelockController` surface

pub mod network;
pub mod set_max_network_limit_hook;
pub mod timelock;

use std::future::IntoFuture;

use alloy_primitives::Address;
use tracing::{error, Instrument};

use crate::error::{NetworkError, Result};
use crate::revert::revert_from_contract_error;
use crate::spans;

/// Runs a read-only call inside a `network_bindings.contract_call` span.
///
/// On failure the revert is decoded when possible, logged, and recorded on
/// the span before the error is returned.
pub(crate) async fn traced_call<T, C>(
    contract: &'static str,
    address: Address,
    method: &'static str,
    call: C,
) -> Result<T>
where
    C: IntoFuture<Output = std::result::Result<T, alloy_contract::Error>>,
{
    let span = spans::contract_call(contract, address, method);
    async move {
        call.await.map_err(|err| {
            let revert = revert_from_contract_error(&err);
            error!(
                contract = contract,
                contract_address = %address,
                method = method,
                revert = ?revert,
                error = %err,
                event = "contract_call_failed"
            );
            match &revert {
                Some(revert) => spans::record_error_with_context(
                    revert.name(),
                    &revert.to_string(),
                    Some(method),
                ),
                None => spans::record_error(&err),
            }
            NetworkError::Contract(err)
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_rpc::{ErrorPayload, RpcError};
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::span::{Id, Record};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::Layer;

    /// Span fields recorded after creation, as `(span, field, value)`
    #[derive(Clone, Default)]
    struct RecordedFields(Arc<Mutex<Vec<(String, String, String)>>>);

    impl RecordedFields {
        fn on(&self, span: &str) -> Vec<(String, String)> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(name, _, _)| name == span)
                .map(|(_, field, value)| (field.clone(), value.clone()))
                .collect()
        }
    }

    struct FieldVisitor<'a> {
        span: &'a str,
        out: &'a mut Vec<(String, String, String)>,
    }

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.out
                .push((self.span.to_string(), field.name().to_string(), value.to_string()));
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.out
                .push((self.span.to_string(), field.name().to_string(), format!("{value:?}")));
        }
    }

    impl<S> Layer<S> for RecordedFields
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            if let Some(span) = ctx.span(id) {
                let mut out = self.0.lock().unwrap();
                values.record(&mut FieldVisitor {
                    span: span.name(),
                    out: &mut out,
                });
            }
        }
    }

    fn reverted_with(data: &str) -> alloy_contract::Error {
        let payload: ErrorPayload = serde_json::from_str(&format!(
            r#"{{"code":3,"message":"execution reverted","data":"{data}"}}"#
        ))
        .unwrap();
        alloy_contract::Error::TransportError(RpcError::ErrorResp(payload))
    }

    #[tokio::test]
    async fn test_failed_call_records_revert_on_its_own_span() {
        let recorded = RecordedFields::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(recorded.clone()));

        // NotMiddleware()
        let failing = std::future::ready(Err::<Address, _>(reverted_with("0x9b4c49e0")));
        let err = traced_call("INetwork", Address::ZERO, "NETWORK_REGISTRY", failing)
            .instrument(tracing::info_span!("caller"))
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkError::Contract(_)));
        let fields = recorded.on("network_bindings.contract_call");
        assert!(fields.contains(&("error.type".to_string(), "NotMiddleware".to_string())));
        assert!(fields.contains(&("error.source".to_string(), "NETWORK_REGISTRY".to_string())));
        assert!(fields.contains(&("otel.status_code".to_string(), "ERROR".to_string())));
        assert!(recorded.on("caller").is_empty());
    }

    #[tokio::test]
    async fn test_successful_call_records_nothing() {
        let recorded = RecordedFields::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(recorded.clone()));

        let value = traced_call(
            "TimelockController",
            Address::ZERO,
            "getMinDelay",
            std::future::ready(Ok::<_, alloy_contract::Error>(7u64)),
        )
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert!(recorded.on("network_bindings.contract_call").is_empty());
    }
}
