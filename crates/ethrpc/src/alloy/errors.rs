use alloy::transports::{RpcError, TransportError};

pub trait RpcErrorExt {
    /// The message the node answered the request with, e.g. because the
    /// transaction reverts or the sender can't pay for it. `None` if the
    /// request failed before the node could answer it.
    fn rejection_message(&self) -> Option<&str>;
}

impl RpcErrorExt for TransportError {
    fn rejection_message(&self) -> Option<&str> {
        match self {
            RpcError::ErrorResp(payload) => Some(payload.message.as_ref()),
            _ => None,
        }
    }
}

/// Create an arbitrary alloy error that the node answered with.
/// Useful for testing.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_rejection() -> TransportError {
    TransportError::ErrorResp(alloy::rpc::json_rpc::ErrorPayload::internal_error())
}

/// Create an arbitrary alloy error that never reached the node.
/// Useful for testing.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_node_error() -> TransportError {
    alloy::transports::TransportErrorKind::custom_str("connection refused")
}
