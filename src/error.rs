use std::fmt::Display;

use alloy::transports;

use crate::store::StoreError;

/// Error surfaced by the indexing pipelines or the event stream.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unexpected empty RPC response")]
    NullResp,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("block out of order, expected: {0}, got: {1}")]
    BlockOutOfOrder(u64, u64),

    #[error("entity store error: {0}")]
    Store(#[from] StoreError),
}

impl<E: Display> From<transports::RpcError<E>> for MarketError {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp) => {
                // Heuristic split between requests the node rejects as
                // malformed/ahead-of-tip and plain transport failures
                let msg = resp.message.to_ascii_lowercase();
                if ((resp.code == -32600 || resp.code == -32601 || resp.code == -32602)
                    && (msg.contains("invalid") || msg.contains("not found")))
                    || (resp.code == -32603
                        && (msg.contains("block by number") || msg.contains("getting block")))
                {
                    Self::InvalidRequest(msg)
                } else {
                    Self::Transport(value.to_string())
                }
            }
            transports::RpcError::NullResp => Self::NullResp,
            _ => Self::Transport(value.to_string()),
        }
    }
}
