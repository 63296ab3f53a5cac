use thiserror::Error;

use crate::protocol::WireError;
use crate::protocol::message::OperationKind;

/// Errors confined to one request's coordination lifecycle.
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("partial result delivered twice to the same monitor")]
    DoubleDelivery,

    #[error("no replication listener registered under id {0}")]
    UnknownListener(u32),

    #[error("partial result shape does not fit a {kind} merge")]
    PartialShapeMismatch { kind: OperationKind },

    #[error("wire error: {0}")]
    Wire(#[from] WireError),
}
