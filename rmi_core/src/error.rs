use std::collections::TryReserveError;
use thiserror::Error;

/// Failure modes of [`Rmi::new`](crate::Rmi::new). Queries are infallible.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The requested layer-2 size was zero.
    #[error("layer 2 must hold at least one model")]
    EmptyLayer2,

    /// Reserving storage for the layer-2 models or error bounds failed.
    #[error("failed to allocate index storage")]
    Alloc(#[from] TryReserveError),
}
