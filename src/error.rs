//! Canonical error and result types for the crate.
//!
//! Operational outcomes of a layer call travel through
//! [`LayerState`](crate::LayerState). The types here cover everything that is
//! not an operational outcome: precondition violations when building buffers,
//! invalid link requests, and calls that cannot be routed at all.

use thiserror::Error;

use crate::{
    chain::{Operation, Target},
    layer::LayerId,
};

/// Errors raised when creating a [`DataBuffer`](crate::DataBuffer).
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The requested capacity was zero.
    #[error("invalid argument: buffer capacity must be greater than zero")]
    ZeroCapacity,
    /// A caller that cannot proceed without a buffer found none available.
    #[error("no memory for a {capacity}-byte buffer")]
    Unavailable {
        /// Requested capacity.
        capacity: usize,
    },
}

/// Errors raised while linking layers into a [`Chain`](crate::Chain).
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// The handle does not belong to this chain.
    #[error("unknown layer {0}")]
    UnknownLayer(LayerId),
    /// A layer cannot be its own neighbour.
    #[error("layer {0} cannot be linked to itself")]
    SelfLink(LayerId),
    /// One side of the requested link is already occupied.
    #[error("cannot link {upstream} -> {downstream}: {occupied} already has a {side} neighbour")]
    AlreadyLinked {
        /// Requested upstream layer.
        upstream: LayerId,
        /// Requested downstream layer.
        downstream: LayerId,
        /// Layer whose link slot is taken.
        occupied: LayerId,
        /// Which slot is taken.
        side: Target,
    },
    /// Linking would turn the chain into a ring.
    #[error("linking {upstream} -> {downstream} would create a cycle")]
    Cycle {
        /// Requested upstream layer.
        upstream: LayerId,
        /// Requested downstream layer.
        downstream: LayerId,
    },
}

/// Errors raised when a call cannot be delivered to its target.
///
/// A delivered call always yields the target's [`LayerState`](crate::LayerState)
/// unchanged; these errors mean no layer code ran at all.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The originating handle does not belong to this chain.
    #[error("unknown layer {0}")]
    UnknownLayer(LayerId),
    /// The origin sits at the chain boundary in the requested direction.
    #[error("{operation} from {from}: no {target} neighbour")]
    NoNeighbor {
        /// Layer the call was routed from.
        from: LayerId,
        /// Requested direction.
        target: Target,
        /// Operation that could not be routed.
        operation: Operation,
    },
    /// The resolved target has already completed shutdown.
    #[error("{operation} refused: layer {layer} is closed")]
    Closed {
        /// Closed target layer.
        layer: LayerId,
        /// Operation that was refused.
        operation: Operation,
    },
}

/// Result alias for chain routing.
pub type Result<T, E = DispatchError> = std::result::Result<T, E>;
