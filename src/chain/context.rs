//! Per-call view of the chain handed to layer handlers.

use std::panic::Location;

use super::{Chain, Operation, Target};
use crate::{
    diagnostics::CallSite,
    error::Result,
    layer::{Connectivity, LayerId},
    state::{LayerState, Lifecycle},
};

/// The calling layer's position plus routing helpers.
///
/// A `Context` is only valid for the duration of one handler call. It
/// exposes the layer's connectivity record and user data, and routes
/// further calls to `self`, `next` or `prev` on the layer's behalf.
pub struct Context<'c, 'u, U: ?Sized = ()> {
    chain: &'c Chain<'u, U>,
    this: LayerId,
}

impl<U: ?Sized> Clone for Context<'_, '_, U> {
    fn clone(&self) -> Self { *self }
}

impl<U: ?Sized> Copy for Context<'_, '_, U> {}

impl<'c, 'u, U: ?Sized> Context<'c, 'u, U> {
    pub(super) fn new(chain: &'c Chain<'u, U>, this: LayerId) -> Self { Self { chain, this } }

    /// Handle of the layer being called.
    #[must_use]
    pub fn id(&self) -> LayerId { self.this }

    /// The chain the layer belongs to.
    #[must_use]
    pub fn chain(&self) -> &'c Chain<'u, U> { self.chain }

    /// The layer's `self`/`next`/`prev` record.
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        let node = &self.chain.nodes[self.this.index()];
        Connectivity {
            this: node.this,
            next: node.next,
            prev: node.prev,
        }
    }

    /// Downstream neighbour, or `None` at the chain boundary.
    #[must_use]
    pub fn next(&self) -> Option<LayerId> { self.chain.nodes[self.this.index()].next }

    /// Upstream neighbour, or `None` at the chain boundary.
    #[must_use]
    pub fn prev(&self) -> Option<LayerId> { self.chain.nodes[self.this.index()].prev }

    /// User data the layer was created with.
    #[must_use]
    pub fn user_data(&self) -> Option<&'u U> { self.chain.nodes[self.this.index()].user_data }

    /// The layer's current shutdown progress.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle { self.chain.nodes[self.this.index()].lifecycle.get() }

    /// Send the pull signal to `target`.
    ///
    /// # Errors
    ///
    /// See [`Chain::resolve`].
    #[track_caller]
    pub fn on_demand(&self, target: Target, buffer: &[u8]) -> Result<LayerState> {
        let site = CallSite::from(Location::caller());
        self.chain
            .deliver(self.this, target, Operation::OnDemand, site, |layer, ctx| {
                layer.on_demand(ctx, buffer)
            })
    }

    /// Send the push signal to `target`.
    ///
    /// # Errors
    ///
    /// See [`Chain::resolve`].
    #[track_caller]
    pub fn on_data_ready(&self, target: Target, buffer: &mut [u8]) -> Result<LayerState> {
        let site = CallSite::from(Location::caller());
        self.chain
            .deliver(self.this, target, Operation::OnDataReady, site, |layer, ctx| {
                layer.on_data_ready(ctx, buffer)
            })
    }

    /// Ask `target` to begin shutdown.
    ///
    /// # Errors
    ///
    /// See [`Chain::resolve`].
    #[track_caller]
    pub fn close(&self, target: Target) -> Result<LayerState> {
        let site = CallSite::from(Location::caller());
        self.chain
            .deliver(self.this, target, Operation::Close, site, |layer, ctx| layer.close(ctx))
    }

    /// Tell `target` that this layer has closed.
    ///
    /// # Errors
    ///
    /// See [`Chain::resolve`].
    #[track_caller]
    pub fn on_close(&self, target: Target) -> Result<LayerState> {
        let site = CallSite::from(Location::caller());
        self.chain
            .deliver(self.this, target, Operation::OnClose, site, |layer, ctx| {
                layer.on_close(ctx)
            })
    }
}

impl<U: ?Sized> std::fmt::Debug for Context<'_, '_, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("connectivity", &self.connectivity())
            .field("lifecycle", &self.lifecycle())
            .finish_non_exhaustive()
    }
}
