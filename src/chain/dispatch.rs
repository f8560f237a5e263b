//! Three-way call routing.
//!
//! Every operation can be sent from a layer to itself, to its `next`
//! neighbour, or to its `prev` neighbour. Routing resolves the target,
//! applies the lifecycle rules, records the call site and invokes the
//! target's handler. The handler's [`LayerState`] is returned unchanged.
//!
//! Lifecycle rules:
//! - No call is delivered to a layer that is already
//!   [`Lifecycle::Closed`].
//! - Delivering `close` moves the target to [`Lifecycle::Closing`].
//! - Sending `on_close` announces that the sender has closed: the sender is
//!   `Closed` before the target runs, and the target is `Closed` once its
//!   handler returns. A layer sending `on_close` to itself stays in its
//!   current state until its own handler returns.

use std::{fmt, panic::Location};

use super::{Chain, Context};
use crate::{
    diagnostics::CallSite,
    error::{DispatchError, Result},
    layer::{Layer, LayerId},
    state::{LayerState, Lifecycle},
};

/// Where a call is routed relative to the calling layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// The calling layer itself.
    This,
    /// The neighbour further from the origin of the chain.
    Next,
    /// The neighbour closer to the origin of the chain.
    Prev,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::This => "self",
            Self::Next => "next",
            Self::Prev => "prev",
        })
    }
}

/// The four layer operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Pull signal.
    OnDemand,
    /// Push signal.
    OnDataReady,
    /// Shutdown request.
    Close,
    /// Shutdown acknowledgement.
    OnClose,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OnDemand => "on_demand",
            Self::OnDataReady => "on_data_ready",
            Self::Close => "close",
            Self::OnClose => "on_close",
        })
    }
}

impl<'u, U: ?Sized> Chain<'u, U> {
    /// Send the pull signal from `from` to `target`.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the call cannot be routed; see
    /// [`Chain::resolve`].
    #[track_caller]
    pub fn on_demand(&self, from: LayerId, target: Target, buffer: &[u8]) -> Result<LayerState> {
        let site = CallSite::from(Location::caller());
        self.deliver(from, target, Operation::OnDemand, site, |layer, ctx| {
            layer.on_demand(ctx, buffer)
        })
    }

    /// Send the push signal from `from` to `target`.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the call cannot be routed; see
    /// [`Chain::resolve`].
    #[track_caller]
    pub fn on_data_ready(
        &self,
        from: LayerId,
        target: Target,
        buffer: &mut [u8],
    ) -> Result<LayerState> {
        let site = CallSite::from(Location::caller());
        self.deliver(from, target, Operation::OnDataReady, site, |layer, ctx| {
            layer.on_data_ready(ctx, buffer)
        })
    }

    /// Ask `target` to begin shutdown.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the call cannot be routed; see
    /// [`Chain::resolve`].
    #[track_caller]
    pub fn close(&self, from: LayerId, target: Target) -> Result<LayerState> {
        let site = CallSite::from(Location::caller());
        self.deliver(from, target, Operation::Close, site, |layer, ctx| {
            layer.close(ctx)
        })
    }

    /// Tell `target` that `from` has closed.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the call cannot be routed; see
    /// [`Chain::resolve`].
    #[track_caller]
    pub fn on_close(&self, from: LayerId, target: Target) -> Result<LayerState> {
        let site = CallSite::from(Location::caller());
        self.deliver(from, target, Operation::OnClose, site, |layer, ctx| {
            layer.on_close(ctx)
        })
    }

    /// Resolve `target` relative to `from` without calling anything.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownLayer`] if `from` is not from this chain.
    /// - [`DispatchError::NoNeighbor`] if `from` has no neighbour in that
    ///   direction.
    /// - [`DispatchError::Closed`] if the target has already closed.
    pub fn resolve(&self, from: LayerId, target: Target, operation: Operation) -> Result<LayerId> {
        let source = self.node(from).ok_or(DispatchError::UnknownLayer(from))?;
        let to = match target {
            Target::This => Some(source.this),
            Target::Next => source.next,
            Target::Prev => source.prev,
        }
        .ok_or(DispatchError::NoNeighbor {
            from,
            target,
            operation,
        })?;
        if self.nodes[to.index()].lifecycle.get().is_closed() {
            return Err(DispatchError::Closed {
                layer: to,
                operation,
            });
        }
        Ok(to)
    }

    pub(crate) fn deliver<F>(
        &self,
        from: LayerId,
        target: Target,
        operation: Operation,
        site: CallSite,
        call: F,
    ) -> Result<LayerState>
    where
        F: FnOnce(&(dyn Layer<U> + 'u), &Context<'_, 'u, U>) -> LayerState,
    {
        let to = self.resolve(from, target, operation).inspect_err(|err| {
            tracing::debug!(from = %from, %target, %operation, error = %err, "layer call not delivered");
        })?;
        let source = &self.nodes[from.index()];
        let node = &self.nodes[to.index()];

        match operation {
            Operation::Close => self.set_lifecycle(node, node.lifecycle.get().after_close()),
            Operation::OnClose if to != from => self.set_lifecycle(source, Lifecycle::Closed),
            Operation::OnClose | Operation::OnDemand | Operation::OnDataReady => {}
        }
        if self.config.diagnostics() {
            let mut diagnostics = node.diagnostics.get();
            diagnostics.last_call_site = Some(site);
            node.diagnostics.set(diagnostics);
        }

        let ctx = Context::new(self, to);
        let state = call(node.layer.as_ref(), &ctx);

        if operation == Operation::OnClose {
            self.set_lifecycle(node, Lifecycle::Closed);
        }
        tracing::trace!(
            layer = %to,
            from = %from,
            %target,
            %operation,
            %state,
            "layer call returned"
        );
        Ok(state)
    }
}
