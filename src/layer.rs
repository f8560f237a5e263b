//! The four-operation layer contract.
//!
//! A [`Layer`] is one stage of a processing chain. The chain calls into it
//! with a [`Context`] that knows the layer's position, so the
//! implementation can decide whether to forward a call to its `next`
//! neighbour, to its `prev` neighbour, to itself, or to stop.
//!
//! The data flow follows the connection: `on_demand` is the pull signal
//! ("I can take or produce more"), `on_data_ready` the push signal ("here
//! is data for you"). `close` starts teardown and `on_close` acknowledges a
//! neighbour that has already closed.

use std::fmt;

use crate::{chain::Context, state::LayerState};

/// Stable handle to a layer inside a [`Chain`](crate::Chain).
///
/// Handles carry the identity of the chain that issued them and are
/// rejected by every other chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId {
    chain: u64,
    index: usize,
}

impl LayerId {
    pub(crate) const fn new(chain: u64, index: usize) -> Self { Self { chain, index } }

    /// Position of the layer in its chain's storage.
    #[must_use]
    pub const fn index(self) -> usize { self.index }

    pub(crate) const fn chain(self) -> u64 { self.chain }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.index) }
}

/// Snapshot of a layer's position in the chain.
///
/// `this` is fixed at construction. `next` and `prev` are `None` until the
/// layer is linked; a `None` after linking marks a chain boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connectivity {
    /// The layer itself.
    pub this: LayerId,
    /// Neighbour further from the origin of the chain.
    pub next: Option<LayerId>,
    /// Neighbour closer to the origin of the chain.
    pub prev: Option<LayerId>,
}

impl Connectivity {
    /// Returns `true` if the layer has no neighbour on at least one side.
    #[must_use]
    pub fn is_boundary(&self) -> bool { self.next.is_none() || self.prev.is_none() }
}

/// Behaviour of a single chain stage.
///
/// Every method receives the calling [`Context`], which resolves `self`,
/// `next` and `prev` for this layer and routes further calls. Handlers take
/// `&self` because a call may re-enter the same layer through its
/// neighbours (for example a transport answering `on_demand` with an
/// immediate `on_data_ready` back up the chain); implementations keep their
/// mutable state behind `Cell` or `RefCell`.
///
/// Buffers are borrowed for the duration of the call only. A layer that
/// needs the bytes afterwards copies them.
///
/// # Examples
///
/// ```
/// use ondemand::{Context, Layer, LayerState, Target};
///
/// /// Forwards every pull request downstream.
/// struct Passthrough;
///
/// impl Layer for Passthrough {
///     fn on_demand(&self, ctx: &Context<'_, '_>, buffer: &[u8]) -> LayerState {
///         ctx.on_demand(Target::Next, buffer).unwrap_or(LayerState::Error)
///     }
///
///     fn on_data_ready(&self, _ctx: &Context<'_, '_>, _buffer: &mut [u8]) -> LayerState {
///         LayerState::Ok
///     }
///
///     fn close(&self, _ctx: &Context<'_, '_>) -> LayerState { LayerState::Ok }
///
///     fn on_close(&self, _ctx: &Context<'_, '_>) -> LayerState { LayerState::Ok }
/// }
/// ```
pub trait Layer<U: ?Sized = ()> {
    /// A neighbour (or the layer itself) is ready to accept or produce more
    /// data.
    ///
    /// Polling must not change the layer's observable state: repeated calls
    /// with nothing new to report return the same [`LayerState`].
    fn on_demand(&self, ctx: &Context<'_, '_, U>, buffer: &[u8]) -> LayerState;

    /// A neighbour (or the layer itself) produced data for this stage.
    fn on_data_ready(&self, ctx: &Context<'_, '_, U>, buffer: &mut [u8]) -> LayerState;

    /// Begin shutdown. The chain has already moved this layer to
    /// [`Lifecycle::Closing`](crate::Lifecycle::Closing) when this runs.
    fn close(&self, ctx: &Context<'_, '_, U>) -> LayerState;

    /// A neighbour has closed. The chain moves this layer to
    /// [`Lifecycle::Closed`](crate::Lifecycle::Closed) once this returns.
    fn on_close(&self, ctx: &Context<'_, '_, U>) -> LayerState;

    /// Name used in log output.
    fn name(&self) -> &str { std::any::type_name::<Self>() }
}

impl<U: ?Sized, L: Layer<U> + ?Sized> Layer<U> for Box<L> {
    fn on_demand(&self, ctx: &Context<'_, '_, U>, buffer: &[u8]) -> LayerState {
        (**self).on_demand(ctx, buffer)
    }

    fn on_data_ready(&self, ctx: &Context<'_, '_, U>, buffer: &mut [u8]) -> LayerState {
        (**self).on_data_ready(ctx, buffer)
    }

    fn close(&self, ctx: &Context<'_, '_, U>) -> LayerState { (**self).close(ctx) }

    fn on_close(&self, ctx: &Context<'_, '_, U>) -> LayerState { (**self).on_close(ctx) }

    fn name(&self) -> &str { (**self).name() }
}
