//! Ordered, bidirectionally linked sequences of layers.
//!
//! A [`Chain`] is the single owner of its layers. Layers are stored in an
//! arena and refer to their neighbours through [`LayerId`] handles, so no
//! layer ever owns another. Linking needs `&mut Chain` while dispatch only
//! borrows `&Chain`; the borrow checker therefore rules out re-linking while
//! a call is in flight.
//!
//! The chain holds no business logic. It keeps `next`/`prev` symmetric,
//! tracks each layer's [`Lifecycle`], and routes calls to `self`, `next` or
//! `prev` on behalf of a layer. What a layer does with a call is up to its
//! [`Layer`] implementation.

mod builder;
mod context;
mod dispatch;

use std::{
    cell::Cell,
    panic::Location,
    sync::atomic::{AtomicU64, Ordering},
};

pub use builder::ChainBuilder;
pub use context::Context;
pub use dispatch::{Operation, Target};

use crate::{
    config::ChainConfig,
    diagnostics::{CallSite, Diagnostics},
    error::ChainError,
    layer::{Connectivity, Layer, LayerId},
    state::Lifecycle,
};

struct Node<'u, U: ?Sized> {
    layer: Box<dyn Layer<U> + 'u>,
    user_data: Option<&'u U>,
    this: LayerId,
    next: Option<LayerId>,
    prev: Option<LayerId>,
    lifecycle: Cell<Lifecycle>,
    diagnostics: Cell<Diagnostics>,
}

/// Arena of layers plus the links between them.
///
/// `U` is the type of the opaque user data a layer may be given. The chain
/// only borrows it; the caller keeps it alive for `'u`.
///
/// # Examples
///
/// ```
/// use ondemand::{Chain, Context, Layer, LayerState, Target};
///
/// struct Accept;
///
/// impl Layer for Accept {
///     fn on_demand(&self, _: &Context<'_, '_>, _: &[u8]) -> LayerState { LayerState::Ok }
///     fn on_data_ready(&self, _: &Context<'_, '_>, _: &mut [u8]) -> LayerState { LayerState::Ok }
///     fn close(&self, _: &Context<'_, '_>) -> LayerState { LayerState::Ok }
///     fn on_close(&self, _: &Context<'_, '_>) -> LayerState { LayerState::Ok }
/// }
///
/// let mut chain: Chain<'_> = Chain::new();
/// let upper = chain.add_layer(Accept);
/// let lower = chain.add_layer(Accept);
/// chain.connect(upper, lower).unwrap();
///
/// assert_eq!(chain.on_demand(upper, Target::Next, &[]), Ok(LayerState::Ok));
/// ```
pub struct Chain<'u, U: ?Sized = ()> {
    id: u64,
    nodes: Vec<Node<'u, U>>,
    config: ChainConfig,
}

static NEXT_CHAIN_ID: AtomicU64 = AtomicU64::new(0);

impl<U: ?Sized> Default for Chain<'_, U> {
    fn default() -> Self { Self::with_config(ChainConfig::default()) }
}

impl<'u, U: ?Sized> Chain<'u, U> {
    /// Create an empty chain with the default configuration.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty chain with `config`.
    #[must_use]
    pub fn with_config(config: ChainConfig) -> Self {
        Self {
            id: NEXT_CHAIN_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            config,
        }
    }

    /// Start a [`ChainBuilder`] that links layers in the order they are
    /// added.
    #[must_use]
    pub fn builder() -> ChainBuilder<'u, U> { ChainBuilder::new() }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ChainConfig { &self.config }

    /// Number of layers owned by the chain.
    #[must_use]
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Returns `true` if no layers have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Handles of all layers in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ { self.nodes.iter().map(|n| n.this) }

    /// Add an unlinked layer without user data.
    #[track_caller]
    pub fn add_layer<L>(&mut self, layer: L) -> LayerId
    where
        L: Layer<U> + 'u,
    {
        self.insert(Box::new(layer), None, Location::caller().into())
    }

    /// Add an unlinked layer that carries a reference to `user_data`.
    #[track_caller]
    pub fn add_layer_with_data<L>(&mut self, layer: L, user_data: &'u U) -> LayerId
    where
        L: Layer<U> + 'u,
    {
        self.insert(Box::new(layer), Some(user_data), Location::caller().into())
    }

    pub(crate) fn reconfigure(&mut self, config: ChainConfig) {
        if !config.diagnostics() {
            for node in &self.nodes {
                node.diagnostics.set(Diagnostics::default());
            }
        }
        self.config = config;
    }

    pub(crate) fn insert(
        &mut self,
        layer: Box<dyn Layer<U> + 'u>,
        user_data: Option<&'u U>,
        site: CallSite,
    ) -> LayerId {
        let this = LayerId::new(self.id, self.nodes.len());
        let diagnostics = if self.config.diagnostics() {
            Diagnostics::created_at(site)
        } else {
            Diagnostics::default()
        };
        tracing::debug!(layer = %this, name = layer.name(), "layer added");
        self.nodes.push(Node {
            layer,
            user_data,
            this,
            next: None,
            prev: None,
            lifecycle: Cell::new(Lifecycle::Open),
            diagnostics: Cell::new(diagnostics),
        });
        this
    }

    /// Link `upstream -> downstream`, setting `upstream.next` and
    /// `downstream.prev` together.
    ///
    /// # Errors
    ///
    /// - [`ChainError::UnknownLayer`] if either handle is not from this chain.
    /// - [`ChainError::SelfLink`] if both handles are the same layer.
    /// - [`ChainError::AlreadyLinked`] if `upstream` already has a `next` or
    ///   `downstream` already has a `prev`. Existing links are never
    ///   overwritten.
    /// - [`ChainError::Cycle`] if the link would close a ring.
    #[track_caller]
    pub fn connect(&mut self, upstream: LayerId, downstream: LayerId) -> Result<(), ChainError> {
        let site = CallSite::from(Location::caller());
        let up = self.node(upstream).ok_or(ChainError::UnknownLayer(upstream))?;
        let down = self
            .node(downstream)
            .ok_or(ChainError::UnknownLayer(downstream))?;
        if upstream == downstream {
            return Err(ChainError::SelfLink(upstream));
        }
        if up.next.is_some() {
            return Err(ChainError::AlreadyLinked {
                upstream,
                downstream,
                occupied: upstream,
                side: Target::Next,
            });
        }
        if down.prev.is_some() {
            return Err(ChainError::AlreadyLinked {
                upstream,
                downstream,
                occupied: downstream,
                side: Target::Prev,
            });
        }
        // `upstream` has no `next`, so it is the tail of its run; walking
        // forward from `downstream` reaches it only if the runs are the same.
        if self.walk_next(downstream).any(|id| id == upstream) {
            return Err(ChainError::Cycle {
                upstream,
                downstream,
            });
        }
        self.link(upstream, downstream, site);
        Ok(())
    }

    pub(crate) fn link(&mut self, upstream: LayerId, downstream: LayerId, site: CallSite) {
        self.nodes[upstream.index()].next = Some(downstream);
        self.nodes[downstream.index()].prev = Some(upstream);
        if self.config.diagnostics() {
            for id in [upstream, downstream] {
                let cell = &self.nodes[id.index()].diagnostics;
                let mut diagnostics = cell.get();
                diagnostics.connect_site = Some(site);
                cell.set(diagnostics);
            }
        }
        tracing::debug!(upstream = %upstream, downstream = %downstream, "layers linked");
    }

    fn walk_next(&self, start: LayerId) -> impl Iterator<Item = LayerId> + '_ {
        std::iter::successors(Some(start), |id| self.nodes[id.index()].next).take(self.nodes.len())
    }

    /// First layer of the chain: the earliest-added layer with no `prev`.
    #[must_use]
    pub fn head(&self) -> Option<LayerId> {
        self.nodes.iter().find(|n| n.prev.is_none()).map(|n| n.this)
    }

    /// Last layer reachable from [`Chain::head`] through `next` links.
    #[must_use]
    pub fn tail(&self) -> Option<LayerId> { self.head().and_then(|h| self.walk_next(h).last()) }

    /// Position of `id` in the chain.
    #[must_use]
    pub fn connectivity(&self, id: LayerId) -> Option<Connectivity> {
        self.node(id).map(|n| Connectivity {
            this: n.this,
            next: n.next,
            prev: n.prev,
        })
    }

    /// Downstream neighbour of `id`.
    #[must_use]
    pub fn next(&self, id: LayerId) -> Option<LayerId> { self.node(id).and_then(|n| n.next) }

    /// Upstream neighbour of `id`.
    #[must_use]
    pub fn prev(&self, id: LayerId) -> Option<LayerId> { self.node(id).and_then(|n| n.prev) }

    /// Shutdown progress of `id`.
    #[must_use]
    pub fn lifecycle(&self, id: LayerId) -> Option<Lifecycle> {
        self.node(id).map(|n| n.lifecycle.get())
    }

    /// Recorded call sites of `id`.
    #[must_use]
    pub fn diagnostics(&self, id: LayerId) -> Option<Diagnostics> {
        self.node(id).map(|n| n.diagnostics.get())
    }

    /// User data attached to `id`, if any.
    #[must_use]
    pub fn user_data(&self, id: LayerId) -> Option<&'u U> { self.node(id).and_then(|n| n.user_data) }

    /// Log name of the layer behind `id`.
    #[must_use]
    pub fn name(&self, id: LayerId) -> Option<&str> { self.node(id).map(|n| n.layer.name()) }

    /// Returns `true` once every layer has reached [`Lifecycle::Closed`].
    ///
    /// An empty chain has nothing to close and reports `false`.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.nodes.is_empty() && self.nodes.iter().all(|n| n.lifecycle.get().is_closed())
    }

    fn node(&self, id: LayerId) -> Option<&Node<'u, U>> {
        if id.chain() != self.id {
            return None;
        }
        self.nodes.get(id.index())
    }

    fn set_lifecycle(&self, node: &Node<'u, U>, lifecycle: Lifecycle) {
        if node.lifecycle.replace(lifecycle) != lifecycle {
            tracing::debug!(layer = %node.this, state = %lifecycle, "layer lifecycle changed");
        }
    }
}

impl<U: ?Sized> std::fmt::Debug for Chain<'_, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for node in &self.nodes {
            list.entry(&format_args!(
                "{} {} ({}) prev={:?} next={:?}",
                node.this,
                node.layer.name(),
                node.lifecycle.get(),
                node.prev,
                node.next
            ));
        }
        list.finish()
    }
}
