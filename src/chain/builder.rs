//! Fluent assembly of linear chains.

use std::panic::Location;

use super::Chain;
use crate::{
    config::ChainConfig,
    diagnostics::CallSite,
    layer::{Layer, LayerId},
};

/// Builds a [`Chain`] by linking each added layer below the previous one.
///
/// ```
/// use ondemand::{Chain, ChainConfig, Context, Layer, LayerState};
///
/// struct Idle;
///
/// impl Layer for Idle {
///     fn on_demand(&self, _: &Context<'_, '_>, _: &[u8]) -> LayerState { LayerState::Ok }
///     fn on_data_ready(&self, _: &Context<'_, '_>, _: &mut [u8]) -> LayerState { LayerState::Ok }
///     fn close(&self, _: &Context<'_, '_>) -> LayerState { LayerState::Ok }
///     fn on_close(&self, _: &Context<'_, '_>) -> LayerState { LayerState::Ok }
/// }
///
/// let chain: Chain<'_> = Chain::builder()
///     .config(ChainConfig::default().with_diagnostics(false))
///     .layer(Idle)
///     .layer(Idle)
///     .build();
/// let head = chain.head().unwrap();
/// assert_eq!(chain.next(head), chain.tail());
/// ```
pub struct ChainBuilder<'u, U: ?Sized = ()> {
    chain: Chain<'u, U>,
    last: Option<LayerId>,
}

impl<U: ?Sized> Default for ChainBuilder<'_, U> {
    fn default() -> Self { Self::new() }
}

impl<'u, U: ?Sized> ChainBuilder<'u, U> {
    /// Start with an empty chain and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chain: Chain::new(),
            last: None,
        }
    }

    /// Replace the configuration.
    ///
    /// Call this before adding layers. Turning diagnostics off also clears
    /// the records of layers already added; turning them on only covers
    /// layers added afterwards, since earlier sites were never captured.
    #[must_use]
    pub fn config(mut self, config: ChainConfig) -> Self {
        self.chain.reconfigure(config);
        self
    }

    /// Append a layer below the current tail.
    #[must_use]
    #[track_caller]
    pub fn layer<L>(self, layer: L) -> Self
    where
        L: Layer<U> + 'u,
    {
        self.push(Box::new(layer), None, Location::caller().into())
    }

    /// Append a layer carrying `user_data` below the current tail.
    #[must_use]
    #[track_caller]
    pub fn layer_with_data<L>(self, layer: L, user_data: &'u U) -> Self
    where
        L: Layer<U> + 'u,
    {
        self.push(Box::new(layer), Some(user_data), Location::caller().into())
    }

    fn push(
        mut self,
        layer: Box<dyn Layer<U> + 'u>,
        user_data: Option<&'u U>,
        site: CallSite,
    ) -> Self {
        let id = self.chain.insert(layer, user_data, site);
        // Fresh layers have no links, so neither side can be occupied and no
        // cycle can form.
        if let Some(upstream) = self.last {
            self.chain.link(upstream, id, site);
        }
        self.last = Some(id);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Chain<'u, U> { self.chain }
}
