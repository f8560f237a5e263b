//! Chain construction options.

/// Options applied when a [`Chain`](crate::Chain) is created.
///
/// ```
/// use ondemand::{Chain, ChainConfig};
///
/// let chain: Chain<'_> = Chain::with_config(ChainConfig::default().with_diagnostics(false));
/// assert!(!chain.config().diagnostics());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainConfig {
    diagnostics: bool,
}

impl ChainConfig {
    /// Record creation, link and call sites for every layer.
    #[must_use]
    pub const fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Returns `true` when call sites are recorded.
    #[must_use]
    pub const fn diagnostics(&self) -> bool { self.diagnostics }
}

impl Default for ChainConfig {
    fn default() -> Self { Self { diagnostics: true } }
}
