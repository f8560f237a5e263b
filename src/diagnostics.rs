//! Call-site tracing for post-mortem debugging.
//!
//! Every layer carries a [`Diagnostics`] record. When enabled through
//! [`ChainConfig`](crate::ChainConfig) it remembers where the layer was
//! created, where it was linked, and where it was last called from. The
//! dispatch logic never reads it.

use std::{fmt, panic::Location};

/// Source location captured with `#[track_caller]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    column: u32,
}

impl CallSite {
    /// Source file of the call.
    #[must_use]
    pub const fn file(&self) -> &'static str { self.file }

    /// Line of the call.
    #[must_use]
    pub const fn line(&self) -> u32 { self.line }

    /// Column of the call.
    #[must_use]
    pub const fn column(&self) -> u32 { self.column }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Where a layer was created, linked and last invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Site that added the layer to its chain.
    pub init_site: Option<CallSite>,
    /// Site of the most recent link involving the layer.
    pub connect_site: Option<CallSite>,
    /// Site of the most recent call dispatched to the layer.
    pub last_call_site: Option<CallSite>,
}

impl Diagnostics {
    pub(crate) fn created_at(site: CallSite) -> Self {
        Self {
            init_site: Some(site),
            ..Self::default()
        }
    }
}
