//! Return codes and lifecycle states shared by every layer.

use std::fmt;

/// Outcome of a layer operation.
///
/// This is the only channel through which a layer reports operational
/// results to its caller. The chain passes it back untouched; retry and
/// backoff policy belongs to whoever drives the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayerState {
    /// Request accepted; more data may follow.
    #[default]
    Ok,
    /// The receiving stage has no capacity right now. Hold the data and
    /// retry later.
    Full,
    /// The underlying resource did not answer in time. Transient.
    Timeout,
    /// Unrecoverable. The caller should start the close protocol.
    Error,
}

impl LayerState {
    /// Returns `true` for [`LayerState::Ok`].
    #[must_use]
    pub const fn is_ok(self) -> bool { matches!(self, Self::Ok) }

    /// Returns `true` for the backpressure signals `Full` and `Timeout`.
    #[must_use]
    pub const fn is_backpressure(self) -> bool { matches!(self, Self::Full | Self::Timeout) }

    /// Returns `true` when the caller should proceed to the close protocol.
    #[must_use]
    pub const fn is_error(self) -> bool { matches!(self, Self::Error) }

    /// Stable lowercase name used in log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Full => "full",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Shutdown progress of a single layer inside a chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Constructed and accepting calls.
    #[default]
    Open,
    /// `close` has been delivered; the layer is draining.
    Closing,
    /// Shutdown acknowledged. Terminal.
    Closed,
}

impl Lifecycle {
    /// Returns `true` while no `close` has been delivered.
    #[must_use]
    pub const fn is_open(self) -> bool { matches!(self, Self::Open) }

    /// Returns `true` once the layer has reached the terminal state.
    #[must_use]
    pub const fn is_closed(self) -> bool { matches!(self, Self::Closed) }

    /// State after a `close` has been delivered.
    pub(crate) const fn after_close(self) -> Self {
        match self {
            Self::Open | Self::Closing => Self::Closing,
            Self::Closed => Self::Closed,
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        })
    }
}
