#![doc(html_root_url = "https://docs.rs/ondemand/latest")]
//! Public API for the `ondemand` library.
//!
//! This crate chains independent processing stages ("layers") into a
//! bidirectional pipeline that models a connection's request/response
//! cycle. A layer can pull from a neighbour (`on_demand`), push data to a
//! neighbour (`on_data_ready`), and the chain can be torn down from either
//! end (`close` / `on_close`).
//!
//! Dispatch is synchronous and single-threaded: every call runs on the
//! caller's thread and returns before the caller proceeds. Retry and
//! backoff on [`LayerState::Full`] or [`LayerState::Timeout`] are left to
//! whoever drives the chain.

pub mod buffer;
pub mod chain;
pub mod config;
pub mod demo;
pub mod diagnostics;
pub mod error;
pub mod layer;
pub mod prelude;
pub mod state;

pub use buffer::DataBuffer;
pub use chain::{Chain, ChainBuilder, Context, Operation, Target};
pub use config::ChainConfig;
pub use diagnostics::{CallSite, Diagnostics};
pub use error::{BufferError, ChainError, DispatchError, Result};
pub use layer::{Connectivity, Layer, LayerId};
pub use state::{LayerState, Lifecycle};
