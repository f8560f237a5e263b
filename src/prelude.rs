//! Convenience imports for implementing and driving layers.
//!
//! # Examples
//!
//! ```rust
//! use ondemand::prelude::*;
//!
//! fn pull(chain: &Chain<'_>, from: LayerId) -> Result<LayerState> {
//!     chain.on_demand(from, Target::Next, &[])
//! }
//! ```

pub use crate::{
    chain::{Chain, Context, Target},
    error::{DispatchError, Result},
    layer::{Layer, LayerId},
    state::{LayerState, Lifecycle},
};
