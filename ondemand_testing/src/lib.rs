//! Test doubles for driving [`ondemand`] chains.
//!
//! The layers here record every call they receive into a shared
//! [`Journal`], so tests can assert on routing order and on the lifecycle a
//! layer was in when it was called.
//!
//! ```rust
//! use ondemand::{Chain, LayerState, Target};
//! use ondemand_testing::{Journal, RecordingLayer};
//!
//! let journal = Journal::default();
//! let chain: Chain<'_> = Chain::builder()
//!     .layer(RecordingLayer::new("upper", &journal))
//!     .layer(RecordingLayer::new("lower", &journal))
//!     .build();
//! let head = chain.head().unwrap();
//! assert_eq!(chain.on_demand(head, Target::Next, &[]), Ok(LayerState::Ok));
//! assert_eq!(journal.labels(), ["lower"]);
//! ```

pub mod journal;
pub mod layers;
pub mod logging;
mod macros;

pub use journal::{Entry, Journal};
pub use layers::{RecordingLayer, RelayLayer, ScriptedLayer};
pub use logging::{LoggerHandle, logger};
