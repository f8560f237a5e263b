//! Assertion macros for dispatch results.

/// Unwrap a dispatch result, panicking with the call site on a routing
/// failure.
///
/// ```rust
/// use ondemand::{Chain, LayerState, Target};
/// use ondemand_testing::{Journal, RecordingLayer, dispatch_expect};
///
/// let journal = Journal::default();
/// let chain: Chain<'_> = Chain::builder().layer(RecordingLayer::new("only", &journal)).build();
/// let head = chain.head().unwrap();
/// assert_eq!(dispatch_expect!(chain.on_demand(head, Target::This, &[])), LayerState::Ok);
/// ```
#[macro_export]
macro_rules! dispatch_expect {
    ($call:expr) => {{
        match $call {
            Ok(state) => state,
            Err(err) => panic!("dispatch failed at {}:{}: {err}", file!(), line!()),
        }
    }};
    ($call:expr, $msg:expr) => {{
        match $call {
            Ok(state) => state,
            Err(err) => panic!("{} at {}:{}: {err}", $msg, file!(), line!()),
        }
    }};
}
