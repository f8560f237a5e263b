//! Two-layer demonstration used by the `ondemand` binary.
//!
//! [`LoggingLayer`] accepts every call and emits one log line per call.
//! [`run`] links two of them and walks the full call matrix: every
//! operation is sent to `next`, `prev`, and to `self` on both layers, in
//! that order. Calls that the chain refuses (for example anything sent to a
//! layer that has already closed) are reported, not hidden.

use std::fmt;

use crate::{
    buffer::DataBuffer,
    chain::{Chain, Context, Operation, Target},
    config::ChainConfig,
    error::{BufferError, DispatchError},
    layer::{Layer, LayerId},
    state::LayerState,
};

/// Layer that logs each call and answers [`LayerState::Ok`].
#[derive(Clone, Copy, Debug)]
pub struct LoggingLayer {
    label: &'static str,
}

impl LoggingLayer {
    /// Create a layer that logs under `label`.
    #[must_use]
    pub const fn new(label: &'static str) -> Self { Self { label } }

    fn log<U: fmt::Debug + ?Sized>(&self, operation: Operation, ctx: &Context<'_, '_, U>, size: usize) {
        tracing::info!(
            layer = self.label,
            id = %ctx.id(),
            user_data = ?ctx.user_data(),
            size,
            "{}_{operation}",
            self.label
        );
    }
}

impl<U: fmt::Debug + ?Sized> Layer<U> for LoggingLayer {
    fn on_demand(&self, ctx: &Context<'_, '_, U>, buffer: &[u8]) -> LayerState {
        self.log(Operation::OnDemand, ctx, buffer.len());
        LayerState::Ok
    }

    fn on_data_ready(&self, ctx: &Context<'_, '_, U>, buffer: &mut [u8]) -> LayerState {
        self.log(Operation::OnDataReady, ctx, buffer.len());
        LayerState::Ok
    }

    fn close(&self, ctx: &Context<'_, '_, U>) -> LayerState {
        self.log(Operation::Close, ctx, 0);
        LayerState::Ok
    }

    fn on_close(&self, ctx: &Context<'_, '_, U>) -> LayerState {
        self.log(Operation::OnClose, ctx, 0);
        LayerState::Ok
    }

    fn name(&self) -> &str { self.label }
}

/// One call of the demonstration sequence and its outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Label of the layer the call was routed from.
    pub from: &'static str,
    /// Requested direction.
    pub target: Target,
    /// Operation sent.
    pub operation: Operation,
    /// What the chain returned.
    pub outcome: Result<LayerState, DispatchError>,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {}: ", self.from, self.target, self.operation)?;
        match &self.outcome {
            Ok(state) => write!(f, "{state}"),
            Err(err) => write!(f, "refused ({err})"),
        }
    }
}

/// Labels of the two demonstration layers, upstream first.
pub const LABELS: [&str; 2] = ["dummy_layer1", "dummy_layer2"];

/// Run the demonstration sequence against a fresh two-layer chain.
///
/// `payload` is copied into the buffer handed to the data calls; an empty
/// payload reproduces zero-length calls.
///
/// # Errors
///
/// Returns [`BufferError::Unavailable`] if the payload buffer cannot be
/// allocated.
pub fn run<U>(user_data: &U, payload: &[u8], config: ChainConfig) -> Result<Vec<Step>, BufferError>
where
    U: fmt::Debug + ?Sized,
{
    let mut buffer = payload_buffer(payload.len().max(1), payload)?;

    let chain: Chain<'_, U> = Chain::builder()
        .config(config)
        .layer_with_data(LoggingLayer::new(LABELS[0]), user_data)
        .layer_with_data(LoggingLayer::new(LABELS[1]), user_data)
        .build();
    let ids: Vec<LayerId> = chain.ids().collect();
    let (upper, lower) = (ids[0], ids[1]);

    let routes = [
        (upper, LABELS[0], Target::Next),
        (lower, LABELS[1], Target::Prev),
        (upper, LABELS[0], Target::This),
        (lower, LABELS[1], Target::This),
    ];
    let operations = [
        Operation::OnDemand,
        Operation::OnDataReady,
        Operation::Close,
        Operation::OnClose,
    ];

    let mut steps = Vec::with_capacity(routes.len() * operations.len());
    for operation in operations {
        for (from, label, target) in routes {
            let outcome = match operation {
                Operation::OnDemand => chain.on_demand(from, target, buffer.as_slice()),
                Operation::OnDataReady => chain.on_data_ready(from, target, buffer.as_mut_slice()),
                Operation::Close => chain.close(from, target),
                Operation::OnClose => chain.on_close(from, target),
            };
            steps.push(Step {
                from: label,
                target,
                operation,
                outcome,
            });
        }
    }
    buffer.destroy();
    Ok(steps)
}

fn payload_buffer(capacity: usize, payload: &[u8]) -> Result<DataBuffer, BufferError> {
    let Some(mut buffer) = DataBuffer::create(capacity)? else {
        tracing::warn!(capacity, "payload buffer allocation failed");
        return Err(BufferError::Unavailable { capacity });
    };
    buffer.write(payload);
    Ok(buffer)
}
