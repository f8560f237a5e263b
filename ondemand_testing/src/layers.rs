//! Layers with observable, scriptable behaviour.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use ondemand::{Context, Layer, LayerState, Operation, Target};

use crate::journal::{Entry, Journal};

fn record<U: ?Sized>(
    journal: &Journal,
    label: &'static str,
    ctx: &Context<'_, '_, U>,
    operation: Operation,
    size: usize,
) {
    journal.push(Entry {
        label,
        layer: ctx.id(),
        operation,
        size,
        lifecycle: ctx.lifecycle(),
    });
}

/// Records every call and answers with a configurable state.
///
/// The answer can be changed between calls with [`RecordingLayer::answer`]
/// through a shared reference, which is all a test holds once the chain
/// owns the layer.
#[derive(Debug)]
pub struct RecordingLayer {
    label: &'static str,
    answer: Cell<LayerState>,
    journal: Journal,
}

impl RecordingLayer {
    /// Create a layer answering [`LayerState::Ok`].
    #[must_use]
    pub fn new(label: &'static str, journal: &Journal) -> Self {
        Self::answering(label, LayerState::Ok, journal)
    }

    /// Create a layer answering `state` to every call.
    #[must_use]
    pub fn answering(label: &'static str, state: LayerState, journal: &Journal) -> Self {
        Self {
            label,
            answer: Cell::new(state),
            journal: journal.clone(),
        }
    }

    /// Change the state returned by later calls.
    pub fn answer(&self, state: LayerState) { self.answer.set(state); }
}

impl<U: ?Sized> Layer<U> for RecordingLayer {
    fn on_demand(&self, ctx: &Context<'_, '_, U>, buffer: &[u8]) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::OnDemand, buffer.len());
        self.answer.get()
    }

    fn on_data_ready(&self, ctx: &Context<'_, '_, U>, buffer: &mut [u8]) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::OnDataReady, buffer.len());
        self.answer.get()
    }

    fn close(&self, ctx: &Context<'_, '_, U>) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::Close, 0);
        self.answer.get()
    }

    fn on_close(&self, ctx: &Context<'_, '_, U>) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::OnClose, 0);
        self.answer.get()
    }

    fn name(&self) -> &str { self.label }
}

/// Answers `on_demand` from a script, then falls back to a fixed state.
///
/// Models a sink that applies backpressure for a while: script
/// `[Full, Full]` and the third pull is accepted.
#[derive(Debug)]
pub struct ScriptedLayer {
    label: &'static str,
    script: RefCell<VecDeque<LayerState>>,
    fallback: LayerState,
    journal: Journal,
}

impl ScriptedLayer {
    /// Create a layer that replays `script` for `on_demand` and then
    /// answers `fallback`.
    #[must_use]
    pub fn new(
        label: &'static str,
        script: impl IntoIterator<Item = LayerState>,
        fallback: LayerState,
        journal: &Journal,
    ) -> Self {
        Self {
            label,
            script: RefCell::new(script.into_iter().collect()),
            fallback,
            journal: journal.clone(),
        }
    }
}

impl<U: ?Sized> Layer<U> for ScriptedLayer {
    fn on_demand(&self, ctx: &Context<'_, '_, U>, buffer: &[u8]) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::OnDemand, buffer.len());
        self.script.borrow_mut().pop_front().unwrap_or(self.fallback)
    }

    fn on_data_ready(&self, ctx: &Context<'_, '_, U>, buffer: &mut [u8]) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::OnDataReady, buffer.len());
        self.fallback
    }

    fn close(&self, ctx: &Context<'_, '_, U>) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::Close, 0);
        LayerState::Ok
    }

    fn on_close(&self, ctx: &Context<'_, '_, U>) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::OnClose, 0);
        LayerState::Ok
    }

    fn name(&self) -> &str { self.label }
}

/// A stage that follows the usual connection discipline.
///
/// - `on_demand` travels down until the last layer, which answers.
/// - `on_data_ready` travels up until the first layer, which keeps the
///   bytes.
/// - `close` travels down; the last layer acknowledges with `on_close`,
///   which then travels back up.
///
/// Routing failures are reported as [`LayerState::Error`].
#[derive(Debug)]
pub struct RelayLayer {
    label: &'static str,
    received: RefCell<Vec<u8>>,
    journal: Journal,
}

impl RelayLayer {
    /// Create a relay stage.
    #[must_use]
    pub fn new(label: &'static str, journal: &Journal) -> Self {
        Self {
            label,
            received: RefCell::default(),
            journal: journal.clone(),
        }
    }

    /// Bytes delivered to this layer as the top of the chain.
    #[must_use]
    pub fn received(&self) -> Vec<u8> { self.received.borrow().clone() }
}

impl<U: ?Sized> Layer<U> for RelayLayer {
    fn on_demand(&self, ctx: &Context<'_, '_, U>, buffer: &[u8]) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::OnDemand, buffer.len());
        if ctx.next().is_some() {
            ctx.on_demand(Target::Next, buffer).unwrap_or(LayerState::Error)
        } else {
            LayerState::Ok
        }
    }

    fn on_data_ready(&self, ctx: &Context<'_, '_, U>, buffer: &mut [u8]) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::OnDataReady, buffer.len());
        if ctx.prev().is_some() {
            ctx.on_data_ready(Target::Prev, buffer).unwrap_or(LayerState::Error)
        } else {
            self.received.borrow_mut().extend_from_slice(buffer);
            LayerState::Ok
        }
    }

    fn close(&self, ctx: &Context<'_, '_, U>) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::Close, 0);
        let routed = if ctx.next().is_some() {
            ctx.close(Target::Next)
        } else if ctx.prev().is_some() {
            ctx.on_close(Target::Prev)
        } else {
            ctx.on_close(Target::This)
        };
        routed.unwrap_or(LayerState::Error)
    }

    fn on_close(&self, ctx: &Context<'_, '_, U>) -> LayerState {
        record(&self.journal, self.label, ctx, Operation::OnClose, 0);
        if ctx.prev().is_some() {
            ctx.on_close(Target::Prev).unwrap_or(LayerState::Error)
        } else {
            LayerState::Ok
        }
    }

    fn name(&self) -> &str { self.label }
}
