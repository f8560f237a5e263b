//! Shared call log written by the recording layers.

use std::{cell::RefCell, rc::Rc};

use ondemand::{LayerId, Lifecycle, Operation};

/// One recorded call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Label of the layer that received the call.
    pub label: &'static str,
    /// Handle of the layer that received the call.
    pub layer: LayerId,
    /// Operation received.
    pub operation: Operation,
    /// Bytes in the buffer, zero for `close` and `on_close`.
    pub size: usize,
    /// Lifecycle of the receiving layer while its handler ran.
    pub lifecycle: Lifecycle,
}

/// Cloneable handle to an append-only list of [`Entry`] values.
#[derive(Clone, Debug, Default)]
pub struct Journal(Rc<RefCell<Vec<Entry>>>);

impl Journal {
    /// Append an entry.
    pub fn push(&self, entry: Entry) { self.0.borrow_mut().push(entry); }

    /// Copy of every entry recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> { self.0.borrow().clone() }

    /// Receiving layer labels in call order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> { self.0.borrow().iter().map(|e| e.label).collect() }

    /// `(label, operation)` pairs in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<(&'static str, Operation)> {
        self.0.borrow().iter().map(|e| (e.label, e.operation)).collect()
    }

    /// Number of entries recorded.
    #[must_use]
    pub fn len(&self) -> usize { self.0.borrow().len() }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.borrow().is_empty() }

    /// Forget every entry.
    pub fn clear(&self) { self.0.borrow_mut().clear(); }
}
