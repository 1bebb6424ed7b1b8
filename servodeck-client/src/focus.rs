use std::sync::atomic::{AtomicUsize, Ordering};

use crate::surface::{ElementId, Surface};

/// Answers whether the user currently holds focus on an element.
pub trait FocusProbe: Send + Sync {
    fn is_focused(&self, id: ElementId) -> bool;
}

const NO_FOCUS: usize = usize::MAX;

/// Focus tracker a frontend updates as the user moves between elements.
#[derive(Debug)]
pub struct FocusCell {
    active: AtomicUsize,
}

impl FocusCell {
    pub fn new() -> Self {
        Self {
            active: AtomicUsize::new(NO_FOCUS),
        }
    }

    pub fn focus(&self, id: ElementId) {
        self.active.store(id.index(), Ordering::SeqCst);
    }

    pub fn blur(&self) {
        self.active.store(NO_FOCUS, Ordering::SeqCst);
    }

    pub fn active(&self) -> Option<ElementId> {
        ElementId::ALL
            .get(self.active.load(Ordering::SeqCst))
            .copied()
    }
}

impl Default for FocusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusProbe for FocusCell {
    fn is_focused(&self, id: ElementId) -> bool {
        self.active() == Some(id)
    }
}

/// Write `value` into `id` unless the user is editing it.
///
/// A skipped write is dropped; the next poll or input event tries again.
/// Elements the user cannot edit are always written.
pub fn write_if_not_focused(
    surface: &mut Surface,
    focus: &dyn FocusProbe,
    id: ElementId,
    value: impl Into<String>,
) -> bool {
    if id.is_editable() && focus.is_focused(id) {
        tracing::trace!("Skipped write to focused element {}", id);
        return false;
    }

    surface.set_value(id, value);
    true
}
