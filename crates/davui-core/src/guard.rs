//! Single-slot lock keeping mutating actions from overlapping.
//!
//! The page is single-threaded, but actions still interleave across awaits:
//! a second upload could start while the first one is waiting on the
//! network. Every mutating action takes a [`Lease`] first and gives up when
//! none is available.

use std::cell::Cell;
use std::rc::Rc;

/// Shared acquire/release counter.
///
/// Clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct ReentrancyGuard {
    count: Rc<Cell<u32>>,
}

/// Proof that the guard is held.
///
/// Released exactly once: explicitly through [`Lease::release`] or when
/// dropped, whichever comes first.
#[derive(Debug)]
#[must_use = "dropping a lease releases the guard immediately"]
pub struct Lease {
    count: Rc<Cell<u32>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard if nothing else holds it.
    ///
    /// Returns `None` when another action is running; the caller must then
    /// do nothing.
    pub fn try_acquire(&self) -> Option<Lease> {
        let previous = self.count.get();
        self.count.set(previous + 1);
        if previous == 0 {
            Some(Lease {
                count: Rc::clone(&self.count),
            })
        } else {
            self.count.set(previous);
            None
        }
    }

    /// Whether some action currently holds the guard.
    pub fn is_held(&self) -> bool {
        self.count.get() > 0
    }

    /// Raw counter value.
    pub fn depth(&self) -> u32 {
        self.count.get()
    }
}

impl Lease {
    /// Give the guard back.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.count.set(self.count.get().saturating_sub(1));
    }
}
