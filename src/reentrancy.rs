//! Debug-only reentrancy guard.
//!
//! While the facade mutates, the order list and probe table are briefly
//! out of bijection. The only user code reachable in that window is
//! `K: Hash`/`K: Eq` during probing; if such code re-enters the same map,
//! debug builds panic here instead of corrupting the structure. Release
//! builds compile the whole check away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map tracker. Guard public entry points with
/// `let _g = self.reentrancy.enter();`.
#[derive(Debug, Default)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // Single-threaded by design; keep the tracker !Send + !Sync.
    _single_thread: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _single_thread: PhantomData,
        }
    }

    /// Mark the map busy until the returned guard drops. Panics in debug
    /// builds if the map is already busy.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrancy detected: map method called while another is in progress"
            );
        }
        ReentrancyGuard {
            #[cfg(debug_assertions)]
            owner: self,
            #[cfg(not(debug_assertions))]
            _owner: PhantomData,
        }
    }
}

pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}
