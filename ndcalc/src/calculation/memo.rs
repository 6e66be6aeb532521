//! Compute-once cache for calculation sub-results

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use ndcalc_core::Result;

/// Lazily initialized value that can be reset
///
/// Concurrent first readers block until one of them has computed the
/// value; the rest observe it. `invalidate` discards it so the next read
/// recomputes.
pub(crate) struct Memo<T> {
    cell: RwLock<OnceCell<T>>,
}

impl<T: Clone> Memo<T> {
    pub(crate) fn new() -> Self {
        Self {
            cell: RwLock::new(OnceCell::new()),
        }
    }

    pub(crate) fn get_or_try_init(&self, init: impl FnOnce() -> Result<T>) -> Result<T> {
        self.cell.read().get_or_try_init(init).cloned()
    }

    pub(crate) fn invalidate(&self) {
        self.cell.write().take();
    }

    #[cfg(test)]
    pub(crate) fn is_initialized(&self) -> bool {
        self.cell.read().get().is_some()
    }
}
