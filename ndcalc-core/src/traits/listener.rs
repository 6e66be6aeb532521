//! Change notification hook
//!
//! Observers (renderers, caches, dependent views) register a
//! [`MatrixListener`] and are told after every mutation. Notification is
//! fire-and-forget: listeners return nothing and must not panic.

use crate::Coordinate;

/// Describes one mutation of a matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    coordinate: Option<Coordinate>,
}

impl ChangeEvent {
    /// A single cell was written
    pub fn cell(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
        }
    }

    /// Many cells changed at once (in-place calculation, resize)
    pub fn bulk() -> Self {
        Self { coordinate: None }
    }

    /// The written cell, `None` for bulk changes
    pub fn coordinate(&self) -> Option<&Coordinate> {
        self.coordinate.as_ref()
    }

    pub fn is_bulk(&self) -> bool {
        self.coordinate.is_none()
    }
}

/// Receives change notifications
pub trait MatrixListener: Send + Sync {
    fn value_changed(&self, event: &ChangeEvent);

    /// Whether this listener can no longer observe anything
    ///
    /// Expired listeners are unregistered by the matrix they listen to.
    fn is_expired(&self) -> bool {
        false
    }
}

impl<F> MatrixListener for F
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn value_changed(&self, event: &ChangeEvent) {
        self(event)
    }
}
