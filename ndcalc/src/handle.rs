//! Shared matrix handles
//!
//! Calculations, LINK views and callers all refer to matrices through a
//! [`MatrixHandle`]: a cheaply clonable reference that either owns storage
//! behind a lock or wraps a live [`LinkedMatrix`] view. Every write through
//! a handle notifies the listeners registered on it after the lock is
//! released.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{trace, warn};

use ndcalc_core::{
    Annotation, ChangeEvent, Coordinate, CoordinateIter, Matrix, MatrixListener, Result,
    StorageType, Value, ValueType,
};

use crate::calculation::{Calculation, LinkedMatrix};

/// Listener list of one handle
#[derive(Default)]
pub(crate) struct Notifier {
    listeners: RwLock<Vec<Arc<dyn MatrixListener>>>,
    suppressed: AtomicUsize,
}

impl Notifier {
    fn add(&self, listener: Arc<dyn MatrixListener>) {
        let mut listeners = self.listeners.write();
        listeners.retain(|l| !l.is_expired());
        listeners.push(listener);
    }

    /// Listeners that can still observe changes
    fn len(&self) -> usize {
        self.listeners.read().iter().filter(|l| !l.is_expired()).count()
    }

    pub(crate) fn fire(&self, event: &ChangeEvent) {
        let listeners = self.listeners.read().clone();
        let mut expired = false;
        for listener in &listeners {
            if listener.is_expired() {
                expired = true;
            } else {
                listener.value_changed(event);
            }
        }
        if expired {
            let mut listeners = self.listeners.write();
            let before = listeners.len();
            listeners.retain(|l| !l.is_expired());
            trace!(removed = before - listeners.len(), "expired listeners removed");
        }
    }

    fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Acquire) > 0
    }

    fn suppress(&self) -> SuppressGuard<'_> {
        self.suppressed.fetch_add(1, Ordering::AcqRel);
        SuppressGuard(self)
    }
}

/// Holds forwarded notifications back while a view writes through itself
struct SuppressGuard<'a>(&'a Notifier);

impl Drop for SuppressGuard<'_> {
    fn drop(&mut self) {
        self.0.suppressed.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Registered on every source of a LINK view
///
/// Drops cached sub-results of the calculation and re-fires the change on
/// the view. Holds only weak references so a dropped view is not kept
/// alive by its sources; once both are gone the forwarder expires and the
/// source unregisters it.
struct ViewForwarder {
    view: Weak<Notifier>,
    calculation: Weak<dyn Calculation>,
}

impl MatrixListener for ViewForwarder {
    fn value_changed(&self, _event: &ChangeEvent) {
        if let Some(calculation) = self.calculation.upgrade() {
            calculation.invalidate();
        }
        if let Some(view) = self.view.upgrade() {
            if !view.is_suppressed() {
                view.fire(&ChangeEvent::bulk());
            }
        }
    }
    fn is_expired(&self) -> bool {
        self.view.strong_count() == 0 && self.calculation.strong_count() == 0
    }
}

#[derive(Clone)]
enum Storage {
    Owned(Arc<RwLock<Box<dyn Matrix>>>),
    Linked(Arc<RwLock<LinkedMatrix>>),
}

/// Shared reference to an owned matrix or a live view
#[derive(Clone)]
pub struct MatrixHandle {
    storage: Storage,
    notifier: Arc<Notifier>,
}

impl MatrixHandle {
    /// Take ownership of a matrix
    pub fn new(matrix: impl Matrix + 'static) -> Self {
        Self::from_box(Box::new(matrix))
    }

    pub fn from_box(matrix: Box<dyn Matrix>) -> Self {
        Self {
            storage: Storage::Owned(Arc::new(RwLock::new(matrix))),
            notifier: Arc::default(),
        }
    }

    /// Wrap a calculation as a live view and subscribe it to its sources
    pub(crate) fn link(calculation: Arc<dyn Calculation>) -> Self {
        let handle = Self {
            storage: Storage::Linked(Arc::new(RwLock::new(LinkedMatrix::new(
                calculation.clone(),
            )))),
            notifier: Arc::default(),
        };
        for source in calculation.sources() {
            source.add_listener(Arc::new(ViewForwarder {
                view: Arc::downgrade(&handle.notifier),
                calculation: Arc::downgrade(&calculation),
            }));
        }
        handle
    }

    /// Whether this handle is a LINK view rather than owned storage
    pub fn is_link(&self) -> bool {
        matches!(self.storage, Storage::Linked(_))
    }

    /// Whether two handles refer to the same matrix
    pub fn ptr_eq(&self, other: &MatrixHandle) -> bool {
        Arc::ptr_eq(&self.notifier, &other.notifier)
    }

    /// Run `f` against the matrix under a shared lock
    pub fn with_matrix<R>(&self, f: impl FnOnce(&dyn Matrix) -> R) -> R {
        match &self.storage {
            Storage::Owned(matrix) => f(&**matrix.read_recursive()),
            Storage::Linked(view) => f(&*view.read_recursive()),
        }
    }

    pub fn size(&self) -> Coordinate {
        self.with_matrix(|m| m.size())
    }

    pub fn value_type(&self) -> ValueType {
        self.with_matrix(|m| m.value_type())
    }

    pub fn storage_type(&self) -> StorageType {
        self.with_matrix(|m| m.storage_type())
    }

    pub fn dimension_count(&self) -> usize {
        self.with_matrix(|m| m.dimension_count())
    }

    pub fn row_count(&self) -> usize {
        self.with_matrix(|m| m.row_count())
    }

    pub fn column_count(&self) -> usize {
        self.with_matrix(|m| m.column_count())
    }

    pub fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        self.with_matrix(|m| m.get_value(coordinate))
    }

    pub fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        self.with_matrix(|m| m.get_f64(coordinate))
    }

    pub fn get_i64(&self, coordinate: &Coordinate) -> Result<i64> {
        self.with_matrix(|m| m.get_i64(coordinate))
    }

    pub fn get_bool(&self, coordinate: &Coordinate) -> Result<bool> {
        self.with_matrix(|m| m.get_bool(coordinate))
    }

    pub fn get_string(&self, coordinate: &Coordinate) -> Result<String> {
        self.with_matrix(|m| m.get_string(coordinate))
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.with_matrix(|m| m.contains(coordinate))
    }

    pub fn value_count(&self) -> u64 {
        self.with_matrix(|m| m.value_count())
    }

    pub fn all_coordinates(&self) -> CoordinateIter {
        CoordinateIter::new(self.size())
    }

    /// Populated coordinates, collected under the read lock
    pub fn available_coordinates(&self) -> Vec<Coordinate> {
        self.with_matrix(|m| m.available_coordinates().collect())
    }

    /// Every cell as a double in row-major order
    pub fn to_vec_f64(&self) -> Result<Vec<f64>> {
        self.with_matrix(|m| match m.as_f64_slice() {
            Some(data) => Ok(data.to_vec()),
            None => m.all_coordinates().map(|c| m.get_f64(&c)).collect(),
        })
    }

    pub fn annotation(&self) -> Option<Annotation> {
        self.with_matrix(|m| m.annotation().cloned())
    }

    pub fn set_annotation(&self, annotation: Option<Annotation>) {
        match &self.storage {
            Storage::Owned(matrix) => matrix.write().set_annotation(annotation),
            Storage::Linked(view) => view.write().set_annotation(annotation),
        }
    }

    /// Write one cell and notify listeners
    ///
    /// Writes into a view route to its source through the calculation; the
    /// source notifies its own listeners and the view fires once.
    pub fn set_value(&self, coordinate: &Coordinate, value: Value) -> Result<()> {
        match &self.storage {
            Storage::Owned(matrix) => matrix.write().set_value(coordinate, value)?,
            Storage::Linked(view) => {
                let _suppressed = self.notifier.suppress();
                view.read_recursive().set(coordinate, value)?;
            }
        }
        trace!(%coordinate, "cell written");
        self.notifier.fire(&ChangeEvent::cell(coordinate.clone()));
        Ok(())
    }

    pub fn set_f64(&self, coordinate: &Coordinate, value: f64) -> Result<()> {
        self.set_value(coordinate, Value::Double(value))
    }

    pub fn set_i64(&self, coordinate: &Coordinate, value: i64) -> Result<()> {
        self.set_value(coordinate, Value::Long(value))
    }

    pub fn set_bool(&self, coordinate: &Coordinate, value: bool) -> Result<()> {
        self.set_value(coordinate, Value::Boolean(value))
    }

    pub fn set_string(&self, coordinate: &Coordinate, value: &str) -> Result<()> {
        self.set_value(coordinate, Value::String(value.to_owned()))
    }

    /// Change the size of owned storage and notify listeners
    pub fn resize(&self, size: &Coordinate) -> Result<()> {
        match &self.storage {
            Storage::Owned(matrix) => matrix.write().resize(size)?,
            Storage::Linked(view) => view.write().resize(size)?,
        }
        self.notifier.fire(&ChangeEvent::bulk());
        Ok(())
    }

    /// Overwrite every cell of `size` in row-major order, notifying once
    ///
    /// Values are coerced to the matrix value type before the first cell is
    /// touched. If a write still fails, the cells already written get their
    /// previous values back and no event fires.
    pub(crate) fn overwrite(&self, size: &Coordinate, values: Evaluated) -> Result<()> {
        match &self.storage {
            Storage::Owned(matrix) => {
                let mut matrix = matrix.write();
                let values = values.coerce_to(matrix.value_type())?;
                replace_cells(size, values, |c, v| {
                    let previous = matrix.get_value(c)?;
                    matrix.set_value(c, v)?;
                    Ok(previous)
                })?;
            }
            Storage::Linked(view) => {
                let _suppressed = self.notifier.suppress();
                let view = view.read_recursive();
                let values = values.coerce_to(view.value_type())?;
                replace_cells(size, values, |c, v| {
                    let previous = view.get_value(c)?;
                    view.set(c, v)?;
                    Ok(previous)
                })?;
            }
        }
        self.notifier.fire(&ChangeEvent::bulk());
        Ok(())
    }

    /// Register a listener for changes to this matrix
    pub fn add_listener(&self, listener: Arc<dyn MatrixListener>) {
        self.notifier.add(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.notifier.len()
    }
}

impl fmt::Debug for MatrixHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_matrix(|m| {
            f.debug_struct("MatrixHandle")
                .field("size", &m.size())
                .field("value_type", &m.value_type())
                .field("storage_type", &m.storage_type())
                .field("link", &self.is_link())
                .finish()
        })
    }
}

/// Write `values` over `size` through `swap`, which stores one value and
/// returns the one it replaced
///
/// On failure the replaced values are written back in reverse order.
fn replace_cells(
    size: &Coordinate,
    values: Vec<Value>,
    mut swap: impl FnMut(&Coordinate, Value) -> Result<Value>,
) -> Result<()> {
    let mut replaced = Vec::with_capacity(values.len());
    for (coordinate, value) in size.iter_within().zip(values) {
        match swap(&coordinate, value) {
            Ok(previous) => replaced.push((coordinate, previous)),
            Err(err) => {
                for (coordinate, previous) in replaced.into_iter().rev() {
                    if let Err(restore) = swap(&coordinate, previous) {
                        warn!(%coordinate, error = %restore, "could not restore cell");
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Cell values computed by a materialization, in row-major order
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Evaluated {
    Doubles(Vec<f64>),
    Values(Vec<Value>),
}

impl Evaluated {
    fn into_values(self) -> Vec<Value> {
        match self {
            Evaluated::Doubles(values) => values.into_iter().map(Value::Double).collect(),
            Evaluated::Values(values) => values,
        }
    }

    /// Convert every value to `target` up front
    fn coerce_to(self, target: ValueType) -> Result<Vec<Value>> {
        match self {
            Evaluated::Doubles(values) if target == ValueType::Double => {
                Ok(values.into_iter().map(Value::Double).collect())
            }
            other => other
                .into_values()
                .into_iter()
                .map(|value| value.coerce(target))
                .collect(),
        }
    }

    pub(crate) fn write_matrix(self, size: &Coordinate, matrix: &mut dyn Matrix) -> Result<()> {
        match self {
            Evaluated::Doubles(values) => size
                .iter_within()
                .zip(values)
                .try_for_each(|(c, v)| matrix.set_f64(&c, v)),
            Evaluated::Values(values) => size
                .iter_within()
                .zip(values)
                .try_for_each(|(c, v)| matrix.set_value(&c, v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseMatrix;
    use crate::sparse::{EvictionPolicy, SparseMatrix};
    use ndcalc_core::MatrixError;
    use std::sync::atomic::AtomicU64;

    fn sample() -> MatrixHandle {
        MatrixHandle::new(DenseMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap())
    }

    #[test]
    fn test_reads_delegate() {
        let handle = sample();
        assert_eq!(handle.size(), Coordinate::from([2, 2]));
        assert_eq!(handle.value_type(), ValueType::Double);
        assert_eq!(handle.get_f64(&Coordinate::from([1, 0])).unwrap(), 3.0);
        assert_eq!(handle.to_vec_f64().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(!handle.is_link());
    }

    #[test]
    fn test_write_notifies_with_coordinate() {
        let handle = sample();
        let seen = Arc::new(RwLock::new(Vec::new()));
        let sink = seen.clone();
        handle.add_listener(Arc::new(move |event: &ChangeEvent| {
            sink.write().push(event.coordinate().cloned());
        }));

        handle.set_f64(&Coordinate::from([0, 1]), 9.0).unwrap();
        assert_eq!(*seen.read(), vec![Some(Coordinate::from([0, 1]))]);
    }

    #[test]
    fn test_failed_write_does_not_notify() {
        let handle = sample();
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        handle.add_listener(Arc::new(move |_: &ChangeEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(handle.set_f64(&Coordinate::from([5, 5]), 1.0).is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clones_share_storage() {
        let handle = sample();
        let clone = handle.clone();
        clone.set_f64(&Coordinate::from([0, 0]), -1.0).unwrap();
        assert_eq!(handle.get_f64(&Coordinate::from([0, 0])).unwrap(), -1.0);
        assert!(handle.ptr_eq(&clone));
        assert!(!handle.ptr_eq(&sample()));
    }

    #[test]
    fn test_overwrite_fires_one_bulk_event() {
        let handle = sample();
        let events = Arc::new(RwLock::new(Vec::new()));
        let sink = events.clone();
        handle.add_listener(Arc::new(move |event: &ChangeEvent| {
            sink.write().push(event.is_bulk());
        }));

        handle
            .overwrite(&handle.size(), Evaluated::Doubles(vec![0.0, 0.5, 1.0, 1.5]))
            .unwrap();
        assert_eq!(handle.to_vec_f64().unwrap(), vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(*events.read(), vec![true]);
    }

    #[test]
    fn test_dropped_views_are_unregistered() {
        let handle = sample();
        for _ in 0..1000 {
            let view = handle.transpose(crate::CalcMode::Link).unwrap();
            assert_eq!(handle.listener_count(), 1);
            drop(view);
        }
        assert_eq!(handle.listener_count(), 0);
        assert!(handle.notifier.listeners.read().len() <= 1);

        handle.set_f64(&Coordinate::from([0, 0]), 5.0).unwrap();
        assert!(handle.notifier.listeners.read().is_empty());
    }

    #[test]
    fn test_overwrite_coerces_before_writing() {
        let mut rows = DenseMatrix::<i64>::new([2, 1]);
        rows.set(&Coordinate::from([0, 0]), 7).unwrap();
        let handle = MatrixHandle::new(rows);
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        handle.add_listener(Arc::new(move |_: &ChangeEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let values = Evaluated::Values(vec![Value::Long(1), Value::from("not a number")]);
        let err = handle.overwrite(&handle.size(), values).unwrap_err();
        assert_eq!(err.category(), ndcalc_core::ErrorCategory::Coercion);
        assert_eq!(handle.get_i64(&Coordinate::from([0, 0])).unwrap(), 7);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_overwrite_restores_written_cells() {
        let mut sparse = SparseMatrix::<f64>::bounded([3, 1], 2, EvictionPolicy::Reject);
        sparse.set(&Coordinate::from([0, 0]), 1.0).unwrap();
        let handle = MatrixHandle::new(sparse);

        let values = Evaluated::Doubles(vec![2.0, 1.0, 1.0]);
        assert!(matches!(
            handle.overwrite(&handle.size(), values),
            Err(MatrixError::CapacityExceeded { max_entries: 2 })
        ));
        assert_eq!(handle.to_vec_f64().unwrap(), vec![1.0, 0.0, 0.0]);
        assert_eq!(handle.value_count(), 1);
    }
}
