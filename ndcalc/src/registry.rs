//! Matrix construction by value type and storage type
//!
//! A [`BackendRegistry`] maps every `(ValueType, StorageType)` pair to a
//! [`MatrixBackend`] that allocates an empty matrix of that kind. The
//! default registry covers every element type in both storage
//! disciplines; callers may replace entries to plug in their own storage.

use std::marker::PhantomData;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use num_bigint::BigInt;
use tracing::debug;

use ndcalc_core::{Coordinate, Element, Matrix, MatrixError, Result, StorageType, Value, ValueType};

use crate::config::MatrixConfig;
use crate::dense::DenseMatrix;
use crate::sparse::SparseMatrix;

/// Allocates empty matrices of one kind
pub trait MatrixBackend: Send + Sync {
    fn create(&self, size: &Coordinate, config: &MatrixConfig) -> Result<Box<dyn Matrix>>;
}

struct DenseBackend<T>(PhantomData<fn() -> T>);

impl<T: Element> MatrixBackend for DenseBackend<T> {
    fn create(&self, size: &Coordinate, _config: &MatrixConfig) -> Result<Box<dyn Matrix>> {
        Ok(Box::new(DenseMatrix::<T>::new(size.clone())))
    }
}

struct SparseBackend<T>(PhantomData<fn() -> T>);

impl<T: Element> MatrixBackend for SparseBackend<T> {
    fn create(&self, size: &Coordinate, config: &MatrixConfig) -> Result<Box<dyn Matrix>> {
        Ok(match config.max_sparse_entries {
            Some(max_entries) => Box::new(SparseMatrix::<T>::bounded(
                size.clone(),
                max_entries,
                config.eviction_policy,
            )),
            None => Box::new(SparseMatrix::<T>::new(size.clone())),
        })
    }
}

/// Lookup table from matrix kind to allocator
#[derive(Clone)]
pub struct BackendRegistry {
    backends: HashMap<(ValueType, StorageType), Arc<dyn MatrixBackend>>,
}

impl BackendRegistry {
    /// A registry with no backends
    pub fn empty() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// A registry with dense and sparse backends for every value type
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_element::<bool>();
        registry.register_element::<i8>();
        registry.register_element::<i16>();
        registry.register_element::<i32>();
        registry.register_element::<i64>();
        registry.register_element::<f32>();
        registry.register_element::<f64>();
        registry.register_element::<BigInt>();
        registry.register_element::<BigDecimal>();
        registry.register_element::<char>();
        registry.register_element::<String>();
        registry.register_element::<DateTime<Utc>>();
        registry.register_element::<Vec<u8>>();
        registry.register_element::<Value>();
        registry
    }

    /// Install `backend` for one kind, returning the one it replaces
    pub fn register(
        &mut self,
        value_type: ValueType,
        storage_type: StorageType,
        backend: Arc<dyn MatrixBackend>,
    ) -> Option<Arc<dyn MatrixBackend>> {
        debug!(%value_type, %storage_type, "registering matrix backend");
        self.backends.insert((value_type, storage_type), backend)
    }

    /// Install the built-in dense and sparse backends for `T`
    pub fn register_element<T: Element>(&mut self) {
        self.register(
            T::value_type(),
            StorageType::Dense,
            Arc::new(DenseBackend::<T>(PhantomData)),
        );
        self.register(
            T::value_type(),
            StorageType::Sparse,
            Arc::new(SparseBackend::<T>(PhantomData)),
        );
    }

    pub fn contains(&self, value_type: ValueType, storage_type: StorageType) -> bool {
        self.backends.contains_key(&(value_type, storage_type))
    }

    /// Allocate an empty matrix of the given kind
    pub fn create(
        &self,
        value_type: ValueType,
        storage_type: StorageType,
        size: &Coordinate,
        config: &MatrixConfig,
    ) -> Result<Box<dyn Matrix>> {
        let backend = self
            .backends
            .get(&(value_type, storage_type))
            .ok_or(MatrixError::Backend {
                value_type,
                storage_type,
            })?;
        backend.create(size, config)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_kind() {
        let registry = BackendRegistry::with_defaults();
        for value_type in ValueType::ALL {
            for storage_type in [StorageType::Dense, StorageType::Sparse] {
                let matrix = registry
                    .create(value_type, storage_type, &Coordinate::from([2, 2]), &MatrixConfig::default())
                    .unwrap();
                assert_eq!(matrix.value_type(), value_type);
                assert_eq!(matrix.storage_type(), storage_type);
                assert_eq!(matrix.size(), Coordinate::from([2, 2]));
            }
        }
    }

    #[test]
    fn test_missing_backend() {
        let registry = BackendRegistry::empty();
        let result = registry.create(
            ValueType::Double,
            StorageType::Dense,
            &Coordinate::from([1]),
            &MatrixConfig::default(),
        );
        assert_eq!(
            result.err(),
            Some(MatrixError::Backend {
                value_type: ValueType::Double,
                storage_type: StorageType::Dense
            })
        );
    }

    #[test]
    fn test_sparse_backend_honors_bound() {
        let registry = BackendRegistry::with_defaults();
        let config = MatrixConfig::sparse().with_max_sparse_entries(1);
        let mut matrix = registry
            .create(ValueType::Double, StorageType::Sparse, &Coordinate::from([3]), &config)
            .unwrap();
        matrix.set_f64(&Coordinate::from([0]), 1.0).unwrap();
        matrix.set_f64(&Coordinate::from([1]), 2.0).unwrap();
        assert_eq!(matrix.value_count(), 1);
        assert_eq!(matrix.get_f64(&Coordinate::from([0])).unwrap(), 0.0);
    }

    #[test]
    fn test_register_replaces() {
        struct Fixed;
        impl MatrixBackend for Fixed {
            fn create(&self, _size: &Coordinate, _config: &MatrixConfig) -> Result<Box<dyn Matrix>> {
                Ok(Box::new(DenseMatrix::<f64>::new([1])))
            }
        }

        let mut registry = BackendRegistry::with_defaults();
        let previous = registry.register(ValueType::Double, StorageType::Dense, Arc::new(Fixed));
        assert!(previous.is_some());
        let matrix = registry
            .create(ValueType::Double, StorageType::Dense, &Coordinate::from([9, 9]), &MatrixConfig::default())
            .unwrap();
        assert_eq!(matrix.size(), Coordinate::from([1]));
    }
}
