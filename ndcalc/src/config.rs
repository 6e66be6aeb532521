//! Engine and storage configuration
//!
//! There is no process-wide default: a [`MatrixConfig`] is handed to the
//! [`Engine`](crate::Engine) explicitly and governs every matrix it
//! allocates and every materialization it runs.

use ndcalc_core::types::constants::{engine, DEFAULT_PARALLEL_THRESHOLD};
use ndcalc_core::StorageType;

use crate::sparse::EvictionPolicy;

/// Configuration for matrix allocation and materialization
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixConfig {
    /// Storage discipline for freshly created matrices
    pub storage_type: StorageType,
    /// Evaluate NEW/ORIG materializations on the rayon thread pool
    pub parallel: bool,
    /// Minimum result cell count before going parallel
    pub parallel_threshold: usize,
    /// Entry bound for sparse matrices, `None` for unbounded
    pub max_sparse_entries: Option<usize>,
    /// What a full sparse matrix does on insertion
    pub eviction_policy: EvictionPolicy,
}

impl MatrixConfig {
    /// Config allocating sparse matrices
    pub fn sparse() -> Self {
        Self::default().with_storage_type(StorageType::Sparse)
    }

    /// Set the storage type of created matrices
    pub fn with_storage_type(mut self, storage_type: StorageType) -> Self {
        self.storage_type = storage_type;
        self
    }

    /// Enable or disable parallel materialization
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the cell count at which materialization goes parallel
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Bound the number of entries a sparse matrix keeps
    pub fn with_max_sparse_entries(mut self, max_entries: usize) -> Self {
        self.max_sparse_entries = Some(max_entries);
        self
    }

    /// Set the sparse eviction policy
    pub fn with_eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    /// Whether a materialization of `cell_count` cells should fan out
    pub fn should_parallelize(&self, cell_count: usize) -> bool {
        self.parallel && cell_count >= self.parallel_threshold
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Dense,
            parallel: engine::PARALLEL,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            max_sparse_entries: None,
            eviction_policy: EvictionPolicy::default(),
        }
    }
}
