//! Reserved dimension indices and engine defaults

/// Axis index of rows in the 2-D oriented API
pub const ROW: usize = 0;

/// Axis index of columns in the 2-D oriented API
pub const COLUMN: usize = 1;

/// Result cell count at which NEW/ORIG materialization may fan out to
/// worker threads
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 100_000;

/// Engine defaults
pub mod engine {
    /// Parallel materialization is opt-in
    pub const PARALLEL: bool = false;
}
