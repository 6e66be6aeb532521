//! Abstract interfaces shared by every matrix implementation
//!
//! Traits are pure interfaces: storage and calculations live in the
//! `ndcalc` crate.

pub mod backend;
pub mod element;
pub mod listener;
pub mod matrix;

pub use backend::StorageBackend;
pub use element::Element;
pub use listener::{ChangeEvent, MatrixListener};
pub use matrix::Matrix;
