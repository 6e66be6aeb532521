//! Materialization of calculations
//!
//! The [`Engine`] owns a [`MatrixConfig`] and a [`BackendRegistry`] and
//! evaluates calculations in the three [`CalcMode`]s. NEW and ORIG
//! compute every result cell in row-major order, fanning out over rayon
//! when the config enables it and the result is large enough; ORIG
//! finishes computing before it takes the write lock on the source.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use ndcalc_core::{Coordinate, MatrixError, Result, StorageType, ValueType};

use super::{CalcMode, Calculation};
use crate::config::MatrixConfig;
use crate::handle::{Evaluated, MatrixHandle};
use crate::registry::BackendRegistry;

/// Evaluates calculations and allocates matrices
#[derive(Clone, Default)]
pub struct Engine {
    config: MatrixConfig,
    registry: Arc<BackendRegistry>,
}

impl Engine {
    pub fn new(config: MatrixConfig) -> Self {
        Self {
            config,
            registry: Arc::default(),
        }
    }

    pub fn with_registry(config: MatrixConfig, registry: BackendRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
        }
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Allocate an empty matrix using the configured storage type
    pub fn zeros(&self, value_type: ValueType, size: impl Into<Coordinate>) -> Result<MatrixHandle> {
        self.zeros_with(value_type, self.config.storage_type, size)
    }

    /// Allocate an empty matrix of an explicit kind
    pub fn zeros_with(
        &self,
        value_type: ValueType,
        storage_type: StorageType,
        size: impl Into<Coordinate>,
    ) -> Result<MatrixHandle> {
        let size = size.into();
        let matrix = self
            .registry
            .create(value_type, storage_type, &size, &self.config)?;
        Ok(MatrixHandle::from_box(matrix))
    }

    /// Materialize `calculation` in `mode`
    pub fn calc<C: Calculation + 'static>(
        &self,
        mode: CalcMode,
        calculation: C,
    ) -> Result<MatrixHandle> {
        self.calc_shared(mode, Arc::new(calculation))
    }

    pub fn calc_shared(
        &self,
        mode: CalcMode,
        calculation: Arc<dyn Calculation>,
    ) -> Result<MatrixHandle> {
        debug!(calculation = calculation.name(), %mode, "materializing");
        match mode {
            CalcMode::New => self.calc_new(calculation.as_ref()),
            CalcMode::Link => Ok(MatrixHandle::link(calculation)),
            CalcMode::Orig => self.calc_orig(calculation.as_ref()),
        }
    }

    /// Evaluate every cell into a newly allocated matrix
    pub fn calc_new(&self, calculation: &dyn Calculation) -> Result<MatrixHandle> {
        let size = calculation.size();
        let mut matrix = self.registry.create(
            calculation.value_type(),
            calculation.storage_type(),
            &size,
            &self.config,
        )?;
        self.evaluate(calculation, &size)?
            .write_matrix(&size, matrix.as_mut())?;
        matrix.set_annotation(calculation.annotation());
        Ok(MatrixHandle::from_box(matrix))
    }

    /// Evaluate every cell and write the results over the primary source
    ///
    /// Fails before touching the source if its size differs from the
    /// result size.
    pub fn calc_orig(&self, calculation: &dyn Calculation) -> Result<MatrixHandle> {
        let source = calculation.source().clone();
        let source_size = source.size();
        let size = calculation.size();
        if source_size != size {
            warn!(
                calculation = calculation.name(),
                %source_size,
                %size,
                "in-place calculation would change the matrix size"
            );
            return Err(MatrixError::orig_size_mismatch(source_size, size));
        }

        let values = self.evaluate(calculation, &size)?;
        source.overwrite(&size, values)?;
        Ok(source)
    }

    fn evaluate(&self, calculation: &dyn Calculation, size: &Coordinate) -> Result<Evaluated> {
        let cells = size.product();
        let numeric = matches!(
            calculation.value_type(),
            ValueType::Double | ValueType::Float
        );

        if self.config.should_parallelize(cells) {
            debug!(calculation = calculation.name(), cells, "evaluating in parallel");
            return if numeric {
                (0..cells)
                    .into_par_iter()
                    .map(|i| calculation.get_f64(&Coordinate::from_linear(i, size)))
                    .collect::<Result<Vec<_>>>()
                    .map(Evaluated::Doubles)
            } else {
                (0..cells)
                    .into_par_iter()
                    .map(|i| calculation.get_value(&Coordinate::from_linear(i, size)))
                    .collect::<Result<Vec<_>>>()
                    .map(Evaluated::Values)
            };
        }

        if numeric {
            size.iter_within()
                .map(|c| calculation.get_f64(&c))
                .collect::<Result<Vec<_>>>()
                .map(Evaluated::Doubles)
        } else {
            size.iter_within()
                .map(|c| calculation.get_value(&c))
                .collect::<Result<Vec<_>>>()
                .map(Evaluated::Values)
        }
    }
}

/// Materialize `calculation` with a default engine
pub fn calc<C: Calculation + 'static>(mode: CalcMode, calculation: C) -> Result<MatrixHandle> {
    Engine::default().calc(mode, calculation)
}
