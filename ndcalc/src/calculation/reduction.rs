//! Per-line accumulation shared by the reductions
//!
//! A reduction along a [`Dimension`] maps every result coordinate to the
//! line of source cells it folds: every cell that differs from it only on
//! the reduced axis, or every cell for `All`. [`LineTable::build`] visits
//! the source once and accumulates all lines side by side, reading the raw
//! buffer of dense DOUBLE storage, only the populated entries of sparse
//! storage, or each cell otherwise. Unpopulated sparse cells hold zero and
//! are accounted for per line without being visited.

use std::sync::Arc;

use ndcalc_core::validation::validate_in_bounds;
use ndcalc_core::{Annotation, Coordinate, Dimension, Matrix, Result, StorageType};

use super::memo::Memo;
use crate::handle::MatrixHandle;

/// Size of a reduction result, tracking the current source size
pub(crate) fn reduced_size(source: &MatrixHandle, dimension: Dimension) -> Coordinate {
    let size = source.size();
    dimension.reduce(&size).unwrap_or(size)
}

/// Annotation of a reduction result
pub(crate) fn reduced_annotation(source: &MatrixHandle, dimension: Dimension) -> Option<Annotation> {
    let annotation = source.annotation()?;
    Some(match dimension.axis() {
        Some(axis) => annotation.collapse(axis),
        None => annotation.collapse_all(),
    })
}

/// Accumulated statistics of one reduction line
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Line {
    /// Sum of the counted cells
    pub sum: f64,
    /// Cells counted; non-finite cells are left out when NaN is ignored
    pub count: usize,
    /// Smallest non-NaN cell, NaN if there is none
    pub min: f64,
    /// Largest non-NaN cell, NaN if there is none
    pub max: f64,
    /// Squared deviations from the mean, only filled when requested
    pub squares: f64,
}

impl Line {
    const EMPTY: Line = Line {
        sum: 0.0,
        count: 0,
        min: f64::NAN,
        max: f64::NAN,
        squares: 0.0,
    };

    /// NaN for a line with nothing counted
    pub(crate) fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum / self.count as f64
    }

    /// Sample variance; a single-cell line divides by 1
    pub(crate) fn variance(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.squares / self.count.saturating_sub(1).max(1) as f64
    }

    fn include_extreme(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.min = if self.min.is_nan() { value } else { self.min.min(value) };
        self.max = if self.max.is_nan() { value } else { self.max.max(value) };
    }
}

/// Maps row-major source offsets onto result offsets
#[derive(Debug, Clone, Copy)]
struct Geometry {
    /// Cells per line
    extent: usize,
    /// Offset distance between neighbours on the reduced axis
    stride: usize,
    collapse_all: bool,
}

impl Geometry {
    fn new(size: &Coordinate, dimension: Dimension) -> Self {
        match dimension.axis() {
            Some(axis) => Self {
                extent: size[axis],
                stride: size.as_slice()[axis + 1..].iter().product(),
                collapse_all: false,
            },
            None => Self {
                extent: size.product(),
                stride: 1,
                collapse_all: true,
            },
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        if self.collapse_all {
            return 0;
        }
        let block = self.extent * self.stride;
        (offset / block) * self.stride + offset % self.stride
    }
}

/// Feed every stored cell to `visit` with the index of its line
///
/// Returns the number of unpopulated (zero) cells of every line.
fn fold(
    matrix: &dyn Matrix,
    geometry: &Geometry,
    line_count: usize,
    mut visit: impl FnMut(usize, f64),
) -> Result<Vec<usize>> {
    let size = matrix.size();

    if matrix.storage_type() == StorageType::Sparse {
        let mut visited = vec![0; line_count];
        for coordinate in matrix.available_coordinates() {
            let line = geometry.line_of(coordinate.to_linear(&size));
            visit(line, matrix.get_f64(&coordinate)?);
            visited[line] += 1;
        }
        return Ok(visited.into_iter().map(|v| geometry.extent - v).collect());
    }

    if let Some(data) = matrix.as_f64_slice() {
        for (offset, &value) in data.iter().enumerate() {
            visit(geometry.line_of(offset), value);
        }
    } else {
        for (offset, coordinate) in matrix.all_coordinates().enumerate() {
            visit(geometry.line_of(offset), matrix.get_f64(&coordinate)?);
        }
    }
    Ok(vec![0; line_count])
}

/// Statistics of every line of one reduction
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LineTable {
    source_size: Coordinate,
    size: Coordinate,
    lines: Vec<Line>,
}

impl LineTable {
    /// Accumulate every line in one pass, plus a second pass for the
    /// squared deviations when `deviations` is set
    pub(crate) fn build(
        matrix: &dyn Matrix,
        dimension: Dimension,
        ignore_nan: bool,
        deviations: bool,
    ) -> Result<Self> {
        let source_size = matrix.size();
        let size = dimension.reduce(&source_size)?;
        let geometry = Geometry::new(&source_size, dimension);
        let mut lines = vec![Line::EMPTY; size.product()];
        let line_count = lines.len();
        let counted = |v: f64| !ignore_nan || v.is_finite();

        let implicit = fold(matrix, &geometry, line_count, |i, v| {
            let line = &mut lines[i];
            if counted(v) {
                line.sum += v;
                line.count += 1;
            }
            line.include_extreme(v);
        })?;
        for (line, &zeros) in lines.iter_mut().zip(&implicit) {
            if zeros > 0 {
                line.count += zeros;
                line.include_extreme(0.0);
            }
        }

        if deviations {
            let means: Vec<f64> = lines.iter().map(Line::mean).collect();
            fold(matrix, &geometry, line_count, |i, v| {
                if counted(v) {
                    lines[i].squares += (v - means[i]).powi(2);
                }
            })?;
            for ((line, &zeros), mean) in lines.iter_mut().zip(&implicit).zip(&means) {
                line.squares += zeros as f64 * mean.powi(2);
            }
        }

        Ok(Self {
            source_size,
            size,
            lines,
        })
    }

    /// Statistics of result cell `coordinate`
    pub(crate) fn line(&self, coordinate: &Coordinate) -> Result<&Line> {
        validate_in_bounds(coordinate, &self.size)?;
        Ok(&self.lines[coordinate.to_linear(&self.size)])
    }
}

/// Line table of one reduction, built on first read
///
/// Kept until [`LineCache::invalidate`] or until the source changes size.
pub(crate) struct LineCache {
    dimension: Dimension,
    ignore_nan: bool,
    deviations: bool,
    table: Memo<Arc<LineTable>>,
}

impl LineCache {
    pub(crate) fn new(dimension: Dimension, ignore_nan: bool) -> Self {
        Self {
            dimension,
            ignore_nan,
            deviations: false,
            table: Memo::new(),
        }
    }

    /// Also accumulate squared deviations from the line mean
    pub(crate) fn with_deviations(mut self) -> Self {
        self.deviations = true;
        self
    }

    pub(crate) fn line(&self, source: &MatrixHandle, coordinate: &Coordinate) -> Result<Line> {
        Ok(*self.table(source)?.line(coordinate)?)
    }

    pub(crate) fn table(&self, source: &MatrixHandle) -> Result<Arc<LineTable>> {
        let build = || {
            source
                .with_matrix(|matrix| {
                    LineTable::build(matrix, self.dimension, self.ignore_nan, self.deviations)
                })
                .map(Arc::new)
        };
        let table = self.table.get_or_try_init(build)?;
        if table.source_size == source.size() {
            return Ok(table);
        }
        self.table.invalidate();
        self.table.get_or_try_init(build)
    }

    pub(crate) fn invalidate(&self) {
        self.table.invalidate();
    }
}
