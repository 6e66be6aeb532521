//! Index-based sub-matrices
//!
//! A [`Selection`] keeps, per axis, either every index or an explicit list
//! of source indices in output order. Lists may repeat or reorder indices.
//! Reads and writes pass straight through to the mapped source cell.

use ndcalc_core::validation::{validate_in_bounds, validate_indices};
use ndcalc_core::{
    parse_selection, Annotation, AxisSelection, Coordinate, MatrixError, Result, StorageType,
    Value, ValueType,
};

use super::Calculation;
use crate::handle::MatrixHandle;

#[derive(Debug, Clone)]
pub struct Selection {
    sources: Vec<MatrixHandle>,
    axes: AxisSelection,
}

impl Selection {
    /// Select per-axis index lists; missing trailing axes keep every index
    pub fn new(source: &MatrixHandle, mut axes: AxisSelection) -> Result<Self> {
        let size = source.size();
        if axes.len() > size.dimension_count() {
            return Err(MatrixError::DimensionMismatch {
                expected: size.dimension_count(),
                actual: axes.len(),
            });
        }
        for (axis, indices) in axes.iter().enumerate() {
            if let Some(indices) = indices {
                validate_indices(indices, &size, axis)?;
            }
        }
        axes.resize(size.dimension_count(), None);
        Ok(Self {
            sources: vec![source.clone()],
            axes,
        })
    }

    /// Select rows and columns of a 2-D matrix
    pub fn rows_columns(
        source: &MatrixHandle,
        rows: Option<Vec<usize>>,
        columns: Option<Vec<usize>>,
    ) -> Result<Self> {
        Self::new(source, vec![rows, columns])
    }

    /// Select with a selection string such as `"2,0;*"`
    pub fn parse(source: &MatrixHandle, selection: &str) -> Result<Self> {
        Self::new(source, parse_selection(selection)?)
    }

    /// Keep everything except the listed indices, in source order
    pub fn deletion(source: &MatrixHandle, deleted: AxisSelection) -> Result<Self> {
        let size = source.size();
        if deleted.len() > size.dimension_count() {
            return Err(MatrixError::DimensionMismatch {
                expected: size.dimension_count(),
                actual: deleted.len(),
            });
        }

        let mut kept = Vec::with_capacity(deleted.len());
        for (axis, indices) in deleted.into_iter().enumerate() {
            kept.push(match indices {
                Some(indices) => {
                    validate_indices(&indices, &size, axis)?;
                    Some((0..size[axis]).filter(|i| !indices.contains(i)).collect())
                }
                None => None,
            });
        }
        Self::new(source, kept)
    }

    pub fn axes(&self) -> &AxisSelection {
        &self.axes
    }

    fn source_coordinate(&self, coordinate: &Coordinate) -> Result<Coordinate> {
        validate_in_bounds(coordinate, &self.size())?;
        let mut mapped = coordinate.clone();
        for (axis, indices) in self.axes.iter().enumerate() {
            if let Some(indices) = indices {
                mapped[axis] = indices[coordinate[axis]];
            }
        }
        Ok(mapped)
    }
}

impl Calculation for Selection {
    fn name(&self) -> &'static str {
        "selection"
    }

    fn sources(&self) -> &[MatrixHandle] {
        &self.sources
    }

    fn size(&self) -> Coordinate {
        let mut size = self.source().size();
        for (axis, indices) in self.axes.iter().enumerate() {
            if let Some(indices) = indices {
                size[axis] = indices.len();
            }
        }
        size
    }

    fn value_type(&self) -> ValueType {
        self.source().value_type()
    }

    fn storage_type(&self) -> StorageType {
        self.source().storage_type()
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        self.source().get_value(&self.source_coordinate(coordinate)?)
    }

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        self.source().get_f64(&self.source_coordinate(coordinate)?)
    }

    fn set_value(&self, coordinate: &Coordinate, value: Value) -> Result<()> {
        let target = self.source_coordinate(coordinate)?;
        self.source().set_value(&target, value)
    }

    fn annotation(&self) -> Option<Annotation> {
        let mut annotation = self.source().annotation()?;
        for (axis, indices) in self.axes.iter().enumerate() {
            if let Some(indices) = indices {
                annotation = annotation.select(axis, indices);
            }
        }
        Some(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseMatrix;
    use crate::{calc, CalcMode};

    fn source() -> MatrixHandle {
        MatrixHandle::new(
            DenseMatrix::from_rows(vec![
                vec![0.0, 1.0, 2.0],
                vec![10.0, 11.0, 12.0],
                vec![20.0, 21.0, 22.0],
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_select_rows_in_order() {
        let selection = Selection::rows_columns(&source(), Some(vec![2, 0]), None).unwrap();
        assert_eq!(selection.size(), Coordinate::from([2, 3]));
        let matrix = calc(CalcMode::New, selection).unwrap();
        assert_eq!(
            matrix.to_vec_f64().unwrap(),
            vec![20.0, 21.0, 22.0, 0.0, 1.0, 2.0]
        );
    }

    #[test]
    fn test_parse_and_repeat() {
        let selection = Selection::parse(&source(), "1,1;0:2").unwrap();
        let matrix = calc(CalcMode::New, selection).unwrap();
        assert_eq!(matrix.to_vec_f64().unwrap(), vec![10.0, 11.0, 10.0, 11.0]);
    }

    #[test]
    fn test_invalid_index_rejected() {
        assert!(matches!(
            Selection::rows_columns(&source(), Some(vec![3]), None),
            Err(MatrixError::IndexOutOfBounds { .. })
        ));
        assert!(Selection::new(&source(), vec![None, None, None]).is_err());
    }

    #[test]
    fn test_write_through() {
        let source = source();
        let selection = Selection::rows_columns(&source, Some(vec![2, 0]), None).unwrap();
        selection
            .set_value(&Coordinate::from([0, 1]), Value::Double(-1.0))
            .unwrap();
        assert_eq!(source.get_f64(&Coordinate::from([2, 1])).unwrap(), -1.0);
    }

    #[test]
    fn test_deletion_keeps_complement() {
        let deletion = Selection::deletion(&source(), vec![Some(vec![1]), Some(vec![0, 2])]).unwrap();
        assert_eq!(deletion.size(), Coordinate::from([2, 1]));
        let matrix = calc(CalcMode::New, deletion).unwrap();
        assert_eq!(matrix.to_vec_f64().unwrap(), vec![1.0, 21.0]);
    }

    #[test]
    fn test_labels_follow_selection() {
        let source = source();
        let mut annotation = Annotation::new();
        annotation.set_axis_label(0, 0, Some(Value::from("a")));
        annotation.set_axis_label(0, 2, Some(Value::from("c")));
        source.set_annotation(Some(annotation));

        let selection = Selection::rows_columns(&source, Some(vec![2, 0]), None).unwrap();
        let selected = selection.annotation().unwrap();
        assert_eq!(selected.axis_label(0, 0), Some(&Value::from("c")));
        assert_eq!(selected.axis_label(0, 1), Some(&Value::from("a")));
    }
}
