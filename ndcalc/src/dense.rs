//! Dense row-major storage
//!
//! A [`DenseMatrix`] owns one cell per coordinate in a flat `Vec`, laid out
//! with the last dimension fastest. Every coordinate is populated; cells
//! never written hold the element default.

use ndcalc_core::validation::validate_in_bounds;
use ndcalc_core::{
    Annotation, Coordinate, Element, Matrix, MatrixError, Result, StorageBackend, StorageType,
    Value, ValueType,
};

/// Dense N-dimensional matrix over element type `T`
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T: Element> {
    size: Coordinate,
    data: Vec<T>,
    annotation: Option<Annotation>,
}

pub type DenseDoubleMatrix = DenseMatrix<f64>;
pub type DenseLongMatrix = DenseMatrix<i64>;
pub type DenseObjectMatrix = DenseMatrix<Value>;

impl<T: Element> DenseMatrix<T> {
    /// Create a matrix of `size` filled with the element default
    pub fn new(size: impl Into<Coordinate>) -> Self {
        let size = size.into();
        let data = vec![T::default_value(); size.product()];
        Self {
            size,
            data,
            annotation: None,
        }
    }

    /// Wrap a row-major buffer
    pub fn from_vec(size: impl Into<Coordinate>, data: Vec<T>) -> Result<Self> {
        let size = size.into();
        if data.len() != size.product() {
            return Err(MatrixError::InvalidArgument(format!(
                "buffer of {} cells does not fill size {size}",
                data.len()
            )));
        }
        Ok(Self {
            size,
            data,
            annotation: None,
        })
    }

    /// Build a 2-D matrix from equally long rows
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let row_count = rows.len();
        let column_count = rows.first().map_or(0, Vec::len);
        if let Some(ragged) = rows.iter().position(|row| row.len() != column_count) {
            return Err(MatrixError::InvalidArgument(format!(
                "row {ragged} has {} columns, expected {column_count}",
                rows[ragged].len()
            )));
        }
        let data = rows.into_iter().flatten().collect();
        Self::from_vec([row_count, column_count], data)
    }

    /// Borrow a cell
    pub fn get(&self, coordinate: &Coordinate) -> Result<&T> {
        let offset = self.offset(coordinate)?;
        Ok(&self.data[offset])
    }

    /// Overwrite a cell
    pub fn set(&mut self, coordinate: &Coordinate, value: T) -> Result<()> {
        let offset = self.offset(coordinate)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Row-major cell buffer
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn offset(&self, coordinate: &Coordinate) -> Result<usize> {
        validate_in_bounds(coordinate, &self.size)?;
        Ok(coordinate.to_linear(&self.size))
    }
}

impl<T: Element> Matrix for DenseMatrix<T> {
    fn size(&self) -> Coordinate {
        self.size.clone()
    }

    fn value_type(&self) -> ValueType {
        T::value_type()
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Dense
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        Ok(self.get(coordinate)?.clone().into_value())
    }

    fn set_value(&mut self, coordinate: &Coordinate, value: Value) -> Result<()> {
        let value = T::from_value(&value)?;
        self.set(coordinate, value)
    }

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        Ok(self.get(coordinate)?.to_f64())
    }

    fn set_f64(&mut self, coordinate: &Coordinate, value: f64) -> Result<()> {
        let value = T::from_f64(value)?;
        self.set(coordinate, value)
    }

    fn resize(&mut self, size: &Coordinate) -> Result<()> {
        if size.dimension_count() != self.size.dimension_count() {
            return Err(MatrixError::DimensionMismatch {
                expected: self.size.dimension_count(),
                actual: size.dimension_count(),
            });
        }

        let mut data = vec![T::default_value(); size.product()];
        for coordinate in size.iter_within() {
            if coordinate.is_smaller_than(&self.size) {
                let old = coordinate.to_linear(&self.size);
                data[coordinate.to_linear(size)] = self.data[old].clone();
            }
        }
        self.data = data;
        self.size = size.clone();
        Ok(())
    }

    fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    fn set_annotation(&mut self, annotation: Option<Annotation>) {
        self.annotation = annotation;
    }

    fn as_f64_slice(&self) -> Option<&[f64]> {
        T::as_f64_slice(&self.data)
    }
}

/// Raw byte view of plain-old-data cell buffers
impl<T: Element + bytemuck::Pod> StorageBackend for DenseMatrix<T> {
    fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    fn byte_len(&self) -> usize {
        std::mem::size_of_val(self.data.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_default_filled() {
        let matrix = DenseMatrix::<f64>::new([2, 3]);
        assert_eq!(matrix.size(), Coordinate::from([2, 3]));
        assert!(matrix.as_slice().iter().all(|v| *v == 0.0));
        assert_eq!(matrix.value_count(), 6);
    }

    #[test]
    fn test_row_major_layout() {
        let matrix = DenseMatrix::from_rows(vec![vec![1i64, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(matrix.as_slice(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(*matrix.get(&Coordinate::from([1, 0])).unwrap(), 4);
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.column_count(), 3);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = DenseMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(MatrixError::InvalidArgument(_))));
    }

    #[test]
    fn test_set_coerces_values() {
        let mut matrix = DenseMatrix::<i32>::new([1, 2]);
        matrix.set_value(&Coordinate::from([0, 1]), Value::Double(7.9)).unwrap();
        matrix.set_f64(&Coordinate::from([0, 0]), -3.0).unwrap();
        assert_eq!(matrix.as_slice(), &[-3, 7]);
        assert_eq!(
            matrix.get_value(&Coordinate::from([0, 1])).unwrap(),
            Value::Int(7)
        );
    }

    #[test]
    fn test_out_of_bounds() {
        let matrix = DenseMatrix::<f64>::new([2, 2]);
        assert!(matches!(
            matrix.get_value(&Coordinate::from([2, 0])),
            Err(MatrixError::IndexOutOfBounds { .. })
        ));
        assert!(!matrix.contains(&Coordinate::from([0, 2])));
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut matrix = DenseMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        matrix.resize(&Coordinate::from([3, 1])).unwrap();
        assert_eq!(matrix.as_slice(), &[1.0, 3.0, 0.0]);
        assert!(matrix.resize(&Coordinate::from([3])).is_err());
    }

    #[test]
    fn test_f64_fast_path_only_for_doubles() {
        let doubles = DenseMatrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        assert_eq!(doubles.as_f64_slice(), Some(&[1.0, 2.0][..]));
        let longs = DenseMatrix::<i64>::new([1, 2]);
        assert!(longs.as_f64_slice().is_none());
    }

    #[test]
    fn test_storage_backend_bytes() {
        let matrix = DenseMatrix::from_vec([2], vec![1i32, 2]).unwrap();
        assert_eq!(matrix.byte_len(), 8);
        assert_eq!(matrix.as_bytes(), bytemuck::cast_slice::<i32, u8>(&[1, 2]));
    }

    #[test]
    fn test_object_matrix_holds_anything() {
        let mut matrix = DenseObjectMatrix::new([2]);
        matrix.set_value(&Coordinate::from([0]), Value::from("x")).unwrap();
        matrix.set_value(&Coordinate::from([1]), Value::Long(3)).unwrap();
        assert_eq!(matrix.get_value(&Coordinate::from([0])).unwrap(), Value::from("x"));
        assert_eq!(matrix.get_value(&Coordinate::from([1])).unwrap(), Value::Long(3));
    }
}
