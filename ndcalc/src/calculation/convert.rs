use ndcalc_core::{Coordinate, Result, StorageType, Value, ValueType};

use super::Calculation;
use crate::handle::MatrixHandle;

/// The source viewed as another value type
///
/// Reads coerce each cell to the target type; writes are handed to the
/// source, which coerces them back to its own type. Converting to the
/// source's own type is a plain copy.
#[derive(Debug, Clone)]
pub struct Convert {
    sources: Vec<MatrixHandle>,
    target: ValueType,
}

impl Convert {
    pub fn new(source: &MatrixHandle, target: ValueType) -> Self {
        Self {
            sources: vec![source.clone()],
            target,
        }
    }

    /// Same-typed copy of the source
    pub fn copy(source: &MatrixHandle) -> Self {
        Self::new(source, source.value_type())
    }
}

impl Calculation for Convert {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn sources(&self) -> &[MatrixHandle] {
        &self.sources
    }

    fn value_type(&self) -> ValueType {
        self.target
    }

    fn storage_type(&self) -> StorageType {
        self.source().storage_type()
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        self.source().get_value(coordinate)?.coerce(self.target)
    }

    fn set_value(&self, coordinate: &Coordinate, value: Value) -> Result<()> {
        self.source().set_value(coordinate, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseMatrix;
    use crate::sparse::SparseMatrix;
    use crate::{calc, CalcMode};

    #[test]
    fn test_convert_to_strings() {
        let source =
            MatrixHandle::new(DenseMatrix::from_rows(vec![vec![1i64, 25]]).unwrap());
        let strings = calc(CalcMode::New, Convert::new(&source, ValueType::String)).unwrap();
        assert_eq!(strings.value_type(), ValueType::String);
        assert_eq!(strings.get_string(&Coordinate::from([0, 1])).unwrap(), "25");
    }

    #[test]
    fn test_copy_keeps_storage_and_is_independent() {
        let mut sparse = SparseMatrix::<f64>::new([3, 3]);
        sparse.set(&Coordinate::from([1, 1]), 4.0).unwrap();
        let source = MatrixHandle::new(sparse);

        let copy = calc(CalcMode::New, Convert::copy(&source)).unwrap();
        assert_eq!(copy.storage_type(), StorageType::Sparse);
        assert_eq!(copy.value_count(), 1);

        copy.set_f64(&Coordinate::from([1, 1]), 9.0).unwrap();
        assert_eq!(source.get_f64(&Coordinate::from([1, 1])).unwrap(), 4.0);
    }

    #[test]
    fn test_writes_coerce_back() {
        let source = MatrixHandle::new(DenseMatrix::<i32>::new([1, 1]));
        let view = Convert::new(&source, ValueType::String);
        view.set_value(&Coordinate::from([0, 0]), Value::from("12"))
            .unwrap();
        assert_eq!(source.get_value(&Coordinate::from([0, 0])).unwrap(), Value::Int(12));
    }
}
