//! Cell-by-cell arithmetic
//!
//! [`Entrywise`] applies a unary function to every cell; [`Binary`]
//! combines a matrix with a scalar or with a second matrix of the same
//! size. Both produce DOUBLE results and ignore writes.

use std::fmt;

use ndcalc_core::error::OPERAND_SIZE_HINT;
use ndcalc_core::validation::validate_same_size;
use ndcalc_core::{Annotation, Coordinate, Result, StorageType, Value, ValueType};

use super::Calculation;
use crate::handle::MatrixHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    Abs,
    Negate,
    Sqrt,
    Exp,
    Log,
    Log10,
    Square,
    Round,
    Ceil,
    Floor,
    Sign,
}

impl UnaryOp {
    pub fn apply(self, v: f64) -> f64 {
        match self {
            UnaryOp::Abs => v.abs(),
            UnaryOp::Negate => -v,
            UnaryOp::Sqrt => v.sqrt(),
            UnaryOp::Exp => v.exp(),
            UnaryOp::Log => v.ln(),
            UnaryOp::Log10 => v.log10(),
            UnaryOp::Square => v * v,
            UnaryOp::Round => v.round(),
            UnaryOp::Ceil => v.ceil(),
            UnaryOp::Floor => v.floor(),
            UnaryOp::Sign => {
                if v.is_nan() || v == 0.0 {
                    v
                } else {
                    v.signum()
                }
            }
        }
    }

    /// Whether `apply(0.0) == 0.0`, so sparse inputs stay sparse
    pub fn preserves_zero(self) -> bool {
        !matches!(self, UnaryOp::Exp | UnaryOp::Log | UnaryOp::Log10)
    }
}

/// A unary function applied to every cell
#[derive(Debug, Clone)]
pub struct Entrywise {
    sources: Vec<MatrixHandle>,
    op: UnaryOp,
}

impl Entrywise {
    pub fn new(source: &MatrixHandle, op: UnaryOp) -> Self {
        Self {
            sources: vec![source.clone()],
            op,
        }
    }
}

impl Calculation for Entrywise {
    fn name(&self) -> &'static str {
        "entrywise"
    }

    fn sources(&self) -> &[MatrixHandle] {
        &self.sources
    }

    fn value_type(&self) -> ValueType {
        ValueType::Double
    }

    fn storage_type(&self) -> StorageType {
        if self.op.preserves_zero() {
            self.source().storage_type()
        } else {
            StorageType::Dense
        }
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        self.get_f64(coordinate).map(Value::Double)
    }

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        Ok(self.op.apply(self.source().get_f64(coordinate)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
}

impl BinaryOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Plus => a + b,
            BinaryOp::Minus => a - b,
            BinaryOp::Times => a * b,
            BinaryOp::Divide => a / b,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy)]
enum Operand {
    Scalar(f64),
    Matrix,
}

/// Cell-by-cell combination with a scalar or a same-size matrix
#[derive(Debug, Clone)]
pub struct Binary {
    sources: Vec<MatrixHandle>,
    op: BinaryOp,
    operand: Operand,
}

impl Binary {
    pub fn scalar(source: &MatrixHandle, op: BinaryOp, scalar: f64) -> Self {
        Self {
            sources: vec![source.clone()],
            op,
            operand: Operand::Scalar(scalar),
        }
    }

    /// Fails with `SizeMismatch` unless both matrices have the same size
    pub fn matrices(left: &MatrixHandle, op: BinaryOp, right: &MatrixHandle) -> Result<Self> {
        validate_same_size(&left.size(), &right.size(), OPERAND_SIZE_HINT)?;
        Ok(Self {
            sources: vec![left.clone(), right.clone()],
            op,
            operand: Operand::Matrix,
        })
    }
}

impl Calculation for Binary {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn sources(&self) -> &[MatrixHandle] {
        &self.sources
    }

    fn value_type(&self) -> ValueType {
        ValueType::Double
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        self.get_f64(coordinate).map(Value::Double)
    }

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        let left = self.sources[0].get_f64(coordinate)?;
        let right = match self.operand {
            Operand::Scalar(scalar) => scalar,
            Operand::Matrix => self.sources[1].get_f64(coordinate)?,
        };
        Ok(self.op.apply(left, right))
    }

    fn annotation(&self) -> Option<Annotation> {
        self.sources[0].annotation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseMatrix;
    use crate::sparse::SparseMatrix;
    use crate::{calc, CalcMode};
    use ndcalc_core::MatrixError;

    fn source() -> MatrixHandle {
        MatrixHandle::new(DenseMatrix::from_rows(vec![vec![-4.0, 0.0], vec![2.5, 9.0]]).unwrap())
    }

    #[test]
    fn test_unary_ops() {
        assert_eq!(UnaryOp::Abs.apply(-2.0), 2.0);
        assert_eq!(UnaryOp::Sign.apply(-0.5), -1.0);
        assert_eq!(UnaryOp::Sign.apply(0.0), 0.0);
        assert_eq!(UnaryOp::Round.apply(2.5), 3.0);
        assert!(UnaryOp::Log.apply(-1.0).is_nan());
        assert_eq!(UnaryOp::Log.apply(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_entrywise_matrix() {
        let result = calc(CalcMode::New, Entrywise::new(&source(), UnaryOp::Abs)).unwrap();
        assert_eq!(result.to_vec_f64().unwrap(), vec![4.0, 0.0, 2.5, 9.0]);
    }

    #[test]
    fn test_sparse_stays_sparse_when_zero_preserved() {
        let source = MatrixHandle::new(SparseMatrix::<f64>::new([5, 5]));
        assert_eq!(
            Entrywise::new(&source, UnaryOp::Square).storage_type(),
            StorageType::Sparse
        );
        assert_eq!(
            Entrywise::new(&source, UnaryOp::Exp).storage_type(),
            StorageType::Dense
        );
    }

    #[test]
    fn test_scalar_and_matrix_operands() {
        let a = source();
        let plus = calc(CalcMode::New, Binary::scalar(&a, BinaryOp::Plus, 1.0)).unwrap();
        assert_eq!(plus.to_vec_f64().unwrap(), vec![-3.0, 1.0, 3.5, 10.0]);

        let times = calc(CalcMode::New, Binary::matrices(&a, BinaryOp::Times, &a).unwrap()).unwrap();
        assert_eq!(times.to_vec_f64().unwrap(), vec![16.0, 0.0, 6.25, 81.0]);
    }

    #[test]
    fn test_operand_size_mismatch() {
        let other = MatrixHandle::new(DenseMatrix::<f64>::new([3, 2]));
        match Binary::matrices(&source(), BinaryOp::Minus, &other) {
            Err(MatrixError::SizeMismatch { hint, .. }) => assert_eq!(hint, OPERAND_SIZE_HINT),
            other => panic!("expected size mismatch, got {other:?}"),
        }
    }
}
