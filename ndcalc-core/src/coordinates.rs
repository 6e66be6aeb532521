//! Coordinate system: fixed-arity index vectors and size vectors
//!
//! A [`Coordinate`] addresses one cell; the same type doubles as a size
//! vector giving the exclusive upper bound of each dimension. Iteration over
//! a size is row-major, i.e. the last dimension varies fastest.

use core::fmt;
use core::ops::{Index, IndexMut};

/// Fixed-length vector of non-negative indices, one per dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate(Vec<usize>);

impl Coordinate {
    /// Create a coordinate from its components
    pub fn new(components: Vec<usize>) -> Self {
        Self(components)
    }

    /// All-zero coordinate with `dimensions` components
    pub fn zeros(dimensions: usize) -> Self {
        Self(vec![0; dimensions])
    }

    /// All-one coordinate, the size of a fully reduced matrix
    pub fn ones(dimensions: usize) -> Self {
        Self(vec![1; dimensions])
    }

    /// Number of dimensions
    pub fn dimension_count(&self) -> usize {
        self.0.len()
    }

    /// Components as a slice
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Total number of cells addressed by this size vector
    ///
    /// Zero if any dimension is zero, one for a zero-dimensional size.
    pub fn product(&self) -> usize {
        self.0.iter().product()
    }

    /// Bounds check: every component is strictly below the matching size
    ///
    /// # Panics
    ///
    /// Panics if the dimension counts differ.
    pub fn is_smaller_than(&self, size: &Coordinate) -> bool {
        assert_eq!(
            self.dimension_count(),
            size.dimension_count(),
            "coordinate and size must have the same dimension count"
        );
        self.0.iter().zip(&size.0).all(|(c, s)| c < s)
    }

    /// Component-wise sum, used to re-base sub-matrix coordinates
    ///
    /// # Panics
    ///
    /// Panics if the dimension counts differ.
    pub fn plus(&self, other: &Coordinate) -> Coordinate {
        assert_eq!(
            self.dimension_count(),
            other.dimension_count(),
            "coordinates must have the same dimension count"
        );
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a + b).collect())
    }

    /// Component-wise difference, the inverse of [`Coordinate::plus`]
    ///
    /// # Panics
    ///
    /// Panics if the dimension counts differ or a component of `other`
    /// exceeds the matching component of `self`.
    pub fn minus(&self, other: &Coordinate) -> Coordinate {
        assert_eq!(
            self.dimension_count(),
            other.dimension_count(),
            "coordinates must have the same dimension count"
        );
        assert!(
            self.0.iter().zip(&other.0).all(|(a, b)| a >= b),
            "coordinate components cannot become negative"
        );
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a - b).collect())
    }

    /// Copy of `self` with the components of two axes swapped
    pub fn transpose(&self, axis_a: usize, axis_b: usize) -> Coordinate {
        let mut swapped = self.clone();
        swapped.0.swap(axis_a, axis_b);
        swapped
    }

    /// Copy of `self` with one component replaced
    pub fn with_axis(&self, axis: usize, value: usize) -> Coordinate {
        let mut replaced = self.clone();
        replaced.0[axis] = value;
        replaced
    }

    /// Row-major linear offset of this coordinate within `size`
    pub fn to_linear(&self, size: &Coordinate) -> usize {
        self.0
            .iter()
            .zip(&size.0)
            .fold(0, |offset, (c, s)| offset * s + c)
    }

    /// Inverse of [`Coordinate::to_linear`]
    pub fn from_linear(mut index: usize, size: &Coordinate) -> Coordinate {
        let mut components = vec![0; size.dimension_count()];
        for (axis, extent) in size.0.iter().enumerate().rev() {
            if *extent > 0 {
                components[axis] = index % extent;
                index /= extent;
            }
        }
        Self(components)
    }

    /// Lazy row-major iterator over every coordinate within this size
    pub fn iter_within(&self) -> CoordinateIter {
        CoordinateIter::new(self.clone())
    }
}

impl Index<usize> for Coordinate {
    type Output = usize;

    fn index(&self, axis: usize) -> &usize {
        &self.0[axis]
    }
}

impl IndexMut<usize> for Coordinate {
    fn index_mut(&mut self, axis: usize) -> &mut usize {
        &mut self.0[axis]
    }
}

impl From<Vec<usize>> for Coordinate {
    fn from(components: Vec<usize>) -> Self {
        Self(components)
    }
}

impl<const N: usize> From<[usize; N]> for Coordinate {
    fn from(components: [usize; N]) -> Self {
        Self(components.to_vec())
    }
}

impl From<&[usize]> for Coordinate {
    fn from(components: &[usize]) -> Self {
        Self(components.to_vec())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}

/// Total cell count of `size`
pub fn product(size: &Coordinate) -> usize {
    size.product()
}

/// Whether `coordinate` lies within `size`
pub fn is_smaller_than(coordinate: &Coordinate, size: &Coordinate) -> bool {
    coordinate.is_smaller_than(size)
}

/// Component-wise sum of two coordinates
pub fn plus(a: &Coordinate, b: &Coordinate) -> Coordinate {
    a.plus(b)
}

/// Component-wise difference of two coordinates
pub fn minus(a: &Coordinate, b: &Coordinate) -> Coordinate {
    a.minus(b)
}

/// Row-major iterator over every coordinate of a size
///
/// The iterator is finite and restartable: cloning a fresh iterator (or
/// calling [`CoordinateIter::restart`]) yields the same sequence again.
#[derive(Debug, Clone)]
pub struct CoordinateIter {
    size: Coordinate,
    next: Option<Coordinate>,
    remaining: usize,
}

impl CoordinateIter {
    /// Create an iterator over every coordinate of `size`
    pub fn new(size: Coordinate) -> Self {
        let remaining = size.product();
        let next = (remaining > 0).then(|| Coordinate::zeros(size.dimension_count()));
        Self {
            size,
            next,
            remaining,
        }
    }

    /// Rewind to the first coordinate
    pub fn restart(&mut self) {
        *self = Self::new(self.size.clone());
    }

    /// The size being iterated
    pub fn size(&self) -> &Coordinate {
        &self.size
    }
}

impl Iterator for CoordinateIter {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Coordinate> {
        let current = self.next.take()?;
        self.remaining -= 1;

        if self.remaining > 0 {
            let mut successor = current.clone();
            for axis in (0..successor.dimension_count()).rev() {
                successor[axis] += 1;
                if successor[axis] < self.size[axis] {
                    break;
                }
                successor[axis] = 0;
            }
            self.next = Some(successor);
        }

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for CoordinateIter {
    fn len(&self) -> usize {
        self.remaining
    }
}
