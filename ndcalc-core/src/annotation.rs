//! Per-axis and whole-matrix labels
//!
//! An [`Annotation`] maps `(axis, position)` to a label and carries one
//! label for the matrix as a whole. Calculations never mutate the
//! annotation of their source: they derive a new one (collapsed, selected,
//! transposed) for their result.

use std::collections::BTreeMap;

use crate::Value;

/// Label metadata attached to a matrix
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    label: Option<Value>,
    axes: Vec<BTreeMap<usize, Value>>,
}

impl Annotation {
    /// Create an empty annotation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an annotation carrying only a whole-matrix label
    pub fn with_label(label: impl Into<Value>) -> Self {
        Self {
            label: Some(label.into()),
            axes: Vec::new(),
        }
    }

    /// Whole-matrix label
    pub fn label(&self) -> Option<&Value> {
        self.label.as_ref()
    }

    pub fn set_label(&mut self, label: Option<Value>) {
        self.label = label;
    }

    /// Label of `position` along `axis`
    pub fn axis_label(&self, axis: usize, position: usize) -> Option<&Value> {
        self.axes.get(axis).and_then(|labels| labels.get(&position))
    }

    /// Set or clear the label of `position` along `axis`
    pub fn set_axis_label(&mut self, axis: usize, position: usize, label: Option<Value>) {
        if self.axes.len() <= axis {
            self.axes.resize_with(axis + 1, BTreeMap::new);
        }
        match label {
            Some(label) => {
                self.axes[axis].insert(position, label);
            }
            None => {
                self.axes[axis].remove(&position);
            }
        }
    }

    /// All labels along `axis`, ordered by position
    pub fn axis_labels(&self, axis: usize) -> impl Iterator<Item = (usize, &Value)> + '_ {
        self.axes
            .get(axis)
            .into_iter()
            .flat_map(|labels| labels.iter().map(|(position, label)| (*position, label)))
    }

    /// First position along `axis` carrying `label`
    pub fn position_of(&self, axis: usize, label: &Value) -> Option<usize> {
        self.axis_labels(axis)
            .find(|(_, candidate)| *candidate == label)
            .map(|(position, _)| position)
    }

    /// Whether no label is set at all
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.axes.iter().all(BTreeMap::is_empty)
    }

    /// Copy without the labels of a collapsed axis
    pub fn collapse(&self, axis: usize) -> Annotation {
        let mut collapsed = self.clone();
        if let Some(labels) = collapsed.axes.get_mut(axis) {
            labels.clear();
        }
        collapsed
    }

    /// Copy keeping only the whole-matrix label
    pub fn collapse_all(&self) -> Annotation {
        Annotation {
            label: self.label.clone(),
            axes: Vec::new(),
        }
    }

    /// Copy whose `axis` labels follow a selection: new position `i` takes
    /// the label of old position `indices[i]`
    pub fn select(&self, axis: usize, indices: &[usize]) -> Annotation {
        let mut selected = self.clone();
        if let Some(labels) = self.axes.get(axis) {
            selected.axes[axis] = indices
                .iter()
                .enumerate()
                .filter_map(|(new, old)| labels.get(old).map(|label| (new, label.clone())))
                .collect();
        }
        selected
    }

    /// Copy with the labels of two axes swapped
    pub fn transpose(&self, axis_a: usize, axis_b: usize) -> Annotation {
        let mut transposed = self.clone();
        let needed = axis_a.max(axis_b) + 1;
        if transposed.axes.len() < needed {
            transposed.axes.resize_with(needed, BTreeMap::new);
        }
        transposed.axes.swap(axis_a, axis_b);
        transposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::constants::{COLUMN, ROW};

    fn labelled() -> Annotation {
        let mut annotation = Annotation::with_label("prices");
        annotation.set_axis_label(ROW, 0, Some(Value::from("mon")));
        annotation.set_axis_label(ROW, 1, Some(Value::from("tue")));
        annotation.set_axis_label(ROW, 2, Some(Value::from("wed")));
        annotation.set_axis_label(COLUMN, 0, Some(Value::from("open")));
        annotation
    }

    #[test]
    fn test_label_lookup() {
        let annotation = labelled();
        assert_eq!(annotation.label(), Some(&Value::from("prices")));
        assert_eq!(annotation.axis_label(ROW, 1), Some(&Value::from("tue")));
        assert_eq!(annotation.axis_label(COLUMN, 1), None);
        assert_eq!(annotation.position_of(ROW, &Value::from("wed")), Some(2));
        assert_eq!(annotation.axis_labels(ROW).count(), 3);
    }

    #[test]
    fn test_collapse_and_select() {
        let annotation = labelled();
        let collapsed = annotation.collapse(ROW);
        assert_eq!(collapsed.axis_labels(ROW).count(), 0);
        assert_eq!(collapsed.axis_label(COLUMN, 0), Some(&Value::from("open")));

        let selected = annotation.select(ROW, &[2, 0]);
        assert_eq!(selected.axis_label(ROW, 0), Some(&Value::from("wed")));
        assert_eq!(selected.axis_label(ROW, 1), Some(&Value::from("mon")));
        assert_eq!(selected.axis_label(ROW, 2), None);

        // the source is untouched
        assert_eq!(annotation.axis_label(ROW, 0), Some(&Value::from("mon")));
    }

    #[test]
    fn test_transpose_and_clear() {
        let mut annotation = labelled().transpose(ROW, COLUMN);
        assert_eq!(annotation.axis_label(ROW, 0), Some(&Value::from("open")));
        assert_eq!(annotation.axis_label(COLUMN, 2), Some(&Value::from("wed")));

        annotation.set_axis_label(ROW, 0, None);
        assert_eq!(annotation.axis_label(ROW, 0), None);
        assert!(!annotation.is_empty());
        assert!(Annotation::new().is_empty());
        assert!(labelled().collapse_all().axis_labels(ROW).next().is_none());
    }
}
