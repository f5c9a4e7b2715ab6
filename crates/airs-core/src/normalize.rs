//! Min-max normalisation fitted on a training set.
//!
//! Numeric attributes are scaled to [0, 1] using the training set's
//! observed range. Nominal, date and text attributes, the class slot and
//! missing values pass through untouched. Query vectors are scaled with
//! the same fitted ranges, so they may land outside [0, 1].

use crate::error::{AirsError, Result};
use crate::types::{AttributeKind, Dataset, Instance};
use serde::{Deserialize, Serialize};

/// Per-attribute min-max scaling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    /// `(min, max)` for numeric attributes; `None` for everything else.
    ranges: Vec<Option<(f64, f64)>>,
}

impl Normalizer {
    /// Fit ranges over every instance of the dataset.
    pub fn fit(dataset: &Dataset) -> Self {
        let schema = dataset.schema();
        let ranges = schema
            .attributes()
            .iter()
            .enumerate()
            .map(|(i, attr)| {
                if i == schema.class_index() || attr.kind != AttributeKind::Numeric {
                    return None;
                }
                let (min, max) = dataset
                    .instances()
                    .iter()
                    .map(|inst| inst.values[i])
                    .filter(|v| !v.is_nan())
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                if min.is_finite() && max.is_finite() {
                    Some((min, max))
                } else {
                    // Attribute never observed.
                    Some((0.0, 0.0))
                }
            })
            .collect();
        Self { ranges }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Scale a vector in place.
    pub fn apply_in_place(&self, values: &mut [f64]) -> Result<()> {
        if values.len() != self.ranges.len() {
            return Err(AirsError::DimensionMismatch {
                expected: self.ranges.len(),
                got: values.len(),
            });
        }
        for (v, range) in values.iter_mut().zip(&self.ranges) {
            if let Some((min, max)) = range {
                if v.is_nan() {
                    continue;
                }
                let width = max - min;
                // Constant attributes collapse to 0.
                *v = if width > 0.0 { (*v - min) / width } else { 0.0 };
            }
        }
        Ok(())
    }

    /// Scale a copy of an instance.
    pub fn apply(&self, instance: &Instance) -> Result<Instance> {
        let mut values = instance.values.clone();
        self.apply_in_place(&mut values)?;
        Ok(Instance::new(values))
    }

    /// Scale every instance of a dataset.
    pub fn transform(&self, dataset: &Dataset) -> Result<Dataset> {
        let instances = dataset
            .instances()
            .iter()
            .map(|inst| self.apply(inst))
            .collect::<Result<Vec<_>>>()?;
        Ok(dataset.with_instances(instances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attribute, Schema};

    fn dataset() -> Dataset {
        let schema = Schema::new(
            vec![
                Attribute::numeric("height"),
                Attribute::nominal("colour", ["red", "green", "blue"]),
                Attribute::numeric("flat"),
                Attribute::nominal("class", ["a", "b"]),
            ],
            3,
        )
        .unwrap();
        Dataset::new(
            schema,
            vec![
                Instance::new(vec![10.0, 2.0, 5.0, 0.0]),
                Instance::new(vec![20.0, 0.0, 5.0, 1.0]),
                Instance::new(vec![f64::NAN, 1.0, 5.0, 1.0]),
                Instance::new(vec![15.0, 1.0, 5.0, 0.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn numeric_scaled_others_untouched() {
        let data = dataset();
        let norm = Normalizer::fit(&data);
        let scaled = norm.transform(&data).unwrap();
        let rows: Vec<&Vec<f64>> = scaled.instances().iter().map(|i| &i.values).collect();

        assert_eq!(rows[0][0], 0.0);
        assert_eq!(rows[1][0], 1.0);
        assert_eq!(rows[3][0], 0.5);
        assert!(rows[2][0].is_nan(), "missing values stay missing");
        assert_eq!(rows[0][1], 2.0, "nominal codes are not scaled");
        assert_eq!(rows[0][2], 0.0, "constant attribute collapses to 0");
        assert_eq!(rows[1][3], 1.0, "class slot untouched");
    }

    #[test]
    fn query_outside_training_range_is_not_clamped() {
        let norm = Normalizer::fit(&dataset());
        let q = norm.apply(&Instance::new(vec![30.0, 0.0, 5.0, 0.0])).unwrap();
        assert_eq!(q.values[0], 2.0);
    }

    #[test]
    fn wrong_length_rejected() {
        let norm = Normalizer::fit(&dataset());
        assert!(matches!(
            norm.apply(&Instance::new(vec![1.0])),
            Err(AirsError::DimensionMismatch { expected: 4, got: 1 })
        ));
    }
}
