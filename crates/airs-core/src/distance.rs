//! Distance and affinity between attribute vectors.
//!
//! Distance is Euclidean over the comparable attributes: numeric and
//! nominal attributes contribute the squared difference of their values
//! (nominal codes included, so categories are compared numerically), the
//! class slot and date/text attributes contribute nothing, and a missing
//! value on either side skips the attribute.
//!
//! Affinity divides the distance by the largest distance the training
//! set allows: the square root of the summed squared attribute ranges,
//! with every non-numeric attribute counted as a unit range. Affinity is
//! not clamped, so far-out query vectors can exceed 1.
//!
//! Nominal codes span `categories - 1` but count as a unit range, so two
//! categories more than one code apart can push affinity above 1 and
//! stimulation below 0. Data dominated by nominal attributes with many
//! categories can then leave a best match with no clones and an ARB pool
//! of a single cell, which fails normalisation with
//! [`AirsError::DegenerateStimulation`].

use crate::error::{AirsError, Result};
use crate::types::{AttributeKind, Dataset};
use serde::{Deserialize, Serialize};

/// Observed training range of a numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeRange {
    pub min: f64,
    pub max: f64,
}

impl AttributeRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// How the distance function treats one attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttributeRole {
    /// The class slot. Never compared.
    Class,
    /// Numeric attribute with its training range.
    Numeric(AttributeRange),
    /// Nominal attribute with its number of categories.
    Nominal { categories: usize },
    /// Date or text. Never compared.
    Ignored,
}

impl AttributeRole {
    /// Range used for the maximum-distance constant.
    fn span(&self) -> f64 {
        match self {
            AttributeRole::Class => 0.0,
            AttributeRole::Numeric(range) => range.width(),
            AttributeRole::Nominal { .. } | AttributeRole::Ignored => 1.0,
        }
    }

    fn compares(&self) -> bool {
        matches!(self, AttributeRole::Numeric(_) | AttributeRole::Nominal { .. })
    }
}

/// Affinity function built once from a training set.
///
/// Immutable after construction and `Sync`, so parallel workers share one
/// instance by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceFunction {
    roles: Vec<AttributeRole>,
    max_distance: f64,
}

impl DistanceFunction {
    /// Scan the training set for per-attribute ranges.
    ///
    /// Nominal attributes without any category are rejected.
    pub fn new(dataset: &Dataset) -> Result<Self> {
        let schema = dataset.schema();
        let roles = schema
            .attributes()
            .iter()
            .enumerate()
            .map(|(i, attr)| {
                if i == schema.class_index() {
                    return Ok(AttributeRole::Class);
                }
                let role = match &attr.kind {
                    AttributeKind::Numeric => {
                        let mut range: Option<AttributeRange> = None;
                        for inst in dataset.instances() {
                            let v = inst.values[i];
                            if v.is_nan() {
                                continue;
                            }
                            range = Some(match range {
                                None => AttributeRange::new(v, v),
                                Some(r) => AttributeRange::new(r.min.min(v), r.max.max(v)),
                            });
                        }
                        AttributeRole::Numeric(range.unwrap_or(AttributeRange::new(0.0, 0.0)))
                    }
                    AttributeKind::Nominal { values } if values.is_empty() => {
                        return Err(AirsError::UnsupportedAttribute {
                            index: i,
                            name: attr.name.clone(),
                            reason: "nominal attribute without categories".into(),
                        })
                    }
                    AttributeKind::Nominal { values } => AttributeRole::Nominal {
                        categories: values.len(),
                    },
                    AttributeKind::Date | AttributeKind::Text => AttributeRole::Ignored,
                };
                Ok(role)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_roles(roles))
    }

    /// Build directly from attribute roles.
    pub fn from_roles(roles: Vec<AttributeRole>) -> Self {
        let max_distance = roles.iter().map(|r| r.span().powi(2)).sum::<f64>().sqrt();
        Self {
            roles,
            // Every comparable attribute is constant: all distances are 0.
            max_distance: if max_distance > 0.0 { max_distance } else { 1.0 },
        }
    }

    pub fn roles(&self) -> &[AttributeRole] {
        &self.roles
    }

    pub fn role(&self, index: usize) -> Option<&AttributeRole> {
        self.roles.get(index)
    }

    pub fn dimension(&self) -> usize {
        self.roles.len()
    }

    /// The normalisation constant for affinity.
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Euclidean distance over comparable, non-missing attributes.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), self.roles.len());
        debug_assert_eq!(b.len(), self.roles.len());

        let mut sum = 0.0;
        for ((role, x), y) in self.roles.iter().zip(a).zip(b) {
            if !role.compares() || x.is_nan() || y.is_nan() {
                continue;
            }
            sum += (x - y).powi(2);
        }
        sum.sqrt()
    }

    /// Distance divided by the maximum training-set distance (lower = more similar).
    pub fn affinity(&self, a: &[f64], b: &[f64]) -> f64 {
        self.distance(a, b) / self.max_distance
    }

    /// `1 - affinity` (higher = more similar).
    pub fn stimulation(&self, a: &[f64], b: &[f64]) -> f64 {
        1.0 - self.affinity(a, b)
    }
}
