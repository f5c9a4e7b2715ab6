//! Shared types: attribute schema, instances and datasets.
//!
//! Every vector is a fixed-length `Vec<f64>` laid out by the [`Schema`].
//! One slot holds the class as an integer code; nominal attributes hold
//! their category code; missing values are `NaN`.

use crate::error::{AirsError, Result};
use serde::{Deserialize, Serialize};

/// Index of a class label in the class attribute's value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub usize);

impl ClassId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }

    /// Encode as the numeric value stored in the class slot.
    pub fn as_value(&self) -> f64 {
        self.0 as f64
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "class-{}", self.0)
    }
}

/// The type of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Continuous value.
    Numeric,
    /// Categorical value stored as its category code.
    Nominal { values: Vec<String> },
    /// Timestamp. Carried through but never compared.
    Date,
    /// Free text. Carried through but never compared.
    Text,
}

impl AttributeKind {
    /// Whether the distance function compares values of this kind.
    pub fn is_comparable(&self) -> bool {
        matches!(self, AttributeKind::Numeric | AttributeKind::Nominal { .. })
    }

    /// Number of categories for nominal attributes.
    pub fn num_categories(&self) -> Option<usize> {
        match self {
            AttributeKind::Nominal { values } => Some(values.len()),
            _ => None,
        }
    }
}

/// A named, typed attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    pub fn nominal<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: AttributeKind::Nominal {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Attribute layout of every vector in a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    attributes: Vec<Attribute>,
    class_index: usize,
}

impl Schema {
    /// Build a schema.
    ///
    /// The class attribute must be nominal with at least one label, and
    /// at least one other attribute must be numeric or nominal.
    pub fn new(attributes: Vec<Attribute>, class_index: usize) -> Result<Self> {
        let class_attr = attributes.get(class_index).ok_or(AirsError::DimensionMismatch {
            expected: class_index + 1,
            got: attributes.len(),
        })?;

        match &class_attr.kind {
            AttributeKind::Nominal { values } if !values.is_empty() => {}
            _ => {
                return Err(AirsError::UnsupportedAttribute {
                    index: class_index,
                    name: class_attr.name.clone(),
                    reason: "class attribute must be nominal with at least one label".into(),
                })
            }
        }

        let usable = attributes
            .iter()
            .enumerate()
            .any(|(i, a)| i != class_index && a.kind.is_comparable());
        if !usable {
            return Err(AirsError::UnsupportedAttribute {
                index: class_index,
                name: class_attr.name.clone(),
                reason: "no numeric or nominal attribute besides the class".into(),
            });
        }

        Ok(Self {
            attributes,
            class_index,
        })
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// Vector length, class slot included.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn class_labels(&self) -> &[String] {
        match &self.attributes[self.class_index].kind {
            AttributeKind::Nominal { values } => values,
            _ => &[],
        }
    }

    pub fn num_classes(&self) -> usize {
        self.class_labels().len()
    }

    pub fn class_label(&self, class: ClassId) -> Option<&str> {
        self.class_labels().get(class.0).map(String::as_str)
    }

    /// Look up a class by its label.
    pub fn class_by_label(&self, label: &str) -> Option<ClassId> {
        self.class_labels()
            .iter()
            .position(|l| l == label)
            .map(ClassId)
    }

    /// Read and validate the class slot of a vector.
    pub fn class_of(&self, values: &[f64]) -> Option<ClassId> {
        let v = *values.get(self.class_index)?;
        if v.is_nan() || v < 0.0 || v.fract() != 0.0 || v as usize >= self.num_classes() {
            return None;
        }
        Some(ClassId(v as usize))
    }
}

/// A single vector laid out by a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(with = "crate::missing")]
    pub values: Vec<f64>,
}

impl Instance {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.values.get(index).map_or(true, |v| v.is_nan())
    }
}

/// A labeled training set.
///
/// Construction validates every instance, so class lookups on a
/// `Dataset` cannot fail afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    schema: Schema,
    instances: Vec<Instance>,
}

impl Dataset {
    /// Build a dataset, rejecting wrong-length vectors and missing or
    /// out-of-range class values.
    pub fn new(schema: Schema, instances: Vec<Instance>) -> Result<Self> {
        if instances.is_empty() {
            return Err(AirsError::EmptyDataset);
        }
        for (index, inst) in instances.iter().enumerate() {
            if inst.values.len() != schema.len() {
                return Err(AirsError::DimensionMismatch {
                    expected: schema.len(),
                    got: inst.values.len(),
                });
            }
            if schema.class_of(&inst.values).is_none() {
                return Err(AirsError::MissingClass { index });
            }
        }
        Ok(Self { schema, instances })
    }

    /// A dataset sharing this schema over a different set of already
    /// validated instances. May be empty.
    pub fn with_instances(&self, instances: Vec<Instance>) -> Self {
        Self {
            schema: self.schema.clone(),
            instances,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn into_instances(self) -> Vec<Instance> {
        self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.schema.num_classes()
    }

    /// Class of an instance belonging to this dataset.
    pub fn class_of(&self, instance: &Instance) -> ClassId {
        ClassId(instance.values[self.schema.class_index] as usize)
    }
}
