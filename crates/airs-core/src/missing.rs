//! Serde adapter for vectors that use `NaN` as the missing-value marker.
//!
//! JSON has no NaN, so missing values travel as `null`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    let encoded: Vec<Option<f64>> = values
        .iter()
        .map(|v| if v.is_nan() { None } else { Some(*v) })
        .collect();
    encoded.serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let encoded = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(encoded.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}
