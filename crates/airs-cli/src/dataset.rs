//! CSV loading.
//!
//! The first row is a header. Columns whose present values all parse as
//! numbers are numeric; every other column is nominal with its categories
//! in first-seen order. The class column is always nominal. `?` and empty
//! cells are missing values. Fields may be wrapped in double quotes to
//! hold commas, with `""` standing for a literal quote; a quoted field
//! cannot span lines.

use airs::prelude::*;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, warn};

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell == "?"
}

/// Split one line into trimmed fields.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// Header and data rows of a CSV text, blank lines skipped.
fn read_table(text: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let header: Vec<String> = match lines.next() {
        Some(line) => split_row(line),
        None => bail!("CSV input is empty"),
    };
    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        let row = split_row(line);
        if row.len() != header.len() {
            bail!(
                "Row {} has {} columns, header has {}",
                i + 2,
                row.len(),
                header.len()
            );
        }
        rows.push(row);
    }
    Ok((header, rows))
}

/// Parse a labeled training set.
///
/// `class_column` selects the class attribute by name; the last column is
/// used when it is `None`. Rows without a class value are skipped.
pub fn parse_dataset(text: &str, class_column: Option<&str>) -> Result<Dataset> {
    let (header, rows) = read_table(text)?;
    let class_index = match class_column {
        Some(name) => header
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("No column named {name:?}"))?,
        None => header.len() - 1,
    };

    let attributes: Vec<Attribute> = header
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let present = rows.iter().map(|r| r[col].as_str()).filter(|c| !is_missing(c));
            let numeric = col != class_index && present.clone().all(|c| c.parse::<f64>().is_ok());
            if numeric {
                Attribute::numeric(name.clone())
            } else {
                let mut categories: Vec<&str> = Vec::new();
                for c in present {
                    if !categories.contains(&c) {
                        categories.push(c);
                    }
                }
                Attribute::nominal(name.clone(), categories)
            }
        })
        .collect();
    let schema = Schema::new(attributes, class_index)?;

    let mut instances = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if is_missing(&row[class_index]) {
            warn!(row = i + 2, "skipping row without a class value");
            continue;
        }
        instances.push(encode_row(&schema, row, &header)?);
    }
    debug!(
        rows = instances.len(),
        attributes = schema.len(),
        classes = schema.num_classes(),
        "parsed training data"
    );
    Ok(Dataset::new(schema, instances)?)
}

/// Parse query rows against a trained model's schema.
///
/// Columns are matched by header name; the class column may be absent.
/// Returns each row's vector together with its class value, if any.
pub fn parse_queries(text: &str, schema: &Schema) -> Result<Vec<(Vec<f64>, Option<ClassId>)>> {
    let (header, rows) = read_table(text)?;
    for (i, attr) in schema.attributes().iter().enumerate() {
        if i != schema.class_index() && !header.contains(&attr.name) {
            bail!("Input has no column named {:?}", attr.name);
        }
    }

    rows.iter()
        .map(|row| {
            let instance = encode_row(schema, row, &header)?;
            let class = schema.class_of(&instance.values);
            Ok((instance.values, class))
        })
        .collect()
}

/// Encode one row into a schema-ordered vector.
///
/// Unknown nominal values and columns the row lacks become missing.
fn encode_row(schema: &Schema, row: &[impl AsRef<str>], header: &[String]) -> Result<Instance> {
    let mut values = Vec::with_capacity(schema.len());
    for attr in schema.attributes() {
        let cell = header
            .iter()
            .position(|h| *h == attr.name)
            .map(|col| row[col].as_ref())
            .unwrap_or("");
        let value = if is_missing(cell) {
            f64::NAN
        } else {
            match &attr.kind {
                AttributeKind::Numeric => cell
                    .parse::<f64>()
                    .with_context(|| format!("Column {:?}: {cell:?} is not a number", attr.name))?,
                AttributeKind::Nominal { values } => match values.iter().position(|v| v == cell) {
                    Some(code) => code as f64,
                    None => {
                        warn!(column = %attr.name, value = cell, "unknown category treated as missing");
                        f64::NAN
                    }
                },
                AttributeKind::Date | AttributeKind::Text => f64::NAN,
            }
        };
        values.push(value);
    }
    Ok(Instance::new(values))
}

pub fn load_dataset(path: &Path, class_column: Option<&str>) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_dataset(&text, class_column).with_context(|| format!("Failed to load {}", path.display()))
}

pub fn load_queries(path: &Path, schema: &Schema) -> Result<Vec<(Vec<f64>, Option<ClassId>)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_queries(&text, schema).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse a comma-separated vector for a schema with the class slot omitted.
pub fn parse_vector(text: &str, schema: &Schema) -> Result<Vec<f64>> {
    let cells = split_row(text);
    let expected = schema.len() - 1;
    if cells.len() != expected {
        bail!("Expected {expected} values, got {}", cells.len());
    }
    let mut cells = cells.into_iter();
    let row: Vec<String> = (0..schema.len())
        .map(|i| {
            if i == schema.class_index() {
                String::new()
            } else {
                cells.next().unwrap_or_default()
            }
        })
        .collect();
    let header: Vec<String> = schema.attributes().iter().map(|a| a.name.clone()).collect();
    Ok(encode_row(schema, &row, &header)?.values)
}
