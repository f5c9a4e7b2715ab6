//! Classify vectors with a trained model.

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

use crate::config::Config;
use crate::dataset::{load_queries, parse_vector};

pub fn run(model: Option<String>, values: Option<String>, input: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let path = super::model_path(model, &config);
    let model = super::load_model(&path)?;
    let schema = model.schema();

    match (values, input) {
        (Some(values), _) => {
            let vector = parse_vector(&values, schema)?;
            println!("{}", model.classify_label(&vector)?.green().bold());
        }
        (None, Some(input)) => {
            let queries = load_queries(Path::new(&input), schema)?;
            let mut labeled = 0usize;
            let mut correct = 0usize;
            for (i, (vector, expected)) in queries.iter().enumerate() {
                let predicted = model.classify(vector)?;
                let label = schema.class_label(predicted).unwrap_or("?");
                match expected {
                    Some(expected) => {
                        labeled += 1;
                        let mark = if *expected == predicted {
                            correct += 1;
                            "✓".green()
                        } else {
                            "✗".red()
                        };
                        println!("{:>5}  {}  {}", i + 1, mark, label);
                    }
                    None => println!("{:>5}     {}", i + 1, label),
                }
            }
            if labeled > 0 {
                println!();
                println!(
                    "Accuracy on labeled rows: {} ({}/{})",
                    format!("{:.1}%", correct as f64 / labeled as f64 * 100.0).cyan(),
                    correct,
                    labeled
                );
            }
        }
        (None, None) => bail!("Give either {} or {}", "--values".cyan(), "--input".cyan()),
    }

    Ok(())
}
