//! Show what a trained model contains.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;

pub fn run(model: Option<String>, cells: bool) -> Result<()> {
    let config = Config::load()?;
    let path = super::model_path(model, &config);
    let model = super::load_model(&path)?;
    let schema = model.schema();

    println!("{}", format!("AIRS Model: {}", path.display()).white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Schema".blue().bold());
    for (i, attr) in schema.attributes().iter().enumerate() {
        let kind = match attr.kind.num_categories() {
            _ if i == schema.class_index() => format!("class, {} labels", schema.num_classes()),
            Some(n) => format!("nominal, {n} categories"),
            None if attr.kind.is_comparable() => "numeric".to_string(),
            None => "ignored".to_string(),
        };
        println!("  {:<20} {}", attr.name, kind.dimmed());
    }
    println!();

    println!("{}", "Training".blue().bold());
    println!("{}", model.summary());

    if cells {
        println!();
        println!("{}", "Memory Cells".blue().bold());
        for (i, cell) in model.memory().iter().enumerate() {
            let values: Vec<String> = cell
                .attributes()
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != schema.class_index())
                .map(|(_, v)| if v.is_nan() { "?".to_string() } else { format!("{v:.4}") })
                .collect();
            println!(
                "  {:>4}  {:<12} [{}]",
                i,
                schema.class_label(cell.class()).unwrap_or("?").cyan(),
                values.join(", ")
            );
        }
    }

    Ok(())
}
