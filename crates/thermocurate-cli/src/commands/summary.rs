//! Summary command - describe what a measurement table holds.

use std::collections::BTreeMap;
use std::path::PathBuf;

use colored::Colorize;
use thermocurate::TableParser;

pub fn run(file: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Table not found: {}", file.display()).into());
    }

    let (table, metadata) = TableParser::new().parse_file(&file)?;

    let properties: Vec<(&str, &str, usize)> = table
        .properties()
        .iter()
        .map(|(property_type, unit)| {
            (
                property_type.as_str(),
                unit.as_str(),
                table.count_property(property_type),
            )
        })
        .collect();
    let substances = table.substances();
    let mut by_n_components: BTreeMap<usize, usize> = BTreeMap::new();
    for row in table.iter() {
        *by_n_components.entry(row.n_components()).or_default() += 1;
    }

    if json_output {
        let summary = serde_json::json!({
            "source": metadata,
            "rows": table.len(),
            "substances": substances.len(),
            "rows_by_n_components": by_n_components,
            "properties": properties
                .iter()
                .map(|(property_type, unit, count)| serde_json::json!({
                    "property_type": property_type,
                    "unit": unit,
                    "count": count,
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Summary of".cyan().bold(),
        metadata.file.white()
    );
    println!("  Format:     {}", metadata.format);
    println!("  Hash:       {}", metadata.hash.dimmed());
    println!();
    println!("  Rows:       {}", table.len().to_string().white().bold());
    println!("  Substances: {}", substances.len().to_string().white().bold());
    println!();

    println!("{}", "Rows by number of components:".yellow().bold());
    for (n_components, count) in &by_n_components {
        println!("  {:<32} {:>8}", n_components, count.to_string().green());
    }
    println!();

    println!("{}", "Properties:".yellow().bold());
    for (property_type, unit, count) in &properties {
        println!(
            "  {:<32} {:>8}  ({})",
            property_type,
            count.to_string().green(),
            unit.dimmed()
        );
    }

    Ok(())
}
