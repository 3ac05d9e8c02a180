//! Output formatting: ranking lines, terminal table and JSON.

use std::io::Write;

use pairwise_core::Item;
use serde::Serialize;

use crate::CliError;

#[derive(Debug, Serialize)]
struct JsonRankedItem<'a> {
    rank: usize,
    name: &'a str,
    score: f64,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    items: Vec<JsonRankedItem<'a>>,
    total_items: usize,
}

/// Write one `name: score` line per entry.
pub(crate) fn write_scores(
    writer: &mut dyn Write,
    entries: &[(Item, f64)],
) -> Result<(), CliError> {
    for (item, score) in entries {
        writeln!(writer, "{item}: {score}").map_err(CliError::Terminal)?;
    }
    Ok(())
}

/// Write entries as an aligned table with ranks.
pub(crate) fn write_table(
    writer: &mut dyn Write,
    entries: &[(Item, f64)],
    total_items: usize,
) -> Result<(), CliError> {
    let name_width = entries
        .iter()
        .map(|(item, _)| item.as_str().chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    writeln!(writer, "  # | {:<name_width$} |     Score", "Item").map_err(CliError::Terminal)?;
    writeln!(writer, "----|-{}-|----------", "-".repeat(name_width)).map_err(CliError::Terminal)?;
    for (position, (item, score)) in entries.iter().enumerate() {
        writeln!(
            writer,
            "{:>3} | {:<name_width$} | {score:>9.2}",
            position + 1,
            item.as_str()
        )
        .map_err(CliError::Terminal)?;
    }
    writeln!(writer, "\n{} of {total_items} images shown", entries.len())
        .map_err(CliError::Terminal)?;
    Ok(())
}

/// Write entries as pretty-printed JSON.
pub(crate) fn write_json(
    writer: &mut dyn Write,
    entries: &[(Item, f64)],
    total_items: usize,
) -> Result<(), CliError> {
    let output = JsonOutput {
        items: entries
            .iter()
            .enumerate()
            .map(|(position, (item, score))| JsonRankedItem {
                rank: position + 1,
                name: item.as_str(),
                score: *score,
            })
            .collect(),
        total_items,
    };
    let payload = serde_json::to_string_pretty(&output).map_err(CliError::SerializeRanking)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::Terminal)?;
    writer.write_all(b"\n").map_err(CliError::Terminal)?;
    Ok(())
}
