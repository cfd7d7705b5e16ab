//! Rendering tables for the terminal and for other tools.

use std::io::Write;

use tabled::builder::Builder;

use crate::Error;
use crate::config::OutputFormat;
use crate::table::Table;

pub fn write_table(table: &Table, format: OutputFormat, mut out: impl Write) -> Result<(), Error> {
    match format {
        OutputFormat::Table => writeln!(out, "{}", render(table))?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, table)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let batch = table.to_record_batch()?;
            let mut writer = arrow::csv::Writer::new(out);
            writer.write(&batch)?;
        }
    }
    Ok(())
}

/// A rounded terminal table; null cells print as `null`.
pub fn render(table: &Table) -> String {
    if table.columns.is_empty() {
        return "(no columns)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(table.column_names().map(str::to_string));
    for row in 0..table.num_rows() {
        builder.push_record(
            table
                .columns
                .iter()
                .map(|c| c.cell_text(row).unwrap_or_else(|| "null".to_string())),
        );
    }
    let mut rendered = builder.build();
    rendered.with(tabled::settings::style::Style::rounded());
    rendered.to_string()
}
