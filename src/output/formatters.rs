use super::RecordSink;
use crate::item::ItemRecord;
use anyhow::Result;
use comfy_table::{Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use csv::Writer;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Json,
    Csv,
    Table,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Tsv,
        }
    }
}

#[derive(Serialize)]
struct Row<'a> {
    number: &'a str,
    address: String,
    url: String,
}

impl<'a> From<&'a ItemRecord> for Row<'a> {
    fn from(record: &'a ItemRecord) -> Self {
        Row {
            number: &record.identifier,
            address: record.address.to_string(),
            url: record.explorer_url(),
        }
    }
}

/// Streams records to `W` in the chosen format. `Table` buffers until `finish`.
pub enum RecordWriter<W: Write> {
    Tsv(W),
    Json(W),
    Csv(Writer<W>),
    Table { out: W, table: Table, rows: usize },
}

impl<W: Write> RecordWriter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        match format {
            OutputFormat::Tsv => RecordWriter::Tsv(out),
            OutputFormat::Json => RecordWriter::Json(out),
            OutputFormat::Csv => RecordWriter::Csv(Writer::from_writer(out)),
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL)
                    .apply_modifier(UTF8_ROUND_CORNERS)
                    .set_header(vec!["Number", "Address", "Explorer"]);
                RecordWriter::Table {
                    out,
                    table,
                    rows: 0,
                }
            }
        }
    }

    pub fn into_inner(self) -> Result<W> {
        match self {
            RecordWriter::Tsv(out) | RecordWriter::Json(out) => Ok(out),
            RecordWriter::Csv(wtr) => Ok(wtr.into_inner().map_err(|e| e.into_error())?),
            RecordWriter::Table { out, .. } => Ok(out),
        }
    }
}

impl<W: Write> RecordSink for RecordWriter<W> {
    fn emit(&mut self, record: &ItemRecord) -> Result<()> {
        match self {
            RecordWriter::Tsv(out) => {
                writeln!(out, "{}\t{}", record.identifier, record.explorer_url())?;
            }
            RecordWriter::Json(out) => {
                serde_json::to_writer(&mut *out, &Row::from(record))?;
                writeln!(out)?;
            }
            RecordWriter::Csv(wtr) => {
                wtr.serialize(Row::from(record))?;
                wtr.flush()?;
            }
            RecordWriter::Table { table, rows, .. } => {
                let row = Row::from(record);
                table.add_row(vec![row.number.to_string(), row.address, row.url]);
                *rows += 1;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        match self {
            RecordWriter::Tsv(out) | RecordWriter::Json(out) => out.flush()?,
            RecordWriter::Csv(wtr) => wtr.flush()?,
            RecordWriter::Table { out, table, rows } => {
                if *rows == 0 {
                    writeln!(out, "No number items found.")?;
                } else {
                    writeln!(out, "{table}")?;
                }
                out.flush()?;
            }
        }
        Ok(())
    }
}
