use std::io::{Read, Write};

use csv::StringRecord;

use super::DatasetError;
use crate::workflows::features::{Column, ColumnValues, FeatureTable};

/// Read a headed CSV into a table.
///
/// A column is numeric when every non-empty cell parses as a float. Empty
/// cells and `NaN`/`nan` read as missing.
pub fn read_table<R: Read>(reader: R) -> Result<FeatureTable, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    let records = csv_reader
        .records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let cells: Vec<Option<&str>> = records
                .iter()
                .map(|record| record.get(index).filter(|cell| !is_missing(cell)))
                .collect();
            infer_column(name, cells)
        })
        .collect();

    Ok(FeatureTable::from_columns(columns)?)
}

/// Write a table as CSV; missing cells become empty fields.
pub fn write_table<W: Write>(table: &FeatureTable, writer: W) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.column_names())?;

    for row in 0..table.row_count() {
        let fields: Vec<String> = table
            .columns()
            .iter()
            .map(|column| match &column.values {
                ColumnValues::Numeric(values) => {
                    values[row].map(|value| value.to_string()).unwrap_or_default()
                }
                ColumnValues::Text(values) => values[row].clone().unwrap_or_default(),
            })
            .collect();
        csv_writer.write_record(&fields)?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("nan")
}

fn infer_column(name: String, cells: Vec<Option<&str>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            Some(raw) => raw.parse::<f64>().ok().map(Some),
            None => Some(None),
        })
        .collect();

    match parsed {
        Some(values) => Column::numeric(name, values),
        None => Column::text(
            name,
            cells
                .into_iter()
                .map(|cell| cell.map(str::to_string))
                .collect(),
        ),
    }
}
