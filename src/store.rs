use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{DataLoadError, QueryError};
use crate::models::{CellValue, Column, Record, RecordTable, YearRange};

/// Loads the publications CSV at `path` into memory.
pub fn load(path: &Path) -> Result<RecordTable, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = from_reader(file)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = ?table.columns(),
        "loaded publication records"
    );
    Ok(table)
}

/// Parses a full CSV document. Header names are matched loosely and
/// normalized before the rows are deserialized.
pub fn from_reader<R: Read>(source: R) -> Result<RecordTable, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut columns = Vec::new();
    let mut normalized = csv::StringRecord::new();
    for header in reader.headers()?.iter() {
        match Column::lookup(header) {
            Some(column) => {
                if !columns.contains(&column) {
                    columns.push(column);
                }
                normalized.push_field(column.header());
            }
            None => {
                debug!(header, "ignoring unknown column");
                normalized.push_field(header);
            }
        }
    }

    if let Some(missing) = Column::ALL
        .into_iter()
        .find(|column| column.is_required() && !columns.contains(column))
    {
        return Err(DataLoadError::MissingColumn(missing.header()));
    }
    let year_index = normalized
        .iter()
        .position(|header| header == Column::Year.header())
        .ok_or(DataLoadError::MissingColumn(Column::Year.header()))?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let year = row.get(year_index).unwrap_or_default();
        if year.parse::<i32>().is_err() {
            return Err(DataLoadError::InvalidYear {
                line: row.position().map(|position| position.line()).unwrap_or_default(),
                value: year.to_string(),
            });
        }
        records.push(row.deserialize::<Record>(Some(&normalized))?);
    }

    Ok(RecordTable::new(columns, records))
}

/// Unique non-null values of `column` in first-seen order.
pub fn distinct_values(table: &RecordTable, column: Column) -> Result<Vec<String>, QueryError> {
    table.require(column)?;
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for record in table.records() {
        if let Some(value) = record.value(column) {
            if seen.insert(value.clone()) {
                values.push(value.into_owned());
            }
        }
    }
    Ok(values)
}

pub fn min_value(table: &RecordTable, column: Column) -> Result<CellValue, QueryError> {
    cells(table, column)?
        .min()
        .ok_or_else(|| QueryError::EmptyTable(column.header().to_string()))
}

pub fn max_value(table: &RecordTable, column: Column) -> Result<CellValue, QueryError> {
    cells(table, column)?
        .max()
        .ok_or_else(|| QueryError::EmptyTable(column.header().to_string()))
}

/// Inclusive span of publication years in the table.
pub fn year_bounds(table: &RecordTable) -> Result<YearRange, QueryError> {
    let years = table.records().iter().map(|record| record.year);
    match (years.clone().min(), years.max()) {
        (Some(min), Some(max)) => Ok(YearRange { min, max }),
        _ => Err(QueryError::EmptyTable(Column::Year.header().to_string())),
    }
}

fn cells(
    table: &RecordTable,
    column: Column,
) -> Result<impl Iterator<Item = CellValue> + '_, QueryError> {
    table.require(column)?;
    Ok(table.records().iter().filter_map(move |record| {
        if column == Column::Year {
            Some(CellValue::Integer(i64::from(record.year)))
        } else {
            record
                .value(column)
                .map(|value| CellValue::Text(value.into_owned()))
        }
    }))
}
