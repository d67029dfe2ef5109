//! The data-table assembler.
//!
//! Normalizes the raw shapes an example table can arrive in — structured
//! header/row or header/column mappings, or parsed delimited text — into the
//! one rectangular [`DataTable`] representation. Rows shorter than the header
//! row are padded with null cells, never truncated.

use serde_yaml::Value;

use crate::content::ParsedTable;
use crate::error::BuildError;
use crate::keyword;
use crate::model::{DataCell, DataColumn, DataTable};
use crate::resolve::find;

impl DataTable {
    /// Assemble a table from structured content carrying `Headers` plus
    /// either `Rows` or `Columns`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingHeaders`] or
    /// [`BuildError::MissingRowsOrColumns`] when the required keys are
    /// absent, [`BuildError::UnexpectedShape`] when a present key holds the
    /// wrong shape, and [`BuildError::MalformedTable`] when the column count
    /// does not match the header count.
    pub fn from_structured(content: &Value) -> Result<Self, BuildError> {
        let headers = find(content, &keyword::HEADERS).ok_or(BuildError::MissingHeaders)?;
        let headers = scalar_sequence(headers.value, "Headers")?;
        if let Some(rows) = find(content, &keyword::ROWS) {
            let rows = nested_sequence(rows.value, "Rows")?;
            Ok(Self::from_rows(&headers, &rows))
        } else if let Some(columns) = find(content, &keyword::COLUMNS) {
            let columns = nested_sequence(columns.value, "Columns")?;
            Self::from_columns(&headers, &columns)
        } else {
            Err(BuildError::MissingRowsOrColumns)
        }
    }

    /// Assemble a table from row-major data.
    ///
    /// Rows shorter than the header row are padded with null cells; cells
    /// beyond the last header are ignored.
    #[must_use]
    pub fn from_rows(headers: &[Value], rows: &[Vec<Value>]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(index, header)| DataColumn {
                header: DataCell::new(header.clone()),
                data: rows
                    .iter()
                    .map(|row| row.get(index).cloned().map_or_else(DataCell::null, DataCell::new))
                    .collect(),
            })
            .collect();
        Self { columns }
    }

    /// Assemble a table from column-major data.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedTable`] unless there is exactly one
    /// column per header. Short columns are padded with null to the longest.
    pub fn from_columns(headers: &[Value], columns: &[Vec<Value>]) -> Result<Self, BuildError> {
        if headers.len() != columns.len() {
            return Err(BuildError::MalformedTable {
                detail: format!(
                    "{} headers do not match {} columns",
                    headers.len(),
                    columns.len()
                ),
            });
        }
        let row_count = columns.iter().map(Vec::len).max().unwrap_or(0);
        let columns = headers
            .iter()
            .zip(columns)
            .map(|(header, column)| DataColumn {
                header: DataCell::new(header.clone()),
                data: (0..row_count)
                    .map(|index| {
                        column
                            .get(index)
                            .cloned()
                            .map_or_else(DataCell::null, DataCell::new)
                    })
                    .collect(),
            })
            .collect();
        Ok(Self { columns })
    }

    /// Assemble a table from parsed delimited text.
    #[must_use]
    pub fn from_parsed(parsed: ParsedTable) -> Self {
        let headers: Vec<Value> = parsed.headers.into_iter().map(Value::String).collect();
        let rows: Vec<Vec<Value>> = parsed
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(Value::String).collect())
            .collect();
        Self::from_rows(&headers, &rows)
    }
}

fn scalar_sequence(value: &Value, key: &'static str) -> Result<Vec<Value>, BuildError> {
    value
        .as_sequence()
        .cloned()
        .ok_or(BuildError::UnexpectedShape {
            key: key.to_owned(),
            expected: "sequence",
        })
}

fn nested_sequence(value: &Value, key: &'static str) -> Result<Vec<Vec<Value>>, BuildError> {
    let entries = value.as_sequence().ok_or(BuildError::UnexpectedShape {
        key: key.to_owned(),
        expected: "sequence of sequences",
    })?;
    entries
        .iter()
        .map(|entry| {
            entry
                .as_sequence()
                .cloned()
                .ok_or(BuildError::UnexpectedShape {
                    key: key.to_owned(),
                    expected: "sequence of sequences",
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ParsedTable;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap_or_else(|err| panic!("fixture must parse: {err}"))
    }

    #[test]
    fn row_major_tables_are_rectangular() {
        let content = yaml("{Headers: [h1, h2, h3], Rows: [[a, b, c], [d, e, f]]}");
        let table = DataTable::from_structured(&content).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 2);
        assert!(table.columns.iter().all(|column| column.data.len() == 2));
    }

    #[test]
    fn short_rows_are_padded_with_null_not_dropped() {
        let content = yaml("{Headers: [h1, h2, h3], Rows: [[a, b]]}");
        let table = DataTable::from_structured(&content).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.columns[2].data[0], DataCell::null());
    }

    #[test]
    fn column_major_tables_use_columns_directly() {
        let content = yaml("{Headers: [h1, h2], Columns: [[a, b], [c, d]]}");
        let table = DataTable::from_structured(&content).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(table.header_names(), vec!["h1", "h2"]);
        assert_eq!(table.columns[1].data[0], DataCell::from("c"));
    }

    #[test]
    fn column_count_must_match_header_count() {
        let content = yaml("{Headers: [h1, h2], Columns: [[a]]}");
        let err = DataTable::from_structured(&content).expect_err("one column is missing");
        assert!(matches!(err, BuildError::MalformedTable { .. }));
    }

    #[test]
    fn missing_headers_and_rows_are_distinct_errors() {
        let no_headers = DataTable::from_structured(&yaml("{Rows: []}"))
            .expect_err("headers are required");
        assert!(matches!(no_headers, BuildError::MissingHeaders));

        let no_rows = DataTable::from_structured(&yaml("{Headers: [h]}"))
            .expect_err("rows or columns are required");
        assert!(matches!(no_rows, BuildError::MissingRowsOrColumns));
    }

    #[test]
    fn parsed_text_round_trips_into_columns() {
        let table = DataTable::from_parsed(ParsedTable {
            headers: vec!["a".to_owned(), "b".to_owned()],
            rows: vec![vec!["1".to_owned(), "2".to_owned()]],
        });
        assert_eq!(table.header_names(), vec!["a", "b"]);
        assert_eq!(table.columns[0].data, vec![DataCell::from("1")]);
    }
}
