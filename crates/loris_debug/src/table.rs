use loris_core::{Column, DataType, Row, Value};

/// A named table held entirely in memory.
///
/// Built fluently: declare columns first, then append rows positionally.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryTable {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, datatype: DataType) -> Self {
        self.columns.push(Column::new(name, datatype));
        self
    }

    /// Append a row with one value per declared column, in declaration
    /// order.
    ///
    /// Panics when the value count does not match the column count or a
    /// non-null value does not inhabit its column's declared type; this is
    /// seed data for tests, so a mismatch is a bug in the test.
    pub fn row<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        assert_eq!(
            values.len(),
            self.columns.len(),
            "row for table {} has {} values but {} columns",
            self.name,
            values.len(),
            self.columns.len(),
        );
        for (column, value) in self.columns.iter().zip(&values) {
            if let Some(datatype) = value.datatype() {
                assert_eq!(
                    datatype, column.datatype,
                    "value for column {} of table {}",
                    column.name, self.name,
                );
            }
        }
        self.rows.push(
            self.columns
                .iter()
                .map(|c| c.name.clone())
                .zip(values)
                .collect(),
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pair_values_with_columns_in_order() {
        let table = MemoryTable::new("person")
            .column("id", DataType::Utf8)
            .column("age", DataType::Int64)
            .row([Value::from("p1"), Value::from(33)]);
        let row = &table.rows()[0];
        assert_eq!(row.get("id"), Some(&Value::from("p1")));
        assert_eq!(row.get("age"), Some(&Value::from(33)));
    }

    #[test]
    fn null_fits_any_column() {
        let table = MemoryTable::new("person")
            .column("id", DataType::Utf8)
            .column("age", DataType::Int64)
            .row([Value::from("p1"), Value::Null]);
        assert!(table.rows()[0].get("age").unwrap().is_null());
    }

    #[test]
    #[should_panic(expected = "2 values but 1 columns")]
    fn mismatched_row_width_panics() {
        let _ = MemoryTable::new("person")
            .column("id", DataType::Utf8)
            .row(["p1", "extra"]);
    }

    #[test]
    #[should_panic(expected = "value for column age of table person")]
    fn mistyped_row_value_panics() {
        let _ = MemoryTable::new("person")
            .column("id", DataType::Utf8)
            .column("age", DataType::Int64)
            .row([Value::from("p1"), Value::from("old")]);
    }
}
