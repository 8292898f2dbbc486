use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// ColumnData – the typed values of a single column
// ---------------------------------------------------------------------------

/// Values of one column. Every variant holds exactly `Table::len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Parsed date-times. `None` is a missing cell and never matches a date.
    Timestamp(Vec<Option<NaiveDateTime>>),
    /// Numeric readings. Missing cells are `NaN`.
    Numeric(Vec<f64>),
    /// Anything that did not parse as a number.
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Timestamp(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    /// Short dtype name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ColumnData::Timestamp(_) => "datetime",
            ColumnData::Numeric(_) => "float",
            ColumnData::Text(_) => "text",
        }
    }

    /// Keep only the cells at `indices`, in the given order.
    fn take(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Timestamp(v) => {
                ColumnData::Timestamp(indices.iter().map(|&i| v[i]).collect())
            }
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => ColumnData::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – column-oriented readings, source row order preserved
// ---------------------------------------------------------------------------

/// An in-memory table of sensor readings.
///
/// Columns are kept in source order and all have the same length. A table
/// with no columns and no rows is the "nothing loaded" value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// The empty table.
    pub const fn empty() -> Self {
        Table {
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Build a table from columns, checking that all lengths agree.
    pub fn from_columns(columns: Vec<Column>) -> anyhow::Result<Self> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.data.len() != rows) {
            anyhow::bail!(
                "column '{}' has {} rows, expected {rows}",
                bad.name,
                bad.data.len()
            );
        }
        Ok(Table { columns, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Exact-name lookup. With duplicate names the first column wins.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Numeric values of `name`, if that column exists and is numeric.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        match &self.column(name)?.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Date-times of `name`, if that column exists and has been parsed.
    pub fn timestamps(&self, name: &str) -> Option<&[Option<NaiveDateTime>]> {
        match &self.column(name)?.data {
            ColumnData::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Append a column. Its length must match the table.
    pub fn push_column(&mut self, column: Column) -> anyhow::Result<()> {
        if !self.columns.is_empty() && column.data.len() != self.rows {
            anyhow::bail!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.data.len(),
                self.rows
            );
        }
        self.rows = column.data.len();
        self.columns.push(column);
        Ok(())
    }

    /// A new table holding only the rows at `indices`, same schema.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.take(indices)))
                .collect(),
            rows: indices.len(),
        }
    }
}
