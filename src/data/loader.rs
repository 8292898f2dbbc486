use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, TimeUnit, TimestampMicrosecondType};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::{Diagnostic, LoadError};
use super::model::{Column, ColumnData, Table};
use super::normalize::{is_missing, normalize};
use super::schema::{ColumnSchema, SeriesProbe};
use super::source::{SourceFormat, SourceLocation};

static EMPTY_TABLE: Table = Table::empty();

// ---------------------------------------------------------------------------
// Load options and results
// ---------------------------------------------------------------------------

/// Everything `load` needs besides the location.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub schema: ColumnSchema,
    /// Upper bound on a remote fetch.
    pub fetch_timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            schema: ColumnSchema::default(),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// A normalized table together with what the series probe found.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub location: SourceLocation,
    pub table: Table,
    pub probe: SeriesProbe,
    /// Non-fatal findings (missing series, skipped derivations).
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of loading a source. A failure still hands out an (empty) table.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Arc<LoadedTable>),
    Failed {
        location: SourceLocation,
        error: LoadError,
    },
}

impl LoadOutcome {
    /// The loaded table, or the empty table on failure.
    pub fn table(&self) -> &Table {
        match self {
            LoadOutcome::Loaded(t) => &t.table,
            LoadOutcome::Failed { .. } => &EMPTY_TABLE,
        }
    }

    pub fn loaded(&self) -> Option<&Arc<LoadedTable>> {
        match self {
            LoadOutcome::Loaded(t) => Some(t),
            LoadOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadOutcome::Loaded(_) => None,
            LoadOutcome::Failed { error, .. } => Some(error),
        }
    }

    /// Messages to surface to the operator.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            LoadOutcome::Loaded(t) => t.diagnostics.clone(),
            LoadOutcome::Failed { error, .. } => vec![Diagnostic::from(error)],
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and normalize a source. Never fails: errors become
/// [`LoadOutcome::Failed`].
pub fn load(location: &SourceLocation, options: &LoadOptions) -> LoadOutcome {
    match try_load(location, options) {
        Ok(loaded) => {
            log::info!(
                "Loaded {} rows with columns {:?} from {location}",
                loaded.table.len(),
                loaded.table.column_names()
            );
            LoadOutcome::Loaded(Arc::new(loaded))
        }
        Err(error) => {
            log::error!("Failed to load {location}: {error}");
            LoadOutcome::Failed {
                location: location.clone(),
                error,
            }
        }
    }
}

fn try_load(location: &SourceLocation, options: &LoadOptions) -> Result<LoadedTable, LoadError> {
    let bytes = location
        .read_bytes(options.fetch_timeout)
        .map_err(|e| LoadError::SourceUnavailable {
            location: location.to_string(),
            reason: format!("{e:#}"),
        })?;

    let raw = match location.format() {
        SourceFormat::Csv => parse_csv(&bytes),
        SourceFormat::Parquet => parse_parquet(bytes),
    }
    .map_err(|e| LoadError::Unreadable {
        location: location.to_string(),
        reason: format!("{e:#}"),
    })?;

    let (table, mut diagnostics) = normalize(raw, &options.schema)?;
    let probe = SeriesProbe::probe(&table, &options.schema);
    diagnostics.extend(probe.diagnostics(&table, &options.schema));

    Ok(LoadedTable {
        location: location.clone(),
        table,
        probe,
        diagnostics,
    })
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

/// Comma-separated text, header row first. Header names are kept verbatim
/// (trimming happens during normalization).
pub fn parse_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, value) in record.iter().enumerate() {
            cells[col_idx].push(value.to_string());
        }
    }

    let mut table = Table::empty();
    for (name, values) in headers.into_iter().zip(cells) {
        table.push_column(Column::new(name, guess_column_type(values)))?;
    }
    Ok(table)
}

/// Numeric when every present cell parses as `f64`; text otherwise.
/// Empty cells and tokens like `NA` or `NULL` are missing either way.
fn guess_column_type(values: Vec<String>) -> ColumnData {
    let numeric: Option<Vec<f64>> = values
        .iter()
        .map(|s| {
            if is_missing(s) {
                Some(f64::NAN)
            } else {
                s.trim().parse::<f64>().ok()
            }
        })
        .collect();

    match numeric {
        Some(v) => ColumnData::Numeric(v),
        None => ColumnData::Text(
            values
                .into_iter()
                .map(|s| if is_missing(&s) { None } else { Some(s) })
                .collect(),
        ),
    }
}

// ---------------------------------------------------------------------------
// Parquet parser
// ---------------------------------------------------------------------------

/// Parquet as written by Pandas or Polars.
///
/// - integer / float columns → numeric
/// - timestamp / date columns → date-times
/// - string columns (and anything else castable to a string) → text
pub fn parse_parquet(bytes: Vec<u8>) -> Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::from(bytes))
        .context("reading parquet metadata")?;
    let fields: Vec<(String, DataType)> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), f.data_type().clone()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Column> = fields
        .iter()
        .map(|(name, dt)| Column::new(name.clone(), empty_column_for(dt)))
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (idx, col) in columns.iter_mut().enumerate() {
            append_array(&mut col.data, batch.column(idx))
                .with_context(|| format!("column '{}'", col.name))?;
        }
    }

    Table::from_columns(columns)
}

fn empty_column_for(dt: &DataType) -> ColumnData {
    if dt.is_numeric() {
        ColumnData::Numeric(Vec::new())
    } else if matches!(
        dt,
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64
    ) {
        ColumnData::Timestamp(Vec::new())
    } else {
        ColumnData::Text(Vec::new())
    }
}

fn append_array(acc: &mut ColumnData, array: &ArrayRef) -> Result<()> {
    match acc {
        ColumnData::Numeric(out) => {
            let values = cast(array, &DataType::Float64)?;
            let values = values.as_primitive::<Float64Type>();
            out.extend((0..values.len()).map(|i| {
                if values.is_null(i) {
                    f64::NAN
                } else {
                    values.value(i)
                }
            }));
        }
        ColumnData::Timestamp(out) => {
            let values = cast(array, &DataType::Timestamp(TimeUnit::Microsecond, None))?;
            let values = values.as_primitive::<TimestampMicrosecondType>();
            out.extend((0..values.len()).map(|i| {
                if values.is_null(i) {
                    None
                } else {
                    values.value_as_datetime(i)
                }
            }));
        }
        ColumnData::Text(out) => {
            let values = cast(array, &DataType::Utf8)?;
            let Some(values) = values.as_string_opt::<i32>() else {
                bail!("cannot read {:?} as text", array.data_type());
            };
            out.extend(values.iter().map(|v| v.map(str::to_string)));
        }
    }
    Ok(())
}
