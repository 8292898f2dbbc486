use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{Diagnostic, LoadError};
use super::model::{Column, ColumnData, Table};
use super::schema::ColumnSchema;

// ---------------------------------------------------------------------------
// Normalization: raw parsed table → table the charts can use
// ---------------------------------------------------------------------------

/// Cell contents read as "no value", matching what Pandas-written CSVs use.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw cell stands for a missing value.
pub fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

/// Date-time layouts accepted in the timestamp column, tried in order.
/// Slashed dates with the year last are month-first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Layouts carrying a UTC offset; the wall-clock time is kept.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse one timestamp cell. Returns `None` for unrecognised text.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.naive_local());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// A timestamp cell with no value: a missing token or Pandas' `NaT`.
fn is_missing_time(cell: &str) -> bool {
    is_missing(cell) || cell.trim() == "NaT"
}

/// Trim header names, parse the timestamp column and derive the scaling
/// delta. Non-fatal findings are returned as diagnostics.
pub fn normalize(
    mut table: Table,
    schema: &ColumnSchema,
) -> Result<(Table, Vec<Diagnostic>), LoadError> {
    let mut diagnostics = Vec::new();

    for col in table.columns_mut() {
        let trimmed = col.name.trim();
        if trimmed.len() != col.name.len() {
            col.name = trimmed.to_string();
        }
    }

    parse_timestamp_column(&mut table, &schema.timestamp)?;

    if let Some(diag) = derive_scaling_delta(&mut table, schema) {
        diagnostics.push(diag);
    }

    Ok((table, diagnostics))
}

fn parse_timestamp_column(table: &mut Table, name: &str) -> Result<(), LoadError> {
    let Some(col) = table.columns_mut().iter_mut().find(|c| c.name == name) else {
        return Ok(());
    };

    let malformed = |row: usize, value: String| LoadError::MalformedTimestamp {
        column: name.to_string(),
        row,
        value,
    };

    let parsed: Vec<Option<NaiveDateTime>> = match &col.data {
        ColumnData::Timestamp(_) => return Ok(()),
        ColumnData::Text(cells) => cells
            .iter()
            .enumerate()
            .map(|(row, cell)| match cell.as_deref().map(str::trim) {
                None => Ok(None),
                Some(s) if is_missing_time(s) => Ok(None),
                Some(s) => parse_timestamp(s)
                    .map(Some)
                    .ok_or_else(|| malformed(row, s.to_string())),
            })
            .collect::<Result<_, _>>()?,
        // Bare numbers are not accepted as times; empty cells still are.
        ColumnData::Numeric(cells) => cells
            .iter()
            .enumerate()
            .map(|(row, v)| {
                if v.is_nan() {
                    Ok(None)
                } else {
                    Err(malformed(row, v.to_string()))
                }
            })
            .collect::<Result<_, _>>()?,
    };

    col.data = ColumnData::Timestamp(parsed);
    Ok(())
}

/// Append `stack - steam` when both temperature columns are numeric.
fn derive_scaling_delta(table: &mut Table, schema: &ColumnSchema) -> Option<Diagnostic> {
    let has_stack = table.has_column(&schema.stack_temp);
    let has_steam = table.has_column(&schema.steam_temp);
    if !has_stack || !has_steam {
        return None;
    }

    let (Some(stack), Some(steam)) = (
        table.numeric(&schema.stack_temp),
        table.numeric(&schema.steam_temp),
    ) else {
        return Some(Diagnostic::warning(format!(
            "'{}' and '{}' must both be numeric to compute {}",
            schema.stack_temp, schema.steam_temp, schema.scaling_delta
        )));
    };

    let delta: Vec<f64> = stack.iter().zip(steam).map(|(a, b)| a - b).collect();

    // Assigning over an existing column replaces it.
    let mut columns: Vec<Column> = table
        .columns()
        .iter()
        .filter(|c| c.name != schema.scaling_delta)
        .cloned()
        .collect();
    columns.push(Column::new(
        schema.scaling_delta.clone(),
        ColumnData::Numeric(delta),
    ));
    match Table::from_columns(columns) {
        Ok(t) => {
            *table = t;
            None
        }
        Err(e) => Some(Diagnostic::warning(format!(
            "cannot add {}: {e:#}",
            schema.scaling_delta
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn text(v: &[&str]) -> ColumnData {
        ColumnData::Text(v.iter().map(|s| Some(s.to_string())).collect())
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(parse_timestamp("2024-01-01 08:00"), Some(dt("2024-01-01 08:00:00")));
        assert_eq!(parse_timestamp("2024-01-01 08:00:05"), Some(dt("2024-01-01 08:00:05")));
        assert_eq!(parse_timestamp("2024-01-01T08:00:05"), Some(dt("2024-01-01 08:00:05")));
        assert_eq!(parse_timestamp("2024/01/01 08:00:05"), Some(dt("2024-01-01 08:00:05")));
        assert_eq!(parse_timestamp(" 2024-01-01 "), Some(dt("2024-01-01 00:00:00")));
        assert_eq!(
            parse_timestamp("2024-01-01T23:30:00+02:00"),
            Some(dt("2024-01-01 23:30:00"))
        );
        let frac = parse_timestamp("2024-01-01 08:00:05.250").unwrap();
        assert_eq!(frac.and_utc().timestamp_subsec_millis(), 250);
        assert_eq!(parse_timestamp("01/02/2024 08:00"), Some(dt("2024-01-02 08:00:00")));
        assert_eq!(parse_timestamp("01/02/2024 08:00:30"), Some(dt("2024-01-02 08:00:30")));
        assert_eq!(parse_timestamp("1/2/2024 8:00"), Some(dt("2024-01-02 08:00:00")));
        assert_eq!(parse_timestamp("12/31/2024"), Some(dt("2024-12-31 00:00:00")));
        assert_eq!(
            parse_timestamp("2024-01-01 08:00:00 +0530"),
            Some(dt("2024-01-01 08:00:00"))
        );
        assert_eq!(
            parse_timestamp("2024-01-01 08:00:00+05:30"),
            Some(dt("2024-01-01 08:00:00"))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("13/25/2024 08:00"), None);
    }

    #[test]
    fn missing_tokens() {
        for cell in ["", "  ", "NA", "N/A", "NULL", "null", "nan", "NaN", "#N/A", "<NA>", "None"] {
            assert!(is_missing(cell), "{cell:?}");
        }
        assert!(!is_missing("0"));
        assert!(!is_missing("NaT"));
        assert!(is_missing_time("NaT"));
    }

    #[test]
    fn nat_and_na_timestamp_cells_are_missing() {
        let raw = Table::from_columns(vec![Column::new(
            "Timestamp",
            text(&["2024-01-01 08:00", "NaT", "NA", "1/2/2024 8:00"]),
        )])
        .unwrap();
        let (t, _) = normalize(raw, &ColumnSchema::default()).unwrap();
        let ts = t.timestamps("Timestamp").unwrap();
        assert_eq!(ts[1], None);
        assert_eq!(ts[2], None);
        assert_eq!(ts[3], Some(dt("2024-01-02 08:00:00")));
    }

    #[test]
    fn header_whitespace_is_trimmed() {
        let raw = Table::from_columns(vec![
            Column::new(" Timestamp ", text(&["2024-01-01 08:00"])),
            Column::new("Air flow % ", ColumnData::Numeric(vec![42.0])),
        ])
        .unwrap();
        let (t, _) = normalize(raw, &ColumnSchema::default()).unwrap();
        assert!(t.timestamps("Timestamp").is_some());
        assert_eq!(t.numeric("Air flow %"), Some(&[42.0][..]));
    }

    #[test]
    fn scaling_delta_law() {
        let raw = Table::from_columns(vec![
            Column::new("Timestamp", text(&["2024-01-01 08:00", "2024-01-02 08:00"])),
            Column::new("StackTempMbus", ColumnData::Numeric(vec![310.0, 300.0])),
            Column::new("SteamTempMbus", ColumnData::Numeric(vec![280.0, 275.0])),
        ])
        .unwrap();
        let (t, diags) = normalize(raw, &ColumnSchema::default()).unwrap();
        assert!(diags.is_empty());
        assert_eq!(t.numeric("Scaling_Delta"), Some(&[30.0, 25.0][..]));
        assert_eq!(t.len(), 2);
        let ts = t.timestamps("Timestamp").unwrap();
        assert_eq!(ts[1].unwrap().day(), 2);
    }

    #[test]
    fn scaling_delta_absent_without_both_sources() {
        let raw = Table::from_columns(vec![Column::new(
            "StackTempMbus",
            ColumnData::Numeric(vec![310.0]),
        )])
        .unwrap();
        let (t, _) = normalize(raw, &ColumnSchema::default()).unwrap();
        assert!(!t.has_column("Scaling_Delta"));
    }

    #[test]
    fn scaling_delta_propagates_missing_values() {
        let raw = Table::from_columns(vec![
            Column::new("StackTempMbus", ColumnData::Numeric(vec![f64::NAN, 300.0])),
            Column::new("SteamTempMbus", ColumnData::Numeric(vec![280.0, 275.0])),
        ])
        .unwrap();
        let (t, _) = normalize(raw, &ColumnSchema::default()).unwrap();
        let delta = t.numeric("Scaling_Delta").unwrap();
        assert!(delta[0].is_nan());
        assert_eq!(delta[1], 25.0);
    }

    #[test]
    fn scaling_delta_overwrites_existing_column() {
        let raw = Table::from_columns(vec![
            Column::new("Scaling_Delta", ColumnData::Numeric(vec![0.0])),
            Column::new("StackTempMbus", ColumnData::Numeric(vec![310.0])),
            Column::new("SteamTempMbus", ColumnData::Numeric(vec![280.0])),
        ])
        .unwrap();
        let (t, _) = normalize(raw, &ColumnSchema::default()).unwrap();
        assert_eq!(
            t.column_names(),
            vec!["StackTempMbus", "SteamTempMbus", "Scaling_Delta"]
        );
        assert_eq!(t.numeric("Scaling_Delta"), Some(&[30.0][..]));
    }

    #[test]
    fn non_numeric_temperature_warns() {
        let raw = Table::from_columns(vec![
            Column::new("StackTempMbus", text(&["hot"])),
            Column::new("SteamTempMbus", ColumnData::Numeric(vec![280.0])),
        ])
        .unwrap();
        let (t, diags) = normalize(raw, &ColumnSchema::default()).unwrap();
        assert!(!t.has_column("Scaling_Delta"));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn malformed_timestamp_fails_the_load() {
        let raw = Table::from_columns(vec![Column::new(
            "Timestamp",
            text(&["2024-01-01 08:00", "not a time"]),
        )])
        .unwrap();
        let err = normalize(raw, &ColumnSchema::default()).unwrap_err();
        match err {
            LoadError::MalformedTimestamp { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "not a time");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_timestamp_cells_are_missing() {
        let raw = Table::from_columns(vec![Column::new(
            "Timestamp",
            ColumnData::Text(vec![Some("2024-01-01 08:00".into()), None]),
        )])
        .unwrap();
        let (t, _) = normalize(raw, &ColumnSchema::default()).unwrap();
        assert_eq!(t.timestamps("Timestamp").unwrap()[1], None);
    }

    #[test]
    fn numeric_timestamp_column_is_malformed() {
        let raw = Table::from_columns(vec![Column::new(
            "Timestamp",
            ColumnData::Numeric(vec![20240101.0]),
        )])
        .unwrap();
        assert!(matches!(
            normalize(raw, &ColumnSchema::default()),
            Err(LoadError::MalformedTimestamp { .. })
        ));
    }
}
