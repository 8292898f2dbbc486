use chrono::NaiveDate;

use super::error::Diagnostic;
use super::model::Table;

// ---------------------------------------------------------------------------
// Date range offered to the operator
// ---------------------------------------------------------------------------

/// Inclusive range of calendar dates present in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateRange {
    /// Pull `date` into the range.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min, self.max)
    }
}

/// Min / max timestamp dates, ignoring missing cells.
///
/// `None` when the column is absent or holds no times at all.
pub fn date_bounds(table: &Table, timestamp_column: &str) -> Option<DateRange> {
    let times = table.timestamps(timestamp_column)?;
    let mut dates = times.iter().flatten().map(|t| t.date());
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(DateRange { min, max })
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Rows whose timestamp falls on `date`, in source order.
///
/// Without a timestamp column the table is returned unchanged.
pub fn filter_by_date(table: &Table, timestamp_column: &str, date: NaiveDate) -> Table {
    let Some(times) = table.timestamps(timestamp_column) else {
        return table.clone();
    };

    let indices: Vec<usize> = times
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_some_and(|t| t.date() == date))
        .map(|(i, _)| i)
        .collect();

    table.take_rows(&indices)
}

/// What the chart area should show for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum DayView {
    /// Nothing loaded, or the loaded table has no rows.
    NoData,
    /// Data exists, just not on this date.
    NoRowsForDate(NaiveDate),
    /// Rows to plot.
    Rows(Table),
}

impl DayView {
    pub fn build(table: Option<&Table>, timestamp_column: &str, date: NaiveDate) -> Self {
        match table {
            None => DayView::NoData,
            Some(t) if t.is_empty() => DayView::NoData,
            Some(t) => {
                let rows = filter_by_date(t, timestamp_column, date);
                if rows.is_empty() {
                    DayView::NoRowsForDate(date)
                } else {
                    DayView::Rows(rows)
                }
            }
        }
    }

    /// Operator-facing message for the empty states.
    pub fn message(&self) -> Option<Diagnostic> {
        match self {
            DayView::NoData => Some(Diagnostic::warning(
                "No data loaded. Check the source, or use File → Open…",
            )),
            DayView::NoRowsForDate(date) => Some(Diagnostic::info(format!(
                "No data available for {date}."
            ))),
            DayView::Rows(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnData};
    use chrono::{Duration, NaiveDateTime};
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(s: &str) -> Option<NaiveDateTime> {
        Some(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap())
    }

    fn readings(times: Vec<Option<NaiveDateTime>>) -> Table {
        let values = (0..times.len()).map(|i| i as f64).collect();
        Table::from_columns(vec![
            Column::new("Timestamp", ColumnData::Timestamp(times)),
            Column::new("SteamPrMbus", ColumnData::Numeric(values)),
        ])
        .unwrap()
    }

    #[test]
    fn picks_rows_of_the_day_in_order() {
        let t = readings(vec![
            at("2024-01-02 23:59"),
            at("2024-01-01 08:00"),
            None,
            at("2024-01-02 00:00"),
        ]);
        let day = filter_by_date(&t, "Timestamp", date("2024-01-02"));
        assert_eq!(day.numeric("SteamPrMbus"), Some(&[0.0, 3.0][..]));
    }

    #[test]
    fn scenario_first_day_only() {
        let t = Table::from_columns(vec![
            Column::new(
                "Timestamp",
                ColumnData::Timestamp(vec![at("2024-01-01 08:00"), at("2024-01-02 08:00")]),
            ),
            Column::new("Scaling_Delta", ColumnData::Numeric(vec![30.0, 25.0])),
        ])
        .unwrap();
        let day = filter_by_date(&t, "Timestamp", date("2024-01-01"));
        assert_eq!(day.len(), 1);
        assert_eq!(day.numeric("Scaling_Delta"), Some(&[30.0][..]));
    }

    #[test]
    fn no_timestamp_column_is_a_no_op() {
        let t = Table::from_columns(vec![Column::new(
            "SteamPrMbus",
            ColumnData::Numeric(vec![1.0, 2.0]),
        )])
        .unwrap();
        assert_eq!(filter_by_date(&t, "Timestamp", date("2024-01-01")), t);
    }

    #[test]
    fn zero_rows_in_zero_rows_out() {
        let t = readings(Vec::new());
        assert!(filter_by_date(&t, "Timestamp", date("2024-01-01")).is_empty());
        assert!(filter_by_date(&Table::empty(), "Timestamp", date("2024-01-01")).is_empty());
    }

    #[test]
    fn bounds_ignore_missing_times() {
        let t = readings(vec![None, at("2024-03-05 10:00"), at("2024-03-01 01:00")]);
        assert_eq!(
            date_bounds(&t, "Timestamp"),
            Some(DateRange {
                min: date("2024-03-01"),
                max: date("2024-03-05"),
            })
        );
        assert_eq!(date_bounds(&readings(vec![None]), "Timestamp"), None);
        assert_eq!(date_bounds(&Table::empty(), "Timestamp"), None);
    }

    #[test]
    fn clamp_stays_in_range() {
        let r = DateRange {
            min: date("2024-03-01"),
            max: date("2024-03-05"),
        };
        assert_eq!(r.clamp(date("2024-02-01")), date("2024-03-01"));
        assert_eq!(r.clamp(date("2024-04-01")), date("2024-03-05"));
        assert_eq!(r.clamp(date("2024-03-03")), date("2024-03-03"));
    }

    #[test]
    fn day_view_distinguishes_empty_states() {
        let d = date("2024-01-01");
        assert_eq!(DayView::build(None, "Timestamp", d), DayView::NoData);
        assert_eq!(
            DayView::build(Some(&Table::empty()), "Timestamp", d),
            DayView::NoData
        );

        let t = readings(vec![at("2024-01-02 08:00")]);
        assert_eq!(
            DayView::build(Some(&t), "Timestamp", d),
            DayView::NoRowsForDate(d)
        );
        assert!(matches!(
            DayView::build(Some(&t), "Timestamp", date("2024-01-02")),
            DayView::Rows(rows) if rows.len() == 1
        ));
    }

    #[test]
    fn empty_states_have_distinct_messages() {
        use crate::data::error::Level;

        let none = DayView::NoData.message().unwrap();
        let gap = DayView::NoRowsForDate(date("2024-01-02")).message().unwrap();
        assert_eq!(none.level, Level::Warning);
        assert_eq!(gap.level, Level::Info);
        assert!(gap.message.contains("2024-01-02"));
        assert!(DayView::Rows(Table::empty()).message().is_none());
    }

    proptest! {
        #[test]
        fn filter_keeps_exactly_the_matching_rows(
            offsets in proptest::collection::vec(proptest::option::of(0i64..5 * 24 * 60), 0..60),
            day in 0i64..5,
        ) {
            let base = at("2024-01-01 00:00").unwrap();
            let times: Vec<Option<NaiveDateTime>> = offsets
                .iter()
                .map(|o| o.map(|m| base + Duration::minutes(m)))
                .collect();
            let wanted = base.date() + Duration::days(day);
            let t = readings(times.clone());

            let out = filter_by_date(&t, "Timestamp", wanted);

            let expected: Vec<f64> = times
                .iter()
                .enumerate()
                .filter(|(_, t)| t.map(|t| t.date()) == Some(wanted))
                .map(|(i, _)| i as f64)
                .collect();
            prop_assert_eq!(out.numeric("SteamPrMbus").unwrap(), &expected[..]);
        }
    }
}
