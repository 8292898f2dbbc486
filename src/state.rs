use chrono::{Days, NaiveDate};

use crate::config::AppConfig;
use crate::data::cache::SourceCache;
use crate::data::error::{Diagnostic, Level};
use crate::data::filter::{DateRange, DayView, date_bounds};
use crate::data::loader::{LoadOutcome, LoadedTable};
use crate::data::model::Table;
use crate::data::source::SourceLocation;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Memoized loads, shared by every (re)load in this process.
    cache: SourceCache,

    /// Location currently shown (None until something is loaded).
    pub source: Option<SourceLocation>,

    /// Result of the last load.
    pub outcome: Option<LoadOutcome>,

    /// Dates the operator may pick from.
    pub date_range: Option<DateRange>,

    /// Always inside `date_range` when that is set.
    selected_date: Option<NaiveDate>,

    /// Rows for the selected date (cached until the date or source changes).
    pub view: DayView,

    /// Messages from the last load.
    pub diagnostics: Vec<Diagnostic>,

    /// Whether debug-level diagnostics are shown.
    pub show_debug: bool,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cache: SourceCache::new(),
            source: None,
            outcome: None,
            date_range: None,
            selected_date: None,
            view: DayView::NoData,
            diagnostics: Vec::new(),
            show_debug: false,
        }
    }

    /// Load (or fetch from cache) `location` and reset the date selection to
    /// its first day.
    pub fn load_source(&mut self, location: SourceLocation) {
        let outcome = self.cache.load(&location, &self.config.load_options());
        if let Some(err) = outcome.error() {
            log::warn!("showing an empty table for {location}: {err}");
        }

        self.diagnostics = outcome.diagnostics();
        for diag in &self.diagnostics {
            log::debug!("{diag}");
        }
        self.date_range = date_bounds(outcome.table(), &self.config.schema.timestamp);
        self.selected_date = self.date_range.map(|r| r.min);
        self.source = Some(location);
        self.outcome = Some(outcome);
        self.refresh_view();
    }

    /// Load whatever the config points at.
    pub fn load_configured_source(&mut self) {
        let location = SourceLocation::parse(&self.config.source);
        self.load_source(location);
    }

    /// Forget the cached table for the current source and load it again.
    pub fn reload(&mut self) {
        let Some(location) = self.source.clone() else {
            return;
        };
        self.cache.forget(&location, &self.config.load_options());
        let keep = self.selected_date;
        self.load_source(location);
        if let Some(date) = keep {
            self.select_date(date);
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// Select `date`, pulled into the available range.
    pub fn select_date(&mut self, date: NaiveDate) {
        let Some(range) = self.date_range else {
            return;
        };
        let date = range.clamp(date);
        if self.selected_date != Some(date) {
            self.selected_date = Some(date);
            self.refresh_view();
        }
    }

    /// Move the selection by `days` (negative goes back).
    pub fn step_day(&mut self, days: i64) {
        let Some(current) = self.selected_date else {
            return;
        };
        let moved = if days >= 0 {
            current.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            current.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.select_date(date);
        }
    }

    pub fn loaded(&self) -> Option<&LoadedTable> {
        self.outcome.as_ref()?.loaded().map(|t| t.as_ref())
    }

    pub fn table(&self) -> Option<&Table> {
        self.outcome.as_ref().map(|o| o.table())
    }

    /// Diagnostics to display, hiding debug output unless enabled.
    pub fn visible_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        let min = if self.show_debug {
            Level::Debug
        } else {
            Level::Info
        };
        self.diagnostics.iter().filter(move |d| d.level >= min)
    }

    fn refresh_view(&mut self) {
        let table = self.outcome.as_ref().map(|o| o.table());
        self.view = match self.selected_date {
            Some(date) => DayView::build(table, &self.config.schema.timestamp, date),
            // no usable timestamps: nothing to filter by, show everything
            None => match table {
                Some(t) if !t.is_empty() => DayView::Rows(t.clone()),
                _ => DayView::NoData,
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const THREE_DAYS: &str = "\
Timestamp,Air flow %,StackTempMbus,SteamTempMbus,SteamPrMbus,StackO2Mbus
2024-01-01 08:00,40,310,280,10.1,4.2
2024-01-01 09:00,42,312,281,10.2,4.1
2024-01-03 08:00,45,300,275,10.0,4.4
";

    #[test]
    fn load_selects_first_day() {
        let file = csv_file(THREE_DAYS);
        let mut state = AppState::new(AppConfig::default());
        state.load_source(SourceLocation::Path(file.path().to_path_buf()));

        assert_eq!(state.selected_date(), Some(date("2024-01-01")));
        assert_eq!(
            state.date_range,
            Some(DateRange {
                min: date("2024-01-01"),
                max: date("2024-01-03"),
            })
        );
        assert!(matches!(&state.view, DayView::Rows(t) if t.len() == 2));
        assert!(state.diagnostics.is_empty());
    }

    #[test]
    fn selection_is_clamped_and_gaps_are_reported() {
        let file = csv_file(THREE_DAYS);
        let mut state = AppState::new(AppConfig::default());
        state.load_source(SourceLocation::Path(file.path().to_path_buf()));

        state.select_date(date("2030-01-01"));
        assert_eq!(state.selected_date(), Some(date("2024-01-03")));
        assert!(matches!(&state.view, DayView::Rows(t) if t.len() == 1));

        state.step_day(-1);
        assert_eq!(state.view, DayView::NoRowsForDate(date("2024-01-02")));

        state.step_day(-10);
        assert_eq!(state.selected_date(), Some(date("2024-01-01")));
    }

    #[test]
    fn out_of_range_pick_never_reaches_the_view() {
        let file = csv_file(THREE_DAYS);
        let mut state = AppState::new(AppConfig::default());
        state.load_source(SourceLocation::Path(file.path().to_path_buf()));

        for picked in ["2023-12-31", "2019-06-15", "2024-01-04", "2031-02-28"] {
            state.select_date(date(picked));
            let range = state.date_range.unwrap();
            let selected = state.selected_date().unwrap();
            assert!(selected >= range.min && selected <= range.max);
            match &state.view {
                DayView::Rows(rows) => {
                    let times = rows.timestamps("Timestamp").unwrap();
                    assert!(times.iter().flatten().all(|t| t.date() == selected));
                }
                other => panic!("picked {picked}, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_source_shows_no_data() {
        let mut state = AppState::new(AppConfig::default());
        state.load_source(SourceLocation::parse("/no/such/file.csv"));

        assert_eq!(state.view, DayView::NoData);
        assert_eq!(state.selected_date(), None);
        assert_eq!(state.visible_diagnostics().count(), 1);
    }

    #[test]
    fn table_without_timestamps_is_shown_whole() {
        let file = csv_file("SteamPrMbus\n10.0\n10.5\n");
        let mut state = AppState::new(AppConfig::default());
        state.load_source(SourceLocation::Path(file.path().to_path_buf()));

        assert!(matches!(&state.view, DayView::Rows(t) if t.len() == 2));
        // the debug column listing stays hidden until asked for
        let shown = state.visible_diagnostics().count();
        state.show_debug = true;
        assert_eq!(state.visible_diagnostics().count(), shown + 1);
    }

    #[test]
    fn reload_rereads_the_file_and_keeps_the_date() {
        let file = csv_file(THREE_DAYS);
        let mut state = AppState::new(AppConfig::default());
        state.load_source(SourceLocation::Path(file.path().to_path_buf()));
        state.select_date(date("2024-01-03"));

        std::fs::write(
            file.path(),
            "Timestamp,SteamPrMbus\n2024-01-03 08:00,9.0\n2024-01-03 09:00,9.5\n",
        )
        .unwrap();
        state.reload();

        assert_eq!(state.selected_date(), Some(date("2024-01-03")));
        assert!(matches!(&state.view, DayView::Rows(t) if t.len() == 2));
    }
}
