use chrono::DateTime;
use eframe::egui::{RichText, ScrollArea, Ui};
use egui_plot::{Legend, Line, Plot};

use crate::data::filter::DayView;
use crate::data::model::Table;
use crate::data::schema::{Series, SeriesProbe};
use crate::state::AppState;

/// Smallest height a single chart is squeezed to before scrolling kicks in.
const MIN_CHART_HEIGHT: f32 = 140.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the stacked charts for the selected day.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let rows = match &state.view {
        DayView::Rows(rows) => rows,
        empty => {
            if let Some(diag) = empty.message() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading(diag.message);
                });
            }
            return;
        }
    };

    let Some(loaded) = state.loaded() else {
        return;
    };
    let probe = &loaded.probe;
    let colors = &state.config.colors;

    if probe.available.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("None of the charted columns are present in this file.");
        });
        return;
    }

    if !probe.missing.is_empty() {
        let names: Vec<&str> = probe.missing.iter().map(|s| s.title()).collect();
        ui.label(RichText::new(format!("Not available: {}", names.join(", "))).weak());
    }

    let x = x_values(rows, probe);
    let has_time = probe.timestamp.is_some();
    let n = probe.available.len() as f32;
    let chart_height = ((ui.available_height() - 28.0 * n) / n).max(MIN_CHART_HEIGHT);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, (series, column)) in probe.available.iter().enumerate() {
                let Some(values) = rows.numeric(column) else {
                    continue;
                };
                let is_last = i + 1 == probe.available.len();

                ui.strong(series.title());

                let mut line = Line::new(series_points(&x, values))
                    .name(series.legend())
                    .color(colors.color_for(*series))
                    .width(2.0);
                if *series == Series::AirFlow {
                    line = line.fill(0.0);
                }

                let mut plot = Plot::new(("dashboard_plot", *series))
                    .height(chart_height)
                    .legend(Legend::default())
                    .y_axis_label(series.y_label())
                    .link_axis("dashboard_x", [true, false])
                    .link_cursor("dashboard_x", [true, false])
                    .x_axis_formatter(move |mark, _range| axis_label(mark.value, has_time))
                    .label_formatter(move |name, point| {
                        format!("{name}\n{}  {:.2}", axis_label(point.x, has_time), point.y)
                    })
                    .allow_boxed_zoom(true)
                    .allow_drag(true)
                    .allow_scroll(false)
                    .allow_zoom(true);
                if is_last {
                    plot = plot.x_axis_label(if has_time { "Time (HH:MM)" } else { "Row" });
                }

                plot.show(ui, |plot_ui| {
                    plot_ui.line(line);
                });
                ui.add_space(4.0);
            }
        });
}

/// X coordinate per row: seconds since the epoch, or the row number when the
/// table has no timestamps.
fn x_values(rows: &Table, probe: &SeriesProbe) -> Vec<Option<f64>> {
    match probe
        .timestamp
        .as_deref()
        .and_then(|name| rows.timestamps(name))
    {
        Some(times) => times
            .iter()
            .map(|t| t.map(|t| t.and_utc().timestamp() as f64))
            .collect(),
        None => (0..rows.len()).map(|i| Some(i as f64)).collect(),
    }
}

/// Pair x and y, omitting rows where either is missing.
fn series_points(x: &[Option<f64>], y: &[f64]) -> Vec<[f64; 2]> {
    x.iter()
        .zip(y)
        .filter_map(|(x, &y)| match x {
            Some(x) if !y.is_nan() => Some([*x, y]),
            _ => None,
        })
        .collect()
}

fn axis_label(value: f64, has_time: bool) -> String {
    if !has_time {
        return format!("{value:.0}");
    }
    DateTime::from_timestamp(value.round() as i64, 0)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}
