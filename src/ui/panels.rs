use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::error::{Diagnostic, Level};
use crate::data::filter::DayView;
use crate::data::schema::Series;
use crate::data::source::SourceLocation;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – date selection and series availability
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    match state.date_range {
        Some(range) => {
            let mut picked = state.selected_date().unwrap_or(range.min);

            ui.strong("Select Date");
            ui.horizontal(|ui: &mut Ui| {
                if ui
                    .add_enabled(picked > range.min, egui::Button::new("◀"))
                    .on_hover_text("Previous day")
                    .clicked()
                {
                    state.step_day(-1);
                }

                let response = ui.add(
                    DatePickerButton::new(&mut picked)
                        .id_salt("selected_date")
                        .calendar_week(false),
                );
                // the picker offers any day; the state clamps it into range
                if response.changed() {
                    state.select_date(picked);
                }

                if ui
                    .add_enabled(picked < range.max, egui::Button::new("▶"))
                    .on_hover_text("Next day")
                    .clicked()
                {
                    state.step_day(1);
                }
            });
            ui.label(RichText::new(format!("Data from {} to {}", range.min, range.max)).weak());
        }
        None => {
            ui.label("No dates available.");
        }
    }

    ui.separator();

    let Some(loaded) = state.loaded() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Series");
            for series in Series::ALL {
                match loaded.probe.column_for(series) {
                    Some(column) => {
                        let color = state.config.colors.color_for(series);
                        ui.label(RichText::new(format!("● {}", series.title())).color(color))
                            .on_hover_text(format!("column '{column}'"));
                    }
                    None => {
                        ui.label(RichText::new(format!("○ {} (missing)", series.title())).weak());
                    }
                }
            }

            ui.separator();
            egui::CollapsingHeader::new(RichText::new("Columns").strong())
                .id_salt("columns")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for col in loaded.table.columns() {
                        ui.label(format!("{}  ({})", col.name, col.data.kind()));
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(source) = &state.source {
            ui.label(RichText::new(source.to_string()).monospace());
        }

        if let Some(table) = state.table() {
            let shown = match &state.view {
                DayView::Rows(rows) => rows.len(),
                _ => 0,
            };
            ui.label(format!("{} rows loaded, {shown} on selected date", table.len()));
        }

        ui.separator();

        ui.checkbox(&mut state.show_debug, "Debug");
    });

    for diag in state.visible_diagnostics() {
        ui.label(RichText::new(diag.message.as_str()).color(level_color(diag)));
    }
}

fn level_color(diag: &Diagnostic) -> Color32 {
    match diag.level {
        Level::Error => Color32::RED,
        Level::Warning => Color32::from_rgb(0xd9, 0x77, 0x06),
        Level::Info => Color32::LIGHT_BLUE,
        Level::Debug => Color32::GRAY,
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open boiler readings")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.load_source(SourceLocation::Path(path));
    }
}
