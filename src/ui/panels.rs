use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, Ui};

use deposit_ranker::data::ranking::{TOP_N_MAX, TOP_N_MIN};
use deposit_ranker::export::DEFAULT_FILE_NAME;

use crate::state::{AppState, StatusMessage};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(mut selection) = state.selection.clone() else {
        ui.label("The dataset has no usable rows.");
        return;
    };
    // Own a handle so the domains can be read while `state` is mutated.
    let dataset = Arc::clone(&state.dataset);

    ui.strong("Deposit type");
    egui::ComboBox::from_id_salt("deposit_type")
        .selected_text(&selection.deposit_type)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for value in &dataset.deposit_types {
                ui.selectable_value(&mut selection.deposit_type, value.clone(), value);
            }
        });

    ui.strong("Agency");
    egui::ComboBox::from_id_salt("agency")
        .selected_text(&selection.agency)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for value in &dataset.agencies {
                ui.selectable_value(&mut selection.agency, value.clone(), value);
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.strong("Year");
            egui::ComboBox::from_id_salt("year")
                .selected_text(selection.year.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for &value in &dataset.years {
                        ui.selectable_value(&mut selection.year, value, value.to_string());
                    }
                });
        });
        ui.vertical(|ui: &mut Ui| {
            ui.strong("Month");
            egui::ComboBox::from_id_salt("month")
                .selected_text(selection.month.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for &value in &dataset.months {
                        ui.selectable_value(&mut selection.month, value, value.to_string());
                    }
                });
        });
    });

    state.set_selection(selection);

    ui.add_space(8.0);
    ui.strong("Clients to display (Top N)");
    let mut top_n = state.top_n;
    ui.add(
        egui::Slider::new(&mut top_n, TOP_N_MIN..=TOP_N_MAX)
            .step_by(5.0)
            .integer(),
    );
    state.set_top_n(top_n);

    ui.add_space(12.0);
    ui.separator();
    if ui.button("Export to Excel").clicked() {
        save_export_dialog(state);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export pivot…").clicked() {
                save_export_dialog(state);
                ui.close_menu();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        ui.label(format!(
            "{} deposit records, {} agencies",
            state.dataset.len(),
            state.dataset.agencies.len()
        ));

        if let Some(ranking) = &state.ranking {
            ui.separator();
            ui.label(format!("{} clients shown", ranking.rows.len()));
        }

        if let Some(status) = &state.status_message {
            ui.separator();
            let color = if status.is_error() {
                Color32::RED
            } else {
                ui.visuals().weak_text_color()
            };
            ui.label(RichText::new(status.text()).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_export_dialog(state: &mut AppState) {
    state.status_message = None;
    let Some(bytes) = state.export_bytes() else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export rank / amount table")
        .set_file_name(DEFAULT_FILE_NAME)
        .add_filter("Excel", &["xlsx"])
        .save_file();

    if let Some(path) = file {
        match std::fs::write(&path, &bytes) {
            Ok(()) => log::info!("Wrote export to {}", path.display()),
            Err(e) => {
                log::error!("Failed to write {}: {e}", path.display());
                state.status_message = Some(StatusMessage::Error(format!("Error: {e}")));
            }
        }
    }
}
