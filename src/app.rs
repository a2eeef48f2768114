use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DepositRankerApp {
    pub state: AppState,
}

impl DepositRankerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DepositRankerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters, top N, export ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart and both tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    plot::ranking_chart(ui, &self.state);

                    ui.add_space(12.0);
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.heading("Deposit statistics");
                    });
                    tables::stats_table(ui, self.state.ranking.as_ref());

                    ui.add_space(12.0);
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.heading("Rank and amount by client and month");
                    });
                    tables::pivot_table(ui, self.state.pivot.as_ref());
                });
        });
    }
}
