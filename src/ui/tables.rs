use eframe::egui::{self, Align, Layout, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use deposit_ranker::data::pivot::RankedPivot;
use deposit_ranker::data::ranking::{format_amount, Ranking};

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Exposure statistics (7 fixed rows)
// ---------------------------------------------------------------------------

pub fn stats_table(ui: &mut Ui, ranking: Option<&Ranking>) {
    let Some(ranking) = ranking else {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label("No data available");
        });
        return;
    };

    let rows = ranking.stats.indicator_rows();
    ui.push_id("stats_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(Column::auto().at_least(260.0))
            .column(Column::auto().at_least(140.0))
            .header(ROW_HEIGHT, |mut header| {
                header.col(|ui| {
                    ui.strong("Indicator");
                });
                header.col(|ui| {
                    ui.strong("Value");
                });
            })
            .body(|mut body| {
                for (indicator, value) in &rows {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.label(*indicator);
                        });
                        row.col(|ui| {
                            ui.label(value);
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Rank / amount pivot
// ---------------------------------------------------------------------------

pub fn pivot_table(ui: &mut Ui, pivot: Option<&RankedPivot>) {
    let Some(pivot) = pivot else {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label("Nothing to display");
        });
        return;
    };

    let headers = pivot.column_names();
    ui.push_id("pivot_table", |ui: &mut Ui| {
        ScrollArea::horizontal()
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .max_scroll_height(420.0)
                    .cell_layout(Layout::centered_and_justified(egui::Direction::LeftToRight))
                    .column(Column::auto().at_least(110.0))
                    .columns(Column::auto().at_least(90.0), headers.len() - 1)
                    .header(ROW_HEIGHT, |mut header| {
                        for name in &headers {
                            header.col(|ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(ROW_HEIGHT, pivot.rows.len(), |mut row| {
                            let Some(data) = pivot.rows.get(row.index()) else {
                                return;
                            };
                            row.col(|ui| {
                                ui.label(&data.client);
                            });
                            for cell in &data.cells {
                                let (rank, amount) = match cell {
                                    Some(c) => (c.rank.to_string(), format_amount(c.amount)),
                                    None => (String::new(), String::new()),
                                };
                                row.col(|ui| {
                                    ui.label(rank);
                                });
                                row.col(|ui| {
                                    ui.label(amount);
                                });
                            }
                        });
                    });
            });
    });
}
