use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, HLine, Legend, Plot};

use deposit_ranker::data::ranking::format_amount;

use crate::color::{bar_colors, threshold_color};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Ranking chart (central panel)
// ---------------------------------------------------------------------------

/// Bar chart of the top-N clients: x = rank, y = amount.
pub fn ranking_chart(ui: &mut Ui, state: &AppState) {
    let Some(ranking) = &state.ranking else {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add_space(40.0);
            ui.heading("No data available for this selection");
            ui.add_space(40.0);
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(ranking.title());
    });

    let bars: Vec<Bar> = ranking
        .rows
        .iter()
        .zip(bar_colors(ranking))
        .map(|(row, color)| {
            Bar::new(row.rank as f64, row.amount)
                .name(&row.client)
                .fill(color)
                .width(0.8)
        })
        .collect();

    let chart = BarChart::new(bars)
        .name("Clients")
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!(
                "Client: {}\nAmount: {} MRU\nRank: {}",
                bar.name,
                format_amount(bar.value),
                bar.argument
            )
        }));

    let threshold = HLine::new(ranking.stats.threshold)
        .name("80th percentile")
        .color(threshold_color());

    Plot::new("ranking_chart")
        .height(500.0)
        .legend(Legend::default())
        .x_axis_label("Rank")
        .y_axis_label("Amount deposited (MRU)")
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            plot_ui.hline(threshold);
        });
}
