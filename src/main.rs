mod app;
mod color;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use deposit_ranker::config::{Command, Config};
use deposit_ranker::data::filter::FilterSelection;
use deposit_ranker::data::loader::load_file;
use deposit_ranker::data::model::DepositDataset;
use deposit_ranker::data::month::{MonthLabeler, PivotWindow};
use deposit_ranker::export::export_pivot;
use deposit_ranker::report::Report;

use app::DepositRankerApp;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::parse();
    let window = config.window()?;
    let labeler = config.labeler();

    let dataset = match load_file(&config.path, config.sheet.as_deref()) {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load {}: {e:#}", config.path.display());
            return Err(e.context(format!("loading {}", config.path.display())));
        }
    };
    log::info!(
        "Loaded {} deposit records ({} types, {} agencies)",
        dataset.len(),
        dataset.deposit_types.len(),
        dataset.agencies.len()
    );
    let dataset = Arc::new(dataset);

    match config.command.clone() {
        None => run_gui(dataset, window, labeler, config.top_n),
        Some(Command::Report {
            deposit_type,
            agency,
            year,
            month,
        }) => {
            let selection = FilterSelection {
                deposit_type,
                agency,
                year,
                month,
            };
            let report = Report::build(&dataset, selection, config.top_n, &window, &labeler);
            let json = serde_json::to_string_pretty(&report).context("serializing report")?;
            println!("{json}");
            Ok(())
        }
        Some(Command::Export {
            deposit_type,
            agency,
            out,
        }) => match export_pivot(&dataset, &agency, &deposit_type, &window, &labeler)? {
            Some(bytes) => {
                std::fs::write(&out, bytes)
                    .with_context(|| format!("writing {}", out.display()))?;
                println!("Wrote {}", out.display());
                Ok(())
            }
            None => {
                println!("Nothing to export for {deposit_type} / {agency}; no file written");
                Ok(())
            }
        },
    }
}

fn run_gui(
    dataset: Arc<DepositDataset>,
    window: PivotWindow,
    labeler: MonthLabeler,
    top_n: usize,
) -> Result<()> {
    let state = AppState::new(dataset, window, labeler, top_n);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Client Deposit Ranking",
        options,
        Box::new(|_cc| Ok(Box::new(DepositRankerApp::new(state)))),
    )
    .map_err(|e| anyhow!("GUI error: {e}"))
}
