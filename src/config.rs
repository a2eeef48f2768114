use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::data::month::{MonthLabeler, PivotWindow, YearMonth};
use crate::data::ranking::{TOP_N_DEFAULT, TOP_N_MAX, TOP_N_MIN};
use crate::export::DEFAULT_FILE_NAME;

/// Command-line / environment configuration.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "deposit-ranker",
    version,
    about = "Rank clients by deposits per agency and month"
)]
pub struct Config {
    /// Deposit file (xlsx, xls, ods, csv, parquet or json)
    #[arg(env = "DEPOSITS_FILE", default_value = "deposits.xlsx")]
    pub path: PathBuf,

    /// Worksheet to read; defaults to the first sheet
    #[arg(long, env = "DEPOSITS_SHEET")]
    pub sheet: Option<String>,

    /// Locale for month names, e.g. en_US or fr_FR
    #[arg(long, env = "DEPOSITS_LOCALE", default_value = "en_US")]
    pub locale: String,

    /// Render month columns as MM/YYYY instead of names
    #[arg(long)]
    pub numeric_months: bool,

    /// First month of the pivot window (YYYY-MM)
    #[arg(long, default_value = "2024-01")]
    pub window_start: YearMonth,

    /// Last month of the pivot window (YYYY-MM)
    #[arg(long, default_value = "2025-04")]
    pub window_end: YearMonth,

    /// Number of clients in the chart
    #[arg(long, default_value_t = TOP_N_DEFAULT, value_parser = parse_top_n)]
    pub top_n: usize,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the ranking and pivot for one selection as JSON
    Report {
        #[arg(long = "type")]
        deposit_type: String,
        #[arg(long)]
        agency: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
    /// Write the pivot for one agency and deposit type to an xlsx file
    Export {
        #[arg(long = "type")]
        deposit_type: String,
        #[arg(long)]
        agency: String,
        #[arg(short, long, default_value = DEFAULT_FILE_NAME)]
        out: PathBuf,
    },
}

impl Config {
    pub fn window(&self) -> Result<PivotWindow> {
        PivotWindow::new(self.window_start, self.window_end)
    }

    pub fn labeler(&self) -> MonthLabeler {
        if self.numeric_months {
            MonthLabeler::numeric()
        } else {
            MonthLabeler::for_locale(&self.locale)
        }
    }
}

fn parse_top_n(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if !(TOP_N_MIN..=TOP_N_MAX).contains(&n) {
        return Err(format!("must be between {TOP_N_MIN} and {TOP_N_MAX}"));
    }
    Ok(n)
}
