use std::fmt::{self, Write};
use std::str::FromStr;

use anyhow::{bail, Context};
use chrono::{Locale, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// YearMonth – a calendar month, ordered chronologically
// ---------------------------------------------------------------------------

/// Years accepted when parsing a month from the command line.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub const fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    /// The following calendar month, `None` past `i32::MAX`.
    pub fn succ(self) -> Option<Self> {
        if self.month >= 12 {
            Some(YearMonth::new(self.year.checked_add(1)?, 1))
        } else {
            Some(YearMonth::new(self.year, self.month + 1))
        }
    }

    /// First day of the month, `None` when the month is out of range.
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parses `YYYY-MM`.
impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .with_context(|| format!("expected YYYY-MM, got '{s}'"))?;
        let year: i32 = year.parse().with_context(|| format!("invalid year in '{s}'"))?;
        let month: u32 = month.parse().with_context(|| format!("invalid month in '{s}'"))?;
        if !YEAR_RANGE.contains(&year) {
            bail!(
                "year must be within {}..={}, got {year}",
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            );
        }
        if !(1..=12).contains(&month) {
            bail!("month must be within 1..=12, got {month}");
        }
        Ok(YearMonth::new(year, month))
    }
}

// ---------------------------------------------------------------------------
// PivotWindow – the fixed run of months covered by the pivot
// ---------------------------------------------------------------------------

/// Inclusive month range.  Defaults to January 2024 through April 2025.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PivotWindow {
    pub start: YearMonth,
    pub end: YearMonth,
}

impl Default for PivotWindow {
    fn default() -> Self {
        PivotWindow {
            start: YearMonth::new(2024, 1),
            end: YearMonth::new(2025, 4),
        }
    }
}

impl PivotWindow {
    pub fn new(start: YearMonth, end: YearMonth) -> anyhow::Result<Self> {
        if start > end {
            bail!("window start {start} is after window end {end}");
        }
        Ok(PivotWindow { start, end })
    }

    /// Every month of the window, oldest first.
    pub fn months(&self) -> Vec<YearMonth> {
        let mut out = Vec::new();
        let mut cur = self.start;
        while cur <= self.end {
            out.push(cur);
            match cur.succ() {
                Some(next) => cur = next,
                None => break,
            }
        }
        out
    }

    /// Most recent month, used to order pivot rows.
    pub fn latest(&self) -> YearMonth {
        self.end
    }
}

// ---------------------------------------------------------------------------
// MonthLabeler – "Month Year" labels with a fallback policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelStyle {
    /// Long month name; `None` renders the default English names.
    Named(Option<Locale>),
    /// `MM/YYYY`
    Numeric,
}

/// Renders month column labels.  Never fails: an unknown locale falls back
/// to English names, and a month that cannot be rendered falls back to the
/// numeric form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthLabeler {
    style: LabelStyle,
}

impl Default for MonthLabeler {
    fn default() -> Self {
        MonthLabeler {
            style: LabelStyle::Named(None),
        }
    }
}

impl MonthLabeler {
    pub fn numeric() -> Self {
        MonthLabeler {
            style: LabelStyle::Numeric,
        }
    }

    /// Accepts `fr_FR`, `fr-FR` or `fr_FR.UTF-8`.
    pub fn for_locale(name: &str) -> Self {
        let normalized = name
            .split('.')
            .next()
            .unwrap_or_default()
            .trim()
            .replace('-', "_");

        match Locale::try_from(normalized.as_str()) {
            Ok(locale) => MonthLabeler {
                style: LabelStyle::Named(Some(locale)),
            },
            Err(_) => {
                log::warn!("unknown locale '{name}', using default month names");
                MonthLabeler::default()
            }
        }
    }

    pub fn label(&self, period: YearMonth) -> String {
        let Some(date) = period.first_day() else {
            return numeric_label(period);
        };

        let mut out = String::new();
        let written = match self.style {
            LabelStyle::Named(None) => write!(out, "{}", date.format("%B %Y")),
            LabelStyle::Named(Some(locale)) => {
                write!(out, "{}", date.format_localized("%B %Y", locale))
            }
            LabelStyle::Numeric => return numeric_label(period),
        };

        match written {
            Ok(()) => out,
            Err(_) => numeric_label(period),
        }
    }
}

fn numeric_label(period: YearMonth) -> String {
    format!("{:02}/{}", period.month, period.year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_spans_sixteen_months() {
        let months = PivotWindow::default().months();
        assert_eq!(months.len(), 16);
        assert_eq!(months.first(), Some(&YearMonth::new(2024, 1)));
        assert_eq!(months[12], YearMonth::new(2025, 1));
        assert_eq!(months.last(), Some(&YearMonth::new(2025, 4)));
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(PivotWindow::new(YearMonth::new(2025, 2), YearMonth::new(2025, 1)).is_err());
        assert!(PivotWindow::new(YearMonth::new(2025, 1), YearMonth::new(2025, 1)).is_ok());
    }

    #[test]
    fn year_month_parses_and_prints() {
        let ym: YearMonth = "2025-04".parse().unwrap();
        assert_eq!(ym, YearMonth::new(2025, 4));
        assert_eq!(ym.to_string(), "2025-04");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("April 2025".parse::<YearMonth>().is_err());
    }

    #[test]
    fn out_of_range_years_are_rejected() {
        assert!("2147483647-12".parse::<YearMonth>().is_err());
        assert!("0-01".parse::<YearMonth>().is_err());
        assert!("10000-01".parse::<YearMonth>().is_err());
        assert_eq!("9999-12".parse::<YearMonth>().unwrap(), YearMonth::new(9999, 12));
    }

    #[test]
    fn window_ending_at_the_last_representable_month_terminates() {
        assert_eq!(YearMonth::new(i32::MAX, 12).succ(), None);
        assert_eq!(YearMonth::new(2024, 12).succ(), Some(YearMonth::new(2025, 1)));

        let last = YearMonth::new(i32::MAX, 12);
        let window = PivotWindow::new(YearMonth::new(i32::MAX, 10), last).unwrap();
        assert_eq!(
            window.months(),
            vec![YearMonth::new(i32::MAX, 10), YearMonth::new(i32::MAX, 11), last]
        );
    }

    #[test]
    fn english_labels_by_default() {
        let labeler = MonthLabeler::default();
        assert_eq!(labeler.label(YearMonth::new(2024, 1)), "January 2024");
        assert_eq!(labeler.label(YearMonth::new(2025, 4)), "April 2025");
    }

    #[test]
    fn localized_labels() {
        let labeler = MonthLabeler::for_locale("fr_FR.UTF-8");
        assert_eq!(labeler.label(YearMonth::new(2025, 4)), "avril 2025");
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        let labeler = MonthLabeler::for_locale("xx_NOPE");
        assert_eq!(labeler, MonthLabeler::default());
        assert_eq!(labeler.label(YearMonth::new(2024, 2)), "February 2024");
    }

    #[test]
    fn numeric_fallbacks() {
        assert_eq!(MonthLabeler::numeric().label(YearMonth::new(2024, 3)), "03/2024");
        assert_eq!(MonthLabeler::default().label(YearMonth::new(2024, 13)), "13/2024");
    }
}
