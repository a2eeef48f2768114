use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use deposit_ranker::data::ranking::Ranking;

// ---------------------------------------------------------------------------
// Bar colours
// ---------------------------------------------------------------------------

const ABOVE_HUE: f32 = 12.0;
const BELOW_HUE: f32 = 210.0;

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// `n` shades of one hue, darkest first.
pub fn shade_ramp(hue: f32, n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.0 } else { i as f32 / (n - 1) as f32 };
            hsl_to_color32(hue, 0.70, 0.40 + 0.30 * t)
        })
        .collect()
}

/// One colour per ranked row: warm shades for clients at or above the
/// exposure threshold, cool shades for the rest.
pub fn bar_colors(ranking: &Ranking) -> Vec<Color32> {
    let threshold = ranking.stats.threshold;
    let n_above = ranking
        .rows
        .iter()
        .filter(|r| r.amount >= threshold)
        .count();
    let mut above = shade_ramp(ABOVE_HUE, n_above).into_iter();
    let mut below = shade_ramp(BELOW_HUE, ranking.rows.len() - n_above).into_iter();

    ranking
        .rows
        .iter()
        .map(|r| {
            let next = if r.amount >= threshold {
                above.next()
            } else {
                below.next()
            };
            next.unwrap_or(Color32::GRAY)
        })
        .collect()
}

/// Colour of the threshold line and legend entry.
pub fn threshold_color() -> Color32 {
    hsl_to_color32(ABOVE_HUE, 0.80, 0.30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deposit_ranker::data::filter::FilterSelection;
    use deposit_ranker::data::ranking::{ExposureStats, RankedClient};

    #[test]
    fn ramp_runs_dark_to_light() {
        assert!(shade_ramp(BELOW_HUE, 0).is_empty());
        let ramp = shade_ramp(BELOW_HUE, 4);
        assert_eq!(ramp.len(), 4);
        let luma = |c: &Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        assert!(luma(&ramp[0]) < luma(&ramp[3]));
    }

    #[test]
    fn bars_split_on_threshold() {
        let amounts = [500.0, 400.0, 300.0, 200.0, 100.0];
        let rows = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| RankedClient {
                client: format!("C{i}"),
                account: String::new(),
                amount,
                rank: i + 1,
            })
            .collect();
        let ranking = Ranking {
            selection: FilterSelection {
                deposit_type: "Savings".into(),
                agency: "X".into(),
                year: 2024,
                month: 1,
            },
            rows,
            stats: ExposureStats::compute(&amounts),
        };

        let colors = bar_colors(&ranking);
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], shade_ramp(ABOVE_HUE, 1)[0]);
        assert_eq!(colors[1], shade_ramp(BELOW_HUE, 4)[0]);
    }
}
