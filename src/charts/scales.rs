//! Scales Module
//! Numeric-domain to visual-magnitude/color mappings for the map and bars.

use egui::Color32;

/// Square-root magnitude scale for the consumption bubbles, so bubble area
/// tracks the value linearly.
#[derive(Debug, Clone, Copy)]
pub struct SqrtScale {
    domain_max: f64,
    range_max: f64,
}

impl SqrtScale {
    pub fn new(domain_max: f64, range_max: f64) -> Self {
        Self {
            domain_max: domain_max.max(0.0),
            range_max,
        }
    }

    pub fn radius(&self, value: f64) -> f64 {
        if self.domain_max <= 0.0 || value <= 0.0 {
            return 0.0;
        }
        (value / self.domain_max).sqrt() * self.range_max
    }
}

/// Happiness color ramp, light to dark (the original map palette).
pub const HAPPINESS_PALETTE: [Color32; 5] = [
    Color32::from_rgb(0xF9, 0xF6, 0x5A),
    Color32::from_rgb(0xEC, 0x70, 0x14),
    Color32::from_rgb(0xBC, 0x4A, 0x9C),
    Color32::from_rgb(0x7A, 0x1A, 0x9B),
    Color32::from_rgb(0x2B, 0x00, 0x54),
];

/// Categorical palette for continents on the scatterplot.
pub const CONTINENT_PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

/// Stable color for a category by first-seen index.
pub fn category_color(index: usize) -> Color32 {
    CONTINENT_PALETTE[index % CONTINENT_PALETTE.len()]
}

/// Quantile color scale: bins a sample of values into as many
/// equal-population groups as there are colors.
#[derive(Debug, Clone)]
pub struct QuantileScale {
    /// k-1 cut points for k colors.
    thresholds: Vec<f64>,
    colors: Vec<Color32>,
}

impl QuantileScale {
    pub fn new(values: &[f64], colors: &[Color32]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let k = colors.len();
        let mut thresholds = Vec::new();
        if !sorted.is_empty() && k > 1 {
            for i in 1..k {
                thresholds.push(quantile(&sorted, i as f64 / k as f64));
            }
        }
        Self {
            thresholds,
            colors: colors.to_vec(),
        }
    }

    pub fn color(&self, value: f64) -> Color32 {
        if self.colors.is_empty() {
            return Color32::GRAY;
        }
        let bin = self.thresholds.iter().take_while(|t| value >= **t).count();
        self.colors[bin.min(self.colors.len() - 1)]
    }
}

/// R-7 quantile (linear interpolation), matching d3's quantile scale.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;
    sorted[lower] * (1.0 - frac) + sorted[upper] * frac
}

/// Sequential blue ramp for the rating bars, t in [0, 1].
pub fn interpolate_blues(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let light = (0xF7, 0xFB, 0xFF);
    let dark = (0x08, 0x30, 0x6B);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Color32::from_rgb(
        lerp(light.0, dark.0),
        lerp(light.1, dark.1),
        lerp(light.2, dark.2),
    )
}
