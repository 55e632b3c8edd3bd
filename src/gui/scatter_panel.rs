//! Scatter Panel
//! Happiness score vs. log-scaled noodle consumption with a fitted trend
//! line, continent filter buttons and the correlation caption.

use crate::charts::category_color;
use crate::data::ScatterRecord;
use crate::stats::{log_correlation, StatsError, TrendLine};
use egui::{Color32, RichText, Stroke};
use egui_plot::{Line, LineStyle, Plot, PlotPoints, Points};

pub struct ScatterPanel {
    records: Vec<ScatterRecord>,
    /// Continents in first-seen order; index fixes the color.
    continents: Vec<String>,
    selected_continent: Option<String>,
    trend: Result<TrendLine, StatsError>,
    correlation: Result<f64, StatsError>,
    error: Option<String>,
}

impl ScatterPanel {
    pub fn new(records: Vec<ScatterRecord>, error: Option<String>) -> Self {
        let pairs: Vec<(f64, f64)> = records
            .iter()
            .map(|r| (r.happiness, r.consumption))
            .collect();
        // Fit once per load; both stay fixed for the session.
        let trend = TrendLine::fit(&pairs);
        let correlation = log_correlation(&pairs);

        let mut continents: Vec<String> = Vec::new();
        for rec in &records {
            if !continents.iter().any(|c| c == &rec.continent) {
                continents.push(rec.continent.clone());
            }
        }

        Self {
            records,
            continents,
            selected_continent: None,
            trend,
            correlation,
            error,
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Happiness vs. Noodle Consumption")
                .size(16.0)
                .strong(),
        );

        if let Some(error) = &self.error {
            ui.colored_label(
                Color32::from_rgb(220, 53, 69),
                format!("Scatter data unavailable: {error}"),
            );
            return;
        }
        if self.records.is_empty() {
            ui.label("No scatter data.");
            return;
        }

        // Continent legend buttons.
        ui.horizontal_wrapped(|ui| {
            for (i, continent) in self.continents.iter().enumerate() {
                let color = category_color(i);
                let selected = self.selected_continent.as_deref() == Some(continent.as_str());
                let button = egui::Button::new(RichText::new(continent).color(color))
                    .stroke(Stroke::new(if selected { 2.0 } else { 1.0 }, color));
                if ui.add(button).clicked() {
                    self.selected_continent = Some(continent.clone());
                }
            }
            if ui.button("Show All").clicked() {
                self.selected_continent = None;
            }
        });

        let selected = self.selected_continent.clone();
        let trend = self.trend.clone();

        Plot::new("happiness_scatter")
            .height(330.0)
            .allow_scroll(false)
            .x_axis_label("Happiness Score")
            .y_axis_label("Consumption, $M (log scale)")
            // Points live in log space; label the axis with real dollars.
            .y_axis_formatter(|mark, _range| format!("{:.0}", mark.value.exp()))
            .label_formatter(|name, point| {
                if name.is_empty() {
                    String::new()
                } else {
                    format!(
                        "{name}\nhappiness {:.2}\nconsumption ${:.0}M",
                        point.x,
                        point.y.exp()
                    )
                }
            })
            .show(ui, |plot_ui| {
                for (i, continent) in self.continents.iter().enumerate() {
                    let dimmed = selected
                        .as_deref()
                        .is_some_and(|s| s != continent.as_str());
                    let alpha: f32 = if dimmed { 0.1 } else { 0.7 };
                    let points: PlotPoints = self
                        .records
                        .iter()
                        .filter(|r| &r.continent == continent)
                        .map(|r| [r.happiness, r.consumption.ln()])
                        .collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(4.0)
                            .color(category_color(i).gamma_multiply(alpha))
                            .name(continent),
                    );
                }

                // Straight in log space.
                if let Ok(line) = &trend {
                    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
                    for r in &self.records {
                        min_x = min_x.min(r.happiness);
                        max_x = max_x.max(r.happiness);
                    }
                    let series: PlotPoints = vec![
                        [min_x, line.log_value_at(min_x)],
                        [max_x, line.log_value_at(max_x)],
                    ]
                    .into();
                    plot_ui.line(
                        Line::new(series)
                            .color(Color32::GRAY)
                            .width(2.0)
                            .style(LineStyle::dashed_loose()),
                    );
                }
            });

        // Degenerate statistics render as "undefined", never as NaN text.
        match &self.correlation {
            Ok(r) => {
                ui.label(format!(
                    "Correlation coefficient: {r:.2} (based on log-transformed consumption)"
                ));
            }
            Err(err) => {
                ui.label(format!("Correlation coefficient: undefined ({err})"));
            }
        }
        if let Err(err) = &self.trend {
            ui.label(format!("Trend line: undefined ({err})"));
        }
    }
}
