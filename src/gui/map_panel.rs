//! World Map Panel
//! Country outlines with consumption bubbles sized by a sqrt scale and
//! colored by happiness quantile. Hovering a bubble shows the joined country
//! profile and publishes a highlight event for the bar chart.

use crate::charts::{QuantileScale, SqrtScale, HAPPINESS_PALETTE};
use crate::data::{CountryKey, NoodleDataset};
use crate::events::MapEvent;
use crate::geo::WorldAtlas;
use egui::{Color32, RichText};
use egui_plot::{Plot, PlotPoint, PlotPoints, Points, Polygon};
use std::rc::Rc;

const MAX_BUBBLE_RADIUS: f64 = 30.0;

struct Bubble {
    key: CountryKey,
    name: String,
    center: [f64; 2],
    /// Screen radius in points.
    radius: f32,
    color: Color32,
}

pub struct MapPanel {
    dataset: Rc<NoodleDataset>,
    rings: Vec<Vec<[f64; 2]>>,
    bubbles: Vec<Bubble>,
    hovered: Option<CountryKey>,
    reset_view: bool,
    error: Option<String>,
}

impl MapPanel {
    pub fn new(atlas: &WorldAtlas, dataset: Rc<NoodleDataset>, error: Option<String>) -> Self {
        let max_consumption = dataset
            .consumption
            .values()
            .copied()
            .fold(0.0_f64, f64::max);
        let bubble_scale = SqrtScale::new(max_consumption, MAX_BUBBLE_RADIUS);

        let happiness_values: Vec<f64> = dataset.happiness.values().copied().collect();
        let color_scale = QuantileScale::new(&happiness_values, &HAPPINESS_PALETTE);

        let mut rings = Vec::new();
        let mut bubbles = Vec::new();
        for country in &atlas.countries {
            rings.extend(country.rings.iter().cloned());

            // Only countries with consumption data get a bubble.
            let Some(&consumption) = dataset.consumption.get(&country.key) else {
                continue;
            };
            let happiness = dataset.happiness.get(&country.key).copied().unwrap_or(0.0);
            bubbles.push(Bubble {
                key: country.key.clone(),
                name: country.name.clone(),
                center: country.centroid(),
                radius: bubble_scale.radius(consumption) as f32,
                color: color_scale.color(happiness),
            });
        }

        Self {
            dataset,
            rings,
            bubbles,
            hovered: None,
            reset_view: false,
            error,
        }
    }

    /// Draw the map and report hover transitions for the event bus.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<MapEvent> {
        ui.horizontal(|ui| {
            ui.label(RichText::new("World Noodle Map").size(16.0).strong());
            if ui.button("Reset view").clicked() {
                self.reset_view = true;
            }
        });

        if let Some(error) = &self.error {
            ui.colored_label(Color32::from_rgb(220, 53, 69), format!("Map unavailable: {error}"));
            return None;
        }

        let mut plot = Plot::new("world_map")
            .data_aspect(1.0)
            .show_axes([false, false])
            .show_grid(false)
            .allow_scroll(false)
            .label_formatter(|_, _| String::new());
        if self.reset_view {
            plot = plot.reset();
            self.reset_view = false;
        }

        let response = plot.show(ui, |plot_ui| {
            for ring in &self.rings {
                let series: PlotPoints = ring.iter().copied().map(|p| [p[0], p[1]]).collect();
                plot_ui.polygon(
                    Polygon::new(series)
                        .fill_color(Color32::from_gray(211))
                        .stroke(egui::Stroke::new(1.0, Color32::WHITE)),
                );
            }

            // Large bubbles first so small ones stay hoverable on top.
            let mut order: Vec<usize> = (0..self.bubbles.len()).collect();
            order.sort_by(|&a, &b| {
                self.bubbles[b]
                    .radius
                    .partial_cmp(&self.bubbles[a].radius)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            for i in order {
                let bubble = &self.bubbles[i];
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![bubble.center]))
                        .radius(bubble.radius)
                        .color(bubble.color.gamma_multiply(0.65)),
                );
            }
        });

        // Hit-test bubbles in screen space so the test radius matches what
        // was drawn.
        let hovered_now = response.response.hover_pos().and_then(|pointer| {
            self.bubbles
                .iter()
                .filter(|b| b.radius > 0.0)
                .filter(|b| {
                    let center = response
                        .transform
                        .position_from_point(&PlotPoint::new(b.center[0], b.center[1]));
                    center.distance(pointer) <= b.radius
                })
                // Smallest hit wins, matching what is visually on top.
                .min_by(|a, b| {
                    a.radius
                        .partial_cmp(&b.radius)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        if let Some(bubble) = hovered_now {
            self.show_tooltip(ui, bubble);
        }

        // Publish only on transitions, not every frame.
        let hovered_key = hovered_now.map(|b| b.key.clone());
        if hovered_key != self.hovered {
            let event = match &hovered_key {
                Some(key) => Some(MapEvent::CountryHighlighted(key.clone())),
                None => Some(MapEvent::HighlightReset),
            };
            self.hovered = hovered_key;
            return event;
        }
        None
    }

    /// Tooltip with the joined profile; fields missing from a dataset are
    /// omitted rather than shown as placeholders.
    fn show_tooltip(&self, ui: &egui::Ui, bubble: &Bubble) {
        let profile = self.dataset.country_profile(&bubble.key);
        let _ = egui::show_tooltip_at_pointer(
            ui.ctx(),
            ui.layer_id(),
            egui::Id::new("map_tooltip"),
            |ui| {
                ui.label(RichText::new(&bubble.name).strong());
                if let Some(consumption) = profile.consumption {
                    ui.label(format!("Noodle consumption: ${consumption:.0}M"));
                }
                if let Some(happiness) = profile.happiness {
                    ui.label(format!("Happiness score: {happiness:.2}"));
                }
                if let Some(top) = profile.top_brand {
                    ui.label(format!("Top brand: {} ({:.1})", top.brand, top.rating));
                }
            },
        );
    }
}
