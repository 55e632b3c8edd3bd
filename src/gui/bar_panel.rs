//! Bar Chart Panel
//! Top-rated brands for one country: dropdown filter, horizontal mean-rating
//! bars, click-through brand detail. Re-selects itself when the map
//! broadcasts a country highlight.

use crate::charts::interpolate_blues;
use crate::data::{CountryKey, NoodleDataset};
use crate::stats::{brand_detail, brand_means, BrandAggregate};
use egui::{Color32, ComboBox, RichText};
use egui_plot::{Bar, BarChart, Plot};
use std::cell::RefCell;
use std::rc::Rc;

/// Selection state shared with the event-bus subscriber. The bus writes
/// `current` on a map highlight; the user's own dropdown choice is kept in
/// `pinned` so a highlight reset can restore it.
#[derive(Debug, Default)]
pub struct CountrySelection {
    pub current: String,
    pub pinned: String,
}

impl CountrySelection {
    pub fn pick(&mut self, country: String) {
        self.current = country.clone();
        self.pinned = country;
    }

    pub fn highlight(&mut self, country: String) {
        self.current = country;
    }

    pub fn reset_highlight(&mut self) {
        self.current = self.pinned.clone();
    }
}

struct BrandDetail {
    brand: String,
    country: String,
    mean_rating: f64,
}

pub struct BarChartPanel {
    dataset: Rc<NoodleDataset>,
    countries: Vec<String>,
    selection: Rc<RefCell<CountrySelection>>,
    /// Country the cached bars were computed for.
    cached_for: String,
    bars: Vec<BrandAggregate>,
    detail: Option<BrandDetail>,
    error: Option<String>,
}

impl BarChartPanel {
    pub fn new(
        dataset: Rc<NoodleDataset>,
        selection: Rc<RefCell<CountrySelection>>,
        error: Option<String>,
    ) -> Self {
        let countries = dataset.rating_countries();
        if let Some(first) = countries.first() {
            selection.borrow_mut().pick(first.clone());
        }
        Self {
            dataset,
            countries,
            selection,
            cached_for: String::new(),
            bars: Vec::new(),
            detail: None,
            error,
        }
    }

    /// Recompute the aggregates when the country filter changed (dropdown or
    /// bus highlight).
    fn refresh_bars(&mut self) {
        let current = self.selection.borrow().current.clone();
        if current == self.cached_for {
            return;
        }
        let key = CountryKey::from_raw(&current);
        self.bars = brand_means(&self.dataset.ratings, &key);
        self.cached_for = current;
        self.detail = None;
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Top Rated Brands").size(16.0).strong());

        if let Some(error) = &self.error {
            ui.colored_label(Color32::from_rgb(220, 53, 69), format!("Ratings unavailable: {error}"));
            return;
        }

        self.refresh_bars();

        let mut picked: Option<String> = None;
        {
            let selection = self.selection.borrow();
            ui.horizontal(|ui| {
                ui.label("Country:");
                ComboBox::from_id_salt("country_filter")
                    .width(180.0)
                    .selected_text(&selection.current)
                    .show_ui(ui, |ui| {
                        for country in &self.countries {
                            if ui
                                .selectable_label(selection.current == *country, country)
                                .clicked()
                            {
                                picked = Some(country.clone());
                            }
                        }
                    });
            });
        }
        if let Some(country) = picked {
            self.selection.borrow_mut().pick(country);
            self.refresh_bars();
        }

        if self.bars.is_empty() {
            ui.label("No ratings for this country.");
            return;
        }

        // Highest mean at the top.
        let count = self.bars.len();
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .enumerate()
            .map(|(i, agg)| {
                Bar::new((count - 1 - i) as f64, agg.mean_rating)
                    .horizontal()
                    .width(0.7)
                    .fill(interpolate_blues(agg.mean_rating / 5.0))
                    .name(&agg.brand)
            })
            .collect();

        let labels: Vec<String> = self.bars.iter().rev().map(|b| b.brand.clone()).collect();

        let response = Plot::new("brand_bars")
            .height(360.0)
            .allow_scroll(false)
            .allow_zoom(false)
            .allow_drag(false)
            .include_x(0.0)
            .include_x(5.0)
            .x_axis_label("Mean rating")
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 1e-6 && idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
                plot_ui.pointer_coordinate()
            });

        if response.response.clicked() {
            if let Some(pointer) = response.inner {
                let idx = pointer.y.round();
                if idx >= 0.0 && (idx as usize) < count {
                    let agg = &self.bars[count - 1 - idx as usize];
                    let country = self.cached_for.clone();
                    let key = CountryKey::from_raw(&country);
                    if let Some(mean) = brand_detail(&self.dataset.ratings, &key, &agg.brand) {
                        self.detail = Some(BrandDetail {
                            brand: agg.brand.clone(),
                            country,
                            mean_rating: mean,
                        });
                    }
                }
            }
        }

        if let Some(detail) = &self.detail {
            let mut open = true;
            egui::Window::new(format!("{} in {}", detail.brand, detail.country))
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .show(ui.ctx(), |ui| {
                    ui.label(format!("Average rating: {:.1}", detail.mean_rating));
                });
            if !open {
                self.detail = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, MapEvent};

    #[test]
    fn highlight_is_transient_and_reset_restores_the_pick() {
        let mut selection = CountrySelection::default();
        selection.pick("Japan".to_string());
        selection.highlight("Brazil".to_string());
        assert_eq!(selection.current, "Brazil");
        assert_eq!(selection.pinned, "Japan");

        selection.reset_highlight();
        assert_eq!(selection.current, "Japan");
    }

    // Mirrors the app wiring: a published highlight re-selects the dropdown
    // by canonical key before publish returns.
    #[test]
    fn bus_highlight_reselects_matching_country() {
        let selection = Rc::new(RefCell::new(CountrySelection::default()));
        selection.borrow_mut().pick("Japan".to_string());

        let countries = vec![
            (CountryKey::from_raw("Japan"), "Japan".to_string()),
            (CountryKey::from_raw("South Korea"), "South Korea".to_string()),
        ];
        let mut bus = EventBus::new();
        let state = Rc::clone(&selection);
        bus.subscribe(move |event| match event {
            MapEvent::CountryHighlighted(key) => {
                if let Some((_, name)) = countries.iter().find(|(k, _)| k == key) {
                    state.borrow_mut().highlight(name.clone());
                }
            }
            MapEvent::HighlightReset => state.borrow_mut().reset_highlight(),
        });

        bus.publish(&MapEvent::CountryHighlighted(CountryKey::from_raw("south korea")));
        assert_eq!(selection.borrow().current, "South Korea");

        // Unknown country leaves the selection untouched.
        bus.publish(&MapEvent::CountryHighlighted(CountryKey::from_raw("atlantis")));
        assert_eq!(selection.borrow().current, "South Korea");

        bus.publish(&MapEvent::HighlightReset);
        assert_eq!(selection.borrow().current, "Japan");
    }
}
