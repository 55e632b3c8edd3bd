//! Noodle Atlas Main Application
//! Concurrent startup loads joined behind a first-paint barrier, then three
//! linked views wired together through the event bus.

use crate::data::{fetch_world_atlas, load_csv, CountryKey, NoodleDataset, Sources};
use crate::events::{EventBus, MapEvent};
use crate::geo::WorldAtlas;
use crate::gui::{BarChartPanel, CountrySelection, MapPanel, ScatterPanel};
use polars::prelude::DataFrame;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info};

/// Load result from one background fetch.
enum LoadResult {
    Consumption(Result<DataFrame, String>),
    Ratings(Result<DataFrame, String>),
    Happiness(Result<DataFrame, String>),
    Scatter(Result<DataFrame, String>),
    Atlas(Result<WorldAtlas, String>),
}

/// Join barrier: every input must resolve (ok or failed) before first paint.
#[derive(Default)]
struct LoadedInputs {
    consumption: Option<Result<DataFrame, String>>,
    ratings: Option<Result<DataFrame, String>>,
    happiness: Option<Result<DataFrame, String>>,
    scatter: Option<Result<DataFrame, String>>,
    atlas: Option<Result<WorldAtlas, String>>,
}

impl LoadedInputs {
    fn complete(&self) -> bool {
        self.consumption.is_some()
            && self.ratings.is_some()
            && self.happiness.is_some()
            && self.scatter.is_some()
            && self.atlas.is_some()
    }
}

struct Views {
    bus: EventBus,
    bar: BarChartPanel,
    scatter: ScatterPanel,
    map: MapPanel,
}

/// Main application window.
pub struct NoodleAtlasApp {
    load_rx: Option<Receiver<LoadResult>>,
    inputs: LoadedInputs,
    views: Option<Views>,
}

impl NoodleAtlasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, sources: Sources) -> Self {
        let (tx, rx) = channel();

        // All inputs fetch concurrently; the update loop joins them.
        let csv_jobs: Vec<(String, fn(Result<DataFrame, String>) -> LoadResult)> = vec![
            (sources.consumption_csv.clone(), LoadResult::Consumption),
            (sources.ratings_csv.clone(), LoadResult::Ratings),
            (sources.happiness_csv.clone(), LoadResult::Happiness),
            (sources.scatter_csv.clone(), LoadResult::Scatter),
        ];
        for (path, wrap) in csv_jobs {
            let tx = tx.clone();
            thread::spawn(move || {
                let result = load_csv(&path).map_err(|e| e.to_string());
                if let Err(e) = &result {
                    error!(%path, error = %e, "CSV load failed");
                }
                let _ = tx.send(wrap(result));
            });
        }

        let atlas_source = sources.world_atlas;
        thread::spawn(move || {
            let load = || -> anyhow::Result<WorldAtlas> {
                let text = fetch_world_atlas(&atlas_source)?;
                Ok(WorldAtlas::from_topojson(&text)?)
            };
            let result = load().map_err(|e| format!("{e:#}"));
            if let Err(e) = &result {
                error!(source = %atlas_source, error = %e, "world atlas load failed");
            }
            let _ = tx.send(LoadResult::Atlas(result));
        });

        Self {
            load_rx: Some(rx),
            inputs: LoadedInputs::default(),
            views: None,
        }
    }

    fn poll_loads(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };
        while let Ok(result) = rx.try_recv() {
            match result {
                LoadResult::Consumption(r) => self.inputs.consumption = Some(r),
                LoadResult::Ratings(r) => self.inputs.ratings = Some(r),
                LoadResult::Happiness(r) => self.inputs.happiness = Some(r),
                LoadResult::Scatter(r) => self.inputs.scatter = Some(r),
                LoadResult::Atlas(r) => self.inputs.atlas = Some(r),
            }
        }
        if self.inputs.complete() {
            self.build_views();
        } else {
            self.load_rx = Some(rx);
        }
    }

    /// Everything needed for first paint has resolved; assemble the dataset
    /// and the views. Load/parse failures stay confined to the view that
    /// depends on the failed input.
    fn build_views(&mut self) {
        let inputs = std::mem::take(&mut self.inputs);

        let frame = |r: &Option<Result<DataFrame, String>>| -> Option<DataFrame> {
            r.as_ref().and_then(|r| r.as_ref().ok()).cloned()
        };
        let load_err = |r: &Option<Result<DataFrame, String>>| -> Option<String> {
            r.as_ref().and_then(|r| r.as_ref().err()).cloned()
        };

        let consumption = frame(&inputs.consumption);
        let ratings = frame(&inputs.ratings);
        let happiness = frame(&inputs.happiness);
        let scatter = frame(&inputs.scatter);

        let build = NoodleDataset::build(
            consumption.as_ref(),
            ratings.as_ref(),
            happiness.as_ref(),
            scatter.as_ref(),
        );
        let dataset = Rc::new(build.dataset);
        info!(
            ratings = dataset.ratings.len(),
            countries = dataset.consumption.len(),
            scatter = dataset.scatter.len(),
            "dataset ready"
        );

        let ratings_err = load_err(&inputs.ratings)
            .or_else(|| build.errors.ratings.as_ref().map(|e| e.to_string()));
        let scatter_err = load_err(&inputs.scatter)
            .or_else(|| build.errors.scatter.as_ref().map(|e| e.to_string()));
        // The map cannot draw without boundaries or bubbles; happiness and
        // ratings failures only thin out its tooltip.
        let (atlas, atlas_err) = match inputs.atlas {
            Some(Ok(atlas)) => (atlas, None),
            Some(Err(e)) => (WorldAtlas::default(), Some(e)),
            None => (WorldAtlas::default(), Some("not loaded".to_string())),
        };
        let map_err = atlas_err
            .or_else(|| load_err(&inputs.consumption))
            .or_else(|| build.errors.consumption.as_ref().map(|e| e.to_string()));

        let selection = Rc::new(RefCell::new(CountrySelection::default()));
        let bar = BarChartPanel::new(Rc::clone(&dataset), Rc::clone(&selection), ratings_err);
        let scatter = ScatterPanel::new(dataset.scatter.clone(), scatter_err);
        let map = MapPanel::new(&atlas, Rc::clone(&dataset), map_err);

        // The bar chart is the sole subscriber today: a map highlight
        // re-selects its dropdown, a reset restores the user's pick.
        let mut bus = EventBus::new();
        let countries: Vec<(CountryKey, String)> = dataset
            .rating_countries()
            .into_iter()
            .map(|name| (CountryKey::from_raw(&name), name))
            .collect();
        let subscriber_state = Rc::clone(&selection);
        bus.subscribe(move |event| match event {
            MapEvent::CountryHighlighted(key) => {
                if let Some((_, name)) = countries.iter().find(|(k, _)| k == key) {
                    subscriber_state.borrow_mut().highlight(name.clone());
                }
            }
            MapEvent::HighlightReset => subscriber_state.borrow_mut().reset_highlight(),
        });
        info!(subscribers = bus.subscriber_count(), "event bus wired");

        self.views = Some(Views {
            bus,
            bar,
            scatter,
            map,
        });
    }
}

impl eframe::App for NoodleAtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loads();

        let Some(views) = &mut self.views else {
            ctx.request_repaint();
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading datasets...");
                    });
                });
            });
            return;
        };

        egui::TopBottomPanel::top("map_area")
            .resizable(true)
            .default_height(400.0)
            .show(ctx, |ui| {
                if let Some(event) = views.map.show(ui) {
                    views.bus.publish(&event);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                views.bar.show(&mut columns[0]);
                views.scatter.show(&mut columns[1]);
            });
        });
    }
}
