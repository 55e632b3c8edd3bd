//! GUI module - application shell and the three linked views.

mod app;
mod bar_panel;
mod map_panel;
mod scatter_panel;

pub use app::NoodleAtlasApp;
pub use bar_panel::{BarChartPanel, CountrySelection};
pub use map_panel::MapPanel;
pub use scatter_panel::ScatterPanel;
