//! Data module - CSV/topology loading, country-name normalization and the
//! immutable in-memory dataset.

mod dataset;
mod loader;
mod normalize;

pub use dataset::{CountryProfile, DatasetError, NoodleDataset, RatingRecord, ScatterRecord, TopBrand};
pub use loader::{fetch_world_atlas, load_csv, LoaderError, Sources};
pub use normalize::CountryKey;
