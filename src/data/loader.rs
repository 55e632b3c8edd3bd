//! Data Loader Module
//! One-shot loading of the input CSV files (Polars) and the remote
//! world-boundaries topology file.

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to fetch '{url}': {source}")]
    FetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Locations of the five inputs. Static files, no CLI and no environment
/// overrides; the defaults match the checked-in dataset layout.
#[derive(Debug, Clone)]
pub struct Sources {
    pub consumption_csv: String,
    pub ratings_csv: String,
    pub happiness_csv: String,
    pub scatter_csv: String,
    /// Local path or http(s) URL of the world-atlas topology.
    pub world_atlas: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            consumption_csv: "data/noodles_consumptions.csv".to_string(),
            ratings_csv: "data/noodles_ratings.csv".to_string(),
            happiness_csv: "data/world_happiness.csv".to_string(),
            scatter_csv: "data/merged_scatterplot_data.csv".to_string(),
            world_atlas: "https://unpkg.com/world-atlas@2.0.2/countries-110m.json".to_string(),
        }
    }
}

/// Load one CSV file using Polars lazy reading.
pub fn load_csv(path: &str) -> Result<DataFrame, LoaderError> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;
    info!(path, rows = df.height(), "loaded CSV");
    Ok(df)
}

/// Fetch the world-boundaries topology as raw JSON text. A source starting
/// with `http` is fetched over the network, anything else is read from disk.
pub fn fetch_world_atlas(source: &str) -> Result<String, LoaderError> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        reqwest::blocking::get(source)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|source_err| LoaderError::FetchError {
                url: source.to_string(),
                source: source_err,
            })?
    } else {
        std::fs::read_to_string(source).map_err(|source_err| LoaderError::IoError {
            path: source.to_string(),
            source: source_err,
        })?
    };
    info!(source, bytes = text.len(), "loaded world atlas");
    Ok(text)
}
