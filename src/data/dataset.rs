//! Dataset Module
//! Builds one immutable, typed dataset from the loaded CSV frames.
//! All views read from this object; nothing mutates it after load.

use crate::data::normalize::CountryKey;
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing column '{0}'")]
    MissingColumn(String),
}

/// One row of the ratings CSV.
#[derive(Debug, Clone)]
pub struct RatingRecord {
    pub key: CountryKey,
    /// Display spelling as it appears in the CSV.
    pub country: String,
    pub brand: String,
    pub rating: f64,
}

/// One row of the merged scatter CSV.
#[derive(Debug, Clone)]
pub struct ScatterRecord {
    pub country: String,
    pub continent: String,
    pub happiness: f64,
    pub consumption: f64,
}

/// Highest-rated brand seen for a country. On equal ratings the
/// first-encountered record wins (fold order over the CSV).
#[derive(Debug, Clone, PartialEq)]
pub struct TopBrand {
    pub brand: String,
    pub rating: f64,
}

/// Per-country join of the three keyed maps. A country missing from one
/// dataset simply has `None` there; the tooltip omits the field.
#[derive(Debug, Clone, Default)]
pub struct CountryProfile {
    pub consumption: Option<f64>,
    pub happiness: Option<f64>,
    pub top_brand: Option<TopBrand>,
}

/// All loaded records, built once at startup and shared read-only with the
/// aggregator and the views.
#[derive(Debug, Default)]
pub struct NoodleDataset {
    /// Rating records in CSV order. Tie-breaking in the aggregator depends
    /// on this order being preserved.
    pub ratings: Vec<RatingRecord>,
    pub consumption: HashMap<CountryKey, f64>,
    pub happiness: HashMap<CountryKey, f64>,
    pub top_brands: HashMap<CountryKey, TopBrand>,
    pub scatter: Vec<ScatterRecord>,
}

/// Per-section parse failures. A failed section stays empty; the owning view
/// reports it, sibling views keep their data.
#[derive(Debug, Default)]
pub struct SectionErrors {
    pub consumption: Option<DatasetError>,
    pub ratings: Option<DatasetError>,
    pub happiness: Option<DatasetError>,
    pub scatter: Option<DatasetError>,
}

/// Result of assembling the dataset from the loaded frames.
#[derive(Debug, Default)]
pub struct DatasetBuild {
    pub dataset: NoodleDataset,
    pub errors: SectionErrors,
}

impl NoodleDataset {
    /// Assemble the dataset from whichever frames loaded successfully.
    /// A `None` frame leaves its section empty (the caller already knows the
    /// load failed); a frame that parses badly records a section error.
    pub fn build(
        consumption: Option<&DataFrame>,
        ratings: Option<&DataFrame>,
        happiness: Option<&DataFrame>,
        scatter: Option<&DataFrame>,
    ) -> DatasetBuild {
        let mut build = DatasetBuild::default();
        let dataset = &mut build.dataset;

        if let Some(df) = consumption {
            match keyed_values(df, "Country/Region", "2022") {
                Ok(map) => {
                    // Non-positive values cannot be log- or sqrt-scaled.
                    dataset.consumption =
                        map.into_iter().filter(|(_, v)| *v > 0.0).collect();
                }
                Err(e) => build.errors.consumption = Some(e),
            }
        }

        if let Some(df) = happiness {
            match keyed_values(df, "Country", "Happiness score") {
                Ok(map) => dataset.happiness = map,
                Err(e) => build.errors.happiness = Some(e),
            }
        }

        if let Some(df) = ratings {
            match read_ratings(df) {
                Ok(records) => {
                    dataset.top_brands = top_brands_by_country(&records);
                    dataset.ratings = records;
                }
                Err(e) => build.errors.ratings = Some(e),
            }
        }

        if let Some(df) = scatter {
            match read_scatter(df) {
                Ok(records) => dataset.scatter = records,
                Err(e) => build.errors.scatter = Some(e),
            }
        }

        build
    }

    /// Join the keyed maps for one country. Join misses are omissions,
    /// never errors.
    pub fn country_profile(&self, key: &CountryKey) -> CountryProfile {
        CountryProfile {
            consumption: self.consumption.get(key).copied(),
            happiness: self.happiness.get(key).copied(),
            top_brand: self.top_brands.get(key).cloned(),
        }
    }

    /// Sorted unique display names of the countries present in the ratings
    /// data, for the bar chart dropdown.
    pub fn rating_countries(&self) -> Vec<String> {
        let mut seen: HashMap<CountryKey, &str> = HashMap::new();
        for rec in &self.ratings {
            seen.entry(rec.key.clone()).or_insert(&rec.country);
        }
        let mut names: Vec<String> = seen.values().map(|s| s.to_string()).collect();
        names.sort();
        names
    }
}

/// Read a (country column, numeric column) pair into a keyed map.
/// Rows with a null country or an unparseable value are skipped.
fn keyed_values(
    df: &DataFrame,
    country_col: &str,
    value_col: &str,
) -> Result<HashMap<CountryKey, f64>, DatasetError> {
    let countries = str_column(df, country_col)?;
    let values = f64_column(df, value_col)?;

    let mut map = HashMap::new();
    for i in 0..df.height() {
        if let (Some(name), Some(value)) = (read_str(countries, i), values.get(i)) {
            let key = CountryKey::from_raw(&name);
            // A name that normalizes to nothing can never join.
            if value.is_finite() && !key.is_empty() {
                map.insert(key, value);
            }
        }
    }
    Ok(map)
}

fn read_ratings(df: &DataFrame) -> Result<Vec<RatingRecord>, DatasetError> {
    let countries = str_column(df, "Country")?;
    let brands = str_column(df, "Brand")?;
    let stars = f64_column(df, "Stars")?;

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    for i in 0..df.height() {
        match (read_str(countries, i), read_str(brands, i), stars.get(i)) {
            (Some(country), Some(brand), Some(rating)) if rating.is_finite() => {
                records.push(RatingRecord {
                    key: CountryKey::from_raw(&country),
                    country,
                    brand,
                    rating,
                });
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, "dropped rating rows with missing fields");
    }
    Ok(records)
}

fn read_scatter(df: &DataFrame) -> Result<Vec<ScatterRecord>, DatasetError> {
    let countries = str_column(df, "Country")?;
    let continents = str_column(df, "Continent")?;
    let happiness = f64_column(df, "happiness_score")?;
    let consumption = f64_column(df, "2022_consumption")?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        if let (Some(country), Some(continent), Some(h), Some(c)) = (
            read_str(countries, i),
            read_str(continents, i),
            happiness.get(i),
            consumption.get(i),
        ) {
            if h.is_finite() && c.is_finite() && c > 0.0 {
                records.push(ScatterRecord {
                    country,
                    continent,
                    happiness: h,
                    consumption: c,
                });
            }
        }
    }
    Ok(records)
}

/// Track the top-rated brand per country, parallel across countries.
/// Within a country the CSV order is kept, so ties go to the first record.
fn top_brands_by_country(records: &[RatingRecord]) -> HashMap<CountryKey, TopBrand> {
    let mut by_country: HashMap<CountryKey, Vec<&RatingRecord>> = HashMap::new();
    for rec in records {
        by_country.entry(rec.key.clone()).or_default().push(rec);
    }

    by_country
        .into_par_iter()
        .filter_map(|(key, recs)| {
            let best = recs
                .into_iter()
                .fold(None::<&RatingRecord>, |acc, rec| match acc {
                    Some(best) if best.rating >= rec.rating => Some(best),
                    _ => Some(rec),
                })?;
            Some((
                key,
                TopBrand {
                    brand: best.brand.clone(),
                    rating: best.rating,
                },
            ))
        })
        .collect()
}

fn str_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, DatasetError> {
    df.column(name)
        .map_err(|_| DatasetError::MissingColumn(name.to_string()))
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Float64Chunked, DatasetError> {
    let col = df
        .column(name)
        .map_err(|_| DatasetError::MissingColumn(name.to_string()))?;
    // Non-strict cast: unparseable cells become null and are skipped.
    let cast = col.cast(&DataType::Float64)?;
    Ok(cast.f64()?.clone())
}

fn read_str(col: &Column, i: usize) -> Option<String> {
    let val = col.get(i).ok()?;
    if val.is_null() {
        None
    } else {
        Some(val.to_string().trim_matches('"').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings_frame(rows: &[(&str, &str, f64)]) -> DataFrame {
        let countries: Vec<String> = rows.iter().map(|r| r.0.to_string()).collect();
        let brands: Vec<String> = rows.iter().map(|r| r.1.to_string()).collect();
        let stars: Vec<f64> = rows.iter().map(|r| r.2).collect();
        DataFrame::new(vec![
            Column::new("Country".into(), countries),
            Column::new("Brand".into(), brands),
            Column::new("Stars".into(), stars),
        ])
        .unwrap()
    }

    #[test]
    fn builds_keyed_maps_with_canonical_keys() {
        let consumption = DataFrame::new(vec![
            Column::new("Country/Region".into(), vec!["South Korea", "Japan"]),
            Column::new("2022".into(), vec![7500.0, 9800.0]),
        ])
        .unwrap();

        let ds = NoodleDataset::build(Some(&consumption), None, None, None).dataset;
        assert_eq!(
            ds.consumption.get(&CountryKey::from_raw("south korea")),
            Some(&7500.0)
        );
        assert_eq!(ds.consumption.len(), 2);
    }

    #[test]
    fn drops_non_positive_consumption() {
        let consumption = DataFrame::new(vec![
            Column::new("Country/Region".into(), vec!["A", "B", "C"]),
            Column::new("2022".into(), vec![0.0, -5.0, 12.0]),
        ])
        .unwrap();

        let ds = NoodleDataset::build(Some(&consumption), None, None, None).dataset;
        assert_eq!(ds.consumption.len(), 1);
    }

    #[test]
    fn join_miss_yields_omitted_fields_not_errors() {
        let consumption = DataFrame::new(vec![
            Column::new("Country/Region".into(), vec!["Brazil"]),
            Column::new("2022".into(), vec![2300.0]),
        ])
        .unwrap();

        // Brazil is present in consumption but absent from happiness.
        let ds = NoodleDataset::build(Some(&consumption), None, None, None).dataset;
        let profile = ds.country_profile(&CountryKey::from_raw("Brazil"));
        assert_eq!(profile.consumption, Some(2300.0));
        assert!(profile.happiness.is_none());
        assert!(profile.top_brand.is_none());
    }

    #[test]
    fn top_brand_tie_goes_to_first_record() {
        let ratings = ratings_frame(&[
            ("Japan", "Sapporo Ichiban", 5.0),
            ("Japan", "Nissin", 5.0),
            ("Japan", "Maruchan", 4.5),
        ]);

        let ds = NoodleDataset::build(None, Some(&ratings), None, None).dataset;
        let top = ds
            .top_brands
            .get(&CountryKey::from_raw("Japan"))
            .expect("japan has ratings");
        assert_eq!(top.brand, "Sapporo Ichiban");
        assert_eq!(top.rating, 5.0);
    }

    #[test]
    fn rating_countries_are_sorted_and_unique() {
        let ratings = ratings_frame(&[
            ("Vietnam", "A", 3.0),
            ("Brazil", "B", 4.0),
            ("Vietnam", "C", 2.0),
        ]);

        let ds = NoodleDataset::build(None, Some(&ratings), None, None).dataset;
        assert_eq!(ds.rating_countries(), vec!["Brazil", "Vietnam"]);
    }

    #[test]
    fn missing_column_is_contained_to_its_section() {
        let bad = DataFrame::new(vec![Column::new("Country".into(), vec!["X"])]).unwrap();
        let happiness = DataFrame::new(vec![
            Column::new("Country".into(), vec!["Japan"]),
            Column::new("Happiness score".into(), vec![5.9]),
        ])
        .unwrap();

        // Consumption frame is malformed; the happiness section still builds.
        let build = NoodleDataset::build(Some(&bad), None, Some(&happiness), None);
        assert!(matches!(
            build.errors.consumption,
            Some(DatasetError::MissingColumn(_))
        ));
        assert!(build.errors.happiness.is_none());
        assert_eq!(build.dataset.happiness.len(), 1);
        assert!(build.dataset.consumption.is_empty());
    }
}
