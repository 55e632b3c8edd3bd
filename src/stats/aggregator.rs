//! Aggregator Module
//! Per-country brand grouping and averaging for the bar chart.

use crate::data::{CountryKey, RatingRecord, TopBrand};
use std::collections::HashMap;

/// Bar chart shows at most the top 20 brands.
pub const MAX_BARS: usize = 20;

/// Mean rating of one brand within the selected country. Transient,
/// recomputed on every country-filter change.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandAggregate {
    pub brand: String,
    pub mean_rating: f64,
}

/// Group the country's rating records by brand and average them, sorted
/// non-increasing by mean and truncated to [`MAX_BARS`]. The sort is stable,
/// so brands with equal means keep their CSV order.
pub fn brand_means(records: &[RatingRecord], country: &CountryKey) -> Vec<BrandAggregate> {
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();

    for rec in records.iter().filter(|r| &r.key == country) {
        let entry = sums.entry(rec.brand.as_str()).or_insert_with(|| {
            order.push(rec.brand.as_str());
            (0.0, 0)
        });
        entry.0 += rec.rating;
        entry.1 += 1;
    }

    let mut aggregates: Vec<BrandAggregate> = order
        .into_iter()
        .map(|brand| {
            let (sum, count) = sums[brand];
            BrandAggregate {
                brand: brand.to_string(),
                mean_rating: sum / count as f64,
            }
        })
        .collect();

    aggregates.sort_by(|a, b| {
        b.mean_rating
            .partial_cmp(&a.mean_rating)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    aggregates.truncate(MAX_BARS);
    aggregates
}

/// Single-pass max-by-rating fold. On a tie the first-encountered record
/// wins; that is an artifact of fold order, not a business rule.
pub fn top_rated_brand(records: &[RatingRecord], country: &CountryKey) -> Option<TopBrand> {
    records
        .iter()
        .filter(|r| &r.key == country)
        .fold(None::<TopBrand>, |acc, rec| match acc {
            Some(best) if best.rating >= rec.rating => Some(best),
            _ => Some(TopBrand {
                brand: rec.brand.clone(),
                rating: rec.rating,
            }),
        })
}

/// Mean rating of one brand within one country, for the bar-click detail
/// panel. `None` when the pair has no records.
pub fn brand_detail(records: &[RatingRecord], country: &CountryKey, brand: &str) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for rec in records.iter().filter(|r| &r.key == country && r.brand == brand) {
        sum += rec.rating;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(country: &str, brand: &str, rating: f64) -> RatingRecord {
        RatingRecord {
            key: CountryKey::from_raw(country),
            country: country.to_string(),
            brand: brand.to_string(),
            rating,
        }
    }

    #[test]
    fn means_are_grouped_and_sorted_non_increasing() {
        let records = vec![
            rec("Japan", "Nissin", 3.0),
            rec("Japan", "Nissin", 5.0),
            rec("Japan", "Maruchan", 4.5),
            rec("Vietnam", "Acecook", 5.0), // other country, filtered out
        ];
        let means = brand_means(&records, &CountryKey::from_raw("Japan"));

        assert_eq!(means.len(), 2);
        assert_eq!(means[0].brand, "Maruchan");
        assert_eq!(means[0].mean_rating, 4.5);
        assert_eq!(means[1].mean_rating, 4.0);
        for pair in means.windows(2) {
            assert!(pair[0].mean_rating >= pair[1].mean_rating);
        }
    }

    #[test]
    fn equal_means_keep_input_order() {
        // A: [3, 5] -> 4.0, B: [4] -> 4.0. Tie, stable order preserved.
        let records = vec![
            rec("Japan", "A", 3.0),
            rec("Japan", "B", 4.0),
            rec("Japan", "A", 5.0),
        ];
        let means = brand_means(&records, &CountryKey::from_raw("Japan"));
        assert_eq!(means[0].brand, "A");
        assert_eq!(means[1].brand, "B");
        assert_eq!(means[0].mean_rating, means[1].mean_rating);
    }

    #[test]
    fn never_returns_more_than_max_bars() {
        let records: Vec<RatingRecord> = (0..50)
            .map(|i| rec("Japan", &format!("brand{i}"), (i % 5) as f64))
            .collect();
        let means = brand_means(&records, &CountryKey::from_raw("Japan"));
        assert_eq!(means.len(), MAX_BARS);
    }

    #[test]
    fn empty_country_yields_empty_means() {
        let records = vec![rec("Japan", "Nissin", 4.0)];
        assert!(brand_means(&records, &CountryKey::from_raw("Mars")).is_empty());
    }

    #[test]
    fn top_brand_tie_is_first_encountered() {
        let records = vec![
            rec("Japan", "First", 5.0),
            rec("Japan", "Second", 5.0),
            rec("Japan", "Third", 4.0),
        ];
        let top = top_rated_brand(&records, &CountryKey::from_raw("Japan")).unwrap();
        assert_eq!(top.brand, "First");
    }

    #[test]
    fn brand_detail_averages_one_pair() {
        let records = vec![
            rec("Japan", "Nissin", 3.0),
            rec("Japan", "Nissin", 5.0),
            rec("Vietnam", "Nissin", 1.0),
        ];
        let key = CountryKey::from_raw("Japan");
        assert_eq!(brand_detail(&records, &key, "Nissin"), Some(4.0));
        assert_eq!(brand_detail(&records, &key, "Unknown"), None);
    }
}
