//! Stats module - brand aggregation, trend fitting and correlation.

mod aggregator;
mod regression;

pub use aggregator::{brand_detail, brand_means, top_rated_brand, BrandAggregate, MAX_BARS};
pub use regression::{log_correlation, StatsError, TrendLine};
