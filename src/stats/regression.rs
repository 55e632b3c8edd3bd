//! Regression Module
//! Trend fitting and correlation for the happiness/consumption scatterplot.
//! Consumption enters both statistics through its natural log.

use statrs::statistics::Statistics;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("need at least two usable points, got {0}")]
    NotEnoughData(usize),
    #[error("zero variance in input, statistic undefined")]
    ZeroVariance,
}

/// Fitted linear relationship between happiness score and ln(consumption).
/// Computed once per dataset load, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Ordinary least squares of ln(consumption) on happiness score.
    /// `pairs` are (happiness, consumption in USD millions); non-positive or
    /// non-finite consumption cannot be log-transformed and is skipped.
    ///
    /// All-equal x-values make the denominator zero; that is reported as
    /// [`StatsError::ZeroVariance`] instead of a NaN line.
    pub fn fit(pairs: &[(f64, f64)]) -> Result<Self, StatsError> {
        let (xs, ys) = log_points(pairs)?;

        let mean_x = Statistics::mean(&xs);
        let mean_y = Statistics::mean(&ys);

        let denom: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        if denom == 0.0 {
            return Err(StatsError::ZeroVariance);
        }

        let num: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        let slope = num / denom;
        Ok(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    /// Fitted ln(consumption) at a happiness score.
    pub fn log_value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Fitted consumption at a happiness score (back out of log space).
    pub fn value_at(&self, x: f64) -> f64 {
        self.log_value_at(x).exp()
    }
}

/// Pearson correlation between happiness score and ln(consumption).
/// Same degeneracy rules as [`TrendLine::fit`]: zero variance on either axis
/// is an error, never a propagated NaN.
pub fn log_correlation(pairs: &[(f64, f64)]) -> Result<f64, StatsError> {
    let (xs, ys) = log_points(pairs)?;

    let mean_x = Statistics::mean(&xs);
    let mean_y = Statistics::mean(&ys);

    let num: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let var_x: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    let var_y: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return Err(StatsError::ZeroVariance);
    }
    Ok(num / denom)
}

fn log_points(pairs: &[(f64, f64)]) -> Result<(Vec<f64>, Vec<f64>), StatsError> {
    let mut xs = Vec::with_capacity(pairs.len());
    let mut ys = Vec::with_capacity(pairs.len());
    for &(x, c) in pairs {
        if x.is_finite() && c.is_finite() && c > 0.0 {
            xs.push(x);
            ys.push(c.ln());
        }
    }
    if xs.len() < 2 {
        return Err(StatsError::NotEnoughData(xs.len()));
    }
    Ok((xs, ys))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn recovers_log_linear_relationship() {
        // y = e^x, so ln y = x: slope 1, intercept 0.
        let pairs = [(1.0, 1.0_f64.exp()), (2.0, 2.0_f64.exp())];
        let line = TrendLine::fit(&pairs).unwrap();
        assert!((line.slope - 1.0).abs() < TOL);
        assert!(line.intercept.abs() < TOL);
        assert!((line.value_at(3.0) - 3.0_f64.exp()).abs() < 1e-6);
    }

    #[test]
    fn fit_reports_zero_x_variance() {
        let pairs = [(4.0, 10.0), (4.0, 20.0), (4.0, 30.0)];
        assert_eq!(TrendLine::fit(&pairs), Err(StatsError::ZeroVariance));
    }

    #[test]
    fn fit_needs_two_usable_points() {
        assert_eq!(TrendLine::fit(&[]), Err(StatsError::NotEnoughData(0)));
        // Non-positive consumption is unusable on a log scale.
        assert_eq!(
            TrendLine::fit(&[(1.0, 5.0), (2.0, -3.0)]),
            Err(StatsError::NotEnoughData(1))
        );
    }

    #[test]
    fn perfect_log_linear_data_correlates_to_one() {
        let pairs: Vec<(f64, f64)> = (1..=10)
            .map(|i| {
                let x = i as f64;
                (x, (0.5 * x + 2.0).exp())
            })
            .collect();
        let r = log_correlation(&pairs).unwrap();
        assert!((r - 1.0).abs() < TOL);

        let inverted: Vec<(f64, f64)> =
            pairs.iter().map(|&(x, _)| (x, (-0.5 * x + 2.0).exp())).collect();
        let r = log_correlation(&inverted).unwrap();
        assert!((r + 1.0).abs() < TOL);
    }

    #[test]
    fn correlation_reports_zero_variance_on_either_axis() {
        let flat_y = [(1.0, 7.0), (2.0, 7.0), (3.0, 7.0)];
        assert_eq!(log_correlation(&flat_y), Err(StatsError::ZeroVariance));

        let flat_x = [(5.0, 1.0), (5.0, 2.0), (5.0, 3.0)];
        assert_eq!(log_correlation(&flat_x), Err(StatsError::ZeroVariance));
    }
}
