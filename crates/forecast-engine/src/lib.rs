use chrono::{Datelike, Duration};
use sentinel_core::{Forecast, ForecastPoint, Forecaster, PricePoint};
use statrs::statistics::Statistics;

/// Days of history required before weekday seasonality is estimated.
const SEASONALITY_MIN_POINTS: usize = 14;

/// Half-width multiplier for the uncertainty band (~95% under normal
/// residuals).
const BAND_Z: f64 = 1.96;

/// Linear trend with optional weekday seasonal offsets, projected forward
/// at a daily step. Small and deterministic; the point is a direction and
/// a band, not a price target.
pub struct TrendModel;

impl TrendModel {
    pub fn new() -> Self {
        Self
    }

    /// OLS fit of y over 0..n; returns (intercept, slope).
    fn fit_line(y: &[f64]) -> (f64, f64) {
        let n = y.len() as f64;
        let sum_x: f64 = (0..y.len()).map(|x| x as f64).sum();
        let sum_y: f64 = y.iter().sum();
        let sum_xy: f64 = y.iter().enumerate().map(|(x, y)| x as f64 * y).sum();
        let sum_x2: f64 = (0..y.len()).map(|x| (x as f64).powi(2)).sum();

        let denom = n * sum_x2 - sum_x * sum_x;
        if denom == 0.0 {
            return (sum_y / n, 0.0);
        }
        let slope = (n * sum_xy - sum_x * sum_y) / denom;
        let intercept = (sum_y - slope * sum_x) / n;
        (intercept, slope)
    }

    /// Mean detrended residual per weekday (Mon=0), when enough data exists.
    fn weekday_offsets(series: &[PricePoint], intercept: f64, slope: f64) -> [f64; 7] {
        let mut sums = [0.0f64; 7];
        let mut counts = [0usize; 7];

        if series.len() >= SEASONALITY_MIN_POINTS {
            for (x, point) in series.iter().enumerate() {
                let residual = point.close - (intercept + slope * x as f64);
                let day = point.timestamp.weekday().num_days_from_monday() as usize;
                sums[day] += residual;
                counts[day] += 1;
            }
        }

        let mut offsets = [0.0f64; 7];
        for day in 0..7 {
            if counts[day] > 0 {
                offsets[day] = sums[day] / counts[day] as f64;
            }
        }
        offsets
    }
}

impl Default for TrendModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for TrendModel {
    fn forecast(&self, series: &[PricePoint], horizon: usize) -> Option<Forecast> {
        if series.is_empty() || horizon == 0 {
            return None;
        }

        let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
        let (intercept, slope) = Self::fit_line(&closes);
        let offsets = Self::weekday_offsets(series, intercept, slope);

        let residuals: Vec<f64> = series
            .iter()
            .enumerate()
            .map(|(x, p)| {
                let day = p.timestamp.weekday().num_days_from_monday() as usize;
                p.close - (intercept + slope * x as f64 + offsets[day])
            })
            .collect();
        let spread = if residuals.len() >= 2 {
            (&residuals).std_dev()
        } else {
            0.0
        };
        let half_band = BAND_Z * spread;

        let last = series[series.len() - 1];
        let points = (1..=horizon)
            .map(|step| {
                let timestamp = last.timestamp + Duration::days(step as i64);
                let x = (series.len() - 1 + step) as f64;
                let day = timestamp.weekday().num_days_from_monday() as usize;
                let predicted = intercept + slope * x + offsets[day];
                ForecastPoint {
                    timestamp,
                    predicted,
                    lower: predicted - half_band,
                    upper: predicted + half_band,
                }
            })
            .collect();

        Some(Forecast { points })
    }
}
