//! Moving average, RSI, EMA and MACD over candles with optional samples.
//!
//! Every function returns one entry per input candle; `None` means "no value
//! yet". A gap never resets or biases the running state of later values.

use super::{Candle, IndicatorDefinition, IndicatorKind, TrendSet};
use crate::domain::errors::{AppError, AppResult};
use crate::domain::logging::{LogComponent, get_logger};
use serde::Serialize;

fn closes(candles: &[Candle]) -> Vec<Option<f64>> {
    candles.iter().map(|c| c.close).collect()
}

/// Simple moving average of closes.
///
/// Emits nothing until the input holds at least `2 * period` samples. The
/// window is seeded from the present closes among the first `period` samples
/// and then slides in O(1); a window whose entering or leaving close is
/// missing yields `None` and leaves the running average untouched.
pub fn moving_average(candles: &[Candle], period: usize) -> AppResult<Vec<Option<f64>>> {
    let period = AppError::check_period("period", period)?;
    let n = candles.len();
    let mut out = vec![None; n];
    if n / 2 < period {
        return Ok(out);
    }

    let (sum, count) = candles[..period]
        .iter()
        .filter_map(|c| c.close)
        .fold((0.0, 0usize), |(sum, count), close| (sum + close, count + 1));
    if count == 0 {
        return Ok(out);
    }

    let mut avg = sum / count as f64;
    out[period - 1] = Some(avg);
    let p = period as f64;
    for i in period..n {
        if let (Some(entering), Some(leaving)) = (candles[i].close, candles[i - period].close) {
            avg += (entering - leaving) / p;
            out[i] = Some(avg);
        }
    }
    Ok(out)
}

#[inline]
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Relative Strength Index of closes with Wilder smoothing.
pub fn relative_strength_index(candles: &[Candle], period: usize) -> AppResult<Vec<Option<f64>>> {
    let period = AppError::check_period("period", period)?;
    let mut out = vec![None; candles.len()];
    let p = period as f64;

    let mut seeded = 0usize;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..candles.len() {
        let (Some(prev), Some(cur)) = (candles[i - 1].close, candles[i].close) else {
            continue;
        };
        let delta = cur - prev;
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        if seeded < period {
            avg_gain += gain;
            avg_loss += loss;
            seeded += 1;
            if seeded < period {
                continue;
            }
            avg_gain /= p;
            avg_loss /= p;
        } else {
            avg_gain = (avg_gain * (p - 1.0) + gain) / p;
            avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        }
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    Ok(out)
}

/// EMA over an arbitrary value sequence. Seeds from the mean of the first
/// `period` present values; missing values pass through as `None`.
pub fn ema_of(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let multiplier = 2.0 / (period as f64 + 1.0);

    let mut seed_sum = 0.0;
    let mut seed_count = 0usize;
    let mut ema: Option<f64> = None;
    for (i, value) in values.iter().enumerate() {
        let Some(value) = *value else { continue };
        match ema {
            Some(prev) => {
                let next = (value - prev) * multiplier + prev;
                ema = Some(next);
                out[i] = Some(next);
            }
            None => {
                seed_sum += value;
                seed_count += 1;
                if seed_count == period {
                    let seed = seed_sum / period as f64;
                    ema = Some(seed);
                    out[i] = Some(seed);
                }
            }
        }
    }
    out
}

/// Exponential moving average of closes.
pub fn exponential_moving_average(candles: &[Candle], period: usize) -> AppResult<Vec<Option<f64>>> {
    let period = AppError::check_period("period", period)?;
    Ok(ema_of(&closes(candles), period))
}

fn difference(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some(a - b),
            _ => None,
        })
        .collect()
}

/// MACD line, signal line and histogram, each aligned with the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn macd(candles: &[Candle], fast: usize, slow: usize, signal: usize) -> AppResult<MacdSeries> {
    let fast = AppError::check_period("fast", fast)?;
    let slow = AppError::check_period("slow", slow)?;
    let signal = AppError::check_period("signal", signal)?;

    let prices = closes(candles);
    let macd_line = difference(&ema_of(&prices, fast), &ema_of(&prices, slow));
    let signal_line = ema_of(&macd_line, signal);
    let histogram = difference(&macd_line, &signal_line);
    Ok(MacdSeries { macd: macd_line, signal: signal_line, histogram })
}

/// Lines produced by one computed indicator definition.
fn compute_lines(
    candles: &[Candle],
    definition: &IndicatorDefinition,
    kind: IndicatorKind,
) -> AppResult<Vec<(IndicatorDefinition, Vec<Option<f64>>)>> {
    let lines = match kind {
        IndicatorKind::MovingAverage { period } => {
            let period = AppError::signed_period("period", period)?;
            vec![(definition.clone(), moving_average(candles, period)?)]
        }
        IndicatorKind::Rsi { period } => {
            let period = AppError::signed_period("period", period)?;
            vec![(definition.clone(), relative_strength_index(candles, period)?)]
        }
        IndicatorKind::Macd { fast, slow, signal } => {
            let series = macd(
                candles,
                AppError::signed_period("fast", fast)?,
                AppError::signed_period("slow", slow)?,
                AppError::signed_period("signal", signal)?,
            )?;
            let line = |suffix: &str, label: &str| IndicatorDefinition {
                id: definition.id.child(suffix),
                label: format!("{} {}", definition.label, label),
                kind: Some(kind),
            };
            vec![
                (line("macd", "MACD"), series.macd),
                (line("signal", "Signal"), series.signal),
                (line("histogram", "Histogram"), series.histogram),
            ]
        }
    };
    Ok(lines)
}

/// Compute every definition that carries a kind into a trend set.
/// Definitions without a kind are skipped; the first argument error aborts.
pub fn compute_trend_set(candles: &[Candle], definitions: &[IndicatorDefinition]) -> AppResult<TrendSet> {
    let computable: Vec<(&IndicatorDefinition, IndicatorKind)> =
        definitions.iter().filter_map(|d| d.kind.map(|kind| (d, kind))).collect();

    #[cfg(feature = "parallel")]
    let computed: Vec<_> = {
        use rayon::prelude::*;
        computable.par_iter().map(|(d, kind)| compute_lines(candles, d, *kind)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let computed: Vec<_> = computable.iter().map(|(d, kind)| compute_lines(candles, d, *kind)).collect();

    let mut set = TrendSet::new();
    for (lines, (definition, _)) in computed.into_iter().zip(&computable) {
        let lines = lines.inspect_err(|err| {
            get_logger().warn(
                LogComponent::Domain("Indicators"),
                &format!("indicator '{}' rejected: {}", definition.id, err),
            );
        })?;
        for (line, values) in lines {
            set.insert(line, values);
        }
    }
    Ok(set)
}
