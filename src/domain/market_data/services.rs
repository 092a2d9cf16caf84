use super::{Candle, Extremes};
use crate::domain::errors::{AppError, AppResult};

/// Price extremes over high/low with body fallbacks.
/// Returns `{max: 1, min: 0}` when nothing usable is present.
pub fn price_extremes(candles: &[Candle]) -> Extremes {
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    for candle in candles {
        if let Some(upper) = candle.upper_price() {
            max = max.max(upper);
        }
        if let Some(lower) = candle.lower_price() {
            min = min.min(lower);
        }
    }
    if max.is_finite() && min.is_finite() {
        Extremes { max, min }
    } else {
        Extremes::PRICE_PLACEHOLDER
    }
}

/// Volume extremes. Returns `{max: 0, min: 0}` when no volume is present.
pub fn volume_extremes(candles: &[Candle]) -> Extremes {
    candles
        .iter()
        .filter_map(|c| c.volume)
        .fold(None, |acc: Option<Extremes>, volume| {
            Some(match acc {
                Some(e) => Extremes { max: e.max.max(volume), min: e.min.min(volume) },
                None => Extremes { max: volume, min: volume },
            })
        })
        .unwrap_or(Extremes::VOLUME_PLACEHOLDER)
}

/// Candle checks run on the positional wire path. `ChartSession::set_data`
/// trusts its input and skips them.
#[derive(Clone, Default)]
pub struct DataValidationService;

impl DataValidationService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_candle(&self, candle: &Candle) -> AppResult<()> {
        let fields = [
            ("open", candle.open),
            ("high", candle.high),
            ("low", candle.low),
            ("close", candle.close),
            ("volume", candle.volume),
        ];
        for (name, value) in fields {
            if let Some(value) = value
                && !value.is_finite()
            {
                return Err(AppError::Validation(format!(
                    "{} is not finite at {}",
                    name,
                    candle.timestamp.value()
                )));
            }
        }
        if let (Some(high), Some(low)) = (candle.high, candle.low)
            && high < low
        {
            return Err(AppError::Validation(format!(
                "High price cannot be lower than low price at {}",
                candle.timestamp.value()
            )));
        }
        Ok(())
    }

    /// Ascending, duplicate-free timestamps and finite values.
    pub fn validate_candle_sequence(&self, candles: &[Candle]) -> AppResult<()> {
        for candle in candles {
            self.validate_candle(candle)?;
        }
        for (i, pair) in candles.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(AppError::Validation(format!(
                    "Candles are not in chronological order at index {}",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}
