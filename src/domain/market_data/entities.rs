pub use super::value_objects::{IndicatorDefinition, IndicatorId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One value per indicator id, used for boundary trend values.
pub type TrendValues = BTreeMap<IndicatorId, Option<f64>>;

/// Domain entity - Candle
///
/// Every numeric field may be missing; a missing value is never a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: Timestamp,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn new(
        timestamp: Timestamp,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: Option<f64>,
    ) -> Self {
        Self { timestamp, open, high, low, close, volume }
    }

    /// Candle with every field present.
    pub fn complete(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self::new(
            Timestamp::from_millis(timestamp),
            Some(open),
            Some(high),
            Some(low),
            Some(close),
            Some(volume),
        )
    }

    /// Upper price bound: high, else the larger of open/close, else whichever is present.
    pub fn upper_price(&self) -> Option<f64> {
        self.high.or_else(|| max_option(self.open, self.close))
    }

    /// Lower price bound: low, else the smaller of open/close, else whichever is present.
    pub fn lower_price(&self) -> Option<f64> {
        self.low.or_else(|| min_option(self.open, self.close))
    }
}

fn max_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn min_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Wire form of a candle carrying positional trend values, aligned with an
/// indicator definition list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionalCandle {
    #[serde(flatten)]
    pub candle: Candle,
    #[serde(default)]
    pub trends: Vec<Option<f64>>,
}

/// Indicator lines keyed by id, each aligned with the candle sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendSet {
    definitions: Vec<IndicatorDefinition>,
    series: HashMap<IndicatorId, Vec<Option<f64>>>,
}

impl TrendSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a line. The definition keeps its first position.
    pub fn insert(&mut self, definition: IndicatorDefinition, values: Vec<Option<f64>>) {
        if !self.definitions.iter().any(|d| d.id == definition.id) {
            self.definitions.push(definition.clone());
        }
        self.series.insert(definition.id, values);
    }

    /// Build from per-candle trend arrays aligned positionally with `definitions`.
    /// Slots beyond a candle's array are treated as missing. Definitions that
    /// carry a kind keep their slot but are left to the indicator engine.
    pub fn from_positional(definitions: &[IndicatorDefinition], rows: &[Vec<Option<f64>>]) -> Self {
        let mut set = Self::new();
        for (slot, definition) in definitions.iter().enumerate().filter(|(_, d)| d.kind.is_none()) {
            let values = rows.iter().map(|row| row.get(slot).copied().flatten()).collect();
            set.insert(definition.clone(), values);
        }
        set
    }

    pub fn definitions(&self) -> &[IndicatorDefinition] {
        &self.definitions
    }

    pub fn series(&self, id: &IndicatorId) -> Option<&[Option<f64>]> {
        self.series.get(id).map(Vec::as_slice)
    }

    /// Value of one line at a candle index; out of range reads as missing.
    pub fn value_at(&self, id: &IndicatorId, index: usize) -> Option<f64> {
        self.series.get(id).and_then(|values| values.get(index).copied().flatten())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Candles together with their indicator lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub candles: Vec<Candle>,
    pub trends: TrendSet,
}

impl ChartData {
    pub fn new(candles: Vec<Candle>, trends: TrendSet) -> Self {
        Self { candles, trends }
    }

    /// Split the positional wire form into candles and an id-keyed trend set.
    pub fn from_positional(rows: Vec<PositionalCandle>, definitions: &[IndicatorDefinition]) -> Self {
        let trend_rows: Vec<Vec<Option<f64>>> = rows.iter().map(|row| row.trends.clone()).collect();
        let candles = rows.into_iter().map(|row| row.candle).collect();
        Self { candles, trends: TrendSet::from_positional(definitions, &trend_rows) }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}
