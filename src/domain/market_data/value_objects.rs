use derive_more::{Constructor, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Value Object - millisecond timestamp
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Deref, Constructor, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_millis(value: i64) -> Self {
        Self(value)
    }
}

/// Value Object - opaque indicator identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorId(String);

impl IndicatorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Id of one line belonging to a multi-line indicator, e.g. `macd.signal`.
    pub fn child(&self, suffix: &str) -> Self {
        Self(format!("{}.{}", self.0, suffix))
    }
}

impl From<&str> for IndicatorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// How an indicator line is computed from closes. Periods stay signed so a
/// negative wire value is reported as an argument error, not a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorKind {
    #[strum(serialize = "moving_average")]
    MovingAverage { period: i64 },
    #[strum(serialize = "rsi")]
    Rsi { period: i64 },
    #[strum(serialize = "macd")]
    Macd { fast: i64, slow: i64, signal: i64 },
}

/// Value Object - a single trend line as the host knows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    pub id: IndicatorId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<IndicatorKind>,
}

impl IndicatorDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: IndicatorId::new(id), label: label.into(), kind: None }
    }

    pub fn computed(id: impl Into<String>, label: impl Into<String>, kind: IndicatorKind) -> Self {
        Self { kind: Some(kind), ..Self::new(id, label) }
    }
}

/// Value Object - price/volume extremes for axis scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub max: f64,
    pub min: f64,
}

impl Extremes {
    pub const PRICE_PLACEHOLDER: Extremes = Extremes { max: 1.0, min: 0.0 };
    pub const VOLUME_PLACEHOLDER: Extremes = Extremes { max: 0.0, min: 0.0 };

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}
