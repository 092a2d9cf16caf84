use super::value_objects::{Insets, Size};
use crate::domain::market_data::{Candle, Timestamp};
use crate::time_utils::{format_time_label, format_timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Numeric chart settings; formatters live in [`ChartFormatters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub initial_visible_candle_count: usize,
    pub insets: Insets,
    /// Gap between the touch point and the overlay panel.
    pub overlay_margin: f64,
    pub overlay_size: Size,
    pub price_label_count: usize,
    /// Minimum horizontal distance between time labels.
    pub time_label_spacing: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            initial_visible_candle_count: 90,
            insets: Insets::default(),
            overlay_margin: 8.0,
            overlay_size: Size::new(160.0, 120.0),
            price_label_count: 5,
            time_label_spacing: 80.0,
        }
    }
}

/// One labelled row of the tap overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayField {
    pub label: String,
    pub value: String,
}

impl OverlayField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

pub type TimeFormatter = Arc<dyn Fn(Timestamp, i64) -> String + Send + Sync>;
pub type PriceFormatter = Arc<dyn Fn(f64) -> String + Send + Sync>;
pub type OverlayFormatter = Arc<dyn Fn(&Candle) -> Vec<OverlayField> + Send + Sync>;

/// Pluggable display formatting.
///
/// `time` receives a timestamp and the visible time span in milliseconds.
#[derive(Clone)]
pub struct ChartFormatters {
    pub time: TimeFormatter,
    pub price: PriceFormatter,
    pub overlay: OverlayFormatter,
}

impl fmt::Debug for ChartFormatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartFormatters").finish_non_exhaustive()
    }
}

pub fn default_price_label(price: f64) -> String {
    format!("{:.2}", price)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(default_price_label).unwrap_or_else(|| "-".to_string())
}

pub fn default_overlay_fields(candle: &Candle) -> Vec<OverlayField> {
    vec![
        OverlayField::new("Time", format_timestamp(candle.timestamp.value())),
        OverlayField::new("Open", format_optional(candle.open)),
        OverlayField::new("High", format_optional(candle.high)),
        OverlayField::new("Low", format_optional(candle.low)),
        OverlayField::new("Close", format_optional(candle.close)),
        OverlayField::new("Volume", format_optional(candle.volume)),
    ]
}

impl Default for ChartFormatters {
    fn default() -> Self {
        Self {
            time: Arc::new(|ts: Timestamp, span: i64| format_time_label(ts.value(), span)),
            price: Arc::new(default_price_label),
            overlay: Arc::new(default_overlay_fields),
        }
    }
}

impl ChartFormatters {
    pub fn with_time(mut self, f: impl Fn(Timestamp, i64) -> String + Send + Sync + 'static) -> Self {
        self.time = Arc::new(f);
        self
    }

    pub fn with_price(mut self, f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        self.price = Arc::new(f);
        self
    }

    pub fn with_overlay(mut self, f: impl Fn(&Candle) -> Vec<OverlayField> + Send + Sync + 'static) -> Self {
        self.overlay = Arc::new(f);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_json_fills_defaults() {
        let json = r#"{"initial_visible_candle_count": 30, "insets": {"right": 40}}"#;
        let config: ChartConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.initial_visible_candle_count, 30);
        assert_eq!(config.insets, Insets { right: 40.0, ..Insets::default() });
        assert_eq!(config.overlay_margin, 8.0);
    }

    #[test]
    fn default_overlay_marks_missing_values() {
        let mut candle = Candle::complete(0, 1.0, 2.0, 0.5, 1.25, 10.0);
        candle.volume = None;
        let fields = default_overlay_fields(&candle);
        assert_eq!(fields[4], OverlayField::new("Close", "1.25"));
        assert_eq!(fields[5], OverlayField::new("Volume", "-"));
    }
}
