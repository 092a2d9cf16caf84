use crate::domain::market_data::{Candle, ChartData, IndicatorId, TrendValues};
use crate::view_state::ViewState;
use serde::Serialize;

/// Visible values of one indicator line inside a slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendWindow<'a> {
    pub id: &'a IndicatorId,
    pub label: &'a str,
    /// Aligned with [`ViewportSlice::candles`].
    pub values: Vec<Option<f64>>,
}

/// Read-only view of the visible candles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewportSlice<'a> {
    /// `candles[start_index..end_index]` plus one overscan candle when `end_index < n`.
    pub candles: &'a [Candle],
    pub start_index: usize,
    pub end_index: usize,
    pub trends: Vec<TrendWindow<'a>>,
    /// Trend values of the candle before `start_index`, or the leading fallback.
    pub leading_trends: TrendValues,
    /// Trend values of the candle at `end_index + 1`, or the trailing fallback.
    pub trailing_trends: TrendValues,
}

impl ViewportSlice<'_> {
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Global index of a slice-local position.
    pub fn global_index(&self, local: usize) -> Option<usize> {
        (local < self.candles.len()).then(|| self.start_index + local)
    }
}

/// Cut the visible window out of the full data set.
///
/// Trend lines are resolved by id, so a line missing from either side of the
/// boundary falls back to the caller's value for that id (or `None`).
pub fn slice_viewport<'a>(
    data: &'a ChartData,
    view: Option<&ViewState>,
    leading_fallback: &TrendValues,
    trailing_fallback: &TrendValues,
) -> ViewportSlice<'a> {
    let n = data.candles.len();
    let (start_index, end_index) = match view {
        Some(view) if n > 0 => view.visible_range(n),
        _ => (0, 0),
    };
    if n == 0 || view.is_none() {
        return ViewportSlice {
            candles: &[],
            start_index,
            end_index,
            trends: Vec::new(),
            leading_trends: TrendValues::new(),
            trailing_trends: TrendValues::new(),
        };
    }

    let slice_end = if end_index < n { end_index + 1 } else { end_index };
    let candles = &data.candles[start_index..slice_end];

    let boundary = |index: Option<usize>, fallback: &TrendValues| -> TrendValues {
        data.trends
            .definitions()
            .iter()
            .map(|d| {
                let value = match index {
                    Some(i) => data.trends.value_at(&d.id, i),
                    None => fallback.get(&d.id).copied().flatten(),
                };
                (d.id.clone(), value)
            })
            .collect()
    };
    let leading_index = start_index.checked_sub(1);
    let trailing_index = Some(end_index + 1).filter(|&i| i < n);

    let trends = data
        .trends
        .definitions()
        .iter()
        .map(|d| TrendWindow {
            id: &d.id,
            label: &d.label,
            values: (start_index..slice_end).map(|i| data.trends.value_at(&d.id, i)).collect(),
        })
        .collect();

    ViewportSlice {
        candles,
        start_index,
        end_index,
        trends,
        leading_trends: boundary(leading_index, leading_fallback),
        trailing_trends: boundary(trailing_index, trailing_fallback),
    }
}
