//! Zoom (pixels per candle) and pan (pixel scroll offset) state.

use serde::Serialize;

/// Fewest candles visible at maximum zoom-in.
pub const MIN_VISIBLE_CANDLES: usize = 14;

/// Clamp that maps NaN to `lo` and infinities to the matching bound.
/// Requires `lo <= hi`.
#[inline]
pub fn clamp_finite(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() { lo } else { value.max(lo).min(hi) }
}

/// Scroll offset beyond which the newest candle would leave the right edge.
pub fn max_start_offset(drawable_width: f64, candle_width: f64, candle_count: usize) -> f64 {
    if !(candle_width > 0.0) || !drawable_width.is_finite() || !candle_width.is_finite() {
        return 0.0;
    }
    let limit = candle_width * (candle_count as f64 - drawable_width / candle_width);
    if limit.is_finite() { limit.max(0.0) } else { 0.0 }
}

/// Allowed candle width range for a drawable width and candle count.
pub fn candle_width_bounds(drawable_width: f64, candle_count: usize) -> (f64, f64) {
    let count = candle_count.max(1);
    let min = drawable_width / count as f64;
    let max = drawable_width / count.min(MIN_VISIBLE_CANDLES) as f64;
    (min, max)
}

/// View parameters controlling zoom and pan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ViewState {
    pub candle_width: f64,
    pub start_offset: f64,
    pub drawable_width: f64,
}

impl ViewState {
    /// Re-derive the state for a new drawable width / candle count.
    ///
    /// Without a previous state the window shows `min(count, initial)` candles
    /// anchored to the newest data; otherwise the previous zoom and pan are
    /// clamped into the new bounds. Returns `None` until both the width and the
    /// candle count are usable.
    pub fn resize(
        previous: Option<ViewState>,
        drawable_width: f64,
        candle_count: usize,
        initial_visible_count: usize,
    ) -> Option<ViewState> {
        if candle_count == 0 || !drawable_width.is_finite() || drawable_width <= 0.0 {
            return None;
        }
        let (min_width, max_width) = candle_width_bounds(drawable_width, candle_count);
        let requested = match previous {
            Some(prev) => prev.candle_width,
            None => drawable_width / candle_count.min(initial_visible_count.max(1)) as f64,
        };
        let candle_width = clamp_finite(requested, min_width, max_width);
        let max_offset = max_start_offset(drawable_width, candle_width, candle_count);
        let start_offset = match previous {
            Some(prev) => clamp_finite(prev.start_offset, 0.0, max_offset),
            None => max_offset,
        };
        Some(ViewState { candle_width, start_offset, drawable_width })
    }

    /// Candles fitting the drawable width at the current zoom.
    pub fn visible_count(&self) -> f64 {
        self.drawable_width / self.candle_width
    }

    pub fn max_start_offset(&self, candle_count: usize) -> f64 {
        max_start_offset(self.drawable_width, self.candle_width, candle_count)
    }

    /// Same zoom, new scroll offset clamped into range.
    pub fn with_start_offset(&self, start_offset: f64, candle_count: usize) -> ViewState {
        ViewState {
            start_offset: clamp_finite(start_offset, 0.0, self.max_start_offset(candle_count)),
            ..*self
        }
    }

    /// Visible candle range `[start, end)` derived from view parameters.
    pub fn visible_range(&self, candle_count: usize) -> (usize, usize) {
        if candle_count == 0 || !(self.candle_width > 0.0) {
            return (0, 0);
        }
        let raw_start = (self.start_offset / self.candle_width).floor();
        let start = clamp_finite(raw_start, 0.0, (candle_count - 1) as f64) as usize;
        let raw_end = (start as f64 + self.visible_count()).ceil();
        let end = clamp_finite(raw_end, start as f64, candle_count as f64) as usize;
        (start, end)
    }
}
