//! Pan, pinch and tap-to-inspect as explicit state transitions.
//!
//! Every handler takes the current [`InteractionState`] plus the raw event
//! payload and returns the next state; the host owns storage and re-render
//! scheduling. Clamp bounds are always derived from the [`GestureContext`]
//! passed to the call, never from values cached at gesture start, so a resize
//! landing mid-gesture is picked up by the next update.

use crate::domain::chart::{ChartLayout, OverlayField, OverlayFormatter, Point, Size, ViewportSlice};
use crate::domain::market_data::Candle;
use crate::view_state::{ViewState, candle_width_bounds, clamp_finite};
use serde::Serialize;

/// Layout facts current at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    pub layout: ChartLayout,
    pub candle_count: usize,
}

impl GestureContext {
    pub fn new(layout: ChartLayout, candle_count: usize) -> Self {
        Self { layout, candle_count }
    }

    pub fn drawable_width(&self) -> f64 {
        self.layout.drawable_width()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSnapshot {
    pub start_offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchSnapshot {
    pub candle_width: f64,
    pub start_offset: f64,
    pub focal_x: f64,
}

/// Candle under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    /// Index into the full candle sequence.
    pub index: usize,
    pub candle: Candle,
    /// Drawable-local position: candle centre x, pointer y.
    pub position: Point,
    /// Drawable-local pointer position the overlay is placed around.
    pub touch: Point,
    pub fields: Vec<OverlayField>,
}

/// Emitted when the pointer is released over a highlighted candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandleSelection {
    pub index: usize,
    pub candle: Candle,
}

/// Transient per-gesture state. Pan and pinch keep separate snapshots so
/// their updates can interleave within one composite gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureState {
    pub pan: Option<PanSnapshot>,
    pub pinch: Option<PinchSnapshot>,
    pub highlight: Option<Highlight>,
}

/// Viewport plus gesture state: everything a gesture may change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    pub view: Option<ViewState>,
    pub gestures: GestureState,
}

impl InteractionState {
    pub fn new(view: Option<ViewState>) -> Self {
        Self { view, gestures: GestureState::default() }
    }

    fn with_view(&self, view: ViewState) -> Self {
        Self { view: Some(view), gestures: self.gestures.clone() }
    }

    fn with_gestures(&self, gestures: GestureState) -> Self {
        Self { view: self.view, gestures }
    }

    pub fn clear_highlight(&self) -> Self {
        self.with_gestures(GestureState { highlight: None, ..self.gestures.clone() })
    }

    // --- pan ---

    pub fn pan_begin(&self) -> Self {
        let pan = self.view.map(|view| PanSnapshot { start_offset: view.start_offset });
        self.with_gestures(GestureState { pan, highlight: None, ..self.gestures.clone() })
    }

    /// `translation_x` is the total horizontal finger travel since `pan_begin`;
    /// dragging right reveals older candles.
    pub fn pan_update(&self, ctx: &GestureContext, translation_x: f64) -> Self {
        let Some(view) = self.current_view(ctx) else {
            return self.clone();
        };
        let origin = self.gestures.pan.map_or(view.start_offset, |snap| snap.start_offset);
        let translation = if translation_x.is_finite() { translation_x } else { 0.0 };
        self.with_view(view.with_start_offset(origin - translation, ctx.candle_count))
    }

    pub fn pan_end(&self) -> Self {
        self.with_gestures(GestureState { pan: None, ..self.gestures.clone() })
    }

    // --- pinch ---

    pub fn pinch_start(&self, ctx: &GestureContext, focal_x: f64) -> Self {
        let width = ctx.drawable_width();
        let pinch = self.view.map(|view| PinchSnapshot {
            candle_width: view.candle_width,
            start_offset: view.start_offset,
            focal_x: clamp_finite(focal_x, 0.0, width),
        });
        self.with_gestures(GestureState { pinch, highlight: None, ..self.gestures.clone() })
    }

    /// Zoom by `scale` relative to the gesture start, keeping the candle that
    /// was under the focal point at start under the current focal point.
    pub fn pinch_update(&self, ctx: &GestureContext, scale: f64, focal_x: f64) -> Self {
        let Some(view) = self.current_view(ctx) else {
            return self.clone();
        };
        let width = view.drawable_width;
        let focal_x = clamp_finite(focal_x, 0.0, width);
        let snap = self.gestures.pinch.unwrap_or(PinchSnapshot {
            candle_width: view.candle_width,
            start_offset: view.start_offset,
            focal_x,
        });
        if !(snap.candle_width > 0.0) || !(width > 0.0) {
            return self.clone();
        }

        let (min_width, max_width) = candle_width_bounds(width, ctx.candle_count);
        let candle_width = clamp_finite(snap.candle_width * scale, min_width, max_width);
        let effective_scale = candle_width / snap.candle_width;

        let scaled_offset = snap.start_offset * effective_scale;
        let focal_shift = focal_x - snap.focal_x;
        let visible_delta = width / snap.candle_width - width / candle_width;
        let anchor_correction = visible_delta * candle_width * (snap.focal_x / width);
        let target = scaled_offset - focal_shift + anchor_correction;

        let zoomed = ViewState { candle_width, ..view };
        self.with_view(zoomed.with_start_offset(target, ctx.candle_count))
    }

    pub fn pinch_end(&self) -> Self {
        self.with_gestures(GestureState { pinch: None, ..self.gestures.clone() })
    }

    // --- tap / drag-to-inspect ---

    /// Pointer down or move at a chart-space position.
    pub fn inspect(
        &self,
        ctx: &GestureContext,
        slice: &ViewportSlice<'_>,
        pointer: Point,
        overlay: &OverlayFormatter,
    ) -> Self {
        let highlight = self
            .view
            .and_then(|view| ctx.layout.to_drawable(pointer).map(|local| (view, local)))
            .and_then(|(view, local)| locate_candle(&view, slice, local))
            .map(|(local_index, center_x, touch)| {
                let candle = slice.candles[local_index];
                Highlight {
                    index: slice.start_index + local_index,
                    candle,
                    position: Point::new(center_x, touch.y),
                    touch,
                    fields: overlay(&candle),
                }
            });
        self.with_gestures(GestureState { highlight, ..self.gestures.clone() })
    }

    /// Pointer up or cancel: drops the highlight and reports the candle that was
    /// highlighted, if any.
    pub fn release(&self) -> (Self, Option<CandleSelection>) {
        let selection = self
            .gestures
            .highlight
            .as_ref()
            .map(|h| CandleSelection { index: h.index, candle: h.candle });
        (self.clear_highlight(), selection)
    }

    /// View re-based onto the current drawable width.
    fn current_view(&self, ctx: &GestureContext) -> Option<ViewState> {
        let width = ctx.drawable_width();
        if ctx.candle_count == 0 || !(width > 0.0) {
            return None;
        }
        self.view.map(|view| ViewState { drawable_width: width, ..view })
    }
}

/// Slice-local candle index under a drawable-local point, with that candle's
/// centre x.
fn locate_candle(view: &ViewState, slice: &ViewportSlice<'_>, local: Point) -> Option<(usize, f64, Point)> {
    let width = view.candle_width;
    if !(width > 0.0) || slice.is_empty() {
        return None;
    }
    // centre of the first slice candle in drawable pixels
    let x_shift = slice.start_index as f64 * width - view.start_offset + width / 2.0;
    let candidate = ((local.x - x_shift + width / 2.0) / width).floor();
    if !candidate.is_finite() || candidate < 0.0 || candidate >= slice.candles.len() as f64 {
        return None;
    }
    let index = candidate as usize;
    Some((index, x_shift + index as f64 * width, local))
}

/// Top-left corner of the info panel for a touch point.
///
/// The panel sits right of the touch in the left half of the drawable area and
/// left of it otherwise, preferably above the touch, and never leaves the
/// drawable bounds.
pub fn overlay_position(touch: Point, panel: Size, drawable: Size, margin: f64) -> Point {
    let x = if touch.x < drawable.width / 2.0 {
        touch.x + margin
    } else {
        touch.x - margin - panel.width
    };
    let y = touch.y - margin - panel.height;
    Point::new(
        clamp_finite(x, 0.0, (drawable.width - panel.width).max(0.0)),
        clamp_finite(y, 0.0, (drawable.height - panel.height).max(0.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::Insets;

    fn ctx(width: f64, count: usize) -> GestureContext {
        let insets = Insets { left: 0.0, right: 0.0, top: 0.0, bottom: 0.0 };
        GestureContext::new(ChartLayout::new(width, 400.0, insets), count)
    }

    fn state(candle_width: f64, start_offset: f64, drawable_width: f64) -> InteractionState {
        InteractionState::new(Some(ViewState { candle_width, start_offset, drawable_width }))
    }

    #[test]
    fn pan_moves_from_snapshot() {
        let ctx = ctx(500.0, 100);
        let s = state(10.0, 300.0, 500.0).pan_begin();
        let s = s.pan_update(&ctx, 50.0);
        assert_eq!(s.view.unwrap().start_offset, 250.0);
        // updates are relative to the snapshot, not cumulative
        let s = s.pan_update(&ctx, 80.0);
        assert_eq!(s.view.unwrap().start_offset, 220.0);
        let s = s.pan_update(&ctx, -10_000.0);
        assert_eq!(s.view.unwrap().start_offset, 500.0);
        assert_eq!(s.pan_end().gestures.pan, None);
    }

    #[test]
    fn pan_without_view_is_noop() {
        let s = InteractionState::default().pan_begin().pan_update(&ctx(500.0, 10), 10.0);
        assert_eq!(s.view, None);
    }

    #[test]
    fn pinch_is_clamped_to_zoom_bounds() {
        let ctx = ctx(500.0, 100);
        let s = state(10.0, 0.0, 500.0).pinch_start(&ctx, 0.0);
        let zoomed_in = s.pinch_update(&ctx, 100.0, 0.0).view.unwrap();
        assert_eq!(zoomed_in.candle_width, 500.0 / 14.0);
        let zoomed_out = s.pinch_update(&ctx, 0.01, 0.0).view.unwrap();
        assert_eq!(zoomed_out.candle_width, 5.0);
        assert_eq!(zoomed_out.start_offset, 0.0);
    }

    #[test]
    fn overlay_prefers_right_and_above() {
        let drawable = Size::new(400.0, 300.0);
        let panel = Size::new(100.0, 50.0);
        assert_eq!(overlay_position(Point::new(50.0, 200.0), panel, drawable, 8.0), Point::new(58.0, 142.0));
        assert_eq!(overlay_position(Point::new(300.0, 200.0), panel, drawable, 8.0), Point::new(192.0, 142.0));
    }

    #[test]
    fn overlay_is_clamped_into_bounds() {
        let drawable = Size::new(400.0, 300.0);
        let panel = Size::new(100.0, 50.0);
        assert_eq!(overlay_position(Point::new(190.0, 10.0), panel, drawable, 8.0), Point::new(198.0, 0.0));
        let oversized = Size::new(500.0, 400.0);
        assert_eq!(overlay_position(Point::new(395.0, 10.0), oversized, drawable, 8.0), Point::new(0.0, 0.0));
    }
}
