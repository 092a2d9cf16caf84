use crate::{
    application::gestures::{
        CandleSelection, GestureContext, Highlight, InteractionState, overlay_position,
    },
    domain::{
        chart::{ChartConfig, ChartFormatters, ChartLayout, Point, Size, ViewportSlice, slice_viewport},
        errors::AppResult,
        events::{ChartEvent, EventDispatcher, InMemoryEventDispatcher},
        logging::{LogComponent, get_logger},
        market_data::{
            Candle, ChartData, DataValidationService, Extremes, IndicatorDefinition,
            PositionalCandle, TrendValues, compute_trend_set, price_extremes, volume_extremes,
        },
    },
    log_debug, log_trace, log_warn,
    view_state::ViewState,
};
use serde::Serialize;

/// A formatted tick on one of the axes. `position` is a drawable-local x for
/// time labels and y for price labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    pub position: f64,
    pub value: f64,
    pub text: String,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame<'a> {
    pub slice: ViewportSlice<'a>,
    pub price_extremes: Extremes,
    pub volume_extremes: Extremes,
    pub candle_width: f64,
    pub start_offset: f64,
    pub drawable: Size,
    pub price_labels: Vec<AxisLabel>,
    pub time_labels: Vec<AxisLabel>,
    pub highlight: Option<&'a Highlight>,
    /// Top-left corner of the info panel while a highlight is active.
    pub overlay_origin: Option<Point>,
}

/// Chart entry point: owns the data, layout and interaction state of one chart.
pub struct ChartSession {
    config: ChartConfig,
    formatters: ChartFormatters,
    data: ChartData,
    layout: ChartLayout,
    interaction: InteractionState,
    leading_fallback: TrendValues,
    trailing_fallback: TrendValues,
    dispatcher: InMemoryEventDispatcher,
}

impl ChartSession {
    pub fn new(config: ChartConfig, formatters: ChartFormatters) -> Self {
        let layout = ChartLayout::new(0.0, 0.0, config.insets);
        Self {
            config,
            formatters,
            data: ChartData::default(),
            layout,
            interaction: InteractionState::default(),
            leading_fallback: TrendValues::new(),
            trailing_fallback: TrendValues::new(),
            dispatcher: InMemoryEventDispatcher::new(),
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn view(&self) -> Option<&ViewState> {
        self.interaction.view.as_ref()
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.interaction.gestures.highlight.as_ref()
    }

    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: Fn(&ChartEvent) + 'static,
    {
        self.dispatcher.subscribe_to_chart_events(handler);
    }

    fn context(&self) -> GestureContext {
        GestureContext::new(self.layout, self.data.len())
    }

    /// Replace the chart data; the current zoom and pan are kept where the new
    /// data allows it.
    pub fn set_data(&mut self, data: ChartData) {
        log_debug!(
            LogComponent::Application("ChartSession"),
            "data replaced: {} candles, {} trend lines",
            data.len(),
            data.trends.len()
        );
        self.data = data;
        self.interaction = self.interaction.clear_highlight();
        self.relayout();
    }

    /// Compute the indicator definitions over `candles` and install both.
    pub fn set_candles(&mut self, candles: Vec<Candle>, definitions: &[IndicatorDefinition]) -> AppResult<()> {
        let trends = compute_trend_set(&candles, definitions)?;
        self.set_data(ChartData::new(candles, trends));
        Ok(())
    }

    /// Install candles in the positional wire form. Host-supplied lines come
    /// from the candles' trend arrays; definitions with a kind are computed.
    /// Rejected input is logged and leaves the current data in place.
    pub fn load_positional(
        &mut self,
        rows: Vec<PositionalCandle>,
        definitions: &[IndicatorDefinition],
    ) -> AppResult<()> {
        let count = rows.len();
        let data = Self::positional_data(rows, definitions).inspect_err(|err| {
            log_warn!(LogComponent::Application("ChartSession"), "rejected {} positional candles: {}", count, err);
        })?;
        self.set_data(data);
        Ok(())
    }

    fn positional_data(rows: Vec<PositionalCandle>, definitions: &[IndicatorDefinition]) -> AppResult<ChartData> {
        let mut data = ChartData::from_positional(rows, definitions);
        DataValidationService::new().validate_candle_sequence(&data.candles)?;
        let computed = compute_trend_set(&data.candles, definitions)?;
        for definition in computed.definitions() {
            if let Some(values) = computed.series(&definition.id) {
                data.trends.insert(definition.clone(), values.to_vec());
            }
        }
        Ok(data)
    }

    /// Trend values used at the edges of the data, where no neighbour exists.
    pub fn set_trend_fallbacks(&mut self, leading: TrendValues, trailing: TrendValues) {
        self.leading_fallback = leading;
        self.trailing_fallback = trailing;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.layout = ChartLayout::new(width, height, self.config.insets);
        self.interaction = self.interaction.clear_highlight();
        self.relayout();
    }

    fn relayout(&mut self) {
        let first_layout = self.interaction.view.is_none();
        let next = ViewState::resize(
            self.interaction.view,
            self.layout.drawable_width(),
            self.data.len(),
            self.config.initial_visible_candle_count,
        );
        if first_layout && next.is_some() {
            get_logger().debug(
                LogComponent::Application("ChartSession"),
                &format!(
                    "first layout: {:.1}px for {} candles",
                    self.layout.drawable_width(),
                    self.data.len()
                ),
            );
        }
        self.apply_view(next);
    }

    fn apply_view(&mut self, next: Option<ViewState>) {
        let changed = next != self.interaction.view;
        self.interaction.view = next;
        if let (true, Some(view)) = (changed, next) {
            self.dispatcher.publish_chart_event(ChartEvent::ViewportChanged {
                candle_width: view.candle_width,
                start_offset: view.start_offset,
            });
        }
    }

    fn apply(&mut self, next: InteractionState) {
        let had_highlight = self.interaction.gestures.highlight.is_some();
        let view = next.view;
        self.interaction.gestures = next.gestures;
        self.apply_view(view);
        if had_highlight && self.interaction.gestures.highlight.is_none() {
            self.dispatcher.publish_chart_event(ChartEvent::HighlightCleared);
        }
    }

    pub fn pan_begin(&mut self) {
        let next = self.interaction.pan_begin();
        self.apply(next);
    }

    pub fn pan_update(&mut self, translation_x: f64) {
        let next = self.interaction.pan_update(&self.context(), translation_x);
        self.apply(next);
    }

    pub fn pan_end(&mut self) {
        let next = self.interaction.pan_end();
        self.apply(next);
    }

    pub fn pinch_start(&mut self, focal_x: f64) {
        let next = self.interaction.pinch_start(&self.context(), focal_x - self.layout.insets.left);
        self.apply(next);
    }

    pub fn pinch_update(&mut self, scale: f64, focal_x: f64) {
        let next = self.interaction.pinch_update(&self.context(), scale, focal_x - self.layout.insets.left);
        log_trace!(
            LogComponent::Application("ChartSession"),
            "pinch scale={:.3} -> {:?}",
            scale,
            next.view
        );
        self.apply(next);
    }

    pub fn pinch_end(&mut self) {
        let next = self.interaction.pinch_end();
        self.apply(next);
    }

    /// Pointer down or move at a chart-space position.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let next = {
            let slice = self.slice();
            self.interaction.inspect(&self.context(), &slice, Point::new(x, y), &self.formatters.overlay)
        };
        self.apply(next);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.pointer_move(x, y);
    }

    /// Pointer up or cancel. Publishes and returns the selected candle when one
    /// was highlighted.
    pub fn pointer_up(&mut self) -> Option<CandleSelection> {
        let (next, selection) = self.interaction.release();
        self.apply(next);
        if let Some(selection) = selection {
            self.dispatcher.publish_chart_event(ChartEvent::CandleSelected {
                index: selection.index,
                candle: selection.candle,
            });
        }
        selection
    }

    pub fn pointer_cancel(&mut self) -> Option<CandleSelection> {
        self.pointer_up()
    }

    pub fn slice(&self) -> ViewportSlice<'_> {
        slice_viewport(
            &self.data,
            self.interaction.view.as_ref(),
            &self.leading_fallback,
            &self.trailing_fallback,
        )
    }

    pub fn frame(&self) -> RenderFrame<'_> {
        let slice = self.slice();
        let drawable = self.layout.drawable_size();
        let prices = price_extremes(slice.candles);
        let volumes = volume_extremes(slice.candles);
        let (candle_width, start_offset) =
            self.interaction.view.map_or((0.0, 0.0), |v| (v.candle_width, v.start_offset));

        let highlight = self.highlight();
        let overlay_origin = highlight.map(|h| {
            overlay_position(h.touch, self.config.overlay_size, drawable, self.config.overlay_margin)
        });

        RenderFrame {
            price_labels: self.price_labels(&prices, drawable.height),
            time_labels: self.time_labels(&slice),
            slice,
            price_extremes: prices,
            volume_extremes: volumes,
            candle_width,
            start_offset,
            drawable,
            highlight,
            overlay_origin,
        }
    }

    /// Evenly spaced price ticks from the bottom (min) to the top (max).
    pub fn price_labels(&self, extremes: &Extremes, drawable_height: f64) -> Vec<AxisLabel> {
        let count = self.config.price_label_count;
        if count == 0 {
            return Vec::new();
        }
        let steps = count.saturating_sub(1).max(1) as f64;
        (0..count)
            .map(|i| {
                let fraction = if count == 1 { 0.5 } else { i as f64 / steps };
                let value = extremes.min + extremes.range() * fraction;
                AxisLabel {
                    position: drawable_height * (1.0 - fraction),
                    value,
                    text: (self.formatters.price)(value),
                }
            })
            .collect()
    }

    /// Labels on every k-th candle so neighbouring labels are at least
    /// `time_label_spacing` pixels apart. Anchored on global indices so labels
    /// stay attached to their candles while panning.
    pub fn time_labels(&self, slice: &ViewportSlice<'_>) -> Vec<AxisLabel> {
        let Some(view) = self.interaction.view else {
            return Vec::new();
        };
        let (Some(first), Some(last)) = (slice.candles.first(), slice.candles.last()) else {
            return Vec::new();
        };
        let spacing = self.config.time_label_spacing.max(1.0);
        let step = (spacing / view.candle_width).ceil();
        let step = if step.is_finite() { (step as usize).max(1) } else { 1 };
        let span = last.timestamp.value() - first.timestamp.value();

        slice
            .candles
            .iter()
            .enumerate()
            .map(|(local, candle)| (slice.start_index + local, candle))
            .filter(|(index, _)| index % step == 0)
            .filter_map(|(index, candle)| {
                let x = index as f64 * view.candle_width - view.start_offset + view.candle_width / 2.0;
                (0.0..=view.drawable_width).contains(&x).then(|| AxisLabel {
                    position: x,
                    value: candle.timestamp.value() as f64,
                    text: (self.formatters.time)(candle.timestamp, span),
                })
            })
            .collect()
    }
}

impl Default for ChartSession {
    fn default() -> Self {
        Self::new(ChartConfig::default(), ChartFormatters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::Insets;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64;
                Candle::complete(i as i64 * 60_000, base, base + 2.0, base - 1.0, base + 1.0, 10.0 + i as f64)
            })
            .collect()
    }

    fn session() -> ChartSession {
        let config = ChartConfig {
            insets: Insets { left: 0.0, right: 0.0, top: 0.0, bottom: 0.0 },
            ..ChartConfig::default()
        };
        ChartSession::new(config, ChartFormatters::default())
    }

    #[test]
    fn view_appears_once_layout_and_data_are_known() {
        let mut s = session();
        s.resize(900.0, 300.0);
        assert!(s.view().is_none());
        s.set_data(ChartData::new(candles(200), Default::default()));
        let view = s.view().copied().unwrap();
        assert_eq!(view.candle_width, 10.0);
        assert_eq!(view.start_offset, 1100.0);
        assert_eq!(s.slice().end_index, 200);
    }

    #[test]
    fn set_candles_computes_definitions() {
        let mut s = session();
        let definitions = [IndicatorDefinition::computed(
            "rsi",
            "RSI 3",
            crate::domain::market_data::IndicatorKind::Rsi { period: 3 },
        )];
        s.set_candles(candles(10), &definitions).unwrap();
        assert_eq!(s.data().trends.value_at(&"rsi".into(), 3), Some(100.0));
        assert!(s.set_candles(candles(10), &[IndicatorDefinition::computed(
            "bad",
            "Bad",
            crate::domain::market_data::IndicatorKind::Rsi { period: 0 },
        )])
        .is_err());
    }

    #[test]
    fn price_labels_span_extremes() {
        let s = session();
        let labels = s.price_labels(&Extremes { max: 110.0, min: 100.0 }, 200.0);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["100.00", "102.50", "105.00", "107.50", "110.00"]);
        assert_eq!(labels[0].position, 200.0);
        assert_eq!(labels[4].position, 0.0);
    }

    #[test]
    fn release_publishes_selection() {
        let mut s = session();
        s.resize(500.0, 300.0);
        s.set_data(ChartData::new(candles(10), Default::default()));
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        s.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        s.pointer_down(125.0, 100.0);
        assert_eq!(s.highlight().map(|h| h.index), Some(2));
        let selection = s.pointer_up().unwrap();
        assert_eq!(selection.index, 2);
        assert!(s.highlight().is_none());
        assert!(matches!(events.borrow().last(), Some(ChartEvent::CandleSelected { index: 2, .. })));
    }
}
