use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use crate::application::ChartSession;
use crate::domain::{
    chart::{ChartConfig, ChartFormatters},
    errors::{AppError, AppResult},
    events::ChartEvent,
    logging::{LogComponent, LogLevel, get_logger},
    market_data::{Candle, IndicatorDefinition, PositionalCandle},
};
use crate::log_error;

fn to_js(err: AppError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Selected candle as JSON. A candle that fails to serialize is logged and
/// the selection callback is not called.
fn selection_payload(index: usize, candle: &Candle) -> Option<String> {
    match serde_json::to_string(candle) {
        Ok(json) => Some(json),
        Err(err) => {
            get_logger().warn(
                LogComponent::Presentation("CandleChartApi"),
                &format!("selected candle {} not serializable: {}", index, err),
            );
            None
        }
    }
}

fn parse_config(json: &str) -> AppResult<ChartConfig> {
    if json.trim().is_empty() {
        return Ok(ChartConfig::default());
    }
    Ok(serde_json::from_str(json)?)
}

/// JavaScript bridge around a [`ChartSession`]. Only parses inputs and
/// serializes outputs; all behavior lives in the application layer.
#[wasm_bindgen]
pub struct CandleChartApi {
    session: ChartSession,
}

#[wasm_bindgen]
impl CandleChartApi {
    /// Create a chart from a JSON config; an empty string uses the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<CandleChartApi, JsValue> {
        let config = parse_config(config_json).map_err(to_js)?;
        get_logger().info(
            LogComponent::Presentation("CandleChartApi"),
            &format!("chart created, {} initial candles", config.initial_visible_candle_count),
        );
        Ok(Self { session: ChartSession::new(config, ChartFormatters::default()) })
    }

    /// `candles_json`: array of candles with positional `trends` arrays.
    /// `definitions_json`: indicator definitions, aligned with those arrays.
    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&mut self, candles_json: &str, definitions_json: &str) -> Result<(), JsValue> {
        self.load(candles_json, definitions_json)
            .inspect_err(|err| {
                get_logger().log_with_metadata(
                    LogLevel::Error,
                    LogComponent::Presentation("CandleChartApi"),
                    &format!("setData failed: {}", err),
                    &format!("candles_json={}B definitions_json={}B", candles_json.len(), definitions_json.len()),
                );
            })
            .map_err(to_js)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.resize(width, height);
    }

    #[wasm_bindgen(js_name = panBegin)]
    pub fn pan_begin(&mut self) {
        self.session.pan_begin();
    }

    #[wasm_bindgen(js_name = panUpdate)]
    pub fn pan_update(&mut self, translation_x: f64) {
        self.session.pan_update(translation_x);
    }

    #[wasm_bindgen(js_name = panEnd)]
    pub fn pan_end(&mut self) {
        self.session.pan_end();
    }

    #[wasm_bindgen(js_name = pinchStart)]
    pub fn pinch_start(&mut self, focal_x: f64) {
        self.session.pinch_start(focal_x);
    }

    #[wasm_bindgen(js_name = pinchUpdate)]
    pub fn pinch_update(&mut self, scale: f64, focal_x: f64) {
        self.session.pinch_update(scale, focal_x);
    }

    #[wasm_bindgen(js_name = pinchEnd)]
    pub fn pinch_end(&mut self) {
        self.session.pinch_end();
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.session.pointer_down(x, y);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.session.pointer_move(x, y);
    }

    /// Returns the index of the selected candle, if one was highlighted.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> Option<usize> {
        self.session.pointer_up().map(|selection| selection.index)
    }

    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&mut self) -> Option<usize> {
        self.session.pointer_cancel().map(|selection| selection.index)
    }

    /// Register `callback(index, candleJson)` for candle selections.
    #[wasm_bindgen(js_name = onCandleSelected)]
    pub fn on_candle_selected(&mut self, callback: js_sys::Function) {
        self.session.subscribe(move |event| {
            let ChartEvent::CandleSelected { index, candle } = event else {
                return;
            };
            let Some(candle_json) = selection_payload(*index, candle) else {
                return;
            };
            if let Err(err) = callback.call2(
                &JsValue::NULL,
                &JsValue::from_f64(*index as f64),
                &JsValue::from_str(&candle_json),
            ) {
                log_error!(LogComponent::Presentation("CandleChartApi"), "selection callback threw: {:?}", err);
            }
        });
    }

    /// Current render frame as JSON.
    pub fn frame(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.frame()).map_err(|err| to_js(err.into()))
    }

    #[wasm_bindgen(js_name = candleCount)]
    pub fn candle_count(&self) -> usize {
        self.session.data().len()
    }
}

impl CandleChartApi {
    fn load(&mut self, candles_json: &str, definitions_json: &str) -> AppResult<()> {
        let rows: Vec<PositionalCandle> = serde_json::from_str(candles_json)?;
        let definitions: Vec<IndicatorDefinition> = if definitions_json.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(definitions_json)?
        };
        self.session.load_positional(rows, &definitions)
    }
}
