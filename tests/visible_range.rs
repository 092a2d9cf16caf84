use candle_viewport::domain::chart::slice_viewport;
use candle_viewport::domain::market_data::{
    Candle, ChartData, IndicatorDefinition, PositionalCandle, TrendValues,
};
use candle_viewport::view_state::ViewState;

fn candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| Candle::complete(i as i64 * 60_000, 1.0, 2.0, 0.5, 1.5, 1.0))
        .collect()
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn slice_includes_one_overscan_candle() {
    let data = ChartData::new(candles(10), Default::default());
    let view = ViewState { candle_width: 50.0, start_offset: 0.0, drawable_width: 250.0 };
    let slice = slice_viewport(&data, Some(&view), &TrendValues::new(), &TrendValues::new());

    assert_eq!((slice.start_index, slice.end_index), (0, 5));
    assert_eq!(slice.candles.len(), 6);
    assert_eq!(slice.global_index(5), Some(5));
    assert_eq!(slice.global_index(6), None);
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn full_span_slice_is_whole_sequence() {
    let data = ChartData::new(candles(10), Default::default());
    let view = ViewState::resize(None, 500.0, 10, 90).unwrap();
    let slice = slice_viewport(&data, Some(&view), &TrendValues::new(), &TrendValues::new());

    assert_eq!((slice.start_index, slice.end_index), (0, 10));
    assert_eq!(slice.candles, data.candles.as_slice());
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn no_view_means_empty_slice() {
    let data = ChartData::new(candles(10), Default::default());
    let slice = slice_viewport(&data, None, &TrendValues::new(), &TrendValues::new());
    assert!(slice.is_empty());
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn boundary_values_are_matched_by_id() {
    let definitions = vec![IndicatorDefinition::new("fast", "Fast"), IndicatorDefinition::new("slow", "Slow")];
    let rows: Vec<PositionalCandle> = candles(12)
        .into_iter()
        .enumerate()
        .map(|(i, candle)| {
            // the slow line is only known for the first half
            let slow = (i < 6).then_some(100.0 + i as f64);
            PositionalCandle { candle, trends: vec![Some(i as f64), slow] }
        })
        .collect();
    let data = ChartData::from_positional(rows, &definitions);
    let view = ViewState { candle_width: 50.0, start_offset: 150.0, drawable_width: 200.0 };

    let mut trailing_fallback = TrendValues::new();
    trailing_fallback.insert("slow".into(), Some(-1.0));
    let slice = slice_viewport(&data, Some(&view), &TrendValues::new(), &trailing_fallback);

    assert_eq!((slice.start_index, slice.end_index), (3, 7));
    assert_eq!(slice.leading_trends.get(&"fast".into()), Some(&Some(2.0)));
    assert_eq!(slice.leading_trends.get(&"slow".into()), Some(&Some(102.0)));
    // the neighbour at index 8 exists, so its (missing) value wins over the fallback
    assert_eq!(slice.trailing_trends.get(&"fast".into()), Some(&Some(8.0)));
    assert_eq!(slice.trailing_trends.get(&"slow".into()), Some(&None));

    let slow = slice.trends.iter().find(|t| t.id.value() == "slow").unwrap();
    assert_eq!(slow.values, vec![Some(103.0), Some(104.0), Some(105.0), None, None]);
}
