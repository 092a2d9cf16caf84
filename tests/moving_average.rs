use candle_viewport::domain::errors::AppError;
use candle_viewport::domain::market_data::{Candle, moving_average};

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle::complete(i as i64 * 60_000, close, close, close, close, 1.0))
        .collect()
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn moving_average_short_input() {
    // fewer than 2 * period samples
    let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let out = moving_average(&candles, 3).unwrap();
    assert_eq!(out.len(), 5);
    assert!(out.iter().all(Option::is_none));
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn moving_average_of_constant_series_is_constant() {
    let candles = candles_from_closes(&[7.0; 20]);
    let out = moving_average(&candles, 5).unwrap();
    assert!(out[..4].iter().all(Option::is_none));
    assert!(out[4..].iter().all(|v| *v == Some(7.0)));
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn moving_average_tracks_rising_series() {
    let closes: Vec<f64> = (1..=10).map(f64::from).collect();
    let out = moving_average(&candles_from_closes(&closes), 3).unwrap();
    for (i, value) in out.iter().enumerate().skip(2) {
        let expected = i as f64; // mean of i-1, i, i+1
        assert!((value.unwrap() - expected).abs() < 1e-9, "index {i}: {value:?}");
    }
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn moving_average_rejects_zero_period() {
    let candles = candles_from_closes(&[1.0, 2.0]);
    assert_eq!(
        moving_average(&candles, 0),
        Err(AppError::InvalidArgument { name: "period", value: 0 })
    );
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn moving_average_with_period_beyond_half_the_address_space() {
    let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0]);
    let out = moving_average(&candles, usize::MAX / 2 + 1).unwrap();
    assert_eq!(out, vec![None; 4]);
}
