use candle_viewport::domain::market_data::{
    Candle, IndicatorDefinition, IndicatorKind, compute_trend_set, ema_of, exponential_moving_average, macd,
    relative_strength_index,
};
use candle_viewport::domain::errors::AppError;
use quickcheck_macros::quickcheck;

fn candles_from_closes(closes: &[Option<f64>]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let mut candle = Candle::complete(i as i64 * 60_000, 1.0, 1.0, 1.0, 1.0, 1.0);
            candle.close = *close;
            candle
        })
        .collect()
}

fn series(values: impl IntoIterator<Item = f64>) -> Vec<Candle> {
    candles_from_closes(&values.into_iter().map(Some).collect::<Vec<_>>())
}

#[quickcheck]
fn rsi_stays_within_bounds(closes: Vec<Option<f64>>, period: u8) -> bool {
    let period = usize::from(period % 20) + 1;
    let closes: Vec<Option<f64>> = closes
        .into_iter()
        .map(|c| c.filter(|v| v.is_finite()).map(|v| v % 1e6))
        .collect();
    relative_strength_index(&candles_from_closes(&closes), period)
        .unwrap()
        .into_iter()
        .flatten()
        .all(|v| (0.0..=100.0).contains(&v))
}

#[test]
fn rsi_extremes() {
    let up = relative_strength_index(&series((0..30).map(f64::from)), 14).unwrap();
    assert!(up[..14].iter().all(Option::is_none));
    assert!(up[14..].iter().all(|v| *v == Some(100.0)));

    let down = relative_strength_index(&series((0..30).map(|v| 100.0 - f64::from(v))), 14).unwrap();
    assert!(down[14..].iter().all(|v| *v == Some(0.0)));

    let flat = relative_strength_index(&series([5.0; 30]), 14).unwrap();
    assert!(flat[14..].iter().all(|v| *v == Some(50.0)));
}

#[test]
fn macd_histogram_is_difference_of_lines() {
    let closes: Vec<Option<f64>> = (0..80)
        .map(|i| if i % 17 == 5 { None } else { Some(100.0 + (i as f64 * 0.3).sin() * 5.0) })
        .collect();
    let result = macd(&candles_from_closes(&closes), 12, 26, 9).unwrap();

    assert_eq!(result.macd.len(), 80);
    for i in 0..80 {
        match (result.macd[i], result.signal[i]) {
            (Some(m), Some(s)) => assert!((result.histogram[i].unwrap() - (m - s)).abs() < 1e-12),
            _ => assert_eq!(result.histogram[i], None),
        }
    }
    assert!(result.histogram.iter().any(Option::is_some));
}

#[test]
fn ema_matches_raw_sequence_variant() {
    let candles = series((1..=20).map(f64::from));
    let closes: Vec<Option<f64>> = candles.iter().map(|c| c.close).collect();
    assert_eq!(exponential_moving_average(&candles, 5).unwrap(), ema_of(&closes, 5));
}

#[test]
fn indicator_kinds_parse_from_json() {
    let definitions: Vec<IndicatorDefinition> = serde_json::from_str(
        r#"[
            {"id": "ma20", "label": "MA 20", "kind": {"type": "moving_average", "period": 20}},
            {"id": "rsi", "label": "RSI", "kind": {"type": "rsi", "period": 14}},
            {"id": "vwap", "label": "VWAP"}
        ]"#,
    )
    .unwrap();

    assert_eq!(definitions[0].kind, Some(IndicatorKind::MovingAverage { period: 20 }));
    assert_eq!(definitions[1].kind, Some(IndicatorKind::Rsi { period: 14 }));
    assert_eq!(definitions[2].kind, None);

    let set = compute_trend_set(&series((0..50).map(f64::from)), &definitions).unwrap();
    assert_eq!(set.len(), 2);
    let last = set.value_at(&"ma20".into(), 49).unwrap();
    assert!((last - 39.5).abs() < 1e-9);
}

#[test]
fn negative_period_in_json_is_an_argument_error() {
    let definitions: Vec<IndicatorDefinition> = serde_json::from_str(
        r#"[{"id": "m", "label": "MACD", "kind": {"type": "macd", "fast": 12, "slow": -3, "signal": 9}}]"#,
    )
    .unwrap();
    assert_eq!(
        compute_trend_set(&series((0..50).map(f64::from)), &definitions),
        Err(AppError::InvalidArgument { name: "slow", value: -3 })
    );
}
