//! Small numeric helpers shared by the analysis engines.
//!
//! Indicator and sentiment records keep full precision in memory so threshold
//! comparisons are exact; the rounding below is applied only when a record is
//! serialized for transport.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use std::collections::BTreeMap;

/// Decimal places used when RSI, percent change and confidence values are displayed.
pub const RSI_DISPLAY_DECIMALS: u32 = 2;

/// Decimal places used when moving averages and MACD values are displayed.
pub const MA_DISPLAY_DECIMALS: u32 = 4;

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn serialize_rounded_2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, RSI_DISPLAY_DECIMALS))
}

pub fn serialize_opt_rounded_2<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&round_to(*v, RSI_DISPLAY_DECIMALS)),
        None => serializer.serialize_none(),
    }
}

pub fn serialize_rounded_4<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, MA_DISPLAY_DECIMALS))
}

/// Serialize a window -> moving average map with display rounding.
pub fn serialize_window_map<S: Serializer>(
    map: &BTreeMap<usize, Option<f64>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        map.iter()
            .map(|(window, value)| (window, value.map(|v| round_to(v, MA_DISPLAY_DECIMALS)))),
    )
}

/// Read back a window -> moving average map. Document keys are strings
/// (`{"5": 101.2}`), including when the map sits inside a flattened record.
pub fn deserialize_window_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<usize, Option<f64>>, D::Error> {
    BTreeMap::<String, Option<f64>>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, value)| {
            key.trim()
                .parse::<usize>()
                .map(|window| (window, value))
                .map_err(|_| D::Error::custom(format!("invalid window key {:?}", key)))
        })
        .collect()
}

/// Treat an explicit `null` string field like a missing one.
pub fn deserialize_null_as_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
