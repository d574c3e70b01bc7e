use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::{AppError, Result};

pub mod presets;

/// Bar granularities understood by the kline endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlineInterval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    Daily,
}

impl KlineInterval {
    /// Numeric `kline_type` the remote expects.
    pub fn kline_type(self) -> u8 {
        match self {
            KlineInterval::OneMinute => 1,
            KlineInterval::FiveMinutes => 2,
            KlineInterval::FifteenMinutes => 3,
            KlineInterval::ThirtyMinutes => 4,
            KlineInterval::OneHour => 5,
            KlineInterval::Daily => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KlineInterval::OneMinute => "1m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::ThirtyMinutes => "30m",
            KlineInterval::OneHour => "1h",
            KlineInterval::Daily => "day",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "1m" => Ok(KlineInterval::OneMinute),
            "5m" => Ok(KlineInterval::FiveMinutes),
            "15m" => Ok(KlineInterval::FifteenMinutes),
            "30m" => Ok(KlineInterval::ThirtyMinutes),
            "1h" => Ok(KlineInterval::OneHour),
            "day" | "1d" => Ok(KlineInterval::Daily),
            other => Err(AppError::message(format!(
                "Unknown interval `{other}` (expected 1m, 5m, 15m, 30m, 1h or day)"
            ))),
        }
    }
}

/// One request in a batched series operation.
#[derive(Debug, Clone)]
pub struct SeriesRequest {
    pub code: String,
    pub interval: KlineInterval,
    pub count: u32,
}

/// Last-trade snapshot for one code.
#[derive(Debug, Clone)]
pub struct Tick {
    pub code: String,
    pub price: f64,
    pub volume: f64,
    pub turnover: f64,
    pub timestamp: DateTime<Utc>,
}

/// One OHLC bar.
#[derive(Debug, Clone)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub turnover: f64,
}

/// Listing metadata for one code.
#[derive(Debug, Clone)]
pub struct StaticInfo {
    pub code: String,
    pub name: String,
    pub exchange: String,
    pub kind: String,
}

/// Decodes `tick_list` rows out of an envelope payload. A missing list is an
/// empty result, which is how a valid-but-dataless code shows up.
pub fn decode_ticks(payload: &Value) -> Result<Vec<Tick>> {
    rows(payload, "tick_list")
        .iter()
        .map(|row| {
            Ok(Tick {
                code: field_str(row, "code"),
                price: field_f64(row, "price")?,
                volume: field_f64(row, "volume")?,
                turnover: field_f64(row, "turnover")?,
                timestamp: field_epoch(row, "timestamp")?,
            })
        })
        .collect()
}

/// Decodes `kline_list` rows out of an envelope payload.
pub fn decode_candles(payload: &Value) -> Result<Vec<Candle>> {
    rows(payload, "kline_list")
        .iter()
        .map(|row| {
            Ok(Candle {
                timestamp: field_epoch(row, "timestamp")?,
                open: field_f64(row, "open_price")?,
                high: field_f64(row, "high_price")?,
                low: field_f64(row, "low_price")?,
                close: field_f64(row, "close_price")?,
                volume: field_f64(row, "volume")?,
                turnover: field_f64(row, "turnover")?,
            })
        })
        .collect()
}

/// Decodes static info rows. Payloads have shipped under both
/// `static_info_list` and `symbol_list`; accept either.
pub fn decode_static_info(payload: &Value) -> Result<Vec<StaticInfo>> {
    let list = match payload.get("static_info_list") {
        Some(Value::Array(list)) => list.as_slice(),
        _ => rows(payload, "symbol_list"),
    };
    Ok(list
        .iter()
        .map(|row| StaticInfo {
            code: field_str(row, "code"),
            name: field_str(row, "name"),
            exchange: field_str(row, "exchange"),
            kind: field_str(row, "type"),
        })
        .collect())
}

fn rows<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The remote serializes numbers as strings; tolerate both.
fn field_str(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn field_f64(row: &Value, key: &str) -> Result<f64> {
    let raw = field_str(row, key);
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::message(format!("Failed to parse `{key}` as a number: `{raw}`")))
}

/// Epoch field in either seconds or milliseconds, as the remote has shipped
/// both over time.
fn field_epoch(row: &Value, key: &str) -> Result<DateTime<Utc>> {
    let raw = field_str(row, key);
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::message(format!("Failed to parse `{key}` as an epoch: `{raw}`")))?;

    let parsed = if value.abs() >= 1_000_000_000_000 {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    };
    parsed.ok_or_else(|| AppError::message(format!("Epoch `{value}` is out of range for `{key}`")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn interval_mapping_matches_the_wire_contract() {
        assert_eq!(KlineInterval::OneMinute.kline_type(), 1);
        assert_eq!(KlineInterval::OneHour.kline_type(), 5);
        assert_eq!(KlineInterval::Daily.kline_type(), 8);
        assert_eq!(KlineInterval::parse("day").unwrap(), KlineInterval::Daily);
        assert_eq!(KlineInterval::parse("1d").unwrap(), KlineInterval::Daily);
        assert!(KlineInterval::parse("2w").is_err());
    }

    #[test]
    fn decodes_tick_rows_with_string_numbers() {
        let payload = json!({
            "tick_list": [
                {
                    "code": "600519.SH",
                    "price": "1712.50",
                    "volume": "12000",
                    "turnover": "20550000.0",
                    "timestamp": "1717571405"
                }
            ]
        });

        let ticks = decode_ticks(&payload).unwrap();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].code, "600519.SH");
        assert!((ticks[0].price - 1712.50).abs() < 1e-9);
        assert_eq!(ticks[0].timestamp.timestamp(), 1_717_571_405);
    }

    #[test]
    fn missing_tick_list_decodes_to_empty() {
        let ticks = decode_ticks(&json!({})).unwrap();
        assert!(ticks.is_empty());
    }

    #[test]
    fn decodes_candles_and_millisecond_epochs() {
        let payload = json!({
            "kline_list": [
                {
                    "timestamp": "1717571405000",
                    "open_price": "100.0",
                    "high_price": "105.5",
                    "low_price": "99.0",
                    "close_price": "104.0",
                    "volume": "5000",
                    "turnover": "515000"
                }
            ]
        });

        let candles = decode_candles(&payload).unwrap();
        assert_eq!(candles.len(), 1);
        assert!((candles[0].high - 105.5).abs() < 1e-9);
        assert_eq!(candles[0].timestamp.timestamp(), 1_717_571_405);
    }

    #[test]
    fn bad_numeric_fields_are_reported() {
        let payload = json!({
            "kline_list": [
                {
                    "timestamp": "1717571405",
                    "open_price": "n/a",
                    "high_price": "1",
                    "low_price": "1",
                    "close_price": "1",
                    "volume": "0",
                    "turnover": "0"
                }
            ]
        });

        let err = decode_candles(&payload).unwrap_err();
        assert!(err.to_string().contains("open_price"));
    }

    #[test]
    fn static_info_accepts_both_list_keys() {
        let with_static = json!({
            "static_info_list": [
                {"code": "600519.SH", "name": "Kweichow Moutai", "exchange": "SH", "type": "stock"}
            ]
        });
        let with_symbol = json!({
            "symbol_list": [
                {"code": "600519.SH", "name": "Kweichow Moutai", "exchange": "SH", "type": "stock"}
            ]
        });

        let a = decode_static_info(&with_static).unwrap();
        let b = decode_static_info(&with_symbol).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].name, b[0].name);
        assert_eq!(a[0].kind, "stock");
    }
}
