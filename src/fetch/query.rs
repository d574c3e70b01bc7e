use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde_json::{json, Value};

use crate::records::KlineInterval;

static TRACE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Per-request trace id: wall-clock millis plus a process-wide sequence
/// number, unique within the process without needing a RNG.
pub fn next_trace() -> String {
    let seq = TRACE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", Utc::now().timestamp_millis(), seq)
}

/// Query payload for a kline request. `kline_timestamp_end = 0` asks for the
/// most recent bars; `adjust_type = 0` selects ex-rights prices.
pub fn kline_query(code: &str, interval: KlineInterval, count: u32) -> String {
    json!({
        "trace": next_trace(),
        "data": {
            "code": code,
            "kline_type": interval.kline_type(),
            "kline_timestamp_end": 0,
            "query_kline_num": count,
            "adjust_type": 0,
        }
    })
    .to_string()
}

/// Query payload for tick and static-info requests over a list of codes.
pub fn symbol_list_query(codes: &[String]) -> String {
    let symbol_list: Vec<Value> = codes.iter().map(|code| json!({ "code": code })).collect();
    json!({
        "trace": next_trace(),
        "data": { "symbol_list": symbol_list }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kline_query_carries_the_documented_fields() {
        let raw = kline_query("600519.SH", KlineInterval::Daily, 30);
        let value: Value = serde_json::from_str(&raw).unwrap();

        assert!(value["trace"].as_str().is_some());
        assert_eq!(value["data"]["code"], "600519.SH");
        assert_eq!(value["data"]["kline_type"], 8);
        assert_eq!(value["data"]["kline_timestamp_end"], 0);
        assert_eq!(value["data"]["query_kline_num"], 30);
        assert_eq!(value["data"]["adjust_type"], 0);
    }

    #[test]
    fn symbol_list_query_wraps_every_code() {
        let codes: Vec<String> = vec!["600519.SH".into(), "BTCUSDT".into()];
        let raw = symbol_list_query(&codes);
        let value: Value = serde_json::from_str(&raw).unwrap();

        let list = value["data"]["symbol_list"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["code"], "600519.SH");
        assert_eq!(list[1]["code"], "BTCUSDT");
    }

    #[test]
    fn traces_are_unique_within_the_process() {
        assert_ne!(next_trace(), next_trace());
    }
}
