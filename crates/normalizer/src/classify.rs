use serde_json::{Map, Value};

const TIME_SERIES_PATHS: [&str; 2] = ["/results/time_series", "/time_series_data"];

/// The raw payload shapes the adapter knows how to project.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayloadShape<'a> {
    Backtest,
    Simulation { time_series: &'a Map<String, Value> },
}

/// Decides which projection applies, or why none does.
///
/// Backtests are checked first because some backtest writers also embed a (sparse) time
/// series block.
pub fn classify(raw: &Value) -> Result<PayloadShape<'_>, String> {
    let Some(obj) = raw.as_object() else {
        return Err(format!("expected a JSON object, found {}", json_type(raw)));
    };

    if obj.contains_key("backtest_id") && obj.contains_key("summary") {
        return Ok(PayloadShape::Backtest);
    }

    for path in TIME_SERIES_PATHS {
        if let Some(block) = raw.pointer(path).filter(|v| !v.is_null()) {
            return match block.as_object() {
                Some(time_series) => Ok(PayloadShape::Simulation { time_series }),
                None => Err(format!(
                    "time series block at '{path}' must be an object keyed by symbol, found {}",
                    json_type(block)
                )),
            };
        }
    }

    Err("found neither 'backtest_id' with 'summary' nor a 'results.time_series' / 'time_series_data' block"
        .to_string())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn backtest_wins_over_embedded_time_series() {
        let raw = json!({"backtest_id": 3, "summary": {}, "time_series_data": {}});
        assert_eq!(classify(&raw), Ok(PayloadShape::Backtest));
    }

    #[test]
    fn both_time_series_locations_are_recognized() {
        let nested = json!({"results": {"time_series": {"AAPL": {}}}});
        let flat = json!({"time_series_data": {"MSFT": {}}});
        assert!(matches!(classify(&nested), Ok(PayloadShape::Simulation { time_series }) if time_series.contains_key("AAPL")));
        assert!(matches!(classify(&flat), Ok(PayloadShape::Simulation { time_series }) if time_series.contains_key("MSFT")));
    }

    #[test]
    fn unrecognized_payloads_explain_themselves() {
        assert!(classify(&json!([1, 2])).unwrap_err().contains("an array"));
        assert!(classify(&json!({"backtest_id": "x"})).unwrap_err().contains("backtest_id"));
        assert!(classify(&json!({"results": {"time_series": [1]}})).unwrap_err().contains("keyed by symbol"));
    }
}
