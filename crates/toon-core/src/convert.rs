//! Unit conversions for raw Toon API values
//!
//! The API reports most quantities as scaled integers. Every converter is
//! total: an unknown input yields an unknown output instead of an error.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Round a value to the specified number of decimal places
pub fn round_to_precision(value: f64, precision: u8) -> f64 {
    if precision == 0 {
        value.round()
    } else {
        let factor = 10_f64.powi(precision as i32);
        (value * factor).round() / factor
    }
}

/// Centi-degrees to degrees Celsius
pub fn temperature(raw: Option<f64>) -> Option<f64> {
    raw.map(|value| value / 100.0)
}

/// Wh to kWh, rounded to 2 decimals
pub fn kwh(raw: Option<f64>) -> Option<f64> {
    raw.map(|value| round_to_precision(value / 1000.0, 2))
}

/// Milli-units to m³, rounded to 2 decimals
pub fn m3(raw: Option<f64>) -> Option<f64> {
    raw.map(|value| round_to_precision(value / 1000.0, 2))
}

/// Gas readings are reported in thousandths of the displayed unit
pub fn cm3(raw: Option<f64>) -> Option<f64> {
    raw.map(|value| round_to_precision(value / 1000.0, 2))
}

/// Per-hour flow to L/min, rounded to 1 decimal
pub fn lmin(raw: Option<f64>) -> Option<f64> {
    raw.map(|value| round_to_precision(value / 60.0, 1))
}

/// Truthiness of a wire value.
///
/// `false`, `0`, `""`, `[]` and `{}` are false; `null` stays unknown.
pub fn boolean(raw: Option<&Value>) -> Option<bool> {
    match raw? {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().map(|f| f != 0.0).unwrap_or(true)),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(items) => Some(!items.is_empty()),
        Value::Object(map) => Some(!map.is_empty()),
    }
}

/// Negative values are sentinels for "unknown"
pub fn negative_to_unknown(raw: Option<i64>) -> Option<i64> {
    raw.filter(|value| *value >= 0)
}

/// Milliseconds since the Unix epoch to a UTC timestamp.
///
/// Split with integer arithmetic so large values keep their exact
/// millisecond component.
pub fn datetime(raw: Option<i64>) -> Option<DateTime<Utc>> {
    let millis = raw?;
    let seconds = millis.div_euclid(1000);
    let micros = millis.rem_euclid(1000) * 1000;
    DateTime::from_timestamp(seconds, (micros * 1000) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(1.234567, 0), 1.0);
        assert_eq!(round_to_precision(1.234567, 1), 1.2);
        assert_eq!(round_to_precision(1.234567, 2), 1.23);
    }

    #[test]
    fn test_temperature() {
        assert_eq!(temperature(Some(2150.0)), Some(21.5));
        assert_eq!(temperature(Some(-250.0)), Some(-2.5));
        assert_eq!(temperature(None), None);
    }

    #[test]
    fn test_volume_and_energy() {
        assert_eq!(kwh(Some(12340.0)), Some(12.34));
        assert_eq!(kwh(Some(1999.0)), Some(2.0));
        assert_eq!(kwh(Some(0.0)), Some(0.0));
        assert_eq!(m3(Some(1504.0)), Some(1.5));
        assert_eq!(cm3(Some(987.0)), Some(0.99));
        assert_eq!(kwh(None), None);
        assert_eq!(m3(None), None);
        assert_eq!(cm3(None), None);
    }

    #[test]
    fn test_lmin() {
        assert_eq!(lmin(Some(600.0)), Some(10.0));
        assert_eq!(lmin(Some(100.0)), Some(1.7));
        assert_eq!(lmin(None), None);
    }

    #[test]
    fn test_boolean() {
        assert_eq!(boolean(Some(&json!(true))), Some(true));
        assert_eq!(boolean(Some(&json!(0))), Some(false));
        assert_eq!(boolean(Some(&json!(2))), Some(true));
        assert_eq!(boolean(Some(&json!(""))), Some(false));
        assert_eq!(boolean(Some(&json!("0"))), Some(true));
        assert_eq!(boolean(Some(&json!([]))), Some(false));
        assert_eq!(boolean(Some(&json!(null))), None);
        assert_eq!(boolean(None), None);
    }

    #[test]
    fn test_negative_to_unknown() {
        for n in [-1, -2, -255, i64::MIN] {
            assert_eq!(negative_to_unknown(Some(n)), None);
        }
        for n in [0, 1, 255, i64::MAX] {
            assert_eq!(negative_to_unknown(Some(n)), Some(n));
        }
        assert_eq!(negative_to_unknown(None), None);
    }

    #[test]
    fn test_datetime_preserves_millis() {
        // Well past 2^31 milliseconds
        let millis = 1_588_012_345_678_i64;
        let dt = datetime(Some(millis)).unwrap();
        assert_eq!(dt.timestamp_millis(), millis);
        assert_eq!(dt.nanosecond(), 678_000_000);
        assert_eq!(dt.year(), 2020);
    }

    #[test]
    fn test_datetime_round_trips() {
        for millis in [0_i64, 1, 999, 1_000, 2_147_483_648, 4_102_444_800_001] {
            let dt = datetime(Some(millis)).unwrap();
            assert_eq!(dt.timestamp_millis(), millis);
        }
    }

    #[test]
    fn test_datetime_before_epoch() {
        let dt = datetime(Some(-1)).unwrap();
        assert_eq!(dt.timestamp_millis(), -1);
        assert_eq!(datetime(None), None);
    }
}
