//! Electricity usage and solar production

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::convert::{self, round_to_precision};
use crate::payload::Payload;

/// Power usage, updated incrementally from `powerUsage`
///
/// Instantaneous values are in W, day totals and meter readings in kWh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerUsage {
    pub average: Option<f64>,
    pub average_produced: Option<f64>,
    pub average_solar: Option<f64>,
    pub current: Option<i64>,
    pub current_produced: Option<i64>,
    pub current_solar: Option<i64>,
    pub day_average: Option<f64>,
    pub day_cost: Option<f64>,
    pub day_high_usage: Option<f64>,
    pub day_low_usage: Option<f64>,
    pub day_max_solar: Option<i64>,
    pub day_produced_solar: Option<f64>,
    pub is_smart: Option<bool>,
    pub meter_high: Option<f64>,
    pub meter_low: Option<f64>,
    pub meter_produced_high: Option<f64>,
    pub meter_produced_low: Option<f64>,

    pub last_updated_from_display: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl Default for PowerUsage {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerUsage {
    pub fn new() -> Self {
        Self {
            average: None,
            average_produced: None,
            average_solar: None,
            current: None,
            current_produced: None,
            current_solar: None,
            day_average: None,
            day_cost: None,
            day_high_usage: None,
            day_low_usage: None,
            day_max_solar: None,
            day_produced_solar: None,
            is_smart: None,
            meter_high: None,
            meter_low: None,
            meter_produced_high: None,
            meter_produced_low: None,
            last_updated_from_display: None,
            last_updated: Utc::now(),
        }
    }

    /// Total usage today over both tariffs
    pub fn day_usage(&self) -> Option<f64> {
        Some(round_to_precision(self.day_high_usage? + self.day_low_usage?, 2))
    }

    /// Solar production today that exceeded usage, i.e. went to the grid
    pub fn day_to_grid_usage(&self) -> Option<f64> {
        let balance = round_to_precision(self.day_usage()? - self.day_produced_solar?, 2);
        Some(balance.min(0.0).abs())
    }

    /// Usage today that exceeded solar production, i.e. came from the grid
    pub fn day_from_grid_usage(&self) -> Option<f64> {
        let balance = round_to_precision(self.day_produced_solar? - self.day_usage()?, 2);
        Some(balance.min(0.0).abs())
    }

    /// Share of the current usage covered by solar, in percent (max 100)
    pub fn current_covered_by_solar(&self) -> Option<i64> {
        let solar = self.current_solar?;
        let current = self.current?;
        if current == 0 {
            return Some(0);
        }
        let percentage = (solar as f64 / current as f64 * 100.0).round() as i64;
        Some(percentage.min(100))
    }

    /// Merge a `powerUsage` document into this record
    pub fn update(&mut self, data: &Value) {
        let payload = Payload::new(data);

        payload.merge_raw("avgValue", &mut self.average);
        payload.merge_raw("avgProduValue", &mut self.average_produced);
        payload.merge_raw("avgSolarValue", &mut self.average_solar);
        payload.merge_raw("value", &mut self.current);
        payload.merge_raw("valueProduced", &mut self.current_produced);
        payload.merge_raw("valueSolar", &mut self.current_solar);
        payload.merge("avgDayValue", &mut self.day_average, convert::kwh);
        payload.merge_raw("dayCost", &mut self.day_cost);
        payload.merge("dayUsage", &mut self.day_high_usage, convert::kwh);
        payload.merge("dayLowUsage", &mut self.day_low_usage, convert::kwh);
        payload.merge_raw("maxSolar", &mut self.day_max_solar);
        payload.merge("solarProducedToday", &mut self.day_produced_solar, convert::kwh);
        payload.merge("isSmart", &mut self.is_smart, convert::boolean);
        payload.merge("meterReading", &mut self.meter_high, convert::kwh);
        payload.merge("meterReadingLow", &mut self.meter_low, convert::kwh);
        payload.merge("meterReadingProdu", &mut self.meter_produced_high, convert::kwh);
        payload.merge("meterReadingLowProdu", &mut self.meter_produced_low, convert::kwh);

        payload.merge_converted("lastUpdatedFromDisplay", &mut self.last_updated_from_display, convert::datetime);
        self.last_updated = Utc::now();
    }
}
