//! Water usage

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::convert;
use crate::payload::Payload;

/// Water usage, updated incrementally from `waterUsage`
///
/// Flow values are in L/min, day totals and the meter in m³.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterUsage {
    pub average: Option<f64>,
    pub current: Option<f64>,
    pub day_average: Option<f64>,
    pub day_cost: Option<f64>,
    pub day_usage: Option<f64>,
    pub installed: Option<bool>,
    pub is_smart: Option<bool>,
    pub meter: Option<f64>,

    pub last_updated_from_display: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl Default for WaterUsage {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterUsage {
    pub fn new() -> Self {
        Self {
            average: None,
            current: None,
            day_average: None,
            day_cost: None,
            day_usage: None,
            installed: None,
            is_smart: None,
            meter: None,
            last_updated_from_display: None,
            last_updated: Utc::now(),
        }
    }

    pub fn update(&mut self, data: &Value) {
        let payload = Payload::new(data);

        payload.merge("avgValue", &mut self.average, convert::lmin);
        payload.merge("value", &mut self.current, convert::lmin);
        payload.merge("avgDayValue", &mut self.day_average, convert::m3);
        payload.merge_raw("dayCost", &mut self.day_cost);
        payload.merge("dayUsage", &mut self.day_usage, convert::m3);
        payload.merge("installed", &mut self.installed, convert::boolean);
        payload.merge("isSmart", &mut self.is_smart, convert::boolean);
        payload.merge("meterReading", &mut self.meter, convert::m3);

        payload.merge_converted("lastUpdatedFromDisplay", &mut self.last_updated_from_display, convert::datetime);
        self.last_updated = Utc::now();
    }
}
