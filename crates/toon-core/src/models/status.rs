//! Aggregate status of one agreement

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use super::{Agreement, GasUsage, PowerUsage, ThermostatInfo, WaterUsage};
use crate::convert;
use crate::payload::Payload;

/// Everything known about the active agreement
///
/// Created once per activated agreement and updated in place afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub agreement: Agreement,
    pub thermostat: ThermostatInfo,
    pub power_usage: PowerUsage,
    pub gas_usage: GasUsage,
    pub water_usage: WaterUsage,

    pub last_updated_from_display: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
    pub server_time: Option<DateTime<Utc>>,
}

impl Status {
    pub fn new(agreement: Agreement) -> Self {
        Self {
            agreement,
            thermostat: ThermostatInfo::new(),
            power_usage: PowerUsage::new(),
            gas_usage: GasUsage::new(),
            water_usage: WaterUsage::new(),
            last_updated_from_display: None,
            last_updated: Utc::now(),
            server_time: None,
        }
    }

    /// Merge a status document into this status.
    ///
    /// Sections missing from `data` are not touched at all, so their
    /// `last_updated` stays as it was.
    pub fn update(&mut self, data: &Value) -> &mut Self {
        let payload = Payload::new(data);

        if let Some(section) = payload.get("thermostatInfo") {
            trace!("Updating thermostat");
            self.thermostat.update(section);
        }
        if let Some(section) = payload.get("powerUsage") {
            trace!("Updating power usage");
            self.power_usage.update(section);
        }
        if let Some(section) = payload.get("gasUsage") {
            trace!("Updating gas usage");
            self.gas_usage.update(section);
        }
        if let Some(section) = payload.get("waterUsage") {
            trace!("Updating water usage");
            self.water_usage.update(section);
        }

        payload.merge_converted("lastUpdateFromDisplay", &mut self.last_updated_from_display, convert::datetime);
        payload.merge_converted("serverTime", &mut self.server_time, convert::datetime);
        self.last_updated = Utc::now();

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status() -> Status {
        Status::new(Agreement::from_json(&json!({
            "agreementId": "A1",
            "displayCommonName": "Home",
        })))
    }

    #[test]
    fn test_dispatches_present_sections() {
        let mut status = status();
        let gas_stamp = status.gas_usage.last_updated;

        status.update(&json!({
            "thermostatInfo": {"currentSetpoint": 2000},
            "powerUsage": {"value": 300},
            "waterUsage": {"value": 120},
            "serverTime": 1_588_012_345_678_i64,
            "lastUpdateFromDisplay": 1_588_012_300_000_i64,
        }));

        assert_eq!(status.thermostat.current_setpoint, Some(20.0));
        assert_eq!(status.power_usage.current, Some(300));
        assert_eq!(status.water_usage.current, Some(2.0));
        assert_eq!(status.gas_usage.current, None);
        assert_eq!(status.gas_usage.last_updated, gas_stamp);
        assert_eq!(
            status.server_time.map(|t| t.timestamp_millis()),
            Some(1_588_012_345_678)
        );
        assert_eq!(
            status.last_updated_from_display.map(|t| t.timestamp_millis()),
            Some(1_588_012_300_000)
        );
    }

    #[test]
    fn test_sections_merge_incrementally() {
        let mut status = status();
        status.update(&json!({"gasUsage": {"meterReading": 1000, "dayUsage": 200}}));
        status.update(&json!({"gasUsage": {"dayUsage": 300}, "serverTime": null}));

        assert_eq!(status.gas_usage.meter, Some(1.0));
        assert_eq!(status.gas_usage.day_usage, Some(0.3));
        assert_eq!(status.server_time, None);
    }

    #[test]
    fn test_null_section_ignored() {
        let mut status = status();
        status.update(&json!({"thermostatInfo": {"currentSetpoint": 1800}}));
        status.update(&json!({"thermostatInfo": null}));
        assert_eq!(status.thermostat.current_setpoint, Some(18.0));
    }

    #[test]
    fn test_timestamps_kept_when_out_of_range() {
        let mut status = status();
        status.update(&json!({"serverTime": 1_000, "lastUpdateFromDisplay": 900}));
        status.update(&json!({"serverTime": i64::MAX, "lastUpdateFromDisplay": i64::MIN}));
        assert_eq!(status.server_time.map(|t| t.timestamp_millis()), Some(1_000));
        assert_eq!(
            status.last_updated_from_display.map(|t| t.timestamp_millis()),
            Some(900)
        );
    }

    #[test]
    fn test_statuses_are_independent() {
        let mut first = status();
        let second = status();
        first.update(&json!({"powerUsage": {"value": 10}}));
        assert_eq!(second.power_usage.current, None);
    }

    #[test]
    fn test_update_returns_self() {
        let mut status = status();
        let updated = status.update(&json!({"thermostatInfo": {"programState": 2}}));
        assert_eq!(updated.thermostat.program_overridden(), Some(true));
        assert_eq!(updated.agreement.agreement_id.as_deref(), Some("A1"));
    }
}
