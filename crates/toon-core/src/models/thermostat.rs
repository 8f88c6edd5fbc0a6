//! Thermostat state

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::state::{ActiveState, BurnerState, ProgramState};
use crate::convert;
use crate::payload::Payload;

/// Error code the display reports when there is no boiler error
const NO_ERROR_CODE: i64 = 255;

/// Thermostat information, updated incrementally from `thermostatInfo`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermostatInfo {
    pub active_state: Option<i64>,
    pub boiler_module_connected: Option<bool>,
    pub burner_state: Option<i64>,
    /// Measured room temperature (°C)
    pub current_display_temperature: Option<f64>,
    pub current_humidity: Option<i64>,
    pub current_modulation_level: Option<i64>,
    /// Target temperature (°C)
    pub current_setpoint: Option<f64>,
    pub error_found: Option<bool>,
    pub has_boiler_fault: Option<bool>,
    pub have_opentherm_boiler: Option<bool>,
    pub holiday_mode: Option<bool>,
    pub next_program: Option<i64>,
    pub next_setpoint: Option<f64>,
    pub next_state: Option<i64>,
    pub next_time: Option<DateTime<Utc>>,
    pub opentherm_communication_error: Option<bool>,
    pub program_state: Option<i64>,
    pub real_setpoint: Option<f64>,
    pub set_by_load_shifting: Option<bool>,

    pub last_updated_from_display: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl Default for ThermostatInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl ThermostatInfo {
    pub fn new() -> Self {
        Self {
            active_state: None,
            boiler_module_connected: None,
            burner_state: None,
            current_display_temperature: None,
            current_humidity: None,
            current_modulation_level: None,
            current_setpoint: None,
            error_found: None,
            has_boiler_fault: None,
            have_opentherm_boiler: None,
            holiday_mode: None,
            next_program: None,
            next_setpoint: None,
            next_state: None,
            next_time: None,
            opentherm_communication_error: None,
            program_state: None,
            real_setpoint: None,
            set_by_load_shifting: None,
            last_updated_from_display: None,
            last_updated: Utc::now(),
        }
    }

    /// Typed view of `active_state`
    pub fn active(&self) -> Option<ActiveState> {
        self.active_state.and_then(ActiveState::from_wire)
    }

    /// Typed view of `burner_state`
    pub fn burner_info(&self) -> Option<BurnerState> {
        self.burner_state.and_then(BurnerState::from_wire)
    }

    /// Typed view of `program_state`
    pub fn program_info(&self) -> Option<ProgramState> {
        self.program_state.and_then(ProgramState::from_wire)
    }

    /// Burner is doing anything at all
    pub fn burner(&self) -> Option<bool> {
        self.burner_state.map(|state| state != BurnerState::Off.as_wire())
    }

    pub fn hot_tapwater(&self) -> Option<bool> {
        self.burner_state
            .map(|state| state == BurnerState::TapWater.as_wire())
    }

    pub fn heating(&self) -> Option<bool> {
        self.burner_state.map(|state| state == BurnerState::On.as_wire())
    }

    pub fn pre_heating(&self) -> Option<bool> {
        self.burner_state
            .map(|state| state == BurnerState::PreHeating.as_wire())
    }

    /// Program mode is on, overridden or not
    pub fn program(&self) -> Option<bool> {
        self.program_state.map(|state| {
            state == ProgramState::On.as_wire() || state == ProgramState::Override.as_wire()
        })
    }

    pub fn program_overridden(&self) -> Option<bool> {
        self.program_state
            .map(|state| state == ProgramState::Override.as_wire())
    }

    /// Merge a `thermostatInfo` document into this record
    pub fn update(&mut self, data: &Value) {
        let payload = Payload::new(data);

        payload.merge("activeState", &mut self.active_state, convert::negative_to_unknown);
        payload.merge("boilerModuleConnected", &mut self.boiler_module_connected, convert::boolean);
        payload.merge_raw("burnerInfo", &mut self.burner_state);
        payload.merge("currentDisplayTemp", &mut self.current_display_temperature, convert::temperature);
        payload.merge_raw("currentHumidity", &mut self.current_humidity);
        payload.merge_raw("currentModulationLevel", &mut self.current_modulation_level);
        payload.merge("currentSetpoint", &mut self.current_setpoint, convert::temperature);
        payload.merge("errorFound", &mut self.error_found, |code: Option<i64>| {
            code.map(|code| code != NO_ERROR_CODE)
        });
        payload.merge("hasBoilerFault", &mut self.has_boiler_fault, convert::boolean);
        payload.merge("haveOTBoiler", &mut self.have_opentherm_boiler, convert::boolean);
        payload.merge("activeState", &mut self.holiday_mode, |state: Option<i64>| {
            state.map(|state| state == ActiveState::Holiday.as_wire())
        });
        payload.merge("nextProgram", &mut self.next_program, convert::negative_to_unknown);
        payload.merge("nextSetpoint", &mut self.next_setpoint, convert::temperature);
        payload.merge("nextState", &mut self.next_state, convert::negative_to_unknown);
        payload.merge_converted("nextTime", &mut self.next_time, convert::datetime);
        payload.merge("otCommError", &mut self.opentherm_communication_error, convert::boolean);
        payload.merge_raw("programState", &mut self.program_state);
        payload.merge("realSetpoint", &mut self.real_setpoint, convert::temperature);
        payload.merge("setByLoadShifting", &mut self.set_by_load_shifting, convert::boolean);

        payload.merge_converted("lastUpdatedFromDisplay", &mut self.last_updated_from_display, convert::datetime);
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "activeState": 1,
            "boilerModuleConnected": 1,
            "burnerInfo": "1",
            "currentDisplayTemp": 2045,
            "currentHumidity": 48,
            "currentModulationLevel": 35,
            "currentSetpoint": 2150,
            "errorFound": 255,
            "hasBoilerFault": 0,
            "haveOTBoiler": 1,
            "nextProgram": 2,
            "nextSetpoint": 1800,
            "nextState": -1,
            "nextTime": 1_588_012_345_000_i64,
            "otCommError": "",
            "programState": 1,
            "realSetpoint": 2150,
            "setByLoadShifting": 0,
            "lastUpdatedFromDisplay": 1_588_012_300_123_i64,
        })
    }

    #[test]
    fn test_full_update() {
        let mut thermostat = ThermostatInfo::new();
        thermostat.update(&sample());

        assert_eq!(thermostat.active_state, Some(1));
        assert_eq!(thermostat.active(), Some(ActiveState::Home));
        assert_eq!(thermostat.boiler_module_connected, Some(true));
        assert_eq!(thermostat.burner_state, Some(1));
        assert_eq!(thermostat.current_display_temperature, Some(20.45));
        assert_eq!(thermostat.current_humidity, Some(48));
        assert_eq!(thermostat.current_modulation_level, Some(35));
        assert_eq!(thermostat.current_setpoint, Some(21.5));
        assert_eq!(thermostat.error_found, Some(false));
        assert_eq!(thermostat.has_boiler_fault, Some(false));
        assert_eq!(thermostat.have_opentherm_boiler, Some(true));
        assert_eq!(thermostat.holiday_mode, Some(false));
        assert_eq!(thermostat.next_program, Some(2));
        assert_eq!(thermostat.next_setpoint, Some(18.0));
        assert_eq!(thermostat.next_state, None);
        assert_eq!(
            thermostat.next_time.map(|t| t.timestamp_millis()),
            Some(1_588_012_345_000)
        );
        assert_eq!(thermostat.opentherm_communication_error, Some(false));
        assert_eq!(thermostat.program_state, Some(1));
        assert_eq!(thermostat.real_setpoint, Some(21.5));
        assert_eq!(thermostat.set_by_load_shifting, Some(false));
        assert_eq!(
            thermostat.last_updated_from_display.map(|t| t.timestamp_millis()),
            Some(1_588_012_300_123)
        );
    }

    #[test]
    fn test_partial_update_preserves_fields() {
        let mut thermostat = ThermostatInfo::new();
        thermostat.update(&json!({"currentSetpoint": 500}));
        assert_eq!(thermostat.current_setpoint, Some(5.0));

        thermostat.update(&json!({"currentDisplayTemp": 1900}));
        assert_eq!(thermostat.current_setpoint, Some(5.0));

        thermostat.update(&json!({"currentSetpoint": null}));
        assert_eq!(thermostat.current_setpoint, Some(5.0));

        thermostat.update(&json!({"currentSetpoint": 700}));
        assert_eq!(thermostat.current_setpoint, Some(7.0));
        assert_eq!(thermostat.current_display_temperature, Some(19.0));
    }

    #[test]
    fn test_next_time_kept_when_absent() {
        let mut thermostat = ThermostatInfo::new();
        thermostat.update(&json!({"nextTime": 1_000, "nextState": 3}));
        thermostat.update(&json!({"nextState": 2}));
        assert_eq!(thermostat.next_time.map(|t| t.timestamp_millis()), Some(1_000));
        assert_eq!(thermostat.next_state, Some(2));
    }

    #[test]
    fn test_next_time_kept_when_out_of_range() {
        let mut thermostat = ThermostatInfo::new();
        thermostat.update(&json!({"nextTime": 1_000, "lastUpdatedFromDisplay": 2_000}));
        thermostat.update(&json!({"nextTime": i64::MAX, "lastUpdatedFromDisplay": i64::MIN}));
        assert_eq!(thermostat.next_time.map(|t| t.timestamp_millis()), Some(1_000));
        assert_eq!(
            thermostat.last_updated_from_display.map(|t| t.timestamp_millis()),
            Some(2_000)
        );
    }

    #[test]
    fn test_negative_next_state_still_overwrites() {
        let mut thermostat = ThermostatInfo::new();
        thermostat.update(&json!({"nextState": 3}));
        thermostat.update(&json!({"nextState": -1}));
        assert_eq!(thermostat.next_state, None);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut once = ThermostatInfo::new();
        once.update(&sample());

        let mut twice = ThermostatInfo::new();
        twice.update(&sample());
        let first_stamp = twice.last_updated;
        twice.update(&sample());

        assert!(twice.last_updated >= first_stamp);
        twice.last_updated = once.last_updated;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_update_advances_last_updated() {
        let mut thermostat = ThermostatInfo::new();
        let created = thermostat.last_updated;
        thermostat.update(&json!({"unknownKey": 1}));
        assert!(thermostat.last_updated >= created);
        assert_eq!(thermostat.current_setpoint, None);
        assert_eq!(thermostat.last_updated_from_display, None);
    }

    #[test]
    fn test_error_found() {
        let mut thermostat = ThermostatInfo::new();
        thermostat.update(&json!({"errorFound": 3}));
        assert_eq!(thermostat.error_found, Some(true));
    }

    #[test]
    fn test_holiday_mode() {
        let mut thermostat = ThermostatInfo::new();
        thermostat.update(&json!({"activeState": 4}));
        assert_eq!(thermostat.holiday_mode, Some(true));
        assert_eq!(thermostat.active(), Some(ActiveState::Holiday));

        thermostat.update(&json!({"activeState": -1}));
        assert_eq!(thermostat.holiday_mode, Some(false));
        assert_eq!(thermostat.active_state, None);
    }

    #[test]
    fn test_burner_flags() {
        let mut thermostat = ThermostatInfo::new();
        assert_eq!(thermostat.burner(), None);
        assert_eq!(thermostat.heating(), None);
        assert_eq!(thermostat.hot_tapwater(), None);
        assert_eq!(thermostat.pre_heating(), None);

        thermostat.update(&json!({"burnerInfo": 2}));
        assert_eq!(thermostat.burner(), Some(true));
        assert_eq!(thermostat.heating(), Some(false));
        assert_eq!(thermostat.hot_tapwater(), Some(true));
        assert_eq!(thermostat.pre_heating(), Some(false));
        assert_eq!(thermostat.burner_info(), Some(BurnerState::TapWater));

        thermostat.update(&json!({"burnerInfo": "3"}));
        assert_eq!(thermostat.pre_heating(), Some(true));

        thermostat.update(&json!({"burnerInfo": 0}));
        assert_eq!(thermostat.burner(), Some(false));
    }

    #[test]
    fn test_program_flags() {
        let mut thermostat = ThermostatInfo::new();
        assert_eq!(thermostat.program(), None);
        assert_eq!(thermostat.program_overridden(), None);

        thermostat.update(&json!({"programState": 0}));
        assert_eq!(thermostat.program(), Some(false));
        assert_eq!(thermostat.program_overridden(), Some(false));

        thermostat.update(&json!({"programState": 2}));
        assert_eq!(thermostat.program(), Some(true));
        assert_eq!(thermostat.program_overridden(), Some(true));
        assert_eq!(thermostat.program_info(), Some(ProgramState::Override));
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let mut first = ThermostatInfo::new();
        let second = ThermostatInfo::new();
        first.update(&json!({"currentSetpoint": 2000}));
        assert_eq!(second.current_setpoint, None);
    }
}
