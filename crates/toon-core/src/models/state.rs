//! Small integer enumerations used by the thermostat

use serde::{Deserialize, Serialize};

/// Preset ("active state") of the thermostat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveState {
    /// No preset active
    Off,
    Comfort,
    Home,
    Sleep,
    Away,
    Holiday,
}

impl ActiveState {
    /// Value sent on the wire
    pub fn as_wire(&self) -> i64 {
        match self {
            ActiveState::Off => -1,
            ActiveState::Comfort => 0,
            ActiveState::Home => 1,
            ActiveState::Sleep => 2,
            ActiveState::Away => 3,
            ActiveState::Holiday => 4,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            -1 => Some(ActiveState::Off),
            0 => Some(ActiveState::Comfort),
            1 => Some(ActiveState::Home),
            2 => Some(ActiveState::Sleep),
            3 => Some(ActiveState::Away),
            4 => Some(ActiveState::Holiday),
            _ => None,
        }
    }
}

/// What the boiler burner is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnerState {
    Off,
    /// Heating the house
    On,
    /// Heating tap water
    TapWater,
    PreHeating,
}

impl BurnerState {
    pub fn as_wire(&self) -> i64 {
        match self {
            BurnerState::Off => 0,
            BurnerState::On => 1,
            BurnerState::TapWater => 2,
            BurnerState::PreHeating => 3,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(BurnerState::Off),
            1 => Some(BurnerState::On),
            2 => Some(BurnerState::TapWater),
            3 => Some(BurnerState::PreHeating),
            _ => None,
        }
    }
}

/// Whether the weekly program drives the setpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramState {
    Off,
    On,
    /// Program runs but the current setpoint was changed manually
    #[default]
    Override,
}

impl ProgramState {
    pub fn as_wire(&self) -> i64 {
        match self {
            ProgramState::Off => 0,
            ProgramState::On => 1,
            ProgramState::Override => 2,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(ProgramState::Off),
            1 => Some(ProgramState::On),
            2 => Some(ProgramState::Override),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        for state in [
            ActiveState::Off,
            ActiveState::Comfort,
            ActiveState::Home,
            ActiveState::Sleep,
            ActiveState::Away,
            ActiveState::Holiday,
        ] {
            assert_eq!(ActiveState::from_wire(state.as_wire()), Some(state));
        }
        assert_eq!(ActiveState::Holiday.as_wire(), 4);
        assert_eq!(BurnerState::from_wire(2), Some(BurnerState::TapWater));
        assert_eq!(BurnerState::from_wire(9), None);
        assert_eq!(ProgramState::default(), ProgramState::Override);
        assert_eq!(ProgramState::Override.as_wire(), 2);
    }
}
