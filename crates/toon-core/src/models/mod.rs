//! Domain model for the Toon API

mod agreement;
mod gas;
mod power;
mod state;
mod status;
mod thermostat;
mod water;

pub use agreement::*;
pub use gas::*;
pub use power::*;
pub use state::*;
pub use status::*;
pub use thermostat::*;
pub use water::*;
