//! toon-core - Domain model for the Toon thermostat API
//!
//! This crate turns the sparse JSON documents served by the Toon API into
//! long-lived state records. Every record is updated incrementally: a key that
//! is missing from a payload, or explicitly `null`, leaves the previous value
//! in place.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use toon_core::{Agreement, Status};
//!
//! let agreement = Agreement::from_json(&json!({
//!     "agreementId": "A1",
//!     "displayCommonName": "Home",
//! }));
//! let mut status = Status::new(agreement);
//!
//! status.update(&json!({ "thermostatInfo": { "currentSetpoint": 2150 } }));
//! assert_eq!(status.thermostat.current_setpoint, Some(21.5));
//!
//! // A later payload without the key keeps the known value
//! status.update(&json!({ "thermostatInfo": { "currentDisplayTemp": 1990 } }));
//! assert_eq!(status.thermostat.current_setpoint, Some(21.5));
//! ```

pub mod convert;
pub mod models;
pub mod payload;

pub use models::*;
pub use payload::{FromWire, Payload};
