//! Toon Client Library
//!
//! Asynchronous client for the Toon thermostat REST API.
//!
//! # Example
//!
//! ```rust,no_run
//! use toon_client::{ActiveState, AgreementSelector, ProgramState, ToonClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = ToonClient::new("access-token")?;
//!
//!     // Most calls need an active agreement
//!     client.activate_agreement(AgreementSelector::id("A1")).await?;
//!
//!     let status = client.update().await?;
//!     println!("{:?} °C", status.thermostat.current_display_temperature);
//!
//!     client.set_current_setpoint(21.5).await?;
//!     client
//!         .set_active_state(ActiveState::Away, ProgramState::default())
//!         .await?;
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! # Retries
//!
//! Connection failures and timeouts are retried 3 times in total, HTTP 429
//! responses 6 times starting from a 60 second delay. Both are configurable
//! through [`ClientConfig::retry`].
//!
//! # Testing
//!
//! The `testing` module serves an `axum` router as a stand-in for the API:
//!
//! ```rust,ignore
//! use toon_client::testing::TestServer;
//!
//! let mut server = TestServer::start(mock_router()).await?;
//! let agreements = server.client.agreements(false).await?;
//! ```

mod client;
mod config;
mod error;
mod retry;
mod session;
pub mod testing;
mod token;

pub use client::{AgreementSelector, ClientState, ToonClient, ToonClientBuilder, WEBHOOK_ACTIONS};
pub use config::{default_user_agent, ClientConfig, ConfigError, RetryConfig};
pub use error::{Result, ToonError};
pub use retry::{Retry, RetryPolicy};
pub use session::{ApiRequest, ApiResponse, Session};
pub use token::TokenProvider;

// Re-export the domain model for convenience
pub use toon_core::{
    ActiveState, Agreement, BurnerState, GasUsage, PowerUsage, ProgramState, Status,
    ThermostatInfo, WaterUsage,
};
