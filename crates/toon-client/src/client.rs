//! Toon API client facade

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use toon_core::{ActiveState, Agreement, ProgramState, Status};
use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{Result, ToonError};
use crate::retry::RetryPolicy;
use crate::session::{ApiRequest, Session};
use crate::token::TokenProvider;

/// Event categories every webhook registration subscribes to
pub const WEBHOOK_ACTIONS: [&str; 4] = ["BoilerErrorInfo", "GasUsage", "PowerUsage", "Thermostat"];

/// Picks one agreement out of the account's agreement list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgreementSelector {
    /// Match on `agreement_id`
    Id(String),
    /// Match on `display_common_name`
    DisplayCommonName(String),
    /// Match on the complete agreement value
    Agreement(Agreement),
}

impl AgreementSelector {
    pub fn id(agreement_id: impl Into<String>) -> Self {
        Self::Id(agreement_id.into())
    }

    pub fn display_common_name(name: impl Into<String>) -> Self {
        Self::DisplayCommonName(name.into())
    }

    pub fn matches(&self, agreement: &Agreement) -> bool {
        match self {
            Self::Id(id) => agreement.agreement_id.as_deref() == Some(id.as_str()),
            Self::DisplayCommonName(name) => {
                agreement.display_common_name.as_deref() == Some(name.as_str())
            }
            Self::Agreement(value) => agreement == value,
        }
    }
}

impl From<Agreement> for AgreementSelector {
    fn from(agreement: Agreement) -> Self {
        Self::Agreement(agreement)
    }
}

impl From<&Agreement> for AgreementSelector {
    fn from(agreement: &Agreement) -> Self {
        Self::Agreement(agreement.clone())
    }
}

/// Where the client is in the agreement lifecycle
#[derive(Debug, Clone, Default)]
pub enum ClientState {
    /// Agreements have not been fetched yet
    #[default]
    Unbound,
    /// The agreement list is cached, none is active
    AgreementsKnown(Vec<Agreement>),
    /// An agreement is active and owns a status record
    Active {
        agreements: Vec<Agreement>,
        status: Box<Status>,
    },
}

impl ClientState {
    pub fn agreements(&self) -> Option<&[Agreement]> {
        match self {
            ClientState::Unbound => None,
            ClientState::AgreementsKnown(agreements) => Some(agreements.as_slice()),
            ClientState::Active { agreements, .. } => Some(agreements.as_slice()),
        }
    }

    pub fn status(&self) -> Option<&Status> {
        match self {
            ClientState::Active { status, .. } => Some(&**status),
            _ => None,
        }
    }

    fn status_mut(&mut self) -> Option<&mut Status> {
        match self {
            ClientState::Active { status, .. } => Some(&mut **status),
            _ => None,
        }
    }

    /// Replace the cached list. An active agreement stays active.
    fn set_agreements(&mut self, list: Vec<Agreement>) {
        match self {
            ClientState::Active { agreements, .. } => *agreements = list,
            state => *state = ClientState::AgreementsKnown(list),
        }
    }

    /// Bind a fresh status to `agreement`, dropping any previous one
    fn activate(&mut self, agreement: Agreement) {
        let agreements = match std::mem::take(self) {
            ClientState::Unbound => Vec::new(),
            ClientState::AgreementsKnown(agreements) => agreements,
            ClientState::Active { agreements, .. } => agreements,
        };
        *self = ClientState::Active {
            agreements,
            status: Box::new(Status::new(agreement)),
        };
    }
}

/// Asynchronous client for the Toon API
///
/// Operations that touch client state take `&mut self`; share a client
/// between tasks behind a `tokio::sync::Mutex`.
#[derive(Debug)]
pub struct ToonClient {
    config: ClientConfig,
    session: Session,
    state: ClientState,
}

impl ToonClient {
    /// Create a client with the default configuration
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::builder(token).build()
    }

    pub fn builder(token: impl Into<String>) -> ToonClientBuilder {
        ToonClientBuilder::new(token)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn active_agreement(&self) -> Option<&Agreement> {
        self.state.status().map(|status| &status.agreement)
    }

    /// Id of the active agreement
    pub fn agreement_id(&self) -> Option<&str> {
        self.active_agreement()?.agreement_id.as_deref()
    }

    pub fn status(&self) -> Option<&Status> {
        self.state.status()
    }

    // =========================================================================
    // Agreements
    // =========================================================================

    /// Agreements on the linked account, fetched once and cached
    #[instrument(skip(self))]
    pub async fn agreements(&mut self, force_update: bool) -> Result<&[Agreement]> {
        if force_update || self.state.agreements().is_none() {
            let request = ApiRequest::get(self.config.agreements_path());
            let data = self.session.execute(&request).await?.into_json()?;
            let agreements = parse_agreements(&data)?;
            debug!(count = agreements.len(), "Fetched agreements");
            self.state.set_agreements(agreements);
        }
        Ok(self.state.agreements().unwrap_or_default())
    }

    /// Select the agreement all further calls operate on.
    ///
    /// Fetches the agreement list first if it is not cached yet. Activating
    /// an agreement always starts with a fresh [`Status`].
    #[instrument(skip_all)]
    pub async fn activate_agreement(
        &mut self,
        selector: impl Into<AgreementSelector>,
    ) -> Result<&Agreement> {
        let selector = selector.into();
        let agreements = self.agreements(false).await?;
        if agreements.is_empty() {
            return Err(ToonError::NoAgreements);
        }

        let agreement = agreements
            .iter()
            .find(|agreement| selector.matches(agreement))
            .cloned()
            .ok_or(ToonError::AgreementNotFound)?;

        info!(
            agreement_id = agreement.agreement_id.as_deref().unwrap_or_default(),
            display_common_name = agreement.display_common_name.as_deref().unwrap_or_default(),
            "Activated agreement"
        );
        self.state.activate(agreement);
        self.active_agreement().ok_or(ToonError::NoActiveAgreement)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Fetch the status of the active agreement and merge it in
    #[instrument(skip(self))]
    pub async fn update(&mut self) -> Result<&Status> {
        let data = {
            let agreement = self.require_active()?;
            let request =
                ApiRequest::get(self.config.status_path(agreement_id(agreement)?)).agreement(agreement);
            self.session.execute(&request).await?.into_json()?
        };
        self.update_with(&data)
    }

    /// Merge a status document obtained elsewhere, e.g. pushed to a webhook
    pub fn update_with(&mut self, data: &Value) -> Result<&Status> {
        let status = self.state.status_mut().ok_or(ToonError::NoActiveAgreement)?;
        status.update(data);
        Ok(&*status)
    }

    // =========================================================================
    // Thermostat
    // =========================================================================

    /// Set a temperature (in °C), overriding the program
    ///
    /// Sent in hundredths of a degree, halves rounded to even.
    #[instrument(skip(self))]
    pub async fn set_current_setpoint(&mut self, temperature: f64) -> Result<()> {
        let data = json!({
            "currentSetpoint": (temperature * 100.0).round_ties_even() as i64,
            "programState": ProgramState::Override.as_wire(),
            "activeState": ActiveState::Off.as_wire(),
        });
        self.update_thermostat(data).await
    }

    /// Switch to a preset. [`ProgramState::default`] overrides the program.
    #[instrument(skip(self))]
    pub async fn set_active_state(
        &mut self,
        active_state: ActiveState,
        program_state: ProgramState,
    ) -> Result<()> {
        let data = json!({
            "programState": program_state.as_wire(),
            "activeState": active_state.as_wire(),
        });
        self.update_thermostat(data).await
    }

    /// Send a thermostat change, then apply the same document locally
    async fn update_thermostat(&mut self, data: Value) -> Result<()> {
        {
            let agreement = self.require_active()?;
            let request = ApiRequest::put(self.config.thermostat_path(agreement_id(agreement)?))
                .agreement(agreement)
                .json(data.clone());
            self.session.execute(&request).await?;
        }

        let status = self.state.status_mut().ok_or(ToonError::NoActiveAgreement)?;
        status.thermostat.update(&data);
        Ok(())
    }

    // =========================================================================
    // Webhooks
    // =========================================================================

    /// Register `url` for push updates, replacing any registration of
    /// `application_id`
    #[instrument(skip(self))]
    pub async fn subscribe_webhook(&self, application_id: &str, url: &str) -> Result<()> {
        self.unsubscribe_webhook(application_id).await?;

        let agreement = self.require_active()?;
        let request = ApiRequest::post(self.config.webhooks_path(agreement_id(agreement)?))
            .agreement(agreement)
            .json(json!({
                "applicationId": application_id,
                "callbackUrl": url,
                "subscribedActions": WEBHOOK_ACTIONS,
            }));
        self.session.execute(&request).await?;

        info!(application_id, url, "Registered webhook");
        Ok(())
    }

    /// Remove the registration of `application_id`. A missing registration
    /// is not an error.
    ///
    /// Any 404 counts as a missing registration, including one caused by a
    /// path the API does not know.
    #[instrument(skip(self))]
    pub async fn unsubscribe_webhook(&self, application_id: &str) -> Result<()> {
        let agreement = self.require_active()?;
        let request = ApiRequest::delete(
            self.config
                .webhook_path(agreement_id(agreement)?, application_id),
        )
        .agreement(agreement);

        match self.session.execute(&request).await {
            Ok(_) => Ok(()),
            Err(e) if e.status() == Some(404) => {
                debug!(application_id, "No webhook registered");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Release the HTTP client if this client created it
    pub fn close(self) {
        self.session.close();
    }

    fn require_active(&self) -> Result<&Agreement> {
        self.active_agreement().ok_or(ToonError::NoActiveAgreement)
    }
}

fn agreement_id(agreement: &Agreement) -> Result<&str> {
    agreement
        .agreement_id
        .as_deref()
        .ok_or(ToonError::AgreementNotFound)
}

fn parse_agreements(data: &Value) -> Result<Vec<Agreement>> {
    let items = data
        .as_array()
        .ok_or_else(|| ToonError::Parse(format!("expected a list of agreements, got {}", data)))?;
    Ok(items.iter().map(Agreement::from_json).collect())
}

/// Builder for [`ToonClient`]
pub struct ToonClientBuilder {
    token: String,
    config: ClientConfig,
    http_client: Option<Client>,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl ToonClientBuilder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            config: ClientConfig::default(),
            http_client: None,
            token_provider: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Timeout for each individual attempt
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn retry_policies(mut self, connection: RetryPolicy, rate_limit: RetryPolicy) -> Self {
        self.config.retry.connection = connection;
        self.config.retry.rate_limit = rate_limit;
        self
    }

    /// Use an existing HTTP client. It is never closed by the Toon client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Ask `provider` for the bearer token before every request
    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    pub fn build(self) -> Result<ToonClient> {
        let session = Session::new(
            &self.config,
            self.token,
            self.http_client,
            self.token_provider,
        )?;
        Ok(ToonClient {
            config: self.config,
            session,
            state: ClientState::Unbound,
        })
    }
}
