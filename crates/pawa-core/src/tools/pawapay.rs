//! pawaPay tools: merchant configuration, correspondents and deposits

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{ToolHandler, ToolRegistry, json_schema, required_segment, required_str, to_text};
use crate::credential::Credential;
use crate::error::CatalogError;
use crate::pawapay::{DepositRequest, PawaPayClient};

/// Register every pawaPay tool against one shared client
pub fn register_all(registry: &mut ToolRegistry, client: Arc<PawaPayClient>) {
    registry.register(Arc::new(ActiveConfTool::new(client.clone())));
    registry.register(Arc::new(CorrespondentPredictTool::new(client.clone())));
    registry.register(Arc::new(CorrespondentAvailabilityTool::new(client.clone())));
    registry.register(Arc::new(DepositTool::new(client.clone())));
    registry.register(Arc::new(DepositStatusTool::new(client)));
}

/// `activeConf`: merchant's enabled countries, correspondents and limits
pub struct ActiveConfTool {
    client: Arc<PawaPayClient>,
}

impl ActiveConfTool {
    pub fn new(client: Arc<PawaPayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for ActiveConfTool {
    fn name(&self) -> &str {
        "activeConf"
    }

    fn description(&self) -> &str {
        "Get the merchant's active pawaPay configuration: countries, correspondents and transaction limits."
    }

    fn input_schema(&self) -> Value {
        json_schema(serde_json::json!({}), vec![])
    }

    async fn execute(
        &self,
        _input: Value,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        let conf = self.client.active_conf(credential).await?;
        to_text(&conf)
    }
}

/// `correspondentPredict`: which mobile operator serves a phone number
pub struct CorrespondentPredictTool {
    client: Arc<PawaPayClient>,
}

impl CorrespondentPredictTool {
    pub fn new(client: Arc<PawaPayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for CorrespondentPredictTool {
    fn name(&self) -> &str {
        "correspondentPredict"
    }

    fn description(&self) -> &str {
        "Predict the correspondent (mobile money operator) for a phone number."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "msisdn": {"type": "string", "description": "Phone number in international format"}
            }),
            vec!["msisdn"],
        )
    }

    async fn execute(
        &self,
        input: Value,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        let msisdn = required_str(&input, "msisdn")?;
        let predicted = self
            .client
            .predict_correspondent(msisdn, credential)
            .await?;
        to_text(&predicted)
    }
}

/// `correspondentAvailability`: operational status per correspondent
pub struct CorrespondentAvailabilityTool {
    client: Arc<PawaPayClient>,
}

impl CorrespondentAvailabilityTool {
    pub fn new(client: Arc<PawaPayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for CorrespondentAvailabilityTool {
    fn name(&self) -> &str {
        "correspondentAvailability"
    }

    fn description(&self) -> &str {
        "Get the current operational status of every pawaPay correspondent."
    }

    fn input_schema(&self) -> Value {
        json_schema(serde_json::json!({}), vec![])
    }

    // Public endpoint: the credential is deliberately not sent.
    async fn execute(
        &self,
        _input: Value,
        _credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        let availability = self.client.availability().await?;
        to_text(&availability)
    }
}

/// `deposit`: initiate a mobile money deposit
pub struct DepositTool {
    client: Arc<PawaPayClient>,
}

impl DepositTool {
    pub fn new(client: Arc<PawaPayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for DepositTool {
    fn name(&self) -> &str {
        "deposit"
    }

    fn description(&self) -> &str {
        "Initiate a mobile money deposit (collect funds from a customer's wallet)."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "depositId": {"type": "string", "description": "Client-generated UUID for the deposit"},
                "amount": {"type": "string", "description": "Amount as a decimal string"},
                "currency": {"type": "string", "description": "ISO 4217 currency code"},
                "msisdn": {"type": "string", "description": "Payer phone number"},
                "correspondent": {"type": "string", "description": "Correspondent code, e.g. MTN_MOMO_ZMB"},
                "country": {"type": "string", "description": "ISO 3166-1 alpha-3 country code"},
                "description": {"type": "string", "description": "Statement description shown to the payer"}
            }),
            vec![
                "depositId",
                "amount",
                "currency",
                "msisdn",
                "correspondent",
                "country",
                "description",
            ],
        )
    }

    async fn execute(
        &self,
        input: Value,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        let request = DepositRequest::mobile_money(
            required_str(&input, "depositId")?,
            required_str(&input, "amount")?,
            required_str(&input, "currency")?,
            required_str(&input, "country")?,
            required_str(&input, "correspondent")?,
            required_str(&input, "msisdn")?,
            required_str(&input, "description")?,
        );
        debug!(deposit_id = %request.deposit_id, "deposit tool");
        let response = self.client.send_deposit(&request, credential).await?;
        to_text(&response)
    }
}

/// `depositStatus`: look up a deposit
pub struct DepositStatusTool {
    client: Arc<PawaPayClient>,
}

impl DepositStatusTool {
    pub fn new(client: Arc<PawaPayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for DepositStatusTool {
    fn name(&self) -> &str {
        "depositStatus"
    }

    fn description(&self) -> &str {
        "Get the status of a previously initiated deposit."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "transactionId": {"type": "string", "description": "The depositId of the deposit"}
            }),
            vec!["transactionId"],
        )
    }

    async fn execute(
        &self,
        input: Value,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        let id = required_segment(&input, "transactionId")?;
        let lookup = self.client.get_deposit(id, credential).await?;
        to_text(&lookup)
    }
}
