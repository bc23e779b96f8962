//! pawaPay merchant API client
//!
//! Covers the handful of endpoints exposed as MCP tools: active configuration,
//! correspondent availability and prediction, deposit initiation and lookup.
//! Requests are typed; responses are kept as raw JSON and handed to the
//! client unchanged, since the sandbox and production APIs disagree on which
//! fields they populate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::credential::Credential;
use crate::error::DownstreamError;
use crate::http::JsonApi;

/// Body of `POST /deposits`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub deposit_id: String,
    pub amount: String,
    pub currency: String,
    pub country: String,
    pub correspondent: String,
    pub payer: Payer,
    pub customer_timestamp: String,
    pub statement_description: String,
    pub pre_authorisation_code: Option<String>,
    pub metadata: Option<Vec<DepositMetadata>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payer {
    #[serde(rename = "type")]
    pub payer_type: String,
    pub address: PayerAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayerAddress {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositMetadata {
    pub field_name: String,
    pub field_value: String,
    #[serde(rename = "isPII")]
    pub is_pii: Option<bool>,
}

/// `GET /deposits/{id}` answers with a list on v1 and a single object on
/// some sandbox builds; accept both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepositLookup {
    Many(Vec<Value>),
    One(Value),
}

impl DepositLookup {
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Self::Many(v) => v,
            Self::One(d) => vec![d],
        }
    }
}

impl DepositRequest {
    /// Mobile-money deposit from an MSISDN payer, timestamped now
    pub fn mobile_money(
        deposit_id: &str,
        amount: &str,
        currency: &str,
        country: &str,
        correspondent: &str,
        msisdn: &str,
        description: &str,
    ) -> Self {
        Self {
            deposit_id: deposit_id.to_string(),
            amount: amount.to_string(),
            currency: currency.to_string(),
            country: country.to_string(),
            correspondent: correspondent.to_string(),
            payer: Payer {
                payer_type: "MSISDN".to_string(),
                address: PayerAddress {
                    value: msisdn.to_string(),
                },
            },
            customer_timestamp: chrono::Utc::now().to_rfc3339(),
            statement_description: description.to_string(),
            pre_authorisation_code: None,
            metadata: None,
        }
    }
}

/// Client for the pawaPay merchant API
#[derive(Clone, Debug)]
pub struct PawaPayClient {
    api: JsonApi,
}

impl PawaPayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api: JsonApi::new("pawapay", base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    /// Merchant configuration: enabled countries, correspondents and limits
    pub async fn active_conf(
        &self,
        credential: Option<&Credential>,
    ) -> Result<Value, DownstreamError> {
        self.api.get("/active-conf", credential).await
    }

    /// Public operational status of every correspondent; sent without credentials
    pub async fn availability(&self) -> Result<Value, DownstreamError> {
        self.api.get("/availability", None).await
    }

    /// Predict the correspondent (mobile operator) for a phone number
    pub async fn predict_correspondent(
        &self,
        msisdn: &str,
        credential: Option<&Credential>,
    ) -> Result<Value, DownstreamError> {
        let body = serde_json::json!({ "msisdn": msisdn });
        self.api
            .post("/v1/predict-correspondent", &body, credential)
            .await
    }

    /// Initiate a deposit
    pub async fn send_deposit(
        &self,
        request: &DepositRequest,
        credential: Option<&Credential>,
    ) -> Result<Value, DownstreamError> {
        debug!(deposit_id = %request.deposit_id, "Sending pawaPay deposit");
        self.api.post("/deposits", request, credential).await
    }

    /// Look up a deposit by id
    pub async fn get_deposit(
        &self,
        deposit_id: &str,
        credential: Option<&Credential>,
    ) -> Result<DepositLookup, DownstreamError> {
        let path = format!("/deposits/{}", deposit_id);
        self.api.get(&path, credential).await
    }
}
