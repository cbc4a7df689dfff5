//! Client for the OKX DEX aggregator REST API.
//!
//! Every request is signed with the account's secret key: the signature is the
//! base64 HMAC-SHA256 of `timestamp + method + request_path_with_query`.

use base64::Engine;
use chrono::{SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use serde::de::DeserializeOwned;
use sha2::Sha256;

use super::{Aggregator, ApproveRequest, ApproveTransaction, SwapQuote, SwapRequest};
use crate::prelude::*;

type HmacSha256 = Hmac<Sha256>;

const APPROVE_TRANSACTION_PATH: &str = "/api/v5/dex/aggregator/approve-transaction";
const SWAP_PATH: &str = "/api/v5/dex/aggregator/swap";

#[derive(Debug, Clone)]
pub struct OkxCredentials {
    pub api_key: String,
    pub secret_key: String,
    pub passphrase: String,
    pub project_id: Option<String>,
}

impl OkxCredentials {
    /// Load credentials from OKX_API_KEY, OKX_SECRET_KEY, OKX_PASSPHRASE and optional OKX_PROJECT_ID
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).with_context(|| format!("{} must be set", name));
        Ok(Self {
            api_key: var("OKX_API_KEY")?,
            secret_key: var("OKX_SECRET_KEY")?,
            passphrase: var("OKX_PASSPHRASE")?,
            project_id: std::env::var("OKX_PROJECT_ID").ok().filter(|p| !p.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: Value,
    #[serde(default)]
    msg: String,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl<T> Envelope<T> {
    fn code(&self) -> String {
        match &self.code {
            Value::String(code) => code.clone(),
            other => other.to_string(),
        }
    }

    fn is_success(&self) -> bool {
        match &self.code {
            Value::String(code) => code == "0",
            Value::Number(code) => code.as_u64() == Some(0),
            _ => false,
        }
    }
}

pub struct OkxClient {
    http_client: Client,
    base_url: String,
    credentials: OkxCredentials,
}

impl OkxClient {
    pub fn new(base_url: &str, credentials: OkxCredentials, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build http client")?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> Result<T> {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .with_context(|| format!("Invalid OKX url for {}", path))?;
        let request_path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let signature = sign_request(&self.credentials.secret_key, &timestamp, "GET", &request_path)?;

        debug!("OKX GET {}", request_path);
        let mut request = self
            .http_client
            .get(url)
            .header("OK-ACCESS-KEY", &self.credentials.api_key)
            .header("OK-ACCESS-SIGN", signature)
            .header("OK-ACCESS-TIMESTAMP", &timestamp)
            .header("OK-ACCESS-PASSPHRASE", &self.credentials.passphrase);
        if let Some(project_id) = &self.credentials.project_id {
            request = request.header("OK-ACCESS-PROJECT", project_id);
        }

        let envelope: Envelope<T> = request
            .send()
            .await
            .with_context(|| format!("OKX request {} failed", path))?
            .error_for_status()
            .with_context(|| format!("OKX request {} failed", path))?
            .json()
            .await
            .with_context(|| format!("OKX response for {} is not valid", path))?;

        if !envelope.is_success() {
            bail!("OKX API error {}: {}", envelope.code(), envelope.msg);
        }
        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OKX response for {} has no data", path))
    }
}

/// Base64 encoded HMAC-SHA256 over the prehash string OKX expects
pub fn sign_request(secret: &str, timestamp: &str, method: &str, request_path: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow!("Invalid OKX secret key: {}", e))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(request_path.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl Aggregator for OkxClient {
    async fn approve_transaction(&self, request: &ApproveRequest) -> Result<ApproveTransaction> {
        self.get(APPROVE_TRANSACTION_PATH, &request.query()).await
    }

    async fn swap(&self, request: &SwapRequest) -> Result<SwapQuote> {
        self.get(SWAP_PATH, &request.query()).await
    }
}
