use crate::config::Config;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const API_PORT: u16 = 215;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response is not a mapping of resources")]
    NotAMapping,
    #[error("resource '{0}' has no numeric data.value")]
    MissingValue(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait DatasetSource {
    /// Returns one value per resource row the appliance reports for `path`.
    async fn fetch(&self, path: &str, timeout: Duration) -> Result<Vec<i64>, RequestError>;
}

pub struct AnalyticsClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl AnalyticsClient {
    pub fn new(cfg: &Config) -> Result<Self, RequestError> {
        Self::with_base_url(cfg, format!("https://{}:{}/api", cfg.host, API_PORT))
    }

    pub fn with_base_url(cfg: &Config, base_url: String) -> Result<Self, RequestError> {
        let client = Client::builder()
            .user_agent(concat!("zfssa-sensor/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!cfg.verify_tls)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            base_url,
            username: cfg.username.clone(),
            password: cfg.password.clone(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}?start=now&seconds=1", self.base_url, path)
    }
}

#[async_trait]
impl DatasetSource for AnalyticsClient {
    async fn fetch(&self, path: &str, timeout: Duration) -> Result<Vec<i64>, RequestError> {
        let url = self.url_for(path);
        debug!(url = %url, "querying dataset");

        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RequestError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        parse_samples(&body)
    }
}

pub fn parse_samples(body: &str) -> Result<Vec<i64>, RequestError> {
    let doc: Value = serde_json::from_str(body)?;
    let rows = doc.as_object().ok_or(RequestError::NotAMapping)?;

    rows.iter()
        .map(|(id, row)| {
            let value = &row["data"]["value"];
            value
                .as_i64()
                .or_else(|| value.as_f64().map(|v| v.round() as i64))
                .ok_or_else(|| RequestError::MissingValue(id.clone()))
        })
        .collect()
}
