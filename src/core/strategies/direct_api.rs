use crate::config::Settings;
use crate::core::extract::ApiJsonExtractor;
use crate::core::normalize;
use crate::domain::model::{BirthData, ChartResult, StrategyOutcome};
use crate::domain::ports::{ChartStrategy, Extractor};
use crate::utils::error::{ChartError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const STRATEGY_NAME: &str = "direct-api";

/// Single authenticated request against the external calculation API.
/// Requires a pre-shared bearer token; without one the strategy fails
/// immediately and no network call is made.
pub struct DirectApiStrategy {
    client: Client,
    base_url: String,
    token: Option<String>,
    request_delay: Duration,
}

impl DirectApiStrategy {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.http.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.api.base_url.trim_end_matches('/').to_string(),
            token: settings.api.token.clone(),
            request_delay: Duration::from_millis(settings.http.request_delay_ms),
        })
    }

    async fn try_submit(&self, birth: &BirthData) -> Result<ChartResult> {
        let Some(token) = &self.token else {
            return Err(ChartError::ConfigurationMissing {
                strategy: STRATEGY_NAME.to_string(),
                key: "api.token".to_string(),
            });
        };

        tokio::time::sleep(self.request_delay).await;

        let location = normalize::normalize(&birth.country, &birth.city);
        let timezone = if birth.timezone_is_utc {
            "UTC".to_string()
        } else {
            location.timezone.clone()
        };

        let payload = serde_json::json!({
            "name": birth.name,
            "date": birth.iso_date(),
            "time": birth.iso_time(),
            "country": location.country,
            "city": location.city,
            "timezone": timezone,
        });

        tracing::debug!("Requesting chart from calculation API");
        let response = self
            .client
            .post(format!("{}/v1/chart", self.base_url))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        ApiJsonExtractor.extract(&body)
    }
}

#[async_trait]
impl ChartStrategy for DirectApiStrategy {
    fn name(&self) -> &str {
        STRATEGY_NAME
    }

    async fn submit(&self, birth: &BirthData) -> StrategyOutcome {
        match self.try_submit(birth).await {
            Ok(result) => StrategyOutcome::Success(result),
            Err(e) => StrategyOutcome::Failure(e.to_string()),
        }
    }
}
