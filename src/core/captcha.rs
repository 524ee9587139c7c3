use crate::utils::error::{ChartError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Client for a 2captcha-style solving service: submit the sitekey and
/// page URL, then poll for the answer with a fixed interval and a fixed
/// attempt ceiling. Hitting the ceiling is an error, never an unbounded
/// wait.
pub struct CaptchaSolver {
    client: Client,
    api_url: String,
    api_key: String,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl CaptchaSolver {
    pub fn new(
        api_url: String,
        api_key: String,
        poll_interval: Duration,
        poll_attempts: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            poll_interval,
            poll_attempts,
        })
    }

    /// Solve a reCAPTCHA for `page_url` and return the response token.
    pub async fn solve(&self, sitekey: &str, page_url: &str) -> Result<String> {
        let task_id = self.submit(sitekey, page_url).await?;
        tracing::debug!("Captcha task {} submitted, polling for answer", task_id);

        for attempt in 1..=self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;

            let response: Value = self
                .client
                .get(format!("{}/res.php", self.api_url))
                .query(&[
                    ("key", self.api_key.as_str()),
                    ("action", "get"),
                    ("id", task_id.as_str()),
                    ("json", "1"),
                ])
                .send()
                .await?
                .json()
                .await?;

            let answer = response
                .get("request")
                .and_then(Value::as_str)
                .unwrap_or_default();

            if response.get("status").and_then(Value::as_u64) == Some(1) {
                tracing::debug!("Captcha solved after {} poll(s)", attempt);
                return Ok(answer.to_string());
            }
            if answer != "CAPCHA_NOT_READY" {
                return Err(ChartError::Captcha {
                    message: format!("solver rejected task: {}", answer),
                });
            }
        }

        Err(ChartError::Captcha {
            message: format!(
                "no answer after {} polls ({}s interval)",
                self.poll_attempts,
                self.poll_interval.as_secs()
            ),
        })
    }

    async fn submit(&self, sitekey: &str, page_url: &str) -> Result<String> {
        let response: Value = self
            .client
            .post(format!("{}/in.php", self.api_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("method", "userrecaptcha"),
                ("googlekey", sitekey),
                ("pageurl", page_url),
                ("json", "1"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if response.get("status").and_then(Value::as_u64) != Some(1) {
            return Err(ChartError::Captcha {
                message: format!("task submission rejected: {}", response),
            });
        }

        response
            .get("request")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ChartError::Captcha {
                message: "task submission returned no id".to_string(),
            })
    }
}
