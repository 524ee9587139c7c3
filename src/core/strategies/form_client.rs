use crate::config::Settings;
use crate::core::extract::HtmlExtractor;
use crate::core::normalize;
use crate::domain::model::{BirthData, ChartResult, StrategyOutcome};
use crate::domain::ports::{ChartStrategy, Extractor};
use crate::utils::error::{ChartError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{redirect, Client};
use std::time::Duration;
use url::Url;

/// The two form clients share all protocol logic and differ only in
/// transport knobs. They exist as independent fallbacks in case the
/// external site blocks or rate-limits one transport fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProfile {
    /// Browser-like fingerprint, generous redirects, single attempt.
    Standard,
    /// Conservative fingerprint, tighter timeout, one retry on a
    /// transport error.
    Hardened,
}

impl TransportProfile {
    pub fn strategy_name(&self) -> &'static str {
        match self {
            TransportProfile::Standard => "form-standard",
            TransportProfile::Hardened => "form-hardened",
        }
    }

    fn user_agent(&self) -> &'static str {
        match self {
            TransportProfile::Standard => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36"
            }
            TransportProfile::Hardened => "bodygraph/0.1",
        }
    }

    fn max_redirects(&self) -> usize {
        match self {
            TransportProfile::Standard => 10,
            TransportProfile::Hardened => 5,
        }
    }

    fn timeout(&self, base_secs: u64) -> Duration {
        match self {
            TransportProfile::Standard => Duration::from_secs(base_secs),
            TransportProfile::Hardened => Duration::from_secs(base_secs.div_ceil(2)),
        }
    }

    fn post_retries(&self) -> u32 {
        match self {
            TransportProfile::Standard => 0,
            TransportProfile::Hardened => 1,
        }
    }
}

/// Fetches the form page, extracts the anti-forgery token, POSTs the
/// URL-encoded birth fields and parses the final HTML.
pub struct FormClientStrategy {
    client: Client,
    profile: TransportProfile,
    form_url: String,
    extractor: HtmlExtractor,
    request_delay: Duration,
}

impl FormClientStrategy {
    pub fn new(settings: &Settings, profile: TransportProfile) -> Result<Self> {
        let client = Client::builder()
            .timeout(profile.timeout(settings.http.timeout_secs))
            .redirect(redirect::Policy::limited(profile.max_redirects()))
            .user_agent(profile.user_agent())
            .cookie_store(true)
            .build()?;
        let base = Url::parse(&settings.site.base_url).map_err(|e| ChartError::Config {
            message: format!("invalid site.base_url: {}", e),
        })?;
        Ok(Self {
            client,
            profile,
            form_url: settings.form_url(),
            extractor: HtmlExtractor::new(base),
            request_delay: Duration::from_millis(settings.http.request_delay_ms),
        })
    }

    async fn try_submit(&self, birth: &BirthData) -> Result<ChartResult> {
        tokio::time::sleep(self.request_delay).await;

        tracing::debug!("{}: fetching form page", self.profile.strategy_name());
        let form_page = self
            .client
            .get(&self.form_url)
            .send()
            .await?
            .text()
            .await?;

        let token = extract_forgery_token(&form_page);
        if token.is_empty() {
            tracing::warn!(
                "{}: no anti-forgery token found, submitting without one",
                self.profile.strategy_name()
            );
        }

        let location = normalize::normalize(&birth.country, &birth.city);
        let timezone = if birth.timezone_is_utc {
            "UTC".to_string()
        } else {
            location.timezone.clone()
        };

        let fields: Vec<(String, String)> = vec![
            ("__RequestVerificationToken".to_string(), token.clone()),
            ("name".to_string(), birth.name.clone()),
            ("day".to_string(), birth.day.to_string()),
            ("month".to_string(), birth.month.to_string()),
            ("year".to_string(), birth.year.to_string()),
            ("hour".to_string(), birth.hour.to_string()),
            ("minute".to_string(), birth.minute.to_string()),
            ("country".to_string(), location.country.clone()),
            ("city".to_string(), location.city.clone()),
            ("timezone".to_string(), timezone.clone()),
        ];

        let mut last_error = None;
        for attempt in 0..=self.profile.post_retries() {
            if attempt > 0 {
                tracing::debug!("{}: retrying submission", self.profile.strategy_name());
            }
            match self.client.post(&self.form_url).form(&fields).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        return Err(ChartError::Status {
                            status: status.as_u16(),
                        });
                    }
                    let body = response.text().await?;
                    return self.extractor.extract(&body);
                }
                Err(e) => last_error = Some(e),
            }
        }

        // Unreachable without a prior transport error.
        Err(last_error.map(ChartError::Transport).unwrap_or_else(|| {
            ChartError::Extraction {
                message: "form submission produced no response".to_string(),
            }
        }))
    }
}

#[async_trait]
impl ChartStrategy for FormClientStrategy {
    fn name(&self) -> &str {
        self.profile.strategy_name()
    }

    async fn submit(&self, birth: &BirthData) -> StrategyOutcome {
        match self.try_submit(birth).await {
            Ok(result) => StrategyOutcome::Success(result),
            Err(e) => StrategyOutcome::Failure(e.to_string()),
        }
    }
}

/// Anti-forgery token: primary pattern matches the standard hidden input,
/// the looser fallback tolerates attribute reordering and inline scripts.
/// Empty string when neither matches; the site may accept the submission
/// anyway, so a missing token is never fatal here.
pub(crate) fn extract_forgery_token(html: &str) -> String {
    if let Ok(re) =
        Regex::new(r#"name="__RequestVerificationToken"[^>]*value="([^"]+)""#)
    {
        if let Some(caps) = re.captures(html) {
            return caps[1].to_string();
        }
    }
    if let Ok(re) = Regex::new(r#"(?is)verificationtoken.{0,200}?value=["']([^"']+)["']"#) {
        if let Some(caps) = re.captures(html) {
            return caps[1].to_string();
        }
    }
    String::new()
}
