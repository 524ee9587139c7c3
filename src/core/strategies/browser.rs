use crate::config::Settings;
use crate::core::captcha::CaptchaSolver;
use crate::core::extract::{ApiJsonExtractor, HtmlExtractor};
use crate::core::normalize;
use crate::domain::model::{BirthData, ChartResult, StrategyOutcome};
use crate::domain::ports::{ChartStrategy, Extractor};
use crate::utils::error::{ChartError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::future::Future;
use std::time::Duration;
use thirtyfour::prelude::*;
use url::Url;

pub const STRATEGY_NAME: &str = "browser";

const SUBMIT_WAIT: Duration = Duration::from_secs(3);

/// Keywords that mark a sniffed JSON document as an authoritative chart
/// payload rather than some unrelated background response.
const CHART_VOCABULARY: &[&str] = &["activations", "authority", "profile", "design"];

/// The site has shipped two form layouts over time; the legacy one is
/// tried first because it is cheaper to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormLayout {
    /// Inputs addressable by their form field names.
    Legacy,
    /// Placeholder-labelled inputs inside custom components; filled via
    /// script because the fields sit behind shadow roots.
    Modern,
}

/// Drives a real browser through the site's chart form: navigate, solve
/// the captcha when configured, fill whichever form layout is live,
/// submit, then parse the resulting document.
pub struct BrowserStrategy {
    webdriver_url: String,
    form_url: String,
    search_url: String,
    captcha: Option<CaptchaSolver>,
    captcha_sitekey: Option<String>,
    html_extractor: HtmlExtractor,
    request_delay: Duration,
    session_timeout: Duration,
}

impl BrowserStrategy {
    pub fn new(settings: &Settings) -> Result<Self> {
        let base = Url::parse(&settings.site.base_url).map_err(|e| ChartError::Config {
            message: format!("invalid site.base_url: {}", e),
        })?;

        // Solving is optional: without a solver key the strategy still
        // runs and submits, which works whenever the site shows no
        // captcha for the session.
        let captcha = match &settings.captcha.api_key {
            Some(key) => Some(CaptchaSolver::new(
                settings.captcha.api_url.clone(),
                key.clone(),
                Duration::from_secs(settings.captcha.poll_interval_secs),
                settings.captcha.poll_attempts,
                Duration::from_secs(settings.http.timeout_secs),
            )?),
            None => None,
        };

        Ok(Self {
            webdriver_url: settings.browser.webdriver_url.clone(),
            form_url: settings.form_url(),
            search_url: settings.search_url(),
            captcha,
            captcha_sitekey: settings.captcha.sitekey.clone(),
            html_extractor: HtmlExtractor::new(base),
            request_delay: Duration::from_millis(settings.http.request_delay_ms),
            session_timeout: Duration::from_secs(settings.http.timeout_secs),
        })
    }

    async fn try_submit(&self, birth: &BirthData) -> Result<ChartResult> {
        tokio::time::sleep(self.request_delay).await;

        let mut caps = DesiredCapabilities::chrome();
        caps.add_chrome_option(
            "args",
            vec![
                "--headless=new",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-gpu",
                "--window-size=1920,1080",
            ],
        )?;

        let driver = WebDriver::new(&self.webdriver_url, caps).await?;

        // The session must be released on every exit path, timeout
        // included, so the real work runs bounded in an inner block and
        // quit() happens unconditionally.
        let result = run_with_deadline(self.session_timeout, self.run_session(&driver, birth)).await;

        if let Err(e) = driver.quit().await {
            tracing::warn!("Failed to quit browser session: {}", e);
        }

        result
    }

    async fn run_session(&self, driver: &WebDriver, birth: &BirthData) -> Result<ChartResult> {
        driver.goto(&self.form_url).await?;
        driver.query(By::Tag("body")).first().await?;

        if let (Some(solver), Some(sitekey)) = (&self.captcha, &self.captcha_sitekey) {
            let answer = solver.solve(sitekey, &self.form_url).await?;
            self.inject_captcha_answer(driver, &answer).await?;
        }

        let layout = self.fill_form(driver, birth).await?;
        tracing::debug!("Filled {:?} form layout", layout);

        self.submit_form(driver).await?;
        tokio::time::sleep(SUBMIT_WAIT).await;
        driver.query(By::Tag("body")).first().await?;

        // A bounce to the generic search page is a transient routing
        // artifact, not a hard error: report an explicitly empty result
        // and let the orchestrator move on.
        let current = driver.current_url().await?;
        if is_search_redirect(current.as_str(), &self.search_url) {
            tracing::warn!("Redirected to search page, treating as empty result");
            return Ok(ChartResult::default());
        }

        let source = driver.source().await?;

        // A captured background JSON response pre-empts HTML parsing.
        if let Some(json) = json_candidate(&source) {
            if contains_chart_vocabulary(&json) {
                tracing::debug!("Parsing sniffed JSON payload");
                return ApiJsonExtractor.extract(&json);
            }
        }

        self.html_extractor.extract(&source)
    }

    async fn inject_captcha_answer(&self, driver: &WebDriver, answer: &str) -> Result<()> {
        driver
            .execute(
                r#"
                var field = document.getElementById('g-recaptcha-response');
                if (field) {
                    field.style.display = 'block';
                    field.value = arguments[0];
                }
                "#,
                vec![serde_json::Value::String(answer.to_string())],
            )
            .await?;
        Ok(())
    }

    async fn fill_form(&self, driver: &WebDriver, birth: &BirthData) -> Result<FormLayout> {
        let location = normalize::normalize(&birth.country, &birth.city);

        let legacy_present = driver
            .query(By::Name("name"))
            .nowait()
            .exists()
            .await
            .unwrap_or(false);

        if legacy_present {
            self.fill_legacy_form(driver, birth, &location).await?;
            return Ok(FormLayout::Legacy);
        }

        self.fill_modern_form(driver, birth, &location).await?;
        Ok(FormLayout::Modern)
    }

    async fn fill_legacy_form(
        &self,
        driver: &WebDriver,
        birth: &BirthData,
        location: &crate::domain::model::NormalizedLocation,
    ) -> Result<()> {
        let fields = [
            ("name", birth.name.clone()),
            ("day", birth.day.to_string()),
            ("month", birth.month.to_string()),
            ("year", birth.year.to_string()),
            ("hour", birth.hour.to_string()),
            ("minute", birth.minute.to_string()),
            ("country", location.country.clone()),
            ("city", location.city.clone()),
        ];

        for (field, value) in fields {
            let input = driver.query(By::Name(field)).first().await?;
            input.clear().await?;
            input.send_keys(&value).await?;
        }
        Ok(())
    }

    /// The newer layout hides its inputs behind shadow roots; the only
    /// stable handle is each input's placeholder text, so the fill runs
    /// as a script inside the page.
    async fn fill_modern_form(
        &self,
        driver: &WebDriver,
        birth: &BirthData,
        location: &crate::domain::model::NormalizedLocation,
    ) -> Result<()> {
        let values = serde_json::json!({
            "Name": birth.name,
            "Day": birth.day.to_string(),
            "Month": birth.month.to_string(),
            "Year": birth.year.to_string(),
            "Hour": birth.hour.to_string(),
            "Minute": birth.minute.to_string(),
            "Country": location.country,
            "City": location.city,
        });

        let filled = driver
            .execute(MODERN_FILL_SCRIPT, vec![values])
            .await?
            .json()
            .as_u64()
            .unwrap_or(0);

        if filled == 0 {
            return Err(ChartError::Extraction {
                message: "neither form layout matched the page".to_string(),
            });
        }
        Ok(())
    }

    async fn submit_form(&self, driver: &WebDriver) -> Result<()> {
        let token_present = driver
            .query(By::Css("input[name='__RequestVerificationToken']"))
            .nowait()
            .exists()
            .await
            .unwrap_or(false);
        if !token_present {
            return Err(ChartError::Extraction {
                message: "anti-forgery token input not found on form page".to_string(),
            });
        }

        let submit = driver
            .query(By::Css("button[type='submit'], input[type='submit']"))
            .nowait()
            .first()
            .await
            .map_err(|_| ChartError::Extraction {
                message: "submit control not found on form page".to_string(),
            })?;

        submit.click().await?;
        Ok(())
    }
}

const MODERN_FILL_SCRIPT: &str = r#"
    var values = arguments[0];
    var filled = 0;
    var walk = function(root) {
        var inputs = root.querySelectorAll('input, textarea');
        inputs.forEach(function(input) {
            var placeholder = input.getAttribute('placeholder') || '';
            if (values[placeholder] !== undefined) {
                input.value = values[placeholder];
                input.dispatchEvent(new Event('input', { bubbles: true }));
                input.dispatchEvent(new Event('change', { bubbles: true }));
                filled += 1;
            }
        });
        root.querySelectorAll('*').forEach(function(el) {
            if (el.shadowRoot) { walk(el.shadowRoot); }
        });
    };
    walk(document);
    return filled;
"#;

#[async_trait]
impl ChartStrategy for BrowserStrategy {
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

/// Bound a browser session with the configured timeout. A stalled page
/// load or hung script becomes a plain error here; the caller still owns
/// the driver and quits it.
async fn run_with_deadline<F>(deadline: Duration, session: F) -> Result<ChartResult>
where
    F: Future<Output = Result<ChartResult>>,
{
    match tokio::time::timeout(deadline, session).await {
        Ok(result) => result,
        Err(_) => Err(ChartError::Timeout {
            seconds: deadline.as_secs(),
        }),
    }
}

/// True when the browser landed on the site's generic search page
/// instead of a results page.
fn is_search_redirect(current_url: &str, search_url: &str) -> bool {
    current_url
        .trim_end_matches('/')
        .starts_with(search_url.trim_end_matches('/'))
}

/// Pull a JSON document out of the rendered page, if the "page" is in
/// fact a raw JSON response (bare body or wrapped in a `<pre>` element
/// the way browsers render JSON content types). The tag match runs
/// case-insensitively on the source itself; lowercasing a copy first
/// would shift byte offsets for non-ASCII text.
fn json_candidate(source: &str) -> Option<String> {
    let trimmed = source.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(trimmed.to_string());
    }

    let re = Regex::new(r"(?is)<pre[^>]*>(.*?)</pre>").ok()?;
    let candidate = re.captures(source)?.get(1)?.as_str().trim();
    if candidate.starts_with('{') || candidate.starts_with('[') {
        Some(candidate.to_string())
    } else {
        None
    }
}

fn contains_chart_vocabulary(json: &str) -> bool {
    let lower = json.to_lowercase();
    CHART_VOCABULARY.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_redirect_is_detected_regardless_of_trailing_slash() {
        assert!(is_search_redirect(
            "https://www.humdes.com/search/",
            "https://www.humdes.com/search"
        ));
        assert!(is_search_redirect(
            "https://www.humdes.com/search?q=x",
            "https://www.humdes.com/search"
        ));
        assert!(!is_search_redirect(
            "https://www.humdes.com/chart/123",
            "https://www.humdes.com/search"
        ));
    }

    #[test]
    fn bare_json_body_is_sniffed() {
        let body = r#"{"type": 2, "activations": []}"#;
        assert_eq!(json_candidate(body).as_deref(), Some(body));
    }

    #[test]
    fn pre_wrapped_json_is_sniffed() {
        let source = r#"<html><body><pre style="word-wrap: break-word;">{"profile": 24}</pre></body></html>"#;
        assert_eq!(json_candidate(source).as_deref(), Some(r#"{"profile": 24}"#));
    }

    #[test]
    fn pre_block_after_multibyte_text_is_sliced_correctly() {
        // U+0130 lowercases to two characters, so any offset computed on
        // a lowercased copy would be shifted here.
        let source = "<html><body>İstanbul İzmir<pre>{\"profile\": 24}</pre></body></html>";
        assert_eq!(json_candidate(source).as_deref(), Some(r#"{"profile": 24}"#));
    }

    #[test]
    fn uppercase_pre_tag_is_still_sniffed() {
        let source = r#"<PRE>{"authority": 2}</PRE>"#;
        assert_eq!(json_candidate(source).as_deref(), Some(r#"{"authority": 2}"#));
    }

    #[tokio::test]
    async fn stalled_session_is_cut_off_at_the_deadline() {
        let err = run_with_deadline(
            Duration::from_millis(10),
            std::future::pending::<crate::utils::error::Result<ChartResult>>(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ChartError::Timeout { .. }));
    }

    #[test]
    fn session_timeout_comes_from_the_http_settings() {
        let mut settings = Settings::default();
        settings.http.timeout_secs = 7;
        let strategy = BrowserStrategy::new(&settings).unwrap();
        assert_eq!(strategy.session_timeout, Duration::from_secs(7));
    }

    #[test]
    fn html_pages_are_not_mistaken_for_json() {
        let source = "<html><body><div>Type: Generator</div></body></html>";
        assert!(json_candidate(source).is_none());
    }

    #[test]
    fn chart_vocabulary_gates_the_sniffed_payload() {
        assert!(contains_chart_vocabulary(r#"{"authority": 2}"#));
        assert!(!contains_chart_vocabulary(r#"{"session": "abc"}"#));
    }
}
