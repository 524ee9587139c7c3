use crate::utils::error::{ChartError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for the external collaborators: chart site, calculation API,
/// captcha solver, WebDriver endpoint and HTTP etiquette knobs. Loaded
/// from TOML with env-var overrides for secrets; every field has a
/// default so the file is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub captcha: CaptchaSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub http: HttpSettings,
    /// Strategy priority order; unknown names are rejected at chain
    /// construction. Defaults to direct-api, browser, form-standard,
    /// form-hardened.
    #[serde(default)]
    pub strategy_order: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_site_base_url")]
    pub base_url: String,
    #[serde(default = "default_form_path")]
    pub form_path: String,
    #[serde(default = "default_search_path")]
    pub search_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Bearer credential; absent disables the direct-api strategy.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaSettings {
    #[serde(default = "default_captcha_api_url")]
    pub api_url: String,
    /// Solver credential; absent disables captcha solving (the browser
    /// strategy still runs and submits without it).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Site-specific captcha key. Deliberately has no default: it is
    /// environment-specific and must be configured explicitly.
    #[serde(default)]
    pub sitekey: Option<String>,
    #[serde(default = "default_captcha_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_captcha_poll_attempts")]
    pub poll_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Minimum inter-request delay applied by every strategy before its
    /// first network call, as etiquette toward the external service.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

fn default_site_base_url() -> String {
    "https://www.humdes.com".to_string()
}
fn default_form_path() -> String {
    "/chart/new".to_string()
}
fn default_search_path() -> String {
    "/search".to_string()
}
fn default_api_base_url() -> String {
    "https://api.humdes.com".to_string()
}
fn default_captcha_api_url() -> String {
    "https://2captcha.com".to_string()
}
fn default_captcha_poll_interval() -> u64 {
    5
}
fn default_captcha_poll_attempts() -> u32 {
    12
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    1500
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: default_site_base_url(),
            form_path: default_form_path(),
            search_path: default_search_path(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            token: None,
        }
    }
}

impl Default for CaptchaSettings {
    fn default() -> Self {
        Self {
            api_url: default_captcha_api_url(),
            api_key: None,
            sitekey: None,
            poll_interval_secs: default_captcha_poll_interval(),
            poll_attempts: default_captcha_poll_attempts(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut settings: Settings =
            toml::from_str(&content).map_err(|e| ChartError::Config {
                message: format!("failed to parse settings file: {}", e),
            })?;
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let mut settings = Settings::default();
                settings.apply_env_overrides();
                settings.validate()?;
                Ok(settings)
            }
        }
    }

    /// Secrets come from the environment in deployed setups so they never
    /// land in a checked-in settings file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("HD_API_TOKEN") {
            if !token.is_empty() {
                self.api.token = Some(token);
            }
        }
        if let Ok(key) = std::env::var("CAPTCHA_API_KEY") {
            if !key.is_empty() {
                self.captcha.api_key = Some(key);
            }
        }
        if let Ok(sitekey) = std::env::var("CAPTCHA_SITEKEY") {
            if !sitekey.is_empty() {
                self.captcha.sitekey = Some(sitekey);
            }
        }
    }

    pub fn form_url(&self) -> String {
        format!(
            "{}{}",
            self.site.base_url.trim_end_matches('/'),
            self.site.form_path
        )
    }

    pub fn search_url(&self) -> String {
        format!(
            "{}{}",
            self.site.base_url.trim_end_matches('/'),
            self.site.search_path
        )
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("site.base_url", &self.site.base_url)?;
        validate_url("api.base_url", &self.api.base_url)?;
        validate_url("captcha.api_url", &self.captcha.api_url)?;
        validate_url("browser.webdriver_url", &self.browser.webdriver_url)?;
        validate_range("http.timeout_secs", self.http.timeout_secs, 1, 600)?;
        validate_range(
            "captcha.poll_interval_secs",
            self.captcha.poll_interval_secs,
            1,
            60,
        )?;
        validate_range("captcha.poll_attempts", self.captcha.poll_attempts, 1, 120)?;
        Ok(())
    }
}
