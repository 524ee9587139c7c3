use crate::domain::model::StrategyAttempt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    /// A required credential is absent. The matching strategy is skipped,
    /// never fatal for the request as a whole.
    #[error("strategy '{strategy}' disabled: missing configuration '{key}'")]
    ConfigurationMissing { strategy: String, key: String },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status; transport-level, distinct from a
    /// recognized failure page.
    #[error("transport failure: unexpected status {status}")]
    Status { status: u16 },

    #[error("operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("webdriver failure: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("captcha solving failed: {message}")]
    Captcha { message: String },

    /// The payload was recognized as a hard failure page.
    #[error("extraction failed: {message}")]
    Extraction { message: String },

    /// Payload parsed cleanly but yielded no usable fields. Soft failure;
    /// the orchestrator moves on to the next strategy.
    #[error("payload parsed but contained no chart data")]
    EmptyResult,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("invalid value for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Terminal: every configured strategy was tried and failed.
    #[error("{}", format_exhausted(.attempts))]
    AllStrategiesExhausted { attempts: Vec<StrategyAttempt> },
}

fn format_exhausted(attempts: &[StrategyAttempt]) -> String {
    let detail = attempts
        .iter()
        .map(|a| format!("{}: {}", a.strategy, a.reason))
        .collect::<Vec<_>>()
        .join("; ");
    format!("all {} strategies exhausted [{}]", attempts.len(), detail)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ChartError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChartError::ConfigurationMissing { .. } => ErrorSeverity::Low,
            ChartError::EmptyResult => ErrorSeverity::Low,
            ChartError::Transport(_)
            | ChartError::Status { .. }
            | ChartError::Timeout { .. }
            | ChartError::WebDriver(_)
            | ChartError::Captcha { .. }
            | ChartError::Extraction { .. }
            | ChartError::Serialization(_)
            | ChartError::Io(_) => ErrorSeverity::Medium,
            ChartError::AllStrategiesExhausted { .. } => ErrorSeverity::High,
            ChartError::Config { .. } | ChartError::Validation { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ChartError::AllStrategiesExhausted { attempts } => {
                let mut lines = vec!["Chart could not be fetched. Attempts:".to_string()];
                for attempt in attempts {
                    lines.push(format!("  - {}: {}", attempt.strategy, attempt.reason));
                }
                lines.join("\n")
            }
            ChartError::Validation { field, reason } => {
                format!("Invalid input '{}': {}", field, reason)
            }
            ChartError::Config { message } => format!("Configuration problem: {}", message),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ChartError::ConfigurationMissing { .. } => {
                "Provide the missing credential in the settings file or environment"
            }
            ChartError::Transport(_) | ChartError::Status { .. } => {
                "Check network connectivity and the external site status"
            }
            ChartError::Timeout { .. } => {
                "Raise http.timeout_secs or check the external site's responsiveness"
            }
            ChartError::WebDriver(_) => "Verify that chromedriver is running and reachable",
            ChartError::Captcha { .. } => "Check the captcha solver API key and account balance",
            ChartError::Extraction { .. } => {
                "The external site layout may have changed; inspect the raw response"
            }
            ChartError::EmptyResult => "Retry later or verify the submitted birth data",
            ChartError::AllStrategiesExhausted { .. } => {
                "Inspect the per-strategy reasons above; the external site may be down"
            }
            ChartError::Validation { .. } => "Correct the rejected field and resubmit",
            ChartError::Config { .. } => "Fix the settings file and restart",
            ChartError::Serialization(_) | ChartError::Io(_) => {
                "Inspect the logs for the underlying cause"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_error_lists_every_attempt() {
        let err = ChartError::AllStrategiesExhausted {
            attempts: vec![
                StrategyAttempt {
                    strategy: "direct-api".to_string(),
                    reason: "missing token".to_string(),
                },
                StrategyAttempt {
                    strategy: "browser".to_string(),
                    reason: "timeout".to_string(),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("all 2 strategies exhausted"));
        assert!(message.contains("direct-api: missing token"));
        assert!(message.contains("browser: timeout"));
    }

    #[test]
    fn severity_classification() {
        let missing = ChartError::ConfigurationMissing {
            strategy: "direct-api".to_string(),
            key: "api_token".to_string(),
        };
        assert_eq!(missing.severity(), ErrorSeverity::Low);

        let status = ChartError::Status { status: 503 };
        assert_eq!(status.severity(), ErrorSeverity::Medium);
        assert!(status.to_string().contains("transport failure"));

        let timeout = ChartError::Timeout { seconds: 30 };
        assert_eq!(timeout.severity(), ErrorSeverity::Medium);

        let validation = ChartError::Validation {
            field: "day".to_string(),
            reason: "must be between 1 and 31".to_string(),
        };
        assert_eq!(validation.severity(), ErrorSeverity::Critical);
    }
}
