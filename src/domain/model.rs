use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Birth data for one chart-generation attempt. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
    pub country: String,
    pub city: String,
    #[serde(default)]
    pub timezone_is_utc: bool,
}

impl BirthData {
    /// ISO-8601 date, e.g. "1990-06-15".
    pub fn iso_date(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// 24h clock time, e.g. "14:30".
    pub fn iso_time(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Location fields resolved to the external site's expected values.
/// Derived per strategy attempt; never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLocation {
    pub country: String,
    pub city: String,
    pub timezone: String,
}

/// The canonical output every strategy must produce, regardless of how
/// the raw payload was obtained or parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartResult {
    pub properties: BTreeMap<String, String>,
    pub design_activations: Vec<String>,
    pub personality_activations: Vec<String>,
    pub chart_image_url: Option<String>,
    pub download_token: Option<String>,
}

impl ChartResult {
    /// A result counts as usable when at least one field carries data.
    /// Empty-but-present results are demoted to "try next strategy" by
    /// the orchestrator.
    pub fn is_usable(&self) -> bool {
        !self.properties.is_empty()
            || !self.design_activations.is_empty()
            || !self.personality_activations.is_empty()
    }
}

/// Outcome of one strategy invocation. Never persisted.
#[derive(Debug, Clone)]
pub enum StrategyOutcome {
    Success(ChartResult),
    Failure(String),
}

/// One recorded attempt, kept for the aggregated exhaustion error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: String,
    pub reason: String,
}

/// Outbound contract: the chart plus the original birth data echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub birth_data: BirthData,
    pub chart: ChartResult,
}
