//! End-to-end scenarios over the orchestrator with stubbed strategies:
//! the JSON contract the transport layer serializes, and the aggregated
//! failure shape it maps to a 5xx response.

use async_trait::async_trait;
use bodygraph::{
    BirthData, ChartError, ChartResponse, ChartResult, ChartStrategy, FallbackOrchestrator,
    StrategyOutcome,
};

const SITE_HOST: &str = "https://www.humdes.com";

struct FixtureStrategy;

#[async_trait]
impl ChartStrategy for FixtureStrategy {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn submit(&self, _birth: &BirthData) -> StrategyOutcome {
        let mut result = ChartResult::default();
        result
            .properties
            .insert("type".to_string(), "Generator".to_string());
        result
            .properties
            .insert("profile".to_string(), "1/3".to_string());
        result.design_activations = vec!["Sun 34.2 ▲".to_string()];
        result.personality_activations = vec!["Sun 45.1 ▼".to_string()];
        result.chart_image_url = Some(format!("{}/render/chart.png", SITE_HOST));
        StrategyOutcome::Success(result)
    }
}

struct TransportErrorStrategy(&'static str, &'static str);

#[async_trait]
impl ChartStrategy for TransportErrorStrategy {
    fn name(&self) -> &str {
        self.0
    }

    async fn submit(&self, _birth: &BirthData) -> StrategyOutcome {
        StrategyOutcome::Failure(self.1.to_string())
    }
}

fn birth() -> BirthData {
    BirthData {
        name: "John Doe".to_string(),
        email: None,
        day: 15,
        month: 6,
        year: 1990,
        hour: 14,
        minute: 30,
        country: "Pakistan".to_string(),
        city: "Peshawar".to_string(),
        timezone_is_utc: false,
    }
}

#[tokio::test]
async fn successful_run_produces_the_outbound_json_contract() {
    let mut orchestrator = FallbackOrchestrator::new(vec![Box::new(FixtureStrategy)]);

    let birth = birth();
    let chart = orchestrator.run(&birth).await.unwrap();
    let response = ChartResponse {
        birth_data: birth,
        chart,
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(
        json.pointer("/chart/properties/type").unwrap(),
        "Generator"
    );
    assert_eq!(json.pointer("/birth_data/name").unwrap(), "John Doe");
    assert_eq!(json.pointer("/birth_data/city").unwrap(), "Peshawar");

    let image_url = json
        .pointer("/chart/chart_image_url")
        .and_then(|v| v.as_str())
        .unwrap();
    assert!(image_url.starts_with(SITE_HOST));
}

#[tokio::test]
async fn all_transport_failures_aggregate_into_one_structured_error() {
    let strategies: Vec<Box<dyn ChartStrategy>> = vec![
        Box::new(TransportErrorStrategy("direct-api", "connection refused")),
        Box::new(TransportErrorStrategy("browser", "webdriver unreachable")),
        Box::new(TransportErrorStrategy("form-standard", "request timed out")),
        Box::new(TransportErrorStrategy("form-hardened", "connection reset")),
    ];

    let mut orchestrator = FallbackOrchestrator::new(strategies);
    let err = orchestrator.run(&birth()).await.unwrap_err();

    let ChartError::AllStrategiesExhausted { attempts } = &err else {
        panic!("expected AllStrategiesExhausted");
    };
    assert_eq!(attempts.len(), 4);

    let reasons: Vec<&str> = attempts.iter().map(|a| a.reason.as_str()).collect();
    assert_eq!(
        reasons,
        vec![
            "connection refused",
            "webdriver unreachable",
            "request timed out",
            "connection reset"
        ]
    );

    // The user-facing rendering names every attempted strategy; no raw
    // stack traces.
    let message = err.user_friendly_message();
    for name in ["direct-api", "browser", "form-standard", "form-hardened"] {
        assert!(message.contains(name), "missing {} in: {}", name, message);
    }
}
