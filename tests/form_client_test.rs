use bodygraph::core::strategies::{FormClientStrategy, TransportProfile};
use bodygraph::{BirthData, ChartStrategy, Settings, StrategyOutcome};
use httpmock::prelude::*;

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.site.base_url = server.base_url();
    settings.http.request_delay_ms = 0;
    settings
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

const FORM_PAGE: &str = r#"
    <html><body>
      <form method="post" action="/chart/new">
        <input name="__RequestVerificationToken" type="hidden" value="tok-abc-123">
        <input name="name"><input name="country"><input name="city">
        <button type="submit">Calculate</button>
      </form>
    </body></html>
"#;

const RESULT_PAGE: &str = r#"
    <html><body>
      <div id="chart-results">
        <ul>
          <li>Type: Generator</li>
          <li>Profile: 1/3</li>
        </ul>
        <div><h3>Design</h3><ul><li>Sun 34.2 ▲</li></ul></div>
        <div><h3>Personality</h3><ul><li>Sun 45.1 ▼</li></ul></div>
        <div class="bodygraph"><img src="/render/chart.png"></div>
        <input type="hidden" name="DownloadToken" value="ZG93bmxvYWQ=">
      </div>
    </body></html>
"#;

#[tokio::test]
async fn full_form_flow_extracts_a_chart() {
    let server = MockServer::start();

    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/chart/new");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(FORM_PAGE);
    });

    let post_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chart/new")
            .body_contains("__RequestVerificationToken=tok-abc-123")
            .body_contains("country=Pakistan")
            .body_contains("timezone=Asia%2FKarachi");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(RESULT_PAGE);
    });

    let strategy = FormClientStrategy::new(&settings_for(&server), TransportProfile::Standard)
        .expect("strategy construction");

    let outcome = strategy.submit(&birth()).await;
    get_mock.assert();
    post_mock.assert();

    let StrategyOutcome::Success(result) = outcome else {
        panic!("expected success");
    };
    assert_eq!(result.properties.get("type").unwrap(), "Generator");
    assert_eq!(result.properties.get("profile").unwrap(), "1/3");
    assert_eq!(result.design_activations, vec!["Sun 34.2 ▲"]);
    assert_eq!(result.personality_activations, vec!["Sun 45.1 ▼"]);
    assert_eq!(
        result.chart_image_url.as_deref(),
        Some(format!("{}/render/chart.png", server.base_url()).as_str())
    );
    assert_eq!(result.download_token.as_deref(), Some("ZG93bmxvYWQ="));
}

#[tokio::test]
async fn submission_proceeds_with_empty_token_when_form_page_has_none() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/chart/new");
        then.status(200).body("<html><body><form></form></body></html>");
    });
    let post_mock = server.mock(|when, then| {
        when.method(POST).path("/chart/new");
        then.status(200).body(RESULT_PAGE);
    });

    let strategy = FormClientStrategy::new(&settings_for(&server), TransportProfile::Standard)
        .expect("strategy construction");

    let outcome = strategy.submit(&birth()).await;
    post_mock.assert();
    assert!(matches!(outcome, StrategyOutcome::Success(_)));
}

#[tokio::test]
async fn failure_page_becomes_a_failure_outcome() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/chart/new");
        then.status(200).body(FORM_PAGE);
    });
    server.mock(|when, then| {
        when.method(POST).path("/chart/new");
        then.status(200)
            .body("<html><body><h1>Something went wrong</h1></body></html>");
    });

    let strategy = FormClientStrategy::new(&settings_for(&server), TransportProfile::Standard)
        .expect("strategy construction");

    let StrategyOutcome::Failure(reason) = strategy.submit(&birth()).await else {
        panic!("expected failure");
    };
    assert!(reason.contains("failure page"));
}

#[tokio::test]
async fn server_error_status_becomes_a_failure_outcome() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/chart/new");
        then.status(200).body(FORM_PAGE);
    });
    server.mock(|when, then| {
        when.method(POST).path("/chart/new");
        then.status(503);
    });

    let strategy = FormClientStrategy::new(&settings_for(&server), TransportProfile::Hardened)
        .expect("strategy construction");

    let StrategyOutcome::Failure(reason) = strategy.submit(&birth()).await else {
        panic!("expected failure");
    };
    // Status errors are transport-level, not extraction failures.
    assert!(reason.contains("transport failure"));
    assert!(reason.contains("503"));
}

#[tokio::test]
async fn hardened_profile_retries_the_post_once() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/chart/new");
        then.status(200).body(FORM_PAGE);
    });
    // Delay beyond the hardened profile's timeout so the first POST dies
    // in transport, then the retry hits the same slow mock and fails too:
    // the outcome is a transport failure after exactly two attempts.
    let post_mock = server.mock(|when, then| {
        when.method(POST).path("/chart/new");
        then.status(200)
            .delay(std::time::Duration::from_secs(20))
            .body(RESULT_PAGE);
    });

    let mut settings = settings_for(&server);
    settings.http.timeout_secs = 2; // hardened halves this to 1s

    let strategy = FormClientStrategy::new(&settings, TransportProfile::Hardened)
        .expect("strategy construction");

    let outcome = strategy.submit(&birth()).await;
    assert!(matches!(outcome, StrategyOutcome::Failure(_)));
    post_mock.assert_hits(2);
}
