mod common;

use boletin_core::{ErrorKind, OutcomeKind, RunPhase, DATE_UNAVAILABLE};
use boletin_scanner::RunOrchestrator;
use common::{config_for, FixtureLauncher, Navigation, NO_LISTING, THREE_ROWS};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn sink(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/recibir-comunicados"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

fn sink_url(server: &MockServer) -> String {
    format!("{}/webhook/recibir-comunicados", server.uri())
}

async fn posted_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.body_json().expect("json body"))
        .collect()
}

#[tokio::test]
async fn test_structured_listing_is_delivered_in_order() {
    let server = sink(200).await;
    let launcher = FixtureLauncher::with_body(THREE_ROWS);
    let orchestrator =
        RunOrchestrator::from_config(&config_for(&sink_url(&server)), Arc::new(launcher.clone()))
            .expect("valid config");

    let result = orchestrator.run().await;

    assert!(result.success, "run failed: {:?}", result.error_message);
    assert_eq!(result.record_count, 3);
    assert_eq!(result.outcome_kind, Some(OutcomeKind::Structured));
    assert_eq!(result.sink_status, Some(200));
    assert_eq!(launcher.acquired(), 1);
    assert_eq!(launcher.released(), 1);

    let bodies = posted_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["cantidad"], 3);
    assert_eq!(body["source"], "corteconstitucional.gov.co/comunicados");
    assert!(body.get("contenido").is_none());

    let records = body["comunicados"].as_array().expect("records array");
    let titles: Vec<_> = records.iter().map(|r| r["titulo"].as_str().unwrap()).collect();
    assert_eq!(titles, ["Comunicado No. 4", "Comunicado No. 5", "Comunicado No. 6"]);
    assert_eq!(records[0]["publicado"], "7 de febrero de 2024");
    assert_eq!(
        records[0]["documentoUrl"],
        "https://www.corteconstitucional.gov.co/comunicados/No.%204.pdf"
    );
    assert_eq!(records[2]["publicado"], DATE_UNAVAILABLE);
    assert!(records[2]["documentoUrl"].is_null());
}

#[tokio::test]
async fn test_unmatched_page_falls_back_to_full_text() {
    let server = sink(200).await;
    let launcher = FixtureLauncher::with_body(NO_LISTING);
    let orchestrator =
        RunOrchestrator::from_config(&config_for(&sink_url(&server)), Arc::new(launcher.clone()))
            .unwrap();

    let result = orchestrator.run().await;

    assert!(result.success);
    assert_eq!(result.record_count, 0);
    assert_eq!(result.outcome_kind, Some(OutcomeKind::RawText));
    assert_eq!(launcher.released(), 1);

    let bodies = posted_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    let text = bodies[0]["contenido"].as_str().expect("raw text body");
    assert_eq!(text, "Comunicados\nEl listado se encuentra en mantenimiento.");
    assert!(!text.contains("analytics"));
    assert_eq!(result.content_length, Some(text.chars().count()));
    assert!(bodies[0].get("comunicados").is_none());
}

#[tokio::test]
async fn test_navigation_timeout_releases_and_skips_delivery() {
    let server = sink(200).await;
    let launcher = FixtureLauncher::with_body(THREE_ROWS).navigation(Navigation::TimesOut);
    let orchestrator =
        RunOrchestrator::from_config(&config_for(&sink_url(&server)), Arc::new(launcher.clone()))
            .unwrap();

    let result = orchestrator.run().await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::NavigationTimeout));
    assert_eq!(result.failed_phase, Some(RunPhase::Navigating));
    assert_eq!(result.sink_status, None);
    assert_eq!(launcher.released(), 1);
    assert!(posted_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn test_navigation_error_is_distinguished_from_timeout() {
    let server = sink(200).await;
    let launcher = FixtureLauncher::with_body(THREE_ROWS).navigation(Navigation::Fails);
    let orchestrator =
        RunOrchestrator::from_config(&config_for(&sink_url(&server)), Arc::new(launcher.clone()))
            .unwrap();

    let result = orchestrator.run().await;

    assert_eq!(result.error_kind, Some(ErrorKind::Navigation));
    assert!(result
        .error_message
        .as_deref()
        .unwrap_or_default()
        .contains("ERR_NAME_NOT_RESOLVED"));
    assert_eq!(launcher.released(), 1);
}

#[tokio::test]
async fn test_sink_rejection_is_a_delivery_error() {
    let server = sink(503).await;
    let launcher = FixtureLauncher::with_body(THREE_ROWS);
    let orchestrator =
        RunOrchestrator::from_config(&config_for(&sink_url(&server)), Arc::new(launcher.clone()))
            .unwrap();

    let result = orchestrator.run().await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Delivery));
    assert_eq!(result.sink_status, Some(503));
    assert_eq!(result.failed_phase, Some(RunPhase::Delivering));
    assert_eq!(launcher.released(), 1);
    // No retry
    assert_eq!(posted_bodies(&server).await.len(), 1);
}

#[tokio::test]
async fn test_missing_ready_selector_fails_extraction() {
    let server = sink(200).await;
    let launcher = FixtureLauncher::with_body(THREE_ROWS).selector_missing();
    let mut config = config_for(&sink_url(&server));
    config.extraction.wait_for_selector = Some("table.comunicados".to_string());
    config.extraction.selector_timeout_secs = 1;
    let orchestrator = RunOrchestrator::from_config(&config, Arc::new(launcher.clone())).unwrap();

    let result = orchestrator.run().await;

    assert_eq!(result.error_kind, Some(ErrorKind::SelectorTimeout));
    assert_eq!(result.failed_phase, Some(RunPhase::Extracting));
    assert_eq!(launcher.released(), 1);
    assert!(posted_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn test_failure_report_does_not_change_the_result() {
    let server = sink(200).await;
    let launcher = FixtureLauncher::with_body(THREE_ROWS).navigation(Navigation::TimesOut);
    let mut config = config_for(&sink_url(&server));
    config.delivery.report_failures = true;
    let orchestrator = RunOrchestrator::from_config(&config, Arc::new(launcher.clone())).unwrap();

    let result = orchestrator.run().await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::NavigationTimeout));
    assert_eq!(result.sink_status, None);

    let bodies = posted_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["error"], "NavigationTimeoutError");
    assert_eq!(bodies[0]["fase"], "Navigating");
    assert!(bodies[0].get("comunicados").is_none());
}

#[tokio::test]
async fn test_rejected_failure_report_does_not_escalate() {
    let server = sink(503).await;
    let launcher = FixtureLauncher::with_body(THREE_ROWS).navigation(Navigation::TimesOut);
    let mut config = config_for(&sink_url(&server));
    config.delivery.report_failures = true;
    let orchestrator = RunOrchestrator::from_config(&config, Arc::new(launcher.clone())).unwrap();

    let result = orchestrator.run().await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::NavigationTimeout));
    assert_eq!(result.failed_phase, Some(RunPhase::Navigating));
    assert_eq!(result.sink_status, None);
    assert_eq!(launcher.released(), 1);

    let bodies = posted_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["error"], "NavigationTimeoutError");
}

#[tokio::test]
async fn test_each_run_uses_its_own_session() {
    let server = sink(200).await;
    let launcher = FixtureLauncher::with_body(THREE_ROWS);
    let orchestrator = Arc::new(
        RunOrchestrator::from_config(&config_for(&sink_url(&server)), Arc::new(launcher.clone()))
            .unwrap(),
    );

    let first = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.run().await }
    });
    let second = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.run().await }
    });

    assert!(first.await.unwrap().success);
    assert!(second.await.unwrap().success);
    assert_eq!(launcher.acquired(), 2);
    assert_eq!(launcher.released(), 2);
    assert_eq!(posted_bodies(&server).await.len(), 2);
}
