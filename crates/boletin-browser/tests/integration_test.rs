use boletin_browser::{BrowserError, BrowserSession, ChromiumLauncher, SessionLauncher};
use boletin_core::BrowserConfig;
use std::time::Duration;

fn launcher() -> ChromiumLauncher {
    ChromiumLauncher::new(&BrowserConfig::default())
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_session_acquire_and_release() {
    let mut session = launcher().acquire().await.expect("launch browser");
    session.release().await;
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_release_is_idempotent() {
    let mut session = launcher().acquire().await.expect("launch browser");
    session.release().await;
    session.release().await;

    let err = session
        .navigate("https://example.com", Duration::from_secs(5))
        .await
        .expect_err("released session cannot navigate");
    assert!(matches!(err, BrowserError::SessionClosed));
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_navigation_and_snapshot() {
    let mut session = launcher().acquire().await.expect("launch browser");

    let result = session
        .navigate("https://example.com", Duration::from_secs(30))
        .await;
    assert!(result.is_ok(), "Navigation failed: {result:?}");

    let snapshot = session.snapshot().await.expect("capture document");
    assert!(snapshot.body_text.contains("Example Domain"));
    assert!(snapshot.html.contains("<h1>"));

    session.release().await;
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_missing_selector_times_out() {
    let mut session = launcher().acquire().await.expect("launch browser");
    session
        .navigate("https://example.com", Duration::from_secs(30))
        .await
        .expect("navigate");

    let err = session
        .wait_for_selector("table tbody tr", Duration::from_millis(600))
        .await
        .expect_err("example.com has no table");
    assert!(matches!(err, BrowserError::SelectorTimeout { .. }));

    session.release().await;
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_navigation_waits_for_late_requests() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    let page = r#"<html><body><table><tbody id="rows"></tbody></table>
        <script>
          window.addEventListener('load', () => {
            fetch('/rows').then(r => r.text()).then(html => {
              document.getElementById('rows').innerHTML = html;
            });
          });
        </script></body></html>"#;
    Mock::given(method("GET"))
        .and(path("/comunicados"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rows"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<tr><td>1 de abril</td><td>Comunicado 9</td></tr>", "text/html")
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;

    let mut session = launcher().acquire().await.expect("launch browser");
    session
        .navigate(&format!("{}/comunicados", server.uri()), Duration::from_secs(20))
        .await
        .expect("navigate");

    let snapshot = session.snapshot().await.expect("capture document");
    assert!(snapshot.body_text.contains("Comunicado 9"));

    session.release().await;
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_configured_user_agent_is_sent() {
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let config = BrowserConfig::default();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", config.user_agent.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html><body>agente ok</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let mut session = ChromiumLauncher::new(&config)
        .acquire()
        .await
        .expect("launch browser");
    session
        .navigate(&server.uri(), Duration::from_secs(20))
        .await
        .expect("navigate");

    let snapshot = session.snapshot().await.expect("capture document");
    assert!(snapshot.body_text.contains("agente ok"));

    session.release().await;
}
