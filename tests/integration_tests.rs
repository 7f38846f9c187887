use async_trait::async_trait;
use httpmock::prelude::*;
use kiva_probe::domain::endpoint::ALL_ENDPOINTS;
use kiva_probe::domain::ports::OutputSink;
use kiva_probe::domain::script::{lender_search_script, newest_loans_script, Step};
use kiva_probe::{ClientSettings, ProbeError, ProbeRunner, Result};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct CapturingSink {
    bodies: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl CapturingSink {
    async fn bodies(&self) -> Vec<(String, serde_json::Value)> {
        self.bodies.lock().await.clone()
    }
}

#[async_trait]
impl OutputSink for CapturingSink {
    async fn emit(&self, label: &str, body: &serde_json::Value) -> Result<()> {
        self.bodies
            .lock()
            .await
            .push((label.to_string(), body.clone()));
        Ok(())
    }
}

fn settings_for(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: server.base_url(),
        retry_attempts: 0,
        retry_delay_ms: 0,
        ..ClientSettings::default()
    }
}

// httpmock serves the first matching mock in creation order, so specific
// query matchers are registered before the catch-all for the same path.

#[tokio::test]
async fn test_newest_loans_script_follows_total_from_unpaginated_call() {
    let server = MockServer::start();

    let page_two = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/loans/newest.json")
            .query_param("page", "2");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"loans": [{"id": 2002}]}));
    });
    let sized_page = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/loans/newest.json")
            .query_param("page", "10")
            .query_param("per_page", "75");
        then.status(200).json_body(json!({"paging": {"total": 3}}));
    });
    let unpaginated = server.mock(|when, then| {
        when.method(GET).path("/v1/loans/newest.json");
        then.status(200).json_body(json!({"paging": {"total": 3}}));
    });

    let sink = CapturingSink::default();
    let runner = ProbeRunner::new(&settings_for(&server), sink.clone()).unwrap();
    let summary = runner.run_script(&newest_loans_script()).await.unwrap();

    sized_page.assert_hits(1);
    unpaginated.assert_hits(1);
    page_two.assert_hits(1);

    assert_eq!(summary.steps_executed, 2);
    assert_eq!(summary.requests_issued, 3);
    assert_eq!(
        sink.bodies().await,
        vec![(
            "/v1/loans/newest?page=2".to_string(),
            json!({"loans": [{"id": 2002}]})
        )]
    );
}

#[tokio::test]
async fn test_lender_search_script_probes_then_prints_pages() {
    let server = MockServer::start();

    let loans = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/loans/newest.json")
            .query_param("page", "10")
            .query_param("per_page", "75");
        then.status(200).json_body(json!({"paging": {"total": 9000}, "loans": []}));
    });
    let lenders = server.mock(|when, then| {
        when.method(GET).path("/v1/lenders/newest.json");
        then.status(200).json_body(json!({"lenders": []}));
    });
    let methods = server.mock(|when, then| {
        when.method(GET).path("/v1/methods.json");
        then.status(200).json_body(json!({"methods": []}));
    });
    let follow_ups: Vec<_> = (2..5)
        .map(|page| {
            let page_str = page.to_string();
            server.mock(|when, then| {
                when.method(GET)
                    .path("/v1/lenders/search.json")
                    .query_param("page", page_str.as_str());
                then.status(200)
                    .json_body(json!({"lenders": [{"uid": format!("lender{}", page)}]}));
            })
        })
        .collect();
    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/lenders/search.json")
            .query_param("q", "shoes");
        then.status(200).json_body(json!({"paging": {"total": 5}, "lenders": []}));
    });

    let sink = CapturingSink::default();
    let runner = ProbeRunner::new(&settings_for(&server), sink.clone()).unwrap();
    let summary = runner.run_script(&lender_search_script()).await.unwrap();

    loans.assert_hits(1);
    lenders.assert_hits(1);
    methods.assert_hits(1);
    search.assert_hits(1);
    for mock in &follow_ups {
        mock.assert_hits(1);
    }

    assert_eq!(summary.requests_issued, 4 + 3);
    assert_eq!(summary.bodies_emitted, 3);

    let bodies = sink.bodies().await;
    let printed: Vec<&str> = bodies
        .iter()
        .map(|(_, body)| body["lenders"][0]["uid"].as_str().unwrap())
        .collect();
    assert_eq!(printed, vec!["lender2", "lender3", "lender4"]);
}

#[tokio::test]
async fn test_total_of_two_issues_no_follow_up_requests() {
    let server = MockServer::start();
    let follow_up = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/loans/newest.json")
            .query_param_exists("page");
        then.status(200).json_body(json!({"paging": {"total": 2}}));
    });
    let unpaginated = server.mock(|when, then| {
        when.method(GET).path("/v1/loans/newest.json");
        then.status(200).json_body(json!({"paging": {"total": 2}}));
    });

    let sink = CapturingSink::default();
    let runner = ProbeRunner::new(&settings_for(&server), sink.clone()).unwrap();
    let summary = runner.run_script(&newest_loans_script()).await.unwrap();

    // the sized first request carries `page=10`, so only it hits the first mock
    follow_up.assert_hits(1);
    unpaginated.assert_hits(1);
    assert_eq!(summary.requests_issued, 2);
    assert!(sink.bodies().await.is_empty());
}

#[tokio::test]
async fn test_missing_paging_total_aborts_with_schema_error() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.method(GET).path("/v1/loans/newest.json");
        then.status(200).json_body(json!({"loans": []}));
    });

    let runner = ProbeRunner::new(&settings_for(&server), CapturingSink::default()).unwrap();
    let err = runner.run_script(&newest_loans_script()).await.unwrap_err();

    match err {
        ProbeError::SchemaError { field, url, .. } => {
            assert_eq!(field, "paging");
            assert!(url.ends_with("/v1/loans/newest.json"));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
    // both script steps ran, no follow-up was attempted
    any.assert_hits(2);
}

#[tokio::test]
async fn test_http_error_stops_the_script() {
    let server = MockServer::start();
    let loans = server.mock(|when, then| {
        when.method(GET).path("/v1/loans/newest.json");
        then.status(404).body("Not Found");
    });
    let lenders = server.mock(|when, then| {
        when.method(GET).path("/v1/lenders/newest.json");
        then.status(200).json_body(json!({}));
    });

    let runner = ProbeRunner::new(&settings_for(&server), CapturingSink::default()).unwrap();
    let err = runner.run_script(&lender_search_script()).await.unwrap_err();

    assert!(matches!(err, ProbeError::HttpStatusError { status: 404, .. }));
    loans.assert_hits(1);
    lenders.assert_hits(0);
}

#[tokio::test]
async fn test_pagination_bound_is_checked_before_requests() {
    let server = MockServer::start();
    let follow_up = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/loans/newest.json")
            .query_param("page", "2");
        then.status(200).json_body(json!({}));
    });
    let other = server.mock(|when, then| {
        when.method(GET).path("/v1/loans/newest.json");
        then.status(200).json_body(json!({"paging": {"total": 100_000}}));
    });

    let settings = ClientSettings {
        max_pages: 10,
        ..settings_for(&server)
    };
    let runner = ProbeRunner::new(&settings, CapturingSink::default()).unwrap();
    let err = runner.run_script(&newest_loans_script()).await.unwrap_err();

    assert!(matches!(
        err,
        ProbeError::PaginationBoundError {
            requested: 99_998,
            limit: 10,
            ..
        }
    ));
    follow_up.assert_hits(0);
    other.assert_hits(2);
}

#[tokio::test]
async fn test_app_id_is_sent_on_every_request() {
    let server = MockServer::start();
    let with_app_id = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/loans/newest.json")
            .query_param("app_id", "com.example.probe");
        then.status(200).json_body(json!({"paging": {"total": 3}}));
    });

    let settings = ClientSettings {
        app_id: Some("com.example.probe".to_string()),
        ..settings_for(&server)
    };
    let runner = ProbeRunner::new(&settings, CapturingSink::default()).unwrap();
    let result = runner.run_script(&newest_loans_script()).await;

    tokio_test::assert_ok!(result);
    with_app_id.assert_hits(3);
}

#[tokio::test]
async fn test_every_endpoint_prints_its_body_unchanged() {
    for endpoint in ALL_ENDPOINTS {
        let server = MockServer::start();
        let path = endpoint.path(&[42]).unwrap();
        let body = json!({
            "endpoint": endpoint.name(),
            "items": [{"id": 1, "nested": {"ok": true}}],
            "paging": {"total": 1, "page": 1, "page_size": 20, "pages": 1}
        });
        let api_mock = server.mock(|when, then| {
            when.method(GET).path(format!("{}.json", path));
            then.status(200).json_body(body.clone());
        });

        let sink = CapturingSink::default();
        let runner = ProbeRunner::new(&settings_for(&server), sink.clone()).unwrap();
        let mut step = Step::new(endpoint).printed();
        step.ids = vec![42];
        let label = step.descriptor().unwrap().to_string();

        let summary = runner.run_step(&step).await.unwrap();

        api_mock.assert();
        assert_eq!(summary.requests_issued, 1, "{}", endpoint);
        assert_eq!(sink.bodies().await, vec![(label, body)], "{}", endpoint);
    }
}
