//! End-to-end: mocked quality API through fetch, assembly and exposition.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sonarex_core::catalog::MetricCatalog;
use sonarex_core::client::SonarClient;
use sonarex_core::exposition::{encode_text, gauge_families};
use sonarex_core::fetch::fetch_all_projects;
use sonarex_core::store::SnapshotStore;

async fn mock_quality_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/components/search_projects"))
        .and(query_param("filter", "tags=sonarqube-exporter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "components": [{"key": "proj1", "name": "Proj One"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/measures/component"))
        .and(query_param("component", "proj1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "component": {
                "key": "proj1",
                "measures": [
                    {"metric": "coverage", "value": "87.5"},
                    {"metric": "bugs", "value": "3", "bestValue": true}
                ]
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetched_projects_expose_expected_gauges() {
    let server = MockServer::start().await;
    mock_quality_api(&server).await;

    let client =
        SonarClient::new(server.uri(), "admin", "secret", Duration::from_secs(2)).unwrap();
    let catalog = MetricCatalog::default_set();

    let projects = fetch_all_projects(&client, &catalog, "sonarqube-exporter")
        .await
        .expect("fetch succeeds");

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, "proj1");
    assert_eq!(projects[0].key, "proj1");
    assert_eq!(projects[0].name, "Proj One");
    assert_eq!(projects[0].metrics.len(), 2);

    let body = encode_text(&gauge_families(&projects));
    assert!(
        body.contains(r#"sonar_coverage{id="proj1",key="proj1",name="Proj One"} 87.5"#),
        "unexpected exposition body: {body}"
    );
    assert!(
        body.contains(r#"sonar_bugs{id="proj1",key="proj1",name="Proj One",bestValue="true"} 3"#),
        "unexpected exposition body: {body}"
    );
}

#[tokio::test]
async fn refresh_cycle_through_store_serves_one_consistent_snapshot() {
    let server = MockServer::start().await;
    mock_quality_api(&server).await;

    let client =
        SonarClient::new(server.uri(), "admin", "secret", Duration::from_secs(2)).unwrap();
    let catalog = MetricCatalog::default_set();
    let store = SnapshotStore::new();
    assert!(store.read().never_refreshed());

    let projects = fetch_all_projects(&client, &catalog, "sonarqube-exporter")
        .await
        .expect("fetch succeeds");
    let generation = store.replace(projects);

    let snapshot = store.read();
    assert_eq!(snapshot.generation, generation);
    assert!(!snapshot.never_refreshed());
    assert_eq!(snapshot.projects[0].key, "proj1");
}

#[tokio::test]
async fn measure_fetch_failure_aborts_the_whole_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/components/search_projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "components": [{"key": "proj1", "name": "Proj One"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/measures/component"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client =
        SonarClient::new(server.uri(), "admin", "secret", Duration::from_secs(2)).unwrap();
    let catalog = MetricCatalog::default_set();

    let result = fetch_all_projects(&client, &catalog, "sonarqube-exporter").await;
    assert!(result.is_err());
}
