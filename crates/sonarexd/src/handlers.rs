//! HTTP request handlers: scrape endpoint and health.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use tracing::{info, warn};

use sonarex_core::exposition::{TEXT_FORMAT, encode_text, gauge_families};
use sonarex_core::fetch::fetch_all_projects;

use crate::state::AppState;

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

/// One scrape. Upstream failures never turn into an error response; the
/// worst case is an empty or stale metric set.
pub(crate) async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = render_scrape(&state).await;
    ([(header::CONTENT_TYPE, TEXT_FORMAT)], body)
}

/// Renders the exposition body from the cached snapshot, or from a single
/// direct fetch while no refresh has succeeded yet.
pub(crate) async fn render_scrape(state: &AppState) -> String {
    let snapshot = state.store.read();
    if !snapshot.never_refreshed() {
        return encode_text(&gauge_families(&snapshot.projects));
    }

    // Cache not yet populated: one synchronous fetch, not written back.
    // The refresher stays the store's only writer.
    match fetch_all_projects(&state.client, &state.catalog, &state.filter_tag).await {
        Ok(projects) => {
            info!(
                projects = projects.len(),
                "served scrape from direct fetch; cache not yet populated"
            );
            encode_text(&gauge_families(&projects))
        }
        Err(e) => {
            warn!(error = %e, "direct fetch failed; serving empty metric set");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use sonarex_core::catalog::MetricCatalog;
    use sonarex_core::client::SonarClient;
    use sonarex_core::model::{MeasureField, Metric, Project};
    use sonarex_core::store::SnapshotStore;

    fn app_state(uri: &str) -> AppState {
        AppState {
            store: SnapshotStore::new(),
            client: SonarClient::new(uri, "admin", "secret", Duration::from_secs(1)).unwrap(),
            catalog: MetricCatalog::default_set(),
            filter_tag: "sonarqube-exporter".to_string(),
        }
    }

    fn coverage_project() -> Project {
        Project {
            id: "proj1".to_string(),
            key: "proj1".to_string(),
            name: "Proj One".to_string(),
            metrics: vec![Metric {
                key: "coverage".to_string(),
                description: "Coverage".to_string(),
                domain: Some("Coverage".to_string()),
                values: vec![MeasureField::PrimaryValue("87.5".to_string())],
            }],
        }
    }

    #[tokio::test]
    async fn populated_cache_serves_without_upstream_calls() {
        // Expect zero requests; a cached scrape must not touch the API.
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let state = app_state(&server.uri());
        state.store.replace(vec![coverage_project()]);

        let body = render_scrape(&state).await;
        assert!(body.contains(
            r#"sonar_coverage{id="proj1",key="proj1",name="Proj One"} 87.5"#
        ));
    }

    #[tokio::test]
    async fn empty_cache_triggers_exactly_one_fallback_fetch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/components/search_projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "components": [{"key": "proj1", "name": "Proj One"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/measures/component"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "component": {
                    "key": "proj1",
                    "measures": [{"metric": "coverage", "value": "87.5"}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = app_state(&server.uri());
        let body = render_scrape(&state).await;

        assert!(body.contains("sonar_coverage"));
        // The fallback serves the scrape but does not populate the cache.
        assert!(state.store.read().never_refreshed());
        server.verify().await;
    }

    #[tokio::test]
    async fn fallback_failure_yields_empty_body_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let state = app_state(&server.uri());
        assert_eq!(render_scrape(&state).await, "");
    }
}
