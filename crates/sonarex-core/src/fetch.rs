//! Full fetch + assemble composition: one refresh cycle's worth of data.

use tracing::debug;

use crate::assemble::assemble;
use crate::catalog::MetricCatalog;
use crate::client::{ClientError, SonarClient};
use crate::model::Project;

/// Fetches every tagged project with its assembled metrics.
///
/// Any client error aborts the whole cycle; the caller decides whether that
/// leaves a stale cache (refresher) or an empty scrape (collector fallback).
pub async fn fetch_all_projects(
    client: &SonarClient,
    catalog: &MetricCatalog,
    filter_tag: &str,
) -> Result<Vec<Project>, ClientError> {
    let refs = client.search_projects(filter_tag).await?;
    let metric_keys = catalog.keys_param();

    let mut projects = Vec::with_capacity(refs.len());
    for r in refs {
        let component = client.component_measures(&r.key, &metric_keys).await?;
        let metrics = assemble(&component.measures, catalog);
        debug!(project = %r.key, metrics = metrics.len(), "project measures assembled");
        projects.push(Project {
            id: r.key.clone(),
            key: r.key,
            name: r.name,
            metrics,
        });
    }
    Ok(projects)
}
