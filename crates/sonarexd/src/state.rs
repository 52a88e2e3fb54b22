//! Shared application state.

use sonarex_core::catalog::MetricCatalog;
use sonarex_core::client::SonarClient;
use sonarex_core::store::SnapshotStore;

/// State shared between the refresh loop and the scrape handlers. Built once
/// at startup; only the store's contents change afterwards.
pub(crate) struct AppState {
    pub(crate) store: SnapshotStore,
    pub(crate) client: SonarClient,
    pub(crate) catalog: MetricCatalog,
    pub(crate) filter_tag: String,
}
