//! Static metric catalog.

/// Metadata for one known quality metric.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub description: &'static str,
    pub domain: &'static str,
}

/// Mapping from metric key to description and domain.
///
/// Built once at startup and read-only for the lifetime of the process. The
/// catalog also decides which metrics are requested from the quality API.
#[derive(Clone, Debug)]
pub struct MetricCatalog {
    entries: Vec<CatalogEntry>,
}

impl MetricCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The metric set the exporter tracks.
    pub fn default_set() -> Self {
        Self::new(vec![
            CatalogEntry {
                key: "code_smells",
                description: "Code Smells",
                domain: "Maintainability",
            },
            CatalogEntry {
                key: "bugs",
                description: "Bugs",
                domain: "Reliability",
            },
            CatalogEntry {
                key: "vulnerabilities",
                description: "Vulnerabilities",
                domain: "Security",
            },
            CatalogEntry {
                key: "coverage",
                description: "Coverage",
                domain: "Coverage",
            },
            CatalogEntry {
                key: "ncloc",
                description: "Lines of Code",
                domain: "Size",
            },
        ])
    }

    pub fn lookup(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// The comma-joined `metricKeys` request parameter.
    pub fn keys_param(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.key)
            .collect::<Vec<_>>()
            .join(",")
    }
}
