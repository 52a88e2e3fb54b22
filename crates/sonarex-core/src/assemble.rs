//! Measure assembly: raw flattened measures into typed metrics.

use tracing::warn;

use crate::catalog::MetricCatalog;
use crate::measure::{Fields, flatten};
use crate::model::{MeasureField, Metric};

/// Turns one component's raw measures into typed metrics, in API order.
///
/// A measure without a `metric` pair cannot be attached to catalog metadata;
/// it is dropped with a warning and stays invisible for this refresh cycle.
pub fn assemble(measures: &[Fields], catalog: &MetricCatalog) -> Vec<Metric> {
    let mut out = Vec::with_capacity(measures.len());
    for measure in measures {
        match assemble_one(measure, catalog) {
            Some(metric) => out.push(metric),
            None => warn!(fields = measure.0.len(), "measure without a metric key dropped"),
        }
    }
    out
}

fn assemble_one(measure: &Fields, catalog: &MetricCatalog) -> Option<Metric> {
    let mut key: Option<String> = None;
    let mut values: Vec<MeasureField> = Vec::new();
    let mut has_primary = false;

    for (name, value) in flatten(measure) {
        if name == "metric" {
            // Consumed, not retained as a label. Nested elements may repeat
            // the name; the last occurrence wins.
            key = Some(value);
        } else if name == "value" && !has_primary {
            has_primary = true;
            values.push(MeasureField::PrimaryValue(value));
        } else {
            // Later pairs named "value" (period breakdowns) stay labels, so
            // a metric carries at most one primary value.
            values.push(MeasureField::Label(name, value));
        }
    }

    let key = key?;
    let (description, domain) = match catalog.lookup(&key) {
        Some(entry) => (
            entry.description.to_string(),
            Some(entry.domain.to_string()),
        ),
        // Unknown keys still emit; the key doubles as the help text.
        None => (key.clone(), None),
    };

    Some(Metric {
        key,
        description,
        domain,
        values,
    })
}
