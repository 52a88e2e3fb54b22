//! Gauge emission: assembled projects into Prometheus gauge families.
//!
//! One family per metric key, named `sonar_<key>`, grouping one sample per
//! project. Sample labels are the project identity (`id`, `key`, `name`)
//! plus every measure-derived label pair; label names coming out of the
//! flattener are not deduplicated against the identity set.

use std::collections::HashMap;

use prometheus::proto::{Gauge, LabelPair, Metric as Sample, MetricFamily, MetricType};
use prometheus::{Encoder, TextEncoder};
use tracing::warn;

pub use prometheus::TEXT_FORMAT;

use crate::model::{MeasureField, Project};

/// Builds one gauge family per metric key, in first-encounter order across
/// the given projects.
///
/// A metric without a primary value samples as NaN, the exposition format's
/// explicit "no value" marker. A primary value that does not parse as a
/// number also samples as NaN.
pub fn gauge_families(projects: &[Project]) -> Vec<MetricFamily> {
    let mut order: Vec<String> = Vec::new();
    let mut families: HashMap<String, MetricFamily> = HashMap::new();

    for project in projects {
        for metric in &project.metrics {
            let name = format!("sonar_{}", metric.key);
            let family = families.entry(name.clone()).or_insert_with(|| {
                order.push(name.clone());
                let mut f = MetricFamily::default();
                f.set_name(name);
                f.set_help(metric.description.clone());
                f.set_field_type(MetricType::GAUGE);
                f
            });

            let mut labels = vec![
                label_pair("id", &project.id),
                label_pair("key", &project.key),
                label_pair("name", &project.name),
            ];
            let mut value = f64::NAN;
            for field in &metric.values {
                match field {
                    MeasureField::PrimaryValue(raw) => match raw.parse::<f64>() {
                        Ok(v) => value = v,
                        Err(_) => warn!(
                            metric = %metric.key,
                            raw = %raw,
                            "primary value is not numeric; sampling NaN"
                        ),
                    },
                    MeasureField::Label(name, val) => labels.push(label_pair(name, val)),
                }
            }

            let mut gauge = Gauge::default();
            gauge.set_value(value);
            let mut sample = Sample::default();
            sample.set_label(labels.into());
            sample.set_gauge(gauge);
            family.mut_metric().push(sample);
        }
    }

    order
        .into_iter()
        .filter_map(|name| families.remove(&name))
        .collect()
}

fn label_pair(name: &str, value: &str) -> LabelPair {
    let mut pair = LabelPair::default();
    pair.set_name(name.to_string());
    pair.set_value(value.to_string());
    pair
}

/// Encodes families in the Prometheus text exposition format.
///
/// Encoding a well-formed family set cannot realistically fail; if it does,
/// the scrape degrades to whatever was written so far rather than erroring.
pub fn encode_text(families: &[MetricFamily]) -> String {
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(families, &mut buf) {
        warn!(error = %e, "failed to encode metric families");
    }
    String::from_utf8(buf).unwrap_or_default()
}
