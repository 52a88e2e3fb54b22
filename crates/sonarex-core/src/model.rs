//! Assembled data model: projects, metrics, snapshots.

/// One flattened measure field, tagged by role.
///
/// The assembler tags the metric's primary value explicitly instead of
/// leaving emission to match on the pair name.
#[derive(Clone, Debug, PartialEq)]
pub enum MeasureField {
    /// The numeric sample of the emitted gauge, still in its raw string form.
    PrimaryValue(String),
    /// An extra label on the emitted gauge sample.
    Label(String, String),
}

/// One quality dimension (coverage, bugs, ...) for one project.
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    pub key: String,
    pub description: String,
    pub domain: Option<String>,
    /// Flattened measure fields in encounter order. At most one entry is a
    /// `PrimaryValue`; with none, the metric's numeric value is undefined.
    pub values: Vec<MeasureField>,
}

impl Metric {
    /// The raw primary value, if the measure carried one.
    pub fn primary_value(&self) -> Option<&str> {
        self.values.iter().find_map(|f| match f {
            MeasureField::PrimaryValue(v) => Some(v.as_str()),
            MeasureField::Label(..) => None,
        })
    }

    /// Label pairs in encounter order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().filter_map(|f| match f {
            MeasureField::Label(name, value) => Some((name.as_str(), value.as_str())),
            MeasureField::PrimaryValue(_) => None,
        })
    }
}

/// A project with its assembled metrics.
///
/// Identity is `key`; the search endpoint returns no separate id, so `id`
/// mirrors `key`. A project is superseded as a whole on the next refresh,
/// never mutated in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: String,
    pub metrics: Vec<Metric>,
}

/// An immutable, fully-assembled view of all projects at one refresh
/// generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Monotonically increasing refresh counter; 0 only for the placeholder
    /// installed before the first successful refresh.
    pub generation: u64,
    /// Unix timestamp (seconds) when the snapshot was assembled.
    pub taken_at: i64,
    pub projects: Vec<Project>,
}

impl Snapshot {
    /// The placeholder snapshot a store holds before any refresh succeeded.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            taken_at: 0,
            projects: Vec::new(),
        }
    }

    /// True until the first successful refresh. A successful refresh that
    /// found zero projects still advances the generation, so this is not the
    /// same as `projects.is_empty()`.
    pub fn never_refreshed(&self) -> bool {
        self.generation == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_value_and_labels_split_by_tag() {
        let metric = Metric {
            key: "coverage".to_string(),
            description: "Coverage".to_string(),
            domain: Some("Coverage".to_string()),
            values: vec![
                MeasureField::PrimaryValue("87.5".to_string()),
                MeasureField::Label("bestValue".to_string(), "false".to_string()),
            ],
        };
        assert_eq!(metric.primary_value(), Some("87.5"));
        let labels: Vec<_> = metric.labels().collect();
        assert_eq!(labels, vec![("bestValue", "false")]);
    }

    #[test]
    fn empty_snapshot_is_never_refreshed() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.never_refreshed());
        assert!(snapshot.projects.is_empty());
    }
}
