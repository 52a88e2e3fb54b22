//! Ordered measure tree and flattening.
//!
//! The quality API returns each measure as a JSON object whose fields are
//! either scalars or arrays of further objects (period breakdowns and the
//! like). The payload is deserialized into an explicit tree so flattening is
//! total: a scalar stringifies, a list recurses. Field order is preserved
//! through deserialization because the flattened pair order is part of the
//! exporter's contract.

use std::fmt;

use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};

/// A field value in a measure: a stringified scalar or a list of nested
/// field groups.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<Fields>),
}

/// An ordered sequence of named fields, as one JSON object of the measure
/// payload.
///
/// Names are not unique across a flattened tree: two nested elements that
/// both carry a field called `metric` produce two pairs, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields(pub Vec<(String, FieldValue)>);

/// Flattens a field tree depth-first into `(name, value)` pairs.
///
/// A `List` field contributes the flattened pairs of every element in
/// element order, under the element's own field names; the list field's name
/// is not emitted. Nothing is skipped or deduplicated, so callers must treat
/// pair names as non-unique.
pub fn flatten(fields: &Fields) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(fields, &mut out);
    out
}

fn flatten_into(fields: &Fields, out: &mut Vec<(String, String)>) {
    for (name, value) in &fields.0 {
        match value {
            FieldValue::Scalar(s) => out.push((name.clone(), s.clone())),
            FieldValue::List(items) => {
                for item in items {
                    flatten_into(item, out);
                }
            }
        }
    }
}

fn collect_entries<'de, A>(mut map: A) -> Result<Fields, A::Error>
where
    A: MapAccess<'de>,
{
    let mut entries = Vec::new();
    while let Some((name, value)) = map.next_entry::<String, FieldValue>()? {
        entries.push((name, value));
    }
    Ok(Fields(entries))
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of named measure fields")
            }

            fn visit_map<A>(self, map: A) -> Result<Fields, A::Error>
            where
                A: MapAccess<'de>,
            {
                collect_entries(map)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = FieldValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar, an array of objects, or an object")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v))
            }

            // JSON null carries no information for a label; an empty string
            // keeps the pair visible without inventing a value.
            fn visit_unit<E: de::Error>(self) -> Result<FieldValue, E> {
                Ok(FieldValue::Scalar(String::new()))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<FieldValue, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element::<Fields>()? {
                    items.push(item);
                }
                Ok(FieldValue::List(items))
            }

            // A bare nested object is treated as a one-element list, so its
            // fields flatten the same way array elements do.
            fn visit_map<A>(self, map: A) -> Result<FieldValue, A::Error>
            where
                A: MapAccess<'de>,
            {
                Ok(FieldValue::List(vec![collect_entries(map)?]))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
