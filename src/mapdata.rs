//! Minimal element model the filter engine reads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of a map element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl ElementKind {
    /// Resolve a kind selector name as written in a filter. Both plural and
    /// singular forms are accepted.
    pub fn from_selector(name: &str) -> Option<Self> {
        match name {
            "node" | "nodes" => Some(ElementKind::Node),
            "way" | "ways" => Some(ElementKind::Way),
            "relation" | "relations" => Some(ElementKind::Relation),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        }
    }
}

/// A map element as supplied by the caller: kind, id and tag set.
///
/// The engine only reads this view; the surrounding application owns the
/// element data and supplies it per evaluation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Element {
    pub fn new(kind: ElementKind, id: i64, tags: HashMap<String, String>) -> Self {
        Element { kind, id, tags }
    }
}

/// Build an owned tag map from borrowed pairs.
pub fn build_tag_map<'a, I>(tags: I) -> HashMap<String, String>
where
    I: Iterator<Item = (&'a str, &'a str)>,
{
    tags.map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_names_resolve() {
        assert_eq!(ElementKind::from_selector("ways"), Some(ElementKind::Way));
        assert_eq!(ElementKind::from_selector("node"), Some(ElementKind::Node));
        assert_eq!(ElementKind::from_selector("areas"), None);
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ElementKind::Node.label(), "node");
        assert_eq!(ElementKind::Way.label(), "way");
        assert_eq!(ElementKind::Relation.label(), "relation");
    }

    #[test]
    fn element_deserializes_from_json_line() {
        let element: Element =
            serde_json::from_str(r#"{"type":"way","id":42,"tags":{"surface":"paved"}}"#).unwrap();
        assert_eq!(element.kind, ElementKind::Way);
        assert_eq!(element.id, 42);
        assert_eq!(element.tags.get("surface").map(String::as_str), Some("paved"));
    }

    #[test]
    fn tags_default_to_empty() {
        let element: Element = serde_json::from_str(r#"{"type":"node"}"#).unwrap();
        assert!(element.tags.is_empty());
        assert_eq!(element.id, 0);
    }
}
