//! The plain JSON shape of a flow document.
//!
//! These structs mirror the on-disk format one-to-one and carry no behavior;
//! `FlowDefinition` and `Node` convert to and from them.
use super::node::{ContainsRoute, NodeOption, ShowIf};
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize, Serializer};

/// A complete flow document: `{ "start_node": ..., "nodes": { id: node } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowDocument {
    pub start_node: String,
    /// Written in key order so the same flow always serializes the same way.
    #[serde(serialize_with = "serialize_sorted")]
    pub nodes: AHashMap<String, RawNode>,
}

fn serialize_sorted<S: Serializer>(
    nodes: &AHashMap<String, RawNode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(nodes.iter().sorted_by(|(a, _), (b, _)| a.cmp(b)))
}

/// A single node exactly as it appears in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNode {
    /// Only present when a node is serialized outside of its flow (e.g. in a
    /// history snapshot); inside a document the map key is the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_on_yes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_on_no: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<NodeOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_if_contains: Option<ContainsRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_if: Option<ShowIf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}
