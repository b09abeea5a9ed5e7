use super::document::FlowDocument;
use super::node::Node;
use crate::error::FlowLoadError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;

/// The complete, immutable graph of an intake flow.
///
/// A flow is a start node id plus a table of nodes keyed by id. It is read
/// from (and written back to) a plain JSON document; see [`FlowDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlowDocument", into = "FlowDocument")]
pub struct FlowDefinition {
    pub start_node: String,
    pub nodes: AHashMap<String, Node>,
}

impl FlowDefinition {
    /// Builds a flow from nodes constructed in code.
    pub fn new(
        start_node: impl Into<String>,
        nodes: impl IntoIterator<Item = Node>,
    ) -> Result<Self, FlowLoadError> {
        let flow = Self {
            start_node: start_node.into(),
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
        };
        flow.check_start_node()?;
        Ok(flow)
    }

    /// Parses a flow document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, FlowLoadError> {
        let document: FlowDocument =
            serde_json::from_str(json).map_err(|e| FlowLoadError::JsonParseError(e.to_string()))?;
        Self::try_from(document)
    }

    /// Loads a flow document from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, FlowLoadError> {
        let content = fs::read_to_string(path).map_err(|e| FlowLoadError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Serializes the flow back into its JSON document form.
    pub fn to_json(&self) -> Result<String, FlowLoadError> {
        serde_json::to_string_pretty(self).map_err(|e| FlowLoadError::JsonParseError(e.to_string()))
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn check_start_node(&self) -> Result<(), FlowLoadError> {
        if self.nodes.contains_key(&self.start_node) {
            Ok(())
        } else {
            Err(FlowLoadError::MissingStartNode(self.start_node.clone()))
        }
    }
}

impl TryFrom<FlowDocument> for FlowDefinition {
    type Error = FlowLoadError;

    fn try_from(document: FlowDocument) -> Result<Self, Self::Error> {
        let nodes = document
            .nodes
            .into_iter()
            .map(|(id, mut raw)| {
                raw.id = None;
                Node::from_raw(&id, raw).map(|node| (id, node))
            })
            .collect::<Result<AHashMap<_, _>, _>>()?;

        let flow = Self {
            start_node: document.start_node,
            nodes,
        };
        flow.check_start_node()?;
        Ok(flow)
    }
}

impl From<FlowDefinition> for FlowDocument {
    fn from(flow: FlowDefinition) -> Self {
        let nodes = flow
            .nodes
            .into_iter()
            .map(|(id, node)| {
                let mut raw: super::document::RawNode = node.into();
                raw.id = None;
                (id, raw)
            })
            .collect();
        FlowDocument {
            start_node: flow.start_node,
            nodes,
        }
    }
}
