use super::action::Action;
use super::document::RawNode;
use crate::answer::{Answers, values_equal};
use crate::error::FlowLoadError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One choice of a selection node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOption {
    pub label: String,
    /// The value submitted when this option is chosen. Defaults to the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_node: Option<String>,
}

impl NodeOption {
    /// The value this option submits.
    pub fn submitted_value(&self) -> Value {
        self.value
            .clone()
            .unwrap_or_else(|| Value::String(self.label.clone()))
    }

    /// Returns `true` if `answer` names this option, by value or by label.
    pub fn is_chosen_by(&self, answer: &Value) -> bool {
        let by_value = self.value.as_ref().is_some_and(|v| values_equal(v, answer));
        let by_label = answer.as_str().is_some_and(|s| s == self.label);
        by_value || by_label
    }
}

/// Overrides the default successor when a multi-select answer contains `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainsRoute {
    pub value: Value,
    pub next_node: String,
}

/// Presents a node only when `answers[key] == value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowIf {
    pub key: String,
    pub value: Value,
}

impl ShowIf {
    /// Checks the condition against a field lookup.
    pub fn is_met<'a>(&self, lookup: impl Fn(&str) -> Option<&'a Value>) -> bool {
        lookup(&self.key).is_some_and(|v| values_equal(v, &self.value))
    }

    /// Checks the condition against a plain answer store.
    pub fn is_met_by(&self, answers: &Answers) -> bool {
        self.is_met(|key| answers.get(key))
    }
}

/// What kind of step a node is. Everything except `Action` is presented to
/// the user.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Text,
    Number,
    YesNo {
        on_yes: Option<String>,
        on_no: Option<String>,
    },
    SingleSelect,
    MultiSelect,
    Dropdown,
    Scale,
    Date,
    MonthYear,
    Year,
    /// A structured answer such as the obstetric-history table.
    Composite,
    LoopStart,
    LoopEnd,
    Action(Action),
}

impl NodeKind {
    /// The canonical `type` name used in flow documents.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Number => "number",
            NodeKind::YesNo { .. } => "yes_no",
            NodeKind::SingleSelect => "single_select",
            NodeKind::MultiSelect => "multi_select",
            NodeKind::Dropdown => "dropdown",
            NodeKind::Scale => "scale",
            NodeKind::Date => "date",
            NodeKind::MonthYear => "month_year",
            NodeKind::Year => "year",
            NodeKind::Composite => "composite",
            NodeKind::LoopStart => "loop_start",
            NodeKind::LoopEnd => "loop_end",
            NodeKind::Action(_) => "action",
        }
    }

    /// Selection types may route per option.
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            NodeKind::SingleSelect | NodeKind::MultiSelect | NodeKind::Dropdown | NodeKind::Scale
        )
    }
}

/// A single step of an intake flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub text: Option<String>,
    pub save_to: Option<String>,
    pub next_node: Option<String>,
    pub options: Vec<NodeOption>,
    pub next_if_contains: Option<ContainsRoute>,
    pub show_if: Option<ShowIf>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub placeholder: Option<String>,
}

impl Node {
    /// Creates a bare node of the given kind.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            text: None,
            save_to: None,
            next_node: None,
            options: Vec::new(),
            next_if_contains: None,
            show_if: None,
            min: None,
            max: None,
            placeholder: None,
        }
    }

    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next_node = Some(next.into());
        self
    }

    pub fn with_save_to(mut self, field: impl Into<String>) -> Self {
        self.save_to = Some(field.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_options(mut self, options: Vec<NodeOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_show_if(mut self, key: impl Into<String>, value: Value) -> Self {
        self.show_if = Some(ShowIf {
            key: key.into(),
            value,
        });
        self
    }

    pub fn with_next_if_contains(mut self, value: Value, next: impl Into<String>) -> Self {
        self.next_if_contains = Some(ContainsRoute {
            value,
            next_node: next.into(),
        });
        self
    }

    /// The action performed by this node, if it is an action node.
    pub fn action(&self) -> Option<&Action> {
        match &self.kind {
            NodeKind::Action(action) => Some(action),
            _ => None,
        }
    }

    /// Action nodes are resolved by the engine and never shown.
    pub fn is_presentable(&self) -> bool {
        self.action().is_none()
    }

    /// Builds a node from its document form, using `id` as its identifier.
    pub fn from_raw(id: &str, raw: RawNode) -> Result<Self, FlowLoadError> {
        let kind = match raw.node_type.as_str() {
            "text" | "textarea" => NodeKind::Text,
            "number" | "numeric" => NodeKind::Number,
            "yes_no" | "yesno" | "boolean" => NodeKind::YesNo {
                on_yes: raw.next_on_yes,
                on_no: raw.next_on_no,
            },
            "single_select" | "select" | "radio" => NodeKind::SingleSelect,
            "multi_select" | "checklist" => NodeKind::MultiSelect,
            "dropdown" => NodeKind::Dropdown,
            "scale" => NodeKind::Scale,
            "date" => NodeKind::Date,
            "month_year" => NodeKind::MonthYear,
            "year" => NodeKind::Year,
            "composite" | "obstetric_table" => NodeKind::Composite,
            "loop_start" => NodeKind::LoopStart,
            "loop_end" => NodeKind::LoopEnd,
            "action" => {
                let handler = raw.handler.ok_or_else(|| FlowLoadError::InvalidActionConfig {
                    node_id: id.to_string(),
                    message: "action node without a 'handler'".to_string(),
                })?;
                NodeKind::Action(Action::from_parts(id, &handler, raw.config)?)
            }
            other => {
                return Err(FlowLoadError::InvalidNodeType {
                    node_id: id.to_string(),
                    type_name: other.to_string(),
                });
            }
        };

        Ok(Self {
            id: id.to_string(),
            kind,
            text: raw.text,
            save_to: raw.save_to,
            next_node: raw.next_node,
            options: raw.options,
            next_if_contains: raw.next_if_contains,
            show_if: raw.show_if,
            min: raw.min,
            max: raw.max,
            placeholder: raw.placeholder,
        })
    }
}

impl TryFrom<RawNode> for Node {
    type Error = FlowLoadError;

    fn try_from(mut raw: RawNode) -> Result<Self, Self::Error> {
        let id = raw.id.take().ok_or(FlowLoadError::MissingNodeId)?;
        Node::from_raw(&id, raw)
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        let type_name = node.kind.type_name().to_string();
        let (next_on_yes, next_on_no, handler, config) = match node.kind {
            NodeKind::YesNo { on_yes, on_no } => (on_yes, on_no, None, None),
            NodeKind::Action(action) => (
                None,
                None,
                Some(action.handler_name().to_string()),
                action.config_value(),
            ),
            _ => (None, None, None, None),
        };

        RawNode {
            id: Some(node.id),
            node_type: type_name,
            text: node.text,
            save_to: node.save_to,
            next_node: node.next_node,
            next_on_yes,
            next_on_no,
            options: node.options,
            next_if_contains: node.next_if_contains,
            show_if: node.show_if,
            min: node.min,
            max: node.max,
            placeholder: node.placeholder,
            handler,
            config,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{} [{}]: {}", self.id, self.kind.type_name(), text),
            None => write!(f, "{} [{}]", self.id, self.kind.type_name()),
        }
    }
}

/// Convenience for option lists in code-built flows.
pub fn option(label: &str, next_node: Option<&str>) -> NodeOption {
    NodeOption {
        label: label.to_string(),
        value: None,
        next_node: next_node.map(str::to_string),
    }
}
