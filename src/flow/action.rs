use crate::error::FlowLoadError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of built-in effects an action node can perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No effect; continues to `next_node`. Also used for summary screens.
    PassThrough,
    /// Chooses a target from a runtime feature flag.
    FeatureBranch(FeatureBranch),
    /// Chooses a target from previously given answers.
    AnswerBranch(AnswerBranch),
    /// Stores `mass / height²` rounded to two decimals.
    ComputeBmi(BmiConfig),
    /// Stores the Roman-numeral obstetric formula (e.g. `IIG IP IC`).
    ObstetricFormula(ObstetricConfig),
    /// Opens a repeatable block.
    PrepareLoop(LoopConfig),
    /// Closes the current iteration of the active loop.
    LoopStep,
    /// Ends the flow.
    Finish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureBranch {
    pub flag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_enabled: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_disabled: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerBranch {
    #[serde(default)]
    pub rules: Vec<BranchRule>,
}

/// One routing rule of an answer branch. The first matching rule wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRule {
    pub field: String,
    pub contains_any: Vec<Value>,
    /// Only match while this field has not been answered yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unless_answered: Option<String>,
    pub next_node: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiConfig {
    #[serde(default = "BmiConfig::default_mass")]
    pub mass_field: String,
    #[serde(default = "BmiConfig::default_height")]
    pub height_field: String,
    #[serde(default = "BmiConfig::default_target")]
    pub target: String,
}

impl BmiConfig {
    fn default_mass() -> String {
        "peso".to_string()
    }
    fn default_height() -> String {
        "talla".to_string()
    }
    fn default_target() -> String {
        "imc".to_string()
    }
}

impl Default for BmiConfig {
    fn default() -> Self {
        Self {
            mass_field: Self::default_mass(),
            height_field: Self::default_height(),
            target: Self::default_target(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstetricConfig {
    /// Read the counters from the object stored under this field (e.g. a
    /// composite obstetric-history answer) instead of from top-level answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default = "ObstetricConfig::default_gestations")]
    pub gestations: String,
    #[serde(default = "ObstetricConfig::default_births")]
    pub births: String,
    #[serde(default = "ObstetricConfig::default_cesareans")]
    pub cesareans: String,
    #[serde(default = "ObstetricConfig::default_abortions")]
    pub abortions: String,
    #[serde(default = "ObstetricConfig::default_target")]
    pub target: String,
}

impl ObstetricConfig {
    fn default_gestations() -> String {
        "gestas".to_string()
    }
    fn default_births() -> String {
        "partos".to_string()
    }
    fn default_cesareans() -> String {
        "cesareas".to_string()
    }
    fn default_abortions() -> String {
        "abortos".to_string()
    }
    fn default_target() -> String {
        "formula_obstetrica".to_string()
    }
}

impl Default for ObstetricConfig {
    fn default() -> Self {
        Self {
            source: None,
            gestations: Self::default_gestations(),
            births: Self::default_births(),
            cesareans: Self::default_cesareans(),
            abortions: Self::default_abortions(),
            target: Self::default_target(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    pub target_field: String,
    /// Answer field holding the iteration count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_field: Option<String>,
    /// Fixed iteration count, used when `count_field` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<Value>,
    pub body_start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_end: Option<String>,
}

impl Action {
    /// Builds an action from its handler name and raw configuration object.
    pub fn from_parts(
        node_id: &str,
        handler: &str,
        config: Option<Value>,
    ) -> Result<Self, FlowLoadError> {
        let action = match handler {
            "pass_through" | "summary" => Action::PassThrough,
            "feature_branch" => Action::FeatureBranch(parse_config(node_id, config)?),
            "answer_branch" => Action::AnswerBranch(parse_config(node_id, config)?),
            "compute_bmi" => Action::ComputeBmi(parse_config_or_default(node_id, config)?),
            "obstetric_formula" => {
                Action::ObstetricFormula(parse_config_or_default(node_id, config)?)
            }
            "prepare_loop" => Action::PrepareLoop(parse_config(node_id, config)?),
            "loop_step" => Action::LoopStep,
            "finish" => Action::Finish,
            other => {
                return Err(FlowLoadError::UnknownHandler {
                    node_id: node_id.to_string(),
                    handler: other.to_string(),
                });
            }
        };
        Ok(action)
    }

    /// The canonical handler name written back to flow documents.
    pub fn handler_name(&self) -> &'static str {
        match self {
            Action::PassThrough => "pass_through",
            Action::FeatureBranch(_) => "feature_branch",
            Action::AnswerBranch(_) => "answer_branch",
            Action::ComputeBmi(_) => "compute_bmi",
            Action::ObstetricFormula(_) => "obstetric_formula",
            Action::PrepareLoop(_) => "prepare_loop",
            Action::LoopStep => "loop_step",
            Action::Finish => "finish",
        }
    }

    /// The handler configuration as plain JSON, if the handler takes any.
    pub fn config_value(&self) -> Option<Value> {
        let value = match self {
            Action::FeatureBranch(c) => serde_json::to_value(c),
            Action::AnswerBranch(c) => serde_json::to_value(c),
            Action::ComputeBmi(c) => serde_json::to_value(c),
            Action::ObstetricFormula(c) => serde_json::to_value(c),
            Action::PrepareLoop(c) => serde_json::to_value(c),
            Action::PassThrough | Action::LoopStep | Action::Finish => return None,
        };
        value.ok()
    }
}

fn parse_config<T: DeserializeOwned>(
    node_id: &str,
    config: Option<Value>,
) -> Result<T, FlowLoadError> {
    let config = config.ok_or_else(|| FlowLoadError::InvalidActionConfig {
        node_id: node_id.to_string(),
        message: "missing 'config' object".to_string(),
    })?;
    serde_json::from_value(config).map_err(|e| FlowLoadError::InvalidActionConfig {
        node_id: node_id.to_string(),
        message: e.to_string(),
    })
}

fn parse_config_or_default<T: DeserializeOwned + Default>(
    node_id: &str,
    config: Option<Value>,
) -> Result<T, FlowLoadError> {
    match config {
        Some(_) => parse_config(node_id, config),
        None => Ok(T::default()),
    }
}
