use thiserror::Error;

/// Errors that can occur while loading a flow document into a `FlowDefinition`.
#[derive(Error, Debug, Clone)]
pub enum FlowLoadError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Could not read flow file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Node has no 'id' outside of a flow document")]
    MissingNodeId,

    #[error("Start node '{0}' is not defined in the flow")]
    MissingStartNode(String),

    #[error("Node '{node_id}' has an unknown type: '{type_name}'")]
    InvalidNodeType { node_id: String, type_name: String },

    #[error("Action node '{node_id}' uses an unknown handler: '{handler}'")]
    UnknownHandler { node_id: String, handler: String },

    #[error("Action node '{node_id}' is misconfigured: {message}")]
    InvalidActionConfig { node_id: String, message: String },
}

/// Errors returned to the caller when an engine operation cannot be applied.
///
/// Malformed flows never surface here; those finalize the session instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("The flow has already finished; rewind or reset before answering again")]
    FlowFinished,

    #[error("History index {index} is out of range (history has {len} entries)")]
    HistoryOutOfRange { index: usize, len: usize },

    #[error("Node '{0}' does not exist in the flow")]
    UnknownNode(String),

    #[error("Node '{0}' is an action node and cannot be presented")]
    NotPresentable(String),
}

/// Errors from handing the collected answers to an external submitter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Answers can only be submitted once the flow has finished")]
    NotFinished,

    #[error("Submission was rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur when loading runtime configuration.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Could not read configuration file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse configuration JSON: {0}")]
    JsonParseError(String),
}

/// Errors that can occur when converting a custom user format into a `FlowDefinition`.
#[derive(Error, Debug, Clone)]
pub enum FlowConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Load(#[from] FlowLoadError),
}
