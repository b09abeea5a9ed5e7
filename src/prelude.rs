//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the anamnesis crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use anamnesis::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let flow = FlowDefinition::from_file("path/to/flow.json")?;
//! let flags = RuntimeFlags::from_file("path/to/flags.json")?;
//! let engine = Engine::builder(flow).with_flags(flags).build();
//!
//! let mut session = Session::new(engine);
//! while let Some(step) = session.presentation() {
//!     println!("{}", step.node);
//!     session.advance("Sí")?;
//! }
//! println!("{}", TranscriptFormatter::format_answers(session.answers()));
//! # Ok(())
//! # }
//! ```

// Flow definition
pub use crate::flow::{
    Action, FlowDefinition, IntoFlow, Node, NodeKind, NodeOption, ShowIf, option,
};

// Engine and session state
pub use crate::engine::{
    AnswerSink, Engine, EngineBuilder, EngineState, Event, FinishReason, HistoryEntry,
    LoopProgress, LoopState, Presentation, Session,
};

// Resolution
pub use crate::resolver::{Effect, Resolver, Transition};

// Answers and configuration
pub use crate::answer::Answers;
pub use crate::config::{EngineConfig, RuntimeFlags};

// Error types
pub use crate::error::{ConfigError, EngineError, FlowLoadError, SubmissionError};

// Transcript formatting
pub use crate::trace::TranscriptFormatter;

// JSON values are the currency of answers
pub use serde_json::{Value, json};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
