//! # Anamnesis - Pre-consultation Intake Flow Engine
//!
//! **Anamnesis** interprets declarative, graph-shaped intake questionnaires. A flow is a
//! set of nodes (questions and invisible action steps) linked by successor ids; the engine
//! decides, answer by answer, which question comes next. It supports yes/no and per-option
//! branching, repeatable blocks (one block per prior pregnancy, say), derived fields such as
//! BMI and the obstetric formula, conditional auto-skip and rewinding to edit a past answer.
//!
//! The engine renders nothing and performs no I/O. It only computes state transitions.
//!
//! ## Core Workflow
//!
//! 1.  **Load a flow**: Parse a JSON flow document with `FlowDefinition::from_json`, or
//!     implement `IntoFlow` to convert your own questionnaire format.
//! 2.  **Build an engine**: `Engine::builder(flow)` with the runtime feature flags the
//!     flow's `feature_branch` actions consult. An engine is immutable and can be shared.
//! 3.  **Run a session**: `Session::new(engine)` positions on the first visible question.
//!     Show `session.presentation()`, feed the reply to `session.advance(..)`, repeat until
//!     `session.is_finished()`.
//! 4.  **Submit**: hand `session.answers()` to your backend, e.g. with `Session::submit`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anamnesis::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let flow = FlowDefinition::from_json(r#"{
//!         "start_node": "pregnant_before",
//!         "nodes": {
//!             "pregnant_before": {
//!                 "type": "yes_no",
//!                 "text": "¿Ha estado embarazada anteriormente?",
//!                 "save_to": "embarazos_previos",
//!                 "next_on_yes": "pregnancies",
//!                 "next_on_no": "weight"
//!             },
//!             "pregnancies": {
//!                 "type": "number",
//!                 "text": "¿Cuántos embarazos?",
//!                 "save_to": "gestas",
//!                 "next_node": "weight"
//!             },
//!             "weight": { "type": "number", "save_to": "peso", "next_node": "height" },
//!             "height": { "type": "number", "save_to": "talla", "next_node": "bmi" },
//!             "bmi": { "type": "action", "handler": "compute_bmi", "next_node": "done" },
//!             "done": { "type": "action", "handler": "finish" }
//!         }
//!     }"#)?;
//!
//!     let mut session = Session::new(Engine::new(flow));
//!     session.advance("No")?;   // skips the pregnancy count
//!     session.advance(60)?;     // kg
//!     session.advance(1.60)?;   // m
//!
//!     assert!(session.is_finished());
//!     println!("{}", TranscriptFormatter::format_answers(session.answers()));
//!     // embarazos_previos: No
//!     // imc: 23.44
//!     // peso: 60
//!     // talla: 1.6
//!     Ok(())
//! }
//! ```

pub mod answer;
pub mod config;
pub mod engine;
pub mod error;
pub mod flow;
pub mod prelude;
pub mod resolver;
pub mod trace;
