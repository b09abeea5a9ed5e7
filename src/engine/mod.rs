//! The engine controller: applies answers, unwinds action nodes, auto-skips
//! hidden nodes and keeps the history ledger.
use crate::answer::Answers;
use crate::config::{EngineConfig, RuntimeFlags};
use crate::error::EngineError;
use crate::flow::FlowDefinition;
use crate::resolver::Resolver;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod session;
mod state;

pub use session::{AnswerSink, LoopProgress, Presentation, Session};
pub use state::{EngineState, FinishReason, HistoryEntry, LoopState};

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user answered the current node.
    Answer(Value),
    /// Go back to the history entry at this index to change its answer.
    Rewind(usize),
    /// Present a node directly, bypassing resolution and auto-skip.
    JumpTo(String),
    /// Start over with no answers.
    Reset,
}

/// An immutable, shareable interpreter for one flow definition.
///
/// The engine holds no session data; each session's progress lives in an
/// [`EngineState`] that is passed in and out.
#[derive(Debug, Clone)]
pub struct Engine {
    flow: Arc<FlowDefinition>,
    flags: RuntimeFlags,
    config: EngineConfig,
}

pub struct EngineBuilder {
    flow: Arc<FlowDefinition>,
    flags: RuntimeFlags,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new(flow: impl Into<Arc<FlowDefinition>>) -> Self {
        Self {
            flow: flow.into(),
            flags: RuntimeFlags::default(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_flags(mut self, flags: RuntimeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_flag(mut self, name: &str, enabled: bool) -> Self {
        self.flags.set(name, enabled);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_transitions(mut self, max_transitions: usize) -> Self {
        self.config.max_transitions = max_transitions;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            flow: self.flow,
            flags: self.flags,
            config: self.config,
        }
    }
}

impl Engine {
    pub fn builder(flow: impl Into<Arc<FlowDefinition>>) -> EngineBuilder {
        EngineBuilder::new(flow)
    }

    /// An engine with no flags set and the default configuration.
    pub fn new(flow: impl Into<Arc<FlowDefinition>>) -> Self {
        EngineBuilder::new(flow).build()
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    pub fn flags(&self) -> &RuntimeFlags {
        &self.flags
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A fresh session state positioned on the first presentable node.
    pub fn start(&self) -> EngineState {
        self.start_with(Answers::new())
    }

    /// Like [`Engine::start`], with answers already known (e.g. from a prior
    /// record) seeded into the answer store.
    pub fn start_with(&self, answers: Answers) -> EngineState {
        let start = self.flow.start_node.clone();
        let mut state = EngineState::new(start.clone(), answers);
        if let Some(first) = self.settle(&mut state, Some(start)) {
            state.current_node_id = first;
        }
        state
    }

    /// Reducer form of the controller: returns the state that results from
    /// applying `event` to `state`. The input state is left untouched.
    pub fn apply(&self, state: &EngineState, event: Event) -> Result<EngineState, EngineError> {
        let mut next = state.clone();
        match event {
            Event::Answer(answer) => self.advance(&mut next, answer)?,
            Event::Rewind(index) => self.rewind(&mut next, index)?,
            Event::JumpTo(node_id) => self.jump_to(&mut next, &node_id)?,
            Event::Reset => self.reset(&mut next),
        }
        Ok(next)
    }

    /// Records `answer` for the current node and moves to the next
    /// presentable node, or finishes the flow.
    pub fn advance(&self, state: &mut EngineState, answer: Value) -> Result<(), EngineError> {
        if state.finished {
            return Err(EngineError::FlowFinished);
        }

        let Some(node) = self.flow.node(&state.current_node_id) else {
            warn!(node_id = %state.current_node_id, "current node is not part of the flow; finishing");
            let missing = state.current_node_id.clone();
            state.finish(FinishReason::MissingNode(missing));
            return Ok(());
        };

        let loops_before = state.loops.clone();
        if let Some(field) = &node.save_to {
            state.store(field.clone(), answer.clone());
        }

        let transition = Resolver::new(&self.flags).resolve(node, &answer, state);
        state.apply_effects(transition.effects);

        match self.settle(state, transition.next) {
            Some(next_id) => {
                debug!(from = %node.id, to = %next_id, "advanced");
                state.history.push(HistoryEntry {
                    node_id: node.id.clone(),
                    node: node.clone(),
                    answer,
                    loops: loops_before,
                });
                state.current_node_id = next_id;
            }
            None => {
                info!(last_node = %node.id, reason = ?state.finish_reason, "flow finished");
            }
        }
        Ok(())
    }

    /// Re-presents the node at `index` in the history, dropping it and every
    /// later entry. Answers already stored are kept.
    pub fn rewind(&self, state: &mut EngineState, index: usize) -> Result<(), EngineError> {
        let len = state.history.len();
        let Some(entry) = state.history.drain(index.min(len)..).next() else {
            return Err(EngineError::HistoryOutOfRange { index, len });
        };

        debug!(node_id = %entry.node_id, index, "rewound");
        state.current_node_id = entry.node_id;
        state.loops = entry.loops;
        state.finished = false;
        state.finish_reason = None;
        Ok(())
    }

    /// Presents `node_id` directly, without resolution and without checking
    /// its `show_if` condition.
    pub fn jump_to(&self, state: &mut EngineState, node_id: &str) -> Result<(), EngineError> {
        let node = self
            .flow
            .node(node_id)
            .ok_or_else(|| EngineError::UnknownNode(node_id.to_string()))?;
        if !node.is_presentable() {
            return Err(EngineError::NotPresentable(node_id.to_string()));
        }

        debug!(node_id, "jumped");
        state.current_node_id = node_id.to_string();
        state.finished = false;
        state.finish_reason = None;
        Ok(())
    }

    /// Discards all progress and starts the flow again with no answers.
    pub fn reset(&self, state: &mut EngineState) {
        *state = self.start();
    }

    /// Follows `next` through action nodes and auto-skipped nodes until a
    /// presentable node is reached. Returns `None` once the flow finished.
    fn settle(&self, state: &mut EngineState, mut next: Option<String>) -> Option<String> {
        let resolver = Resolver::new(&self.flags);
        let mut transitions = 0usize;

        loop {
            if state.finished {
                return None;
            }
            let Some(node_id) = next else {
                state.finish(FinishReason::EndOfFlow);
                return None;
            };

            transitions += 1;
            if transitions > self.config.max_transitions {
                warn!(
                    node_id = %node_id,
                    limit = self.config.max_transitions,
                    "transition limit reached; finishing flow"
                );
                state.finish(FinishReason::TransitionLimit);
                return None;
            }

            let Some(node) = self.flow.node(&node_id) else {
                warn!(node_id = %node_id, "flow references a node that does not exist; finishing");
                state.finish(FinishReason::MissingNode(node_id));
                return None;
            };

            if let Some(action) = node.action() {
                debug!(node_id = %node.id, handler = action.handler_name(), "running action");
            } else if node
                .show_if
                .as_ref()
                .is_some_and(|cond| !cond.is_met(|key| state.lookup(key)))
            {
                debug!(node_id = %node.id, "condition not met, auto-skipping");
            } else {
                return Some(node_id);
            }

            let transition = resolver.resolve(node, &Value::Null, state);
            state.apply_effects(transition.effects);
            next = transition.next;
        }
    }
}
