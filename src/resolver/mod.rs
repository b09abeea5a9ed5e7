//! Computes the next node from the current node, its answer and the
//! accumulated session state.
//!
//! The resolver never mutates anything. Action nodes describe their side
//! effects as a list of [`Effect`]s which the engine applies afterwards.
use crate::answer::{array_contains, is_affirmative};
use crate::config::RuntimeFlags;
use crate::engine::{EngineState, LoopState};
use crate::flow::{Node, NodeKind};
use serde_json::Value;

mod actions;
pub mod derived;

/// A state change requested by an action node.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Write an answer (into the active loop iteration if there is one).
    Store { field: String, value: Value },
    /// Push a new loop onto the loop stack.
    EnterLoop(LoopState),
    /// File the current iteration and start the next one.
    NextIteration,
    /// File the last iteration, pop the loop and store its collected records.
    ExitLoop,
    /// Mark the session as finished.
    Finish,
}

/// The outcome of resolving one node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transition {
    /// `None` ends the flow.
    pub next: Option<String>,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn to(next: Option<String>) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Resolves transitions against a fixed set of runtime flags.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    flags: &'a RuntimeFlags,
}

impl<'a> Resolver<'a> {
    pub fn new(flags: &'a RuntimeFlags) -> Self {
        Self { flags }
    }

    /// Computes where the flow goes after `node` was answered with `answer`.
    pub fn resolve(&self, node: &Node, answer: &Value, state: &EngineState) -> Transition {
        match node.action() {
            Some(action) => actions::execute(action, node, state, self.flags),
            None => Transition::to(next_for_answer(node, answer)),
        }
    }
}

/// Successor of a presentable node, in priority order:
/// contained multi-select value, yes/no route, per-option route, default.
pub fn next_for_answer(node: &Node, answer: &Value) -> Option<String> {
    if let Some(route) = &node.next_if_contains {
        if array_contains(answer, &route.value) {
            return Some(route.next_node.clone());
        }
    }

    if let NodeKind::YesNo { on_yes, on_no } = &node.kind {
        let route = if is_affirmative(answer) { on_yes } else { on_no };
        if let Some(target) = route {
            return Some(target.clone());
        }
    }

    if node.kind.is_selection() {
        if let Some(target) = option_route(node, answer) {
            return Some(target);
        }
    }

    node.next_node.clone()
}

/// The target of the chosen option. For array answers the first option, in
/// declaration order, that was picked and has a target wins.
fn option_route(node: &Node, answer: &Value) -> Option<String> {
    match answer {
        Value::Array(items) => node
            .options
            .iter()
            .filter(|opt| items.iter().any(|item| opt.is_chosen_by(item)))
            .find_map(|opt| opt.next_node.clone()),
        _ => node
            .options
            .iter()
            .find(|opt| opt.is_chosen_by(answer))
            .and_then(|opt| opt.next_node.clone()),
    }
}
