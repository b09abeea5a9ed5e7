use crate::answer::Answers;
use crate::flow::Node;
use crate::resolver::Effect;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The context of one active repeatable block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopState {
    /// Answer field that receives the collected iterations.
    pub target_field: String,
    /// Zero-based index of the iteration being answered.
    pub current_index: usize,
    pub total_iterations: usize,
    pub current_iteration_data: Answers,
    pub collected_iterations: Vec<Answers>,
    pub body_start_node_id: String,
    pub body_end_node_id: Option<String>,
    /// Where the flow continues once the last iteration is closed.
    pub exit_node_id: Option<String>,
}

impl LoopState {
    pub fn new(
        target_field: impl Into<String>,
        total_iterations: usize,
        body_start_node_id: impl Into<String>,
    ) -> Self {
        Self {
            target_field: target_field.into(),
            current_index: 0,
            total_iterations,
            current_iteration_data: Answers::new(),
            collected_iterations: Vec::new(),
            body_start_node_id: body_start_node_id.into(),
            body_end_node_id: None,
            exit_node_id: None,
        }
    }

    /// Returns `true` while answering the final iteration.
    pub fn is_last_iteration(&self) -> bool {
        self.current_index + 1 >= self.total_iterations
    }

    /// Files the current iteration's answers and moves to the next index.
    fn close_iteration(&mut self) {
        let data = std::mem::take(&mut self.current_iteration_data);
        self.collected_iterations.push(data);
        self.current_index += 1;
    }

    /// The collected iterations as a JSON array of objects.
    fn collected_value(&self) -> Value {
        Value::Array(
            self.collected_iterations
                .iter()
                .map(|data| Value::Object(data.clone().into_iter().collect()))
                .collect(),
        )
    }
}

/// One answered step in the history ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub node_id: String,
    pub node: Node,
    pub answer: Value,
    /// The loop stack as it was when this node was presented, restored on rewind.
    #[serde(default)]
    pub loops: Vec<LoopState>,
}

/// Why a session stopped presenting nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// A `finish` action was reached.
    FinishNode,
    /// The last node had no successor.
    EndOfFlow,
    /// A transition pointed at a node id that is not in the flow.
    MissingNode(String),
    /// A single step exceeded the configured transition limit.
    TransitionLimit,
}

/// The complete mutable state of one intake session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub current_node_id: String,
    pub answers: Answers,
    pub history: Vec<HistoryEntry>,
    /// Active loops, innermost last.
    pub loops: Vec<LoopState>,
    pub finished: bool,
    pub finish_reason: Option<FinishReason>,
}

impl EngineState {
    pub fn new(start_node: impl Into<String>, answers: Answers) -> Self {
        Self {
            current_node_id: start_node.into(),
            answers,
            history: Vec::new(),
            loops: Vec::new(),
            finished: false,
            finish_reason: None,
        }
    }

    /// The innermost active loop.
    pub fn active_loop(&self) -> Option<&LoopState> {
        self.loops.last()
    }

    /// Looks up a field, preferring the innermost loop iteration.
    pub fn lookup(&self, field: &str) -> Option<&Value> {
        self.loops
            .iter()
            .rev()
            .find_map(|l| l.current_iteration_data.get(field))
            .or_else(|| self.answers.get(field))
    }

    /// Writes an answer into the active iteration, or the global answers
    /// when no loop is active.
    pub fn store(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match self.loops.last_mut() {
            Some(active) => {
                active.current_iteration_data.insert(field, value);
            }
            None => {
                self.answers.insert(field, value);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn finish(&mut self, reason: FinishReason) {
        self.finished = true;
        self.finish_reason = Some(reason);
    }

    pub(crate) fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.apply_effect(effect);
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Store { field, value } => self.store(field, value),
            Effect::EnterLoop(state) => self.loops.push(state),
            Effect::NextIteration => {
                if let Some(active) = self.loops.last_mut() {
                    active.close_iteration();
                }
            }
            Effect::ExitLoop => {
                if let Some(mut finished) = self.loops.pop() {
                    finished.close_iteration();
                    let collected = finished.collected_value();
                    // Lands in the enclosing iteration when loops are nested.
                    self.store(finished.target_field, collected);
                }
            }
            Effect::Finish => self.finish(FinishReason::FinishNode),
        }
    }
}
