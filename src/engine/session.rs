use super::{Engine, EngineState, HistoryEntry, LoopState};
use crate::answer::Answers;
use crate::error::{EngineError, SubmissionError};
use crate::flow::Node;
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Receives the accumulated answers after every accepted answer, so callers
/// can keep a best-effort draft (local storage, an offline queue, ...).
pub trait AnswerSink: Send {
    fn persist(&mut self, answers: &Answers);
}

impl<F> AnswerSink for F
where
    F: FnMut(&Answers) + Send,
{
    fn persist(&mut self, answers: &Answers) {
        self(answers)
    }
}

/// Where the user is inside the active loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopProgress {
    pub target_field: String,
    /// One-based iteration number, for display.
    pub iteration: usize,
    pub total: usize,
}

impl From<&LoopState> for LoopProgress {
    fn from(state: &LoopState) -> Self {
        Self {
            target_field: state.target_field.clone(),
            iteration: state.current_index + 1,
            total: state.total_iterations,
        }
    }
}

/// What a renderer needs to draw the current step.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation<'a> {
    pub node_id: &'a str,
    pub node: &'a Node,
    pub loop_progress: Option<LoopProgress>,
}

/// A single user's pass through a flow: an [`Engine`] plus the state it drives.
///
/// All operations take `&mut self`, so one session is only ever advanced by
/// one caller at a time.
pub struct Session {
    engine: Engine,
    state: EngineState,
    sink: Option<Box<dyn AnswerSink>>,
}

impl Session {
    pub fn new(engine: Engine) -> Self {
        let state = engine.start();
        Self::resume(engine, state)
    }

    /// Starts a session with some answers already known.
    pub fn with_answers(engine: Engine, answers: Answers) -> Self {
        let state = engine.start_with(answers);
        Self::resume(engine, state)
    }

    /// Continues a session from a previously saved state.
    pub fn resume(engine: Engine, state: EngineState) -> Self {
        Self {
            engine,
            state,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: impl AnswerSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn advance(&mut self, answer: impl Into<Value>) -> Result<(), EngineError> {
        self.engine.advance(&mut self.state, answer.into())?;
        if let Some(sink) = self.sink.as_mut() {
            sink.persist(&self.state.answers);
        }
        Ok(())
    }

    pub fn rewind(&mut self, index: usize) -> Result<(), EngineError> {
        self.engine.rewind(&mut self.state, index)
    }

    pub fn jump_to(&mut self, node_id: &str) -> Result<(), EngineError> {
        self.engine.jump_to(&mut self.state, node_id)
    }

    pub fn reset(&mut self) {
        self.engine.reset(&mut self.state);
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn into_state(self) -> EngineState {
        self.state
    }

    pub fn answers(&self) -> &Answers {
        &self.state.answers
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    pub fn active_loop(&self) -> Option<&LoopState> {
        self.state.active_loop()
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// The id of the node awaiting an answer; `None` once finished.
    pub fn current_node_id(&self) -> Option<&str> {
        (!self.state.finished).then_some(self.state.current_node_id.as_str())
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.current_node_id()
            .and_then(|id| self.engine.flow().node(id))
    }

    /// The renderer payload for the current node.
    pub fn presentation(&self) -> Option<Presentation<'_>> {
        let node = self.current_node()?;
        Some(Presentation {
            node_id: node.id.as_str(),
            node,
            loop_progress: self.state.active_loop().map(LoopProgress::from),
        })
    }

    /// Hands the collected answers to an external submitter.
    ///
    /// Only allowed once the flow finished. The session stays finished
    /// whatever the outcome, so a failed submission can simply be retried.
    pub async fn submit<F, Fut, T, E>(&self, submit: F) -> Result<T, SubmissionError>
    where
        F: FnOnce(Answers) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        if !self.state.finished {
            return Err(SubmissionError::NotFinished);
        }
        submit(self.state.answers.clone())
            .await
            .map_err(|e| SubmissionError::Rejected(e.to_string()))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
