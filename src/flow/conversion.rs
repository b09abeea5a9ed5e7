use super::definition::FlowDefinition;
use crate::error::FlowConversionError;

/// A trait for custom data models that can be converted into a `FlowDefinition`.
///
/// Flows authored in another tool (a spreadsheet export, a CMS, an older
/// questionnaire format) implement this trait to provide a translation layer
/// into the engine's canonical graph.
///
/// # Example
///
/// ```rust,no_run
/// use anamnesis::prelude::*;
/// use anamnesis::error::FlowConversionError;
///
/// // 1. Define your custom structs for parsing your format.
/// struct Question { id: String, prompt: String, field: String, next: Option<String> }
/// struct Questionnaire { questions: Vec<Question> }
///
/// // 2. Implement `IntoFlow` for your top-level struct.
/// impl IntoFlow for Questionnaire {
///     fn into_flow(self) -> std::result::Result<FlowDefinition, FlowConversionError> {
///         let start = self
///             .questions
///             .first()
///             .map(|q| q.id.clone())
///             .ok_or_else(|| FlowConversionError::ValidationError("empty questionnaire".into()))?;
///         let nodes = self.questions.into_iter().map(|q| {
///             let node = Node::new(q.id, NodeKind::Text)
///                 .with_text(q.prompt)
///                 .with_save_to(q.field);
///             match q.next {
///                 Some(next) => node.with_next(next),
///                 None => node,
///             }
///         });
///         Ok(FlowDefinition::new(start, nodes)?)
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into an intake flow.
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError>;
}
