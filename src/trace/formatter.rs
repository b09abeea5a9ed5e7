use crate::answer::{Answers, format_value};
use crate::engine::HistoryEntry;
use itertools::Itertools;

/// Formats a session's history and answers into human-readable text.
pub struct TranscriptFormatter;

impl TranscriptFormatter {
    /// One line per answered step, numbered by history index so the output
    /// can be used to pick a rewind target.
    pub fn format_history(history: &[HistoryEntry]) -> String {
        history
            .iter()
            .enumerate()
            .map(|(index, entry)| Self::format_entry(index, entry))
            .join("\n")
    }

    /// All answers as `field: value` lines, sorted by field name.
    pub fn format_answers(answers: &Answers) -> String {
        answers
            .iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(field, value)| format!("{}: {}", field, format_value(value)))
            .join("\n")
    }

    fn format_entry(index: usize, entry: &HistoryEntry) -> String {
        let prompt = entry.node.text.as_deref().unwrap_or(&entry.node_id);
        let mut line = format!("{:>3}. ", index);

        // Innermost loop only; nesting depth is rarely more than one.
        if let Some(active) = entry.loops.last() {
            line.push_str(&format!(
                "[{} {}/{}] ",
                active.target_field,
                active.current_index + 1,
                active.total_iterations
            ));
        }

        line.push_str(&format!("{} -> {}", prompt, format_value(&entry.answer)));
        line
    }
}
