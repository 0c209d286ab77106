//! Output formatter trait

use crossdesk_domain::FinalAnswer;

/// Trait for formatting settled answers
pub trait AnswerFormatter {
    /// Format the complete answer with findings and trace
    fn format(&self, answer: &FinalAnswer) -> String;

    /// Format as JSON
    fn format_json(&self, answer: &FinalAnswer) -> String;

    /// Format the answer prose only (concise output)
    fn format_answer_only(&self, answer: &FinalAnswer) -> String;
}
