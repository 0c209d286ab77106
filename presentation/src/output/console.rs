//! Console output formatter for settled answers

use crate::output::formatter::AnswerFormatter;
use colored::Colorize;
use crossdesk_domain::{FactSection, FinalAnswer, MissingFieldRequest, SessionId, StepStatus};
use serde_json::json;

/// Formats final answers for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete answer with per-desk findings and the trace
    pub fn format(answer: &FinalAnswer) -> String {
        let mut output = String::new();

        // Header
        output.push_str(&Self::header("Customer Support Answer"));
        output.push('\n');

        // How the run settled and who wrote the prose
        let wording = if answer.phrased_by_model {
            "phrased by the model"
        } else {
            "template wording"
        };
        let status = if answer.is_failure() {
            format!("{} ({})", "ended early".red(), wording)
        } else {
            format!("{} ({})", "settled".green(), wording)
        };
        output.push_str(&format!("{} {}\n\n", "Run:".cyan().bold(), status));

        // The customer-facing prose
        output.push_str(&format!("{}\n{}\n", "Answer:".cyan().bold(), answer.text));

        // What each desk reported
        if !answer.facts.is_empty() {
            output.push_str(&Self::section_header("Desk Findings"));
            for section in &answer.facts.sections {
                output.push_str(&Self::format_section(section));
            }
        }

        // How the plan actually ran
        if !answer.trace.is_empty() {
            output.push_str(&Self::section_header("Execution Trace"));
            for (position, step) in answer.trace.iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {} {} {} {}ms\n",
                    position + 1,
                    step.role,
                    step.operation.as_str().dimmed(),
                    Self::status_label(step.status),
                    step.elapsed_ms
                ));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(answer: &FinalAnswer) -> String {
        serde_json::to_string_pretty(answer).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the answer prose only (concise output)
    pub fn format_answer_only(answer: &FinalAnswer) -> String {
        let mut output = String::new();
        output.push_str(&answer.text);
        output.push('\n');
        output
    }

    /// Format a follow-up question with the command that resumes the run
    pub fn format_prompt(session: &SessionId, request: &MissingFieldRequest) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n{} {}\n",
            "Follow-up:".yellow().bold(),
            request.prompt
        ));
        output.push_str(&format!(
            "{}\n",
            format!(
                "Resume with: crossdesk --resume {} \"{}=<value>\"",
                session.as_str(),
                request.field
            )
            .dimmed()
        ));
        output
    }

    /// The follow-up question as JSON, for scripted callers
    pub fn format_prompt_json(session: &SessionId, request: &MissingFieldRequest) -> String {
        let value = json!({
            "status": "needs_input",
            "session": session.as_str(),
            "field": request.field,
            "prompt": request.prompt,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_section(section: &FactSection) -> String {
        let mut out = format!(
            "\n{} {}\n",
            format!(
                "── {} ({} desk) ──",
                section.role.service_name(),
                section.role
            )
            .yellow()
            .bold(),
            Self::status_label(section.status)
        );

        if !section.fields.is_empty() {
            let fields: Vec<String> = section
                .fields
                .iter()
                .map(|(field, value)| format!("{}={}", field, value))
                .collect();
            out.push_str(&format!("  {}\n", fields.join("  ")));
        }

        match section.records.len() {
            0 => {}
            1 => out.push_str("  1 record\n"),
            n => out.push_str(&format!("  {} records\n", n)),
        }

        if let Some(note) = &section.note {
            out.push_str(&format!("  {}\n", note.dimmed()));
        }

        out
    }

    fn status_label(status: StepStatus) -> String {
        match status {
            StepStatus::Completed => status.as_str().green().to_string(),
            StepStatus::NotFound => status.as_str().yellow().to_string(),
            StepStatus::Errored => status.as_str().red().to_string(),
            StepStatus::Skipped => status.as_str().dimmed().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl AnswerFormatter for ConsoleFormatter {
    fn format(&self, answer: &FinalAnswer) -> String {
        Self::format(answer)
    }

    fn format_json(&self, answer: &FinalAnswer) -> String {
        Self::format_json(answer)
    }

    fn format_answer_only(&self, answer: &FinalAnswer) -> String {
        Self::format_answer_only(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossdesk_domain::{
        AgentRole, EntityField, Operation, StepTrace, StructuredFacts,
    };
    use std::collections::BTreeMap;

    fn sample_answer() -> FinalAnswer {
        let facts = StructuredFacts {
            sections: vec![
                FactSection {
                    role: AgentRole::Order,
                    operation: Operation::OrderLookup,
                    status: StepStatus::Completed,
                    fields: BTreeMap::from([
                        (EntityField::OrderId, "1".to_string()),
                        (EntityField::UserId, "1".to_string()),
                    ]),
                    records: vec![serde_json::json!({"OrderID": 1, "Status": "Delivered"})],
                    note: None,
                },
                FactSection {
                    role: AgentRole::Shipping,
                    operation: Operation::ShipmentLookup,
                    status: StepStatus::Skipped,
                    fields: BTreeMap::new(),
                    records: Vec::new(),
                    note: Some("order lookup did not complete".to_string()),
                },
            ],
        };
        let trace = vec![
            StepTrace::new(
                AgentRole::Order,
                Operation::OrderLookup,
                StepStatus::Completed,
                14,
            ),
            StepTrace::new(
                AgentRole::Shipping,
                Operation::ShipmentLookup,
                StepStatus::Skipped,
                0,
            ),
        ];
        FinalAnswer::new("Order 1 was delivered.", facts, trace).phrased()
    }

    #[test]
    fn test_full_format_covers_findings_and_trace() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&sample_answer());
        assert!(output.contains("Customer Support Answer"));
        assert!(output.contains("Order 1 was delivered."));
        assert!(output.contains("ShopCore (order desk)"));
        assert!(output.contains("OrderID=1"));
        assert!(output.contains("1 record"));
        assert!(output.contains("order lookup did not complete"));
        assert!(output.contains("Execution Trace"));
        assert!(output.contains("1. order order_lookup completed 14ms"));
        assert!(output.contains("2. shipping shipment_lookup skipped 0ms"));
    }

    #[test]
    fn test_answer_only_is_bare_prose() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format_answer_only(&sample_answer());
        assert_eq!(output, "Order 1 was delivered.\n");
    }

    #[test]
    fn test_json_output_parses_back() {
        let output = ConsoleFormatter::format_json(&sample_answer());
        let back: FinalAnswer = serde_json::from_str(&output).unwrap();
        assert_eq!(back, sample_answer());
    }

    #[test]
    fn test_prompt_names_the_resume_command() {
        colored::control::set_override(false);
        let session = SessionId::new("abc123");
        let request = MissingFieldRequest::new(AgentRole::Payment, EntityField::PaymentMethodId);
        let output = ConsoleFormatter::format_prompt(&session, &request);
        assert!(output.contains("payment method ID"));
        assert!(output.contains("--resume abc123"));
        assert!(output.contains("PaymentMethodID=<value>"));
    }

    #[test]
    fn test_prompt_json_carries_the_field() {
        let session = SessionId::new("abc123");
        let request = MissingFieldRequest::new(AgentRole::Shipping, EntityField::OrderId);
        let output = ConsoleFormatter::format_prompt_json(&session, &request);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "needs_input");
        assert_eq!(value["session"], "abc123");
        assert_eq!(value["field"], "OrderID");
    }
}
