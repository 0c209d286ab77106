//! Turning gathered results into the final answer.
//!
//! Aggregation is split in two: `compose_facts` builds a deterministic
//! structured summary from the context, and phrasing turns it into prose.
//! A language model may do the phrasing, but it only ever sees the
//! structured facts; `render_template` is the fallback wording and the
//! source of truth for what the answer contains.

use crate::agent::{AgentRole, EntityField, Operation};
use crate::orchestration::context::{ExecutionContext, StepStatus, StepTrace};
use crate::orchestration::machine::FailureReason;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One agent's contribution to the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSection {
    pub role: AgentRole,
    pub operation: Operation,
    pub status: StepStatus,
    #[serde(default)]
    pub fields: BTreeMap<EntityField, String>,
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The structured summary handed to phrasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredFacts {
    pub sections: Vec<FactSection>,
}

impl StructuredFacts {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_for(&self, role: AgentRole) -> Option<&FactSection> {
        self.sections.iter().find(|s| s.role == role)
    }
}

/// Builds the structured facts from a settled context.
///
/// Every traced step gets a section, skipped and errored ones included;
/// the customer deserves to know what was not checked and why. The walk
/// follows trace order, so composing twice from the same context yields
/// an identical value.
pub fn compose_facts(ctx: &ExecutionContext) -> StructuredFacts {
    let sections = ctx
        .trace
        .iter()
        .map(|step| match ctx.result_for(step.role) {
            Some(result) => FactSection {
                role: step.role,
                operation: step.operation,
                status: step.status,
                fields: result.fields.clone(),
                records: result.records.clone(),
                note: match step.status {
                    StepStatus::Errored => result.error.clone(),
                    _ => result.note.clone(),
                },
            },
            None => FactSection {
                role: step.role,
                operation: step.operation,
                status: step.status,
                fields: BTreeMap::new(),
                records: Vec::new(),
                note: step.note.clone(),
            },
        })
        .collect();
    StructuredFacts { sections }
}

/// Deterministic wording for the structured facts.
///
/// Used verbatim when no model is available and as the safety net when
/// phrasing fails. Also what the heuristic extraction path answers with.
pub fn render_template(facts: &StructuredFacts) -> String {
    if facts.is_empty() {
        return "I was not able to gather any information for this request.".to_string();
    }

    let mut lines = vec!["Here is what I found:".to_string()];
    for section in &facts.sections {
        lines.push(render_section(section));
    }
    lines.join("\n")
}

fn render_section(section: &FactSection) -> String {
    let desk = format!(
        "- {} ({} desk): ",
        section.role.service_name(),
        section.role.as_str()
    );
    let body = match section.status {
        StepStatus::Completed => {
            let mut body = match section.records.len() {
                0 if section.fields.is_empty() => "lookup completed.".to_string(),
                0 => {
                    let pairs: Vec<String> = section
                        .fields
                        .iter()
                        .map(|(field, value)| format!("{}={}", field.as_str(), value))
                        .collect();
                    format!("{}.", pairs.join(", "))
                }
                1 => format!("1 matching record. {}", render_record(&section.records[0])),
                n => {
                    let shown: Vec<String> =
                        section.records.iter().take(3).map(render_record).collect();
                    format!("{} matching records. {}", n, shown.join(" "))
                }
            };
            if let Some(note) = &section.note {
                body.push(' ');
                body.push_str(note);
                body.push('.');
            }
            body
        }
        StepStatus::NotFound => match &section.note {
            Some(note) => format!("no matching records ({}).", note),
            None => "no matching records.".to_string(),
        },
        StepStatus::Errored => match &section.note {
            Some(note) => format!("lookup failed ({}).", note),
            None => "lookup failed.".to_string(),
        },
        StepStatus::Skipped => {
            "skipped; an earlier lookup did not produce the reference it needs.".to_string()
        }
    };
    desk + &body
}

fn render_record(record: &serde_json::Value) -> String {
    match record {
        serde_json::Value::Object(map) => {
            let pairs: Vec<String> = map
                .iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => format!("{}={}", k, s),
                    other => format!("{}={}", k, other),
                })
                .collect();
            format!("[{}]", pairs.join(", "))
        }
        other => other.to_string(),
    }
}

/// The complete outcome of a query, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAnswer {
    /// The prose shown to the customer.
    pub text: String,
    pub facts: StructuredFacts,
    pub trace: Vec<StepTrace>,
    /// Present when the run ended early; partial facts are still included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
    /// False when the template produced the text.
    pub phrased_by_model: bool,
}

impl FinalAnswer {
    pub fn new(text: impl Into<String>, facts: StructuredFacts, trace: Vec<StepTrace>) -> Self {
        Self {
            text: text.into(),
            facts,
            trace,
            failure: None,
            phrased_by_model: false,
        }
    }

    /// An answer for a run that ended with a terminal failure. Whatever
    /// was gathered before the failure rides along.
    pub fn failed(reason: FailureReason, facts: StructuredFacts, trace: Vec<StepTrace>) -> Self {
        let mut text = reason.user_message();
        if !facts.is_empty() {
            text.push_str("\n\n");
            text.push_str(&render_template(&facts));
        }
        Self {
            text,
            facts,
            trace,
            failure: Some(reason),
            phrased_by_model: false,
        }
    }

    pub fn phrased(mut self) -> Self {
        self.phrased_by_model = true;
        self
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}
