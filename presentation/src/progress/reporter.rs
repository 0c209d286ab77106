//! Progress reporting for query execution

use colored::Colorize;
use crossdesk_application::ports::progress::QueryProgress;
use crossdesk_domain::{EngineState, ExecutionPlan, MissingFieldRequest, QueryIntent, StepStatus, StepTrace};

/// Simple text progress printed while a query runs.
///
/// One line per settled step, in plan order. Steps inside a concurrent
/// wave report as they are fed back to the engine, so the output order
/// matches the trace, not wall-clock completion.
pub struct ConsoleProgress;

impl QueryProgress for ConsoleProgress {
    fn on_state(&self, state: &EngineState) {
        match state {
            EngineState::Parsing => {
                println!("{} {}", "->".cyan(), "Reading your question".bold());
            }
            EngineState::Aggregating => {
                println!("{} {}", "->".cyan(), "Writing up the answer".bold());
            }
            _ => {}
        }
    }

    fn on_intent(&self, intent: &QueryIntent) {
        let desks: Vec<&str> = intent
            .required_agents
            .iter()
            .map(|role| role.service_name())
            .collect();
        println!("   {} {}", "routed to:".dimmed(), desks.join(", "));
    }

    fn on_plan(&self, plan: &ExecutionPlan) {
        let noun = if plan.len() == 1 { "lookup" } else { "lookups" };
        println!(
            "{} {} ({} {})",
            "->".cyan(),
            "Checking the desks".bold(),
            plan.len(),
            noun
        );
    }

    fn on_step_settled(&self, trace: &StepTrace) {
        let desk = trace.role.service_name();
        match trace.status {
            StepStatus::Completed => {
                println!("   {} {} ({}ms)", "v".green(), desk, trace.elapsed_ms);
            }
            StepStatus::NotFound => {
                println!("   {} {} (nothing on file)", "-".yellow(), desk);
            }
            StepStatus::Errored => {
                println!("   {} {} (failed)", "x".red(), desk);
            }
            StepStatus::Skipped => {
                println!("   {} {} (skipped)", "-".dimmed(), desk);
            }
        }
    }

    fn on_prompt(&self, request: &MissingFieldRequest) {
        println!(
            "   {} {} desk needs more information",
            "?".yellow().bold(),
            request.role
        );
    }
}
