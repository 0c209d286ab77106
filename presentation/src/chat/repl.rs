//! REPL (Read-Eval-Print Loop) for interactive support sessions

use crate::output::ConsoleFormatter;
use crate::prompt::parse_reply;
use colored::Colorize;
use crossdesk_application::{LanguageModel, QueryOutcome, RunQueryUseCase};
use crossdesk_domain::{MissingFieldRequest, SessionId, SessionRepository};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};

/// Interactive support REPL.
///
/// Follow-up questions are answered inline: when a query suspends, the
/// next line is taken as the reply and the run resumes in place, so the
/// customer never sees a session ID.
pub struct ChatRepl<M, S>
where
    M: LanguageModel + 'static,
    S: SessionRepository + 'static,
{
    engine: RunQueryUseCase<M, S>,
    model_label: String,
    pending: Option<(SessionId, MissingFieldRequest)>,
}

impl<M, S> ChatRepl<M, S>
where
    M: LanguageModel + 'static,
    S: SessionRepository + 'static,
{
    /// Create a new ChatRepl over a configured engine
    pub fn new(engine: RunQueryUseCase<M, S>, model_label: impl Into<String>) -> Self {
        Self {
            engine,
            model_label: model_label.into(),
            pending: None,
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = dirs::data_dir().map(|p| p.join("crossdesk").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let prompt = if self.pending.is_some() { "... " } else { ">>> " };
            let readline = rl.readline(prompt);

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    // Add to history
                    let _ = rl.add_history_entry(line);

                    if let Some((session, request)) = self.pending.take() {
                        self.process_reply(&session, &request, line).await;
                    } else {
                        self.process_query(line).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    if self.pending.take().is_some() {
                        println!("Dropped the pending follow-up.");
                    }
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          crossdesk - Support Chat           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.model_label);
        println!();
        println!("Ask about orders, shipments, payments or tickets.");
        println!("When a desk needs more information, just type the answer.");
        println!();
        println!("Commands:");
        println!("  /help     - Show this help");
        println!("  /forget   - Drop a pending follow-up");
        println!("  /quit     - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?    - Show this help");
                println!("  /forget          - Drop a pending follow-up");
                println!("  /quit, /exit, /q - Exit chat");
                println!();
                false
            }
            "/forget" => {
                match self.pending.take() {
                    Some(_) => println!("Dropped the pending follow-up."),
                    None => println!("Nothing is pending."),
                }
                false
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_query(&mut self, query: &str) {
        println!();

        match self.engine.run(query).await {
            Ok(outcome) => self.show_outcome(outcome),
            Err(e) => eprintln!("Error: {}", e),
        }
        println!();
    }

    async fn process_reply(&mut self, session: &SessionId, request: &MissingFieldRequest, line: &str) {
        let Some((field, value)) = parse_reply(request.field, line) else {
            println!("{}", request.prompt.yellow());
            self.pending = Some((session.clone(), request.clone()));
            return;
        };

        println!();
        match self.engine.resume(session, field, value).await {
            Ok(outcome) => self.show_outcome(outcome),
            Err(e) => eprintln!("Error: {}", e),
        }
        println!();
    }

    fn show_outcome(&mut self, outcome: QueryOutcome) {
        match outcome {
            QueryOutcome::Answer(answer) => {
                println!("{}", ConsoleFormatter::format_answer_only(&answer));
            }
            QueryOutcome::NeedsInput { session, request } => {
                println!("{}", request.prompt.yellow());
                self.pending = Some((session, request));
            }
        }
    }
}
