//! REPL (Read-Eval-Print Loop) for interactive tutoring
//!
//! Each answered turn is appended to the conversation history, so follow-up
//! questions reach the direct path, the planner and the synthesizer with
//! the prior exchange attached.

use crate::config::ReplConfig;
use crate::output::formatter::OutputFormatter;
use crate::progress::reporter::ThoughtReporter;
use crate::ConsoleFormatter;
use colored::Colorize;
use reasoning_application::{NoThoughts, RunReasoningUseCase};
use reasoning_domain::{ChatTurn, OutputFormat, Query, RequestContext};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use std::sync::Arc;

/// Oldest turns are dropped beyond this many.
const MAX_HISTORY_TURNS: usize = 20;

const HISTORY_CAPACITY: usize = 1000;

/// A slash command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    Help,
    /// Forget the conversation so far
    Clear,
    /// Print the conversation so far
    History,
    ToggleWeb,
    ToggleAcademic,
    /// Set (`Some`) or clear (`None`) the active document
    Document(Option<String>),
    Format(OutputFormat),
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`; `None` for ordinary questions.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "quit" | "exit" | "q" => ReplCommand::Quit,
            "help" | "h" | "?" => ReplCommand::Help,
            "clear" | "new" => ReplCommand::Clear,
            "history" => ReplCommand::History,
            "web" => ReplCommand::ToggleWeb,
            "academic" | "scholar" => ReplCommand::ToggleAcademic,
            "doc" | "document" => {
                ReplCommand::Document((!arg.is_empty()).then(|| arg.to_string()))
            }
            "format" => match arg {
                "full" => ReplCommand::Format(OutputFormat::Full),
                "answer" => ReplCommand::Format(OutputFormat::Answer),
                "json" => ReplCommand::Format(OutputFormat::Json),
                _ => ReplCommand::Unknown(line.to_string()),
            },
            _ => ReplCommand::Unknown(line.to_string()),
        };
        Some(command)
    }
}

/// Conversation state carried between turns
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    context: RequestContext,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(context: RequestContext) -> Self {
        Self {
            context,
            history: Vec::new(),
        }
    }

    /// Query for `question`, carrying the conversation so far.
    pub fn query(&self, question: &str) -> Query {
        Query::new(
            question,
            self.context.clone().with_history(self.history.clone()),
        )
    }

    pub fn record(&mut self, question: &str, answer: &str) {
        self.history.push(ChatTurn::user(question));
        self.history.push(ChatTurn::model(answer));
        if self.history.len() > MAX_HISTORY_TURNS {
            let excess = self.history.len() - MAX_HISTORY_TURNS;
            self.history.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RequestContext {
        &mut self.context
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: Arc<RunReasoningUseCase>,
    session: ChatSession,
    format: OutputFormat,
    config: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(use_case: Arc<RunReasoningUseCase>, context: RequestContext) -> Self {
        Self {
            use_case,
            session: ChatSession::new(context),
            format: OutputFormat::Answer,
            config: ReplConfig::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut line_editor = Reedline::create();
        if let Some(path) = self.history_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, path) {
                Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
                Err(e) => tracing::warn!(error = %e, "Could not open REPL history file"),
            }
        }

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("tutor".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match line_editor.read_line(&prompt)? {
                Signal::Success(buffer) => {
                    let line = buffer.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    self.process_question(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                #[allow(unreachable_patterns)]
                _ => continue,
            }
        }

        Ok(())
    }

    fn history_path(&self) -> Option<PathBuf> {
        self.config
            .history_file
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|p| p.join("tutor-reasoning").join("history.txt")))
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│        Tutor Reasoning - Chat Mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        self.print_context();
        println!();
        Self::print_help();
    }

    fn print_context(&self) {
        let context = self.session.context();
        println!(
            "{} web: {}  academic: {}  document: {}",
            "Search:".cyan().bold(),
            on_off(context.search.web),
            on_off(context.search.academic),
            context.document_id.as_deref().unwrap_or("none"),
        );
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?       - Show this help");
        println!("  /web                - Toggle web search");
        println!("  /academic           - Toggle scholarly search");
        println!("  /doc <id>           - Study a document (/doc alone clears it)");
        println!("  /format <fmt>       - full, answer or json");
        println!("  /history            - Show the conversation so far");
        println!("  /clear              - Start a new conversation");
        println!("  /quit, /exit, /q    - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => Self::print_help(),
            ReplCommand::Clear => {
                self.session.clear();
                println!("Conversation cleared.");
            }
            ReplCommand::History => {
                if self.session.history().is_empty() {
                    println!("No conversation yet.");
                }
                for turn in self.session.history() {
                    println!("{} {}", format!("{}:", turn.role.as_str()).bold(), turn.content);
                }
            }
            ReplCommand::ToggleWeb => {
                let search = &mut self.session.context_mut().search;
                search.web = !search.web;
                self.print_context();
            }
            ReplCommand::ToggleAcademic => {
                let search = &mut self.session.context_mut().search;
                search.academic = !search.academic;
                self.print_context();
            }
            ReplCommand::Document(document) => {
                self.session.context_mut().document_id = document;
                self.print_context();
            }
            ReplCommand::Format(format) => {
                self.format = format;
                println!("Output format: {}", format);
            }
            ReplCommand::Unknown(line) => {
                println!("Unknown command: {}", line);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn process_question(&mut self, question: &str) {
        println!();

        let query = self.session.query(question);
        let result = if self.config.show_progress {
            let reporter = ThoughtReporter::new();
            let result = self.use_case.execute(query, &reporter).await;
            reporter.finish();
            result
        } else {
            self.use_case.execute(query, &NoThoughts).await
        };

        match result {
            Ok(result) => {
                println!("\n{}", ConsoleFormatter.render(&result, self.format));
                self.session.record(question, &result.final_answer);
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
        }
        println!();
    }
}

fn on_off(enabled: bool) -> colored::ColoredString {
    if enabled { "on".green() } else { "off".dimmed() }
}
