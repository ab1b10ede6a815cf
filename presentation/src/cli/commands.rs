//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for reasoning results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Answer, references, thought transcript and reasoning trace
    Full,
    /// Only the final answer
    Answer,
    /// The result object as JSON
    Json,
}

impl From<OutputFormat> for reasoning_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => reasoning_domain::OutputFormat::Full,
            OutputFormat::Answer => reasoning_domain::OutputFormat::Answer,
            OutputFormat::Json => reasoning_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for tutor-reason
#[derive(Parser, Debug)]
#[command(name = "tutor-reason")]
#[command(author, version, about = "Reasoning orchestration engine for an AI tutor")]
#[command(long_about = r#"
tutor-reason answers a student's question with the cheapest path that works.

Simple questions are answered directly by one model call. Complex questions
are planned as several candidate strategies, the best one is executed task by
task (with web, scholarly and document retrieval), and the findings are
synthesized into a cited answer.

Configuration files are loaded from (in priority order):
1. TUTOR_* environment variables (TUTOR_ROUTING__DEFAULT_MODEL=...)
2. --config <path>       Explicit config file
3. ./reasoning.toml      Project-level config
4. ~/.config/tutor-reasoning/config.toml   Global config

Example:
  tutor-reason "What is 2 + 2?"
  tutor-reason --academic "Compare mRNA and viral vector vaccine efficacy"
  tutor-reason --document chem-101 --format full "Explain question 3 of the worksheet"
  tutor-reason --chat --subject biology
"#)]
pub struct Cli {
    /// The question to answer (not required in chat mode)
    pub question: Option<String>,

    /// Start interactive chat mode (carries conversation history)
    #[arg(short, long)]
    pub chat: bool,

    /// Output format (default: from config, else "answer")
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Active document id; forces retrieval over that document
    #[arg(short, long, value_name = "ID")]
    pub document: Option<String>,

    /// Enable web search for this request
    #[arg(long)]
    pub web: bool,

    /// Enable scholarly search for this request
    #[arg(long)]
    pub academic: bool,

    /// Preferred provider (gemini, ollama, openai)
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Subject the question belongs to (e.g. "chemistry")
    #[arg(short, long, value_name = "SUBJECT")]
    pub subject: Option<String>,

    /// User id forwarded to document retrieval
    #[arg(long, value_name = "ID")]
    pub user: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the thought stream and progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Directory for daily-rotated log files
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print the effective merged configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_one_shot_flags() {
        let cli = Cli::try_parse_from([
            "tutor-reason",
            "--academic",
            "-d",
            "chem-101",
            "--format",
            "json",
            "-vv",
            "Why is the sky blue?",
        ])
        .unwrap();

        assert_eq!(cli.question.as_deref(), Some("Why is the sky blue?"));
        assert!(cli.academic);
        assert!(!cli.web);
        assert_eq!(cli.document.as_deref(), Some("chem-101"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_chat_mode_without_question() {
        let cli = Cli::try_parse_from(["tutor-reason", "--chat", "--subject", "biology"]).unwrap();
        assert!(cli.chat);
        assert!(cli.question.is_none());
        assert_eq!(cli.subject.as_deref(), Some("biology"));
    }

    #[test]
    fn test_format_maps_to_domain() {
        let format: reasoning_domain::OutputFormat = OutputFormat::Full.into();
        assert_eq!(format, reasoning_domain::OutputFormat::Full);
    }
}
