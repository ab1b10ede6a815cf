//! Console output formatter for orchestration results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use reasoning_domain::{OrchestrationResult, ReasoningStep, Reference};

/// Formats orchestration results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Answer, references, thought transcript and reasoning trace
    pub fn format(result: &OrchestrationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Tutor Reasoning"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Pipeline:".cyan().bold(),
            result.source_pipeline
        ));

        output.push_str(&Self::section_header("Answer"));
        output.push_str(&format!("\n{}\n", result.final_answer.trim()));

        if !result.references.is_empty() {
            output.push_str(&Self::section_header("References"));
            output.push_str(&Self::references(&result.references));
        }

        if !result.thoughts.is_empty() {
            output.push_str(&Self::section_header("Thoughts"));
            for (i, thought) in result.thoughts.iter().enumerate() {
                let marker = format!("{:>3}.", i + 1).dimmed();
                output.push_str(&format!("{} {}\n", marker, Self::indent_tail(thought, "     ")));
            }
        }

        if let Some(steps) = &result.reasoning_steps
            && !steps.is_empty()
        {
            output.push_str(&Self::section_header("Reasoning Trace"));
            for step in steps {
                output.push_str(&Self::step(step));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Answer plus numbered references
    pub fn format_answer_only(result: &OrchestrationResult) -> String {
        let mut output = result.final_answer.trim().to_string();
        output.push('\n');

        if !result.references.is_empty() {
            output.push_str(&format!("\n{}\n", "References:".cyan().bold()));
            output.push_str(&Self::references(&result.references));
        }

        output
    }

    /// Format as JSON
    pub fn format_json(result: &OrchestrationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    fn references(references: &[Reference]) -> String {
        references
            .iter()
            .map(|r| format!("  {}\n", r))
            .collect()
    }

    fn step(step: &ReasoningStep) -> String {
        let mut title = format!(
            "── {} turn {} (confidence {:.2}) ──",
            step.task_id, step.turn, step.confidence_score
        );
        if step.corrected {
            title.push_str(" [reflected]");
        }

        let title = if step.confidence_score < reasoning_domain::REFLECTION_THRESHOLD {
            title.yellow().bold()
        } else {
            title.green().bold()
        };

        let mut block = format!("\n{}\n", title);
        block.push_str(&format!("  {} {}\n", "Thought:".bold(), step.thought));
        if let Some(action) = &step.action {
            let input = serde_json::to_string(&step.action_input).unwrap_or_default();
            block.push_str(&format!("  {} {} {}\n", "Action:".bold(), action, input.dimmed()));
        }
        if let Some(answer) = &step.final_answer {
            block.push_str(&format!(
                "  {} {}\n",
                "Answer:".bold(),
                Self::indent_tail(answer.trim(), "          ")
            ));
        }
        block
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

    /// Indent every line after the first
    fn indent_tail(text: &str, prefix: &str) -> String {
        text.lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    line.to_string()
                } else {
                    format!("{}{}", prefix, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, result: &OrchestrationResult) -> String {
        Self::format(result)
    }

    fn format_answer(&self, result: &OrchestrationResult) -> String {
        Self::format_answer_only(result)
    }

    fn format_json(&self, result: &OrchestrationResult) -> String {
        Self::format_json(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_domain::{
        ModelTarget, OutputFormat, PipelinePath, ProviderKind, SourcePipeline, TaskId,
    };

    fn result() -> OrchestrationResult {
        let mut step = ReasoningStep::best_effort(TaskId::new("t1"), 1, "Water boils at 100 C.");
        step.confidence_score = 0.9;

        OrchestrationResult {
            final_answer: "Water boils at 100 C at sea level [1].".to_string(),
            thoughts: vec![
                "Query classified as COMPLEX (score 55), exploring 2 strategies".to_string(),
                "Selected plan: Lookup (1 step(s))".to_string(),
            ],
            reasoning_steps: Some(vec![step]),
            references: vec![Reference {
                number: 1,
                source: "Boiling point (Wikipedia)".to_string(),
                url: Some("https://en.wikipedia.org/wiki/Boiling_point".to_string()),
            }],
            source_pipeline: SourcePipeline::new(
                PipelinePath::TreeOfThought,
                ModelTarget::new(ProviderKind::Gemini, "gemini-2.5-flash"),
            ),
        }
    }

    #[test]
    fn test_full_format_contains_every_section() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&result());

        assert!(output.contains("Pipeline: tot:gemini/gemini-2.5-flash"));
        assert!(output.contains("Water boils at 100 C at sea level [1]."));
        assert!(output.contains("[1] Boiling point (Wikipedia) - https://en.wikipedia.org/wiki/Boiling_point"));
        assert!(output.contains("  1. Query classified as COMPLEX"));
        assert!(output.contains("Reasoning Trace"));
        assert!(output.contains("t1 turn 1 (confidence 0.90)"));
    }

    #[test]
    fn test_answer_format_omits_transcript() {
        colored::control::set_override(false);
        let output = ConsoleFormatter.render(&result(), OutputFormat::Answer);

        assert!(output.starts_with("Water boils at 100 C at sea level [1]."));
        assert!(output.contains("References:"));
        assert!(!output.contains("Query classified"));
        assert!(!output.contains("Reasoning Trace"));
    }

    #[test]
    fn test_json_format_uses_wire_names() {
        let output = ConsoleFormatter.render(&result(), OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["finalAnswer"], "Water boils at 100 C at sea level [1].");
        assert_eq!(json["sourcePipeline"], "tot:gemini/gemini-2.5-flash");
        assert_eq!(json["references"][0]["number"], 1);
        assert_eq!(json["thoughts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_indent_tail() {
        assert_eq!(ConsoleFormatter::indent_tail("a\nb\nc", "  "), "a\n  b\n  c");
    }
}
