//! Output formatter trait

use reasoning_domain::{OrchestrationResult, OutputFormat};

/// Trait for formatting orchestration results
pub trait OutputFormatter {
    /// Answer, numbered references, thought transcript and reasoning trace
    fn format_full(&self, result: &OrchestrationResult) -> String;

    /// Answer and numbered references only
    fn format_answer(&self, result: &OrchestrationResult) -> String;

    /// The top-level result object as JSON
    fn format_json(&self, result: &OrchestrationResult) -> String;

    fn render(&self, result: &OrchestrationResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format_full(result),
            OutputFormat::Answer => self.format_answer(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
