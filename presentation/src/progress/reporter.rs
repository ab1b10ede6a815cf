//! Live thought stream for orchestration runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use reasoning_application::ports::thought_notifier::ThoughtNotifier;
use reasoning_domain::{Task, TaskResult, ThoughtEvent, ThoughtKind, truncate_str};
use std::sync::Mutex;
use std::time::Duration;

/// Observations are long tool dumps; only their head is streamed.
const OBSERVATION_PREVIEW_CHARS: usize = 240;

/// Render one thought as a single console line.
pub fn format_thought(event: &ThoughtEvent) -> String {
    let content = match event.kind {
        ThoughtKind::Observation => {
            truncate_str(&event.content.replace('\n', " "), OBSERVATION_PREVIEW_CHARS)
        }
        _ => event.content.clone(),
    };

    match event.kind {
        ThoughtKind::Note => format!("{} {}", "->".cyan(), content),
        ThoughtKind::Reasoning => format!("  {} {}", "thought".magenta().bold(), content),
        ThoughtKind::Action => format!("  {} {}", "action".blue().bold(), content),
        ThoughtKind::Observation => format!("  {} {}", "observed".dimmed(), content.dimmed()),
        ThoughtKind::Warning => format!("{} {}", "!".yellow().bold(), content.yellow()),
    }
}

/// Streams thoughts above a spinner that tracks the running task
pub struct ThoughtReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ThoughtReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {prefix:.bold.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn print(&self, line: String) {
        match self.spinner.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(pb) => pb.println(line),
                None => println!("{}", line),
            },
            Err(_) => println!("{}", line),
        }
    }

    /// Stop any running spinner (call before printing the final answer).
    pub fn finish(&self) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }
    }
}

impl Default for ThoughtReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ThoughtNotifier for ThoughtReporter {
    fn on_thought(&self, event: &ThoughtEvent) {
        self.print(format_thought(event));
    }

    fn on_task_start(&self, task: &Task, position: usize, total: usize) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(format!("Task {}/{}", position, total));
        pb.set_message(truncate_str(&task.description, 60));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.spinner.lock()
            && let Some(previous) = guard.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_task_complete(&self, task: &Task, result: &TaskResult) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        if let Some(pb) = guard.take() {
            let mark = if result.exhausted || result.confidence < reasoning_domain::REFLECTION_THRESHOLD
            {
                "~".yellow()
            } else {
                "v".green()
            };
            pb.finish_and_clear();
            println!(
                "{} {} {} (confidence {:.2}, {} turn(s))",
                mark,
                task.id,
                truncate_str(&task.description, 60),
                result.confidence,
                result.turns
            );
        }
    }
}

/// Plain line-by-line thought stream (no spinner)
pub struct SimpleThoughts;

impl ThoughtNotifier for SimpleThoughts {
    fn on_thought(&self, event: &ThoughtEvent) {
        println!("{}", format_thought(event));
    }

    fn on_task_start(&self, task: &Task, position: usize, total: usize) {
        println!("{} [{}/{}] {}", "->".cyan(), position, total, task.description.bold());
    }
}
