//! Tool directive: which tools a plan's tasks may use.
//!
//! When the user selects a document or explicitly enables a search mode,
//! every task is forced onto that one tool. Otherwise each plan may use at
//! most one web-style and one scholarly-style call, unless the query itself
//! asks for more sources. Both rules are applied to parsed plans, not just
//! stated in the planning prompt.

use super::entities::{Plan, ToolInvocation};
use crate::core::query::Query;
use crate::tool::entities::{ACADEMIC_SEARCH, DOCUMENT_SEARCH, ToolCategory, ToolSpec, WEB_SEARCH};

/// Phrases that lift the per-plan tool budget.
const MORE_SOURCES_PHRASES: &[&str] = &[
    "multiple sources",
    "several sources",
    "more sources",
    "compare sources",
    "several searches",
    "multiple searches",
    "many sources",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolDirective {
    /// Every task must use this tool
    Enforced { tool: String },
    /// Per-task choice between no tool and the budgeted categories
    Budgeted { allow_extra: bool },
}

/// What [`ToolDirective::apply`] changed in a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveReport {
    /// Tasks forced onto the enforced tool
    pub enforced: usize,
    /// Budget overruns downgraded to no tool
    pub downgraded: usize,
    /// Calls naming a tool outside the catalog, dropped
    pub unknown: Vec<String>,
}

impl DirectiveReport {
    pub fn is_clean(&self) -> bool {
        self.enforced == 0 && self.downgraded == 0 && self.unknown.is_empty()
    }
}

impl ToolDirective {
    /// Document context wins, then academic search, then web search.
    pub fn for_query(query: &Query) -> Self {
        let context = query.context();
        let enforced = if context.has_document() {
            Some(DOCUMENT_SEARCH)
        } else if context.search.academic {
            Some(ACADEMIC_SEARCH)
        } else if context.search.web {
            Some(WEB_SEARCH)
        } else {
            None
        };

        match enforced {
            Some(tool) => ToolDirective::Enforced {
                tool: tool.to_string(),
            },
            None => {
                let text = query.text().to_lowercase();
                ToolDirective::Budgeted {
                    allow_extra: MORE_SOURCES_PHRASES.iter().any(|p| text.contains(p)),
                }
            }
        }
    }

    pub fn enforced_tool(&self) -> Option<&str> {
        match self {
            ToolDirective::Enforced { tool } => Some(tool),
            ToolDirective::Budgeted { .. } => None,
        }
    }

    /// Rewrite a parsed plan so its tool calls obey this directive.
    ///
    /// Alias names are canonicalized against `catalog`. Under
    /// [`ToolDirective::Enforced`] every task gets the enforced tool, keeping
    /// its parameters when it already named that tool and otherwise querying
    /// with the task description.
    pub fn apply(&self, plan: &mut Plan, catalog: &ToolSpec) -> DirectiveReport {
        let mut report = DirectiveReport::default();

        for task in &mut plan.tasks {
            let Some(name) = task.tool_name() else {
                continue;
            };
            match catalog.resolve(name).map(str::to_string) {
                Some(canonical) => {
                    if let Some(call) = task.tool_call.as_mut() {
                        call.tool_name = canonical;
                    }
                }
                None => {
                    report.unknown.push(name.to_string());
                    task.tool_call = None;
                }
            }
        }

        match self {
            ToolDirective::Enforced { tool } => {
                for task in &mut plan.tasks {
                    if task.tool_name() != Some(tool.as_str()) {
                        task.tool_call = Some(
                            ToolInvocation::new(tool.as_str())
                                .with_param("query", task.description.as_str()),
                        );
                        report.enforced += 1;
                    }
                }
            }
            ToolDirective::Budgeted { allow_extra: true } => {}
            ToolDirective::Budgeted { allow_extra: false } => {
                let mut used_web = false;
                let mut used_scholarly = false;
                for task in &mut plan.tasks {
                    let slot = match task.tool_name().and_then(|n| catalog.category_of(n)) {
                        Some(ToolCategory::Web) => &mut used_web,
                        Some(ToolCategory::Scholarly) => &mut used_scholarly,
                        _ => continue,
                    };
                    if *slot {
                        task.tool_call = None;
                        report.downgraded += 1;
                    } else {
                        *slot = true;
                    }
                }
            }
        }

        report
    }
}

/// Budgeted tool calls made so far in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolUsage {
    pub web: usize,
    pub scholarly: usize,
}

/// Verdict on a tool call a reasoning step asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAdmission {
    /// Run the requested tool
    Allowed,
    /// Run the enforced tool instead of the requested one
    Redirected { tool: String },
    /// The plan already spent its call for this category
    OverBudget { category: ToolCategory },
}

impl ToolDirective {
    /// Check a run-time call to the canonical tool `tool`, recording it in
    /// `usage` when it is admitted.
    ///
    /// Budgeted runs get one web-style and one scholarly-style call in
    /// total, shared by every task of the plan.
    pub fn admit(&self, tool: &str, catalog: &ToolSpec, usage: &mut ToolUsage) -> ToolAdmission {
        match self {
            ToolDirective::Enforced { tool: enforced } if enforced != tool => {
                ToolAdmission::Redirected {
                    tool: enforced.clone(),
                }
            }
            ToolDirective::Enforced { .. } | ToolDirective::Budgeted { allow_extra: true } => {
                ToolAdmission::Allowed
            }
            ToolDirective::Budgeted { allow_extra: false } => {
                let Some(category) = catalog.category_of(tool) else {
                    return ToolAdmission::Allowed;
                };
                let used = match category {
                    ToolCategory::Web => &mut usage.web,
                    ToolCategory::Scholarly => &mut usage.scholarly,
                    ToolCategory::Document | ToolCategory::Crawl => return ToolAdmission::Allowed,
                };
                if *used > 0 {
                    ToolAdmission::OverBudget { category }
                } else {
                    *used += 1;
                    ToolAdmission::Allowed
                }
            }
        }
    }
}
