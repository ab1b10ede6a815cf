//! Plan validation and dependency-ordered scheduling.

use super::entities::Plan;
use super::value_objects::TaskId;
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

/// Reasons a candidate plan is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanValidationError {
    #[error("plan has no tasks")]
    Empty,

    #[error("duplicate task id: {0}")]
    DuplicateTaskId(TaskId),

    #[error("dependency cycle: {}", format_cycle(.0))]
    Cycle(Vec<TaskId>),
}

fn format_cycle(path: &[TaskId]) -> String {
    path.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A dependency removed because it named no task in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedDependency {
    pub task: TaskId,
    pub missing: TaskId,
}

/// Validate a plan in place.
///
/// Dependencies on ids absent from the plan are removed and reported;
/// duplicate ids and cycles (including self-dependencies) reject the plan.
pub fn validate_plan(plan: &mut Plan) -> Result<Vec<StrippedDependency>, PlanValidationError> {
    if plan.tasks.is_empty() {
        return Err(PlanValidationError::Empty);
    }

    let mut ids = HashSet::new();
    for task in &plan.tasks {
        if !ids.insert(task.id.clone()) {
            return Err(PlanValidationError::DuplicateTaskId(task.id.clone()));
        }
    }

    let mut stripped = Vec::new();
    for task in &mut plan.tasks {
        let task_id = task.id.clone();
        task.depends_on.retain(|dep| {
            let known = ids.contains(dep);
            if !known {
                stripped.push(StrippedDependency {
                    task: task_id.clone(),
                    missing: dep.clone(),
                });
            }
            known
        });
    }

    if let Some(cycle) = detect_cycle(plan) {
        return Err(PlanValidationError::Cycle(cycle));
    }

    Ok(stripped)
}

/// DFS over `depends_on` edges in plan order; returns the cycle path if any.
fn detect_cycle(plan: &Plan) -> Option<Vec<TaskId>> {
    let graph: HashMap<&TaskId, &[TaskId]> = plan
        .tasks
        .iter()
        .map(|t| (&t.id, t.depends_on.as_slice()))
        .collect();

    let mut visited = HashSet::new();
    let mut on_stack = HashSet::new();
    let mut path = Vec::new();

    for task in &plan.tasks {
        if dfs_cycle(&task.id, &graph, &mut visited, &mut on_stack, &mut path) {
            return Some(path.into_iter().cloned().collect());
        }
    }
    None
}

fn dfs_cycle<'a>(
    node: &'a TaskId,
    graph: &HashMap<&'a TaskId, &'a [TaskId]>,
    visited: &mut HashSet<&'a TaskId>,
    on_stack: &mut HashSet<&'a TaskId>,
    path: &mut Vec<&'a TaskId>,
) -> bool {
    if on_stack.contains(node) {
        path.push(node);
        return true;
    }
    if !visited.insert(node) {
        return false;
    }

    on_stack.insert(node);
    path.push(node);

    if let Some(&deps) = graph.get(node) {
        for dep in deps {
            if dfs_cycle(dep, graph, visited, on_stack, path) {
                return true;
            }
        }
    }

    on_stack.remove(node);
    path.pop();
    false
}

/// Kahn-style ready queue over a plan's tasks.
///
/// Ready tasks are handed out lowest plan position first. A task becomes
/// ready only after every id in its `depends_on` has been marked complete;
/// dependencies naming no task keep it blocked forever.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    order: Vec<TaskId>,
    remaining_deps: Vec<usize>,
    dependents: HashMap<TaskId, Vec<usize>>,
    ready: BTreeSet<usize>,
    started: HashSet<usize>,
    completed: HashSet<TaskId>,
}

impl TaskScheduler {
    pub fn new(plan: &Plan) -> Self {
        let order: Vec<TaskId> = plan.tasks.iter().map(|t| t.id.clone()).collect();
        let mut remaining_deps = Vec::with_capacity(order.len());
        let mut dependents: HashMap<TaskId, Vec<usize>> = HashMap::new();
        let mut ready = BTreeSet::new();

        for (position, task) in plan.tasks.iter().enumerate() {
            let unique: HashSet<&TaskId> = task.depends_on.iter().collect();
            for dep in &unique {
                dependents.entry((*dep).clone()).or_default().push(position);
            }
            remaining_deps.push(unique.len());
            if unique.is_empty() {
                ready.insert(position);
            }
        }

        Self {
            order,
            remaining_deps,
            dependents,
            ready,
            started: HashSet::new(),
            completed: HashSet::new(),
        }
    }

    /// Pop the next eligible task, in plan order.
    pub fn next_ready(&mut self) -> Option<TaskId> {
        let position = self.ready.pop_first()?;
        self.started.insert(position);
        Some(self.order[position].clone())
    }

    /// Take every task eligible right now, in plan order.
    ///
    /// One call is one scheduling pass; tasks released while the pass runs
    /// wait for the next one.
    pub fn take_ready(&mut self) -> Vec<TaskId> {
        let positions = std::mem::take(&mut self.ready);
        positions
            .into_iter()
            .map(|position| {
                self.started.insert(position);
                self.order[position].clone()
            })
            .collect()
    }

    /// Record a task's terminal result, releasing its dependents.
    pub fn complete(&mut self, id: &TaskId) {
        if !self.completed.insert(id.clone()) {
            return;
        }
        let Some(waiting) = self.dependents.get(id) else {
            return;
        };
        for &position in waiting {
            let remaining = &mut self.remaining_deps[position];
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 && !self.started.contains(&position) {
                self.ready.insert(position);
            }
        }
    }

    pub fn is_completed(&self, id: &TaskId) -> bool {
        self.completed.contains(id)
    }

    pub fn has_ready(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Tasks never handed out, in plan order.
    pub fn unstarted(&self) -> Vec<TaskId> {
        self.order
            .iter()
            .enumerate()
            .filter(|(position, _)| !self.started.contains(position))
            .map(|(_, id)| id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::entities::Task;

    fn diamond() -> Plan {
        Plan::new("diamond")
            .with_task(Task::new("d", "join").with_dependency("b").with_dependency("c"))
            .with_task(Task::new("b", "left").with_dependency("a"))
            .with_task(Task::new("c", "right").with_dependency("a"))
            .with_task(Task::new("a", "root"))
    }

    fn drain(scheduler: &mut TaskScheduler) -> Vec<String> {
        let mut order = Vec::new();
        while let Some(id) = scheduler.next_ready() {
            scheduler.complete(&id);
            order.push(id.to_string());
        }
        order
    }

    #[test]
    fn test_topological_order_respects_dependencies() {
        let plan = diamond();
        let mut scheduler = TaskScheduler::new(&plan);
        assert_eq!(drain(&mut scheduler), vec!["a", "b", "c", "d"]);
        assert!(scheduler.unstarted().is_empty());
    }

    #[test]
    fn test_independent_tasks_in_plan_order() {
        let plan = Plan::new("flat")
            .with_task(Task::new("x", "1"))
            .with_task(Task::new("y", "2"))
            .with_task(Task::new("z", "3"));
        let mut scheduler = TaskScheduler::new(&plan);
        assert_eq!(drain(&mut scheduler), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_not_ready_until_all_dependencies_complete() {
        let plan = diamond();
        let mut scheduler = TaskScheduler::new(&plan);

        let a = scheduler.next_ready().unwrap();
        assert!(scheduler.next_ready().is_none());
        scheduler.complete(&a);

        let b = scheduler.next_ready().unwrap();
        scheduler.complete(&b);
        let c = scheduler.next_ready().unwrap();
        assert_eq!(c.as_str(), "c");
        // d still waits on c
        assert!(!scheduler.has_ready());
        scheduler.complete(&c);
        assert_eq!(scheduler.next_ready().unwrap().as_str(), "d");
    }

    #[test]
    fn test_take_ready_runs_in_passes() {
        let plan = diamond();
        let mut scheduler = TaskScheduler::new(&plan);
        let mut passes = Vec::new();

        loop {
            let ready = scheduler.take_ready();
            if ready.is_empty() {
                break;
            }
            for id in &ready {
                scheduler.complete(id);
            }
            passes.push(ready.iter().map(|id| id.to_string()).collect::<Vec<_>>());
        }

        assert_eq!(passes, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
        assert!(scheduler.unstarted().is_empty());
    }

    #[test]
    fn test_unknown_dependency_blocks_forever() {
        let plan = Plan::new("p")
            .with_task(Task::new("a", "x"))
            .with_task(Task::new("b", "y").with_dependency("ghost"));
        let mut scheduler = TaskScheduler::new(&plan);
        assert_eq!(drain(&mut scheduler), vec!["a"]);
        assert_eq!(scheduler.unstarted(), vec![TaskId::new("b")]);
    }

    #[test]
    fn test_validate_strips_unknown_dependencies() {
        let mut plan = Plan::new("p")
            .with_task(Task::new("a", "x"))
            .with_task(Task::new("b", "y").with_dependency("a").with_dependency("ghost"));

        let stripped = validate_plan(&mut plan).unwrap();
        assert_eq!(
            stripped,
            vec![StrippedDependency {
                task: "b".into(),
                missing: "ghost".into()
            }]
        );
        assert_eq!(plan.tasks[1].depends_on, vec![TaskId::new("a")]);
    }

    #[test]
    fn test_validate_rejects_cycles() {
        let mut cyclic = Plan::new("loop")
            .with_task(Task::new("a", "x").with_dependency("c"))
            .with_task(Task::new("b", "y").with_dependency("a"))
            .with_task(Task::new("c", "z").with_dependency("b"));
        assert!(matches!(
            validate_plan(&mut cyclic),
            Err(PlanValidationError::Cycle(_))
        ));

        let mut selfish = Plan::new("self").with_task(Task::new("a", "x").with_dependency("a"));
        let err = validate_plan(&mut selfish).unwrap_err();
        assert_eq!(err.to_string(), "dependency cycle: a -> a");
    }

    #[test]
    fn test_validate_rejects_duplicates_and_empty() {
        let mut dup = Plan::new("dup")
            .with_task(Task::new("a", "x"))
            .with_task(Task::new("a", "y"));
        assert_eq!(
            validate_plan(&mut dup),
            Err(PlanValidationError::DuplicateTaskId("a".into()))
        );
        assert_eq!(
            validate_plan(&mut Plan::new("none")),
            Err(PlanValidationError::Empty)
        );
    }

    #[test]
    fn test_validate_accepts_diamond() {
        assert!(validate_plan(&mut diamond()).unwrap().is_empty());
    }
}
