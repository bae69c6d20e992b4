use crate::domains::daily_action::ActionParent;
use crate::domains::traceability::types::{TraceabilityPath, TraceabilityState};
use uuid::Uuid;

/// Walk from a daily action up to the vision.
///
/// The goal comes from the task's priority when that priority is loaded,
/// otherwise from the task's own goal link. The vision is only reported when
/// the loaded vision is the one the goal points at.
pub fn traceability_path(state: &TraceabilityState, task_id: Uuid) -> Option<TraceabilityPath<'_>> {
    let task = state.daily_action(task_id)?;

    let priority = match task.parent() {
        ActionParent::Priority(priority_id) => state.priority(priority_id),
        ActionParent::Goal(_) | ActionParent::Unlinked => None,
    };

    let goal_id = match priority {
        Some(priority) => priority.goal_id,
        None => task.goal_id,
    };
    let goal = goal_id.and_then(|id| state.goal(id));

    let vision = match (goal, state.vision.as_ref()) {
        (Some(goal), Some(vision)) if goal.is_linked_to(vision) => Some(vision),
        _ => None,
    };

    Some(TraceabilityPath {
        task,
        priority,
        goal,
        vision,
    })
}
