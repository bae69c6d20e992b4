use crate::domains::daily_action::{ActionParent, DailyAction};
use crate::domains::goal::Goal;
use crate::domains::priority::Priority;
use crate::domains::traceability::types::{NodeType, TraceabilityNode, TraceabilityState};
use crate::domains::vision::Vision;
use crate::types::completion_percentage;

/// Derive the display tree from the flat collections.
///
/// The vision is the root and every loaded goal hangs off it. Under a goal
/// come its priorities (each with their own tasks) followed by the tasks
/// linked to the goal directly. A task is placed by [`DailyAction::parent`],
/// so it appears under its priority or under its goal, never both.
/// There is no tree until a vision is loaded.
pub fn build_tree(state: &TraceabilityState) -> Option<TraceabilityNode> {
    let vision = state.vision.as_ref()?;
    Some(vision_node(vision, &state.goals, &state.priorities, &state.daily_actions))
}

fn vision_node(
    vision: &Vision,
    goals: &[Goal],
    priorities: &[Priority],
    actions: &[DailyAction],
) -> TraceabilityNode {
    let completed = goals.iter().filter(|g| g.is_completed()).count();

    TraceabilityNode {
        id: vision.id,
        node_type: NodeType::Vision,
        title: vision.display_title(),
        status: None,
        progress: completion_percentage(completed, goals.len()),
        children: goals
            .iter()
            .map(|goal| goal_node(goal, priorities, actions))
            .collect(),
    }
}

fn goal_node(goal: &Goal, priorities: &[Priority], actions: &[DailyAction]) -> TraceabilityNode {
    let mut children: Vec<TraceabilityNode> = priorities
        .iter()
        .filter(|p| p.goal_id == Some(goal.id))
        .map(|p| priority_node(p, actions))
        .collect();
    children.extend(
        actions
            .iter()
            .filter(|a| a.parent() == ActionParent::Goal(goal.id))
            .map(task_node),
    );

    // goals own their percentage; it is not derived from children
    TraceabilityNode {
        id: goal.id,
        node_type: NodeType::Goal,
        title: goal.title.clone(),
        status: Some(goal.status.clone()),
        progress: goal.progress_percentage.min(100),
        children,
    }
}

fn priority_node(priority: &Priority, actions: &[DailyAction]) -> TraceabilityNode {
    let tasks: Vec<&DailyAction> = actions
        .iter()
        .filter(|a| a.parent() == ActionParent::Priority(priority.id))
        .collect();
    let completed = tasks.iter().filter(|a| a.is_completed()).count();

    TraceabilityNode {
        id: priority.id,
        node_type: NodeType::Priority,
        title: priority.title.clone(),
        status: Some(priority.status.as_str().to_string()),
        progress: completion_percentage(completed, tasks.len()),
        children: tasks.into_iter().map(task_node).collect(),
    }
}

fn task_node(action: &DailyAction) -> TraceabilityNode {
    TraceabilityNode {
        id: action.id,
        node_type: NodeType::Task,
        title: action.title.clone(),
        status: Some(action.status.clone()),
        progress: action.progress(),
        children: Vec::new(),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_no_vision_no_tree() {
        let user = Uuid::new_v4();
        let state = TraceabilityState {
            goals: vec![goal(user, None, 10)],
            ..Default::default()
        };
        assert!(build_tree(&state).is_none());
    }

    #[test]
    fn test_priority_linked_tasks_stay_under_priority() {
        let user = Uuid::new_v4();
        let v = vision(user);
        let g = goal(user, Some(v.id), 40);
        let p = priority(user, Some(g.id));
        // linked both ways: the priority wins
        let both = task(user, Some(p.id), Some(g.id), true);
        let goal_only = task(user, None, Some(g.id), false);

        let state = TraceabilityState {
            vision: Some(v),
            goals: vec![g.clone()],
            priorities: vec![p.clone()],
            daily_actions: vec![both.clone(), goal_only.clone()],
            ..Default::default()
        };
        let tree = build_tree(&state).unwrap();
        let goal_node = &tree.children[0];

        assert_eq!(goal_node.children.len(), 2);
        assert_eq!(goal_node.children[0].id, p.id);
        assert_eq!(goal_node.children[0].children.len(), 1);
        assert_eq!(goal_node.children[0].children[0].id, both.id);
        assert_eq!(goal_node.children[1].id, goal_only.id);
        assert_eq!(goal_node.children[1].node_type, NodeType::Task);

        assert!(!goal_node.children.iter().any(|c| c.id == both.id));
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_progress_rollups() {
        let user = Uuid::new_v4();
        let v = vision(user);
        let mut done_goal = goal(user, Some(v.id), 100);
        done_goal.status = "completed".into();
        let g = goal(user, Some(v.id), 72);
        let p = priority(user, Some(g.id));
        let empty = priority(user, Some(g.id));
        let tasks = vec![
            task(user, Some(p.id), None, true),
            task(user, Some(p.id), None, false),
            task(user, Some(p.id), None, false),
        ];

        let state = TraceabilityState {
            vision: Some(v),
            goals: vec![done_goal, g.clone(), goal(user, None, 0)],
            priorities: vec![p.clone(), empty.clone()],
            daily_actions: tasks,
            ..Default::default()
        };
        let tree = build_tree(&state).unwrap();

        // 1 of 3 goals completed
        assert_eq!(tree.progress, 33);
        assert_eq!(tree.find(g.id).unwrap().progress, 72);
        assert_eq!(tree.find(p.id).unwrap().progress, 33);
        assert_eq!(tree.find(empty.id).unwrap().progress, 0);
        assert!(tree.find(empty.id).unwrap().children.is_empty());
    }

    #[test]
    fn test_unlinked_tasks_are_not_in_tree() {
        let user = Uuid::new_v4();
        let v = vision(user);
        let loose = task(user, None, None, false);
        let state = TraceabilityState {
            vision: Some(v),
            daily_actions: vec![loose.clone()],
            ..Default::default()
        };
        let tree = build_tree(&state).unwrap();
        assert_eq!(tree.progress, 0);
        assert!(tree.find(loose.id).is_none());
    }
}
