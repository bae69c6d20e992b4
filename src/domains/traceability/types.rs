use crate::domains::daily_action::DailyAction;
use crate::domains::goal::Goal;
use crate::domains::priority::Priority;
use crate::domains::sharing::SharedTraceabilityView;
use crate::domains::vision::Vision;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The flat collections the store mirrors from the remote tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceabilityState {
    pub vision: Option<Vision>,
    pub goals: Vec<Goal>,
    pub priorities: Vec<Priority>,
    pub daily_actions: Vec<DailyAction>,
    pub shared_views: Vec<SharedTraceabilityView>,
}

impl TraceabilityState {
    pub fn goal(&self, id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn priority(&self, id: Uuid) -> Option<&Priority> {
        self.priorities.iter().find(|p| p.id == id)
    }

    pub fn daily_action(&self, id: Uuid) -> Option<&DailyAction> {
        self.daily_actions.iter().find(|a| a.id == id)
    }

    pub(crate) fn goal_mut(&mut self, id: Uuid) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == id)
    }

    pub(crate) fn priority_mut(&mut self, id: Uuid) -> Option<&mut Priority> {
        self.priorities.iter_mut().find(|p| p.id == id)
    }

    pub(crate) fn daily_action_mut(&mut self, id: Uuid) -> Option<&mut DailyAction> {
        self.daily_actions.iter_mut().find(|a| a.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Vision,
    Goal,
    Priority,
    Task,
}

/// One node of the derived display tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceabilityNode {
    pub id: Uuid,
    pub node_type: NodeType,
    pub title: String,
    pub status: Option<String>,
    /// Completion in 0..=100
    pub progress: u8,
    pub children: Vec<TraceabilityNode>,
}

impl TraceabilityNode {
    /// Depth-first search for a node by id
    pub fn find(&self, id: Uuid) -> Option<&TraceabilityNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TraceabilityNode::node_count).sum::<usize>()
    }
}

/// Which collections the last fetch managed to load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSummary {
    pub vision: bool,
    pub goals: bool,
    pub priorities: bool,
    pub daily_actions: bool,
}

impl FetchSummary {
    pub fn is_complete(&self) -> bool {
        self.vision && self.goals && self.priorities && self.daily_actions
    }

    /// Names of the collections that failed to load
    pub fn failed(&self) -> Vec<&'static str> {
        [
            ("vision", self.vision),
            ("goals", self.goals),
            ("priorities", self.priorities),
            ("daily_actions", self.daily_actions),
        ]
        .into_iter()
        .filter(|(_, loaded)| !loaded)
        .map(|(name, _)| name)
        .collect()
    }
}

/// The ancestors of one daily action; unresolvable levels are `None`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceabilityPath<'a> {
    pub task: &'a DailyAction,
    pub priority: Option<&'a Priority>,
    pub goal: Option<&'a Goal>,
    pub vision: Option<&'a Vision>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_summary_reports_failures() {
        let summary = FetchSummary {
            vision: true,
            goals: false,
            priorities: true,
            daily_actions: false,
        };
        assert!(!summary.is_complete());
        assert_eq!(summary.failed(), vec!["goals", "daily_actions"]);
        assert!(FetchSummary { vision: true, goals: true, priorities: true, daily_actions: true }.is_complete());
    }
}
