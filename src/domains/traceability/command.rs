use crate::domains::priority::{NewPriority, Priority, UpdatePriority};
use crate::domains::sharing::{ShareRequest, SharedTraceabilityView};
use crate::errors::DomainResult;
use crate::types::clamp_progress;
use crate::validation::{Validate, ValidationBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user-initiated change to the hierarchy.
///
/// Each command maps to a single remote write. `None` links mean "unlink".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceabilityCommand {
    LinkGoalToVision {
        goal_id: Uuid,
        vision_id: Option<Uuid>,
    },
    LinkPriorityToGoal {
        priority_id: Uuid,
        goal_id: Option<Uuid>,
    },
    LinkTaskToPriority {
        task_id: Uuid,
        priority_id: Option<Uuid>,
    },
    LinkTaskToGoal {
        task_id: Uuid,
        goal_id: Option<Uuid>,
    },
    CreatePriority(NewPriority),
    UpdatePriority {
        priority_id: Uuid,
        update: UpdatePriority,
    },
    DeletePriority {
        priority_id: Uuid,
    },
    ShareView(ShareRequest),
    RevokeShare {
        shared_with: String,
    },
    UpdateGoalProgress {
        goal_id: Uuid,
        progress: i64,
    },
    SetTaskStatus {
        task_id: Uuid,
        status: String,
    },
}

impl TraceabilityCommand {
    /// Check the payload before anything is sent
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            TraceabilityCommand::CreatePriority(new_priority) => new_priority.validate(),
            TraceabilityCommand::UpdatePriority { update, .. } => update.validate(),
            TraceabilityCommand::ShareView(request) => request.validate(),
            TraceabilityCommand::RevokeShare { shared_with } => {
                ShareRequest::new(shared_with.clone(), Default::default()).validate()
            }
            TraceabilityCommand::SetTaskStatus { status, .. } => {
                ValidationBuilder::new("status", Some(status.trim().to_string()))
                    .not_blank()
                    .max_length(50)
                    .validate()
            }
            _ => Ok(()),
        }
    }

    /// Progress as it will be written
    pub(crate) fn clamped_progress(progress: i64) -> u8 {
        clamp_progress(progress as f64)
    }

    /// Toast title and body for a successful run
    pub fn success_message(&self) -> (&'static str, &'static str) {
        match self {
            TraceabilityCommand::LinkGoalToVision { vision_id: Some(_), .. } => {
                ("Goal linked", "Goal linked to your vision")
            }
            TraceabilityCommand::LinkGoalToVision { vision_id: None, .. } => {
                ("Goal unlinked", "Goal removed from your vision")
            }
            TraceabilityCommand::LinkPriorityToGoal { goal_id: Some(_), .. } => {
                ("Priority linked", "Priority linked to goal")
            }
            TraceabilityCommand::LinkPriorityToGoal { goal_id: None, .. } => {
                ("Priority unlinked", "Priority removed from goal")
            }
            TraceabilityCommand::LinkTaskToPriority { priority_id: Some(_), .. } => {
                ("Task linked", "Task linked to priority")
            }
            TraceabilityCommand::LinkTaskToPriority { priority_id: None, .. } => {
                ("Task unlinked", "Task removed from priority")
            }
            TraceabilityCommand::LinkTaskToGoal { goal_id: Some(_), .. } => {
                ("Task linked", "Task linked to goal")
            }
            TraceabilityCommand::LinkTaskToGoal { goal_id: None, .. } => {
                ("Task unlinked", "Task removed from goal")
            }
            TraceabilityCommand::CreatePriority(_) => ("Priority created", "Your priority has been added"),
            TraceabilityCommand::UpdatePriority { .. } => ("Priority updated", "Your changes have been saved"),
            TraceabilityCommand::DeletePriority { .. } => ("Priority deleted", "The priority has been removed"),
            TraceabilityCommand::ShareView(_) => ("View shared", "Your traceability view has been shared"),
            TraceabilityCommand::RevokeShare { .. } => ("Sharing stopped", "The shared view has been revoked"),
            TraceabilityCommand::UpdateGoalProgress { .. } => ("Progress updated", "Goal progress saved"),
            TraceabilityCommand::SetTaskStatus { .. } => ("Task updated", "Task status saved"),
        }
    }

    /// Toast title for a failed run; the body is the error
    pub fn failure_title(&self) -> &'static str {
        match self {
            TraceabilityCommand::LinkGoalToVision { .. } => "Failed to link goal",
            TraceabilityCommand::LinkPriorityToGoal { .. } => "Failed to link priority",
            TraceabilityCommand::LinkTaskToPriority { .. } | TraceabilityCommand::LinkTaskToGoal { .. } => {
                "Failed to link task"
            }
            TraceabilityCommand::CreatePriority(_) => "Failed to create priority",
            TraceabilityCommand::UpdatePriority { .. } => "Failed to update priority",
            TraceabilityCommand::DeletePriority { .. } => "Failed to delete priority",
            TraceabilityCommand::ShareView(_) => "Failed to share view",
            TraceabilityCommand::RevokeShare { .. } => "Failed to revoke share",
            TraceabilityCommand::UpdateGoalProgress { .. } => "Failed to update progress",
            TraceabilityCommand::SetTaskStatus { .. } => "Failed to update task",
        }
    }
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A field patch; the local copy now mirrors it
    Applied,
    Priority(Priority),
    Deleted(Uuid),
    Share(SharedTraceabilityView),
}
