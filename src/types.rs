use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status string the remote tables use for finished goals and daily actions
pub const COMPLETED_STATUS: &str = "completed";

/// Time horizon a priority is planned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityScope {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl PriorityScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityScope::Daily => "daily",
            PriorityScope::Weekly => "weekly",
            PriorityScope::Monthly => "monthly",
            PriorityScope::Yearly => "yearly",
        }
    }
}

impl FromStr for PriorityScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown priority scope: {}", s)),
        }
    }
}

impl fmt::Display for PriorityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityStatus {
    #[default]
    Active,
    Completed,
    Deferred,
}

impl PriorityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityStatus::Active => "active",
            PriorityStatus::Completed => "completed",
            PriorityStatus::Deferred => "deferred",
        }
    }
}

impl FromStr for PriorityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "deferred" => Ok(Self::Deferred),
            _ => Err(format!("Unknown priority status: {}", s)),
        }
    }
}

/// How much of the hierarchy a shared viewer is allowed to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    #[default]
    Full,
    GoalsOnly,
    PrioritiesOnly,
}

impl ViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::Full => "full",
            ViewType::GoalsOnly => "goals_only",
            ViewType::PrioritiesOnly => "priorities_only",
        }
    }
}

impl FromStr for ViewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "goals_only" => Ok(Self::GoalsOnly),
            "priorities_only" => Ok(Self::PrioritiesOnly),
            _ => Err(format!("Unknown view type: {}", s)),
        }
    }
}

/// Clamp any numeric progress value into the integer range 0..=100
pub fn clamp_progress(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// `round(100 * completed / total)`, 0 for an empty set
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    clamp_progress(100.0 * completed as f64 / total as f64)
}

/// Remote rows may carry progress as an integer, a float or null
pub fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(clamp_progress(raw.unwrap_or(0.0)))
}

/// Keeps an explicit `null` apart from a missing field in `Option<Option<T>>`
/// patch fields: missing stays `None`, `null` becomes `Some(None)`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
