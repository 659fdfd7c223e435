//! Task model and list criteria.
//!
//! # Invariants
//! - `id` is assigned once by the task store and never changes.
//! - `text` is trimmed and non-empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Task identifier. Issued from wall-clock milliseconds, bumped past the
/// last issued value so it stays monotonic.
pub type TaskId = u64;

/// Task urgency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort weight; higher sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(TaskValidationError::UnknownPriority(other.to_string())),
        }
    }
}

/// One entry in the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }

    /// Whether the timer may pick this task.
    pub fn is_actionable(&self) -> bool {
        !self.completed && !self.archived
    }
}

/// Task input validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyText,
    UnknownPriority(String),
    UnknownFilter(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text cannot be empty"),
            Self::UnknownPriority(value) => {
                write!(f, "unknown priority `{value}`; expected high|medium|low")
            }
            Self::UnknownFilter(value) => write!(
                f,
                "unknown filter `{value}`; expected all|high|medium|low|archived"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Task list view criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    /// Every task that is not archived.
    #[default]
    Active,
    /// Tasks of one priority that are not archived.
    Priority(Priority),
    /// Archived tasks regardless of priority or completion.
    Archived,
}

impl TaskFilter {
    pub fn accepts(self, task: &Task) -> bool {
        match self {
            Self::Active => !task.archived,
            Self::Priority(priority) => task.priority == priority && !task.archived,
            Self::Archived => task.archived,
        }
    }
}

impl FromStr for TaskFilter {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => other
                .parse::<Priority>()
                .map(Self::Priority)
                .map_err(|_| TaskValidationError::UnknownFilter(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, TaskFilter};

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn filter_parses_ui_values() {
        assert_eq!("all".parse::<TaskFilter>().unwrap(), TaskFilter::Active);
        assert_eq!(
            " HIGH ".parse::<TaskFilter>().unwrap(),
            TaskFilter::Priority(Priority::High)
        );
        assert_eq!(
            "archived".parse::<TaskFilter>().unwrap(),
            TaskFilter::Archived
        );
        assert!("urgent".parse::<TaskFilter>().is_err());
    }
}
