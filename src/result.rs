use crate::allocation::{DAILY_CAPACITY, TaskState};
use crate::calendar::weekday_label;
use crate::hours::Hours;
use crate::task::RawTask;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hours a single task received on a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskShare {
    /// Position of the task in the parsed input.
    pub index: usize,
    pub id: String,
    pub hours: Hours,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAllocation {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub task_ids: Vec<String>,
    pub shares: Vec<TaskShare>,
    pub total_allocated: Hours,
    pub remaining_capacity: Hours,
}

impl DayAllocation {
    pub(crate) fn from_shares(date: NaiveDate, shares: Vec<TaskShare>) -> Self {
        let total_allocated: Hours = shares.iter().map(|share| share.hours).sum();
        Self {
            date,
            day_of_week: weekday_label(date).to_string(),
            task_ids: shares.iter().map(|share| share.id.clone()).collect(),
            shares,
            total_allocated,
            remaining_capacity: DAILY_CAPACITY.clamped_sub(total_allocated),
        }
    }

    /// Stand-in for a date that is not part of the workday sequence.
    pub fn placeholder(date: NaiveDate) -> Self {
        Self {
            date,
            day_of_week: weekday_label(date).to_string(),
            task_ids: Vec::new(),
            shares: Vec::new(),
            total_allocated: Hours::ZERO,
            remaining_capacity: Hours::ZERO,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.task_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnallocatedTask {
    pub id: String,
    pub remaining: Hours,
    pub range: String,
}

impl UnallocatedTask {
    pub fn message(&self) -> String {
        format!("任务序号 {}：剩余 {} 小时无法分配", self.id, self.remaining)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationStats {
    pub total_tasks: usize,
    pub total_hours_required: Hours,
    pub total_hours_allocated: Hours,
    pub total_idle_capacity: Hours,
}

impl AllocationStats {
    /// Required hours that did not fit anywhere.
    pub fn outstanding_hours(&self) -> Hours {
        self.total_hours_required
            .clamped_sub(self.total_hours_allocated)
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.total_tasks));
        parts.push(format!("required={}h", self.total_hours_required));
        parts.push(format!("allocated={}h", self.total_hours_allocated));
        let outstanding = self.outstanding_hours();
        if outstanding.is_positive() {
            parts.push(format!("outstanding={}h", outstanding));
        }
        parts.push(format!("idle={}h", self.total_idle_capacity));
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub allocations: Vec<DayAllocation>,
    pub errors: Vec<String>,
    pub unallocated_tasks: Vec<UnallocatedTask>,
    pub stats: AllocationStats,
}

impl AllocationResult {
    /// The allocation for `date`, or an empty placeholder for rest days and
    /// dates outside the allocated range.
    pub fn day(&self, date: NaiveDate) -> DayAllocation {
        self.allocations
            .iter()
            .find(|day| day.date == date)
            .cloned()
            .unwrap_or_else(|| DayAllocation::placeholder(date))
    }

    pub fn is_fully_allocated(&self) -> bool {
        self.unallocated_tasks.is_empty()
    }

    /// Total hours placed for the task at `index` in the parsed input.
    pub fn hours_for_task(&self, index: usize) -> Hours {
        self.allocations
            .iter()
            .flat_map(|day| day.shares.iter())
            .filter(|share| share.index == index)
            .map(|share| share.hours)
            .sum()
    }
}

/// Fold the settled task states and the per-day allocations into the final
/// result. `tasks` is the full parsed input, inverted intervals included.
pub(crate) fn aggregate(
    tasks: &[RawTask],
    states: &[TaskState],
    allocations: Vec<DayAllocation>,
) -> AllocationResult {
    let unallocated_tasks: Vec<UnallocatedTask> = states
        .iter()
        .filter(|state| state.remaining.is_positive())
        .map(|state| {
            let task = &tasks[state.index];
            UnallocatedTask {
                id: task.id.clone(),
                remaining: state.remaining,
                range: task.range_label(),
            }
        })
        .collect();
    let errors = unallocated_tasks.iter().map(UnallocatedTask::message).collect();

    let stats = AllocationStats {
        total_tasks: tasks.len(),
        total_hours_required: states.iter().map(|state| state.original).sum(),
        total_hours_allocated: allocations.iter().map(|day| day.total_allocated).sum(),
        total_idle_capacity: allocations.iter().map(|day| day.remaining_capacity).sum(),
    };

    AllocationResult {
        allocations,
        errors,
        unallocated_tasks,
        stats,
    }
}
