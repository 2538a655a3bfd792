//! Greedy earliest-deadline-first packing of task hours into workdays.

use crate::calendar::{CalendarConfig, enumerate_workdays};
use crate::hours::Hours;
use crate::result::{AllocationResult, DayAllocation, TaskShare, aggregate};
use crate::task::RawTask;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Hours available on every workday.
pub const DAILY_CAPACITY: Hours = Hours::from_hundredths(800);

/// Roughly ten years of calendar days.
pub const DEFAULT_MAX_SPAN_DAYS: i64 = 3660;

pub const MAX_SPAN_ENV: &str = "WORKHOUR_MAX_SPAN_DAYS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLimits {
    /// Upper bound on `max_end - min_start + 1` across active tasks.
    pub max_span_days: i64,
}

impl Default for AllocationLimits {
    fn default() -> Self {
        Self {
            max_span_days: DEFAULT_MAX_SPAN_DAYS,
        }
    }
}

impl AllocationLimits {
    /// Reads [`MAX_SPAN_ENV`]; unset or invalid values fall back to the default.
    pub fn from_env() -> Self {
        match std::env::var(MAX_SPAN_ENV) {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(days) if days > 0 => Self {
                    max_span_days: days,
                },
                _ => {
                    warn!(value = %raw, env = MAX_SPAN_ENV, "ignoring invalid span limit");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    SpanTooLong {
        start: NaiveDate,
        end: NaiveDate,
        days: i64,
        limit: i64,
    },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::SpanTooLong {
                start,
                end,
                days,
                limit,
            } => write!(
                f,
                "task dates span {days} days ({start} ~ {end}), more than the limit of {limit}"
            ),
        }
    }
}

impl std::error::Error for AllocationError {}

/// Per-run bookkeeping for one active task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskState {
    /// Position of the task in the parsed input; also the tie-breaker.
    pub index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub original: Hours,
    pub remaining: Hours,
}

impl TaskState {
    fn from_task(index: usize, task: &RawTask) -> Self {
        Self {
            index,
            start: task.start,
            end: task.end,
            original: task.hours,
            remaining: task.hours,
        }
    }

    pub fn allocated(&self) -> Hours {
        self.original - self.remaining
    }

    pub fn is_candidate(&self, day: NaiveDate) -> bool {
        self.remaining.is_positive() && self.start <= day && day <= self.end
    }

    /// Take as much of `capacity` as this task still needs. Returns the new
    /// state and the hours taken.
    pub fn step(self, capacity: Hours) -> (TaskState, Hours) {
        let taken = self.remaining.min(capacity);
        let next = TaskState {
            remaining: self.remaining - taken,
            ..self
        };
        (next, taken)
    }
}

pub struct AllocationEngine<'a> {
    tasks: &'a [RawTask],
    config: &'a CalendarConfig,
    limits: AllocationLimits,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(tasks: &'a [RawTask], config: &'a CalendarConfig) -> Self {
        Self {
            tasks,
            config,
            limits: AllocationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: AllocationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn run(&self) -> Result<AllocationResult, AllocationError> {
        let mut states: Vec<TaskState> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.is_active())
            .map(|(index, task)| TaskState::from_task(index, task))
            .collect();

        let Some((start, end)) = Self::date_bounds(&states) else {
            debug!(tasks = self.tasks.len(), "no active tasks to allocate");
            return Ok(aggregate(self.tasks, &states, Vec::new()));
        };

        let days = (end - start).num_days() + 1;
        if days > self.limits.max_span_days {
            return Err(AllocationError::SpanTooLong {
                start,
                end,
                days,
                limit: self.limits.max_span_days,
            });
        }

        let workdays = enumerate_workdays(start, end, self.config);
        let mut allocations = Vec::with_capacity(workdays.len());
        for day in workdays {
            allocations.push(self.fill_day(day, &mut states));
        }

        let result = aggregate(self.tasks, &states, allocations);
        debug!(
            tasks = self.tasks.len(),
            active = states.len(),
            workdays = result.allocations.len(),
            unallocated = result.unallocated_tasks.len(),
            "allocation finished"
        );
        Ok(result)
    }

    fn date_bounds(states: &[TaskState]) -> Option<(NaiveDate, NaiveDate)> {
        let start = states.iter().map(|state| state.start).min()?;
        let end = states.iter().map(|state| state.end).max()?;
        Some((start, end))
    }

    fn fill_day(&self, day: NaiveDate, states: &mut [TaskState]) -> DayAllocation {
        let mut candidates: Vec<usize> = states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_candidate(day))
            .map(|(slot, _)| slot)
            .collect();
        candidates.sort_by_key(|&slot| (states[slot].end, states[slot].index));

        let mut capacity = DAILY_CAPACITY;
        let mut shares = Vec::new();
        for slot in candidates {
            if !capacity.is_positive() {
                break;
            }
            let (next, taken) = states[slot].step(capacity);
            states[slot] = next;
            capacity = capacity - taken;
            if taken.is_positive() {
                shares.push(TaskShare {
                    index: next.index,
                    id: self.tasks[next.index].id.clone(),
                    hours: taken,
                });
            }
        }

        DayAllocation::from_shares(day, shares)
    }
}

/// Allocate with the default limits.
pub fn allocate(
    tasks: &[RawTask],
    config: &CalendarConfig,
) -> Result<AllocationResult, AllocationError> {
    AllocationEngine::new(tasks, config).run()
}
