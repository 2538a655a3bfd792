pub mod allocation;
pub mod calendar;
pub mod frame;
pub mod hours;
pub mod parser;
pub mod persistence;
pub mod result;
pub mod task;

#[cfg(any(feature = "cli", feature = "http_api"))]
pub mod logging;

#[cfg(feature = "http_api")]
pub mod http_api;

pub use allocation::{
    AllocationEngine, AllocationError, AllocationLimits, DAILY_CAPACITY, TaskState, allocate,
};
pub use calendar::{CalendarConfig, CalendarError, DayKind, FieldConfig, enumerate_workdays, is_workday};
pub use hours::Hours;
pub use parser::parse;
pub use result::{AllocationResult, AllocationStats, DayAllocation, TaskShare, UnallocatedTask};
pub use task::{Delimiter, RawTask};
