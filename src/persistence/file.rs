use super::{PersistenceError, PersistenceResult};
use crate::calendar::CalendarConfig;
use crate::parser;
use crate::result::{AllocationResult, DayAllocation};
use crate::task::RawTask;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

pub fn load_calendar_config_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<CalendarConfig> {
    let file = File::open(path)?;
    let config: CalendarConfig = serde_json::from_reader(file)?;
    super::validate_calendar_config(&config)?;
    Ok(config)
}

pub fn save_calendar_config_to_json<P: AsRef<Path>>(
    config: &CalendarConfig,
    path: P,
) -> PersistenceResult<()> {
    super::validate_calendar_config(config)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), config)?;
    Ok(())
}

pub fn save_result_to_json<P: AsRef<Path>>(
    result: &AllocationResult,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), result)?;
    Ok(())
}

/// Read a task table from a text file. A file with no usable rows is an error
/// here, unlike [`parser::parse`], because there is nothing left to allocate.
pub fn load_tasks_from_text<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<RawTask>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let tasks = parser::parse(&text);
    if tasks.is_empty() {
        return Err(PersistenceError::InvalidData(format!(
            "no usable rows in {}",
            path.display()
        )));
    }
    debug!(path = %path.display(), tasks = tasks.len(), "loaded task table");
    Ok(tasks)
}

#[derive(Serialize)]
pub(crate) struct DayCsvRecord {
    pub(crate) date: String,
    pub(crate) day_of_week: String,
    pub(crate) task_ids: String,
    pub(crate) total_allocated: f64,
    pub(crate) remaining_capacity: f64,
}

impl From<&DayAllocation> for DayCsvRecord {
    fn from(day: &DayAllocation) -> Self {
        Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            day_of_week: day.day_of_week.clone(),
            task_ids: day.task_ids.join(";"),
            total_allocated: day.total_allocated.as_f64(),
            remaining_capacity: day.remaining_capacity.as_f64(),
        }
    }
}

/// Write one CSV row per workday. Task ids within a day are joined by `;`.
pub fn save_allocations_to_csv<P: AsRef<Path>>(
    result: &AllocationResult,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for day in &result.allocations {
        writer.serialize(DayCsvRecord::from(day))?;
    }
    writer.flush()?;
    Ok(())
}
