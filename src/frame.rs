//! Columnar views over parsed tasks and allocation results.
//!
//! These frames feed table rendering in the front ends; nothing in the
//! engine reads them back.

use crate::calendar::{CalendarConfig, weekday_label};
use crate::result::AllocationResult;
use crate::task::RawTask;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

// Days from 0001-01-01 to 1970-01-01, the epoch of polars' Date type.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date_to_i32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Inverse of the Date column encoding, for reading cells back out.
pub fn date_from_i32(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

fn series_from_dates(name: &'static str, dates: impl Iterator<Item = NaiveDate>) -> PolarsResult<Series> {
    let data: Vec<i32> = dates.map(date_to_i32).collect();
    Series::new(PlSmallStr::from_static(name), data).cast(&DataType::Date)
}

/// One row per parsed task, in input order.
pub fn tasks_frame(tasks: &[RawTask]) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(6);

    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("id"), ids).into_column());

    let names: Vec<Option<&str>> = tasks.iter().map(|t| t.name.as_deref()).collect();
    columns.push(Series::new(PlSmallStr::from_static("name"), names).into_column());

    columns.push(series_from_dates("start", tasks.iter().map(|t| t.start))?.into_column());
    columns.push(series_from_dates("end", tasks.iter().map(|t| t.end))?.into_column());

    let hours: Vec<f64> = tasks.iter().map(|t| t.hours.as_f64()).collect();
    columns.push(Series::new(PlSmallStr::from_static("hours"), hours).into_column());

    let widths: Vec<u32> = tasks
        .iter()
        .map(|t| u32::try_from(t.raw_parts.len()).unwrap_or(u32::MAX))
        .collect();
    columns.push(Series::new(PlSmallStr::from_static("columns"), widths).into_column());

    DataFrame::new(columns)
}

/// One row per workday in the allocated range.
pub fn days_frame(result: &AllocationResult) -> PolarsResult<DataFrame> {
    let days = &result.allocations;
    let mut columns: Vec<Column> = Vec::with_capacity(5);

    columns.push(series_from_dates("date", days.iter().map(|d| d.date))?.into_column());

    let labels: Vec<&str> = days.iter().map(|d| d.day_of_week.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("day_of_week"), labels).into_column());

    let task_ids: Vec<String> = days.iter().map(|d| d.task_ids.join(",")).collect();
    columns.push(Series::new(PlSmallStr::from_static("task_ids"), task_ids).into_column());

    let allocated: Vec<f64> = days.iter().map(|d| d.total_allocated.as_f64()).collect();
    columns.push(Series::new(PlSmallStr::from_static("total_allocated"), allocated).into_column());

    let remaining: Vec<f64> = days.iter().map(|d| d.remaining_capacity.as_f64()).collect();
    columns.push(
        Series::new(PlSmallStr::from_static("remaining_capacity"), remaining).into_column(),
    );

    DataFrame::new(columns)
}

/// One row per task left with hours that did not fit.
pub fn unallocated_frame(result: &AllocationResult) -> PolarsResult<DataFrame> {
    let rows = &result.unallocated_tasks;
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    let remaining: Vec<f64> = rows.iter().map(|r| r.remaining.as_f64()).collect();
    let ranges: Vec<&str> = rows.iter().map(|r| r.range.as_str()).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("remaining"), remaining).into_column(),
        Series::new(PlSmallStr::from_static("range"), ranges).into_column(),
    ])
}

/// Every override date in the calendar with its effective classification.
pub fn calendar_frame(config: &CalendarConfig) -> PolarsResult<DataFrame> {
    let mut dates: Vec<NaiveDate> = config.holidays().chain(config.makeup_days()).collect();
    dates.sort_unstable();
    dates.dedup();

    let labels: Vec<&str> = dates.iter().map(|d| weekday_label(*d)).collect();
    let kinds: Vec<&str> = dates.iter().map(|d| config.classify(*d).as_str()).collect();

    DataFrame::new(vec![
        series_from_dates("date", dates.iter().copied())?.into_column(),
        Series::new(PlSmallStr::from_static("day_of_week"), labels).into_column(),
        Series::new(PlSmallStr::from_static("kind"), kinds).into_column(),
    ])
}
