//! Turns pasted spreadsheet text into [`RawTask`] rows.
//!
//! Rows are expected to look like `id start end [name|hours] [hours|name] ...`
//! but the delimiter and the position of the hours column vary between
//! sources. Anything that cannot be read is dropped without a diagnostic;
//! callers treat an empty result as "nothing usable was pasted".

use crate::calendar::parse_date;
use crate::hours::Hours;
use crate::task::{Delimiter, RawTask};
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, trace};

const MIN_COLUMNS: usize = 3;
const HEADER_MARKERS: [&str; 2] = ["序号", "ID"];

/// Candidate layouts for the columns after `id start end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    /// `id start end name hours ...`
    NameThenHours,
    /// `id start end hours name ...`
    HoursThenName,
    /// `id start end hours`
    HoursOnly,
    /// `id start end name`
    NameOnly,
    /// `id start end`, or wider rows with no numeric column where one is expected.
    Underspecified,
}

#[derive(Debug, Clone, Copy)]
struct ShapeRule {
    shape: RowShape,
    min_columns: usize,
    max_columns: Option<usize>,
    hours_at: Option<usize>,
    name_at: Option<usize>,
}

// Evaluated top to bottom; the first applicable rule wins.
const SHAPE_TABLE: [ShapeRule; 5] = [
    ShapeRule {
        shape: RowShape::NameThenHours,
        min_columns: 5,
        max_columns: None,
        hours_at: Some(4),
        name_at: Some(3),
    },
    ShapeRule {
        shape: RowShape::HoursThenName,
        min_columns: 5,
        max_columns: None,
        hours_at: Some(3),
        name_at: Some(4),
    },
    ShapeRule {
        shape: RowShape::HoursOnly,
        min_columns: 4,
        max_columns: Some(4),
        hours_at: Some(3),
        name_at: None,
    },
    ShapeRule {
        shape: RowShape::NameOnly,
        min_columns: 4,
        max_columns: Some(4),
        hours_at: None,
        name_at: Some(3),
    },
    ShapeRule {
        shape: RowShape::Underspecified,
        min_columns: MIN_COLUMNS,
        max_columns: None,
        hours_at: None,
        name_at: None,
    },
];

/// Result of resolving which column holds the name and which the hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeMatch<'a> {
    pub shape: RowShape,
    pub hours: Option<f64>,
    pub name: Option<&'a str>,
}

impl ShapeRule {
    fn accepts_width(&self, columns: usize) -> bool {
        columns >= self.min_columns && self.max_columns.is_none_or(|max| columns <= max)
    }

    fn try_match<'a>(&self, tokens: &'a [String]) -> Option<ShapeMatch<'a>> {
        if !self.accepts_width(tokens.len()) {
            return None;
        }
        let hours = match self.hours_at {
            Some(idx) => Some(parse_number(&tokens[idx])?),
            None => None,
        };
        let name = self.name_at.map(|idx| tokens[idx].as_str());
        Some(ShapeMatch {
            shape: self.shape,
            hours,
            name,
        })
    }
}

impl RowShape {
    /// Resolve the column roles of a tokenized row. `None` for rows with
    /// fewer than three columns.
    pub fn classify(tokens: &[String]) -> Option<ShapeMatch<'_>> {
        SHAPE_TABLE.iter().find_map(|rule| rule.try_match(tokens))
    }
}

/// Lenient number reading: the longest numeric prefix wins, so `"4h"` is 4.
/// `Infinity` is recognised so that it can be rejected as non-finite later.
pub fn parse_number(token: &str) -> Option<f64> {
    let s = token.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first().copied(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - (end + 1);
        if digits + frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// A kept row whose end date may still need back-filling.
#[derive(Debug)]
struct PendingRow {
    task: RawTask,
    end: Option<NaiveDate>,
}

fn is_header(first: &str) -> bool {
    HEADER_MARKERS.iter().any(|marker| first.contains(marker))
}

fn parse_line(line_no: usize, line: &str) -> Option<PendingRow> {
    let delimiter = Delimiter::detect(line);
    let tokens = delimiter.split(line);

    if tokens.len() < MIN_COLUMNS {
        trace!(line_no, columns = tokens.len(), "skipping short row");
        return None;
    }
    if is_header(&tokens[0]) {
        trace!(line_no, "skipping header row");
        return None;
    }

    let id = tokens[0].clone();
    let start = parse_date(&tokens[1]);
    let end = parse_date(&tokens[2]);
    let (shape, hours, name) = match RowShape::classify(&tokens) {
        Some(m) => (m.shape, m.hours, m.name.map(str::to_string)),
        None => (RowShape::Underspecified, None, None),
    };

    let hours = hours.filter(|h| h.is_finite() && *h > 0.0).map(Hours::from_f64);
    let (start, hours) = match (id.is_empty(), start, hours) {
        (false, Some(start), Some(hours)) if hours.is_positive() => (start, hours),
        _ => {
            trace!(line_no, ?shape, "skipping row without id, start date or hours");
            return None;
        }
    };

    let mut task = RawTask::new(id, start, end.unwrap_or(start), hours);
    task.name = name.filter(|n| !n.is_empty());
    task.raw_parts = tokens;
    task.delimiter = delimiter;
    Some(PendingRow { task, end })
}

/// Parse a pasted table into tasks, preserving input order.
pub fn parse(text: &str) -> Vec<RawTask> {
    let lines: Vec<&str> = text.trim_start_matches('\u{feff}').trim().split('\n').collect();
    let pending: Vec<PendingRow> = lines
        .par_iter()
        .enumerate()
        .map(|(idx, line)| parse_line(idx + 1, line))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    let latest_end = pending.iter().filter_map(|row| row.end).max();
    let tasks: Vec<RawTask> = pending
        .into_iter()
        .map(|row| {
            let mut task = row.task;
            task.end = row.end.or(latest_end).unwrap_or(task.start);
            task
        })
        .collect();

    debug!(lines = lines.len(), tasks = tasks.len(), "parsed task table");
    tasks
}
