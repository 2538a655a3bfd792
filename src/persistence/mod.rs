use crate::calendar::{CalendarConfig, MIN_YEAR};
use chrono::Datelike;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Serialization(err) => Some(err),
            PersistenceError::Io(err) => Some(err),
            PersistenceError::Csv(err) => Some(err),
            PersistenceError::InvalidData(_) => None,
        }
    }
}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Reject calendars that mark the same date as both a holiday and a make-up
/// day, or that carry dates the task parser could never produce.
pub fn validate_calendar_config(config: &CalendarConfig) -> PersistenceResult<()> {
    for date in config.holidays().chain(config.makeup_days()) {
        if date.year() < MIN_YEAR {
            return Err(PersistenceError::InvalidData(format!(
                "calendar date {date} is before {MIN_YEAR}"
            )));
        }
    }
    if let Some(date) = config.holidays().find(|date| config.is_makeup_day(*date)) {
        return Err(PersistenceError::InvalidData(format!(
            "{date} is listed as both a holiday and a make-up day"
        )));
    }
    Ok(())
}

pub mod file;

pub use file::{
    load_calendar_config_from_json, load_tasks_from_text, save_allocations_to_csv,
    save_calendar_config_to_json, save_result_to_json,
};
