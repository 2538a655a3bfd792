use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Earliest year accepted when reading dates out of task tables.
pub const MIN_YEAR: i32 = 2000;

const WEEKDAY_LABELS: [&str; 7] = ["周日", "周一", "周二", "周三", "周四", "周五", "周六"];

/// Column label metadata for the presentation layer. The engine never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub index: usize,
    pub label: String,
    pub visible_in_details: bool,
}

impl FieldConfig {
    pub fn new(index: usize, label: impl Into<String>, visible_in_details: bool) -> Self {
        Self {
            index,
            label: label.into(),
            visible_in_details,
        }
    }
}

/// Holiday and make-up overrides on top of the Monday-to-Friday week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarConfig {
    holidays: BTreeSet<NaiveDate>,
    makeup_days: BTreeSet<NaiveDate>,
    #[serde(default = "preset_field_configs")]
    field_configs: Vec<FieldConfig>,
}

/// Column labels of the preset; also filled into documents saved without any.
fn preset_field_configs() -> Vec<FieldConfig> {
    vec![
        FieldConfig::new(0, "序号", true),
        FieldConfig::new(1, "开始时间", true),
        FieldConfig::new(2, "结束时间", true),
        FieldConfig::new(3, "任务类型", true),
        FieldConfig::new(4, "预估工时", true),
    ]
}

/// How a single date is classified before any allocation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Holiday,
    Makeup,
    Weekend,
    Weekday,
}

impl DayKind {
    pub fn is_workday(self) -> bool {
        matches!(self, DayKind::Makeup | DayKind::Weekday)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayKind::Holiday => "holiday",
            DayKind::Makeup => "makeup",
            DayKind::Weekend => "weekend",
            DayKind::Weekday => "weekday",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    InvalidDate(String),
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::InvalidDate(input) => write!(
                f,
                "invalid date '{input}' (expected YYYY-MM-DD, YYYY/MM/DD or YYYY.MM.DD, year >= {MIN_YEAR})"
            ),
        }
    }
}

impl std::error::Error for CalendarError {}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self::preset_2025()
    }
}

impl CalendarConfig {
    /// Create a calendar with no overrides: plain Monday-to-Friday.
    pub fn new() -> Self {
        Self {
            holidays: BTreeSet::new(),
            makeup_days: BTreeSet::new(),
            field_configs: Vec::new(),
        }
    }

    pub fn custom<I, J>(holidays: I, makeup_days: J) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
        J: IntoIterator<Item = NaiveDate>,
    {
        Self {
            holidays: holidays.into_iter().collect(),
            makeup_days: makeup_days.into_iter().collect(),
            field_configs: Vec::new(),
        }
    }

    /// 2025 public holidays and the weekend days worked in exchange.
    pub fn preset_2025() -> Self {
        const HOLIDAYS: [(u32, u32); 21] = [
            (1, 1),
            (1, 28),
            (1, 29),
            (1, 30),
            (1, 31),
            (2, 1),
            (2, 2),
            (2, 3),
            (2, 4),
            (4, 4),
            (5, 1),
            (5, 2),
            (5, 3),
            (6, 2),
            (10, 1),
            (10, 2),
            (10, 3),
            (10, 4),
            (10, 5),
            (10, 6),
            (10, 7),
        ];
        const MAKEUP_DAYS: [(u32, u32); 5] = [(1, 26), (2, 8), (4, 27), (9, 28), (10, 11)];

        let dates = |pairs: &[(u32, u32)]| -> Vec<NaiveDate> {
            pairs
                .iter()
                .filter_map(|&(month, day)| NaiveDate::from_ymd_opt(2025, month, day))
                .collect()
        };

        let mut config = Self::custom(dates(&HOLIDAYS), dates(&MAKEUP_DAYS));
        config.field_configs = preset_field_configs();
        config
    }

    pub fn holidays(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.holidays.iter().copied()
    }

    pub fn makeup_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.makeup_days.iter().copied()
    }

    pub fn field_configs(&self) -> &[FieldConfig] {
        &self.field_configs
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_makeup_day(&self, date: NaiveDate) -> bool {
        self.makeup_days.contains(&date)
    }

    /// Returns `true` when the date was not already a holiday.
    pub fn add_holiday(&mut self, date: NaiveDate) -> bool {
        self.holidays.insert(date)
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        self.holidays.remove(&date)
    }

    /// Returns `true` when the date was not already a make-up day.
    pub fn add_makeup_day(&mut self, date: NaiveDate) -> bool {
        self.makeup_days.insert(date)
    }

    pub fn remove_makeup_day(&mut self, date: NaiveDate) -> bool {
        self.makeup_days.remove(&date)
    }

    /// Drop every override (column labels included).
    pub fn clear(&mut self) {
        self.holidays.clear();
        self.makeup_days.clear();
        self.field_configs.clear();
    }

    /// Holiday wins over make-up, make-up wins over the weekend rule.
    pub fn classify(&self, date: NaiveDate) -> DayKind {
        if self.is_holiday(date) {
            DayKind::Holiday
        } else if self.is_makeup_day(date) {
            DayKind::Makeup
        } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            DayKind::Weekend
        } else {
            DayKind::Weekday
        }
    }

    pub fn is_workday(&self, date: NaiveDate) -> bool {
        self.classify(date).is_workday()
    }

    /// Cycle one date through its override states and return the new calendar.
    ///
    /// An override is removed first; a date without one flips to the opposite
    /// of its weekday default (weekend becomes make-up, weekday becomes holiday).
    pub fn toggled(&self, date: NaiveDate) -> Self {
        let mut next = self.clone();
        if next.remove_holiday(date) || next.remove_makeup_day(date) {
            return next;
        }
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => next.add_makeup_day(date),
            _ => next.add_holiday(date),
        };
        next
    }

    /// All workdays in `[start, end]`, ascending. Empty when `start > end`.
    pub fn workdays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;

        while current <= end {
            if self.is_workday(current) {
                days.push(current);
            }
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        days
    }

    pub fn count_workdays(&self, start: NaiveDate, end: NaiveDate) -> usize {
        self.workdays_in_range(start, end).len()
    }
}

pub fn is_workday(date: NaiveDate, config: &CalendarConfig) -> bool {
    config.is_workday(date)
}

pub fn enumerate_workdays(
    start: NaiveDate,
    end: NaiveDate,
    config: &CalendarConfig,
) -> Vec<NaiveDate> {
    config.workdays_in_range(start, end)
}

pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize]
}

/// Parse `YYYY-MM-DD`, `YYYY/MM/DD` or `YYYY.MM.DD` (month and day may be
/// unpadded). Dates before [`MIN_YEAR`] are rejected.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let normalized = input.trim().replace(['/', '.'], "-");
    let mut fields = normalized.split('-');
    let year = parse_date_field(fields.next()?, 4)?;
    let month = parse_date_field(fields.next()?, 2)?;
    let day = parse_date_field(fields.next()?, 2)?;
    if fields.next().is_some() {
        return None;
    }

    let year = i32::try_from(year).ok()?;
    if year < MIN_YEAR {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_date_field(field: &str, max_digits: usize) -> Option<u32> {
    if field.is_empty() || field.len() > max_digits || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Strict variant of [`parse_date`] for dates typed into the front ends.
pub fn parse_config_date(input: &str) -> Result<NaiveDate, CalendarError> {
    parse_date(input).ok_or_else(|| CalendarError::InvalidDate(input.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_date_accepts_three_separators() {
        assert_eq!(parse_date("2025-11-10"), Some(d(2025, 11, 10)));
        assert_eq!(parse_date("2025/11/10"), Some(d(2025, 11, 10)));
        assert_eq!(parse_date(" 2025.1.5 "), Some(d(2025, 1, 5)));
    }

    #[test]
    fn parse_date_rejects_garbage_and_old_years() {
        assert_eq!(parse_date("1999-12-31"), None);
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("2025-13-01"), None);
        assert_eq!(parse_date("需求分析"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2025-11-10-01"), None);
    }

    #[test]
    fn weekday_labels_start_on_sunday() {
        assert_eq!(weekday_label(d(2025, 11, 9)), "周日");
        assert_eq!(weekday_label(d(2025, 11, 10)), "周一");
        assert_eq!(weekday_label(d(2025, 11, 15)), "周六");
    }

    #[test]
    fn preset_contains_national_day_and_makeup() {
        let cal = CalendarConfig::preset_2025();
        assert_eq!(cal.classify(d(2025, 10, 1)), DayKind::Holiday);
        assert_eq!(cal.classify(d(2025, 9, 28)), DayKind::Makeup);
        assert_eq!(cal.field_configs().len(), 5);
    }
}
