use crate::hours::Hours;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column separator detected for a single input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Tab,
    Pipe,
    Whitespace,
}

impl Delimiter {
    /// Tab beats pipe, pipe beats whitespace.
    pub fn detect(line: &str) -> Self {
        if line.contains('\t') {
            Delimiter::Tab
        } else if line.contains('|') {
            Delimiter::Pipe
        } else {
            Delimiter::Whitespace
        }
    }

    /// Split a row into tokens. Tab and pipe rows keep empty cells so column
    /// indexes stay aligned; whitespace rows collapse runs.
    pub fn split(self, line: &str) -> Vec<String> {
        match self {
            Delimiter::Tab => line.split('\t').map(|s| s.trim().to_string()).collect(),
            Delimiter::Pipe => line.split('|').map(|s| s.trim().to_string()).collect(),
            Delimiter::Whitespace => line.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn separator(self) -> &'static str {
        match self {
            Delimiter::Tab => "\t",
            Delimiter::Pipe => "|",
            Delimiter::Whitespace => " ",
        }
    }
}

/// One accepted row of the task table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub hours: Hours,
    pub raw_parts: Vec<String>,
    pub delimiter: Delimiter,
}

impl RawTask {
    pub fn new(id: impl Into<String>, start: NaiveDate, end: NaiveDate, hours: Hours) -> Self {
        Self {
            id: id.into(),
            name: None,
            start,
            end,
            hours,
            raw_parts: Vec::new(),
            delimiter: Delimiter::Tab,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    /// A task takes part in allocation only when its interval is not inverted.
    pub fn is_active(&self) -> bool {
        self.start <= self.end
    }

    pub fn range_label(&self) -> String {
        format!("{} ~ {}", self.start, self.end)
    }

    /// Re-serialize the original cells with the row's own delimiter.
    pub fn to_line(&self) -> String {
        self.raw_parts.join(self.delimiter.separator())
    }
}

/// Rebuild an input text block from parsed rows.
pub fn render_rows(tasks: &[RawTask]) -> String {
    tasks
        .iter()
        .map(RawTask::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_prefers_tab_then_pipe() {
        assert_eq!(Delimiter::detect("a\tb|c d"), Delimiter::Tab);
        assert_eq!(Delimiter::detect("a|b c"), Delimiter::Pipe);
        assert_eq!(Delimiter::detect("a  b c"), Delimiter::Whitespace);
    }

    #[test]
    fn split_keeps_empty_cells_only_for_explicit_delimiters() {
        assert_eq!(Delimiter::Tab.split("a\t\tc"), vec!["a", "", "c"]);
        assert_eq!(Delimiter::Pipe.split(" a | | c "), vec!["a", "", "c"]);
        assert_eq!(Delimiter::Whitespace.split("  a   b c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_name_is_treated_as_absent() {
        let day = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        let task = RawTask::new("1", day, day, Hours::from_f64(1.0)).with_name("");
        assert_eq!(task.name, None);
        assert_eq!(task.range_label(), "2025-11-10 ~ 2025-11-10");
    }
}
