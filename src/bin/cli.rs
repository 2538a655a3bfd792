use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use workhour_allocator::calendar::{parse_config_date, weekday_label};
use workhour_allocator::frame::{
    calendar_frame, date_from_i32, days_frame, tasks_frame, unallocated_frame,
};
use workhour_allocator::logging::{LogFormat, init_logging};
use workhour_allocator::persistence::{
    load_calendar_config_from_json, load_tasks_from_text, save_allocations_to_csv,
    save_calendar_config_to_json, save_result_to_json, validate_calendar_config,
};
use workhour_allocator::{
    AllocationEngine, AllocationLimits, AllocationResult, CalendarConfig, RawTask, parse,
};

const EXAMPLE_TABLE: &str = "20250001\t2025/11/10\t2025/11/17\t需求分析\t4.0
20250002\t2025/11/10\t2025/11/17\t前端开发\t12.0
20250003\t2025/11/12\t2025/11/15\t后端开发\t8.0
20250004\t2025/11/10\t2025/11/17\t测试用例\t2.0";

const NO_ROWS: &str = "No usable rows found; check the input format.";

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::Float64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Date(days) => date_from_i32(*days)
            .map(|d| d.to_string())
            .unwrap_or_default(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cells: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, values: &[String]| {
        out.push('|');
        for (ci, s) in values.iter().enumerate() {
            out.push(' ');
            out.push_str(s);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(s.chars().count())));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &col_names);
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_row(&mut out, row);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_frame(frame: polars::prelude::PolarsResult<DataFrame>) {
    match frame {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error: {}", e),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  example                            Load the built-in example table\n  load <path>                        Load a task table from a text file\n  paste                              Read table rows until a line with a single '.'\n  tasks                              Show parsed tasks\n  run                                Allocate hours over workdays\n  day <date>                         Show one day of the last allocation\n  unallocated                        Show tasks whose hours did not fit\n  calendar show|preset|clear         Inspect or reset holiday overrides\n  calendar load|save <path>          Read or write the calendar as JSON\n  holiday add|rm <date>              Mark or unmark a holiday\n  makeup add|rm <date>               Mark or unmark a make-up workday\n  toggle <date>                      Cycle a date through its override states\n  export csv|json <path>             Write the last allocation to a file\n  quit|exit                          Exit"
    );
}

struct Session {
    config: CalendarConfig,
    limits: AllocationLimits,
    tasks: Vec<RawTask>,
    result: Option<AllocationResult>,
}

impl Session {
    fn new() -> Self {
        Self {
            config: CalendarConfig::default(),
            limits: AllocationLimits::from_env(),
            tasks: Vec::new(),
            result: None,
        }
    }

    fn set_tasks(&mut self, tasks: Vec<RawTask>) {
        self.result = None;
        if tasks.is_empty() {
            println!("{}", NO_ROWS);
            self.tasks = tasks;
            return;
        }
        println!("Loaded {} task(s).", tasks.len());
        self.tasks = tasks;
        print_frame(tasks_frame(&self.tasks));
    }

    fn set_config(&mut self, config: CalendarConfig, message: &str) {
        self.config = config;
        self.result = None;
        println!("{}", message);
    }

    fn run(&mut self) {
        if self.tasks.is_empty() {
            println!("{}", NO_ROWS);
            return;
        }
        match AllocationEngine::new(&self.tasks, &self.config)
            .with_limits(self.limits)
            .run()
        {
            Ok(result) => {
                println!("Allocated ({})", result.stats.to_cli_summary());
                print_frame(days_frame(&result));
                for error in &result.errors {
                    println!("{}", error);
                }
                self.result = Some(result);
            }
            Err(e) => println!("Allocation error: {}", e),
        }
    }

    fn show_day(&self, date: NaiveDate) {
        let Some(result) = &self.result else {
            println!("No allocation yet; type 'run'.");
            return;
        };
        let day = result.day(date);
        println!(
            "{} {} ({})",
            date,
            weekday_label(date),
            self.config.classify(date).as_str()
        );
        for share in &day.shares {
            println!("  {}  {}h", share.id, share.hours);
        }
        println!(
            "  allocated={}h remaining={}h",
            day.total_allocated, day.remaining_capacity
        );
    }

    fn edit_calendar(&mut self, cmd: &str, action: Option<&str>, date_s: Option<&str>) {
        let (Some(action), Some(date_s)) = (action, date_s) else {
            println!("Usage: {} add|rm <date>", cmd);
            return;
        };
        let date = match parse_config_date(date_s) {
            Ok(d) => d,
            Err(e) => {
                println!("Error: {}", e);
                return;
            }
        };
        let mut next = self.config.clone();
        let changed = match (cmd, action) {
            ("holiday", "add") => next.add_holiday(date),
            ("holiday", "rm") => next.remove_holiday(date),
            ("makeup", "add") => next.add_makeup_day(date),
            ("makeup", "rm") => next.remove_makeup_day(date),
            _ => {
                println!("Usage: {} add|rm <date>", cmd);
                return;
            }
        };
        if let Err(e) = validate_calendar_config(&next) {
            println!("Error: {}", e);
            return;
        }
        if changed {
            let kind = next.classify(date).as_str();
            self.set_config(next, &format!("{} is now {}.", date, kind));
        } else {
            println!("{} unchanged.", date);
        }
    }

    fn export(&self, format: Option<&str>, path: Option<&str>) {
        let (Some(format), Some(path)) = (format, path) else {
            println!("Usage: export csv|json <path>");
            return;
        };
        let Some(result) = &self.result else {
            println!("No allocation yet; type 'run'.");
            return;
        };
        let res = match format {
            "csv" => save_allocations_to_csv(result, path),
            "json" => save_result_to_json(result, path),
            _ => {
                println!("Usage: export csv|json <path>");
                return;
            }
        };
        match res {
            Ok(()) => println!("Wrote {}.", path),
            Err(e) => println!("Error: {}", e),
        }
    }
}

fn read_pasted_rows(input: &mut impl BufRead) -> String {
    let mut text = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        if line.trim() == "." {
            break;
        }
        text.push_str(&line);
    }
    text
}

fn main() {
    let _ = init_logging("warn", LogFormat::from_env());

    let mut session = Session::new();
    println!("Work-hour Allocator (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "example" => session.set_tasks(parse(EXAMPLE_TABLE)),
            "load" => match parts.next() {
                Some(path) => match load_tasks_from_text(path) {
                    Ok(tasks) => session.set_tasks(tasks),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: load <path>"),
            },
            "paste" => {
                println!("Paste rows, then a line with a single '.'");
                let text = read_pasted_rows(&mut input);
                session.set_tasks(parse(&text));
            }
            "tasks" => {
                if session.tasks.is_empty() {
                    println!("{}", NO_ROWS);
                } else {
                    print_frame(tasks_frame(&session.tasks));
                }
            }
            "run" => session.run(),
            "day" => match parts.next().map(parse_config_date) {
                Some(Ok(date)) => session.show_day(date),
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: day <date>"),
            },
            "unallocated" => match &session.result {
                Some(result) if result.is_fully_allocated() => {
                    println!("All hours allocated.")
                }
                Some(result) => print_frame(unallocated_frame(result)),
                None => println!("No allocation yet; type 'run'."),
            },
            "calendar" => match (parts.next(), parts.next()) {
                (Some("show"), _) => print_frame(calendar_frame(&session.config)),
                (Some("preset"), _) => {
                    session.set_config(CalendarConfig::preset_2025(), "Calendar reset to the 2025 preset.")
                }
                (Some("clear"), _) => {
                    session.set_config(CalendarConfig::new(), "Calendar overrides cleared.")
                }
                (Some("load"), Some(path)) => match load_calendar_config_from_json(path) {
                    Ok(config) => session.set_config(config, "Calendar loaded."),
                    Err(e) => println!("Error: {}", e),
                },
                (Some("save"), Some(path)) => {
                    match save_calendar_config_to_json(&session.config, path) {
                        Ok(()) => println!("Wrote {}.", path),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: calendar show|preset|clear|load <path>|save <path>"),
            },
            "holiday" | "makeup" => {
                let action = parts.next();
                let date_s = parts.next();
                session.edit_calendar(cmd, action, date_s);
            }
            "toggle" => match parts.next().map(parse_config_date) {
                Some(Ok(date)) => {
                    let next = session.config.toggled(date);
                    let kind = next.classify(date).as_str();
                    session.set_config(next, &format!("{} is now {}.", date, kind));
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: toggle <date>"),
            },
            "export" => {
                let format = parts.next();
                let path = parts.next();
                session.export(format, path);
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
