use chrono::{Datelike, NaiveDate, Weekday};
use workhour_allocator::calendar::{
    CalendarConfig, DayKind, enumerate_workdays, is_workday, parse_config_date,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn plain_calendar_follows_monday_to_friday() {
    let cfg = CalendarConfig::new();
    // 2025-11-15 is a Saturday, 2025-11-16 a Sunday
    assert!(!is_workday(d(2025, 11, 15), &cfg));
    assert!(!is_workday(d(2025, 11, 16), &cfg));
    assert!(is_workday(d(2025, 11, 17), &cfg));
    assert_eq!(d(2025, 11, 17).weekday(), Weekday::Mon);
}

#[test]
fn holiday_wins_over_makeup_and_weekend() {
    let date = d(2025, 11, 15);
    let cfg = CalendarConfig::custom([date], [date]);
    assert_eq!(cfg.classify(date), DayKind::Holiday);
    assert!(!is_workday(date, &cfg));

    let cfg = CalendarConfig::custom(Vec::<NaiveDate>::new(), [date]);
    assert_eq!(cfg.classify(date), DayKind::Makeup);
    assert!(is_workday(date, &cfg));
}

#[test]
fn preset_covers_national_day_and_makeup_weekends() {
    let cfg = CalendarConfig::preset_2025();
    for day in 1..=7 {
        assert!(!is_workday(d(2025, 10, day), &cfg), "2025-10-{day}");
    }
    // Saturday 2025-10-11 is worked
    assert!(is_workday(d(2025, 10, 11), &cfg));
    assert!(is_workday(d(2025, 9, 28), &cfg));
    assert_eq!(cfg.field_configs().len(), 5);
    assert_eq!(CalendarConfig::default(), cfg);
}

#[test]
fn enumerate_workdays_is_ascending_and_inclusive() {
    let cfg = CalendarConfig::new();
    let days = enumerate_workdays(d(2025, 11, 10), d(2025, 11, 17), &cfg);
    assert_eq!(
        days,
        vec![
            d(2025, 11, 10),
            d(2025, 11, 11),
            d(2025, 11, 12),
            d(2025, 11, 13),
            d(2025, 11, 14),
            d(2025, 11, 17),
        ]
    );
    assert!(enumerate_workdays(d(2025, 11, 17), d(2025, 11, 10), &cfg).is_empty());
    assert_eq!(cfg.count_workdays(d(2025, 11, 15), d(2025, 11, 16)), 0);
}

#[test]
fn enumeration_stops_at_the_last_representable_date() {
    let cfg = CalendarConfig::new();
    let last = NaiveDate::MAX;
    let days = enumerate_workdays(last.pred_opt().unwrap(), last, &cfg);
    assert!(days.len() <= 2);
    assert!(days.iter().all(|day| *day <= last));
}

#[test]
fn toggle_cycles_overrides_back_to_normal() {
    let base = CalendarConfig::new();
    let saturday = d(2025, 11, 15);
    let monday = d(2025, 11, 10);

    let worked = base.toggled(saturday);
    assert_eq!(worked.classify(saturday), DayKind::Makeup);
    let back = worked.toggled(saturday);
    assert_eq!(back.classify(saturday), DayKind::Weekend);

    let off = base.toggled(monday);
    assert_eq!(off.classify(monday), DayKind::Holiday);
    assert_eq!(off.toggled(monday), base);

    // the source calendar is never mutated
    assert_eq!(base.classify(monday), DayKind::Weekday);
}

#[test]
fn editing_reports_whether_anything_changed() {
    let mut cfg = CalendarConfig::new();
    assert!(cfg.add_holiday(d(2025, 11, 12)));
    assert!(!cfg.add_holiday(d(2025, 11, 12)));
    assert!(cfg.remove_holiday(d(2025, 11, 12)));
    assert!(!cfg.remove_makeup_day(d(2025, 11, 12)));
    cfg.add_makeup_day(d(2025, 11, 16));
    cfg.clear();
    assert_eq!(cfg, CalendarConfig::new());
}

#[test]
fn config_dates_reject_bad_input() {
    assert_eq!(parse_config_date("2025/11/10").unwrap(), d(2025, 11, 10));
    let err = parse_config_date("1999-01-01").unwrap_err();
    assert!(err.to_string().contains("1999-01-01"));
    assert!(parse_config_date("2025-02-30").is_err());
    assert!(parse_config_date("tomorrow").is_err());
}

#[test]
fn config_json_uses_camel_case_keys() {
    let cfg = CalendarConfig::custom([d(2025, 11, 12)], [d(2025, 11, 15)]);
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json["holidays"][0], "2025-11-12");
    assert_eq!(json["makeupDays"][0], "2025-11-15");

    let back: CalendarConfig =
        serde_json::from_str(r#"{"holidays":["2025-11-12"],"makeupDays":[]}"#).unwrap();
    assert!(back.is_holiday(d(2025, 11, 12)));
    assert_eq!(back.field_configs().len(), 5);
    assert_eq!(back.field_configs()[0].label, "序号");

    let explicit: CalendarConfig =
        serde_json::from_str(r#"{"holidays":[],"makeupDays":[],"fieldConfigs":[]}"#).unwrap();
    assert!(explicit.field_configs().is_empty());
}
