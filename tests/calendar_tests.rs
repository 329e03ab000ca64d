use chrono::{Datelike, Duration, NaiveDate, Weekday};
use semester_planner::PlanningError;
use semester_planner::calendar::{
    ClassCalendar, HolidayPolicy, MAX_SCAN_DAYS, RecurringHoliday, parse_weekday, weekday_name,
};
use semester_planner::scheduler::SemesterDates;
use std::collections::BTreeSet;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn calendar(class_day: Weekday) -> ClassCalendar {
    ClassCalendar::custom(class_day, Vec::new())
}

#[test]
fn session_dates_are_weekly_from_first_class_day() {
    let cal = calendar(Weekday::Mon);
    let dates = cal
        .session_dates(d(2024, 3, 1), 4, HolidayPolicy::Flag)
        .unwrap();
    assert_eq!(
        dates,
        vec![d(2024, 3, 4), d(2024, 3, 11), d(2024, 3, 18), d(2024, 3, 25)]
    );
    assert!(dates.iter().all(|date| date.weekday() == Weekday::Mon));
}

#[test]
fn flag_policy_keeps_holidays_in_sequence() {
    let cal = ClassCalendar::custom(Weekday::Mon, [d(2024, 3, 11)]);
    let dates = cal
        .session_dates(d(2024, 3, 4), 3, HolidayPolicy::Flag)
        .unwrap();
    assert_eq!(dates, vec![d(2024, 3, 4), d(2024, 3, 11), d(2024, 3, 18)]);
    assert!(cal.is_holiday(dates[1]));
}

#[test]
fn skip_policy_shifts_later_sessions() {
    let cal = ClassCalendar::custom(Weekday::Mon, [d(2024, 3, 11)]);
    let dates = cal
        .session_dates(d(2024, 3, 4), 3, HolidayPolicy::Skip)
        .unwrap();
    assert_eq!(dates, vec![d(2024, 3, 4), d(2024, 3, 18), d(2024, 3, 25)]);
}

#[test]
fn skip_policy_gives_up_when_every_class_day_is_a_holiday() {
    // 2024-01-01 is a Monday
    let start = d(2024, 1, 1);
    let weeks = i64::from(MAX_SCAN_DAYS) / 7 + 1;
    let cal = ClassCalendar::custom(
        Weekday::Mon,
        (0..=weeks).map(|week| start + Duration::weeks(week)),
    );

    let err = cal
        .session_dates(start, 17, HolidayPolicy::Skip)
        .unwrap_err();
    match err {
        PlanningError::WeekdayScanExhausted {
            wanted,
            found,
            steps,
            ..
        } => {
            assert_eq!(wanted, 17);
            assert_eq!(found, 0);
            assert_eq!(steps, MAX_SCAN_DAYS);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn recurring_holidays_cover_each_year() {
    let mut cal = calendar(Weekday::Mon);
    cal.add_recurring_holiday(RecurringHoliday { month: 5, day: 1 }, 2024, 2026);
    cal.add_recurring_holiday(RecurringHoliday { month: 2, day: 29 }, 2024, 2026);
    assert_eq!(
        cal.holidays(),
        &BTreeSet::from([d(2024, 2, 29), d(2024, 5, 1), d(2025, 5, 1), d(2026, 5, 1)])
    );
}

#[test]
fn semester_dates_merge_recurring_holidays_across_years() {
    let dates = SemesterDates {
        start: d(2024, 12, 2),
        end: d(2025, 3, 24),
        weekday: Weekday::Mon,
        holidays: BTreeSet::from([d(2025, 2, 17)]),
        tests: Vec::new(),
        final_exam: d(2025, 3, 24),
    };
    let merged = dates.clone().with_recurring_holidays(&[
        RecurringHoliday { month: 12, day: 25 },
        RecurringHoliday { month: 1, day: 1 },
    ]);

    assert_eq!(
        merged.holidays,
        BTreeSet::from([
            d(2024, 1, 1),
            d(2024, 12, 25),
            d(2025, 1, 1),
            d(2025, 2, 17),
            d(2025, 12, 25),
        ])
    );
    assert_eq!(dates.clone().with_recurring_holidays(&[]), dates);
}

#[test]
fn recurring_holiday_reads_from_toml() {
    #[derive(serde::Deserialize)]
    struct Holidays {
        recurring_holidays: Vec<RecurringHoliday>,
    }
    let parsed: Holidays =
        toml::from_str("recurring_holidays = [{ month = 9, day = 18 }]").unwrap();
    assert_eq!(
        parsed.recurring_holidays,
        vec![RecurringHoliday { month: 9, day: 18 }]
    );
}

#[test]
fn weekday_parsing_accepts_spanish_and_english() {
    assert_eq!(parse_weekday("Miércoles").unwrap(), Weekday::Wed);
    assert_eq!(parse_weekday("miercoles").unwrap(), Weekday::Wed);
    assert_eq!(parse_weekday(" SÁBADO ").unwrap(), Weekday::Sat);
    assert_eq!(parse_weekday("tuesday").unwrap(), Weekday::Tue);
    assert_eq!(parse_weekday("Fri").unwrap(), Weekday::Fri);
    assert_eq!(
        parse_weekday("someday").unwrap_err(),
        PlanningError::InvalidWeekday("someday".into())
    );
    assert_eq!(weekday_name(Weekday::Wed), "Miércoles");
}
