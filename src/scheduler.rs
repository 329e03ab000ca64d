use crate::calendar::{ClassCalendar, HolidayPolicy, RecurringHoliday, weekday_serde};
use crate::error::{PlanWarning, PlanningError};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Sessions in one semester; the last one is always the final exam.
pub const SEMESTER_SESSIONS: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    OrdinaryClass,
    Retrospective,
    PartialTest,
    TestReview,
    FinalExam,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OrdinaryClass => "ordinary_class",
            EventType::Retrospective => "retrospective",
            EventType::PartialTest => "partial_test",
            EventType::TestReview => "test_review",
            EventType::FinalExam => "final_exam",
        }
    }

    /// Label shown in reports and templates.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::OrdinaryClass => "Clase normal",
            EventType::Retrospective => "Retroalimentación",
            EventType::PartialTest => "Prueba parcial",
            EventType::TestReview => "Revisión de prueba",
            EventType::FinalExam => "Examen final",
        }
    }
}

/// What to do with a test date that is not one of the generated session dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestAlignment {
    /// Warn and place no test for that date.
    #[default]
    Strict,
    /// Move the session of the week containing the date onto the test date.
    Snap,
}

impl TestAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestAlignment::Strict => "strict",
            TestAlignment::Snap => "snap",
        }
    }
}

impl std::str::FromStr for TestAlignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TestAlignment::Strict),
            "snap" => Ok(TestAlignment::Snap),
            other => Err(format!("unknown test alignment '{other}' (expected strict or snap)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerOptions {
    #[serde(default)]
    pub holiday_policy: HolidayPolicy,
    #[serde(default)]
    pub test_alignment: TestAlignment,
}

/// Calendar inputs of one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(with = "weekday_serde")]
    pub weekday: Weekday,
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub tests: Vec<NaiveDate>,
    pub final_exam: NaiveDate,
}

impl SemesterDates {
    /// Merge every occurrence of `recurring` from the start year through the
    /// year of the end date or final exam, whichever is later.
    pub fn with_recurring_holidays(mut self, recurring: &[RecurringHoliday]) -> Self {
        if recurring.is_empty() {
            return self;
        }
        let mut calendar = ClassCalendar::custom(self.weekday, self.holidays.iter().copied());
        let last_year = self.end.max(self.final_exam).year();
        for &holiday in recurring {
            calendar.add_recurring_holiday(holiday, self.start.year(), last_year);
        }
        self.holidays = calendar.holidays().clone();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSkeleton {
    pub ordinal: usize,
    pub date: NaiveDate,
    pub event: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_number: Option<usize>,
    #[serde(default)]
    pub holiday_overlap: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub sessions: Vec<SessionSkeleton>,
    #[serde(default)]
    pub warnings: Vec<PlanWarning>,
}

impl ScheduleOutcome {
    /// Ordinals still holding an ordinary class, ascending.
    pub fn ordinary_ordinals(&self) -> Vec<usize> {
        self.sessions
            .iter()
            .filter(|s| s.event == EventType::OrdinaryClass)
            .map(|s| s.ordinal)
            .collect()
    }

    pub fn ordinary_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.event == EventType::OrdinaryClass)
            .count()
    }

    pub fn session(&self, ordinal: usize) -> Option<&SessionSkeleton> {
        ordinal
            .checked_sub(1)
            .and_then(|idx| self.sessions.get(idx))
    }
}

/// Build the typed 17-session skeleton for a semester.
pub fn schedule(
    dates: &SemesterDates,
    options: &SchedulerOptions,
) -> Result<ScheduleOutcome, PlanningError> {
    let calendar = ClassCalendar::custom(dates.weekday, dates.holidays.iter().copied());
    let generated = calendar.session_dates(dates.start, SEMESTER_SESSIONS, options.holiday_policy)?;

    let mut sessions: Vec<SessionSkeleton> = generated
        .iter()
        .enumerate()
        .map(|(idx, &date)| SessionSkeleton {
            ordinal: idx + 1,
            date,
            event: EventType::OrdinaryClass,
            test_number: None,
            holiday_overlap: false,
        })
        .collect();
    let mut warnings = Vec::new();

    let computed_final = place_final_exam(&mut sessions, dates.final_exam, &mut warnings);
    let test_ordinals = place_tests(
        &mut sessions,
        &dates.tests,
        computed_final,
        options.test_alignment,
        &mut warnings,
    );
    mark_review_sessions(&mut sessions, &test_ordinals);

    for session in sessions.iter_mut() {
        session.holiday_overlap = calendar.is_holiday(session.date);
    }

    if let Some(late) = sessions.iter().find(|s| s.date > dates.end) {
        warnings.push(PlanWarning::SessionsPastEnd {
            end: dates.end,
            first_ordinal: late.ordinal,
        });
    }

    let outcome = ScheduleOutcome { sessions, warnings };
    for warning in &outcome.warnings {
        warn!(%warning, "schedule adjusted");
    }
    let ordinary = outcome.ordinary_count();
    debug!(
        ordinary,
        tests = test_ordinals.len(),
        holidays = outcome.sessions.iter().filter(|s| s.holiday_overlap).count(),
        "built session skeleton"
    );
    if ordinary == 0 {
        return Err(PlanningError::NoOrdinarySessions);
    }
    Ok(outcome)
}

/// Force the last session to be the final exam; returns the computed date it replaced.
fn place_final_exam(
    sessions: &mut [SessionSkeleton],
    final_exam: NaiveDate,
    warnings: &mut Vec<PlanWarning>,
) -> NaiveDate {
    let last_class = sessions[SEMESTER_SESSIONS - 2].date;
    let last = &mut sessions[SEMESTER_SESSIONS - 1];
    let computed = last.date;
    last.event = EventType::FinalExam;
    if final_exam != computed {
        warnings.push(PlanWarning::FinalExamRealigned {
            computed,
            requested: final_exam,
        });
        last.date = final_exam;
    }
    if final_exam <= last_class {
        warnings.push(PlanWarning::FinalExamOutOfOrder {
            final_exam,
            last_class,
        });
    }
    computed
}

fn place_tests(
    sessions: &mut [SessionSkeleton],
    tests: &[NaiveDate],
    computed_final: NaiveDate,
    alignment: TestAlignment,
    warnings: &mut Vec<PlanWarning>,
) -> Vec<usize> {
    let final_exam = sessions[SEMESTER_SESSIONS - 1].date;
    // Snapping rewrites session dates; resolve every test against the calendar as generated.
    let generated: Vec<NaiveDate> = sessions[..SEMESTER_SESSIONS - 1]
        .iter()
        .map(|s| s.date)
        .collect();
    let mut ordinals = Vec::with_capacity(tests.len());

    for (idx, &date) in tests.iter().enumerate() {
        let test_number = idx + 1;
        if date == final_exam || date == computed_final {
            warnings.push(PlanWarning::TestOnFinalExam { test_number, date });
            continue;
        }

        let exact = generated
            .iter()
            .position(|&d| d == date)
            .map(|pos| pos + 1);
        let (ordinal, snapped) = match (exact, alignment) {
            (Some(ordinal), _) => (ordinal, false),
            (None, TestAlignment::Strict) => {
                warnings.push(PlanWarning::TestDateNotInSchedule { test_number, date });
                continue;
            }
            (None, TestAlignment::Snap) => match snap_ordinal(&generated, date) {
                Some(ordinal) => (ordinal, true),
                None => {
                    warnings.push(PlanWarning::TestDateNotInSchedule { test_number, date });
                    continue;
                }
            },
        };

        let session = &mut sessions[ordinal - 1];
        if session.event == EventType::PartialTest {
            warnings.push(PlanWarning::DuplicateTestDate {
                test_number,
                ordinal,
            });
            continue;
        }
        if snapped {
            warnings.push(PlanWarning::TestDateSnapped {
                test_number,
                requested: date,
                ordinal,
                replaced: session.date,
            });
            session.date = date;
        }
        session.event = EventType::PartialTest;
        session.test_number = Some(test_number);
        ordinals.push(ordinal);
    }
    ordinals
}

/// Ordinal of the class whose week (its date plus six days) contains `date`.
fn snap_ordinal(classes: &[NaiveDate], date: NaiveDate) -> Option<usize> {
    let pos = classes.iter().rposition(|&class| class <= date)?;
    if date >= classes[pos] + Duration::days(7) {
        return None;
    }
    Some(pos + 1)
}

fn mark_review_sessions(sessions: &mut [SessionSkeleton], test_ordinals: &[usize]) {
    for &ordinal in test_ordinals {
        let idx = ordinal - 1;
        if idx > 0 && sessions[idx - 1].event == EventType::OrdinaryClass {
            sessions[idx - 1].event = EventType::Retrospective;
        }
        if ordinal < SEMESTER_SESSIONS && sessions[idx + 1].event == EventType::OrdinaryClass {
            sessions[idx + 1].event = EventType::TestReview;
        }
    }
}
