use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fatal problems that stop plan generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("at least one academic unit is required")]
    NoUnits,

    #[error("the session count must be at least 1")]
    ZeroSessions,

    #[error("no ordinary class sessions remain after tests and the final exam are placed")]
    NoOrdinarySessions,

    #[error(
        "could not collect {wanted} {weekday} sessions from {start} within {steps} days (found {found})"
    )]
    WeekdayScanExhausted {
        start: NaiveDate,
        weekday: chrono::Weekday,
        wanted: usize,
        found: usize,
        steps: u32,
    },

    #[error("start date {start} must be before end date {end}")]
    StartNotBeforeEnd { start: NaiveDate, end: NaiveDate },

    #[error("unknown weekday '{0}'")]
    InvalidWeekday(String),

    #[error("invalid taxonomy: {0}")]
    InvalidTaxonomy(String),
}

/// Recoverable conditions reported next to a generated plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    FinalExamRealigned {
        computed: NaiveDate,
        requested: NaiveDate,
    },
    FinalExamOutOfOrder {
        final_exam: NaiveDate,
        last_class: NaiveDate,
    },
    TestDateNotInSchedule {
        test_number: usize,
        date: NaiveDate,
    },
    TestDateSnapped {
        test_number: usize,
        requested: NaiveDate,
        ordinal: usize,
        replaced: NaiveDate,
    },
    TestOnFinalExam {
        test_number: usize,
        date: NaiveDate,
    },
    DuplicateTestDate {
        test_number: usize,
        ordinal: usize,
    },
    AllocationShortfall {
        expected: usize,
        produced: usize,
    },
    AllocationSurplus {
        expected: usize,
        produced: usize,
    },
    EmptyContentBlocks {
        empty_blocks: usize,
        total_lines: usize,
        sessions: usize,
    },
    SessionsPastEnd {
        end: NaiveDate,
        first_ordinal: usize,
    },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::FinalExamRealigned { computed, requested } => write!(
                f,
                "final exam moved from computed session date {computed} to requested date {requested}"
            ),
            PlanWarning::FinalExamOutOfOrder {
                final_exam,
                last_class,
            } => write!(
                f,
                "final exam date {final_exam} is not after session 16 ({last_class})"
            ),
            PlanWarning::TestDateNotInSchedule { test_number, date } => write!(
                f,
                "test {test_number} date {date} does not match any session date; no test session was placed"
            ),
            PlanWarning::TestDateSnapped {
                test_number,
                requested,
                ordinal,
                replaced,
            } => write!(
                f,
                "test {test_number} date {requested} placed on session {ordinal} (was {replaced})"
            ),
            PlanWarning::TestOnFinalExam { test_number, date } => write!(
                f,
                "test {test_number} date {date} falls on the final exam session and was ignored"
            ),
            PlanWarning::DuplicateTestDate {
                test_number,
                ordinal,
            } => write!(
                f,
                "test {test_number} targets session {ordinal}, which already holds a test"
            ),
            PlanWarning::AllocationShortfall { expected, produced } => write!(
                f,
                "{produced} content blocks for {expected} class sessions; the rest have no content assigned"
            ),
            PlanWarning::AllocationSurplus { expected, produced } => write!(
                f,
                "{produced} content blocks for {expected} class sessions; extra blocks were dropped"
            ),
            PlanWarning::EmptyContentBlocks {
                empty_blocks,
                total_lines,
                sessions,
            } => write!(
                f,
                "only {total_lines} content lines for {sessions} class sessions; {empty_blocks} sessions have empty content"
            ),
            PlanWarning::SessionsPastEnd { end, first_ordinal } => write!(
                f,
                "sessions from {first_ordinal} onwards fall after the end date {end}"
            ),
        }
    }
}
