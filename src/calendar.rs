use crate::error::PlanningError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Upper bound on day-steps when scanning for class dates.
pub const MAX_SCAN_DAYS: u32 = 1000;

/// How holidays affect the generated session dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayPolicy {
    /// Keep the weekly cadence; holiday sessions are only flagged.
    #[default]
    Flag,
    /// Do not hold sessions on holidays; later sessions shift one week.
    Skip,
}

impl HolidayPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayPolicy::Flag => "flag",
            HolidayPolicy::Skip => "skip",
        }
    }
}

impl std::str::FromStr for HolidayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flag" => Ok(HolidayPolicy::Flag),
            "skip" => Ok(HolidayPolicy::Skip),
            other => Err(format!("unknown holiday policy '{other}' (expected flag or skip)")),
        }
    }
}

/// A holiday observed on the same month and day every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringHoliday {
    pub month: u32,
    pub day: u32,
}

/// Weekly class calendar: one class weekday plus a set of holidays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCalendar {
    class_day: Weekday,
    holidays: BTreeSet<NaiveDate>,
}

impl ClassCalendar {
    pub fn custom<I>(class_day: Weekday, holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            class_day,
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Holidays in ascending order
    pub fn holidays(&self) -> &BTreeSet<NaiveDate> {
        &self.holidays
    }

    /// Add `holiday` for every year from `start_year` to `end_year` inclusive.
    /// Dates that do not exist in a given year (29 February) are skipped.
    pub fn add_recurring_holiday(
        &mut self,
        holiday: RecurringHoliday,
        start_year: i32,
        end_year: i32,
    ) {
        for year in start_year..=end_year {
            if let Some(date) = NaiveDate::from_ymd_opt(year, holiday.month, holiday.day) {
                self.holidays.insert(date);
            }
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_class_day(&self, date: NaiveDate) -> bool {
        date.weekday() == self.class_day
    }

    /// Collect `count` class dates starting at `start`.
    ///
    /// Walks one day at a time; gives up after [`MAX_SCAN_DAYS`] steps so a
    /// holiday list that blocks every class day cannot loop forever.
    pub fn session_dates(
        &self,
        start: NaiveDate,
        count: usize,
        policy: HolidayPolicy,
    ) -> Result<Vec<NaiveDate>, PlanningError> {
        let mut dates = Vec::with_capacity(count);
        let mut current = start;
        let mut steps = 0;

        while dates.len() < count {
            if steps >= MAX_SCAN_DAYS {
                return Err(PlanningError::WeekdayScanExhausted {
                    start,
                    weekday: self.class_day,
                    wanted: count,
                    found: dates.len(),
                    steps,
                });
            }
            if self.is_class_day(current)
                && !(policy == HolidayPolicy::Skip && self.is_holiday(current))
            {
                dates.push(current);
            }
            current = current + Duration::days(1);
            steps += 1;
        }
        Ok(dates)
    }
}

/// Parse a weekday given in Spanish ("lunes", "miércoles") or English ("monday", "Tue").
pub fn parse_weekday(input: &str) -> Result<Weekday, PlanningError> {
    let lowered = input.trim().to_lowercase();
    let weekday = match lowered.as_str() {
        "lunes" => Weekday::Mon,
        "martes" => Weekday::Tue,
        "miércoles" | "miercoles" => Weekday::Wed,
        "jueves" => Weekday::Thu,
        "viernes" => Weekday::Fri,
        "sábado" | "sabado" => Weekday::Sat,
        "domingo" => Weekday::Sun,
        other => other
            .parse::<Weekday>()
            .map_err(|_| PlanningError::InvalidWeekday(input.to_string()))?,
    };
    Ok(weekday)
}

/// Spanish display name used in reports.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// Serde adapter writing weekdays as lowercase Spanish names and reading either language.
pub mod weekday_serde {
    use super::{parse_weekday, weekday_name};
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&weekday_name(*weekday).to_lowercase())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Weekday, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_weekday(&raw).map_err(D::Error::custom)
    }
}
