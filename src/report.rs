//! Renderings of a [`SemesterPlan`]: the plain-text report, the flat
//! placeholder map used to fill document templates, and polars summaries.

use crate::calendar::weekday_name;
use crate::planner::{LessonPlan, SemesterPlan, SessionPlan};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const HOLIDAY_WARNING: &str =
    "¡Advertencia! Esta sesión coincide con un feriado. Reagendar si es necesario.";

const UNASSIGNED_LABEL: &str = "Sin contenido asignado";

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn join_dates<'a>(dates: impl IntoIterator<Item = &'a NaiveDate>) -> String {
    dates
        .into_iter()
        .map(|d| fmt_date(*d))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human-readable semester report.
pub fn render_text_report(plan: &SemesterPlan) -> String {
    let wide = "=".repeat(90);
    let narrow = "-".repeat(60);
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(out, "\n📋 PLANIFICACIÓN SEMESTRAL");
    let _ = writeln!(out, "{wide}");
    let _ = writeln!(
        out,
        "PERÍODO: {} al {}",
        fmt_date(plan.start),
        fmt_date(plan.end)
    );
    let _ = writeln!(out, "DÍA DE CLASE: {}", weekday_name(plan.weekday));
    if !plan.holidays.is_empty() {
        let _ = writeln!(out, "FERIADOS: {}", join_dates(&plan.holidays));
    }
    if !plan.tests.is_empty() {
        let _ = writeln!(out, "PRUEBAS: {}", join_dates(&plan.tests));
    }
    let _ = writeln!(out, "EXAMEN FINAL: {}", fmt_date(plan.final_exam));
    let _ = writeln!(out, "\n{}", "-".repeat(90));
    let _ = writeln!(out, "UNIDADES PROGRAMADAS:");
    for unit in &plan.units {
        let _ = writeln!(out, "{}. {}", unit.index + 1, unit.title);
        for line in &unit.lines {
            let _ = writeln!(out, "   - {line}");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{wide}");
    let _ = writeln!(out, "\n📅 SESIONES DEL SEMESTRE:");

    for session in &plan.sessions {
        let _ = writeln!(
            out,
            "\n🔵 SESIÓN {:02} | {} | {}",
            session.ordinal,
            fmt_date(session.date),
            session.title()
        );
        let _ = writeln!(out, "{narrow}");
        write_session_body(&mut out, session);
        if session.holiday_overlap {
            let _ = writeln!(out, " ⚠️ {HOLIDAY_WARNING}");
        }
        let _ = writeln!(out, "{narrow}");
    }

    if !plan.warnings.is_empty() {
        let _ = writeln!(out, "\n{wide}");
        let _ = writeln!(out, "ADVERTENCIAS:");
        for warning in &plan.warnings {
            let _ = writeln!(out, " - {warning}");
        }
    }
    out
}

fn write_session_body(out: &mut String, session: &SessionPlan) {
    if let Some(lesson) = &session.lesson {
        let _ = writeln!(out, "UNIDAD : {}", lesson.unit);
        let _ = writeln!(out, "CONTENIDO: {}", lesson.content);
        let _ = writeln!(out, "OBJETIVO: {}", lesson.objective);
        let _ = writeln!(out, "Nivel Bloom: {}", lesson.level.label());
        let _ = writeln!(out, "Estrategias de aprendizaje: {}", lesson.activity);
        let _ = writeln!(out, "Retroalimentación: {}", lesson.phases.feedback);
        let _ = writeln!(out, "Introducción: {}", lesson.phases.introduction);
        let _ = writeln!(out, "Inicio: {}", lesson.phases.opening);
        let _ = writeln!(out, "Desarrollo: {}", lesson.phases.development);
        let _ = writeln!(out, "Cierre: {}", lesson.phases.closing);
        let _ = writeln!(out, "Recursos: {}", lesson.resources);
        let _ = writeln!(out, "Evaluación: {}", lesson.assessment);
    } else if session.block.as_ref().is_some_and(|b| b.is_unassigned()) {
        let _ = writeln!(out, "UNIDAD : {UNASSIGNED_LABEL}");
    }
}

/// Flat `KEY -> value` map for document templates.
///
/// Every session contributes the same set of `SESSION_<n>_<FIELD>` keys;
/// fields that do not apply to the session are empty strings.
pub fn placeholder_map(plan: &SemesterPlan) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert("START_DATE".to_string(), fmt_date(plan.start));
    map.insert("END_DATE".to_string(), fmt_date(plan.end));
    map.insert("WEEKDAY".to_string(), weekday_name(plan.weekday).to_string());
    map.insert("HOLIDAYS".to_string(), join_dates(&plan.holidays));
    map.insert("TESTS".to_string(), join_dates(&plan.tests));
    map.insert("FINAL_EXAM_DATE".to_string(), fmt_date(plan.final_exam));

    for session in &plan.sessions {
        for (field, value) in session_fields(session) {
            map.insert(format!("SESSION_{}_{field}", session.ordinal), value);
        }
    }
    map
}

fn session_fields(session: &SessionPlan) -> [(&'static str, String); 17] {
    let lesson = session.lesson.as_ref();
    let text = |f: fn(&LessonPlan) -> &str| lesson.map(|l| f(l).to_string()).unwrap_or_default();
    let unit = match (&session.lesson, &session.block) {
        (Some(lesson), _) => lesson.unit.clone(),
        (None, Some(block)) if block.is_unassigned() => UNASSIGNED_LABEL.to_string(),
        _ => String::new(),
    };
    let warning = if session.holiday_overlap {
        HOLIDAY_WARNING.to_string()
    } else {
        String::new()
    };
    [
        ("DATE", fmt_date(session.date)),
        ("EVENT", session.title()),
        ("UNIT", unit),
        ("CONTENT", text(|l| &l.content)),
        ("OBJECTIVE", text(|l| &l.objective)),
        ("LEVEL", text(|l| l.level.label())),
        ("VERB", text(|l| &l.verb)),
        ("CONCEPT", text(|l| &l.concept)),
        ("ACTIVITY", text(|l| &l.activity)),
        ("FEEDBACK", text(|l| &l.phases.feedback)),
        ("INTRODUCTION", text(|l| &l.phases.introduction)),
        ("OPENING", text(|l| &l.phases.opening)),
        ("DEVELOPMENT", text(|l| &l.phases.development)),
        ("CLOSING", text(|l| &l.phases.closing)),
        ("RESOURCES", text(|l| &l.resources)),
        ("ASSESSMENT", text(|l| &l.assessment)),
        ("WARNING", warning),
    ]
}

// polars stores dates as days since 1970-01-01, which is also NaiveDate::default()
fn epoch_days(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

/// One row per session: ordinal, date, event, unit, level, verb, concept, holiday.
pub fn session_table(plan: &SemesterPlan) -> PolarsResult<DataFrame> {
    let sessions = &plan.sessions;
    let ordinals: Vec<u32> = sessions.iter().map(|s| s.ordinal as u32).collect();
    let dates: Vec<i32> = sessions.iter().map(|s| epoch_days(s.date)).collect();
    let events: Vec<String> = sessions.iter().map(SessionPlan::title).collect();
    let units: Vec<Option<String>> = sessions
        .iter()
        .map(|s| s.block.as_ref().map(|b| b.title.clone()))
        .collect();
    let lesson_field = |f: fn(&LessonPlan) -> String| -> Vec<Option<String>> {
        sessions.iter().map(|s| s.lesson.as_ref().map(f)).collect()
    };
    let levels = lesson_field(|l| l.level.label().to_string());
    let verbs = lesson_field(|l| l.verb.clone());
    let concepts = lesson_field(|l| l.concept.clone());
    let holidays: Vec<bool> = sessions.iter().map(|s| s.holiday_overlap).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("session"), ordinals).into_column(),
        Series::new(PlSmallStr::from_static("date"), dates)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("event"), events).into_column(),
        Series::new(PlSmallStr::from_static("unit"), units).into_column(),
        Series::new(PlSmallStr::from_static("level"), levels).into_column(),
        Series::new(PlSmallStr::from_static("verb"), verbs).into_column(),
        Series::new(PlSmallStr::from_static("concept"), concepts).into_column(),
        Series::new(PlSmallStr::from_static("holiday"), holidays).into_column(),
    ])
}

/// One row per unit: how many lines it has and how many classes teach it.
pub fn unit_summary(plan: &SemesterPlan) -> PolarsResult<DataFrame> {
    let numbers: Vec<u32> = plan.units.iter().map(|u| u.index as u32 + 1).collect();
    let titles: Vec<String> = plan.units.iter().map(|u| u.title.clone()).collect();
    let lines: Vec<u32> = plan.units.iter().map(|u| u.line_count() as u32).collect();
    let sessions: Vec<u32> = plan
        .units
        .iter()
        .map(|u| plan.sessions_for_unit(u.index) as u32)
        .collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("unit"), numbers).into_column(),
        Series::new(PlSmallStr::from_static("title"), titles).into_column(),
        Series::new(PlSmallStr::from_static("lines"), lines).into_column(),
        Series::new(PlSmallStr::from_static("sessions"), sessions).into_column(),
    ])
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Boolean(v) => if *v { "sí" } else { "" }.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Date(days) => NaiveDate::default()
            .checked_add_signed(chrono::Duration::days(*days as i64))
            .map(fmt_date)
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Box-drawn text table for terminal output.
pub fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            let pad = widths[ci].saturating_sub(cell.chars().count());
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}
