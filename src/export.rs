//! File import/export: requests and plans as JSON, sessions as CSV,
//! placeholder maps as JSON.

use crate::planner::{GenerationRequest, SemesterPlan, SessionPlan};
use crate::report::{placeholder_map, render_df_as_text_table, session_table, unit_summary};
use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),
}

pub type ExportResult<T> = Result<T, ExportError>;

pub fn load_request_from_json<P: AsRef<Path>>(path: P) -> ExportResult<GenerationRequest> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(io::BufReader::new(file))?)
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &SemesterPlan, path: P) -> ExportResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, plan)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> ExportResult<SemesterPlan> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(io::BufReader::new(file))?)
}

pub fn save_placeholders_to_json<P: AsRef<Path>>(
    plan: &SemesterPlan,
    path: P,
) -> ExportResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &placeholder_map(plan))?;
    Ok(())
}

/// Flat session row; lesson columns are empty for non-class sessions.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCsvRecord {
    pub session: usize,
    pub date: String,
    pub event: String,
    pub holiday: bool,
    pub unit: String,
    pub content: String,
    pub level: String,
    pub verb: String,
    pub concept: String,
    pub objective: String,
    pub activity: String,
    pub resources: String,
    pub assessment: String,
}

impl From<&SessionPlan> for SessionCsvRecord {
    fn from(session: &SessionPlan) -> Self {
        let lesson = session.lesson.as_ref();
        let field = |f: fn(&crate::planner::LessonPlan) -> String| lesson.map(f).unwrap_or_default();
        Self {
            session: session.ordinal,
            date: session.date.format("%Y-%m-%d").to_string(),
            event: session.title(),
            holiday: session.holiday_overlap,
            unit: session
                .block
                .as_ref()
                .map(|b| b.title.clone())
                .unwrap_or_default(),
            content: session
                .block
                .as_ref()
                .map(|b| b.text())
                .unwrap_or_default(),
            level: field(|l| l.level.label().to_string()),
            verb: field(|l| l.verb.clone()),
            concept: field(|l| l.concept.clone()),
            objective: field(|l| l.objective.clone()),
            activity: field(|l| l.activity.clone()),
            resources: field(|l| l.resources.clone()),
            assessment: field(|l| l.assessment.clone()),
        }
    }
}

pub fn write_plan_csv<W: Write>(plan: &SemesterPlan, writer: W) -> ExportResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for session in &plan.sessions {
        writer.serialize(SessionCsvRecord::from(session))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_plan_to_csv<P: AsRef<Path>>(plan: &SemesterPlan, path: P) -> ExportResult<()> {
    let file = File::create(path)?;
    write_plan_csv(plan, file)
}

/// Session table followed by the per-unit summary, as terminal tables.
pub fn plan_tables_as_text(plan: &SemesterPlan) -> ExportResult<String> {
    let sessions = session_table(plan)?;
    let units = unit_summary(plan)?;
    Ok(format!(
        "{}\n{}",
        render_df_as_text_table(&sessions),
        render_df_as_text_table(&units)
    ))
}
