//! Academic units and the text normalization that turns raw unit content
//! into ordered content lines.

use serde::{Deserialize, Serialize};

/// Unit content as typed by the instructor, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUnit {
    pub title: String,
    #[serde(default)]
    pub raw_content: String,
}

impl RawUnit {
    pub fn new(title: impl Into<String>, raw_content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            raw_content: raw_content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// 0-based position at ingestion.
    pub index: usize,
    pub title: String,
    pub lines: Vec<String>,
}

impl Unit {
    pub fn new(index: usize, title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            index,
            title: title.into(),
            lines,
        }
    }

    /// Normalize raw input. A blank title becomes `Unidad <n>`; blank content
    /// becomes one synthetic line so the unit is never empty.
    pub fn from_raw(index: usize, raw: &RawUnit) -> Self {
        let title = match raw.title.trim() {
            "" => format!("Unidad {}", index + 1),
            t => t.to_string(),
        };
        let mut lines = split_content_lines(&raw.raw_content);
        if lines.is_empty() {
            lines.push(placeholder_line(&title));
        }
        Self { index, title, lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

pub fn placeholder_line(title: &str) -> String {
    format!("Contenido de {title}")
}

pub fn normalize_units(raw: &[RawUnit]) -> Vec<Unit> {
    raw.iter()
        .enumerate()
        .map(|(idx, unit)| Unit::from_raw(idx, unit))
        .collect()
}

/// Split text into content lines at newlines and at `.`, `!` or `?` that end
/// a sentence (followed by whitespace or end of text). Decimal points such as
/// `3.5` do not split.
pub fn split_content_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\n' | '\r' => push_line(&mut lines, &mut current),
            '.' | '!' | '?' => {
                let at_boundary = chars.peek().is_none_or(|next| next.is_whitespace());
                if at_boundary {
                    push_line(&mut lines, &mut current);
                } else {
                    current.push(ch);
                }
            }
            _ => current.push(ch),
        }
    }
    push_line(&mut lines, &mut current);
    lines
}

fn push_line(lines: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
    current.clear();
}

/// Split a whole syllabus into units. Every line that starts with
/// `Unidad <word>` (any case) opens a unit; text before the first heading is
/// ignored.
pub fn parse_syllabus(text: &str) -> Vec<RawUnit> {
    let mut units = Vec::new();
    let mut title: Option<String> = None;
    let mut content: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if is_unit_heading(trimmed) {
            if let Some(done) = title.take() {
                units.push(RawUnit::new(done, content.join("\n")));
                content.clear();
            }
            title = Some(trimmed.to_string());
        } else if title.is_some() && !trimmed.is_empty() {
            content.push(trimmed);
        }
    }
    if let Some(done) = title {
        units.push(RawUnit::new(done, content.join("\n")));
    }
    units
}

fn is_unit_heading(line: &str) -> bool {
    let mut words = line.split_whitespace();
    let first = words.next().map(str::to_lowercase);
    first.as_deref() == Some("unidad") && words.next().is_some()
}
