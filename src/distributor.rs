//! Allocation of unit content across a fixed number of class sessions.
//!
//! With at least as many units as sessions, consecutive units are grouped into
//! buckets. With fewer units, units are split into contiguous parts; extra
//! parts go to the units carrying the most lines per part, so larger units get
//! more sessions while equal-sized units take turns in order.

use crate::error::{PlanWarning, PlanningError};
use crate::unit::{Unit, placeholder_line};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Content taught in one ordinary class session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub title: String,
    pub lines: Vec<String>,
    /// First unit contributing to this block; `None` for an unassigned block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_unit_index: Option<usize>,
    /// Every unit contributing to this block, in order.
    pub unit_indices: Vec<usize>,
    /// `(part, parts)` when the block is a slice of a split unit, 1-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<(usize, usize)>,
}

impl ContentBlock {
    pub fn whole(unit: &Unit) -> Self {
        Self {
            title: unit.title.clone(),
            lines: effective_lines(unit),
            source_unit_index: Some(unit.index),
            unit_indices: vec![unit.index],
            part: None,
        }
    }

    /// Block used when a session ends up with nothing allocated.
    pub fn unassigned() -> Self {
        Self {
            title: "Sin contenido asignado".to_string(),
            lines: Vec::new(),
            source_unit_index: None,
            unit_indices: Vec::new(),
            part: None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.source_unit_index.is_none()
    }

    /// Lines joined as one paragraph.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub warnings: Vec<PlanWarning>,
}

/// Split `units` into exactly `sessions` content blocks, preserving order and
/// never dropping or duplicating a line.
pub fn distribute(units: &[Unit], sessions: usize) -> Result<Distribution, PlanningError> {
    if units.is_empty() {
        return Err(PlanningError::NoUnits);
    }
    if sessions == 0 {
        return Err(PlanningError::ZeroSessions);
    }

    let distribution = if units.len() >= sessions {
        Distribution {
            blocks: bucket_units(units, sessions),
            warnings: Vec::new(),
        }
    } else {
        split_units(units, sessions)
    };

    debug!(
        units = units.len(),
        sessions,
        blocks = distribution.blocks.len(),
        "distributed unit content"
    );
    Ok(distribution)
}

fn bucket_units(units: &[Unit], sessions: usize) -> Vec<ContentBlock> {
    let base = units.len() / sessions;
    let extra = units.len() % sessions;
    let mut blocks = Vec::with_capacity(sessions);
    let mut idx = 0;

    for bucket in 0..sessions {
        let size = base + usize::from(bucket < extra);
        let members = &units[idx..idx + size];
        idx += size;

        let title = members
            .iter()
            .map(|u| u.title.as_str())
            .collect::<Vec<_>>()
            .join(" / ");
        let lines = members.iter().flat_map(effective_lines).collect();
        let unit_indices: Vec<usize> = members.iter().map(|u| u.index).collect();
        blocks.push(ContentBlock {
            title,
            lines,
            source_unit_index: unit_indices.first().copied(),
            unit_indices,
            part: None,
        });
    }
    debug_assert_eq!(idx, units.len());
    blocks
}

fn split_units(units: &[Unit], sessions: usize) -> Distribution {
    let line_counts: Vec<usize> = units.iter().map(|u| effective_lines(u).len()).collect();
    let parts = parts_per_unit(&line_counts, sessions);

    let mut blocks = Vec::with_capacity(sessions);
    let mut empty_blocks = 0;
    for (unit, &rep) in units.iter().zip(&parts) {
        if rep == 1 {
            blocks.push(ContentBlock::whole(unit));
            continue;
        }
        let lines = effective_lines(unit);
        let base = lines.len() / rep;
        let extra = lines.len() % rep;
        let mut start = 0;
        for j in 0..rep {
            let end = start + base + usize::from(j < extra);
            if start == end {
                empty_blocks += 1;
            }
            blocks.push(ContentBlock {
                title: format!("{} (parte {}/{})", unit.title, j + 1, rep),
                lines: lines[start..end].to_vec(),
                source_unit_index: Some(unit.index),
                unit_indices: vec![unit.index],
                part: Some((j + 1, rep)),
            });
            start = end;
        }
    }

    let mut warnings = Vec::new();
    if empty_blocks > 0 {
        warnings.push(PlanWarning::EmptyContentBlocks {
            empty_blocks,
            total_lines: line_counts.iter().sum(),
            sessions,
        });
    }
    Distribution { blocks, warnings }
}

/// Number of parts per unit, summing to `sessions`.
///
/// Every unit starts with one part. Each remaining slot goes to the unit with
/// the highest lines-per-part load among units that can take another
/// non-empty part; ties go to the lowest index. When no unit can, slots are
/// handed out round-robin from unit 0.
pub fn parts_per_unit(line_counts: &[usize], sessions: usize) -> Vec<usize> {
    let mut parts = vec![1usize; line_counts.len()];
    if line_counts.is_empty() || sessions <= line_counts.len() {
        return parts;
    }

    let mut overflow = 0;
    for _ in 0..sessions - line_counts.len() {
        let target = (0..line_counts.len())
            .filter(|&i| line_counts[i] > parts[i])
            .fold(None::<usize>, |best, i| match best {
                None => Some(i),
                Some(b) => match compare_load(line_counts[i], parts[i], line_counts[b], parts[b]) {
                    Ordering::Greater => Some(i),
                    _ => Some(b),
                },
            });
        let target = target.unwrap_or_else(|| {
            let i = overflow % line_counts.len();
            overflow += 1;
            i
        });
        parts[target] += 1;
    }
    parts
}

/// Compare `a_lines / a_parts` with `b_lines / b_parts` without division.
fn compare_load(a_lines: usize, a_parts: usize, b_lines: usize, b_parts: usize) -> Ordering {
    (a_lines * b_parts).cmp(&(b_lines * a_parts))
}

fn effective_lines(unit: &Unit) -> Vec<String> {
    if unit.lines.is_empty() {
        vec![placeholder_line(&unit.title)]
    } else {
        unit.lines.clone()
    }
}
