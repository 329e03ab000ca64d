use crate::calendar::{RecurringHoliday, weekday_serde};
use crate::concept::ConceptExtractor;
use crate::distributor::{ContentBlock, distribute};
use crate::error::{PlanWarning, PlanningError};
use crate::scheduler::{EventType, SchedulerOptions, SemesterDates, SessionSkeleton, schedule};
use crate::selection::Chooser;
use crate::taxonomy::{CognitiveLevel, Taxonomy};
use crate::unit::{RawUnit, Unit, normalize_units};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Everything needed to plan one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(with = "weekday_serde")]
    pub weekday: Weekday,
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub tests: Vec<NaiveDate>,
    pub final_exam: NaiveDate,
    pub units: Vec<RawUnit>,
}

impl GenerationRequest {
    pub fn dates(&self) -> SemesterDates {
        SemesterDates {
            start: self.start,
            end: self.end,
            weekday: self.weekday,
            holidays: self.holidays.clone(),
            tests: self.tests.clone(),
            final_exam: self.final_exam,
        }
    }

    pub fn validate(&self) -> Result<(), PlanningError> {
        if self.start >= self.end {
            return Err(PlanningError::StartNotBeforeEnd {
                start: self.start,
                end: self.end,
            });
        }
        if self.units.is_empty() {
            return Err(PlanningError::NoUnits);
        }
        Ok(())
    }
}

/// How the cognitive level of each class is picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSelection {
    /// Walk through the six levels in order, one class at a time.
    #[default]
    Cycle,
    /// Let the chooser pick among the listed levels.
    Choose(Vec<CognitiveLevel>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerOptions {
    #[serde(flatten)]
    pub scheduler: SchedulerOptions,
    #[serde(default)]
    pub level_selection: LevelSelection,
    /// Holidays added to every request, e.g. national days.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurring_holidays: Vec<RecurringHoliday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPhases {
    pub feedback: String,
    pub introduction: String,
    pub opening: String,
    pub development: String,
    pub closing: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlan {
    pub unit: String,
    pub content: String,
    pub concept: String,
    pub level: CognitiveLevel,
    pub verb: String,
    pub objective: String,
    pub activity: String,
    pub resources: String,
    pub assessment: String,
    pub phases: LessonPhases,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub ordinal: usize,
    pub date: NaiveDate,
    pub event: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_number: Option<usize>,
    #[serde(default)]
    pub holiday_overlap: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson: Option<LessonPlan>,
}

impl SessionPlan {
    fn from_skeleton(skeleton: &SessionSkeleton) -> Self {
        Self {
            ordinal: skeleton.ordinal,
            date: skeleton.date,
            event: skeleton.event,
            test_number: skeleton.test_number,
            holiday_overlap: skeleton.holiday_overlap,
            block: None,
            lesson: None,
        }
    }

    /// Event label including the test number, e.g. `Prueba parcial 2`.
    pub fn title(&self) -> String {
        match (self.event, self.test_number) {
            (EventType::PartialTest, Some(n)) => format!("{} {n}", self.event.label()),
            (event, _) => event.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterPlan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(with = "weekday_serde")]
    pub weekday: Weekday,
    pub holidays: BTreeSet<NaiveDate>,
    /// Test dates that ended up on a session.
    pub tests: Vec<NaiveDate>,
    pub final_exam: NaiveDate,
    pub units: Vec<Unit>,
    pub sessions: Vec<SessionPlan>,
    #[serde(default)]
    pub warnings: Vec<PlanWarning>,
}

impl SemesterPlan {
    pub fn ordinary_sessions(&self) -> impl Iterator<Item = &SessionPlan> {
        self.sessions
            .iter()
            .filter(|s| s.event == EventType::OrdinaryClass)
    }

    pub fn holiday_overlaps(&self) -> usize {
        self.sessions.iter().filter(|s| s.holiday_overlap).count()
    }

    /// Number of class sessions teaching any part of the unit.
    pub fn sessions_for_unit(&self, unit_index: usize) -> usize {
        self.ordinary_sessions()
            .filter(|s| {
                s.block
                    .as_ref()
                    .is_some_and(|b| b.unit_indices.contains(&unit_index))
            })
            .count()
    }
}

/// Runs scheduling, content distribution and lesson derivation for a request.
pub struct Planner<'a> {
    taxonomy: &'a Taxonomy,
    extractor: &'a dyn ConceptExtractor,
    options: PlannerOptions,
}

impl<'a> Planner<'a> {
    pub fn new(taxonomy: &'a Taxonomy, extractor: &'a dyn ConceptExtractor) -> Self {
        Self {
            taxonomy,
            extractor,
            options: PlannerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PlannerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    pub fn generate<C: Chooser>(
        &self,
        request: &GenerationRequest,
        chooser: &mut C,
    ) -> Result<SemesterPlan, PlanningError> {
        request.validate()?;
        self.taxonomy.validate()?;
        if let LevelSelection::Choose(levels) = &self.options.level_selection {
            if levels.is_empty() {
                return Err(PlanningError::InvalidTaxonomy(
                    "level selection lists no levels".into(),
                ));
            }
        }

        let units = normalize_units(&request.units);
        let dates = request
            .dates()
            .with_recurring_holidays(&self.options.recurring_holidays);
        let outcome = schedule(&dates, &self.options.scheduler)?;
        let ordinary = outcome.ordinary_ordinals();
        let distribution = distribute(&units, ordinary.len())?;

        let mut warnings = outcome.warnings.clone();
        warnings.extend(distribution.warnings.iter().cloned());
        let (assigned, zip_warning) = zip_blocks(&outcome.sessions, distribution.blocks);
        warnings.extend(zip_warning);

        let mut sessions = Vec::with_capacity(outcome.sessions.len());
        let mut class_idx = 0;
        for (skeleton, block) in outcome.sessions.iter().zip(assigned) {
            let mut session = SessionPlan::from_skeleton(skeleton);
            if let Some(block) = block {
                if !block.is_unassigned() {
                    session.lesson = Some(self.lesson_for(&block, class_idx, chooser));
                }
                session.block = Some(block);
                class_idx += 1;
            }
            sessions.push(session);
        }

        for warning in &warnings[outcome.warnings.len()..] {
            warn!(%warning, "content allocation degraded");
        }

        let tests = sessions
            .iter()
            .filter(|s| s.event == EventType::PartialTest)
            .map(|s| s.date)
            .collect();
        let final_exam = sessions
            .last()
            .map(|s| s.date)
            .unwrap_or(request.final_exam);
        let plan = SemesterPlan {
            start: request.start,
            end: request.end,
            weekday: request.weekday,
            holidays: dates.holidays,
            tests,
            final_exam,
            units,
            sessions,
            warnings,
        };
        info!(
            sessions = plan.sessions.len(),
            classes = ordinary.len(),
            units = plan.units.len(),
            warnings = plan.warnings.len(),
            "generated semester plan"
        );
        Ok(plan)
    }

    fn level_for<C: Chooser>(&self, class_idx: usize, chooser: &mut C) -> CognitiveLevel {
        match &self.options.level_selection {
            LevelSelection::Cycle => CognitiveLevel::ALL[class_idx % CognitiveLevel::ALL.len()],
            LevelSelection::Choose(levels) => chooser
                .choose(levels)
                .copied()
                .unwrap_or(CognitiveLevel::Aplicar),
        }
    }

    fn lesson_for<C: Chooser>(
        &self,
        block: &ContentBlock,
        class_idx: usize,
        chooser: &mut C,
    ) -> LessonPlan {
        let content = block.text();
        let mut concept = self.extractor.extract_label(&content).trim().to_string();
        if concept.is_empty() {
            concept = block.title.clone();
        }

        let level = self.level_for(class_idx, chooser);
        let templates = self.taxonomy.level(level);
        let verb = pick(chooser, &templates.verbs);
        let activity = pick(chooser, &templates.activities).replace("{}", &concept);
        let phrases = &self.taxonomy.phases;
        let phases = LessonPhases {
            feedback: pick(chooser, &phrases.feedback),
            introduction: pick(chooser, &phrases.introduction),
            opening: pick(chooser, &phrases.opening),
            development: pick(chooser, &phrases.development),
            closing: pick(chooser, &phrases.closing),
        };

        LessonPlan {
            unit: block.title.clone(),
            objective: format!("El estudiante será capaz de {verb} {concept}"),
            content,
            concept,
            level,
            verb,
            activity,
            resources: templates.resources.join(", "),
            assessment: templates.assessments.join(", "),
            phases,
        }
    }
}

/// Pair content blocks with ordinary class sessions, in order.
///
/// Returns one slot per session (`None` for non-class sessions). Missing
/// blocks become [`ContentBlock::unassigned`]; surplus blocks are dropped.
/// Either mismatch is reported.
pub fn zip_blocks(
    sessions: &[SessionSkeleton],
    blocks: Vec<ContentBlock>,
) -> (Vec<Option<ContentBlock>>, Option<PlanWarning>) {
    let expected = sessions
        .iter()
        .filter(|s| s.event == EventType::OrdinaryClass)
        .count();
    let produced = blocks.len();
    let warning = match produced.cmp(&expected) {
        std::cmp::Ordering::Less => Some(PlanWarning::AllocationShortfall { expected, produced }),
        std::cmp::Ordering::Greater => Some(PlanWarning::AllocationSurplus { expected, produced }),
        std::cmp::Ordering::Equal => None,
    };

    let mut blocks = blocks.into_iter();
    let slots = sessions
        .iter()
        .map(|s| {
            (s.event == EventType::OrdinaryClass)
                .then(|| blocks.next().unwrap_or_else(ContentBlock::unassigned))
        })
        .collect();
    (slots, warning)
}

fn pick<C: Chooser>(chooser: &mut C, options: &[String]) -> String {
    chooser.choose(options).cloned().unwrap_or_default()
}
