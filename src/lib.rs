pub mod calendar;
pub mod concept;
pub mod config;
pub mod distributor;
pub mod error;
pub mod export;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod planner;
pub mod report;
pub mod scheduler;
pub mod selection;
pub mod taxonomy;
pub mod unit;

pub use calendar::{ClassCalendar, HolidayPolicy};
pub use concept::{ConceptExtractor, KeywordExtractor};
pub use config::PlannerConfig;
pub use distributor::{ContentBlock, distribute};
pub use error::{PlanWarning, PlanningError};
pub use planner::{GenerationRequest, Planner, PlannerOptions, SemesterPlan, SessionPlan};
pub use scheduler::{EventType, SEMESTER_SESSIONS, TestAlignment, schedule};
pub use selection::{Chooser, FirstChooser, SeededChooser, SequenceChooser};
pub use taxonomy::{CognitiveLevel, Taxonomy};
pub use unit::{RawUnit, Unit};
