use chrono::{NaiveDate, Weekday};
use semester_planner::calendar::RecurringHoliday;
use semester_planner::distributor::ContentBlock;
use semester_planner::error::PlanWarning;
use semester_planner::planner::{LevelSelection, zip_blocks};
use semester_planner::scheduler::{SchedulerOptions, schedule};
use semester_planner::{
    CognitiveLevel, EventType, FirstChooser, GenerationRequest, KeywordExtractor, Planner,
    PlannerOptions, PlanningError, RawUnit, SeededChooser, SequenceChooser, Taxonomy,
};
use std::collections::BTreeSet;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn request() -> GenerationRequest {
    GenerationRequest {
        start: d(2024, 3, 4),
        end: d(2024, 7, 5),
        weekday: Weekday::Mon,
        holidays: BTreeSet::new(),
        tests: vec![d(2024, 4, 15), d(2024, 5, 20)],
        final_exam: d(2024, 6, 24),
        units: vec![
            RawUnit::new(
                "Números reales",
                "Conjuntos numéricos. Propiedades de orden. Intervalos reales. Valor absoluto.",
            ),
            RawUnit::new("Funciones", "Dominio y rango. Gráficas de funciones."),
            RawUnit::new(
                "Límites",
                "Noción de límite. Límites laterales. Límites infinitos.\nContinuidad. Asíntotas. Teorema del sándwich.",
            ),
        ],
    }
}

#[test]
fn generates_full_semester_with_lessons_on_class_sessions() {
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    let planner = Planner::new(&taxonomy, &extractor);
    let plan = planner.generate(&request(), &mut FirstChooser).unwrap();

    assert_eq!(plan.sessions.len(), 17);
    assert!(plan.warnings.is_empty(), "{:?}", plan.warnings);
    assert_eq!(plan.tests, vec![d(2024, 4, 15), d(2024, 5, 20)]);
    assert_eq!(plan.final_exam, d(2024, 6, 24));
    assert_eq!(plan.ordinary_sessions().count(), 10);

    for session in &plan.sessions {
        let is_class = session.event == EventType::OrdinaryClass;
        assert_eq!(session.block.is_some(), is_class, "session {}", session.ordinal);
        assert_eq!(session.lesson.is_some(), is_class, "session {}", session.ordinal);
    }

    let first = plan.sessions[0].lesson.as_ref().unwrap();
    assert_eq!(first.unit, "Números reales (parte 1/3)");
    assert_eq!(first.content, "Conjuntos numéricos Propiedades de orden");
    assert_eq!(first.level, CognitiveLevel::Recordar);
    assert_eq!(first.verb, "identificar");
    assert_eq!(first.concept, "conjuntos numéricos");
    assert_eq!(
        first.objective,
        "El estudiante será capaz de identificar conjuntos numéricos"
    );
    assert_eq!(
        first.activity,
        "Realizar un glosario con términos sobre 'conjuntos numéricos'."
    );
    assert_eq!(first.resources, "fichas, presentación, mapas simples");
    assert_eq!(first.assessment, "test, lista de cotejo");
    assert_eq!(first.phases.closing, "Mapa mental");

    assert_eq!(plan.sessions_for_unit(0), 3);
    assert_eq!(plan.sessions_for_unit(1), 2);
    assert_eq!(plan.sessions_for_unit(2), 5);
}

#[test]
fn levels_cycle_through_class_sessions_only() {
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    let plan = Planner::new(&taxonomy, &extractor)
        .generate(&request(), &mut FirstChooser)
        .unwrap();

    let levels: Vec<CognitiveLevel> = plan
        .ordinary_sessions()
        .map(|s| s.lesson.as_ref().unwrap().level)
        .collect();
    assert_eq!(
        levels,
        vec![
            CognitiveLevel::Recordar,
            CognitiveLevel::Comprender,
            CognitiveLevel::Aplicar,
            CognitiveLevel::Analizar,
            CognitiveLevel::Evaluar,
            CognitiveLevel::Crear,
            CognitiveLevel::Recordar,
            CognitiveLevel::Comprender,
            CognitiveLevel::Aplicar,
            CognitiveLevel::Analizar,
        ]
    );
}

#[test]
fn same_seed_gives_identical_plans() {
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    let planner = Planner::new(&taxonomy, &extractor);
    let a = planner
        .generate(&request(), &mut SeededChooser::new(2024))
        .unwrap();
    let b = planner
        .generate(&request(), &mut SeededChooser::new(2024))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn sequence_chooser_drives_verb_and_phrase_picks() {
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    // verb, activity, feedback, introduction, opening, development, closing
    let mut chooser = SequenceChooser::new(vec![2, 0, 1, 1, 2, 0, 1]);
    let plan = Planner::new(&taxonomy, &extractor)
        .generate(&request(), &mut chooser)
        .unwrap();

    let first = plan.sessions[0].lesson.as_ref().unwrap();
    assert_eq!(first.verb, "listar");
    assert_eq!(first.phases.feedback, "Juego de revisión");
    assert_eq!(first.phases.introduction, "Situación problema");
    assert_eq!(first.phases.opening, "Video disparador");
    assert_eq!(first.phases.development, "Actividad práctica");
    assert_eq!(first.phases.closing, "Reflexión");
}

#[test]
fn chosen_levels_restrict_lessons() {
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    let options = PlannerOptions {
        level_selection: LevelSelection::Choose(vec![CognitiveLevel::Crear]),
        ..PlannerOptions::default()
    };
    let plan = Planner::new(&taxonomy, &extractor)
        .with_options(options)
        .generate(&request(), &mut SeededChooser::new(1))
        .unwrap();
    assert!(plan
        .ordinary_sessions()
        .all(|s| s.lesson.as_ref().unwrap().level == CognitiveLevel::Crear));
}

#[test]
fn empty_level_choice_is_rejected() {
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    let options = PlannerOptions {
        level_selection: LevelSelection::Choose(Vec::new()),
        ..PlannerOptions::default()
    };
    let err = Planner::new(&taxonomy, &extractor)
        .with_options(options)
        .generate(&request(), &mut FirstChooser)
        .unwrap_err();
    assert!(matches!(err, PlanningError::InvalidTaxonomy(_)));
}

#[test]
fn substitute_taxonomy_changes_verbs() {
    let mut taxonomy = Taxonomy::default();
    taxonomy.levels.recordar.verbs = vec!["nombrar".into()];
    let extractor = KeywordExtractor::default();
    let plan = Planner::new(&taxonomy, &extractor)
        .generate(&request(), &mut FirstChooser)
        .unwrap();
    assert_eq!(plan.sessions[0].lesson.as_ref().unwrap().verb, "nombrar");
}

#[test]
fn invalid_taxonomy_is_rejected() {
    let mut taxonomy = Taxonomy::default();
    taxonomy.levels.evaluar.assessments.clear();
    let extractor = KeywordExtractor::default();
    let err = Planner::new(&taxonomy, &extractor)
        .generate(&request(), &mut FirstChooser)
        .unwrap_err();
    assert_eq!(
        err,
        PlanningError::InvalidTaxonomy("level Evaluar has no assessments".into())
    );
}

#[test]
fn custom_extractor_is_used_and_blank_labels_fall_back_to_title() {
    let taxonomy = Taxonomy::default();
    let shout = |text: &str| text.to_uppercase();
    let plan = Planner::new(&taxonomy, &shout)
        .generate(&request(), &mut FirstChooser)
        .unwrap();
    assert_eq!(
        plan.sessions[0].lesson.as_ref().unwrap().concept,
        "CONJUNTOS NUMÉRICOS PROPIEDADES DE ORDEN"
    );

    let blank = |_: &str| String::new();
    let plan = Planner::new(&taxonomy, &blank)
        .generate(&request(), &mut FirstChooser)
        .unwrap();
    assert_eq!(
        plan.sessions[0].lesson.as_ref().unwrap().concept,
        "Números reales (parte 1/3)"
    );
}

#[test]
fn request_validation_errors_are_fatal() {
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    let planner = Planner::new(&taxonomy, &extractor);

    let mut inverted = request();
    inverted.end = inverted.start;
    assert_eq!(
        planner.generate(&inverted, &mut FirstChooser).unwrap_err(),
        PlanningError::StartNotBeforeEnd {
            start: d(2024, 3, 4),
            end: d(2024, 3, 4),
        }
    );

    let mut empty = request();
    empty.units.clear();
    assert_eq!(
        planner.generate(&empty, &mut FirstChooser).unwrap_err(),
        PlanningError::NoUnits
    );
}

#[test]
fn holiday_sessions_carry_flag_into_plan() {
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    let mut req = request();
    req.holidays.insert(d(2024, 4, 1));
    let plan = Planner::new(&taxonomy, &extractor)
        .generate(&req, &mut FirstChooser)
        .unwrap();
    assert_eq!(plan.holiday_overlaps(), 1);
    assert!(plan.sessions[4].holiday_overlap);
}

#[test]
fn configured_recurring_holidays_reach_the_plan() {
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    let options = PlannerOptions {
        recurring_holidays: vec![RecurringHoliday { month: 4, day: 1 }],
        ..PlannerOptions::default()
    };
    let plan = Planner::new(&taxonomy, &extractor)
        .with_options(options)
        .generate(&request(), &mut FirstChooser)
        .unwrap();

    assert_eq!(plan.holidays, BTreeSet::from([d(2024, 4, 1)]));
    assert_eq!(plan.holiday_overlaps(), 1);
    assert!(plan.sessions[4].holiday_overlap);
}

#[test]
fn request_deserializes_with_spanish_weekday() {
    let json = r#"{
        "start": "2024-03-04",
        "end": "2024-07-05",
        "weekday": "lunes",
        "tests": ["2024-04-15"],
        "final_exam": "2024-06-24",
        "units": [{ "title": "Álgebra", "raw_content": "Polinomios." }, { "title": "" }]
    }"#;
    let req: GenerationRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.weekday, Weekday::Mon);
    assert!(req.holidays.is_empty());
    assert_eq!(req.units[1].raw_content, "");
}

#[test]
fn zip_blocks_pads_missing_blocks_and_reports_shortfall() {
    let outcome = schedule(&request().dates(), &SchedulerOptions::default()).unwrap();
    let blocks: Vec<ContentBlock> = (0..8)
        .map(|i| ContentBlock {
            title: format!("B{i}"),
            lines: vec![format!("línea {i}")],
            source_unit_index: Some(0),
            unit_indices: vec![0],
            part: None,
        })
        .collect();

    let (slots, warning) = zip_blocks(&outcome.sessions, blocks);
    assert_eq!(
        warning,
        Some(PlanWarning::AllocationShortfall {
            expected: 10,
            produced: 8,
        })
    );
    assert_eq!(slots.len(), 17);
    assert!(slots[6].is_none(), "test session gets no block");
    assert_eq!(slots[0].as_ref().unwrap().title, "B0");
    assert!(slots[14].as_ref().unwrap().is_unassigned());
    assert!(slots[15].as_ref().unwrap().is_unassigned());

    let padded = serde_json::to_value(slots[15].as_ref().unwrap()).unwrap();
    assert!(padded.get("source_unit_index").is_none(), "{padded}");
    assert_eq!(padded["unit_indices"], serde_json::json!([]));
}

#[test]
fn zip_blocks_drops_surplus_blocks() {
    let outcome = schedule(&request().dates(), &SchedulerOptions::default()).unwrap();
    let blocks: Vec<ContentBlock> = (0..12)
        .map(|i| ContentBlock {
            title: format!("B{i}"),
            lines: Vec::new(),
            source_unit_index: Some(0),
            unit_indices: vec![0],
            part: None,
        })
        .collect();

    let (slots, warning) = zip_blocks(&outcome.sessions, blocks);
    assert_eq!(
        warning,
        Some(PlanWarning::AllocationSurplus {
            expected: 10,
            produced: 12,
        })
    );
    assert_eq!(slots.iter().flatten().count(), 10);
    assert_eq!(slots[15].as_ref().unwrap().title, "B9");
}
