use chrono::{NaiveDate, Weekday};
use polars::prelude::*;
use semester_planner::report::{
    HOLIDAY_WARNING, placeholder_map, render_df_as_text_table, render_text_report, session_table,
    unit_summary,
};
use semester_planner::{
    FirstChooser, GenerationRequest, KeywordExtractor, Planner, RawUnit, SemesterPlan, Taxonomy,
};
use std::collections::BTreeSet;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn plan() -> SemesterPlan {
    let request = GenerationRequest {
        start: d(2024, 3, 4),
        end: d(2024, 7, 5),
        weekday: Weekday::Mon,
        holidays: BTreeSet::from([d(2024, 4, 1)]),
        tests: vec![d(2024, 4, 15), d(2024, 5, 20)],
        final_exam: d(2024, 6, 24),
        units: vec![
            RawUnit::new(
                "Números reales",
                "Conjuntos numéricos. Intervalos reales. Valor absoluto. Desigualdades.",
            ),
            RawUnit::new(
                "Funciones",
                "Dominio y rango. Gráficas de funciones. Composición. Funciones inversas. Exponenciales. Logaritmos.",
            ),
        ],
    };
    let taxonomy = Taxonomy::default();
    let extractor = KeywordExtractor::default();
    Planner::new(&taxonomy, &extractor)
        .generate(&request, &mut FirstChooser)
        .unwrap()
}

#[test]
fn text_report_has_header_units_and_sessions() {
    let report = render_text_report(&plan());

    assert!(report.contains("📋 PLANIFICACIÓN SEMESTRAL"));
    assert!(report.contains("PERÍODO: 04/03/2024 al 05/07/2024"));
    assert!(report.contains("DÍA DE CLASE: Lunes"));
    assert!(report.contains("FERIADOS: 01/04/2024"));
    assert!(report.contains("PRUEBAS: 15/04/2024, 20/05/2024"));
    assert!(report.contains("EXAMEN FINAL: 24/06/2024"));
    assert!(report.contains("1. Números reales\n   - Conjuntos numéricos\n   - Intervalos reales"));
    assert!(report.contains("🔵 SESIÓN 01 | 04/03/2024 | Clase normal"));
    assert!(report.contains("🔵 SESIÓN 07 | 15/04/2024 | Prueba parcial 1"));
    assert!(report.contains("🔵 SESIÓN 17 | 24/06/2024 | Examen final"));
    assert!(report.contains("OBJETIVO: El estudiante será capaz de identificar"));
    assert!(report.contains("Nivel Bloom: Recordar"));
    assert_eq!(report.matches(HOLIDAY_WARNING).count(), 1);
    assert_eq!(report.matches("🔵 SESIÓN").count(), 17);
    assert!(!report.contains("ADVERTENCIAS"));
}

#[test]
fn text_report_lists_warnings_when_present() {
    let mut plan = plan();
    plan.warnings
        .push(semester_planner::PlanWarning::TestDateNotInSchedule {
            test_number: 3,
            date: d(2024, 6, 5),
        });
    let report = render_text_report(&plan);
    assert!(report.contains("ADVERTENCIAS:"));
    assert!(report.contains("test 3 date 2024-06-05 does not match any session date"));
}

#[test]
fn placeholder_map_has_every_field_for_every_session() {
    let map = placeholder_map(&plan());

    // 6 global keys + 17 fields for each of the 17 sessions
    assert_eq!(map.len(), 6 + 17 * 17);
    assert_eq!(map["START_DATE"], "04/03/2024");
    assert_eq!(map["WEEKDAY"], "Lunes");
    assert_eq!(map["HOLIDAYS"], "01/04/2024");
    assert_eq!(map["TESTS"], "15/04/2024, 20/05/2024");
    assert_eq!(map["FINAL_EXAM_DATE"], "24/06/2024");

    assert_eq!(map["SESSION_1_DATE"], "04/03/2024");
    assert_eq!(map["SESSION_1_EVENT"], "Clase normal");
    assert_eq!(map["SESSION_1_LEVEL"], "Recordar");
    assert!(map["SESSION_1_OBJECTIVE"].starts_with("El estudiante será capaz de identificar"));
    assert_eq!(map["SESSION_5_WARNING"], HOLIDAY_WARNING);
    assert_eq!(map["SESSION_6_WARNING"], "");

    assert_eq!(map["SESSION_7_EVENT"], "Prueba parcial 1");
    assert_eq!(map["SESSION_7_UNIT"], "");
    assert_eq!(map["SESSION_7_OBJECTIVE"], "");
    assert_eq!(map["SESSION_17_EVENT"], "Examen final");
}

#[test]
fn session_table_has_one_row_per_session() {
    let df = session_table(&plan()).unwrap();
    assert_eq!(df.height(), 17);
    assert_eq!(
        df.get_column_names()
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>(),
        vec!["session", "date", "event", "unit", "level", "verb", "concept", "holiday"]
    );
    assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    assert_eq!(df.column("level").unwrap().null_count(), 7);

    let holidays = df.column("holiday").unwrap().bool().unwrap();
    assert_eq!(holidays.into_iter().flatten().filter(|h| *h).count(), 1);
}

#[test]
fn unit_summary_counts_sessions_per_unit() {
    let df = unit_summary(&plan()).unwrap();
    assert_eq!(df.height(), 2);
    let sessions: Vec<u32> = df
        .column("sessions")
        .unwrap()
        .u32()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    // 4 and 6 lines over 10 class sessions
    assert_eq!(sessions, vec![4, 6]);
}

#[test]
fn text_table_renders_dates_and_headers() {
    let table = render_df_as_text_table(&session_table(&plan()).unwrap());
    let lines: Vec<&str> = table.lines().collect();
    assert!(lines[0].starts_with("+-"));
    assert!(lines[1].contains("| session |"));
    assert!(table.contains("04/03/2024"));
    assert!(table.contains("Examen final"));
    // header, separators and 17 rows
    assert_eq!(lines.len(), 17 + 4);
}
