//! Cognitive-level taxonomy table: verbs, activity templates, resources and
//! assessment suggestions per level, plus the phrase lists for lesson phases.

use crate::error::PlanningError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveLevel {
    Recordar,
    Comprender,
    Aplicar,
    Analizar,
    Evaluar,
    Crear,
}

impl CognitiveLevel {
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Recordar,
        CognitiveLevel::Comprender,
        CognitiveLevel::Aplicar,
        CognitiveLevel::Analizar,
        CognitiveLevel::Evaluar,
        CognitiveLevel::Crear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CognitiveLevel::Recordar => "Recordar",
            CognitiveLevel::Comprender => "Comprender",
            CognitiveLevel::Aplicar => "Aplicar",
            CognitiveLevel::Analizar => "Analizar",
            CognitiveLevel::Evaluar => "Evaluar",
            CognitiveLevel::Crear => "Crear",
        }
    }
}

impl std::str::FromStr for CognitiveLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        CognitiveLevel::ALL
            .into_iter()
            .find(|level| level.label().to_lowercase() == lowered)
            .ok_or_else(|| format!("unknown cognitive level '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTemplates {
    pub verbs: Vec<String>,
    /// Activity templates; `{}` is replaced with the session concept.
    pub activities: Vec<String>,
    pub resources: Vec<String>,
    pub assessments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePhrases {
    pub feedback: Vec<String>,
    pub introduction: Vec<String>,
    pub opening: Vec<String>,
    pub development: Vec<String>,
    pub closing: Vec<String>,
}

/// One entry per level, so a table can never miss a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTable {
    pub recordar: LevelTemplates,
    pub comprender: LevelTemplates,
    pub aplicar: LevelTemplates,
    pub analizar: LevelTemplates,
    pub evaluar: LevelTemplates,
    pub crear: LevelTemplates,
}

impl LevelTable {
    pub fn get(&self, level: CognitiveLevel) -> &LevelTemplates {
        match level {
            CognitiveLevel::Recordar => &self.recordar,
            CognitiveLevel::Comprender => &self.comprender,
            CognitiveLevel::Aplicar => &self.aplicar,
            CognitiveLevel::Analizar => &self.analizar,
            CognitiveLevel::Evaluar => &self.evaluar,
            CognitiveLevel::Crear => &self.crear,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub levels: LevelTable,
    pub phases: PhasePhrases,
}

impl Taxonomy {
    pub fn level(&self, level: CognitiveLevel) -> &LevelTemplates {
        self.levels.get(level)
    }

    pub fn validate(&self) -> Result<(), PlanningError> {
        for level in CognitiveLevel::ALL {
            let templates = self.level(level);
            let lists = [
                ("verbs", &templates.verbs),
                ("activities", &templates.activities),
                ("resources", &templates.resources),
                ("assessments", &templates.assessments),
            ];
            for (name, list) in lists {
                if list.iter().all(|item| item.trim().is_empty()) {
                    return Err(PlanningError::InvalidTaxonomy(format!(
                        "level {} has no {name}",
                        level.label()
                    )));
                }
            }
        }
        let phases = [
            ("feedback", &self.phases.feedback),
            ("introduction", &self.phases.introduction),
            ("opening", &self.phases.opening),
            ("development", &self.phases.development),
            ("closing", &self.phases.closing),
        ];
        for (name, list) in phases {
            if list.is_empty() {
                return Err(PlanningError::InvalidTaxonomy(format!(
                    "phase list '{name}' is empty"
                )));
            }
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn templates(
    verbs: &[&str],
    activities: &[&str],
    resources: &[&str],
    assessments: &[&str],
) -> LevelTemplates {
    LevelTemplates {
        verbs: strings(verbs),
        activities: strings(activities),
        resources: strings(resources),
        assessments: strings(assessments),
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        let levels = LevelTable {
            recordar: templates(
                &["identificar", "definir", "listar"],
                &["Realizar un glosario con términos sobre '{}'."],
                &["fichas", "presentación", "mapas simples"],
                &["test", "lista de cotejo"],
            ),
            comprender: templates(
                &["explicar", "resumir", "interpretar"],
                &["Redactar un resumen sobre '{}'."],
                &["lectura", "videos", "debate"],
                &["resúmenes", "cuestionarios"],
            ),
            aplicar: templates(
                &["resolver", "utilizar", "demostrar"],
                &["Resolver un ejercicio práctico sobre '{}'."],
                &["simulador", "ejercicios", "laboratorio"],
                &["demostraciones", "resolución de problemas"],
            ),
            analizar: templates(
                &["comparar", "diferenciar", "analizar"],
                &["Analizar un caso relacionado con '{}'."],
                &["casos", "gráficos", "tablas"],
                &["ensayos", "mapas comparativos"],
            ),
            evaluar: templates(
                &["justificar", "juzgar", "concluir"],
                &["Justificar la relevancia de '{}'."],
                &["rúbricas", "informes", "discusión crítica"],
                &["defensa oral", "argumentación escrita"],
            ),
            crear: templates(
                &["diseñar", "elaborar", "idear"],
                &["Diseñar una solución basada en '{}'."],
                &["software", "proyecto", "portafolio"],
                &["prototipo", "presentación final"],
            ),
        };

        Self {
            levels,
            phases: PhasePhrases {
                feedback: strings(&[
                    "Recordatorio de clase anterior",
                    "Juego de revisión",
                    "Preguntas orales",
                ]),
                introduction: strings(&[
                    "Lectura disparadora",
                    "Situación problema",
                    "Contextualización narrativa",
                ]),
                opening: strings(&["Lluvia de ideas", "Pregunta generadora", "Video disparador"]),
                development: strings(&[
                    "Actividad práctica",
                    "Discusión guiada",
                    "Resolución de caso",
                ]),
                closing: strings(&["Mapa mental", "Reflexión", "Síntesis grupal"]),
            },
        }
    }
}
