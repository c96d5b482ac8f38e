use std::sync::LazyLock;

use psyscale_core::models::{
    Answers, PsaCategory, PsaComment, PsaLevel, PsaPatientInfo, PsaResults, ResultsHeader,
    ScaleResults,
};

use crate::Instrument;
use crate::scoring::{AnswerRange, ItemGroup, ScoringContext, answer_value};

/// PSA: Perfil Sensorial do Adulto/Adolescente.
/// 60 items answered 1 to 5, grouped into six sensory categories.
pub struct Psa;

pub const CODE: &str = "PSA";
pub const TOTAL_POSSIBLE: i32 = 300;

/// Averages at or above this count as high responsivity.
pub const HIGH_AVERAGE: f64 = 4.0;
/// Averages at or below this count as low responsivity.
pub const LOW_AVERAGE: f64 = 2.0;

pub struct CategoryDef {
    pub key: &'static str,
    pub name: &'static str,
    pub first_item: u16,
    pub last_item: u16,
}

pub const CATEGORIES: [CategoryDef; 6] = [
    CategoryDef {
        key: "A",
        name: "Processamento Tátil/Olfativo",
        first_item: 1,
        last_item: 8,
    },
    CategoryDef {
        key: "B",
        name: "Processamento Vestibular/Proprioceptivo",
        first_item: 9,
        last_item: 16,
    },
    CategoryDef {
        key: "C",
        name: "Processamento Visual",
        first_item: 17,
        last_item: 26,
    },
    CategoryDef {
        key: "D",
        name: "Processamento Tátil",
        first_item: 27,
        last_item: 39,
    },
    CategoryDef {
        key: "E",
        name: "Nível de Atividade",
        first_item: 40,
        last_item: 49,
    },
    CategoryDef {
        key: "F",
        name: "Processamento Auditivo",
        first_item: 50,
        last_item: 60,
    },
];

const OPTIONS: [&str; 5] = [
    "Quase nunca",
    "Raramente",
    "Ocasionalmente",
    "Frequentemente",
    "Quase sempre",
];

const COMMENT_KEYS: [&str; 6] = [
    "comment_category_a",
    "comment_category_b",
    "comment_category_c",
    "comment_category_d",
    "comment_category_e",
    "comment_category_f",
];

static GROUPS: LazyLock<Vec<ItemGroup>> = LazyLock::new(|| {
    CATEGORIES
        .iter()
        .map(|c| ItemGroup {
            key: c.key.to_string(),
            name: c.name.to_string(),
            items: (c.first_item..=c.last_item).collect(),
        })
        .collect()
});

impl Instrument for Psa {
    fn code(&self) -> &str {
        CODE
    }

    fn name(&self) -> &str {
        "PSA - Perfil Sensorial do Adulto/Adolescente"
    }

    fn description(&self) -> &str {
        "Perfil Sensorial do Adulto/Adolescente - Avaliação de processamento sensorial em 6 categorias"
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn item_count(&self) -> u16 {
        60
    }

    fn answer_range(&self) -> AnswerRange {
        AnswerRange::new(1, 5)
    }

    fn option_label(&self, value: i32) -> String {
        usize::try_from(value - 1)
            .ok()
            .and_then(|i| OPTIONS.get(i))
            .map_or_else(|| value.to_string(), |s| s.to_string())
    }

    fn groups(&self) -> &[ItemGroup] {
        &GROUPS
    }

    fn category_of(&self, item: u16) -> Option<String> {
        CATEGORIES
            .iter()
            .find(|c| (c.first_item..=c.last_item).contains(&item))
            .map(|c| c.key.to_string())
    }

    fn extra_keys(&self) -> &[&str] {
        &COMMENT_KEYS
    }

    fn score(&self, answers: &Answers, ctx: &ScoringContext<'_>) -> ScaleResults {
        let categories: Vec<PsaCategory> = CATEGORIES
            .iter()
            .map(|def| category_score(answers, def))
            .collect();
        let raw_score = categories.iter().map(|c| c.total).sum();
        let level = overall_level(&categories);

        ScaleResults::Psa(PsaResults {
            header: ResultsHeader::new(CODE, self.version(), ctx.computed_at),
            patient_info: PsaPatientInfo {
                age: ctx.patient_age(),
                gender: ctx.patient.and_then(|p| p.gender),
            },
            raw_score,
            total_possible: TOTAL_POSSIBLE,
            level,
            description: describe(&categories, raw_score),
            comments: comments(answers),
            categories,
        })
    }
}

pub fn category_score(answers: &Answers, def: &CategoryDef) -> PsaCategory {
    let total_items = def.last_item - def.first_item + 1;
    let values: Vec<i32> = (def.first_item..=def.last_item)
        .filter_map(|n| answer_value(answers, n))
        .collect();

    if values.is_empty() {
        return PsaCategory {
            key: def.key.to_string(),
            name: def.name.to_string(),
            total: 0,
            average: 0.0,
            answered_items: 0,
            total_items,
            completion_rate: 0.0,
            interpretation: "Não respondido".to_string(),
        };
    }

    let total: i32 = values.iter().sum();
    let answered = values.len() as u16;
    let average = f64::from(total) / f64::from(answered);

    PsaCategory {
        key: def.key.to_string(),
        name: def.name.to_string(),
        total,
        average: round_to(average, 2),
        answered_items: answered,
        total_items,
        completion_rate: round_to(f64::from(answered) / f64::from(total_items) * 100.0, 1),
        interpretation: average_band(average).to_string(),
    }
}

/// Frequency band for a category average (unrounded).
pub fn average_band(average: f64) -> &'static str {
    if (0.0..1.5).contains(&average) {
        "Quase nunca"
    } else if (1.5..2.5).contains(&average) {
        "Raramente/Ocasionalmente"
    } else if (2.5..3.5).contains(&average) {
        "Ocasionalmente/Frequentemente"
    } else if (3.5..4.5).contains(&average) {
        "Frequentemente"
    } else if (4.5..=5.0).contains(&average) {
        "Quase sempre"
    } else {
        "Pontuação inválida"
    }
}

/// Unanswered categories average 0 and so count toward the low side.
pub fn overall_level(categories: &[PsaCategory]) -> PsaLevel {
    let high = categories.iter().filter(|c| c.average >= HIGH_AVERAGE).count();
    let low = categories.iter().filter(|c| c.average <= LOW_AVERAGE).count();

    if high >= 4 {
        PsaLevel::High
    } else if low >= 4 {
        PsaLevel::Low
    } else if high >= 2 && low >= 2 {
        PsaLevel::Mixed
    } else {
        PsaLevel::Typical
    }
}

fn describe(categories: &[PsaCategory], total: i32) -> String {
    let mut parts = vec![format!("Pontuação total: {total}/{TOTAL_POSSIBLE}")];

    let high: Vec<&str> = categories
        .iter()
        .filter(|c| c.average >= HIGH_AVERAGE)
        .map(|c| c.name.as_str())
        .collect();
    if !high.is_empty() {
        parts.push(format!(
            "Categorias com alta responsividade: {}",
            high.join(", ")
        ));
    }

    let low: Vec<&str> = categories
        .iter()
        .filter(|c| c.average <= LOW_AVERAGE)
        .map(|c| c.name.as_str())
        .collect();
    if !low.is_empty() {
        parts.push(format!(
            "Categorias com baixa responsividade: {}",
            low.join(", ")
        ));
    }

    parts.join(". ")
}

fn comments(answers: &Answers) -> Vec<PsaComment> {
    CATEGORIES
        .iter()
        .zip(COMMENT_KEYS)
        .filter_map(|(def, key)| {
            let comment = answers.get(key)?.trim();
            (!comment.is_empty()).then(|| PsaComment {
                category_key: def.key.to_string(),
                category: def.name.to_string(),
                comment: comment.to_string(),
            })
        })
        .collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
