use std::sync::LazyLock;

use psyscale_core::models::scale_response::{HETERO_REPORT_CODE, SELF_REPORT_CODE};
use psyscale_core::models::{
    Answers, Gender, Patient, ResultsHeader, ScaleResults, Srs2Interpretation, Srs2Level,
    Srs2Metrics, Srs2Results, Srs2Subscale,
};

use crate::Instrument;
use crate::interpretation::text::titleize;
use crate::lookup::{Demographics, NormScore, ReportKind};
use crate::scoring::{AnswerRange, ItemGroup, ScoringContext, answer_value, item_number};

/// SRS-2: Social Responsiveness Scale, Second Edition.
/// 65 items answered 1 to 4; higher scores mean more difficulty.
pub struct Srs2 {
    kind: ReportKind,
}

pub const RESULTS_CODE: &str = "SRS-2";

/// Items worded in the positive direction; their answers are reversed.
pub const INVERTED_ITEMS: [u16; 17] = [
    3, 7, 11, 12, 15, 17, 21, 22, 26, 32, 38, 40, 43, 45, 48, 52, 55,
];

pub struct SubscaleDef {
    pub key: &'static str,
    pub title: &'static str,
    /// Column prefix in the norm tables.
    pub lookup_name: &'static str,
    pub description: &'static str,
    pub items: &'static [u16],
}

pub const SUBSCALES: [SubscaleDef; 6] = [
    SubscaleDef {
        key: "social_awareness",
        title: "Percepção Social",
        lookup_name: "social_awareness",
        description: "captar pistas sociais básicas e compreender aspectos perceptivos do comportamento recíproco.",
        items: &[2, 7, 25, 32, 45, 52, 54, 56],
    },
    SubscaleDef {
        key: "social_cognition",
        title: "Cognição Social",
        lookup_name: "social_cognition",
        description: "capacidade de processar informações sociais, lidando com o aspecto cognitivo do comportamento social.",
        items: &[5, 10, 15, 17, 30, 40, 42, 44, 48, 58, 59, 62],
    },
    SubscaleDef {
        key: "social_communication",
        title: "Comunicação Social",
        lookup_name: "social_communication",
        description: "comunicação expressiva, lidando com os aspectos motores do comportamento social recíproco",
        items: &[
            12, 13, 16, 18, 19, 21, 22, 26, 33, 35, 36, 37, 38, 41, 46, 47, 51, 53, 55, 57, 60, 61,
        ],
    },
    SubscaleDef {
        key: "social_motivation",
        title: "Motivação Social",
        lookup_name: "social_motivation",
        description: "interesse e capacidade de engajar-se em comportamentos sociais e interpessoais",
        items: &[1, 3, 6, 9, 11, 23, 27, 34, 43, 64, 65],
    },
    SubscaleDef {
        key: "restricted_interests",
        title: "Interesses Restritos e Comportamentos Repetitivos",
        lookup_name: "repetitive_patterns",
        description: "comportamentos estereotipados, interesses restritos ou fixações (como foco excessivo em temas específicos ou insistência em rotinas).",
        items: &[4, 8, 14, 20, 24, 28, 29, 31, 39, 49, 50, 63],
    },
    SubscaleDef {
        key: "social_interaction",
        title: "Interação Social Global",
        lookup_name: "social_interaction",
        description: "reconhecimento e interpretação de sinais sociais, bem como motivação para o contato interpessoal social expressivo.",
        items: &[
            1, 2, 3, 5, 6, 7, 9, 10, 11, 12, 13, 15, 16, 17, 18, 19, 21, 22, 23, 25, 26, 27, 30,
            32, 33, 34, 35, 36, 37, 38, 40, 41, 42, 43, 44, 45, 46, 47, 48, 51, 52, 53, 54, 55, 56,
            57, 58, 59, 60, 61, 62, 63, 64, 65,
        ],
    },
];

const OPTIONS: [&str; 4] = [
    "Nunca é verdade",
    "Raramente é verdade",
    "Às vezes é verdade",
    "Frequentemente é verdade",
];

static GROUPS: LazyLock<Vec<ItemGroup>> = LazyLock::new(|| {
    SUBSCALES
        .iter()
        .map(|s| ItemGroup {
            key: s.key.to_string(),
            name: s.title.to_string(),
            items: s.items.to_vec(),
        })
        .collect()
});

impl Srs2 {
    pub const fn self_report() -> Self {
        Self {
            kind: ReportKind::SelfReport,
        }
    }

    pub const fn hetero_report() -> Self {
        Self {
            kind: ReportKind::HeteroReport,
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }
}

impl Instrument for Srs2 {
    fn code(&self) -> &str {
        match self.kind {
            ReportKind::SelfReport => SELF_REPORT_CODE,
            ReportKind::HeteroReport => HETERO_REPORT_CODE,
        }
    }

    fn name(&self) -> &str {
        match self.kind {
            ReportKind::SelfReport => "SRS-2 Autorrelato",
            ReportKind::HeteroReport => "SRS-2 Heterorrelato",
        }
    }

    fn description(&self) -> &str {
        match self.kind {
            ReportKind::SelfReport => {
                "Escala de Responsividade Social - Segunda Edição (Autorrelato)"
            }
            ReportKind::HeteroReport => {
                "Escala de Responsividade Social - Segunda Edição (Heterorrelato)"
            }
        }
    }

    fn version(&self) -> &str {
        "2.0"
    }

    fn item_count(&self) -> u16 {
        65
    }

    fn answer_range(&self) -> AnswerRange {
        AnswerRange::new(1, 4)
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

    fn requires_relator(&self) -> bool {
        self.kind == ReportKind::HeteroReport
    }

    fn score(&self, answers: &Answers, ctx: &ScoringContext<'_>) -> ScaleResults {
        ScaleResults::Srs2(score(answers, self.kind, self.version(), ctx))
    }
}

/// Item contribution on the 0 to 3 scale, reversing inverted items.
pub fn item_score(number: u16, value: i32) -> i32 {
    if INVERTED_ITEMS.contains(&number) {
        4 - value
    } else {
        value - 1
    }
}

/// Sum over every answered item.
pub fn raw_score(answers: &Answers) -> i32 {
    answers
        .iter()
        .filter_map(|(k, v)| Some(item_score(item_number(k)?, v.trim().parse().unwrap_or(0))))
        .sum()
}

/// Sum over a subscale's items. An unanswered item counts as answer 0, which
/// contributes -1 (or 4 when inverted).
pub fn subscale_raw(answers: &Answers, items: &[u16]) -> i32 {
    items
        .iter()
        .map(|&n| item_score(n, answer_value(answers, n).unwrap_or(0)))
        .sum()
}

pub fn score(
    answers: &Answers,
    kind: ReportKind,
    version: &str,
    ctx: &ScoringContext<'_>,
) -> Srs2Results {
    let demographics = ctx.patient.and_then(|p| {
        Some(Demographics {
            gender: p.gender?,
            age: p.age_on(ctx.today),
            kind,
        })
    });

    let raw = raw_score(answers);
    let total = demographics
        .map(|d| ctx.norms.total(d, raw))
        .unwrap_or_default();
    let level = Srs2Level::from_t_score(total.t_score);

    let subscales = SUBSCALES
        .iter()
        .map(|def| {
            let sub_raw = subscale_raw(answers, def.items);
            let NormScore {
                t_score,
                percentile,
            } = demographics
                .map(|d| ctx.norms.subscale(d, def.lookup_name, sub_raw))
                .unwrap_or_default();
            let sub_level = Srs2Level::from_t_score(t_score);
            Srs2Subscale {
                key: def.key.to_string(),
                title: def.title.to_string(),
                raw_score: sub_raw,
                t_score,
                percentile,
                level: sub_level,
                description: def.description.to_string(),
                interpretation: subscale_interpretation(def.key, sub_level, ctx.patient),
                items: def.items.to_vec(),
            }
        })
        .collect();

    tracing::debug!(raw_score = raw, t_score = ?total.t_score, level = level.as_str(), "scored SRS-2");

    Srs2Results {
        header: ResultsHeader::new(RESULTS_CODE, version, ctx.computed_at),
        metrics: Srs2Metrics {
            raw_score: raw,
            t_score: total.t_score,
            percentile: total.percentile,
            level,
            level_plural: level.plural().to_string(),
        },
        subscales,
        interpretation: Srs2Interpretation {
            level,
            rules: "SRS-2 v2.0 cutoffs (65 itens, escala 1-4)".to_string(),
            description: level.description().to_string(),
            total_range: "65-260".to_string(),
            items_count: 65,
        },
    }
}

/// Per-subscale sentence about the patient. Uses the title-cased first name,
/// or gendered pronouns and articles, depending on the subscale.
pub fn subscale_interpretation(key: &str, level: Srs2Level, patient: Option<&Patient>) -> String {
    const UNAVAILABLE: &str = "Interpretação não disponível.";

    let name = patient.map(|p| titleize(p.first_name())).unwrap_or_default();
    let male = patient.and_then(|p| p.gender) == Some(Gender::Male);
    let pronoun = if male { "Ele" } else { "Ela" };
    let article = if male { "O" } else { "A" };
    let motivated = if male { "motivado" } else { "motivada" };

    match (key, level) {
        (_, Srs2Level::Invalid) => UNAVAILABLE.to_string(),

        ("social_awareness", Srs2Level::Normal) => format!("{name} não apresenta, de acordo com seu entendimento, dificuldades em percepção social, ou seja, considera-se capaz de captar pistas sociais básicas e compreender aspectos perceptivos do comportamento recíproco."),
        ("social_awareness", Srs2Level::Leve) => format!("{name} percebe que possui dificuldades na interpretação de pistas sociais ou aspectos perceptivos do comportamento recíproco."),
        ("social_awareness", Srs2Level::Moderado) => format!("{name} reconhece dificuldades importantes na interpretação de pistas sociais e aspectos perceptivos do comportamento recíproco."),
        ("social_awareness", Srs2Level::Severo) => format!("{name} reconhece dificuldades graves e limitações significativas que impactam severamente a compreensão de pistas sociais e aspectos perceptivos do comportamento recíproco."),

        ("social_cognition", Srs2Level::Normal) => format!("{name} não percebe dificuldades na compreensão de nuances do comportamento alheio, o que minimiza possíveis mal-entendidos ou interpretações literais."),
        ("social_cognition", Srs2Level::Leve) => format!("{name} percebe que possui dificuldades para compreender nuances do comportamento alheio, o que pode levar a mal-entendidos ou interpretações literais."),
        ("social_cognition", Srs2Level::Moderado) => format!("{name} reconhece dificuldades importantes para compreender nuances do comportamento alheio, o que pode levar a mal-entendidos, dificuldades de comunicação ou interpretações literais."),
        ("social_cognition", Srs2Level::Severo) => format!("{name} reconhece dificuldades graves e limitações significativas que impactam severamente a compreensão de nuances do comportamento alheio, o que pode causar mal-entendidos, interpretações literais e a possibilidade de impacto funcional no fluxo de comunicação."),

        ("social_communication", Srs2Level::Normal) => format!("{pronoun} não percebe dificuldades significativas em sua comunicação social, considera-se capaz de expressar ideias, sentimentos ou respostas sociais."),
        ("social_communication", Srs2Level::Leve) => format!("{pronoun} percebe prejuízo leve na fluência da comunicação social, na expressão adequada de ideias, sentimentos e respostas sociais."),
        ("social_communication", Srs2Level::Moderado) => format!("{pronoun} reconhece prejuízos na fluência comunicativa, especialmente na expressão adequada de ideias, de sentimentos e nas respostas sociais."),
        ("social_communication", Srs2Level::Severo) => format!("{pronoun} relata graves dificuldades na fluência de sua comunicação social, especialmente na expressão adequada de ideias, ou de seus sentimentos e respostas sociais."),

        ("social_motivation", Srs2Level::Normal) => format!("{article} paciente não relata inibição ou desinteresse para interações espontâneas, considera-se {motivated} a realizar interações sociais e interpessoais."),
        ("social_motivation", Srs2Level::Leve) => format!("{article} paciente relata inibição leve para interações espontâneas, o que pode se manifestar como retraimento, desconforto em grupos ou evitamento de situações sociais."),
        ("social_motivation", Srs2Level::Moderado) => format!("{article} paciente relata inibição moderada para interações espontâneas, o que pode se manifestar como retraimento, desconforto em grupos ou evitamento de situações sociais."),
        ("social_motivation", Srs2Level::Severo) => format!("{article} paciente relata graves dificuldades para interações espontâneas, manifestando-se como retraimento, desconforto em grupos e evitamento de situações sociais."),

        ("restricted_interests", Srs2Level::Normal) => format!("{name} não apresenta, de acordo com sua percepção, traços associados a padrões de comportamento estereotipado, interesses restritos ou fixações."),
        ("restricted_interests", Srs2Level::Leve) => format!("{name} reconhece traços compatíveis com este padrão, com prejuízo leve em sua rotina, hábitos e interesses"),
        ("restricted_interests", Srs2Level::Moderado) => format!("{name} reconhece traços compatíveis com este padrão, com prejuízo moderado em sua rotina, hábitos e ações ligadas a seus interesses"),
        ("restricted_interests", Srs2Level::Severo) => format!("{name} reconhece traços compatíveis com este padrão, com prejuízo severo e limitações em sua rotina com relação a hábitos e fixações"),

        ("social_interaction", Srs2Level::Normal) => "A soma dos domínios comprometidos sugere comportamento normal ou de baixa necessidade de adaptação em sua capacidade de estabelecer e sustentar trocas interpessoais de maneira funcional.".to_string(),
        ("social_interaction", Srs2Level::Leve) => "A soma dos domínios comprometidos indica prejuízo leve em sua capacidade de estabelecer e sustentar trocas interpessoais de maneira funcional.".to_string(),
        ("social_interaction", Srs2Level::Moderado) => "A soma dos domínios comprometidos indica prejuízo moderado e dificuldades em sua capacidade de estabelecer e sustentar trocas interpessoais de maneira funcional".to_string(),
        ("social_interaction", Srs2Level::Severo) => "A soma dos domínios comprometidos aponta prejuízo severo e dificuldades significativas em sua capacidade de estabelecer e sustentar trocas interpessoais de maneira funcional".to_string(),

        _ => UNAVAILABLE.to_string(),
    }
}
