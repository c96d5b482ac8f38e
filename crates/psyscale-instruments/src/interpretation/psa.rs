//! PSA interpretation: category views, narrative, recommendations, summary.

use psyscale_core::models::{Patient, PsaCategory, PsaResults, ScaleResponse};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::InstrumentError;
use crate::instruments::psa::{CATEGORIES, HIGH_AVERAGE, LOW_AVERAGE};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryView {
    pub category: String,
    pub title: String,
    pub total_score: i32,
    pub average_score: f64,
    pub interpretation: String,
    pub completion_rate: f64,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PsaReport<'a> {
    pub response: &'a ScaleResponse,
    pub results: &'a PsaResults,
}

impl<'a> PsaReport<'a> {
    pub fn new(response: &'a ScaleResponse) -> Result<Self, InstrumentError> {
        let results = response
            .results
            .as_psa()
            .ok_or_else(|| InstrumentError::ResultsMismatch(response.id.to_string()))?;
        Ok(Self { response, results })
    }

    pub fn comment_for(&self, category: &str) -> Option<&str> {
        self.results
            .comments
            .iter()
            .find(|c| c.category_key == category)
            .map(|c| c.comment.as_str())
    }

    /// Categories A to F in order, with any comment attached.
    pub fn categories(&self) -> Vec<CategoryView> {
        CATEGORIES
            .iter()
            .filter_map(|def| self.results.category(def.key))
            .map(|c| CategoryView {
                category: c.key.clone(),
                title: c.name.clone(),
                total_score: c.total,
                average_score: c.average,
                interpretation: c.interpretation.clone(),
                completion_rate: c.completion_rate,
                comment: self.comment_for(&c.key).map(str::to_string),
            })
            .collect()
    }

    /// Share of the maximum possible score, one decimal.
    pub fn completion_percentage(&self) -> f64 {
        if self.results.total_possible == 0 {
            return 0.0;
        }
        let pct = f64::from(self.results.raw_score) / f64::from(self.results.total_possible) * 100.0;
        (pct * 10.0).round() / 10.0
    }

    pub fn high_categories(&self) -> Vec<&PsaCategory> {
        self.filter(|avg| avg >= HIGH_AVERAGE)
    }

    pub fn low_categories(&self) -> Vec<&PsaCategory> {
        self.filter(|avg| avg <= LOW_AVERAGE)
    }

    pub fn balanced_categories(&self) -> Vec<&PsaCategory> {
        self.filter(|avg| avg > LOW_AVERAGE && avg < HIGH_AVERAGE)
    }

    fn filter(&self, keep: impl Fn(f64) -> bool) -> Vec<&PsaCategory> {
        self.results
            .categories
            .iter()
            .filter(|c| keep(c.average))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recommendation {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PsaSummary {
    pub total_score: String,
    pub completion_percentage: String,
    pub interpretation_level: String,
    pub categories_analyzed: usize,
    pub comments_provided: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PsaInterpretation {
    pub narrative: String,
    pub recommendations: Vec<Recommendation>,
    pub summary: PsaSummary,
}

pub fn interpret(patient: &Patient, report: &PsaReport<'_>) -> PsaInterpretation {
    let high = report.high_categories();
    let low = report.low_categories();

    PsaInterpretation {
        narrative: narrative(patient, report),
        recommendations: recommendations(!high.is_empty(), !low.is_empty()),
        summary: summary(report),
    }
}

fn names(categories: &[&PsaCategory]) -> String {
    categories
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn narrative(patient: &Patient, report: &PsaReport<'_>) -> String {
    let first = patient.first_name();
    let mut parts = vec![
        format!(
            "{} respondeu ao Perfil Sensorial do Adulto/Adolescente (PSA), instrumento que avalia \
             como uma pessoa processa e responde a diferentes tipos de estímulos sensoriais no \
             ambiente.",
            patient.full_name
        ),
        format!(
            "O perfil geral indica: {}.",
            report.results.level.label().to_lowercase()
        ),
    ];

    let high = report.high_categories();
    if !high.is_empty() {
        parts.push(format!(
            "{first} demonstra alta responsividade sensorial nas seguintes áreas: {}. Isso sugere \
             maior sensibilidade a estes tipos de estímulos, podendo necessitar de estratégias de \
             autorregulação.",
            names(&high)
        ));
    }

    let low = report.low_categories();
    if !low.is_empty() {
        parts.push(format!(
            "Por outro lado, apresenta baixa responsividade em: {}. Isso pode indicar menor \
             percepção destes estímulos ou necessidade de estímulos mais intensos para gerar \
             respostas.",
            names(&low)
        ));
    }

    let balanced = report.balanced_categories();
    if !balanced.is_empty() {
        parts.push(format!(
            "Nas áreas de {}, {first} apresenta responsividade dentro dos padrões típicos.",
            names(&balanced)
        ));
    }

    let insights: Vec<String> = report
        .results
        .comments
        .iter()
        .filter(|c| !c.comment.trim().is_empty())
        .map(|c| format!("Em {}, {first} relatou: \"{}\"", c.category, c.comment))
        .collect();
    if !insights.is_empty() {
        parts.push(format!(
            "Observações pessoais relevantes: {}",
            insights.join(". ")
        ));
    }

    parts.join(" ")
}

fn block(title: &str, items: &[&str]) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        items: items.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn recommendations(has_high: bool, has_low: bool) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if has_high {
        out.push(block(
            "Estratégias para Alta Responsividade Sensorial",
            &[
                "Identificar e modificar ambientes que causam sobrecarga sensorial",
                "Desenvolver técnicas de autorregulação (respiração, pausas sensoriais)",
                "Usar ferramentas adaptativas (protetores auriculares, óculos escuros, etc.)",
                "Planejar gradualmente a exposição a estímulos desafiadores",
            ],
        ));
    }

    if has_low {
        out.push(block(
            "Estratégias para Baixa Responsividade Sensorial",
            &[
                "Incorporar atividades com estímulos mais intensos na rotina",
                "Usar alertas visuais ou táteis para aumentar a consciência sensorial",
                "Praticar atividades que envolvam movimento e propriocepção",
                "Estabelecer rotinas que incluam 'pausas sensoriais' estimulantes",
            ],
        ));
    }

    out.push(block(
        "Recomendações Gerais",
        &[
            "Manter um diário sensorial para identificar padrões",
            "Comunicar necessidades sensoriais em ambientes sociais e de trabalho",
            "Considerar avaliação com terapeuta ocupacional especializado em integração sensorial",
            "Explorar técnicas de mindfulness e consciência corporal",
        ],
    ));

    out
}

pub fn summary(report: &PsaReport<'_>) -> PsaSummary {
    PsaSummary {
        total_score: format!(
            "{}/{}",
            report.results.raw_score, report.results.total_possible
        ),
        completion_percentage: format!("{:.1}%", report.completion_percentage()),
        interpretation_level: report.results.level.label().to_string(),
        categories_analyzed: report.categories().len(),
        comments_provided: report.results.comments.len(),
    }
}
