//! SRS-2 interpretation: domain ordering, severity ladders, integrated
//! self/hetero narrative and the comparison table.

use psyscale_core::models::{Gender, Patient, ScaleResponse, Srs2Level, Srs2Results};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::text::{capitalize, join_list, titleize};
use crate::error::InstrumentError;
use crate::instruments::srs2::SUBSCALES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DomainInfo {
    pub key: String,
    pub title: String,
    pub level: Srs2Level,
    pub t_score: Option<i32>,
    pub raw_score: i32,
    pub percentile: Option<i32>,
    pub description: String,
    pub interpretation: String,
    pub items: Vec<u16>,
}

/// Read-only view of one scored SRS-2 response.
#[derive(Debug, Clone, Copy)]
pub struct Srs2Report<'a> {
    pub response: &'a ScaleResponse,
    pub results: &'a Srs2Results,
}

impl<'a> Srs2Report<'a> {
    pub fn new(response: &'a ScaleResponse) -> Result<Self, InstrumentError> {
        if !response.is_srs2() {
            return Err(InstrumentError::ResultsMismatch(response.id.to_string()));
        }
        let results = response
            .results
            .as_srs2()
            .ok_or_else(|| InstrumentError::ResultsMismatch(response.id.to_string()))?;
        Ok(Self { response, results })
    }

    pub fn total_t_score(&self) -> Option<i32> {
        self.results.metrics.t_score
    }

    pub fn relator_name(&self) -> Option<&str> {
        non_blank(self.response.relator_name.as_deref())
    }

    pub fn relator_relationship(&self) -> Option<&str> {
        non_blank(self.response.relator_relationship.as_deref())
    }

    /// Domains in display order, those with any impairment first and the
    /// normal ones last.
    pub fn domains(&self) -> Vec<DomainInfo> {
        let (normal, flagged): (Vec<DomainInfo>, Vec<DomainInfo>) = SUBSCALES
            .iter()
            .filter_map(|def| self.results.subscale(def.key))
            .map(|s| DomainInfo {
                key: s.key.clone(),
                title: s.title.clone(),
                level: s.level,
                t_score: s.t_score,
                raw_score: s.raw_score,
                percentile: s.percentile,
                description: s.description.clone(),
                interpretation: s.interpretation.clone(),
                items: s.items.clone(),
            })
            .partition(|d| d.level == Srs2Level::Normal);
        flagged.into_iter().chain(normal).collect()
    }

    pub fn domains_at(&self, level: Srs2Level) -> Vec<DomainInfo> {
        self.domains()
            .into_iter()
            .filter(|d| d.level == level)
            .collect()
    }

    /// Titles of the domains at `level`, joined for prose.
    pub fn print_domains(&self, level: Srs2Level) -> String {
        let titles: Vec<String> = self.domains_at(level).into_iter().map(|d| d.title).collect();
        join_list(&titles)
    }

    /// Highest T-score within the most severe populated level.
    pub fn worst_domain(&self) -> Option<DomainInfo> {
        [
            Srs2Level::Severo,
            Srs2Level::Moderado,
            Srs2Level::Leve,
            Srs2Level::Normal,
        ]
        .into_iter()
        .map(|l| self.domains_at(l))
        .find(|d| !d.is_empty())
        .and_then(|d| first_max(&d).cloned())
    }

    /// Lowest T-score within the mildest impaired level, normal last.
    pub fn lowest_domain(&self) -> Option<DomainInfo> {
        [
            Srs2Level::Leve,
            Srs2Level::Moderado,
            Srs2Level::Severo,
            Srs2Level::Normal,
        ]
        .into_iter()
        .map(|l| self.domains_at(l))
        .find(|d| !d.is_empty())
        .and_then(|d| first_min(&d).cloned())
    }

    pub fn second_highest_domain(&self) -> Option<DomainInfo> {
        let all = self.domains();
        if all.len() < 2 {
            return None;
        }
        sorted_desc(all).into_iter().nth(1)
    }

    /// Runner-up to [`Self::worst_domain`], stepping down a level when the
    /// worst level holds a single domain.
    pub fn second_worst_domain(&self) -> Option<DomainInfo> {
        let severo = self.domains_at(Srs2Level::Severo);
        let moderado = self.domains_at(Srs2Level::Moderado);
        let leve = self.domains_at(Srs2Level::Leve);
        let normal = self.domains_at(Srs2Level::Normal);

        if severo.len() >= 2 {
            sorted_desc(severo).into_iter().nth(1)
        } else if severo.len() == 1 && !moderado.is_empty() {
            first_max(&moderado).cloned()
        } else if severo.is_empty() && moderado.len() >= 2 {
            sorted_desc(moderado).into_iter().nth(1)
        } else if moderado.len() == 1 && !leve.is_empty() {
            first_max(&leve).cloned()
        } else if moderado.is_empty() && leve.len() >= 2 {
            sorted_desc(leve).into_iter().nth(1)
        } else if leve.len() == 1 && !normal.is_empty() {
            first_max(&normal).cloned()
        } else if leve.is_empty() && normal.len() >= 2 {
            sorted_desc(normal).into_iter().nth(1)
        } else {
            None
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// Ties keep the earliest domain in display order.
fn first_max(domains: &[DomainInfo]) -> Option<&DomainInfo> {
    domains.iter().fold(None, |best: Option<&DomainInfo>, d| match best {
        Some(b) if d.t_score <= b.t_score => Some(b),
        _ => Some(d),
    })
}

fn first_min(domains: &[DomainInfo]) -> Option<&DomainInfo> {
    domains.iter().fold(None, |best: Option<&DomainInfo>, d| match best {
        Some(b) if d.t_score >= b.t_score => Some(b),
        _ => Some(d),
    })
}

fn sorted_desc(mut domains: Vec<DomainInfo>) -> Vec<DomainInfo> {
    domains.sort_by(|a, b| b.t_score.cmp(&a.t_score));
    domains
}

// ---------------------------------------------------------------------------
// Integrated narrative
// ---------------------------------------------------------------------------

/// Impairment level used in narrative text. Anything outside 0..=100,
/// including a missing score, reads as severe.
pub fn impairment_level(t_score: Option<i32>) -> Srs2Level {
    match t_score {
        Some(0..=54) => Srs2Level::Normal,
        Some(55..=64) => Srs2Level::Leve,
        Some(65..=74) => Srs2Level::Moderado,
        _ => Srs2Level::Severo,
    }
}

pub fn level_plural(level: Srs2Level) -> &'static str {
    match level {
        Srs2Level::Leve => "prejuízos leves",
        Srs2Level::Moderado => "prejuízos moderados",
        Srs2Level::Severo => "prejuízos severos",
        _ => "ausência de prejuízos significativos",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IntegratedText {
    pub introduction: String,
    pub self_report: String,
    /// Empty when there is no counterpart or it lacks relator details.
    pub hetero_report: String,
}

pub fn integrated_text(
    patient: &Patient,
    report: &Srs2Report<'_>,
    counterpart: Option<&Srs2Report<'_>>,
) -> IntegratedText {
    IntegratedText {
        introduction: introduction(patient, report),
        self_report: self_report_text(patient, report),
        hetero_report: counterpart
            .map(|c| hetero_report_text(patient, c))
            .unwrap_or_default(),
    }
}

pub fn introduction(patient: &Patient, report: &Srs2Report<'_>) -> String {
    let t_score = report.total_t_score();
    let plural = level_plural(impairment_level(t_score));
    let shown = t_score.map_or_else(|| "N/A".to_string(), |t| t.to_string());

    format!(
        "{} respondeu à Escala SRS-2, instrumento que tem como objetivo mensurar sintomas \
         associados ao Transtorno do Espectro Autista (TEA), bem como classificá-los em níveis \
         leves, moderados ou severos. {} obteve como pontuação total nesse instrumento {shown} \
         pontos, caracterizando {plural} relacionados ao TEA, de forma geral. A SRS é uma escala \
         amplamente utilizada para avaliar a responsividade social e identificar sinais de \
         comprometimento associados ao TEA.",
        titleize(&patient.full_name),
        capitalize(patient.first_name()),
    )
}

pub fn self_report_text(patient: &Patient, report: &Srs2Report<'_>) -> String {
    let first = capitalize(patient.first_name());
    let flagged: Vec<String> = report
        .domains()
        .into_iter()
        .filter(|d| d.level != Srs2Level::Normal)
        .map(|d| d.title)
        .collect();

    if flagged.is_empty() {
        format!("{first} não apresenta dificuldades significativas nos domínios avaliados.")
    } else {
        format!(
            "{first} apresenta dificuldades nos seguintes domínios: {}.",
            join_list(&flagged)
        )
    }
}

pub fn hetero_report_text(patient: &Patient, report: &Srs2Report<'_>) -> String {
    let (Some(relator), Some(relationship)) = (report.relator_name(), report.relator_relationship())
    else {
        return String::new();
    };

    let male = patient.gender == Some(Gender::Male);
    let first = capitalize(patient.first_name());
    let plural = level_plural(impairment_level(report.total_t_score()));

    let mut text = format!(
        "De acordo com {relator}, que é {} {} paciente, {first} apresenta {} de forma geral, \
         nos domínios avaliados pela escala SRS-2.",
        relationship.to_lowercase(),
        if male { "do" } else { "da" },
        plural.to_lowercase(),
    );
    text.push_str(&level_sentences(patient, report, relator));
    text
}

fn level_sentences(patient: &Patient, report: &Srs2Report<'_>, relator: &str) -> String {
    let first = capitalize(patient.first_name());
    let relator_first = relator
        .split_whitespace()
        .next()
        .map_or_else(|| relator.to_string(), capitalize);
    let male = patient.gender == Some(Gender::Male);
    let mut text = String::new();

    if !report.domains_at(Srs2Level::Leve).is_empty() {
        text.push_str(&format!(
            " Em sua visão, {first} demonstra algumas dificuldades nos domínios de {}.",
            report.print_domains(Srs2Level::Leve)
        ));
    }

    let moderado = report.domains_at(Srs2Level::Moderado).len();
    if moderado > 0 {
        let many = moderado > 1;
        text.push_str(&format!(
            " {} {} por {relator_first} em nível moderado, identificando claramente {} de dificuldade.",
            report.print_domains(Srs2Level::Moderado),
            if many { "foram classificados" } else { "foi classificado" },
            if many { "áreas" } else { "uma área" },
        ));
    }

    let severo = report.domains_at(Srs2Level::Severo).len();
    if severo > 0 {
        let many = severo > 1;
        text.push_str(&format!(
            " {} {} como {} em que {} paciente apresenta nível severo de prejuízo e requer maior atenção.",
            if many { "Destacaram-se" } else { "Destaca-se" },
            report.print_domains(Srs2Level::Severo),
            if many { "pontos" } else { "ponto" },
            if male { "o" } else { "a" },
        ));
    }

    if !report.domains_at(Srs2Level::Normal).is_empty() {
        text.push_str(&format!(
            " {relator_first} não observou necessidades significativas em relação a {}.",
            report.print_domains(Srs2Level::Normal)
        ));
    }

    text
}

// ---------------------------------------------------------------------------
// Counterpart lookup and comparison
// ---------------------------------------------------------------------------

/// Most recent completed response of the opposite SRS-2 form for the same
/// patient: the hetero report for a self report, and vice versa.
pub fn find_counterpart<'a>(
    response: &ScaleResponse,
    history: &'a [ScaleResponse],
) -> Option<&'a ScaleResponse> {
    let wanted = if response.is_self_report() {
        psyscale_core::models::scale_response::HETERO_REPORT_CODE
    } else if response.is_hetero_report() {
        psyscale_core::models::scale_response::SELF_REPORT_CODE
    } else {
        return None;
    };

    history
        .iter()
        .filter(|r| r.patient_id == response.patient_id && r.scale_code == wanted)
        .filter(|r| !r.is_deleted())
        .max_by_key(|r| r.completed_at)
}

/// All completed hetero reports for a patient, newest first.
pub fn hetero_reports(patient_id: Uuid, history: &[ScaleResponse]) -> Vec<&ScaleResponse> {
    let mut reports: Vec<&ScaleResponse> = history
        .iter()
        .filter(|r| r.patient_id == patient_id && r.is_hetero_report() && !r.is_deleted())
        .collect();
    reports.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    reports
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComparisonRow {
    pub key: String,
    pub label: String,
    pub self_t_score: Option<i32>,
    pub hetero_t_score: Option<i32>,
    /// Hetero minus self, when both are present.
    pub difference: Option<i32>,
    pub self_level: Srs2Level,
    pub hetero_level: Srs2Level,
}

const COMPARISON_DOMAINS: [(&str, &str); 7] = [
    ("social_awareness", "Percepção Social"),
    ("social_cognition", "Cognição Social"),
    ("social_communication", "Comunicação Social"),
    ("social_motivation", "Motivação Social"),
    ("restricted_interests", "Interesses Restritos/Repetitivos"),
    ("social_interaction", "Interação Social"),
    ("total", "Total"),
];

fn domain_t_score(results: &Srs2Results, key: &str) -> Option<i32> {
    if key == "total" {
        results.metrics.t_score
    } else {
        results.subscale(key)?.t_score
    }
}

/// Side-by-side T-scores for the six domains plus the total.
pub fn comparison_rows(self_report: &Srs2Results, hetero_report: &Srs2Results) -> Vec<ComparisonRow> {
    COMPARISON_DOMAINS
        .iter()
        .map(|&(key, label)| {
            let self_t = domain_t_score(self_report, key);
            let hetero_t = domain_t_score(hetero_report, key);
            ComparisonRow {
                key: key.to_string(),
                label: label.to_string(),
                self_t_score: self_t,
                hetero_t_score: hetero_t,
                difference: self_t.zip(hetero_t).map(|(s, h)| h - s),
                self_level: Srs2Level::from_t_score(self_t),
                hetero_level: Srs2Level::from_t_score(hetero_t),
            }
        })
        .collect()
}
