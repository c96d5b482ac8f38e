use jiff::civil::Date;
use psyscale_core::models::{Answers, Patient};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::lookup::NormTables;

/// Inclusive range of accepted answer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerRange {
    pub min: i32,
    pub max: i32,
}

impl AnswerRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Parse a submitted value. Only the canonical form is accepted, so
    /// `"3"` passes while `" 3"` or `"03"` do not.
    pub fn parse(&self, value: &str) -> Option<i32> {
        let n: i32 = value.parse().ok()?;
        (n >= self.min && n <= self.max && n.to_string() == value).then_some(n)
    }

    pub fn values(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

/// A named group of items scored together (SRS-2 subscale, PSA category).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemGroup {
    pub key: String,
    pub name: String,
    pub items: Vec<u16>,
}

/// One problem found in a submitted answer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerError {
    #[error("as respostas não podem ficar em branco")]
    Blank,

    #[error("itens obrigatórios não respondidos: {}", join_numbers(.items))]
    MissingRequired { items: Vec<u16> },

    #[error("chave de resposta inválida: {key}")]
    InvalidKey { key: String },

    #[error("valor inválido para {key}: {value} (esperado de {min} a {max})")]
    InvalidValue {
        key: String,
        value: String,
        min: i32,
        max: i32,
    },

    #[error("{field} é obrigatório para formulários de heterorrelato")]
    MissingRelatorField { field: String },
}

fn join_numbers(items: &[u16]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Item number encoded in an `item_<n>` key.
pub fn item_number(key: &str) -> Option<u16> {
    let digits = key.strip_prefix("item_")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Lenient integer read used by scoring: anything unparseable counts as 0.
pub fn answer_value(answers: &Answers, number: u16) -> Option<i32> {
    answers
        .get(&format!("item_{number}"))
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().parse().unwrap_or(0))
}

/// Ordered answer checks: blank, then missing required items, then the first
/// malformed or out-of-scale key, then the first out-of-range value.
pub fn check_answers(
    answers: &Answers,
    required: &[u16],
    item_count: u16,
    range: AnswerRange,
    extra_keys: &[&str],
) -> Vec<AnswerError> {
    if answers.is_empty() {
        return vec![AnswerError::Blank];
    }

    let mut errors = Vec::new();

    let answered: Vec<u16> = answers.keys().filter_map(|k| item_number(k)).collect();
    let mut missing: Vec<u16> = required
        .iter()
        .copied()
        .filter(|n| !answered.contains(n))
        .collect();
    missing.sort_unstable();
    missing.dedup();
    if !missing.is_empty() {
        errors.push(AnswerError::MissingRequired { items: missing });
    }

    for (key, value) in answers {
        if extra_keys.contains(&key.as_str()) {
            continue;
        }
        if !item_number(key).is_some_and(|n| (1..=item_count).contains(&n)) {
            errors.push(AnswerError::InvalidKey { key: key.clone() });
            break;
        }
        if range.parse(value).is_none() {
            errors.push(AnswerError::InvalidValue {
                key: key.clone(),
                value: value.clone(),
                min: range.min,
                max: range.max,
            });
            break;
        }
    }

    errors
}

/// Everything scoring needs beyond the answers themselves.
pub struct ScoringContext<'a> {
    pub patient: Option<&'a Patient>,
    pub today: Date,
    pub computed_at: jiff::Timestamp,
    pub norms: &'a NormTables,
}

impl ScoringContext<'_> {
    pub fn patient_age(&self) -> Option<i16> {
        self.patient.map(|p| p.age_on(self.today))
    }
}
