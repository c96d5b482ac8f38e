//! Scored result shapes persisted alongside each response.
//!
//! Every variant carries a [`ResultsHeader`] so stored blobs can be migrated
//! by `schema_version` later.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::patient::Gender;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultsHeader {
    pub schema_version: u32,
    pub scale_code: String,
    pub scale_version: String,
    pub computed_at: jiff::Timestamp,
}

impl ResultsHeader {
    pub const SCHEMA_VERSION: u32 = 1;

    pub fn new(
        scale_code: impl Into<String>,
        scale_version: impl Into<String>,
        computed_at: jiff::Timestamp,
    ) -> Self {
        Self {
            schema_version: Self::SCHEMA_VERSION,
            scale_code: scale_code.into(),
            scale_version: scale_version.into(),
            computed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "scale_kind", rename_all = "snake_case")]
pub enum ScaleResults {
    Srs2(Srs2Results),
    Psa(PsaResults),
    /// Summed scales with fixed cutoff bands (BDI, BAI).
    Banded(BandedResults),
    Summed(SummedResults),
}

impl ScaleResults {
    pub fn header(&self) -> &ResultsHeader {
        match self {
            ScaleResults::Srs2(r) => &r.header,
            ScaleResults::Psa(r) => &r.header,
            ScaleResults::Banded(r) => &r.header,
            ScaleResults::Summed(r) => &r.header,
        }
    }

    /// Headline score stored on the response record.
    pub fn total_score(&self) -> i32 {
        match self {
            ScaleResults::Srs2(r) => r.metrics.raw_score,
            ScaleResults::Psa(r) => r.raw_score,
            ScaleResults::Banded(r) => r.total,
            ScaleResults::Summed(r) => r.total,
        }
    }

    /// Short interpretation label stored on the response record.
    pub fn headline(&self) -> String {
        match self {
            ScaleResults::Srs2(r) => r.interpretation.description.clone(),
            ScaleResults::Psa(r) => r.level.label().to_string(),
            ScaleResults::Banded(r) => r.level.clone(),
            ScaleResults::Summed(r) => r.interpretation.clone(),
        }
    }

    pub fn as_srs2(&self) -> Option<&Srs2Results> {
        match self {
            ScaleResults::Srs2(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_psa(&self) -> Option<&PsaResults> {
        match self {
            ScaleResults::Psa(r) => Some(r),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SRS-2
// ---------------------------------------------------------------------------

/// Impairment band of an SRS-2 T-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Srs2Level {
    Normal,
    Leve,
    Moderado,
    Severo,
    Invalid,
}

impl Srs2Level {
    pub fn from_t_score(t_score: Option<i32>) -> Self {
        match t_score {
            Some(0..=54) => Srs2Level::Normal,
            Some(55..=64) => Srs2Level::Leve,
            Some(65..=74) => Srs2Level::Moderado,
            Some(75..=100) => Srs2Level::Severo,
            _ => Srs2Level::Invalid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Srs2Level::Normal => "normal",
            Srs2Level::Leve => "leve",
            Srs2Level::Moderado => "moderado",
            Srs2Level::Severo => "severo",
            Srs2Level::Invalid => "Pontuação inválida",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Srs2Level::Normal => "prejuízos de baixa significância clínica",
            Srs2Level::Leve => "prejuízos leves",
            Srs2Level::Moderado => "prejuízos moderados",
            Srs2Level::Severo => "prejuízos severos",
            Srs2Level::Invalid => "Interpretação não disponível.",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Srs2Level::Normal => "Normal",
            Srs2Level::Leve => "Prejuízo Leve",
            Srs2Level::Moderado => "Prejuízo Moderado",
            Srs2Level::Severo => "Prejuízo Severo",
            Srs2Level::Invalid => "Interpretação não disponível.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Srs2Metrics {
    pub raw_score: i32,
    pub t_score: Option<i32>,
    pub percentile: Option<i32>,
    pub level: Srs2Level,
    pub level_plural: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Srs2Subscale {
    /// Stable identifier, e.g. `social_awareness`.
    pub key: String,
    pub title: String,
    pub raw_score: i32,
    pub t_score: Option<i32>,
    pub percentile: Option<i32>,
    pub level: Srs2Level,
    pub description: String,
    pub interpretation: String,
    pub items: Vec<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Srs2Interpretation {
    pub level: Srs2Level,
    pub rules: String,
    pub description: String,
    pub total_range: String,
    pub items_count: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Srs2Results {
    #[serde(flatten)]
    pub header: ResultsHeader,
    pub metrics: Srs2Metrics,
    pub subscales: Vec<Srs2Subscale>,
    pub interpretation: Srs2Interpretation,
}

impl Srs2Results {
    pub fn subscale(&self, key: &str) -> Option<&Srs2Subscale> {
        self.subscales.iter().find(|s| s.key == key)
    }
}

// ---------------------------------------------------------------------------
// PSA
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PsaLevel {
    High,
    Low,
    Mixed,
    Typical,
}

impl PsaLevel {
    pub fn label(self) -> &'static str {
        match self {
            PsaLevel::High => "Padrão de alta responsividade sensorial",
            PsaLevel::Low => "Padrão de baixa responsividade sensorial",
            PsaLevel::Mixed => "Padrão misto de responsividade sensorial",
            PsaLevel::Typical => "Padrão típico de responsividade sensorial",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PsaCategory {
    /// Category letter, `A` through `F`.
    pub key: String,
    pub name: String,
    pub total: i32,
    pub average: f64,
    pub answered_items: u16,
    pub total_items: u16,
    pub completion_rate: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PsaComment {
    pub category_key: String,
    pub category: String,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PsaPatientInfo {
    pub age: Option<i16>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PsaResults {
    #[serde(flatten)]
    pub header: ResultsHeader,
    pub patient_info: PsaPatientInfo,
    pub raw_score: i32,
    pub total_possible: i32,
    pub level: PsaLevel,
    pub description: String,
    pub categories: Vec<PsaCategory>,
    pub comments: Vec<PsaComment>,
}

impl PsaResults {
    pub fn category(&self, key: &str) -> Option<&PsaCategory> {
        self.categories.iter().find(|c| c.key == key)
    }
}

// ---------------------------------------------------------------------------
// Summed scales
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BandedResults {
    #[serde(flatten)]
    pub header: ResultsHeader,
    pub total: i32,
    pub level: String,
    pub rules: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SummedResults {
    #[serde(flatten)]
    pub header: ResultsHeader,
    pub total: i32,
    pub interpretation: String,
}
