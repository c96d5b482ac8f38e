//! Textual interpretation of scored responses.
//!
//! Only some scales have an interpretation builder; [`supports`] tells which.
//! [`generate`] dispatches on the response's scale code.

pub mod psa;
pub mod srs2;
pub mod text;

use jiff::Timestamp;
use psyscale_core::models::scale_response::{HETERO_REPORT_CODE, SELF_REPORT_CODE};
use psyscale_core::models::{Patient, ScaleResponse, Srs2Level};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::InstrumentError;
use crate::instruments::psa::CODE as PSA_CODE;

use self::psa::{CategoryView, PsaInterpretation, PsaReport};
use self::srs2::{ComparisonRow, DomainInfo, IntegratedText, Srs2Report};

const SUPPORTED_SCALES: [&str; 3] = [SELF_REPORT_CODE, HETERO_REPORT_CODE, PSA_CODE];

pub fn supports(code: &str) -> bool {
    SUPPORTED_SCALES.contains(&code)
}

pub fn supported_scales() -> &'static [&'static str] {
    &SUPPORTED_SCALES
}

/// Summary of one SRS-2 response as shown on the interpretation page.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Srs2ReportView {
    pub response_id: Uuid,
    pub scale_code: String,
    pub completed_at: Timestamp,
    pub relator_name: Option<String>,
    pub relator_relationship: Option<String>,
    pub raw_score: i32,
    pub t_score: Option<i32>,
    pub percentile: Option<i32>,
    pub level: Srs2Level,
    pub domains: Vec<DomainInfo>,
}

impl From<&Srs2Report<'_>> for Srs2ReportView {
    fn from(report: &Srs2Report<'_>) -> Self {
        let metrics = &report.results.metrics;
        Self {
            response_id: report.response.id,
            scale_code: report.response.scale_code.clone(),
            completed_at: report.response.completed_at,
            relator_name: report.relator_name().map(str::to_string),
            relator_relationship: report.relator_relationship().map(str::to_string),
            raw_score: metrics.raw_score,
            t_score: metrics.t_score,
            percentile: metrics.percentile,
            level: metrics.level,
            domains: report.domains(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PsaReportView {
    pub response_id: Uuid,
    pub completed_at: Timestamp,
    pub total_score: i32,
    pub total_possible: i32,
    pub level: String,
    pub description: String,
    pub categories: Vec<CategoryView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "scale_type", rename_all = "snake_case")]
pub enum InterpretationReport {
    Srs2 {
        report: Srs2ReportView,
        /// Most recent report of the opposite form, if any.
        counterpart: Option<Srs2ReportView>,
        hetero_reports: Vec<Srs2ReportView>,
        interpretation: IntegratedText,
        comparison: Vec<ComparisonRow>,
    },
    Psa {
        report: PsaReportView,
        interpretation: PsaInterpretation,
    },
}

/// Build the interpretation for `response`. `history` holds the patient's
/// other completed responses, used to find SRS-2 counterparts.
pub fn generate(
    response: &ScaleResponse,
    patient: &Patient,
    history: &[ScaleResponse],
) -> Result<InterpretationReport, InstrumentError> {
    match response.scale_code.as_str() {
        SELF_REPORT_CODE | HETERO_REPORT_CODE => generate_srs2(response, patient, history),
        PSA_CODE => generate_psa(response, patient),
        other => Err(InstrumentError::UnsupportedScale(other.to_string())),
    }
}

fn generate_srs2(
    response: &ScaleResponse,
    patient: &Patient,
    history: &[ScaleResponse],
) -> Result<InterpretationReport, InstrumentError> {
    let report = Srs2Report::new(response)?;
    let counterpart = srs2::find_counterpart(response, history)
        .map(Srs2Report::new)
        .transpose()?;

    let hetero_reports = srs2::hetero_reports(patient.id, history)
        .into_iter()
        .filter_map(|r| Srs2Report::new(r).ok())
        .map(|r| Srs2ReportView::from(&r))
        .collect();

    let comparison = match (&counterpart, response.is_self_report()) {
        (Some(c), true) => srs2::comparison_rows(report.results, c.results),
        (Some(c), false) => srs2::comparison_rows(c.results, report.results),
        (None, _) => Vec::new(),
    };

    Ok(InterpretationReport::Srs2 {
        interpretation: srs2::integrated_text(patient, &report, counterpart.as_ref()),
        report: Srs2ReportView::from(&report),
        counterpart: counterpart.as_ref().map(Srs2ReportView::from),
        hetero_reports,
        comparison,
    })
}

fn generate_psa(
    response: &ScaleResponse,
    patient: &Patient,
) -> Result<InterpretationReport, InstrumentError> {
    let report = PsaReport::new(response)?;
    Ok(InterpretationReport::Psa {
        interpretation: psa::interpret(patient, &report),
        report: PsaReportView {
            response_id: response.id,
            completed_at: response.completed_at,
            total_score: report.results.raw_score,
            total_possible: report.results.total_possible,
            level: report.results.level.label().to_string(),
            description: report.results.description.clone(),
            categories: report.categories(),
        },
    })
}
