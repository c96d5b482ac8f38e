//! SRS-2 self vs. hetero comparison line chart.

use jiff::Timestamp;
use psyscale_core::models::scale_response::{HETERO_REPORT_CODE, SELF_REPORT_CODE};
use psyscale_core::models::{Patient, RequestStatus, ScaleRequest, ScaleResponse, Srs2Results};
use serde::{Deserialize, Serialize};
use serde_json::json;
use ts_rs::TS;

use super::{ChartData, Dataset};

const SUBSCALES_ORDER: [(&str, &str); 7] = [
    ("social_awareness", "Percepção Social"),
    ("social_cognition", "Cognição Social"),
    ("social_communication", "Comunicação Social"),
    ("social_motivation", "Motivação Social"),
    ("restricted_interests", "Padrões Restritos/Repetitivos"),
    ("social_interaction", "Interação Social Global"),
    ("total", "Total"),
];

const DEFAULT_MAX: i32 = 90;
const DEFAULT_MIN: i32 = 50;

/// A completed request together with its scored response.
#[derive(Debug, Clone, Copy)]
pub struct ChartReport<'a> {
    pub request: &'a ScaleRequest,
    pub response: &'a ScaleResponse,
    pub results: &'a Srs2Results,
}

impl ChartReport<'_> {
    fn t_scores(&self) -> Vec<Option<i32>> {
        SUBSCALES_ORDER
            .iter()
            .map(|(key, _)| {
                if *key == "total" {
                    self.results.metrics.t_score
                } else {
                    self.results.subscale(key).and_then(|s| s.t_score)
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelfReportInfo {
    pub patient_name: String,
    pub requested_at: Timestamp,
    pub completed_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HeteroReportInfo {
    pub relator_name: String,
    pub requested_at: Timestamp,
    pub completed_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportInfo {
    pub self_report: Option<SelfReportInfo>,
    pub hetero_report: Option<HeteroReportInfo>,
}

pub struct Srs2ComparisonChart<'a> {
    patient: &'a Patient,
    self_report: Option<ChartReport<'a>>,
    hetero_report: Option<ChartReport<'a>>,
}

impl<'a> Srs2ComparisonChart<'a> {
    pub fn new(
        patient: &'a Patient,
        self_report: Option<ChartReport<'a>>,
        hetero_report: Option<ChartReport<'a>>,
    ) -> Self {
        Self {
            patient,
            self_report,
            hetero_report,
        }
    }

    /// Use the most recently requested completed self and hetero reports.
    pub fn latest(
        patient: &'a Patient,
        requests: &'a [ScaleRequest],
        responses: &'a [ScaleResponse],
    ) -> Self {
        let pick = move |code: &str| {
            requests
                .iter()
                .filter(|r| {
                    r.patient_id == patient.id
                        && r.status == RequestStatus::Completed
                        && r.scale_code == code
                        && !r.is_deleted()
                })
                .filter_map(|request| {
                    let response = responses
                        .iter()
                        .find(|s| s.scale_request_id == request.id && !s.is_deleted())?;
                    let results = response.results.as_srs2()?;
                    Some(ChartReport {
                        request,
                        response,
                        results,
                    })
                })
                .max_by_key(|c| c.request.requested_at)
        };

        Self::new(patient, pick(SELF_REPORT_CODE), pick(HETERO_REPORT_CODE))
    }

    /// Both forms are needed for a comparison.
    pub fn has_data(&self) -> bool {
        self.self_report.is_some() && self.hetero_report.is_some()
    }

    fn self_respondent_name(&self) -> String {
        self.patient.full_name.clone()
    }

    /// "Name (relationship)", "Name", or "Profissional" when the relator is
    /// unknown.
    pub fn hetero_respondent_name(&self) -> String {
        let response = self.hetero_report.map(|h| h.response);
        let name = response
            .and_then(|r| r.relator_name.as_deref())
            .filter(|s| !s.trim().is_empty());
        let relationship = response
            .and_then(|r| r.relator_relationship.as_deref())
            .filter(|s| !s.trim().is_empty());

        match (name, relationship) {
            (Some(n), Some(rel)) => format!("{n} ({rel})"),
            (Some(n), None) => n.to_string(),
            _ => "Profissional".to_string(),
        }
    }

    fn all_values(&self) -> Vec<i32> {
        [self.self_report, self.hetero_report]
            .into_iter()
            .flatten()
            .flat_map(|r| r.t_scores())
            .flatten()
            .collect()
    }

    /// Highest T-score plus 10, never below 100.
    pub fn max_value(&self) -> i32 {
        let max = self.all_values().into_iter().max().unwrap_or(DEFAULT_MAX);
        (max + 10).max(100)
    }

    /// Lowest T-score minus 10, never below 10.
    pub fn min_value(&self) -> i32 {
        let min = self.all_values().into_iter().min().unwrap_or(DEFAULT_MIN);
        (min - 10).max(10)
    }

    pub fn chart_data(&self) -> ChartData<Option<i32>> {
        let mut datasets = Vec::new();
        if let Some(r) = &self.self_report {
            datasets.push(Dataset::line(
                format!("Autorrelato ({})", self.self_respondent_name()),
                r.t_scores(),
                "#6c757d",
                "rgba(108, 117, 125, 0.1)",
                "circle",
            ));
        }
        if let Some(r) = &self.hetero_report {
            datasets.push(Dataset::line(
                format!("Heterorrelato ({})", self.hetero_respondent_name()),
                r.t_scores(),
                "#0d6efd",
                "rgba(13, 110, 253, 0.1)",
                "triangle",
            ));
        }

        ChartData {
            labels: SUBSCALES_ORDER.iter().map(|(_, l)| l.to_string()).collect(),
            datasets,
            options: self.options(),
        }
    }

    pub fn report_info(&self) -> ReportInfo {
        ReportInfo {
            self_report: self.self_report.map(|r| SelfReportInfo {
                patient_name: self.self_respondent_name(),
                requested_at: r.request.requested_at,
                completed_at: r.response.completed_at,
            }),
            hetero_report: self.hetero_report.map(|r| HeteroReportInfo {
                relator_name: self.hetero_respondent_name(),
                requested_at: r.request.requested_at,
                completed_at: r.response.completed_at,
            }),
        }
    }

    fn options(&self) -> serde_json::Value {
        let min = self.min_value();
        let max = self.max_value();
        json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": {
                "title": {
                    "display": true,
                    "text": "Comparação SRS-2: Autorrelato vs Heterorrelato",
                    "font": { "size": 16, "weight": "bold" }
                },
                "legend": { "display": true, "position": "top" },
                "annotation": { "annotations": impairment_zones(max) }
            },
            "scales": {
                "y": {
                    "beginAtZero": false,
                    "min": min,
                    "max": max,
                    "title": { "display": true, "text": "Escore T" },
                    "grid": { "color": "rgba(0, 0, 0, 0.1)" },
                    "ticks": { "stepSize": 5 }
                },
                "y1": {
                    "type": "linear",
                    "display": true,
                    "position": "right",
                    "title": { "display": true, "text": "Níveis de Prejuízo" },
                    "min": min,
                    "max": max,
                    "grid": { "drawOnChartArea": false },
                    "ticks": { "stepSize": 5 }
                },
                "x": {
                    "title": { "display": true, "text": "Domínio avaliado" },
                    "ticks": { "maxRotation": 45, "minRotation": 0 }
                }
            }
        })
    }
}

fn zone(y_min: i32, y_max: i32, rgba: &str) -> serde_json::Value {
    json!({
        "type": "box",
        "yMin": y_min,
        "yMax": y_max,
        "backgroundColor": rgba,
        "borderColor": rgba,
        "borderWidth": 0,
        "drawTime": "beforeDraw"
    })
}

/// Coloured background bands for each impairment level.
pub fn impairment_zones(max: i32) -> serde_json::Value {
    json!({
        "no_impairment": zone(0, 60, "rgba(40, 167, 69, 0.3)"),
        "mild_impairment": zone(60, 65, "rgba(255, 193, 7, 0.3)"),
        "moderate_impairment": zone(65, 75, "rgba(253, 126, 20, 0.3)"),
        "severe_impairment": zone(75, max, "rgba(220, 53, 69, 0.3)"),
    })
}
