use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::results::ScaleResults;

/// Raw submitted answers: `item_<n>` (and PSA `comment_category_<x>`) to the
/// value as entered.
pub type Answers = BTreeMap<String, String>;

pub const SELF_REPORT_CODE: &str = "SRS2SR";
pub const HETERO_REPORT_CODE: &str = "SRS2HR";

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScaleResponse {
    pub id: Uuid,
    pub scale_request_id: Uuid,
    pub patient_id: Uuid,
    pub scale_id: Uuid,
    pub scale_code: String,
    pub answers: Answers,
    pub total_score: Option<i32>,
    pub interpretation: Option<String>,
    pub results: ScaleResults,
    #[serde(default)]
    pub relator_name: Option<String>,
    #[serde(default)]
    pub relator_relationship: Option<String>,
    pub completed_at: jiff::Timestamp,
    #[serde(default)]
    pub deleted_at: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl ScaleResponse {
    pub fn is_srs2(&self) -> bool {
        self.scale_code == SELF_REPORT_CODE || self.scale_code == HETERO_REPORT_CODE
    }

    pub fn is_self_report(&self) -> bool {
        self.scale_code == SELF_REPORT_CODE
    }

    pub fn is_hetero_report(&self) -> bool {
        self.scale_code == HETERO_REPORT_CODE
    }

    /// Number of `item_<n>` answers present.
    pub fn answered_items_count(&self) -> usize {
        self.answers.keys().filter(|k| k.starts_with("item_")).count()
    }

    /// Percentage of the scale answered, one decimal.
    pub fn completion_percentage(&self, total_items: usize) -> f64 {
        if total_items == 0 {
            return 0.0;
        }
        let pct = self.answered_items_count() as f64 / total_items as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn soft_delete(&mut self, now: jiff::Timestamp) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}
