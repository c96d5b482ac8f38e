use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScaleItem {
    pub item_number: u16,
    pub question_text: String,
    /// Answer value (as submitted, e.g. `"1"`) to its label.
    pub options: BTreeMap<String, String>,
    pub is_required: bool,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PsychometricScale {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub is_active: bool,
    pub items: Vec<ScaleItem>,
    #[serde(default)]
    pub deleted_at: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl PsychometricScale {
    /// Required item numbers in ascending order.
    pub fn required_item_numbers(&self) -> Vec<u16> {
        let mut numbers: Vec<u16> = self
            .items
            .iter()
            .filter(|i| i.is_required)
            .map(|i| i.item_number)
            .collect();
        numbers.sort_unstable();
        numbers
    }

    pub fn item(&self, number: u16) -> Option<&ScaleItem> {
        self.items.iter().find(|i| i.item_number == number)
    }

    /// Items ordered by number.
    pub fn ordered_items(&self) -> Vec<&ScaleItem> {
        let mut items: Vec<&ScaleItem> = self.items.iter().collect();
        items.sort_by_key(|i| i.item_number);
        items
    }
}

impl std::fmt::Display for PsychometricScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.name)
    }
}
