//! Chart.js-shaped chart data. Only the data is produced here; drawing is
//! left to the browser.

pub mod psa;
pub mod srs2;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Dataset<T> {
    pub label: String,
    pub data: Vec<T>,
    pub border_color: String,
    pub background_color: String,
    pub border_width: u8,
    pub point_background_color: String,
    pub point_border_color: String,
    pub point_radius: u8,
    pub point_hover_radius: u8,
    pub point_style: String,
    pub tension: f64,
}

impl<T> Dataset<T> {
    /// Solid line in `color` with a translucent fill of `fill`.
    pub fn line(label: String, data: Vec<T>, color: &str, fill: &str, point_style: &str) -> Self {
        Self {
            label,
            data,
            border_color: color.to_string(),
            background_color: fill.to_string(),
            border_width: 3,
            point_background_color: color.to_string(),
            point_border_color: color.to_string(),
            point_radius: 6,
            point_hover_radius: 8,
            point_style: point_style.to_string(),
            tension: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChartData<T> {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset<T>>,
    #[ts(type = "Record<string, unknown>")]
    pub options: serde_json::Value,
}
