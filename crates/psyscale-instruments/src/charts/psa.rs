//! PSA radar chart: category averages against the typical midpoint.

use psyscale_core::models::PsaResults;
use serde_json::json;

use super::{ChartData, Dataset};
use crate::instruments::psa::CATEGORIES;

/// Midpoint of the 1 to 5 answer scale.
pub const REFERENCE_AVERAGE: f64 = 3.0;

pub fn radar(results: &PsaResults) -> ChartData<f64> {
    let averages: Vec<f64> = CATEGORIES
        .iter()
        .map(|def| results.category(def.key).map_or(0.0, |c| c.average))
        .collect();
    let reference = vec![REFERENCE_AVERAGE; averages.len()];

    ChartData {
        labels: CATEGORIES.iter().map(|c| c.name.to_string()).collect(),
        datasets: vec![
            Dataset::line(
                "Paciente".to_string(),
                averages,
                "#0d6efd",
                "rgba(13, 110, 253, 0.2)",
                "circle",
            ),
            Dataset::line(
                "Referência típica".to_string(),
                reference,
                "#6c757d",
                "rgba(108, 117, 125, 0.1)",
                "triangle",
            ),
        ],
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": {
                "title": {
                    "display": true,
                    "text": "Perfil Sensorial por Categoria",
                    "font": { "size": 16, "weight": "bold" }
                },
                "legend": { "display": true, "position": "top" }
            },
            "scales": {
                "r": {
                    "min": 0,
                    "max": 5,
                    "ticks": { "stepSize": 1 }
                }
            }
        }),
    }
}
