//! Tera rendering of interpretation reports.
//!
//! Templates are compiled into the binary. Each scale has an HTML and a
//! Markdown variant; the Markdown one feeds the DOCX export.

use std::collections::HashMap;

use jiff::civil::Date;
use psyscale_core::models::{Gender, Patient, Srs2Level};
use psyscale_instruments::interpretation::InterpretationReport;
use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::error::ExportError;

const TEMPLATES: [(&str, &str); 4] = [
    ("srs2.html", include_str!("../templates/srs2.html")),
    ("srs2.md", include_str!("../templates/srs2.md")),
    ("psa.html", include_str!("../templates/psa.html")),
    ("psa.md", include_str!("../templates/psa.md")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Markdown,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub full_name: String,
    pub age: i16,
    pub gender: Option<&'static str>,
    pub birthday: String,
}

impl PatientSummary {
    pub fn new(patient: &Patient, today: Date) -> Self {
        Self {
            full_name: patient.full_name.clone(),
            age: patient.age_on(today),
            gender: patient.gender.map(|g| match g {
                Gender::Male => "Masculino",
                Gender::Female => "Feminino",
            }),
            birthday: patient.birthday.strftime("%d/%m/%Y").to_string(),
        }
    }
}

pub struct ReportRenderer {
    tera: Tera,
}

impl ReportRenderer {
    pub fn new() -> Result<Self, ExportError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())
            .map_err(|e| ExportError::TemplateParse(e.to_string()))?;
        tera.register_filter("or_na", or_na);
        tera.register_filter("level_label", level_label);
        tera.register_filter("date_br", date_br);
        Ok(Self { tera })
    }

    /// Render `report` for `patient`. `today` is the issue date printed on
    /// the report and the reference for the patient's age.
    pub fn render(
        &self,
        report: &InterpretationReport,
        patient: &Patient,
        today: Date,
        format: ReportFormat,
    ) -> Result<String, ExportError> {
        let name = format!("{}.{}", template_stem(report), format.extension());

        let mut context = Context::from_serialize(report)?;
        context.insert("patient", &PatientSummary::new(patient, today));
        context.insert("issued_on", &today.strftime("%d/%m/%Y").to_string());

        tracing::debug!(template = %name, "rendering report");
        Ok(self.tera.render(&name, &context)?)
    }
}

fn template_stem(report: &InterpretationReport) -> &'static str {
    match report {
        InterpretationReport::Srs2 { .. } => "srs2",
        InterpretationReport::Psa { .. } => "psa",
    }
}

/// `null` prints as "N/A"; anything else unchanged.
fn or_na(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(match value {
        Value::Null => Value::String("N/A".to_string()),
        other => other.clone(),
    })
}

/// Serialized SRS-2 level to its Portuguese label.
fn level_label(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let level: Srs2Level = serde_json::from_value(value.clone())
        .map_err(|e| tera::Error::msg(format!("level_label: {e}")))?;
    let label = match level {
        Srs2Level::Invalid => level.as_str().to_string(),
        _ => level.description().to_string(),
    };
    Ok(Value::String(label))
}

/// RFC 3339 timestamp to `dd/mm/yyyy` (UTC).
fn date_br(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let Some(s) = value.as_str() else {
        return Ok(value.clone());
    };
    let ts: jiff::Timestamp = s
        .parse()
        .map_err(|e| tera::Error::msg(format!("date_br: {e}")))?;
    Ok(Value::String(ts.strftime("%d/%m/%Y").to_string()))
}
