//! psyscale-instruments
//!
//! Psychometric scale definitions and everything computed from a set of
//! answers: validation, scoring, SRS-2 norm lookup, textual interpretation
//! and chart data. Pure logic; no storage or HTTP dependency.

pub mod charts;
pub mod error;
pub mod instruments;
pub mod interpretation;
pub mod lookup;
pub mod scoring;

use std::collections::BTreeMap;

use psyscale_core::models::{Answers, PsychometricScale, ScaleItem, ScaleResults};
use uuid::Uuid;

use error::InstrumentError;
use scoring::{AnswerError, AnswerRange, ItemGroup, ScoringContext};

/// Trait implemented by each psychometric scale.
pub trait Instrument: Send + Sync {
    /// Unique code, as stored on scales and requests (e.g. `SRS2SR`, `PSA`).
    fn code(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn version(&self) -> &str;

    fn item_count(&self) -> u16;

    fn answer_range(&self) -> AnswerRange;

    /// Label shown for an answer value.
    fn option_label(&self, value: i32) -> String {
        value.to_string()
    }

    /// Subscales or categories the items are grouped into.
    fn groups(&self) -> &[ItemGroup] {
        &[]
    }

    /// Category letter stamped on seeded items, for scales that have one.
    fn category_of(&self, _item: u16) -> Option<String> {
        None
    }

    /// Non-item keys accepted alongside `item_<n>` answers.
    fn extra_keys(&self) -> &[&str] {
        &[]
    }

    /// Whether responses must name the third party who answered.
    fn requires_relator(&self) -> bool {
        false
    }

    fn validate_answers(&self, required: &[u16], answers: &Answers) -> Vec<AnswerError> {
        scoring::check_answers(
            answers,
            required,
            self.item_count(),
            self.answer_range(),
            self.extra_keys(),
        )
    }

    fn score(&self, answers: &Answers, ctx: &ScoringContext<'_>) -> ScaleResults;

    /// Scale record for seeding. Question texts are placeholders until a
    /// definition file supplies them.
    fn definition(&self, now: jiff::Timestamp) -> PsychometricScale {
        let options: BTreeMap<String, String> = self
            .answer_range()
            .values()
            .map(|v| (v.to_string(), self.option_label(v)))
            .collect();

        let items = (1..=self.item_count())
            .map(|n| ScaleItem {
                item_number: n,
                question_text: format!("Item {n}"),
                options: options.clone(),
                is_required: true,
                category: self.category_of(n),
            })
            .collect();

        PsychometricScale {
            id: Uuid::new_v4(),
            code: self.code().to_string(),
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            version: self.version().to_string(),
            is_active: true,
            items,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Return all built-in instruments.
pub fn all_instruments() -> Vec<Box<dyn Instrument>> {
    vec![
        Box::new(instruments::srs2::Srs2::self_report()),
        Box::new(instruments::srs2::Srs2::hetero_report()),
        Box::new(instruments::psa::Psa),
        Box::new(instruments::beck::Bdi),
        Box::new(instruments::beck::Bai),
    ]
}

/// Look up a built-in instrument by code.
pub fn get_instrument(code: &str) -> Option<Box<dyn Instrument>> {
    all_instruments().into_iter().find(|i| i.code() == code)
}

/// Instrument used to validate and score responses to `scale`: the built-in
/// one when the code is known, otherwise a plain summed scale.
pub fn instrument_for(scale: &PsychometricScale) -> Result<Box<dyn Instrument>, InstrumentError> {
    match get_instrument(&scale.code) {
        Some(instrument) => Ok(instrument),
        None => Ok(Box::new(instruments::generic::Generic::from_scale(scale)?)),
    }
}

/// Validate a submission against `scale`, including relator fields for
/// hetero-report scales. All problems are returned together.
pub fn validate_response(
    scale: &PsychometricScale,
    answers: &Answers,
    relator_name: Option<&str>,
    relator_relationship: Option<&str>,
) -> Result<(), InstrumentError> {
    let instrument = instrument_for(scale)?;
    let mut errors = instrument.validate_answers(&scale.required_item_numbers(), answers);

    if instrument.requires_relator() {
        for (field, value) in [
            ("relator_name", relator_name),
            ("relator_relationship", relator_relationship),
        ] {
            if value.is_none_or(|v| v.trim().is_empty()) {
                errors.push(AnswerError::MissingRelatorField {
                    field: field.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(InstrumentError::InvalidAnswers(errors))
    }
}
