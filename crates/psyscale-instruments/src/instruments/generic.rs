use psyscale_core::models::{Answers, PsychometricScale, ResultsHeader, ScaleResults, SummedResults};

use crate::Instrument;
use crate::error::InstrumentError;
use crate::scoring::{AnswerRange, ScoringContext, item_number};

/// Any stored scale without a dedicated scorer: answers 0 to 3, summed.
pub struct Generic {
    code: String,
    name: String,
    description: String,
    version: String,
    item_count: u16,
}

impl Generic {
    pub fn from_scale(scale: &PsychometricScale) -> Result<Self, InstrumentError> {
        let item_count =
            u16::try_from(scale.items.len()).map_err(|_| InstrumentError::TooManyItems {
                code: scale.code.clone(),
                count: scale.items.len(),
            })?;
        Ok(Self {
            code: scale.code.clone(),
            name: scale.name.clone(),
            description: scale.description.clone().unwrap_or_default(),
            version: scale.version.clone(),
            item_count,
        })
    }
}

impl Instrument for Generic {
    fn code(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn item_count(&self) -> u16 {
        self.item_count
    }

    fn answer_range(&self) -> AnswerRange {
        AnswerRange::new(0, 3)
    }

    fn score(&self, answers: &Answers, ctx: &ScoringContext<'_>) -> ScaleResults {
        let total: i32 = answers
            .iter()
            .filter(|(k, _)| item_number(k).is_some())
            .map(|(_, v)| v.trim().parse::<i32>().unwrap_or(0))
            .sum();
        ScaleResults::Summed(SummedResults {
            header: ResultsHeader::new(&self.code, &self.version, ctx.computed_at),
            total,
            interpretation: format!("Pontuação total: {total}"),
        })
    }
}
