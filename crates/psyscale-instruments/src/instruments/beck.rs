use psyscale_core::models::{Answers, BandedResults, ResultsHeader, ScaleResults};

use crate::Instrument;
use crate::scoring::{AnswerRange, ScoringContext, answer_value};

/// BDI: Beck Depression Inventory. 21 items answered 0 to 3.
pub struct Bdi;

/// BAI: Beck Anxiety Inventory. 21 items answered 0 to 3.
pub struct Bai;

fn summed(answers: &Answers, items: u16) -> i32 {
    (1..=items).filter_map(|n| answer_value(answers, n)).sum()
}

pub fn bdi_level(total: i32) -> &'static str {
    match total {
        0..=11 => "Mínima",
        12..=19 => "Leve",
        20..=27 => "Moderada",
        _ => "Grave",
    }
}

pub fn bai_level(total: i32) -> &'static str {
    match total {
        0..=7 => "Mínima",
        8..=15 => "Leve",
        16..=25 => "Moderada",
        26..=63 => "Grave",
        _ => "Pontuação inválida",
    }
}

impl Instrument for Bdi {
    fn code(&self) -> &str {
        "BDI"
    }

    fn name(&self) -> &str {
        "Inventário de Depressão de Beck"
    }

    fn description(&self) -> &str {
        "Inventário de Depressão de Beck (BDI) - 21 itens"
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn item_count(&self) -> u16 {
        21
    }

    fn answer_range(&self) -> AnswerRange {
        AnswerRange::new(0, 3)
    }

    fn score(&self, answers: &Answers, ctx: &ScoringContext<'_>) -> ScaleResults {
        let total = summed(answers, self.item_count());
        ScaleResults::Banded(BandedResults {
            header: ResultsHeader::new(self.code(), self.version(), ctx.computed_at),
            total,
            level: bdi_level(total).to_string(),
            rules: "BDI v1 cutoffs".to_string(),
        })
    }
}

impl Instrument for Bai {
    fn code(&self) -> &str {
        "BAI"
    }

    fn name(&self) -> &str {
        "Inventário de Ansiedade de Beck"
    }

    fn description(&self) -> &str {
        "Inventário de Ansiedade de Beck (BAI) - 21 itens"
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn item_count(&self) -> u16 {
        21
    }

    fn answer_range(&self) -> AnswerRange {
        AnswerRange::new(0, 3)
    }

    fn score(&self, answers: &Answers, ctx: &ScoringContext<'_>) -> ScaleResults {
        let total = summed(answers, self.item_count());
        ScaleResults::Banded(BandedResults {
            header: ResultsHeader::new(self.code(), self.version(), ctx.computed_at),
            total,
            level: bai_level(total).to_string(),
            rules: "BAI v1 cutoffs".to_string(),
        })
    }
}
