use thiserror::Error;

use crate::scoring::AnswerError;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("{}", join_answer_errors(.0))]
    InvalidAnswers(Vec<AnswerError>),

    #[error("no interpretation available for scale: {0}")]
    UnsupportedScale(String),

    #[error("scale {code} has {count} items, more than a scale can hold")]
    TooManyItems { code: String, count: usize },

    #[error("scale response {0} has no results of the expected kind")]
    ResultsMismatch(String),

    #[error("failed to read norm table {file}: {source}")]
    NormTable {
        file: String,
        #[source]
        source: csv::Error,
    },
}

fn join_answer_errors(errors: &[AnswerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
