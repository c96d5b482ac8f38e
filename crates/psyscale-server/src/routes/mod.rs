pub mod auth;
pub mod charts;
pub mod dashboard;
pub mod health;
pub mod interpretation;
pub mod patients;
pub mod professionals;
pub mod scale_requests;
pub mod scale_responses;
pub mod scales;

use jiff::civil::Date;
use jiff::{Timestamp, Zoned};

use crate::error::ApiError;

/// Turn a policy answer into a 403.
pub(crate) fn authorize(allowed: bool) -> Result<(), ApiError> {
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

pub(crate) fn now() -> Timestamp {
    Timestamp::now()
}

/// Local calendar date, used for ages and report dates.
pub(crate) fn today() -> Date {
    Zoned::now().date()
}
