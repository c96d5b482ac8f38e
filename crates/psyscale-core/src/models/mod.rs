pub mod patient;
pub mod professional;
pub mod results;
pub mod scale;
pub mod scale_request;
pub mod scale_response;
pub mod user;

pub use patient::{Gender, NewPatient, Patient};
pub use professional::{NewProfessional, Professional};
pub use results::{
    BandedResults, PsaCategory, PsaComment, PsaLevel, PsaPatientInfo, PsaResults, ResultsHeader,
    ScaleResults, Srs2Interpretation, Srs2Level, Srs2Metrics, Srs2Results, Srs2Subscale,
    SummedResults,
};
pub use scale::{PsychometricScale, ScaleItem};
pub use scale_request::{RequestStatus, ScaleRequest};
pub use scale_response::{Answers, ScaleResponse};
pub use user::{Role, User};
