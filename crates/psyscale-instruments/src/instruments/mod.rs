pub mod beck;
pub mod generic;
pub mod psa;
pub mod srs2;
