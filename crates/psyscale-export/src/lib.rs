//! psyscale-export
//!
//! Interpretation reports rendered through Tera (HTML or Markdown) and
//! converted to DOCX.

pub mod docx;
pub mod error;
pub mod render;
pub mod styles;
