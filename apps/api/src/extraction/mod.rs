//! Best-effort resume extraction: raw text from uploaded artifacts, then
//! skills, education, and experience from that text. Everything in here is
//! a pure function that degrades to empty output on unparseable input —
//! extraction never fails an upload.

pub mod sections;
pub mod skills;
pub mod text;

pub use sections::{extract_education, extract_experience};
pub use skills::{extract_skills, title_case};
pub use text::extract_text;
