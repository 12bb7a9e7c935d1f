// Heuristic matching layer: resume-vs-job scoring, recommendation ranking,
// skill-gap analysis, and canned interview preparation. Pure functions over
// candidate skills and job rows — no model calls, fully deterministic
// (except the canned chat fallback pick).

pub mod handlers;
pub mod interview_prep;
pub mod recommend;
pub mod score;
pub mod skill_gap;
