//! Resume matching score — compares a candidate's skills and resume text
//! against a job's required skills and description.
//!
//! `overall = 0.7 * skill_score + 0.3 * keyword_score`, each component a
//! percentage rounded to one decimal. No side effects; deterministic.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extraction::title_case;

const SKILL_WEIGHT: f64 = 0.7;
const KEYWORD_WEIGHT: f64 = 0.3;

/// Words ignored when computing keyword overlap between a job description
/// and resume text.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "has", "her", "was", "one",
    "our", "out", "with", "have", "this", "will", "your", "from", "they", "been", "said", "each",
    "which",
];

/// Full match report returned to callers. The recommendation strings are
/// advisory text only and feed no further computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub overall_score: f64,
    pub skill_match_score: f64,
    pub keyword_match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Computes the weighted match between a candidate and a job.
///
/// Skills are normalized to lowercase for comparison and title-cased for
/// display. A job with neither required skills nor a description scores
/// zero across the board with a fallback recommendation.
pub fn score_candidate_against_job(
    candidate_skills: &[String],
    candidate_text: &str,
    job_skills: &[String],
    job_description: &str,
) -> MatchReport {
    if job_skills.is_empty() && job_description.trim().is_empty() {
        return MatchReport {
            overall_score: 0.0,
            skill_match_score: 0.0,
            keyword_match_score: 0.0,
            matched_skills: vec![],
            missing_skills: vec![],
            recommendations: vec!["Add more relevant skills to your resume.".to_string()],
        };
    }

    let candidate_set: BTreeSet<String> =
        candidate_skills.iter().map(|s| s.to_lowercase()).collect();
    let job_set: BTreeSet<String> = job_skills.iter().map(|s| s.to_lowercase()).collect();

    let matched: Vec<&String> = job_set.intersection(&candidate_set).collect();
    let missing: Vec<&String> = job_set.difference(&candidate_set).collect();

    let skill_score = if job_set.is_empty() {
        0.0
    } else {
        matched.len() as f64 / job_set.len() as f64 * 100.0
    };

    let job_words = tokenize(job_description);
    let resume_words = tokenize(candidate_text);
    let keyword_score = if job_words.is_empty() {
        0.0
    } else {
        job_words.intersection(&resume_words).count() as f64 / job_words.len() as f64 * 100.0
    };

    let overall = SKILL_WEIGHT * skill_score + KEYWORD_WEIGHT * keyword_score;

    let mut recommendations = Vec::new();
    if !missing.is_empty() {
        let top: Vec<String> = missing.iter().take(5).map(|s| title_case(s)).collect();
        recommendations.push(format!("Consider learning: {}", top.join(", ")));
    }
    if overall < 50.0 {
        recommendations.push(
            "Your resume has a low match. Try tailoring it to the job description.".to_string(),
        );
    }
    if overall >= 70.0 {
        recommendations
            .push("Great match! Make sure to highlight your relevant experience.".to_string());
    }

    MatchReport {
        overall_score: round1(overall),
        skill_match_score: round1(skill_score),
        keyword_match_score: round1(keyword_score),
        matched_skills: matched.iter().map(|s| title_case(s)).collect(),
        missing_skills: missing.iter().map(|s| title_case(s)).collect(),
        recommendations,
    }
}

/// Lowercase alphabetic words of length >= 3, minus the stop-word set.
fn tokenize(text: &str) -> BTreeSet<String> {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    let re = WORD_RE.get_or_init(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("word pattern"));

    let lower = text.to_lowercase();
    re.find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(skills: &[&str]) -> Vec<String> {
        skills.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_half_skill_overlap() {
        // Job requires {Python, SQL}, candidate has {python, react}.
        let report = score_candidate_against_job(
            &owned(&["python", "react"]),
            "",
            &owned(&["Python", "SQL"]),
            "",
        );
        assert_eq!(report.skill_match_score, 50.0);
        assert_eq!(report.matched_skills, vec!["Python"]);
        assert_eq!(report.missing_skills, vec!["Sql"]);
        // Empty description -> keyword score 0 -> overall = 0.7 * 50.
        assert_eq!(report.keyword_match_score, 0.0);
        assert_eq!(report.overall_score, 35.0);
    }

    #[test]
    fn test_full_skill_coverage_scores_100() {
        let report = score_candidate_against_job(
            &owned(&["python", "sql", "docker"]),
            "",
            &owned(&["Python", "SQL"]),
            "",
        );
        assert_eq!(report.skill_match_score, 100.0);
        assert!(report.missing_skills.is_empty());
    }

    #[test]
    fn test_overall_is_weighted_blend() {
        // Job words: rust, developer, building, services (4).
        // Resume words: rust, services -> overlap 2/4 = 50%.
        let report = score_candidate_against_job(
            &owned(&["rust"]),
            "rust services",
            &owned(&["Rust"]),
            "rust developer building services",
        );
        assert_eq!(report.skill_match_score, 100.0);
        assert_eq!(report.keyword_match_score, 50.0);
        assert_eq!(report.overall_score, 85.0);
    }

    #[test]
    fn test_degenerate_job_scores_zero() {
        let report = score_candidate_against_job(&owned(&["python"]), "text", &[], "");
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.skill_match_score, 0.0);
        assert_eq!(report.keyword_match_score, 0.0);
        assert!(report.matched_skills.is_empty());
        assert!(report.missing_skills.is_empty());
        assert_eq!(
            report.recommendations,
            vec!["Add more relevant skills to your resume."]
        );
    }

    #[test]
    fn test_scores_stay_in_bounds() {
        let report = score_candidate_against_job(
            &owned(&["a", "b", "c", "python"]),
            "python python python",
            &owned(&["python"]),
            "python",
        );
        assert!(report.skill_match_score <= 100.0);
        assert!(report.keyword_match_score <= 100.0);
        assert!(report.overall_score <= 100.0);
    }

    #[test]
    fn test_stop_words_do_not_count_as_keywords() {
        let report = score_candidate_against_job(
            &[],
            "the and for with",
            &owned(&["python"]),
            "the and for with",
        );
        assert_eq!(report.keyword_match_score, 0.0);
    }

    #[test]
    fn test_short_tokens_ignored() {
        // Every description token is under 3 alphabetic characters.
        let report =
            score_candidate_against_job(&[], "go ab", &owned(&["python"]), "go ab c4 x");
        assert_eq!(report.keyword_match_score, 0.0);
    }

    #[test]
    fn test_low_score_warning_present() {
        let report =
            score_candidate_against_job(&owned(&["react"]), "", &owned(&["python", "sql"]), "");
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("low match")));
    }

    #[test]
    fn test_high_score_praise_present() {
        let report = score_candidate_against_job(
            &owned(&["python", "sql"]),
            "",
            &owned(&["python", "sql"]),
            "",
        );
        assert!(report.overall_score >= 70.0);
        assert!(report.recommendations.iter().any(|r| r.contains("Great match")));
    }

    #[test]
    fn test_missing_skills_capped_at_five_in_recommendation() {
        let report = score_candidate_against_job(
            &[],
            "",
            &owned(&["a1", "b1", "c1", "d1", "e1", "f1", "g1"]),
            "",
        );
        let learn = report
            .recommendations
            .iter()
            .find(|r| r.starts_with("Consider learning:"))
            .unwrap();
        assert_eq!(learn.matches(',').count(), 4); // five entries, four commas
        assert_eq!(report.missing_skills.len(), 7);
    }
}
