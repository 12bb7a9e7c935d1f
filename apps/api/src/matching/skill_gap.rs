//! Skill-gap analysis: which required skills a candidate is missing and
//! where to learn them. Suggestions come from a fixed resource table;
//! unknown skills get generic pointers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::extraction::title_case;

/// Curated learning resources for well-known skills: (skill, priority, resources).
const LEARNING_RESOURCES: &[(&str, &str, [&str; 3])] = &[
    ("python", "high", ["Python.org tutorials", "Automate the Boring Stuff", "LeetCode Python track"]),
    ("java", "high", ["Oracle Java tutorials", "Codecademy Java", "HackerRank Java"]),
    ("javascript", "high", ["MDN Web Docs", "freeCodeCamp", "JavaScript.info"]),
    ("react", "high", ["React official docs", "Scrimba React course", "Build projects on Frontend Mentor"]),
    ("angular", "medium", ["Angular.io docs", "Tour of Heroes tutorial", "Udemy Angular courses"]),
    ("django", "medium", ["Django official tutorial", "Django for Beginners book", "Django REST framework docs"]),
    ("flask", "medium", ["Flask Mega-Tutorial", "Flask official docs", "Build REST APIs with Flask"]),
    ("sql", "high", ["SQLZoo", "Mode Analytics SQL tutorial", "LeetCode Database problems"]),
    ("machine learning", "high", ["Andrew Ng's ML course", "Kaggle Learn", "Hands-On ML book"]),
    ("docker", "medium", ["Docker official docs", "Play with Docker", "Docker for beginners"]),
    ("git", "high", ["Git official docs", "Atlassian Git tutorials", "Learn Git Branching"]),
    ("aws", "medium", ["AWS Free Tier", "AWS Skill Builder", "A Cloud Guru"]),
    ("data science", "high", ["DataCamp", "Kaggle", "Google Data Analytics Certificate"]),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningSuggestion {
    pub skill: String,
    pub priority: String,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapReport {
    pub user_skills: Vec<String>,
    pub required_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub gap_percentage: f64,
    pub learning_suggestions: Vec<LearningSuggestion>,
}

pub fn analyze_skill_gap(user_skills: &[String], job_skills: &[String]) -> SkillGapReport {
    let user_set: BTreeSet<String> = user_skills.iter().map(|s| s.to_lowercase()).collect();
    let job_set: BTreeSet<String> = job_skills.iter().map(|s| s.to_lowercase()).collect();

    let matched: Vec<&String> = job_set.intersection(&user_set).collect();
    let missing: Vec<&String> = job_set.difference(&user_set).collect();

    let gap_percentage = if job_set.is_empty() {
        0.0
    } else {
        let pct = missing.len() as f64 / job_set.len() as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    };

    let mut learning_suggestions: Vec<LearningSuggestion> =
        missing.iter().map(|s| suggestion_for(s)).collect();
    learning_suggestions.sort_by_key(|s| priority_rank(&s.priority));

    SkillGapReport {
        user_skills: user_set.iter().map(|s| title_case(s)).collect(),
        required_skills: job_set.iter().map(|s| title_case(s)).collect(),
        matched_skills: matched.iter().map(|s| title_case(s)).collect(),
        missing_skills: missing.iter().map(|s| title_case(s)).collect(),
        gap_percentage,
        learning_suggestions,
    }
}

fn suggestion_for(skill: &str) -> LearningSuggestion {
    if let Some((_, priority, resources)) = LEARNING_RESOURCES
        .iter()
        .find(|(known, _, _)| *known == skill)
    {
        return LearningSuggestion {
            skill: title_case(skill),
            priority: priority.to_string(),
            resources: resources.iter().map(|r| r.to_string()).collect(),
        };
    }

    LearningSuggestion {
        skill: title_case(skill),
        priority: "medium".to_string(),
        resources: vec![
            format!("Search for '{skill}' on Coursera"),
            format!("YouTube tutorials on {skill}"),
            format!("Practice {skill} on relevant platforms"),
        ],
    }
}

fn priority_rank(priority: &str) -> u8 {
    match priority {
        "high" => 0,
        "medium" => 1,
        "low" => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_gap_percentage_reflects_missing_share() {
        let report = analyze_skill_gap(
            &skills(&["python"]),
            &skills(&["python", "sql", "docker", "react"]),
        );
        assert_eq!(report.gap_percentage, 75.0);
        assert_eq!(report.matched_skills, vec!["Python"]);
        assert_eq!(report.missing_skills.len(), 3);
    }

    #[test]
    fn test_no_required_skills_means_no_gap() {
        let report = analyze_skill_gap(&skills(&["python"]), &[]);
        assert_eq!(report.gap_percentage, 0.0);
        assert!(report.learning_suggestions.is_empty());
    }

    #[test]
    fn test_known_skill_gets_curated_resources() {
        let report = analyze_skill_gap(&[], &skills(&["SQL"]));
        let suggestion = &report.learning_suggestions[0];
        assert_eq!(suggestion.skill, "Sql");
        assert_eq!(suggestion.priority, "high");
        assert!(suggestion.resources.contains(&"SQLZoo".to_string()));
    }

    #[test]
    fn test_unknown_skill_gets_generic_resources() {
        let report = analyze_skill_gap(&[], &skills(&["cobol"]));
        let suggestion = &report.learning_suggestions[0];
        assert_eq!(suggestion.priority, "medium");
        assert!(suggestion.resources[0].contains("Coursera"));
        assert!(suggestion.resources[0].contains("cobol"));
    }

    #[test]
    fn test_suggestions_sorted_high_priority_first() {
        // docker is medium priority, git is high.
        let report = analyze_skill_gap(&[], &skills(&["docker", "git"]));
        assert_eq!(report.learning_suggestions[0].priority, "high");
        assert_eq!(report.learning_suggestions[1].priority, "medium");
    }

    #[test]
    fn test_comparison_is_case_insensitive() {
        let report = analyze_skill_gap(&skills(&["PYTHON"]), &skills(&["Python"]));
        assert_eq!(report.gap_percentage, 0.0);
        assert_eq!(report.matched_skills, vec!["Python"]);
    }
}
