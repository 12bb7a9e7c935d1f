use std::sync::OnceLock;

use regex::Regex;

/// Fixed vocabulary of recognized technology and soft-skill terms.
/// Matching is case-insensitive and word-boundary aware so "go" does not
/// fire inside "government" and "c++"/"c#" still match despite the symbols.
const SKILL_VOCABULARY: &[&str] = &[
    // Programming languages
    "python", "java", "javascript", "typescript", "c++", "c#", "ruby", "go",
    "rust", "swift", "kotlin", "php", "scala", "r", "matlab", "perl",
    // Web frameworks
    "react", "angular", "vue", "django", "flask", "fastapi", "express",
    "spring", "rails", "laravel", "next.js", "nuxt.js", "svelte",
    // Data & AI
    "machine learning", "deep learning", "tensorflow", "pytorch", "pandas",
    "numpy", "scikit-learn", "nlp", "computer vision", "data science",
    "data analysis", "big data", "spark", "hadoop",
    // Databases
    "sql", "mysql", "postgresql", "mongodb", "redis", "elasticsearch",
    "cassandra", "dynamodb", "firebase", "sqlite",
    // Cloud & DevOps
    "aws", "azure", "gcp", "docker", "kubernetes", "terraform", "jenkins",
    "ci/cd", "linux", "git", "github", "gitlab",
    // Mobile
    "android", "ios", "react native", "flutter", "xamarin",
    // Design
    "figma", "sketch", "adobe xd", "photoshop", "illustrator",
    // Other
    "html", "css", "rest api", "graphql", "microservices", "agile",
    "scrum", "jira", "confluence", "tableau", "power bi",
    "excel", "communication", "leadership", "teamwork", "problem solving",
];

fn matchers() -> &'static Vec<(&'static str, Regex)> {
    static MATCHERS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        SKILL_VOCABULARY
            .iter()
            .map(|term| (*term, boundary_pattern(term)))
            .collect()
    })
}

/// Builds a word-boundary-aware pattern for a vocabulary term. `\b` only
/// works next to word characters, so terms ending in symbols ("c++", "c#")
/// get an explicit not-followed-by-word-char tail instead.
fn boundary_pattern(term: &str) -> Regex {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut pattern = String::new();

    if term.chars().next().map(is_word).unwrap_or(false) {
        pattern.push_str(r"\b");
    } else {
        pattern.push_str(r"(?:^|[^0-9a-z_])");
    }
    pattern.push_str(&regex::escape(term));
    if term.chars().last().map(is_word).unwrap_or(false) {
        pattern.push_str(r"\b");
    } else {
        pattern.push_str(r"(?:[^0-9a-z_]|$)");
    }

    Regex::new(&pattern).expect("vocabulary term pattern")
}

/// Scans resume text against the vocabulary and returns matched skills in
/// display casing, deduplicated (the vocabulary itself has no duplicates).
pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    matchers()
        .iter()
        .filter(|(_, re)| re.is_match(&lower))
        .map(|(term, _)| display_skill(term))
        .collect()
}

/// Short tokens are treated as acronyms ("sql" -> "SQL", "c++" -> "C++");
/// anything longer is title-cased.
pub fn display_skill(term: &str) -> String {
    if term.chars().count() > 3 {
        title_case(term)
    } else {
        term.to_uppercase()
    }
}

/// Title-cases a term the way skills are displayed: the first alphabetic
/// character after any non-alphabetic one is upper-cased, the rest lowered
/// ("machine learning" -> "Machine Learning", "scikit-learn" -> "Scikit-Learn").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_skill_scan() {
        let skills = extract_skills("Built services in Python and React, deployed on AWS.");
        assert!(skills.contains(&"Python".to_string()));
        assert!(skills.contains(&"React".to_string()));
        assert!(skills.contains(&"AWS".to_string()));
    }

    #[test]
    fn test_word_boundaries_prevent_partial_matches() {
        // "go" must not fire inside "government", "r" not inside "resume".
        let skills = extract_skills("Worked on government resume systems.");
        assert!(!skills.contains(&"GO".to_string()));
        assert!(!skills.contains(&"R".to_string()));
    }

    #[test]
    fn test_symbol_suffixed_terms_match() {
        let skills = extract_skills("Fluent in C++ and C# since college.");
        assert!(skills.contains(&"C++".to_string()));
        assert!(skills.contains(&"C#".to_string()));
    }

    #[test]
    fn test_cpp_does_not_match_bare_c() {
        let skills = extract_skills("Shipped C++ services.");
        assert!(skills.contains(&"C++".to_string()));
        assert!(!skills.contains(&"C#".to_string()));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let skills = extract_skills("POSTGRESQL and Machine Learning experience");
        assert!(skills.contains(&"Postgresql".to_string()));
        assert!(skills.contains(&"Machine Learning".to_string()));
    }

    #[test]
    fn test_short_tokens_upper_cased() {
        let skills = extract_skills("sql, git and aws");
        assert!(skills.contains(&"SQL".to_string()));
        assert!(skills.contains(&"GIT".to_string()));
        assert!(skills.contains(&"AWS".to_string()));
    }

    #[test]
    fn test_no_duplicates_for_repeated_mentions() {
        let skills = extract_skills("Python python PYTHON");
        assert_eq!(
            skills.iter().filter(|s| *s == "Python").count(),
            1
        );
    }

    #[test]
    fn test_empty_text_yields_empty() {
        assert!(extract_skills("").is_empty());
    }

    #[test]
    fn test_title_case_examples() {
        assert_eq!(title_case("machine learning"), "Machine Learning");
        assert_eq!(title_case("scikit-learn"), "Scikit-Learn");
        assert_eq!(title_case("next.js"), "Next.Js");
    }
}
