use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::user::{EducationEntry, ExperienceEntry};

/// At most this many education/experience entries are kept per resume.
const MAX_ENTRIES: usize = 3;

/// Lines shorter than this are noise; longer than this are paragraphs.
const MIN_LINE_LEN: usize = 4;
const MAX_LINE_LEN: usize = 120;

const DURATION_PLACEHOLDER: &str = "Not specified";

fn degree_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(bachelor(?:'s)?|b\.?e\.?\b|b\.?tech\b|b\.?sc\b|b\.?s\b|b\.?a\b|master(?:'s)?|m\.?s\b|m\.?tech\b|m\.?sc\b|ph\.?d\b|mba\b|diploma|higher secondary|senior secondary|high school|secondary school)",
        )
        .expect("degree pattern")
    })
}

fn institution_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(university|college|institute|institution|school|academy|polytechnic)\b")
            .expect("institution pattern")
    })
}

fn blacklist_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(objective|summary|about me|career goal|profile)\b")
            .expect("blacklist pattern")
    })
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(199\d|20[0-2]\d)\b").expect("year pattern"))
}

fn year_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(199\d|20[0-2]\d)\s*(?:-|–|—|to)\s*(199\d|20[0-2]\d|present|current|now)\b")
            .expect("year range pattern")
    })
}

fn job_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(developer|engineer|intern(?:ship)?|analyst|manager|lead|consultant|designer|architect|scientist|administrator)\b",
        )
        .expect("job title pattern")
    })
}

fn bullet_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*•·>]+|\d+[.)])\s*").expect("bullet pattern"))
}

/// Strips leading bullets/numbering and surrounding whitespace.
fn clean_line(line: &str) -> String {
    bullet_prefix_re().replace(line.trim(), "").trim().to_string()
}

/// Normalizes a matched degree phrase into one of a small closed label set.
fn degree_label(line: &str) -> &'static str {
    let lower = line.to_lowercase();
    if lower.contains("ph.d") || lower.contains("phd") {
        "Doctorate"
    } else if lower.contains("mba") {
        "MBA"
    } else if lower.contains("master")
        || lower.contains("m.tech")
        || lower.contains("m.sc")
        || lower.contains("m.s")
        || lower.contains("mtech")
        || lower.contains("msc")
    {
        "Master's Degree"
    } else if lower.contains("bachelor")
        || lower.contains("b.e")
        || lower.contains("b.tech")
        || lower.contains("b.sc")
        || lower.contains("b.s")
        || lower.contains("b.a")
        || lower.contains("btech")
        || lower.contains("bsc")
    {
        "Bachelor's Degree"
    } else if lower.contains("diploma") {
        "Diploma"
    } else if lower.contains("higher secondary")
        || lower.contains("senior secondary")
        || lower.contains("high school")
        || lower.contains("secondary school")
    {
        "Secondary Education"
    } else {
        "Degree"
    }
}

/// Pulls the institution name out of an education line using separator
/// heuristics, falling back to the whole cleaned line.
fn institution_from(line: &str) -> String {
    let cleaned = clean_line(line);
    let lower = cleaned.to_lowercase();

    for sep in [" at ", " from ", " - ", " | "] {
        // Offsets come from the lowercased copy; lowercasing can shift byte
        // positions in non-ASCII text, so slice defensively.
        if let Some(tail) = lower
            .find(sep)
            .and_then(|idx| cleaned.get(idx + sep.len()..))
        {
            let tail = tail.trim();
            if !tail.is_empty() {
                return strip_trailing_year(tail);
            }
        }
    }
    strip_trailing_year(&cleaned)
}

/// Removes a trailing ", 2019"-style year fragment and dangling punctuation.
fn strip_trailing_year(s: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)[\s,;(]*\b(199\d|20[0-2]\d)\s*[-–—]?\s*(199\d|20[0-2]\d|present|current)?\)?\s*$")
            .expect("trailing year pattern")
    });
    re.replace(s, "")
        .trim_end_matches([',', ';', '.', ' '])
        .trim()
        .to_string()
}

fn find_year(lines: &[&str], idx: usize) -> Option<String> {
    // Same line first, then the immediate neighbors.
    let candidates = [
        Some(idx),
        idx.checked_sub(1),
        (idx + 1 < lines.len()).then_some(idx + 1),
    ];
    for candidate in candidates.into_iter().flatten() {
        if let Some(m) = year_re().find(lines[candidate]) {
            return Some(m.as_str().to_string());
        }
    }
    None
}

fn line_in_bounds(line: &str) -> bool {
    (MIN_LINE_LEN..=MAX_LINE_LEN).contains(&line.chars().count())
}

/// Scans resume text line-by-line for education entries: a line matching a
/// degree or institution keyword yields one entry with a normalized degree
/// label, a separator-extracted institution, and a nearby 4-digit year.
/// Deduplicated by institution (case-insensitive), capped at 3.
pub fn extract_education(text: &str) -> Vec<EducationEntry> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut out: Vec<EducationEntry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (i, line) in lines.iter().enumerate() {
        if out.len() == MAX_ENTRIES {
            break;
        }
        if !line_in_bounds(line) || blacklist_re().is_match(line) {
            continue;
        }

        let is_degree = degree_re().is_match(line);
        let is_institution = institution_re().is_match(line);
        if !is_degree && !is_institution {
            continue;
        }

        // A degree line may carry its label on a neighbor, and vice versa.
        let degree = if is_degree {
            degree_label(line)
        } else {
            neighbor_degree(&lines, i).unwrap_or("Degree")
        };

        let institution = institution_from(line);
        if institution.is_empty() {
            continue;
        }
        if !seen.insert(institution.to_lowercase()) {
            continue;
        }

        out.push(EducationEntry {
            degree: degree.to_string(),
            institution,
            year: find_year(&lines, i),
        });
    }

    out
}

fn neighbor_degree(lines: &[&str], idx: usize) -> Option<&'static str> {
    let neighbors = [idx.checked_sub(1), (idx + 1 < lines.len()).then_some(idx + 1)];
    for neighbor in neighbors.into_iter().flatten() {
        if degree_re().is_match(lines[neighbor]) {
            return Some(degree_label(lines[neighbor]));
        }
    }
    None
}

/// Scans resume text line-by-line for experience entries keyed on job-title
/// keywords, excluding education-looking lines. The company comes from
/// " at "/"|" separators or the adjacent line; duration from a year-range
/// or a placeholder. Deduplicated by company, capped at 3.
pub fn extract_experience(text: &str) -> Vec<ExperienceEntry> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut out: Vec<ExperienceEntry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (i, line) in lines.iter().enumerate() {
        if out.len() == MAX_ENTRIES {
            break;
        }
        if !line_in_bounds(line) || blacklist_re().is_match(line) {
            continue;
        }
        if !job_title_re().is_match(line) {
            continue;
        }
        // "Engineering College" is education, not a job.
        if degree_re().is_match(line) || institution_re().is_match(line) {
            continue;
        }

        let cleaned = clean_line(line);
        let Some((title, company)) = split_title_company(&cleaned, lines.get(i + 1).copied())
        else {
            continue;
        };

        if !seen.insert(company.to_lowercase()) {
            continue;
        }

        let duration = year_range_re()
            .find(&cleaned)
            .or_else(|| lines.get(i + 1).and_then(|next| year_range_re().find(next)))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DURATION_PLACEHOLDER.to_string());

        out.push(ExperienceEntry {
            title,
            company,
            duration,
        });
    }

    out
}

/// Splits an experience line into (title, company). Returns None when no
/// company can be located — a bare title line is not enough for an entry.
fn split_title_company(line: &str, next_line: Option<&str>) -> Option<(String, String)> {
    let lower = line.to_lowercase();

    if let Some(idx) = lower.find(" at ") {
        let title = line.get(..idx).unwrap_or_default().trim();
        let after = line.get(idx + 4..).unwrap_or_default().trim();
        let company = after.split(',').next().unwrap_or(after).trim();
        let company = strip_trailing_year(company);
        if !company.is_empty() {
            return Some((fallback_title(title), company));
        }
    }

    if line.contains('|') {
        let mut parts = line.split('|').map(str::trim);
        let title = parts.next().unwrap_or_default();
        if let Some(company) = parts.next().filter(|c| !c.is_empty()) {
            return Some((fallback_title(title), strip_trailing_year(company)));
        }
    }

    // Adjacent-line heuristic: "Software Engineer" on one line, the company
    // on the next. The next line must look like a name, not another entry.
    if let Some(next) = next_line {
        let next = clean_line(next);
        if (MIN_LINE_LEN..=80).contains(&next.chars().count())
            && !job_title_re().is_match(&next)
            && !degree_re().is_match(&next)
            && !institution_re().is_match(&next)
        {
            let company = next.split(',').next().unwrap_or(&next).trim();
            let company = strip_trailing_year(company);
            if !company.is_empty() {
                return Some((fallback_title(line), company));
            }
        }
    }

    None
}

fn fallback_title(candidate: &str) -> String {
    let cleaned = strip_trailing_year(candidate.trim());
    if cleaned.is_empty() {
        "Professional".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_education_line_with_from_separator() {
        let text = "Bachelor of Technology from Indian Institute of Technology, 2018";
        let entries = extract_education(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].degree, "Bachelor's Degree");
        assert_eq!(entries[0].institution, "Indian Institute of Technology");
        assert_eq!(entries[0].year.as_deref(), Some("2018"));
    }

    #[test]
    fn test_education_year_found_on_neighbor_line() {
        let text = "Master of Science at Stanford University\nGraduated 2021";
        let entries = extract_education(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].degree, "Master's Degree");
        assert_eq!(entries[0].institution, "Stanford University");
        assert_eq!(entries[0].year.as_deref(), Some("2021"));
    }

    #[test]
    fn test_education_deduplicated_by_institution_and_capped() {
        let text = "\
B.Tech from Pilani College, 2015
MBA from Pilani College, 2019
PhD from Alpha University, 2022
Diploma from Beta College, 2010
Bachelor from Gamma Institute of Science, 2011";
        let entries = extract_education(text);
        assert_eq!(entries.len(), 3);
        let institutions: Vec<&str> =
            entries.iter().map(|e| e.institution.as_str()).collect();
        assert_eq!(
            institutions,
            vec!["Pilani College", "Alpha University", "Beta College"]
        );
    }

    #[test]
    fn test_education_skips_blacklisted_and_oversized_lines() {
        let long_line = format!("University {}", "x".repeat(150));
        let text = format!("Career Objective: join a great University\n{long_line}");
        assert!(extract_education(&text).is_empty());
    }

    #[test]
    fn test_education_empty_input() {
        assert!(extract_education("").is_empty());
        assert!(extract_education("no schooling keywords here").is_empty());
    }

    #[test]
    fn test_degree_labels_normalized() {
        assert_eq!(degree_label("Ph.D in Physics"), "Doctorate");
        assert_eq!(degree_label("MBA, Finance"), "MBA");
        assert_eq!(degree_label("M.Tech in CSE"), "Master's Degree");
        assert_eq!(degree_label("B.Sc Mathematics"), "Bachelor's Degree");
        assert_eq!(degree_label("Diploma in Design"), "Diploma");
        assert_eq!(degree_label("High School"), "Secondary Education");
        assert_eq!(degree_label("unknown credential"), "Degree");
    }

    #[test]
    fn test_experience_with_at_separator() {
        let text = "Software Engineer at Globex, Bangalore";
        let entries = extract_experience(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Software Engineer");
        assert_eq!(entries[0].company, "Globex");
        assert_eq!(entries[0].duration, DURATION_PLACEHOLDER);
    }

    #[test]
    fn test_experience_with_pipe_separator_and_range() {
        let text = "Data Analyst | Initech | 2019 - 2021";
        let entries = extract_experience(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Data Analyst");
        assert_eq!(entries[0].company, "Initech");
        assert_eq!(entries[0].duration, "2019 - 2021");
    }

    #[test]
    fn test_experience_company_from_adjacent_line() {
        let text = "Backend Developer\nHooli Inc, Remote\n2020 - Present";
        let entries = extract_experience(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company, "Hooli Inc");
    }

    #[test]
    fn test_experience_excludes_education_lines() {
        // Matches the title keyword "Engineer" but is an institution line.
        let text = "Engineer at National Institute of Technology";
        assert!(extract_experience(text).is_empty());
    }

    #[test]
    fn test_experience_deduplicated_by_company() {
        let text = "Intern at Globex\nSoftware Engineer at Globex";
        let entries = extract_experience(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company, "Globex");
    }

    #[test]
    fn test_experience_capped_at_three() {
        let text = "\
Engineer at Alpha
Engineer at Beta
Engineer at Gamma
Engineer at Delta";
        assert_eq!(extract_experience(text).len(), 3);
    }

    #[test]
    fn test_experience_empty_input() {
        assert!(extract_experience("").is_empty());
    }
}
