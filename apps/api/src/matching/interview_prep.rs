//! Canned interview preparation: per-skill technical question banks,
//! behavioral questions, tips, and focus areas, plus the keyword-triggered
//! practice chat replies.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::models::interview::PrepQuestion;

/// (skill, [(question, difficulty, sample_answer)]).
const TECHNICAL_BANKS: &[(&str, &[(&str, &str, &str)])] = &[
    (
        "python",
        &[
            (
                "What are Python decorators and how do they work?",
                "medium",
                "Decorators are functions that modify the behavior of other functions. They use the @decorator syntax and wrap functions to add functionality.",
            ),
            (
                "Explain the difference between lists and tuples in Python.",
                "easy",
                "Lists are mutable (can be changed after creation), tuples are immutable. Tuples are slightly faster and can be used as dictionary keys.",
            ),
        ],
    ),
    (
        "javascript",
        &[
            (
                "What is the difference between var, let, and const?",
                "easy",
                "var has function scope, let and const have block scope. const cannot be reassigned. var is hoisted, let/const are in temporal dead zone.",
            ),
            (
                "Explain closures in JavaScript.",
                "medium",
                "A closure is a function that has access to variables in its outer scope, even after the outer function has returned.",
            ),
        ],
    ),
    (
        "react",
        &[
            (
                "What are React hooks and why were they introduced?",
                "medium",
                "Hooks let you use state and lifecycle features in functional components. They were introduced to simplify component logic and enable code reuse.",
            ),
            (
                "Explain the virtual DOM in React.",
                "easy",
                "The virtual DOM is a lightweight copy of the actual DOM. React uses it to determine what changes need to be made, then updates only the changed parts.",
            ),
        ],
    ),
    (
        "sql",
        &[
            (
                "What is the difference between INNER JOIN and LEFT JOIN?",
                "easy",
                "INNER JOIN returns only matching rows from both tables. LEFT JOIN returns all rows from the left table and matching rows from the right.",
            ),
            (
                "How do you optimize a slow SQL query?",
                "hard",
                "Use indexes, avoid SELECT *, use EXPLAIN to analyze query plan, optimize JOINs, avoid subqueries when possible, use pagination.",
            ),
        ],
    ),
    (
        "machine learning",
        &[(
            "What is overfitting and how do you prevent it?",
            "medium",
            "Overfitting is when a model performs well on training data but poorly on new data. Prevention: regularization, cross-validation, more data, simpler models.",
        )],
    ),
];

const COMPANY_RESEARCH_POINTS: &[&str] = &[
    "Company mission and values",
    "Recent news and product launches",
    "Tech stack and engineering blog",
    "Company culture and team structure",
    "Growth plans and industry position",
];

const CHAT_FOLLOW_UPS: &[&str] = &[
    "That's a good point. How would you apply that to a real-world project?",
    "Can you elaborate on the technical aspects of that?",
    "Interesting! What was the most challenging part of that experience?",
    "How do you usually handle disagreements with team members during such projects?",
    "That sounds like a solid approach. Let's move to a technical question. How do you ensure your code is scalable?",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewPrepKit {
    pub questions: Vec<PrepQuestion>,
    pub tips: Vec<String>,
    pub focus_areas: Vec<String>,
    pub company_research_points: Vec<String>,
}

/// Assembles the prep kit for a job: technical questions for each required
/// skill with a bank, then the behavioral set, tips, and focus areas.
pub fn build_prep_kit(job_title: &str, job_skills: &[String]) -> InterviewPrepKit {
    let mut questions = Vec::new();

    for skill in job_skills {
        let skill_lower = skill.to_lowercase();
        if let Some((_, bank)) = TECHNICAL_BANKS.iter().find(|(s, _)| *s == skill_lower) {
            for (question, difficulty, sample_answer) in *bank {
                questions.push(PrepQuestion {
                    question: question.to_string(),
                    category: "technical".to_string(),
                    difficulty: difficulty.to_string(),
                    sample_answer: sample_answer.to_string(),
                });
            }
        }
    }

    questions.extend(behavioral_questions(job_title));

    InterviewPrepKit {
        questions,
        tips: build_tips(job_skills),
        focus_areas: build_focus_areas(job_title, job_skills),
        company_research_points: COMPANY_RESEARCH_POINTS
            .iter()
            .map(|p| p.to_string())
            .collect(),
    }
}

fn behavioral_questions(job_title: &str) -> Vec<PrepQuestion> {
    let behavioral = [
        (
            "Tell me about a challenging project you worked on.".to_string(),
            "medium",
            "Structure your answer using STAR method: Situation, Task, Action, Result. Focus on your specific contributions.",
        ),
        (
            "How do you handle tight deadlines?".to_string(),
            "easy",
            "Prioritize tasks, communicate early about blockers, break work into smaller chunks, and focus on delivering the most valuable features first.",
        ),
        (
            "Describe a time you disagreed with a team member.".to_string(),
            "medium",
            "Focus on how you communicated professionally, listened to their perspective, and found a compromise or solution.",
        ),
        (
            format!("Why are you interested in this {job_title} position?"),
            "easy",
            "Research the company, align your skills with the role, and show genuine enthusiasm for the industry/technology.",
        ),
    ];

    behavioral
        .into_iter()
        .map(|(question, difficulty, sample_answer)| PrepQuestion {
            question,
            category: "behavioral".to_string(),
            difficulty: difficulty.to_string(),
            sample_answer: sample_answer.to_string(),
        })
        .collect()
}

fn build_tips(job_skills: &[String]) -> Vec<String> {
    let practice_topics = if job_skills.is_empty() {
        "general programming".to_string()
    } else {
        job_skills
            .iter()
            .take(5)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    vec![
        "Research the company thoroughly before the interview.".to_string(),
        "Review the job description and prepare examples for each requirement.".to_string(),
        format!("Practice coding problems related to: {practice_topics}."),
        "Prepare 2-3 questions to ask the interviewer about the team and projects.".to_string(),
        "Use the STAR method (Situation, Task, Action, Result) for behavioral questions."
            .to_string(),
        "Test your audio/video setup before a virtual interview.".to_string(),
        "Be ready to discuss your resume and past projects in detail.".to_string(),
    ]
}

fn build_focus_areas(job_title: &str, job_skills: &[String]) -> Vec<String> {
    let mut areas: Vec<String> = Vec::new();
    for skill in job_skills.iter().take(6) {
        if !areas.iter().any(|a| a.eq_ignore_ascii_case(skill)) {
            areas.push(skill.clone());
        }
    }
    if areas.is_empty() {
        areas.push("Problem Solving".to_string());
        areas.push("Communication".to_string());
    }

    if job_title.to_lowercase().contains("senior") {
        areas.push("System Design".to_string());
    } else {
        areas.push("Coding Fundamentals".to_string());
    }
    areas
}

/// Keyword-triggered canned chat. Non-trigger messages get one of a small
/// set of follow-up prompts.
pub fn chat_reply(message: &str) -> String {
    let lower = message.to_lowercase();

    if lower.contains("practice") || lower.contains("start") {
        return "Great! Let's start. Here is your first question: **Tell me about a time you \
                faced a difficult technical challenge and how you solved it.**"
            .to_string();
    }
    if lower.contains("star") {
        return "Exactly! The **STAR** method (Situation, Task, Action, Result) is the best way \
                to structure your answers."
            .to_string();
    }

    CHAT_FOLLOW_UPS
        .choose(&mut rand::thread_rng())
        .expect("follow-up bank is non-empty")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_kit_includes_bank_questions_for_known_skills() {
        let kit = build_prep_kit("Backend Intern", &skills(&["Python", "SQL"]));
        let technical: Vec<&PrepQuestion> = kit
            .questions
            .iter()
            .filter(|q| q.category == "technical")
            .collect();
        assert_eq!(technical.len(), 4); // two per bank
        assert!(technical.iter().any(|q| q.question.contains("decorators")));
        assert!(technical.iter().any(|q| q.question.contains("INNER JOIN")));
    }

    #[test]
    fn test_behavioral_questions_always_present() {
        let kit = build_prep_kit("Designer", &[]);
        let behavioral = kit
            .questions
            .iter()
            .filter(|q| q.category == "behavioral")
            .count();
        assert_eq!(behavioral, 4);
        assert!(kit
            .questions
            .iter()
            .any(|q| q.question.contains("Designer position")));
    }

    #[test]
    fn test_unknown_skills_add_no_technical_questions() {
        let kit = build_prep_kit("Intern", &skills(&["cobol"]));
        assert!(kit.questions.iter().all(|q| q.category == "behavioral"));
    }

    #[test]
    fn test_focus_area_for_senior_roles() {
        let kit = build_prep_kit("Senior Software Engineer", &skills(&["python"]));
        assert!(kit.focus_areas.contains(&"System Design".to_string()));
    }

    #[test]
    fn test_focus_area_for_entry_roles() {
        let kit = build_prep_kit("Software Intern", &skills(&["python"]));
        assert!(kit.focus_areas.contains(&"Coding Fundamentals".to_string()));
    }

    #[test]
    fn test_focus_areas_fall_back_when_no_skills() {
        let kit = build_prep_kit("Intern", &[]);
        assert!(kit.focus_areas.contains(&"Problem Solving".to_string()));
        assert!(kit.focus_areas.contains(&"Communication".to_string()));
    }

    #[test]
    fn test_tips_mention_required_skills() {
        let kit = build_prep_kit("Intern", &skills(&["Python", "Docker"]));
        assert!(kit.tips.iter().any(|t| t.contains("Python, Docker")));
    }

    #[test]
    fn test_chat_practice_trigger() {
        let reply = chat_reply("Can we practice now?");
        assert!(reply.contains("first question"));
    }

    #[test]
    fn test_chat_star_trigger() {
        let reply = chat_reply("Should I use the STAR method?");
        assert!(reply.contains("STAR"));
    }

    #[test]
    fn test_chat_fallback_is_canned_follow_up() {
        let reply = chat_reply("I once built a compiler.");
        assert!(CHAT_FOLLOW_UPS.contains(&reply.as_str()));
    }
}
