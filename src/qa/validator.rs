//! Structural validation of the model's free-text answer.
//!
//! Extracts `Perspective <n>:` lines and the numbered lines after the
//! first `Discussion Questions:` marker. Validity requires 3-5
//! perspectives and at most 3 questions; a missing marker just yields an
//! empty question list and is acceptable on its own.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const QUESTIONS_MARKER: &str = "Discussion Questions:";

const MIN_PERSPECTIVES: usize = 3;
const MAX_PERSPECTIVES: usize = 5;
const MAX_QUESTIONS: usize = 3;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StructuredAnswer {
    pub perspectives: Vec<String>,
    pub discussion_questions: Vec<String>,
}

fn perspective_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Perspective \d+: (.*?)\n").expect("static regex"))
}

fn question_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\. (.*?)\n").expect("static regex"))
}

pub fn parse_answer(raw: &str) -> StructuredAnswer {
    let perspectives = perspective_regex()
        .captures_iter(raw)
        .map(|cap| cap[1].to_string())
        .collect();

    let discussion_questions = match raw.split_once(QUESTIONS_MARKER) {
        Some((_, tail)) => question_regex()
            .captures_iter(tail)
            .map(|cap| cap[1].to_string())
            .collect(),
        None => Vec::new(),
    };

    StructuredAnswer {
        perspectives,
        discussion_questions,
    }
}

pub fn validate_answer(raw: &str) -> bool {
    let answer = parse_answer(raw);
    (MIN_PERSPECTIVES..=MAX_PERSPECTIVES).contains(&answer.perspectives.len())
        && answer.discussion_questions.len() <= MAX_QUESTIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed(perspectives: usize, questions: usize) -> String {
        let mut text = String::new();
        for i in 1..=perspectives {
            text.push_str(&format!(
                "Perspective {i}: Viewpoint number {i}.\nPage: {i}, Book Title: Sec1\n\n"
            ));
        }
        if questions > 0 {
            text.push_str("Discussion Questions:\n");
            for i in 1..=questions {
                text.push_str(&format!("{i}. Question number {i}?\n"));
            }
        }
        text
    }

    #[test]
    fn extracts_perspectives_and_questions() {
        let parsed = parse_answer(&well_formed(3, 2));

        assert_eq!(parsed.perspectives.len(), 3);
        assert_eq!(parsed.perspectives[0], "Viewpoint number 1.");
        assert_eq!(parsed.discussion_questions.len(), 2);
        assert_eq!(parsed.discussion_questions[1], "Question number 2?");
    }

    #[test]
    fn rejects_text_with_no_perspectives() {
        assert!(!validate_answer(
            "I don't have the available information. Please refer to other resources.\n"
        ));
    }

    #[test]
    fn accepts_three_perspectives_and_two_questions() {
        assert!(validate_answer(&well_formed(3, 2)));
    }

    #[test]
    fn accepts_missing_questions_marker_with_valid_perspectives() {
        let text = well_formed(4, 0);
        assert!(!text.contains(QUESTIONS_MARKER));
        assert!(validate_answer(&text));
    }

    #[test]
    fn rejects_too_few_or_too_many_perspectives() {
        assert!(!validate_answer(&well_formed(2, 2)));
        assert!(!validate_answer(&well_formed(6, 2)));
    }

    #[test]
    fn rejects_more_than_three_questions() {
        assert!(!validate_answer(&well_formed(3, 4)));
    }

    #[test]
    fn numbered_lines_before_the_marker_are_not_questions() {
        let text = "Perspective 1: A.\n1. stray numbered line\nPerspective 2: B.\nPerspective 3: C.\n";
        let parsed = parse_answer(text);

        assert!(parsed.discussion_questions.is_empty());
        assert!(validate_answer(text));
    }

    #[test]
    fn perspective_without_trailing_newline_is_not_extracted() {
        // Extraction requires a line terminator; completions end with
        // one in practice.
        let parsed = parse_answer("Perspective 1: dangling");
        assert!(parsed.perspectives.is_empty());
    }
}
