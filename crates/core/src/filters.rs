//! Lexical filters.
//!
//! Stateless predicates over an utterance. Each one lowercases its input, so
//! callers can pass raw user text straight through.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub const OFFENSIVE_KEYWORDS: &[&str] = &[
    "porn", "adult", "drugs", "violence", "kill", "hate", "terror", "suicide", "murder", "abuse",
];

pub const QUESTION_WORDS: &[&str] = &[
    "what", "why", "how", "when", "where", "who", "which", "do", "does", "did", "is", "are", "can",
    "could", "would", "should", "define", "explain",
];

pub const DERIVATION_KEYWORDS: &[&str] = &[
    "derive",
    "derivation",
    "formula",
    "equation",
    "proof",
    "calculation",
    "explain step by step",
];

pub const TERMINATING_KEYWORDS: &[&str] = &["exit", "replay", "resume", "stop"];

const DANGLING_PREPOSITIONS: &[&str] = &["of", "about", "on", "in", "for", "to"];

const UNCLEAR_ENDINGS: &[&str] = &[
    "its units",
    "which units",
    "what about",
    "what is this",
    "what is that",
];

fn whole_word_pattern(words: &[&str]) -> String {
    format!(r"\b(?:{})\b", words.join("|"))
}

static OFFENSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?i){}", whole_word_pattern(OFFENSIVE_KEYWORDS)))
        .expect("offensive keyword pattern is valid")
});

static QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}|\?", whole_word_pattern(QUESTION_WORDS)))
        .expect("question pattern is valid")
});

static DANGLING_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}\s*$", whole_word_pattern(DANGLING_PREPOSITIONS)))
        .expect("dangling preposition pattern is valid")
});

static UNCLEAR_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:{})\??$", UNCLEAR_ENDINGS.join("|")))
        .expect("unclear referent pattern is valid")
});

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// True when the text contains a blocked keyword as a whole word.
pub fn is_offensive(text: &str) -> bool {
    OFFENSIVE.is_match(text)
}

/// True when the text carries a question mark or an interrogative/auxiliary word.
pub fn is_question(text: &str) -> bool {
    QUESTION.is_match(&normalize(text))
}

/// Heuristics for questions that are too short, cut off, stammered or lack a referent.
pub fn is_incomplete(text: &str) -> bool {
    let text = normalize(text);
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() < 3 {
        return true;
    }
    if DANGLING_END.is_match(&text) {
        return true;
    }
    // a repeated opening word usually means the speech was garbled
    if words.iter().filter(|w| **w == words[0]).count() > 1 {
        return true;
    }
    UNCLEAR_END.is_match(&text)
}

pub fn is_derivation(text: &str) -> bool {
    let text = text.to_lowercase();
    DERIVATION_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// Session-control words (`exit`, `replay`, ...). Substring match.
pub fn is_terminating(text: &str) -> bool {
    let text = text.to_lowercase();
    TERMINATING_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// Signals reported alongside a response. None of them change the answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cues {
    pub question: bool,
    pub derivation: bool,
    pub terminating: bool,
}

pub fn cues(text: &str) -> Cues {
    Cues {
        question: is_question(text),
        derivation: is_derivation(text),
        terminating: is_terminating(text),
    }
}
