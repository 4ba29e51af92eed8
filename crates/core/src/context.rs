use crate::transcript::{TopicSegment, Transcript};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

// Function and question words that say nothing about what a question is about.
pub const STOPWORDS: &[&str] = &[
    "what", "is", "are", "the", "a", "an", "of", "to", "for", "in", "on", "and", "or", "by", "with",
    "about", "from", "at", "as", "do", "does", "did", "how", "why", "when", "where", "who", "which",
    "can", "could", "would", "should", "it", "that", "this", "these", "those",
];

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

/// Content-bearing tokens of an utterance, used as its relevance fingerprint.
pub type SubjectWords = BTreeSet<String>;

fn tokens(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn extract_subject_words(text: &str) -> SubjectWords {
    let mut words = tokens(text);
    words.retain(|w| !STOPWORDS.contains(&w.as_str()));
    words
}

/// True when at least one subject word also appears as a token of `corpus`.
pub fn context_has_subject_word(words: &SubjectWords, corpus: &str) -> bool {
    if words.is_empty() {
        return false;
    }
    let corpus_words = tokens(corpus);
    words.iter().any(|w| corpus_words.contains(w))
}

/// Returns the first topic, in table order, whose transcript lines share a subject word.
pub fn find_relevant_topic_segment<'a>(
    transcript: &Transcript,
    topics: &'a [TopicSegment],
    words: &SubjectWords,
) -> Option<&'a TopicSegment> {
    topics
        .iter()
        .find(|topic| context_has_subject_word(words, &transcript.topic_text(topic)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{LESSON_TOPICS, TranscriptSegment};

    fn words(list: &[&str]) -> SubjectWords {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_extract_subject_words_drops_stopwords() {
        assert_eq!(
            extract_subject_words("What is the formula for momentum"),
            words(&["formula", "momentum"])
        );
    }

    #[test]
    fn test_extract_subject_words_splits_on_word_boundaries() {
        assert_eq!(
            extract_subject_words("What is Newton's First Law?"),
            words(&["first", "law", "newton", "s"])
        );
        assert!(extract_subject_words("what is this?").is_empty());
        assert!(extract_subject_words("").is_empty());
    }

    #[test]
    fn test_context_has_subject_word() {
        let corpus = "Momentum is the product of mass and velocity.";
        assert!(context_has_subject_word(&words(&["velocity"]), corpus));
        assert!(!context_has_subject_word(&words(&["torque"]), corpus));
        // tokens, not substrings
        assert!(!context_has_subject_word(&words(&["mass"]), "massive objects"));
        assert!(!context_has_subject_word(&SubjectWords::new(), corpus));
    }

    #[test]
    fn test_find_relevant_topic_segment_uses_table_order() {
        let transcript = Transcript::new(vec![
            TranscriptSegment::new("Force changes motion.", 60.0, 70.0),
            TranscriptSegment::new("Inertia keeps a body moving.", 130.0, 140.0),
            TranscriptSegment::new("Momentum depends on force and time.", 340.0, 350.0),
        ])
        .unwrap();

        let found = find_relevant_topic_segment(&transcript, &LESSON_TOPICS, &words(&["force"]));
        assert_eq!(found.map(|t| t.section), Some("Force and its Types"));

        let found =
            find_relevant_topic_segment(&transcript, &LESSON_TOPICS, &words(&["inertia"]));
        assert_eq!(found.map(|t| t.section), Some("Newton's First Law"));

        let found =
            find_relevant_topic_segment(&transcript, &LESSON_TOPICS, &words(&["quantum"]));
        assert!(found.is_none());
    }
}
