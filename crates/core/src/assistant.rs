use crate::{
    context::{context_has_subject_word, extract_subject_words, find_relevant_topic_segment},
    filters::{self, Cues},
    format::format_response,
    oracle::{Oracle, OracleError},
    prompts::PromptSet,
    transcript::{LESSON_TOPICS, TopicSegment, Transcript},
};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

pub const OFFENSIVE_REPLY: &str =
    "I'm sorry, that question is inappropriate for our educational session.";
pub const OFF_FOCUS_REPLY: &str =
    "That question seems to be outside our focus. Let's stick to STEM topics!";
pub const UNCLEAR_REPLY: &str =
    "I didn't understand your question. Could you please rephrase or clarify?";
pub const NO_SUBJECT_REPLY: &str = "Please ask a question related to the lesson topic.";
pub const OUT_OF_SCOPE_REPLY: &str = "That question seems to be outside the current lesson scope.";
pub const THINKING_REPLY: &str = "Let me think that through...";

pub const ENCOURAGE_REPLY: &str = "Great! Let's continue.";
pub const THANKS_REPLY: &str = "You're welcome! Let's keep going.";
pub const READY_REPLY: &str = "Got your message. Ready when you are!";

const STEM_SUBJECTS: &[&str] = &["physics", "math", "science"];

pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(20);

static UNDERSTOOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:understand|got it|clear)\b").expect("acknowledgement pattern is valid")
});

// "tanks" is a common slip for "thanks"
static THANKED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:th?anks|thank you)\b").expect("thanks pattern is valid"));

/// The terminal state an utterance ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Offensive,
    OffFocus,
    Incomplete,
    NoSubject,
    OutOfScope,
    /// Answered from the lesson transcript.
    Answered,
    /// Answered without the transcript after the grounded attempt failed.
    FallbackAnswered,
    /// Both oracle attempts failed.
    Placeholder,
    /// Not a question; handled by the statement replies.
    Statement,
}

/// Everything a caller may want to know about one resolved utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub response: String,
    pub outcome: Outcome,
    pub cues: Cues,
    pub topic: Option<TopicSegment>,
}

struct Reply {
    outcome: Outcome,
    text: String,
}

impl Reply {
    fn canned(outcome: Outcome, text: &str) -> Self {
        Self {
            outcome,
            text: text.to_string(),
        }
    }
}

/// Classifies utterances against a lesson transcript and answers the ones in scope.
///
/// Methods take `&self`; one instance can be shared between concurrent requests.
pub struct Assistant {
    transcript: Arc<Transcript>,
    oracle: Arc<dyn Oracle>,
    prompts: PromptSet,
    topics: &'static [TopicSegment],
    oracle_timeout: Duration,
}

impl Assistant {
    pub fn new(transcript: Arc<Transcript>, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            transcript,
            oracle,
            prompts: PromptSet::default(),
            topics: &LESSON_TOPICS,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the response text for one utterance. Never fails.
    pub async fn resolve(&self, utterance: &str) -> String {
        self.answer(utterance).await.response
    }

    /// Like [`Assistant::resolve`], but also reports the outcome, the
    /// non-gating cues and, for questions, the lesson section they relate to.
    pub async fn answer(&self, utterance: &str) -> Answer {
        let cues = filters::cues(utterance);
        if cues.terminating {
            tracing::info!("Utterance contains a session-control keyword; leaving it to the caller.");
        }
        if cues.derivation {
            tracing::debug!("Utterance looks like a derivation request.");
        }

        // Offensive content is refused whether or not it reads as a question.
        if filters::is_offensive(utterance) {
            tracing::debug!("Rejected utterance as offensive.");
            return Answer {
                response: OFFENSIVE_REPLY.to_string(),
                outcome: Outcome::Offensive,
                cues,
                topic: None,
            };
        }

        if !cues.question {
            return Answer {
                response: Self::handle_statement(utterance).to_string(),
                outcome: Outcome::Statement,
                cues,
                topic: None,
            };
        }

        let reply = self.run_question(utterance).await;
        Answer {
            response: reply.text,
            outcome: reply.outcome,
            cues,
            topic: self.relevant_topic(utterance).copied(),
        }
    }

    pub async fn handle_question(&self, text: &str) -> String {
        self.run_question(text).await.text
    }

    /// Canned replies for utterances that are not questions.
    pub fn handle_statement(text: &str) -> &'static str {
        let text = text.to_lowercase();
        if UNDERSTOOD.is_match(&text) {
            ENCOURAGE_REPLY
        } else if THANKED.is_match(&text) {
            THANKS_REPLY
        } else {
            READY_REPLY
        }
    }

    /// The first lesson section whose lines share a subject word with `text`.
    pub fn relevant_topic(&self, text: &str) -> Option<&TopicSegment> {
        let words = extract_subject_words(text);
        find_relevant_topic_segment(&self.transcript, self.topics, &words)
    }

    // Gates run strictly in this order; the first one that trips decides the reply.
    async fn run_question(&self, text: &str) -> Reply {
        if filters::is_offensive(text) {
            tracing::debug!("Rejected question as offensive.");
            return Reply::canned(Outcome::Offensive, OFFENSIVE_REPLY);
        }
        if !self.is_stem_question(text).await {
            tracing::debug!("Rejected question as outside STEM subjects.");
            return Reply::canned(Outcome::OffFocus, OFF_FOCUS_REPLY);
        }
        if filters::is_incomplete(text) {
            tracing::debug!("Rejected question as incomplete.");
            return Reply::canned(Outcome::Incomplete, UNCLEAR_REPLY);
        }

        let subject_words = extract_subject_words(text);
        if subject_words.is_empty() {
            tracing::debug!("Rejected question with no subject words.");
            return Reply::canned(Outcome::NoSubject, NO_SUBJECT_REPLY);
        }
        let lesson = self.transcript.full_text();
        if !context_has_subject_word(&subject_words, lesson) {
            tracing::debug!(?subject_words, "No subject word appears in the lesson.");
            return Reply::canned(Outcome::OutOfScope, OUT_OF_SCOPE_REPLY);
        }

        match self.consult(&self.prompts.primary(lesson, text)).await {
            Ok(raw) => {
                let answer = format_response(&raw);
                if !answer.is_empty() {
                    return Reply {
                        outcome: Outcome::Answered,
                        text: answer,
                    };
                }
                tracing::warn!("Grounded answer was empty after formatting; falling back.");
            }
            Err(e) => tracing::warn!("Grounded answer failed: {}. Falling back.", e),
        }

        match self.consult(&self.prompts.fallback(text)).await {
            Ok(raw) => {
                let answer = format_response(&raw);
                if !answer.is_empty() {
                    return Reply {
                        outcome: Outcome::FallbackAnswered,
                        text: answer,
                    };
                }
                tracing::warn!("Fallback answer was empty after formatting.");
            }
            Err(e) => tracing::warn!("Fallback answer failed: {}.", e),
        }
        Reply::canned(Outcome::Placeholder, THINKING_REPLY)
    }

    // An unreachable oracle counts as "not STEM".
    async fn is_stem_question(&self, text: &str) -> bool {
        match self.consult(&self.prompts.classify(text)).await {
            Ok(subject) => {
                let subject = subject.trim().trim_end_matches('.').to_lowercase();
                tracing::debug!("Oracle classified question as '{}'.", subject);
                STEM_SUBJECTS.contains(&subject.as_str())
            }
            Err(e) => {
                tracing::warn!("Subject classification failed: {}", e);
                false
            }
        }
    }

    // Single attempt, bounded by the configured timeout.
    async fn consult(&self, prompt: &str) -> Result<String, OracleError> {
        match tokio::time::timeout(self.oracle_timeout, self.oracle.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(self.oracle_timeout)),
        }
    }
}
