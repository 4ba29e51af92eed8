use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Width (in seconds, either side of the playback time) of the transcript window.
pub const CONTEXT_WINDOW_SECS: f64 = 40.0;

/// A custom error type for transcript loading failures.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Failed to read transcript file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse transcript JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Transcript segment {index} ends before it starts ({start} > {end})")]
    InvalidSegment { index: usize, start: f64, end: f64 },
}

// one timestamped line of the lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    #[serde(deserialize_with = "seconds")]
    pub start: f64,
    #[serde(deserialize_with = "seconds")]
    pub end: f64,
}

// Timestamps show up both as JSON numbers and as numeric strings.
fn seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(f64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(value) => Ok(value),
        Seconds::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{text}': {e}"))),
    }
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// True when the whole segment lies inside `[from, to]`.
    pub fn within(&self, from: f64, to: f64) -> bool {
        self.start >= from && self.end <= to
    }
}

/// The lesson transcript, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
    full_text: String,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Result<Self, TranscriptError> {
        if let Some((index, seg)) = segments
            .iter()
            .enumerate()
            .find(|(_, seg)| seg.start > seg.end)
        {
            return Err(TranscriptError::InvalidSegment {
                index,
                start: seg.start,
                end: seg.end,
            });
        }

        let full_text = join_lowercase(segments.iter());
        Ok(Self {
            segments,
            full_text,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, TranscriptError> {
        let segments: Vec<TranscriptSegment> = serde_json::from_str(json)?;
        Self::new(segments)
    }

    pub fn from_path(path: &Path) -> Result<Self, TranscriptError> {
        let json = std::fs::read_to_string(path).map_err(|source| TranscriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let transcript = Self::from_json(&json)?;
        tracing::info!(
            "Loaded transcript from {} ({} segments).",
            path.display(),
            transcript.len()
        );
        Ok(transcript)
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Every line of the lesson joined by single spaces, lowercased.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Segments lying entirely within `radius` seconds of the playback time `at`.
    pub fn window(&self, at: f64, radius: f64) -> Vec<&TranscriptSegment> {
        self.segments
            .iter()
            .filter(|seg| seg.within(at - radius, at + radius))
            .collect()
    }

    /// Lowercased text of the lines that fall inside a topic's interval.
    pub fn topic_text(&self, topic: &TopicSegment) -> String {
        join_lowercase(
            self.segments
                .iter()
                .filter(|seg| seg.within(topic.start, topic.end)),
        )
    }
}

fn join_lowercase<'a>(segments: impl Iterator<Item = &'a TranscriptSegment>) -> String {
    segments
        .map(|seg| seg.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A named subsection of the lesson video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopicSegment {
    pub section: &'static str,
    pub start: f64,
    pub end: f64,
}

impl TopicSegment {
    pub const fn new(section: &'static str, start: f64, end: f64) -> Self {
        Self {
            section,
            start,
            end,
        }
    }
}

pub const LESSON_TOPICS: [TopicSegment; 7] = [
    TopicSegment::new("Introduction", 0.0, 48.0),
    TopicSegment::new("Force and its Types", 48.0, 120.0),
    TopicSegment::new("Newton's First Law", 120.0, 218.0),
    TopicSegment::new("Newton's Second Law", 218.0, 332.0),
    TopicSegment::new("Momentum", 332.0, 454.0),
    TopicSegment::new("Newton's Third Law", 454.0, 544.0),
    TopicSegment::new("Conservation of Momentum", 544.0, 693.0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lesson() -> Transcript {
        Transcript::new(vec![
            TranscriptSegment::new("Welcome to the lesson on Forces.", 0.0, 10.0),
            TranscriptSegment::new("A push or a pull is a Force.", 50.0, 60.0),
            TranscriptSegment::new("Newton's First Law is about inertia.", 125.0, 140.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_full_text_is_joined_and_lowercased() {
        let transcript = lesson();
        assert_eq!(
            transcript.full_text(),
            "welcome to the lesson on forces. a push or a pull is a force. newton's first law is about inertia."
        );
    }

    #[test]
    fn test_window_keeps_segments_inside_radius() {
        let transcript = lesson();

        let near_start: Vec<_> = transcript
            .window(20.0, CONTEXT_WINDOW_SECS)
            .into_iter()
            .map(|seg| seg.start)
            .collect();
        assert_eq!(near_start, vec![0.0, 50.0]);

        // 125..140 overruns the 125..135 window.
        assert!(transcript.window(130.0, 5.0).is_empty());
    }

    #[test]
    fn test_topic_text_only_includes_contained_lines() {
        let transcript = lesson();
        assert_eq!(
            transcript.topic_text(&LESSON_TOPICS[2]),
            "newton's first law is about inertia."
        );
        assert_eq!(transcript.topic_text(&LESSON_TOPICS[4]), "");
    }

    #[test]
    fn test_from_json_accepts_string_timestamps() {
        let json = r#"[
            {"text": "Momentum is mass times velocity.", "start": "332.5", "end": 340}
        ]"#;
        let transcript = Transcript::from_json(json).unwrap();
        assert_eq!(transcript.segments()[0].start, 332.5);
        assert_eq!(transcript.segments()[0].end, 340.0);
    }

    #[test]
    fn test_rejects_segment_ending_before_start() {
        let json = r#"[{"text": "x", "start": 10, "end": 5}]"#;
        let err = Transcript::from_json(json).unwrap_err();
        assert!(matches!(err, TranscriptError::InvalidSegment { index: 0, .. }));
    }

    #[test]
    fn test_from_path_reports_missing_and_malformed_files() -> anyhow::Result<()> {
        let missing = Transcript::from_path(Path::new("no_such_transcript.json"));
        assert!(matches!(missing, Err(TranscriptError::Io { .. })));

        let mut file = NamedTempFile::new()?;
        write!(file, "{{ not json")?;
        let malformed = Transcript::from_path(file.path());
        assert!(matches!(malformed, Err(TranscriptError::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_lesson_topics_are_contiguous() {
        for pair in LESSON_TOPICS.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }
}
