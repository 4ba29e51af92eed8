pub mod assistant;
pub mod context;
pub mod filters;
pub mod format;
pub mod oracle;
pub mod prompts;
pub mod transcript;

pub use assistant::{Answer, Assistant, Outcome};
pub use filters::Cues;
pub use oracle::{Oracle, OracleConfig, OracleError, OracleProvider, build_oracle};
pub use transcript::{LESSON_TOPICS, TopicSegment, Transcript, TranscriptSegment};
