use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_CLASSIFY_PROMPT: &str = "Classify this question's subject (answer ONLY one word):\n\
1. physics\n2. math\n3. science\n4. other\n\n\
Question: {question}";

pub const DEFAULT_PRIMARY_PROMPT: &str = "Context: {context}\n\
Question: {question}\n\
Answer concisely (2-3 lines):";

pub const DEFAULT_FALLBACK_PROMPT: &str = "Answer this physics question concisely (2-3 lines):\n\
{question}";

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Failed to read prompts directory {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read prompt file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The three prompt templates sent to the oracle.
///
/// Templates may use `{question}` and, for the primary prompt, `{context}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub classify: String,
    pub primary: String,
    pub fallback: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            classify: DEFAULT_CLASSIFY_PROMPT.to_string(),
            primary: DEFAULT_PRIMARY_PROMPT.to_string(),
            fallback: DEFAULT_FALLBACK_PROMPT.to_string(),
        }
    }
}

impl PromptSet {
    /// Replaces the templates named `classify`, `primary` or `fallback` in `overrides`.
    /// Any other key is ignored.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, template) in overrides {
            let slot = match key.as_str() {
                "classify" => &mut self.classify,
                "primary" => &mut self.primary,
                "fallback" => &mut self.fallback,
                other => {
                    tracing::warn!("Ignoring unknown prompt override '{}'.", other);
                    continue;
                }
            };
            *slot = template.trim_end().to_string();
        }
        self
    }

    pub fn classify(&self, question: &str) -> String {
        render(&self.classify, "", question)
    }

    pub fn primary(&self, context: &str, question: &str) -> String {
        render(&self.primary, context, question)
    }

    pub fn fallback(&self, question: &str) -> String {
        render(&self.fallback, "", question)
    }
}

fn render(template: &str, context: &str, question: &str) -> String {
    template
        .replace("{context}", context)
        .replace("{question}", question)
}

/// Reads every `*.md` file in `dir_path`, keyed by file stem.
pub fn load_prompts(dir_path: &Path) -> Result<HashMap<String, String>, PromptError> {
    let mut prompts = HashMap::new();

    let entries = fs::read_dir(dir_path).map_err(|source| PromptError::ReadDir {
        path: dir_path.display().to_string(),
        source,
    })?;

    for entry in entries {
        let path = entry
            .map_err(|source| PromptError::ReadDir {
                path: dir_path.display().to_string(),
                source,
            })?
            .path();

        if !(path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md")) {
            continue;
        }
        let Some(prompt_key) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let content = fs::read_to_string(&path).map_err(|source| PromptError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;

        prompts.insert(prompt_key.to_string(), content);
    }

    Ok(prompts)
}
