use regex::Regex;
use std::sync::LazyLock;

pub const MAX_SENTENCES: usize = 3;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern is valid"));

/// Cleans oracle output for speech: strips markdown emphasis and keeps at most
/// three sentences, one per line.
pub fn format_response(text: &str) -> String {
    let cleaned = text.replace('*', "");
    let cleaned = cleaned.trim();

    let mut sentences = Vec::with_capacity(MAX_SENTENCES);
    let mut start = 0;
    for boundary in SENTENCE_END.find_iter(cleaned) {
        if sentences.len() == MAX_SENTENCES {
            break;
        }
        // keep the punctuation, drop the whitespace after it
        sentences.push(&cleaned[start..boundary.start() + 1]);
        start = boundary.end();
    }
    if sentences.len() < MAX_SENTENCES && start < cleaned.len() {
        sentences.push(&cleaned[start..]);
    }

    sentences.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(format_response(""), "");
        assert_eq!(format_response("  ** "), "");
    }

    #[test]
    fn test_strips_asterisks_and_whitespace() {
        assert_eq!(
            format_response("  **Inertia** is resistance to change.  "),
            "Inertia is resistance to change."
        );
    }

    #[test]
    fn test_keeps_first_three_sentences() {
        let answer = "Force is a push or pull. It is measured in newtons! Is it a vector? Yes. Always.";
        assert_eq!(
            format_response(answer),
            "Force is a push or pull.\nIt is measured in newtons!\nIs it a vector?"
        );
    }

    #[test]
    fn test_does_not_split_inside_numbers() {
        assert_eq!(
            format_response("g is about 9.8 m/s^2 near the surface. Next"),
            "g is about 9.8 m/s^2 near the surface.\nNext"
        );
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let once = format_response("*F = ma.* Mass times acceleration.\n\nThat is all. Really. Done.");
        assert_eq!(once, "F = ma.\nMass times acceleration.\nThat is all.");
        assert_eq!(format_response(&once), once);
    }
}
