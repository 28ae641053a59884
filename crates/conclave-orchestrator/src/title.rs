// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session title derivation from the problem statement.

/// Longest title kept before truncation.
const MAX_TITLE_CHARS: usize = 50;

/// Derives a session title: the text up to the first sentence-ending
/// punctuation or 50 characters, whichever is shorter, with `...` appended
/// when anything was dropped.
pub fn derive_title(problem_statement: &str) -> String {
    let text = problem_statement.trim();

    let (candidate, mut truncated) = match text.find(['.', '?', '!', '\n']) {
        Some(idx) => {
            let rest_nonempty = !text[idx + 1..].trim().is_empty();
            (&text[..idx], rest_nonempty)
        }
        None => (text, false),
    };

    let mut end = candidate.len().min(MAX_TITLE_CHARS);
    while !candidate.is_char_boundary(end) {
        end -= 1;
    }
    if end < candidate.len() {
        truncated = true;
    }

    let title = candidate[..end].trim_end();
    if truncated {
        format!("{title}...")
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_statement_is_kept_verbatim() {
        assert_eq!(derive_title("Build calculator"), "Build calculator");
    }

    #[test]
    fn exactly_fifty_chars_is_not_truncated() {
        let statement = "a".repeat(50);
        let title = derive_title(&statement);
        assert_eq!(title.len(), 50);
        assert!(!title.ends_with("..."));
    }

    #[test]
    fn fifty_one_chars_truncates_with_ellipsis() {
        let statement = "a".repeat(51);
        let title = derive_title(&statement);
        assert_eq!(title, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn cuts_at_first_sentence_punctuation() {
        assert_eq!(
            derive_title("Build a calculator. It should support fractions."),
            "Build a calculator..."
        );
        assert_eq!(
            derive_title("Which framework?\nPick something modern"),
            "Which framework..."
        );
    }

    #[test]
    fn trailing_punctuation_alone_is_not_a_truncation() {
        assert_eq!(derive_title("Build a calculator."), "Build a calculator");
    }

    #[test]
    fn respects_char_boundaries() {
        let statement = "ü".repeat(60);
        let title = derive_title(&statement);
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= 53);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(derive_title("  fix the bug  "), "fix the bug");
    }
}
