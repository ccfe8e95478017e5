//! Picking the paragraphs that get a summary.

use crate::models::Candidate;
use crate::text::{TokenCount, alphabetic_word_count, fit_to_budget};

/// `true` when the paragraph has strictly more than `min_words` alphabetic words.
pub fn is_long_paragraph(text: &str, min_words: usize) -> bool {
    alphabetic_word_count(text) > min_words
}

/// Candidates for every long, non-blank paragraph, in document order.
///
/// Each candidate's text is fitted to `max_tokens` before it is stored.
pub fn select_candidates<P, K>(
    paragraphs: &[P],
    tokenizer: &K,
    min_words: usize,
    max_tokens: usize,
) -> Vec<Candidate>
where
    P: AsRef<str>,
    K: TokenCount + ?Sized,
{
    paragraphs
        .iter()
        .enumerate()
        .filter_map(|(index, paragraph)| {
            let text = paragraph.as_ref().trim();
            if text.is_empty() || !is_long_paragraph(text, min_words) {
                return None;
            }
            let (text, truncation) = fit_to_budget(text, tokenizer, max_tokens);
            Some(Candidate::new(index, text, truncation))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TruncationOutcome;
    use crate::text::Tokenizer;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!is_long_paragraph(&words(40), 40));
        assert!(is_long_paragraph(&words(41), 40));
    }

    #[test]
    fn test_numbers_and_punctuation_do_not_count() {
        let text = format!("{} 1 2 3 4 5 -- ; !", words(40));
        assert!(!is_long_paragraph(&text, 40));
    }

    #[test]
    fn test_selects_long_paragraphs_in_order() {
        let paragraphs = vec![
            words(41),
            "This is short.".to_string(),
            String::new(),
            "   ".to_string(),
            words(60),
            words(40),
        ];
        let candidates = select_candidates(&paragraphs, &Tokenizer::WordBounds, 40, 1024);
        let indices: Vec<usize> = candidates.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 4]);
        assert!(candidates.iter().all(|c| c.summary.is_none()));
        assert!(
            candidates
                .iter()
                .all(|c| c.truncation == TruncationOutcome::Untouched)
        );
    }

    #[test]
    fn test_candidate_text_is_trimmed() {
        let paragraphs = vec![format!("  {}  ", words(41))];
        let candidates = select_candidates(&paragraphs, &Tokenizer::WordBounds, 40, 1024);
        assert_eq!(candidates[0].text, words(41));
    }

    #[test]
    fn test_selection_is_idempotent() {
        let paragraphs = vec![words(10), words(50), words(45), String::new(), words(41)];
        let first = select_candidates(&paragraphs, &Tokenizer::WordBounds, 40, 1024);
        let second = select_candidates(&paragraphs, &Tokenizer::WordBounds, 40, 1024);
        assert_eq!(first, second);
    }

    #[test]
    fn test_over_budget_paragraph_is_truncated() {
        let long = "Alpha beta gamma delta epsilon. ".repeat(20);
        let candidates = select_candidates(&[long.as_str()], &Tokenizer::WordBounds, 40, 50);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].truncation, TruncationOutcome::Truncated);
        assert!(candidates[0].text.ends_with("...."));
    }
}
