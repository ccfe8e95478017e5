//! Batched summarization of candidates.

use crate::backends::{Summarize, Translate, translate_or_passthrough};
use crate::error::{Error, Result};
use crate::models::{Candidate, GenerationParams};
use tracing::{debug, info, instrument};

/// Summarize candidates in fixed-size batches and store the translated summaries.
///
/// Batches are submitted in document order and results are matched to
/// candidates by position. A summarizer error, or a batch that comes back with
/// the wrong number of summaries, aborts the whole run. Translation failures
/// leave the English summary in place.
#[instrument(level = "info", skip_all, fields(candidates = candidates.len(), batch_size = batch_size))]
pub async fn batch_summarize<S, T>(
    candidates: &mut [Candidate],
    summarizer: &S,
    translator: &T,
    params: &GenerationParams,
    batch_size: usize,
) -> Result<()>
where
    S: Summarize,
    T: Translate,
{
    if candidates.is_empty() {
        return Ok(());
    }

    let batch_size = batch_size.max(1);
    let total_batches = candidates.len().div_ceil(batch_size);
    let mut untranslated = 0usize;

    for (n, batch) in candidates.chunks_mut(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let summaries = summarizer.summarize_batch(&texts, params).await?;
        if summaries.len() != batch.len() {
            return Err(Error::Summarizer(format!(
                "batch {} returned {} summaries for {} inputs",
                n + 1,
                summaries.len(),
                batch.len()
            )));
        }

        for (candidate, summary) in batch.iter_mut().zip(summaries) {
            let translation = translate_or_passthrough(translator, summary.trim()).await;
            if translation.is_passthrough() {
                untranslated += 1;
            }
            candidate.summary = Some(translation);
        }
        debug!(batch = n + 1, total_batches, "Summarized batch");
    }

    info!(batches = total_batches, untranslated, "Summaries complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Translation, TruncationOutcome};
    use std::cell::RefCell;
    use std::io;
    use std::sync::{Arc, Mutex};

    const PARAMS: GenerationParams = GenerationParams {
        min_length: 30,
        max_length: 80,
        deterministic: true,
    };

    /// Echoes each input back as "sum:<input>" and records batch sizes.
    #[derive(Default)]
    struct EchoSummarizer {
        batches: RefCell<Vec<usize>>,
    }

    impl Summarize for EchoSummarizer {
        async fn summarize_batch(
            &self,
            texts: &[String],
            _params: &GenerationParams,
        ) -> Result<Vec<String>> {
            self.batches.borrow_mut().push(texts.len());
            Ok(texts.iter().map(|t| format!("  sum:{t} ")).collect())
        }
    }

    struct FailingSummarizer;

    impl Summarize for FailingSummarizer {
        async fn summarize_batch(&self, _: &[String], _: &GenerationParams) -> Result<Vec<String>> {
            Err(Error::Summarizer("out of memory".to_string()))
        }
    }

    struct ShortSummarizer;

    impl Summarize for ShortSummarizer {
        async fn summarize_batch(&self, _: &[String], _: &GenerationParams) -> Result<Vec<String>> {
            Ok(vec!["only one".to_string()])
        }
    }

    struct Bracket;

    impl Translate for Bracket {
        async fn translate(&self, text: &str) -> Result<String> {
            Ok(format!("[{text}]"))
        }
    }

    struct NoTranslate;

    impl Translate for NoTranslate {
        async fn translate(&self, _: &str) -> Result<String> {
            Err(Error::Translator("blocked".to_string()))
        }
    }

    /// Log sink shared between the subscriber and the assertions.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(i * 2, format!("p{i}"), TruncationOutcome::Untouched))
            .collect()
    }

    #[tokio::test]
    async fn test_batches_of_four_in_order() {
        let summarizer = EchoSummarizer::default();
        let mut cands = candidates(10);
        batch_summarize(&mut cands, &summarizer, &Bracket, &PARAMS, 4)
            .await
            .unwrap();

        assert_eq!(*summarizer.batches.borrow(), vec![4, 4, 2]);
        for (i, c) in cands.iter().enumerate() {
            assert_eq!(c.summary, Some(Translation::Translated(format!("[sum:p{i}]"))));
            assert_eq!(c.index, i * 2);
        }
    }

    #[tokio::test]
    async fn test_positional_results_for_any_batch_size() {
        for batch_size in [1, 3, 7] {
            let summarizer = EchoSummarizer::default();
            let mut cands = candidates(7);
            batch_summarize(&mut cands, &summarizer, &Bracket, &PARAMS, batch_size)
                .await
                .unwrap();
            for (i, c) in cands.iter().enumerate() {
                assert_eq!(c.summary_text(), Some(format!("[sum:p{i}]").as_str()));
            }
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_make_no_calls() {
        let summarizer = EchoSummarizer::default();
        let mut cands: Vec<Candidate> = Vec::new();
        batch_summarize(&mut cands, &summarizer, &Bracket, &PARAMS, 4)
            .await
            .unwrap();
        assert!(summarizer.batches.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_translation_failure_keeps_english_summary() {
        let summarizer = EchoSummarizer::default();
        let mut cands = candidates(2);
        batch_summarize(&mut cands, &summarizer, &NoTranslate, &PARAMS, 4)
            .await
            .unwrap();
        let summary = cands[1].summary.as_ref().unwrap();
        assert!(summary.is_passthrough());
        assert_eq!(summary.text(), "sum:p1");
    }

    #[tokio::test]
    async fn test_summarizer_failure_is_fatal() {
        let mut cands = candidates(3);
        let err = batch_summarize(&mut cands, &FailingSummarizer, &Bracket, &PARAMS, 4)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Summarizer(_)));
        assert!(cands.iter().all(|c| c.summary.is_none()));
    }

    #[tokio::test]
    async fn test_span_records_batch_size() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut cands = candidates(5);
        batch_summarize(&mut cands, &EchoSummarizer::default(), &Bracket, &PARAMS, 4)
            .await
            .unwrap();

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("batch_size=4"), "{logs}");
        assert!(logs.contains("candidates=5"), "{logs}");
    }

    #[tokio::test]
    async fn test_short_batch_result_is_fatal() {
        let mut cands = candidates(2);
        let result = batch_summarize(&mut cands, &ShortSummarizer, &Bracket, &PARAMS, 4).await;
        assert!(result.is_err());
    }
}
