//! Keyword spam heuristic.
//!
//! A comment is spam when its lower-cased text contains any configured phrase,
//! also lower-cased, as a literal substring. There is no tokenization or
//! stemming: `"promotion"` matches inside `"promotional"`, and `"promo code"`
//! only matches when that exact character sequence is present.

use commentscope_core::AnalysisRules;

use crate::types::{CleanedComment, FlaggedComment, SpamReport};

/// Per-comment spam verdicts. Swappable so a stronger model can replace the
/// keyword heuristic without touching the pipeline.
pub trait SpamClassifier: Send + Sync {
    /// Return one verdict per input text, in order.
    fn classify(&self, texts: &[&str]) -> Vec<bool>;
}

#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    /// Stored lower-cased.
    phrases: Vec<String>,
}

impl KeywordClassifier {
    #[must_use]
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn from_rules(rules: &AnalysisRules) -> Self {
        Self::new(&rules.spam_phrases)
    }

    #[must_use]
    pub fn is_spam(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.phrases.iter().any(|p| lowered.contains(p.as_str()))
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::from_rules(&AnalysisRules::default())
    }
}

impl SpamClassifier for KeywordClassifier {
    fn classify(&self, texts: &[&str]) -> Vec<bool> {
        texts.iter().map(|t| self.is_spam(t)).collect()
    }
}

/// Percentage of `true` verdicts rounded to two decimals; `0.0` when empty.
#[must_use]
pub fn spam_ratio(verdicts: &[bool]) -> f64 {
    if verdicts.is_empty() {
        return 0.0;
    }
    let spam = verdicts.iter().filter(|v| **v).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = spam as f64 / verdicts.len() as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

/// Spam percentage of `comments` under the built-in phrase list.
#[must_use]
pub fn detect_spam(comments: &[&str]) -> f64 {
    spam_ratio(&KeywordClassifier::default().classify(comments))
}

impl SpamReport {
    /// Classify `comments` and collect the flagged ones with their authors.
    #[must_use]
    pub fn build(classifier: &dyn SpamClassifier, comments: &[CleanedComment]) -> Self {
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        let verdicts = classifier.classify(&texts);
        if verdicts.len() != comments.len() {
            tracing::warn!(
                expected = comments.len(),
                got = verdicts.len(),
                "spam classifier returned a mismatched verdict count"
            );
        }

        let flagged: Vec<FlaggedComment> = comments
            .iter()
            .zip(&verdicts)
            .filter(|(_, spam)| **spam)
            .map(|(c, _)| FlaggedComment {
                author: c.author.clone(),
                text: c.text.clone(),
            })
            .collect();

        Self {
            ratio_percent: spam_ratio(&verdicts),
            spam_count: flagged.len(),
            total: comments.len(),
            flagged,
        }
    }
}
