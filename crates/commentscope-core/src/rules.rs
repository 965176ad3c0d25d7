//! Tunable analysis data: spam phrases and the insight prompt.
//!
//! Rules ship with built-in defaults and can be overridden by a YAML file so
//! they can be tuned without touching code:
//!
//! ```yaml
//! spam_phrases:
//!   - follow me
//!   - free money
//! prompt:
//!   system: You are an expert social media analyst.
//!   user_template: "Analyze these comments:\n\n{comments}\n"
//! ```
//!
//! Omitted sections fall back to the defaults.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder that [`PromptTemplate::render_user`] replaces with comment text.
pub const COMMENTS_PLACEHOLDER: &str = "{comments}";

const DEFAULT_SPAM_PHRASES: &[&str] = &[
    "follow me",
    "free money",
    "click this link",
    "DM us",
    "buy followers",
    "promotion",
    "promo code",
    "earn cash",
    "instant profit",
];

const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert social media analyst.";

const DEFAULT_USER_TEMPLATE: &str = "Analyze these comments:\n\n{comments}\n\n\
Tasks:\n\
1. Determine positive reach (engagement sentiment).\n\
2. Identify negative reach (if any).\n\
3. Detect spam patterns (repetitive messages, excessive promotions, bot-like behavior).\n\
4. Suggest improvements for audience interaction.\n\
5. Provide two recommendations to boost engagement.\n\
Format response as:\n\
- Positive Reach: (percentage or description)\n\
- Negative Reach: (percentage or description)\n\
- Suggested Improvements: (list)\n\
- Recommendations: (list)\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplate {
    pub system: String,
    /// User message; must contain [`COMMENTS_PLACEHOLDER`].
    pub user_template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_template: DEFAULT_USER_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Substitute the comment text into the user template.
    #[must_use]
    pub fn render_user(&self, comments: &str) -> String {
        self.user_template.replace(COMMENTS_PLACEHOLDER, comments)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRules {
    /// Phrases matched case-insensitively as literal substrings.
    pub spam_phrases: Vec<String>,
    pub prompt: PromptTemplate,
}

impl Default for AnalysisRules {
    fn default() -> Self {
        Self {
            spam_phrases: DEFAULT_SPAM_PHRASES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            prompt: PromptTemplate::default(),
        }
    }
}

impl AnalysisRules {
    /// Parse and validate rules from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::RulesFileParse` for malformed YAML and
    /// `ConfigError::Validation` when the rules are unusable.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let rules: AnalysisRules = serde_yaml::from_str(content)?;
        validate_rules(&rules)?;
        Ok(rules)
    }
}

/// Load and validate analysis rules from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_rules(path: &Path) -> Result<AnalysisRules, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RulesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    AnalysisRules::from_yaml_str(&content)
}

fn validate_rules(rules: &AnalysisRules) -> Result<(), ConfigError> {
    if rules.spam_phrases.is_empty() {
        return Err(ConfigError::Validation(
            "spam_phrases must contain at least one phrase".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for phrase in &rules.spam_phrases {
        if phrase.trim().is_empty() {
            return Err(ConfigError::Validation(
                "spam phrases must be non-empty".to_string(),
            ));
        }
        if !seen.insert(phrase.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate spam phrase: '{phrase}'"
            )));
        }
    }

    if !rules.prompt.user_template.contains(COMMENTS_PLACEHOLDER) {
        return Err(ConfigError::Validation(format!(
            "prompt.user_template must contain the {COMMENTS_PLACEHOLDER} placeholder"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        validate_rules(&AnalysisRules::default()).expect("built-in rules must validate");
    }

    #[test]
    fn default_phrases_match_known_list() {
        let rules = AnalysisRules::default();
        assert_eq!(rules.spam_phrases.len(), 9);
        assert!(rules.spam_phrases.iter().any(|p| p == "DM us"));
        assert!(rules.spam_phrases.iter().any(|p| p == "instant profit"));
    }

    #[test]
    fn render_user_substitutes_comments() {
        let prompt = PromptTemplate {
            system: "sys".to_string(),
            user_template: "before {comments} after".to_string(),
        };
        assert_eq!(prompt.render_user("a\nb"), "before a\nb after");
    }

    #[test]
    fn default_template_requests_reach_sections() {
        let rendered = PromptTemplate::default().render_user("nice video");
        assert!(rendered.contains("nice video"));
        assert!(rendered.contains("- Positive Reach:"));
        assert!(rendered.contains("- Negative Reach:"));
        assert!(rendered.contains("- Recommendations:"));
        assert!(!rendered.contains(COMMENTS_PLACEHOLDER));
    }

    #[test]
    fn partial_yaml_keeps_default_prompt() {
        let rules = AnalysisRules::from_yaml_str("spam_phrases: [\"giveaway\", \"link in bio\"]\n")
            .expect("valid yaml");
        assert_eq!(rules.spam_phrases, vec!["giveaway", "link in bio"]);
        assert_eq!(rules.prompt, PromptTemplate::default());
    }

    #[test]
    fn empty_phrase_list_is_rejected() {
        let err = AnalysisRules::from_yaml_str("spam_phrases: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn blank_phrase_is_rejected() {
        let err = AnalysisRules::from_yaml_str("spam_phrases: [\"  \"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn case_insensitive_duplicate_is_rejected() {
        let err =
            AnalysisRules::from_yaml_str("spam_phrases: [\"DM us\", \"dm us\"]\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate")),
            "got: {err:?}"
        );
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let yaml = "prompt:\n  system: hi\n  user_template: no placeholder here\n";
        let err = AnalysisRules::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = AnalysisRules::from_yaml_str("spam_phrases: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::RulesFileParse(_)));
    }

    #[test]
    fn load_rules_missing_file_is_io_error() {
        let err = load_rules(Path::new("/definitely/not/here/rules.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::RulesFileIo { .. }));
    }

    #[test]
    fn load_rules_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "commentscope-rules-{}.yaml",
            std::process::id()
        ));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "spam_phrases:\n  - crypto giveaway").unwrap();
        }
        let rules = load_rules(&path).expect("rules should load");
        std::fs::remove_file(&path).ok();
        assert_eq!(rules.spam_phrases, vec!["crypto giveaway"]);
    }
}
