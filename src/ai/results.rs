//! Normalized operation results
//!
//! Serialized in camelCase; `usage` is omitted when the provider did not report it.

use serde::Serialize;

use crate::ai::provider::{ProviderKind, TokenUsage};
use crate::types::{ErrorKind, NovelError, SuggestionKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolishResult {
    pub original_text: String,
    pub polished_text: String,
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    pub original_text: String,
    pub rewritten_text: String,
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResult {
    pub text: String,
    pub suggestions: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPolishResult {
    pub chapter_id: String,
    pub chapter_title: String,
    #[serde(flatten)]
    pub polish: PolishResult,
}

// =============================================================================
// Batch
// =============================================================================

/// Successful batch item; `index` is the position in the submitted list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub index: usize,
    #[serde(flatten)]
    pub result: PolishResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub index: usize,
    pub error: String,
    pub kind: ErrorKind,
}

impl BatchFailure {
    pub fn new(index: usize, err: &NovelError) -> Self {
        Self {
            index,
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPolishResult {
    pub successful: Vec<BatchItem>,
    pub failed: Vec<BatchFailure>,
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

impl BatchPolishResult {
    /// Partition settled outcomes, ordering each side by original index.
    pub fn from_outcomes(
        mut outcomes: Vec<(usize, crate::types::Result<PolishResult>)>,
    ) -> Self {
        outcomes.sort_by_key(|(index, _)| *index);
        let total = outcomes.len();

        let mut successful = Vec::new();
        let mut failed = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(result) => successful.push(BatchItem { index, result }),
                Err(e) => failed.push(BatchFailure::new(index, &e)),
            }
        }

        Self {
            success_count: successful.len(),
            failure_count: failed.len(),
            successful,
            failed,
            total,
        }
    }
}

// =============================================================================
// Analysis
// =============================================================================

/// Independently settled facets; `None` when that call failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisFacets {
    pub grammar: Option<SuggestionResult>,
    pub style: Option<SuggestionResult>,
    pub plot: Option<SuggestionResult>,
}

impl AnalysisFacets {
    pub fn settled_count(&self) -> usize {
        [&self.grammar, &self.style, &self.plot]
            .iter()
            .filter(|facet| facet.is_some())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub text: String,
    /// Character count of `text`
    pub word_count: usize,
    pub suggestions: AnalysisFacets,
    pub provider: ProviderKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polished(text: &str) -> PolishResult {
        PolishResult {
            original_text: text.into(),
            polished_text: text.to_uppercase(),
            provider: ProviderKind::Deepseek,
            usage: None,
        }
    }

    #[test]
    fn test_partition_keeps_original_indices() {
        let outcomes = vec![
            (2, Ok(polished("c"))),
            (1, Err(NovelError::provider("deepseek", "rate limited"))),
            (0, Ok(polished("a"))),
        ];

        let result = BatchPolishResult::from_outcomes(outcomes);

        assert_eq!(result.total, 3);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 1);
        let indices: Vec<usize> = result.successful.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(result.failed[0].index, 1);
        assert_eq!(result.failed[0].error, "deepseek API error: rate limited");
    }

    #[test]
    fn test_batch_item_json_shape() {
        let item = BatchItem {
            index: 4,
            result: polished("a"),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["index"], 4);
        assert_eq!(json["originalText"], "a");
        assert_eq!(json["provider"], "deepseek");
        assert!(json.get("usage").is_none());
    }

    #[test]
    fn test_chapter_result_flattens_polish() {
        let result = ChapterPolishResult {
            chapter_id: "c1".into(),
            chapter_title: "Dawn".into(),
            polish: polished("x"),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["chapterTitle"], "Dawn");
        assert_eq!(json["polishedText"], "X");
    }
}
