//! Per-operation prompts and generation policy

use super::{Prompt, PromptBuilder};
use crate::ai::provider::GenerationParams;
use crate::constants::generation;
use crate::types::{
    Perspective, PolishFocus, PolishRequest, PolishStyle, RewriteLength, RewriteRequest,
    RewriteTone, SuggestionKind, SuggestionRequest,
};

// =============================================================================
// Generation policy
// =============================================================================

impl GenerationParams {
    /// Low temperature, budget scales with the input
    pub fn polish(text: &str) -> Self {
        Self {
            temperature: generation::POLISH_TEMPERATURE,
            max_tokens: (text.chars().count() * generation::POLISH_TOKENS_PER_CHAR)
                .max(generation::POLISH_MIN_TOKENS),
        }
    }

    pub fn rewrite(text: &str) -> Self {
        Self {
            temperature: generation::REWRITE_TEMPERATURE,
            max_tokens: (text.chars().count() * generation::REWRITE_TOKENS_PER_CHAR)
                .max(generation::REWRITE_MIN_TOKENS),
        }
    }

    pub fn suggest() -> Self {
        Self {
            temperature: generation::SUGGEST_TEMPERATURE,
            max_tokens: generation::SUGGEST_MAX_TOKENS,
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

fn style_descriptor(style: PolishStyle) -> &'static str {
    match style {
        PolishStyle::Formal => "a formal, rigorous literary style",
        PolishStyle::Casual => "a relaxed, natural conversational style",
        PolishStyle::Literary => "a graceful, richly literary style",
        PolishStyle::Modern => "a modern, concise style",
    }
}

fn focus_descriptor(focus: PolishFocus) -> &'static str {
    match focus {
        PolishFocus::Grammar => "accuracy of grammar and word choice",
        PolishFocus::Style => "register and manner of expression",
        PolishFocus::Flow => "fluency and coherence of the language",
        PolishFocus::All => "grammar, style, flow and every other aspect",
    }
}

fn tone_descriptor(tone: RewriteTone) -> &'static str {
    match tone {
        RewriteTone::Serious => "a serious, solemn tone",
        RewriteTone::Humorous => "a humorous, light-hearted tone",
        RewriteTone::Dramatic => "a dramatic, tense tone",
        RewriteTone::Romantic => "a romantic, tender tone",
    }
}

fn length_descriptor(length: RewriteLength) -> &'static str {
    match length {
        RewriteLength::Shorter => "more concise than the original",
        RewriteLength::Longer => "more detailed and richer than the original",
        RewriteLength::Same => "close to the original length",
    }
}

fn perspective_descriptor(perspective: Perspective) -> &'static str {
    match perspective {
        Perspective::First => "first-person point of view",
        Perspective::Third => "third-person point of view",
    }
}

fn suggestion_descriptor(kind: SuggestionKind) -> &'static str {
    match kind {
        SuggestionKind::Plot => "plot development and story direction",
        SuggestionKind::Character => "characterization and character development",
        SuggestionKind::Dialogue => "dialogue content and delivery",
        SuggestionKind::Description => "scene description and detail",
        SuggestionKind::Grammar => "grammar, word choice and sentence correctness",
        SuggestionKind::Style => "prose style and narrative voice",
    }
}

/// `Background: ...` first when context is present, then the instruction and text
fn user_prompt(instruction: &str, text: &str, context: Option<&str>) -> String {
    let mut builder = PromptBuilder::new();
    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        builder = builder.section("Background", context);
    }
    builder
        .text(&format!("{}:\n\n{}", instruction, text))
        .build()
}

// =============================================================================
// Operations
// =============================================================================

pub fn polish_prompt(request: &PolishRequest) -> Prompt {
    let style = request.style.unwrap_or_default();
    let focus = request.focus.unwrap_or_default();

    let system = PromptBuilder::new()
        .role(
            "a professional literary editor who excels at polishing and improving prose",
            "Polish the text according to the following requirements.",
        )
        .requirement("Style", style_descriptor(style))
        .requirement("Focus", focus_descriptor(focus))
        .principles(
            "Polishing principles",
            &[
                "Preserve the core meaning and emotional tone of the original",
                "Improve the expression so that it reads gracefully and smoothly",
                "Correct grammatical errors and inappropriate word choices",
                "Increase readability and emotional impact",
                "Keep the original length and structure",
            ],
        )
        .text("Return only the polished text, without explanations or notes.")
        .build();

    Prompt {
        system,
        user: user_prompt(
            "Polish the following text",
            &request.text,
            request.context.as_deref(),
        ),
    }
}

pub fn rewrite_prompt(request: &RewriteRequest) -> Prompt {
    let tone = request.tone.unwrap_or_default();
    let length = request.length.unwrap_or_default();

    let system = PromptBuilder::new()
        .role(
            "a creative writing expert who excels at rewriting and reimagining text",
            "Rewrite the text according to the following requirements.",
        )
        .requirement("Tone", tone_descriptor(tone))
        .requirement("Length", length_descriptor(length))
        .requirement_opt("Perspective", request.perspective.map(perspective_descriptor))
        .principles(
            "Rewriting principles",
            &[
                "Keep the core plot and key information",
                "Change the phrasing and sentence structure",
                "Adjust the tone and style",
                "Strengthen the expressiveness of the text",
                "Keep the logic clear and the language fluent",
            ],
        )
        .text("Return only the rewritten text, without explanations or notes.")
        .build();

    Prompt {
        system,
        user: user_prompt(
            "Rewrite the following text",
            &request.text,
            request.context.as_deref(),
        ),
    }
}

pub fn suggestion_prompt(request: &SuggestionRequest) -> Prompt {
    let system = PromptBuilder::new()
        .role(
            "a seasoned fiction-writing mentor who gives authors practical advice",
            &format!(
                "Offer professional suggestions for improving the {} of the text.",
                suggestion_descriptor(request.kind)
            ),
        )
        .principles(
            "Requirements",
            &[
                "Be specific and actionable rather than general",
                "Respect the conventions of long-form fiction",
                "Consider the reader's experience",
                "Offer 2-3 concrete directions for improvement",
                "Explain the reasoning behind each suggestion",
            ],
        )
        .text(
            "Return the suggestions as a clear list; each item gives a concrete change and the reason for it.",
        )
        .build();

    Prompt {
        system,
        user: user_prompt(
            "Suggest improvements for the following text",
            &request.text,
            request.context.as_deref(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polish_defaults() {
        let prompt = polish_prompt(&PolishRequest::new("Snow fell."));
        assert!(prompt.system.contains("Style: a graceful, richly literary style"));
        assert!(prompt.system.contains("Focus: grammar, style, flow and every other aspect"));
        assert!(prompt.system.contains("5. Keep the original length and structure"));
        assert_eq!(prompt.user, "Polish the following text:\n\nSnow fell.");
    }

    #[test]
    fn test_context_prefix() {
        let mut request = PolishRequest::new("Snow fell.");
        request.context = Some("A chapter of the novel \"Winter\".".into());
        let prompt = polish_prompt(&request);
        assert_eq!(
            prompt.user,
            "Background: A chapter of the novel \"Winter\".\n\nPolish the following text:\n\nSnow fell."
        );

        // blank context is ignored
        request.context = Some("   ".into());
        assert!(polish_prompt(&request).user.starts_with("Polish"));
    }

    #[test]
    fn test_rewrite_perspective_only_when_set() {
        let mut request = RewriteRequest::new("He ran.");
        assert!(!rewrite_prompt(&request).system.contains("Perspective"));

        request.perspective = Some(Perspective::First);
        request.tone = Some(RewriteTone::Humorous);
        request.length = Some(RewriteLength::Longer);
        let system = rewrite_prompt(&request).system;
        assert!(system.contains(
            "Tone: a humorous, light-hearted tone\nLength: more detailed and richer than the original\nPerspective: first-person point of view"
        ));
    }

    #[test]
    fn test_suggestion_focus() {
        let request = SuggestionRequest::new("\"Hello,\" she said.", SuggestionKind::Dialogue);
        let prompt = suggestion_prompt(&request);
        assert!(prompt.system.contains("dialogue content and delivery"));
        assert!(prompt.system.contains("4. Offer 2-3 concrete directions"));
        assert!(prompt.user.ends_with("\"Hello,\" she said."));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let mut polish = PolishRequest::new("Night.");
        polish.style = Some(PolishStyle::Formal);
        polish.focus = Some(PolishFocus::Flow);
        polish.context = Some("Epilogue".into());
        assert_eq!(polish_prompt(&polish), polish_prompt(&polish.clone()));

        let mut rewrite = RewriteRequest::new("Night.");
        rewrite.perspective = Some(Perspective::Third);
        assert_eq!(rewrite_prompt(&rewrite), rewrite_prompt(&rewrite.clone()));

        for kind in SuggestionKind::ALL {
            let request = SuggestionRequest::new("Night.", *kind);
            assert_eq!(suggestion_prompt(&request), suggestion_prompt(&request));
        }
    }

    #[test]
    fn test_generation_policy() {
        let short = "a".repeat(10);
        let long = "字".repeat(800);

        let polish = GenerationParams::polish(&short);
        assert_eq!(polish.temperature, 0.3);
        assert_eq!(polish.max_tokens, 1000);
        // counts characters, not bytes
        assert_eq!(GenerationParams::polish(&long).max_tokens, 1600);

        let rewrite = GenerationParams::rewrite(&short);
        assert_eq!(rewrite.temperature, 0.8);
        assert_eq!(rewrite.max_tokens, 1500);
        assert_eq!(GenerationParams::rewrite(&long).max_tokens, 2400);

        let suggest = GenerationParams::suggest();
        assert_eq!(suggest.temperature, 0.9);
        assert_eq!(suggest.max_tokens, 1500);
    }
}
