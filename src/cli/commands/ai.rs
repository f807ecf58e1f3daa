//! AI Commands
//!
//! Usage:
//!   novelcraft providers
//!   novelcraft polish <text> [--style <s>] [--focus <f>] [--context <c>] [--provider <p>]
//!   novelcraft rewrite <text> [--tone <t>] [--length <l>] [--perspective <p>]
//!   novelcraft suggest <text> --type <kind>
//!   novelcraft batch-polish [<text>...] [--file <path>]
//!   novelcraft analyze <text>

use std::path::Path;

use console::style;

use crate::ai::{AnalysisResult, BatchPolishResult, PolishResult, ProviderKind, SuggestionResult};
use crate::cli::CommandContext;
use crate::types::{
    AnalyzeRequest, NovelError, PolishOptions, PolishRequest, Result, RewriteRequest,
    SuggestionRequest,
};

pub fn providers(ctx: &CommandContext) -> Result<()> {
    let providers = ctx.orchestrator.list_providers();

    ctx.output.emit(&providers, |providers| {
        for descriptor in providers {
            let status = if descriptor.available {
                style("available").green()
            } else {
                style("not configured").yellow()
            };
            println!(
                "  {:<10} {:<10} {}",
                descriptor.kind, descriptor.display_name, status
            );
        }
    })
}

pub async fn polish(
    ctx: &CommandContext,
    request: &PolishRequest,
    provider: Option<ProviderKind>,
) -> Result<()> {
    let result = ctx.orchestrator.polish(request, provider).await?;
    ctx.output.emit(&result, print_polish)
}

pub async fn rewrite(
    ctx: &CommandContext,
    request: &RewriteRequest,
    provider: Option<ProviderKind>,
) -> Result<()> {
    let result = ctx.orchestrator.rewrite(request, provider).await?;
    ctx.output.emit(&result, |r| {
        println!("{}", r.rewritten_text);
        print_footer(r.provider, r.usage.map(|u| u.total_tokens));
    })
}

pub async fn suggest(
    ctx: &CommandContext,
    request: &SuggestionRequest,
    provider: Option<ProviderKind>,
) -> Result<()> {
    let result = ctx.orchestrator.suggest(request, provider).await?;
    ctx.output.emit(&result, print_suggestion)
}

pub async fn batch_polish(
    ctx: &CommandContext,
    texts: Vec<String>,
    file: Option<&Path>,
    options: &PolishOptions,
    provider: Option<ProviderKind>,
) -> Result<()> {
    let texts = collect_texts(texts, file)?;
    let result = ctx
        .orchestrator
        .batch_polish(texts, options, provider)
        .await?;
    ctx.output.emit(&result, print_batch)
}

pub async fn analyze(
    ctx: &CommandContext,
    request: &AnalyzeRequest,
    provider: Option<ProviderKind>,
) -> Result<()> {
    let result = ctx.orchestrator.analyze(request, provider).await?;
    ctx.output.emit(&result, print_analysis)
}

/// Batch input from positional texts followed by the non-blank lines of `file`.
pub fn collect_texts(mut texts: Vec<String>, file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)?;
        texts.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    if texts.is_empty() {
        return Err(NovelError::Validation(
            "No texts to polish: pass texts as arguments or --file".to_string(),
        ));
    }
    Ok(texts)
}

// =============================================================================
// Text rendering
// =============================================================================

pub(crate) fn print_polish(result: &PolishResult) {
    println!("{}", result.polished_text);
    print_footer(result.provider, result.usage.map(|u| u.total_tokens));
}

fn print_suggestion(result: &SuggestionResult) {
    println!("{}", result.suggestions);
    print_footer(result.provider, result.usage.map(|u| u.total_tokens));
}

fn print_footer(provider: ProviderKind, tokens: Option<u32>) {
    let tokens = tokens
        .map(|t| format!(", {} tokens", t))
        .unwrap_or_default();
    println!();
    println!(
        "{}",
        style(format!("via {}{}", provider.display_name(), tokens)).dim()
    );
}

fn print_batch(result: &BatchPolishResult) {
    for item in &result.successful {
        println!("{} {}", style(format!("[{}]", item.index)).cyan(), item.result.polished_text);
    }
    for failure in &result.failed {
        println!(
            "{} {} {}",
            style(format!("[{}]", failure.index)).red(),
            style(failure.kind).dim(),
            failure.error
        );
    }
    println!();
    println!(
        "{}",
        style(format!(
            "{}/{} succeeded, {} failed",
            result.success_count, result.total, result.failure_count
        ))
        .bold()
    );
}

fn print_analysis(result: &AnalysisResult) {
    println!(
        "{} characters, analyzed with {}",
        result.word_count,
        result.provider.display_name()
    );

    let facets = [
        ("Grammar", &result.suggestions.grammar),
        ("Style", &result.suggestions.style),
        ("Plot", &result.suggestions.plot),
    ];
    for (label, facet) in facets {
        println!("\n{}", style(label).bold());
        println!("{}", "─".repeat(40));
        match facet {
            Some(suggestion) => println!("{}", suggestion.suggestions),
            None => println!("{}", style("(no result)").yellow()),
        }
    }
}
