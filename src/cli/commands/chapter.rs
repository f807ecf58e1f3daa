//! Chapter Command
//!
//! Usage:
//!   novelcraft chapter add <project> <title> [--content <text> | --file <path>] [--order <n>]
//!   novelcraft chapter list <project>
//!   novelcraft chapter show <chapter>
//!   novelcraft chapter edit <chapter> [--title <t>] [--content <text> | --file <path>]
//!   novelcraft chapter move <chapter> <order>
//!   novelcraft chapter delete <chapter>
//!   novelcraft chapter normalize <project>
//!   novelcraft chapter polish <chapter> [--style <s>] [--focus <f>] [--provider <p>]

use std::path::Path;

use console::style;

use crate::ai::ProviderKind;
use crate::cli::CommandContext;
use crate::cli::commands::ai::print_polish;
use crate::types::{ChapterUpdate, NewChapter, PolishOptions, Result};

/// Chapter body from `--content` or `--file`; the file wins when both are given.
pub fn read_body(content: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    match file {
        Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
        None => Ok(content),
    }
}

pub fn add(ctx: &CommandContext, project_id: &str, chapter: NewChapter) -> Result<()> {
    let created = ctx.store()?.create_chapter(&ctx.caller, project_id, chapter)?;

    ctx.output.success(&format!(
        "Added chapter {} \"{}\"",
        created.order, created.title
    ));
    ctx.output.emit(&created, |c| {
        println!("  ID:    {}", c.id);
        println!("  Words: {}", c.word_count);
    })
}

pub fn list(ctx: &CommandContext, project_id: &str) -> Result<()> {
    let chapters = ctx.store()?.list_chapters(&ctx.caller, project_id)?;

    ctx.output.emit(&chapters, |chapters| {
        if chapters.is_empty() {
            println!("No chapters in this project.");
            return;
        }
        for chapter in chapters {
            println!(
                "{:>3}. {}  {} {}",
                chapter.order,
                style(&chapter.title).bold(),
                style(format!("({} words)", chapter.word_count)).dim(),
                style(&chapter.id).dim()
            );
        }
    })
}

pub fn show(ctx: &CommandContext, chapter_id: &str) -> Result<()> {
    let chapter = ctx.store()?.find_chapter(chapter_id, &ctx.caller)?;

    ctx.output.emit(&chapter, |c| {
        println!(
            "{}",
            style(format!("{}. {}", c.order, c.title)).bold().underlined()
        );
        println!();
        println!("{}", c.content);
    })
}

pub fn edit(ctx: &CommandContext, chapter_id: &str, update: ChapterUpdate) -> Result<()> {
    let chapter = ctx.store()?.update_chapter(chapter_id, &ctx.caller, update)?;

    ctx.output
        .success(&format!("Updated chapter \"{}\"", chapter.title));
    ctx.output.emit(&chapter, |c| {
        println!("  Words: {}", c.word_count);
    })
}

pub fn move_to(ctx: &CommandContext, chapter_id: &str, order: i64) -> Result<()> {
    let outcome = ctx.store()?.reorder_chapter(chapter_id, &ctx.caller, order)?;

    if outcome.is_noop() {
        ctx.output
            .info(&format!("Chapter already at position {}", outcome.to));
    } else {
        ctx.output.success(&format!(
            "Moved chapter from {} to {} ({} shifted)",
            outcome.from, outcome.to, outcome.shifted
        ));
    }
    ctx.output.emit(&outcome, |_| {})
}

pub fn delete(ctx: &CommandContext, chapter_id: &str) -> Result<()> {
    ctx.store()?.delete_chapter(chapter_id, &ctx.caller)?;

    ctx.output.success("Deleted chapter");
    ctx.output
        .emit(&serde_json::json!({ "deleted": chapter_id }), |_| {})
}

pub fn normalize(ctx: &CommandContext, project_id: &str) -> Result<()> {
    let outcome = ctx.store()?.normalize_project(project_id, &ctx.caller)?;

    if outcome.was_contiguous() {
        ctx.output.success(&format!(
            "Chapter order is contiguous ({} chapters)",
            outcome.before.count
        ));
    } else {
        ctx.output.warning(&format!(
            "Repaired chapter order: missing {:?}, duplicated {:?}, {} renumbered",
            outcome.before.missing, outcome.before.duplicates, outcome.renumbered
        ));
    }
    ctx.output.emit(&outcome, |_| {})
}

pub async fn polish(
    ctx: &CommandContext,
    chapter_id: &str,
    options: &PolishOptions,
    provider: Option<ProviderKind>,
) -> Result<()> {
    let result = ctx
        .orchestrator
        .polish_chapter(ctx.store()?, chapter_id, &ctx.caller, options, provider)
        .await?;

    ctx.output.emit(&result, |r| {
        ctx.output.header(&r.chapter_title);
        print_polish(&r.polish);
    })
}
