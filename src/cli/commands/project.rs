//! Project Command
//!
//! Usage:
//!   novelcraft project create <title> [--description <text>]
//!   novelcraft project list

use console::style;

use crate::cli::CommandContext;
use crate::types::Result;

pub fn create(ctx: &CommandContext, title: &str, description: Option<&str>) -> Result<()> {
    let project = ctx.store()?.create_project(&ctx.caller, title, description)?;

    ctx.output
        .success(&format!("Created project \"{}\"", project.title));
    ctx.output.emit(&project, |p| {
        println!("  ID: {}", p.id);
    })
}

pub fn list(ctx: &CommandContext) -> Result<()> {
    let projects = ctx.store()?.list_projects(&ctx.caller)?;

    ctx.output.emit(&projects, |projects| {
        if projects.is_empty() {
            println!("No projects yet. Run 'novelcraft project create <title>' first.");
            return;
        }
        for project in projects {
            println!("{}  {}", style(&project.id).dim(), style(&project.title).bold());
            if let Some(description) = &project.description {
                println!("    {}", description);
            }
        }
    })
}
